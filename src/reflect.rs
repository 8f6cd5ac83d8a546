//! Property-descriptor tables for runtime inspection.
//!
//! A type implementing [`Reflect`] exposes one [`TypeDescriptor`], built once,
//! listing its editable fields as [`Property`] entries: name, description,
//! kind, flags, optional numeric range, and plain function pointers to read
//! and write the field as a [`PropValue`]. `#[derive(Reflect)]` generates the
//! table; it can also be written by hand.

use bitflags::bitflags;
use thiserror::Error;

use crate::primitives::{Color, Vec2};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropFlags: u32 {
        const READ_ONLY = 1 << 0;
        const HIDDEN    = 1 << 1;
        /// Edit with a slider; needs a range
        const SLIDER    = 1 << 2;
        const COLOR     = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropKind {
    Bool,
    Int,
    UInt,
    Float,
    String,
    Vec2,
    Color,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
    String(String),
    Vec2(Vec2),
    Color(Color),
}

impl PropValue {
    pub fn kind(&self) -> PropKind {
        match self {
            PropValue::Bool(_) => PropKind::Bool,
            PropValue::Int(_) => PropKind::Int,
            PropValue::UInt(_) => PropKind::UInt,
            PropValue::Float(_) => PropKind::Float,
            PropValue::String(_) => PropKind::String,
            PropValue::Vec2(_) => PropKind::Vec2,
            PropValue::Color(_) => PropKind::Color,
        }
    }

    /// Numeric value as `f32`, for sliders.
    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            PropValue::Int(v) => Some(v as f32),
            PropValue::UInt(v) => Some(v as f32),
            PropValue::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Short display form used by the inspector.
    pub fn display(&self) -> String {
        match self {
            PropValue::Bool(v) => v.to_string(),
            PropValue::Int(v) => v.to_string(),
            PropValue::UInt(v) => v.to_string(),
            PropValue::Float(v) => format!("{:.3}", v),
            PropValue::String(v) => v.clone(),
            PropValue::Vec2(v) => format!("({:.2}, {:.2})", v.x, v.y),
            PropValue::Color(c) => format!("({:.2}, {:.2}, {:.2}, {:.2})", c.r, c.g, c.b, c.a),
        }
    }

    fn clamped(self, range: Option<(f32, f32)>) -> PropValue {
        let Some((min, max)) = range else {
            return self;
        };
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        match self {
            PropValue::Int(v) => PropValue::Int((v as f32).clamp(lo, hi).round() as i32),
            PropValue::UInt(v) => PropValue::UInt((v as f32).clamp(lo.max(0.0), hi.max(0.0)).round() as u32),
            PropValue::Float(v) => PropValue::Float(v.clamp(lo, hi)),
            other => other,
        }
    }
}

/// Field types a descriptor can carry.
pub trait PropertyValue: Sized {
    const KIND: PropKind;
    fn to_value(&self) -> PropValue;
    fn from_value(value: PropValue) -> Option<Self>;
}

macro_rules! property_value {
    ($ty:ty, $kind:ident) => {
        impl PropertyValue for $ty {
            const KIND: PropKind = PropKind::$kind;

            fn to_value(&self) -> PropValue {
                PropValue::$kind(self.clone())
            }

            fn from_value(value: PropValue) -> Option<Self> {
                match value {
                    PropValue::$kind(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

property_value!(bool, Bool);
property_value!(i32, Int);
property_value!(u32, UInt);
property_value!(f32, Float);
property_value!(String, String);
property_value!(Vec2, Vec2);
property_value!(Color, Color);

#[derive(Debug, Error, PartialEq)]
pub enum ReflectError {
    #[error("property `{0}` is read-only")]
    ReadOnly(&'static str),
    #[error("property `{property}` expects {expected:?}, got {found:?}")]
    TypeMismatch {
        property: &'static str,
        expected: PropKind,
        found: PropKind,
    },
    #[error("no property named `{0}`")]
    UnknownProperty(String),
}

pub struct Property<T: 'static> {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: PropKind,
    pub flags: PropFlags,
    pub range: Option<(f32, f32)>,
    getter: fn(&T) -> PropValue,
    setter: fn(&mut T, PropValue) -> bool,
}

impl<T: 'static> Property<T> {
    pub fn new(
        name: &'static str,
        kind: PropKind,
        getter: fn(&T) -> PropValue,
        setter: fn(&mut T, PropValue) -> bool,
    ) -> Self {
        Self {
            name,
            description: "",
            kind,
            flags: PropFlags::empty(),
            range: None,
            getter,
            setter,
        }
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn flags(mut self, flags: PropFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn range(mut self, min: f32, max: f32) -> Self {
        self.range = Some((min, max));
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.flags.contains(PropFlags::READ_ONLY)
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.contains(PropFlags::HIDDEN)
    }

    pub fn get(&self, target: &T) -> PropValue {
        (self.getter)(target)
    }

    /// Write `value`, clamping numbers into the range when one is set.
    pub fn set(&self, target: &mut T, value: PropValue) -> Result<(), ReflectError> {
        if self.is_read_only() {
            return Err(ReflectError::ReadOnly(self.name));
        }
        let found = value.kind();
        if found != self.kind || !(self.setter)(target, value.clamped(self.range)) {
            return Err(ReflectError::TypeMismatch {
                property: self.name,
                expected: self.kind,
                found,
            });
        }
        Ok(())
    }
}

impl<T: 'static> std::fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("flags", &self.flags)
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct TypeDescriptor<T: 'static> {
    pub name: &'static str,
    pub properties: Vec<Property<T>>,
}

impl<T: 'static> TypeDescriptor<T> {
    pub fn new(name: &'static str, properties: Vec<Property<T>>) -> Self {
        Self { name, properties }
    }

    pub fn property(&self, name: &str) -> Option<&Property<T>> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Properties not flagged hidden, in declaration order.
    pub fn visible(&self) -> impl Iterator<Item = &Property<T>> {
        self.properties.iter().filter(|p| !p.is_hidden())
    }

    pub fn get(&self, target: &T, name: &str) -> Result<PropValue, ReflectError> {
        self.property(name)
            .map(|p| p.get(target))
            .ok_or_else(|| ReflectError::UnknownProperty(name.to_string()))
    }

    pub fn set(&self, target: &mut T, name: &str, value: PropValue) -> Result<(), ReflectError> {
        self.property(name)
            .ok_or_else(|| ReflectError::UnknownProperty(name.to_string()))?
            .set(target, value)
    }
}

/// Types with a static property table.
pub trait Reflect: Sized + 'static {
    fn descriptor() -> &'static TypeDescriptor<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    #[derive(Debug, Default)]
    struct Light {
        enabled: bool,
        intensity: f32,
        samples: i32,
        id: u32,
    }

    impl Reflect for Light {
        fn descriptor() -> &'static TypeDescriptor<Self> {
            static DESC: OnceLock<TypeDescriptor<Light>> = OnceLock::new();
            DESC.get_or_init(|| {
                TypeDescriptor::new(
                    "Light",
                    vec![
                        Property::new(
                            "enabled",
                            PropKind::Bool,
                            |l: &Light| l.enabled.to_value(),
                            |l: &mut Light, v| bool::from_value(v).map(|x| l.enabled = x).is_some(),
                        ),
                        Property::new(
                            "intensity",
                            PropKind::Float,
                            |l: &Light| l.intensity.to_value(),
                            |l: &mut Light, v| f32::from_value(v).map(|x| l.intensity = x).is_some(),
                        )
                        .range(0.0, 10.0)
                        .flags(PropFlags::SLIDER),
                        Property::new(
                            "samples",
                            PropKind::Int,
                            |l: &Light| l.samples.to_value(),
                            |l: &mut Light, v| i32::from_value(v).map(|x| l.samples = x).is_some(),
                        )
                        .range(1.0, 64.0),
                        Property::new(
                            "id",
                            PropKind::UInt,
                            |l: &Light| l.id.to_value(),
                            |l: &mut Light, v| u32::from_value(v).map(|x| l.id = x).is_some(),
                        )
                        .flags(PropFlags::READ_ONLY | PropFlags::HIDDEN),
                    ],
                )
            })
        }
    }

    #[test]
    fn test_descriptor_is_built_once() {
        assert!(std::ptr::eq(Light::descriptor(), Light::descriptor()));
        assert_eq!(Light::descriptor().properties.len(), 4);
        assert_eq!(Light::descriptor().visible().count(), 3);
    }

    #[test]
    fn test_get_and_set_with_range_clamp() {
        let desc = Light::descriptor();
        let mut light = Light::default();
        desc.set(&mut light, "intensity", PropValue::Float(25.0)).unwrap();
        assert_eq!(light.intensity, 10.0);
        desc.set(&mut light, "samples", PropValue::Int(0)).unwrap();
        assert_eq!(light.samples, 1);
        desc.set(&mut light, "enabled", PropValue::Bool(true)).unwrap();
        assert_eq!(desc.get(&light, "enabled"), Ok(PropValue::Bool(true)));
    }

    #[test]
    fn test_set_errors() {
        let desc = Light::descriptor();
        let mut light = Light::default();
        assert_eq!(
            desc.set(&mut light, "id", PropValue::UInt(3)),
            Err(ReflectError::ReadOnly("id"))
        );
        assert!(matches!(
            desc.set(&mut light, "enabled", PropValue::Float(1.0)),
            Err(ReflectError::TypeMismatch { .. })
        ));
        assert_eq!(
            desc.set(&mut light, "nope", PropValue::Bool(true)),
            Err(ReflectError::UnknownProperty("nope".into()))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(PropValue::Float(0.5).display(), "0.500");
        assert_eq!(PropValue::Bool(false).display(), "false");
        assert_eq!(PropValue::Int(-3).as_f32(), Some(-3.0));
        assert_eq!(PropValue::String("x".into()).as_f32(), None);
    }
}
