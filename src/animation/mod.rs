//! Per-widget property animations.
//!
//! The [`AnimationSystem`] keeps at most one animation per (widget,
//! property) pair. Every frame [`AnimationSystem::advance`] moves each one
//! forward, writes the interpolated value onto the widget, and drops the
//! finished ones after writing the exact target value. An animation whose
//! widget is gone is dropped without writing anything.

mod animatable;
mod spring;
mod timing;

pub use animatable::Animatable;
pub use spring::{SpringConfig, SpringState};
pub use timing::TimingFunction;

use crate::primitives::Color;
use crate::tree::{Tree, WidgetId};
use crate::widgets::{WidgetData, WidgetFlags};

/// Springs that never settle are forced to their target after this long.
const MAX_SPRING_SECS: f32 = 10.0;

/// Configuration for how a property moves to a new value
#[derive(Clone, Debug)]
pub struct Transition {
    /// Seconds; ignored by springs
    pub duration: f32,
    pub timing: TimingFunction,
    /// Seconds before the value starts moving
    pub delay: f32,
}

impl Transition {
    pub fn new(duration: f32, timing: TimingFunction) -> Self {
        Self {
            duration,
            timing,
            delay: 0.0,
        }
    }

    pub fn spring(config: SpringConfig) -> Self {
        Self {
            duration: 0.0,
            timing: TimingFunction::Spring(config),
            delay: 0.0,
        }
    }

    pub fn delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    pub fn timing(mut self, timing: TimingFunction) -> Self {
        self.timing = timing;
        self
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::new(0.2, TimingFunction::EaseOut)
    }
}

/// Widget properties the animation system can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimProperty {
    Opacity,
    Background,
    PreferredWidth,
    PreferredHeight,
    FlexGrow,
    FlexBasis,
}

impl AnimProperty {
    pub fn read(self, data: &WidgetData) -> AnimValue {
        match self {
            AnimProperty::Opacity => AnimValue::Scalar(data.style.opacity),
            AnimProperty::Background => AnimValue::Color(data.style.background),
            AnimProperty::PreferredWidth => AnimValue::Scalar(data.layout.preferred_size.width),
            AnimProperty::PreferredHeight => AnimValue::Scalar(data.layout.preferred_size.height),
            AnimProperty::FlexGrow => AnimValue::Scalar(data.layout.flex_grow),
            AnimProperty::FlexBasis => AnimValue::Scalar(data.layout.flex_basis.unwrap_or(0.0)),
        }
    }

    /// Write `value` if its kind matches; returns whether anything was written.
    pub fn write(self, data: &mut WidgetData, value: AnimValue) -> bool {
        match (self, value) {
            (AnimProperty::Opacity, AnimValue::Scalar(v)) => data.style.opacity = v,
            (AnimProperty::Background, AnimValue::Color(c)) => data.style.background = c,
            (AnimProperty::PreferredWidth, AnimValue::Scalar(v)) => {
                data.layout.preferred_size.width = v
            }
            (AnimProperty::PreferredHeight, AnimValue::Scalar(v)) => {
                data.layout.preferred_size.height = v
            }
            (AnimProperty::FlexGrow, AnimValue::Scalar(v)) => data.layout.flex_grow = v,
            (AnimProperty::FlexBasis, AnimValue::Scalar(v)) => data.layout.flex_basis = Some(v),
            _ => return false,
        }
        if self.affects_layout() {
            data.flags.insert(WidgetFlags::NEEDS_LAYOUT);
        }
        data.flags.insert(WidgetFlags::NEEDS_REDRAW);
        true
    }

    pub fn affects_layout(self) -> bool {
        !matches!(self, AnimProperty::Opacity | AnimProperty::Background)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimValue {
    Scalar(f32),
    Color(Color),
}

impl AnimValue {
    fn same_kind(&self, other: &AnimValue) -> bool {
        matches!(
            (self, other),
            (AnimValue::Scalar(_), AnimValue::Scalar(_)) | (AnimValue::Color(_), AnimValue::Color(_))
        )
    }

    fn lerp(from: &AnimValue, to: &AnimValue, t: f32) -> AnimValue {
        match (from, to) {
            (AnimValue::Scalar(a), AnimValue::Scalar(b)) => AnimValue::Scalar(f32::lerp(a, b, t)),
            (AnimValue::Color(a), AnimValue::Color(b)) => AnimValue::Color(Color::lerp(a, b, t)),
            _ => *to,
        }
    }
}

impl From<f32> for AnimValue {
    fn from(v: f32) -> Self {
        AnimValue::Scalar(v)
    }
}

impl From<Color> for AnimValue {
    fn from(c: Color) -> Self {
        AnimValue::Color(c)
    }
}

#[derive(Debug, Clone)]
struct AnimationState {
    widget: WidgetId,
    property: AnimProperty,
    from: AnimValue,
    to: AnimValue,
    current: AnimValue,
    transition: Transition,
    elapsed: f32,
    spring: Option<SpringState>,
    paused: bool,
}

enum Step {
    Running(AnimValue),
    Finished,
}

impl AnimationState {
    fn step(&mut self, dt: f32) -> Step {
        self.elapsed += dt;
        let active = self.elapsed - self.transition.delay.max(0.0);
        if active < 0.0 {
            return Step::Running(self.current);
        }
        let factor = match (&self.transition.timing, self.spring.as_mut()) {
            (TimingFunction::Spring(config), Some(spring)) => {
                // The first active frame only covers the part after the delay.
                let position = spring.step(dt.min(active), config);
                if spring.is_settled(config.threshold) || active >= MAX_SPRING_SECS {
                    return Step::Finished;
                }
                position
            }
            (timing, _) => {
                if self.transition.duration <= 0.0 {
                    return Step::Finished;
                }
                let progress = active / self.transition.duration;
                if progress >= 1.0 {
                    return Step::Finished;
                }
                timing.evaluate(progress)
            }
        };
        self.current = AnimValue::lerp(&self.from, &self.to, factor);
        Step::Running(self.current)
    }
}

/// Active animations, advanced once per frame by the UI context.
#[derive(Debug, Default)]
pub struct AnimationSystem {
    states: Vec<AnimationState>,
}

impl AnimationSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start moving `property` of `widget` towards `to`.
    ///
    /// The start value is the property's current value. An animation already
    /// running on the same pair is replaced and continues from where it is.
    /// Returns `false` if the widget does not exist or `to` has the wrong kind.
    pub fn animate(
        &mut self,
        tree: &Tree,
        widget: WidgetId,
        property: AnimProperty,
        to: impl Into<AnimValue>,
        transition: Transition,
    ) -> bool {
        let to = to.into();
        let Some(data) = tree.data(widget) else {
            log::warn!("animate: stale widget {:?}", widget);
            return false;
        };
        let from = property.read(data);
        if !from.same_kind(&to) {
            log::warn!("animate: {:?} cannot take {:?}", property, to);
            return false;
        }
        self.states
            .retain(|s| !(s.widget == widget && s.property == property));
        let spring = transition.timing.is_spring().then(SpringState::new);
        self.states.push(AnimationState {
            widget,
            property,
            from,
            to,
            current: from,
            transition,
            elapsed: 0.0,
            spring,
            paused: false,
        });
        true
    }

    /// Advance every animation by `dt` seconds and write values back onto the tree.
    pub fn advance(&mut self, tree: &mut Tree, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.states.retain_mut(|state| {
            let Some(data) = tree.data_mut(state.widget) else {
                log::debug!("dropping animation of removed widget {:?}", state.widget);
                return false;
            };
            if state.paused {
                return true;
            }
            match state.step(dt) {
                Step::Running(value) => {
                    state.property.write(data, value);
                    true
                }
                Step::Finished => {
                    state.property.write(data, state.to);
                    false
                }
            }
        });
    }

    pub fn is_animating(&self, widget: WidgetId, property: AnimProperty) -> bool {
        self.find(widget, property).is_some()
    }

    /// Current interpolated value, if an animation is running.
    pub fn value(&self, widget: WidgetId, property: AnimProperty) -> Option<AnimValue> {
        self.find(widget, property).map(|s| s.current)
    }

    pub fn target(&self, widget: WidgetId, property: AnimProperty) -> Option<AnimValue> {
        self.find(widget, property).map(|s| s.to)
    }

    pub fn pause(&mut self, widget: WidgetId, property: AnimProperty) -> bool {
        self.set_paused(widget, property, true)
    }

    pub fn resume(&mut self, widget: WidgetId, property: AnimProperty) -> bool {
        self.set_paused(widget, property, false)
    }

    /// Stop an animation where it is, without writing the target.
    pub fn cancel(&mut self, widget: WidgetId, property: AnimProperty) -> bool {
        let before = self.states.len();
        self.states
            .retain(|s| !(s.widget == widget && s.property == property));
        self.states.len() != before
    }

    /// Cancel every animation of `widget`; returns how many were removed.
    pub fn cancel_widget(&mut self, widget: WidgetId) -> usize {
        let before = self.states.len();
        self.states.retain(|s| s.widget != widget);
        before - self.states.len()
    }

    pub fn active_count(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    fn find(&self, widget: WidgetId, property: AnimProperty) -> Option<&AnimationState> {
        self.states
            .iter()
            .find(|s| s.widget == widget && s.property == property)
    }

    fn set_paused(&mut self, widget: WidgetId, property: AnimProperty, paused: bool) -> bool {
        match self
            .states
            .iter_mut()
            .find(|s| s.widget == widget && s.property == property)
        {
            Some(state) => {
                state.paused = paused;
                true
            }
            None => false,
        }
    }
}
