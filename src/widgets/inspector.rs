use std::cell::RefCell;
use std::rc::Rc;

use super::{draw_background, Event, EventResponse, MouseButton, Widget, WidgetData, WidgetFlags};
use crate::primitives::{Rect, Vec2};
use crate::reflect::{PropKind, PropValue, Property, Reflect};
use crate::renderer::PaintContext;

pub const ROW_HEIGHT: f32 = 22.0;
/// Share of the row width given to the property name.
const LABEL_FRACTION: f32 = 0.4;
const CHECK_SIZE: f32 = 14.0;
const TRACK_HEIGHT: f32 = 6.0;

type ChangeHandler = Box<dyn FnMut(&'static str, &PropValue)>;

/// Editable view of one reflected object, one row per visible property.
///
/// Booleans toggle on click and ranged numbers are dragged like a slider.
/// Other kinds are shown read-only. The object is shared with the caller,
/// who sees edits immediately.
pub struct PropertyInspector<T: Reflect> {
    target: Rc<RefCell<T>>,
    dragging: Option<&'static str>,
    on_change: Option<ChangeHandler>,
}

impl<T: Reflect> PropertyInspector<T> {
    pub fn new(target: Rc<RefCell<T>>) -> Self {
        Self {
            target,
            dragging: None,
            on_change: None,
        }
    }

    pub fn on_change(mut self, handler: impl FnMut(&'static str, &PropValue) + 'static) -> Self {
        self.on_change = Some(Box::new(handler));
        self
    }

    pub fn target(&self) -> &Rc<RefCell<T>> {
        &self.target
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }

    /// Height needed to show every visible row.
    pub fn content_height() -> f32 {
        T::descriptor().visible().count() as f32 * ROW_HEIGHT
    }

    fn row_rect(content: Rect, row: usize) -> Rect {
        Rect::new(
            content.x,
            content.y + row as f32 * ROW_HEIGHT,
            content.width,
            ROW_HEIGHT,
        )
    }

    fn value_rect(row: Rect) -> Rect {
        let label = row.width * LABEL_FRACTION;
        Rect::new(row.x + label, row.y, (row.width - label).max(0.0), row.height)
    }

    fn track_rect(value: Rect) -> Rect {
        Rect::new(
            value.x,
            value.y + (value.height - TRACK_HEIGHT) * 0.5,
            value.width,
            TRACK_HEIGHT,
        )
    }

    fn row_at(content: Rect, point: Vec2) -> Option<(usize, &'static Property<T>)> {
        if !content.contains(point) {
            return None;
        }
        let row = ((point.y - content.y) / ROW_HEIGHT) as usize;
        T::descriptor().visible().nth(row).map(|p| (row, p))
    }

    fn is_slider(property: &Property<T>) -> bool {
        property.range.is_some()
            && matches!(property.kind, PropKind::Int | PropKind::UInt | PropKind::Float)
    }

    fn apply(&mut self, property: &'static Property<T>, value: PropValue) {
        let result = property.set(&mut self.target.borrow_mut(), value);
        match result {
            Ok(()) => {
                let stored = property.get(&self.target.borrow());
                if let Some(handler) = self.on_change.as_mut() {
                    handler(property.name, &stored);
                }
            }
            Err(e) => log::warn!("inspector edit rejected: {}", e),
        }
    }

    fn slide(&mut self, property: &'static Property<T>, value_rect: Rect, x: f32) {
        let Some((min, max)) = property.range else {
            return;
        };
        let t = if value_rect.width > 0.0 {
            ((x - value_rect.x) / value_rect.width).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let raw = min + (max - min) * t;
        let value = match property.kind {
            PropKind::Int => PropValue::Int(raw.round() as i32),
            PropKind::UInt => PropValue::UInt(raw.max(0.0).round() as u32),
            _ => PropValue::Float(raw),
        };
        self.apply(property, value);
    }
}

impl<T: Reflect> Widget for PropertyInspector<T> {
    fn default_flags(&self) -> WidgetFlags {
        WidgetFlags::CAPTURES_MOUSE
    }

    fn draw(&self, data: &WidgetData, ctx: &mut PaintContext) {
        draw_background(data, ctx);
        let theme = ctx.theme;
        let content = data.content_rect();
        let target = self.target.borrow();

        for (row, property) in T::descriptor().visible().enumerate() {
            let row_rect = Self::row_rect(content, row);
            if row_rect.y >= content.bottom() {
                break;
            }
            if row % 2 == 1 {
                ctx.draw_list.add_filled_rect(row_rect, theme.bg_tertiary);
            }
            let text_color = if property.is_read_only() {
                theme.text_disabled
            } else {
                theme.text_secondary
            };
            ctx.draw_text_in(row_rect, theme.padding, property.name, text_color);

            let value_rect = Self::value_rect(row_rect);
            let value = property.get(&target);
            match &value {
                PropValue::Bool(on) => {
                    let check = Rect::new(
                        value_rect.x,
                        value_rect.y + (value_rect.height - CHECK_SIZE) * 0.5,
                        CHECK_SIZE,
                        CHECK_SIZE,
                    );
                    let fill = if *on { theme.accent } else { theme.input_bg };
                    ctx.draw_box(check, fill, 2.0, Some((theme.border_primary, 1.0)));
                }
                PropValue::Color(color) => {
                    let swatch = Rect::new(value_rect.x, value_rect.y + 3.0, 32.0, ROW_HEIGHT - 6.0);
                    ctx.draw_box(swatch, *color, 2.0, Some((theme.border_primary, 1.0)));
                }
                _ if Self::is_slider(property) => {
                    let track = Self::track_rect(value_rect);
                    ctx.draw_box(track, theme.input_bg, TRACK_HEIGHT * 0.5, None);
                    if let (Some((min, max)), Some(v)) = (property.range, value.as_f32()) {
                        let t = if max > min {
                            ((v - min) / (max - min)).clamp(0.0, 1.0)
                        } else {
                            0.0
                        };
                        let filled = Rect::new(track.x, track.y, track.width * t, track.height);
                        ctx.draw_box(filled, theme.accent, TRACK_HEIGHT * 0.5, None);
                    }
                    ctx.draw_text_in(value_rect, 4.0, &value.display(), theme.text_primary);
                }
                _ => {
                    ctx.draw_text_in(value_rect, 0.0, &value.display(), text_color);
                }
            }
        }
    }

    fn event(&mut self, data: &mut WidgetData, event: &Event) -> EventResponse {
        let content = data.content_rect();
        match *event {
            Event::MouseDown {
                x,
                y,
                button: MouseButton::Left,
            } => {
                let Some((row, property)) = Self::row_at(content, Vec2::new(x, y)) else {
                    return EventResponse::Ignored;
                };
                if property.is_read_only() || !data.is_enabled() {
                    return EventResponse::Handled;
                }
                let value_rect = Self::value_rect(Self::row_rect(content, row));
                if property.kind == PropKind::Bool {
                    let current = property.get(&self.target.borrow());
                    if let PropValue::Bool(on) = current {
                        self.apply(property, PropValue::Bool(!on));
                    }
                } else if Self::is_slider(property) && value_rect.contains(Vec2::new(x, y)) {
                    self.dragging = Some(property.name);
                    self.slide(property, value_rect, x);
                }
                EventResponse::Handled
            }
            Event::MouseMove { x, .. } => {
                let Some(name) = self.dragging else {
                    return EventResponse::Ignored;
                };
                let descriptor = T::descriptor();
                let row = descriptor.visible().position(|p| p.name == name);
                if let (Some(row), Some(property)) = (row, descriptor.property(name)) {
                    let value_rect = Self::value_rect(Self::row_rect(content, row));
                    self.slide(property, value_rect, x);
                }
                EventResponse::Handled
            }
            Event::MouseUp {
                button: MouseButton::Left,
                ..
            } => {
                if self.dragging.take().is_some() {
                    EventResponse::Handled
                } else {
                    EventResponse::Ignored
                }
            }
            _ => EventResponse::Ignored,
        }
    }

    crate::impl_as_any!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{PropFlags, PropertyValue, TypeDescriptor};
    use std::sync::OnceLock;

    #[derive(Debug, Default)]
    struct Settings {
        vsync: bool,
        volume: f32,
        build: u32,
    }

    impl Reflect for Settings {
        fn descriptor() -> &'static TypeDescriptor<Self> {
            static DESC: OnceLock<TypeDescriptor<Settings>> = OnceLock::new();
            DESC.get_or_init(|| {
                TypeDescriptor::new(
                    "Settings",
                    vec![
                        Property::new(
                            "vsync",
                            PropKind::Bool,
                            |s: &Settings| s.vsync.to_value(),
                            |s: &mut Settings, v| bool::from_value(v).map(|x| s.vsync = x).is_some(),
                        ),
                        Property::new(
                            "volume",
                            PropKind::Float,
                            |s: &Settings| s.volume.to_value(),
                            |s: &mut Settings, v| f32::from_value(v).map(|x| s.volume = x).is_some(),
                        )
                        .range(0.0, 1.0)
                        .flags(PropFlags::SLIDER),
                        Property::new(
                            "build",
                            PropKind::UInt,
                            |s: &Settings| s.build.to_value(),
                            |s: &mut Settings, v| u32::from_value(v).map(|x| s.build = x).is_some(),
                        )
                        .flags(PropFlags::READ_ONLY),
                    ],
                )
            })
        }
    }

    fn setup() -> (Rc<RefCell<Settings>>, PropertyInspector<Settings>, WidgetData) {
        let settings = Rc::new(RefCell::new(Settings::default()));
        let inspector = PropertyInspector::new(settings.clone());
        // Value column spans x 40..100
        let data = WidgetData::new("inspector").with_bounds(Rect::new(0.0, 0.0, 100.0, 200.0));
        (settings, inspector, data)
    }

    fn down(x: f32, y: f32) -> Event {
        Event::MouseDown {
            x,
            y,
            button: MouseButton::Left,
        }
    }

    fn up(x: f32, y: f32) -> Event {
        Event::MouseUp {
            x,
            y,
            button: MouseButton::Left,
        }
    }

    #[test]
    fn test_click_toggles_bool() {
        let (settings, mut inspector, mut data) = setup();
        inspector.event(&mut data, &down(50.0, 10.0));
        assert!(settings.borrow().vsync);
        inspector.event(&mut data, &down(50.0, 10.0));
        assert!(!settings.borrow().vsync);
    }

    #[test]
    fn test_slider_drag_sets_value() {
        let (settings, mut inspector, mut data) = setup();
        inspector.event(&mut data, &down(70.0, 30.0));
        assert!(inspector.is_dragging());
        assert!((settings.borrow().volume - 0.5).abs() < 1e-5);

        inspector.event(&mut data, &Event::MouseMove { x: 500.0, y: 30.0 });
        assert_eq!(settings.borrow().volume, 1.0);

        inspector.event(&mut data, &up(500.0, 30.0));
        assert!(!inspector.is_dragging());
        inspector.event(&mut data, &Event::MouseMove { x: 40.0, y: 30.0 });
        assert_eq!(settings.borrow().volume, 1.0);
    }

    #[test]
    fn test_read_only_row_is_not_edited() {
        let (settings, mut inspector, mut data) = setup();
        settings.borrow_mut().build = 7;
        let response = inspector.event(&mut data, &down(50.0, 50.0));
        assert_eq!(response, EventResponse::Handled);
        assert_eq!(settings.borrow().build, 7);
    }

    #[test]
    fn test_change_handler_reports_stored_value() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let settings = Rc::new(RefCell::new(Settings::default()));
        let mut inspector = PropertyInspector::new(settings)
            .on_change(move |name, value| log.borrow_mut().push((name, value.clone())));
        let mut data = WidgetData::new("inspector").with_bounds(Rect::new(0.0, 0.0, 100.0, 200.0));
        inspector.event(&mut data, &down(50.0, 5.0));
        assert_eq!(seen.borrow().as_slice(), &[("vsync", PropValue::Bool(true))]);
    }

    #[test]
    fn test_content_height() {
        assert_eq!(PropertyInspector::<Settings>::content_height(), 3.0 * ROW_HEIGHT);
    }
}
