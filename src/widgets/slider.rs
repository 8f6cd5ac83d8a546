use super::{Event, EventResponse, Key, MouseButton, Widget, WidgetData, WidgetFlags};
use crate::primitives::{Color, Rect, Vec2};
use crate::renderer::{PaintContext, DEFAULT_CIRCLE_SEGMENTS};

type ValueHandler = Box<dyn FnMut(f32)>;

/// Horizontal value slider. Pressing jumps to the pointer and drags until
/// release; arrow keys step while focused.
pub struct Slider {
    value: f32,
    min: f32,
    max: f32,
    /// Keyboard increment; zero means one hundredth of the range
    step: f32,
    dragging: bool,
    on_change: Option<ValueHandler>,
}

impl Slider {
    pub fn new(min: f32, max: f32, value: f32) -> Self {
        let mut slider = Self {
            value: 0.0,
            min: 0.0,
            max: 1.0,
            step: 0.0,
            dragging: false,
            on_change: None,
        };
        slider.set_range(min, max);
        slider.set_value(value);
        slider
    }

    pub fn step(mut self, step: f32) -> Self {
        self.step = if step.is_finite() { step.abs() } else { 0.0 };
        self
    }

    pub fn on_change(mut self, handler: impl FnMut(f32) + 'static) -> Self {
        self.on_change = Some(Box::new(handler));
        self
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Clamp into the range without notifying.
    pub fn set_value(&mut self, value: f32) {
        self.value = if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        };
    }

    /// Bounds are reordered when given backwards.
    pub fn set_range(&mut self, min: f32, max: f32) {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.min = min;
        self.max = max;
        self.set_value(self.value);
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Position of the value in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        let span = self.max - self.min;
        if span > 0.0 {
            (self.value - self.min) / span
        } else {
            0.0
        }
    }

    fn change_to(&mut self, value: f32) {
        let old = self.value;
        self.set_value(value);
        if self.value != old {
            if let Some(handler) = self.on_change.as_mut() {
                handler(self.value);
            }
        }
    }

    fn slide_to(&mut self, bounds: Rect, x: f32) {
        let t = if bounds.width > 0.0 {
            ((x - bounds.x) / bounds.width).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.change_to(self.min + (self.max - self.min) * t);
    }

    fn key_step(&self) -> f32 {
        if self.step > 0.0 {
            self.step
        } else {
            (self.max - self.min) / 100.0
        }
    }
}

impl std::fmt::Debug for Slider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slider")
            .field("value", &self.value)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("dragging", &self.dragging)
            .finish_non_exhaustive()
    }
}

impl Widget for Slider {
    fn default_flags(&self) -> WidgetFlags {
        WidgetFlags::CAPTURES_MOUSE | WidgetFlags::FOCUSABLE
    }

    fn draw(&self, data: &WidgetData, ctx: &mut PaintContext) {
        let theme = ctx.theme;
        let bounds = data.bounds;
        let radius = bounds.height * 0.5;
        let opacity = data.style.opacity;
        ctx.draw_list
            .add_round_rect(bounds, theme.input_bg.fade(opacity), radius);

        let t = self.fraction();
        let filled = Rect::new(bounds.x, bounds.y, bounds.width * t, bounds.height);
        let accent = if data.is_enabled() {
            theme.accent
        } else {
            theme.text_disabled
        };
        ctx.draw_list
            .add_round_rect(filled, accent.fade(opacity), radius);

        let handle = if self.dragging {
            theme.accent_active
        } else if data.is_hovered() {
            theme.accent_hover
        } else {
            Color::WHITE
        };
        ctx.draw_list.add_circle(
            Vec2::new(bounds.x + bounds.width * t, bounds.center().y),
            radius,
            handle.fade(opacity),
            DEFAULT_CIRCLE_SEGMENTS,
        );
        if data.is_focused() {
            ctx.draw_list
                .add_rect(bounds.expand(1.0), theme.border_focused, theme.border_width);
        }
    }

    fn event(&mut self, data: &mut WidgetData, event: &Event) -> EventResponse {
        if !data.is_enabled() {
            return EventResponse::Ignored;
        }
        match *event {
            Event::MouseDown {
                x,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = true;
                data.set_flag(WidgetFlags::PRESSED, true);
                self.slide_to(data.bounds, x);
                EventResponse::Handled
            }
            Event::MouseMove { x, .. } if self.dragging => {
                self.slide_to(data.bounds, x);
                EventResponse::Handled
            }
            Event::MouseUp {
                button: MouseButton::Left,
                ..
            } if self.dragging => {
                self.dragging = false;
                data.set_flag(WidgetFlags::PRESSED, false);
                EventResponse::Handled
            }
            Event::KeyDown { key, .. } if data.is_focused() => {
                let step = self.key_step();
                match key {
                    Key::Left | Key::Down => self.change_to(self.value - step),
                    Key::Right | Key::Up => self.change_to(self.value + step),
                    Key::Home => self.change_to(self.min),
                    Key::End => self.change_to(self.max),
                    _ => return EventResponse::Ignored,
                }
                EventResponse::Handled
            }
            _ => EventResponse::Ignored,
        }
    }

    crate::impl_as_any!();
}
