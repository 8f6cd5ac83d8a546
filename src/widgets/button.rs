use super::{Event, EventResponse, Key, MouseButton, Widget, WidgetData, WidgetFlags};
use crate::primitives::Vec2;
use crate::renderer::PaintContext;

type ClickHandler = Box<dyn FnMut()>;

/// Push button. Fires its click handler when the left button is released
/// inside the bounds after being pressed there, or on Enter/Space while focused.
pub struct Button {
    label: String,
    on_click: Option<ClickHandler>,
    clicks: u32,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            on_click: None,
            clicks: 0,
        }
    }

    pub fn on_click(mut self, handler: impl FnMut() + 'static) -> Self {
        self.on_click = Some(Box::new(handler));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Number of completed clicks since creation.
    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    fn click(&mut self) {
        self.clicks += 1;
        if let Some(handler) = self.on_click.as_mut() {
            handler();
        }
    }
}

impl std::fmt::Debug for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Button")
            .field("label", &self.label)
            .field("clicks", &self.clicks)
            .finish_non_exhaustive()
    }
}

impl Widget for Button {
    fn default_flags(&self) -> WidgetFlags {
        WidgetFlags::CAPTURES_MOUSE | WidgetFlags::FOCUSABLE
    }

    fn draw(&self, data: &WidgetData, ctx: &mut PaintContext) {
        let theme = ctx.theme;
        let (fill, text) = if !data.is_enabled() {
            (theme.bg_surface, theme.text_disabled)
        } else if data.is_pressed() {
            (theme.accent_active, theme.text_primary)
        } else if data.is_hovered() {
            (theme.accent_hover, theme.text_primary)
        } else {
            (theme.accent, theme.text_primary)
        };
        let opacity = data.style.opacity;
        let border = data
            .is_focused()
            .then_some((theme.border_focused.fade(opacity), theme.border_width));
        ctx.draw_box(data.bounds, fill.fade(opacity), theme.border_radius, border);

        let size = ctx.measure_text(&self.label);
        let center = data.bounds.center();
        ctx.draw_text(
            Vec2::new(center.x - size.width * 0.5, center.y - size.height * 0.5),
            &self.label,
            text.fade(opacity),
            0.0,
        );
    }

    fn event(&mut self, data: &mut WidgetData, event: &Event) -> EventResponse {
        if !data.is_enabled() {
            return EventResponse::Ignored;
        }
        match *event {
            Event::MouseDown {
                button: MouseButton::Left,
                ..
            } => {
                data.set_flag(WidgetFlags::PRESSED, true);
                EventResponse::Handled
            }
            Event::MouseUp {
                x,
                y,
                button: MouseButton::Left,
            } => {
                if !data.is_pressed() {
                    return EventResponse::Ignored;
                }
                data.set_flag(WidgetFlags::PRESSED, false);
                if data.bounds.contains(Vec2::new(x, y)) {
                    self.click();
                }
                EventResponse::Handled
            }
            Event::KeyDown {
                key: Key::Enter | Key::Space,
                ..
            } if data.is_focused() => {
                self.click();
                EventResponse::Handled
            }
            _ => EventResponse::Ignored,
        }
    }

    crate::impl_as_any!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Rect;
    use std::cell::Cell;
    use std::rc::Rc;

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
    fn test_click_fires_on_release_inside() {
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        let mut button = Button::new("OK").on_click(move || counter.set(counter.get() + 1));
        let mut data = WidgetData::new("ok").with_bounds(Rect::new(0.0, 0.0, 80.0, 24.0));

        assert_eq!(button.event(&mut data, &down(10.0, 10.0)), EventResponse::Handled);
        assert!(data.is_pressed());
        button.event(&mut data, &up(12.0, 10.0));
        assert!(!data.is_pressed());
        assert_eq!(fired.get(), 1);
        assert_eq!(button.clicks(), 1);
    }

    #[test]
    fn test_release_outside_cancels() {
        let mut button = Button::new("OK");
        let mut data = WidgetData::new("ok").with_bounds(Rect::new(0.0, 0.0, 80.0, 24.0));
        button.event(&mut data, &down(10.0, 10.0));
        button.event(&mut data, &up(200.0, 10.0));
        assert_eq!(button.clicks(), 0);
    }

    #[test]
    fn test_release_without_press_passes_through() {
        let mut button = Button::new("OK");
        let mut data = WidgetData::new("ok").with_bounds(Rect::new(0.0, 0.0, 80.0, 24.0));
        assert_eq!(button.event(&mut data, &up(10.0, 10.0)), EventResponse::Ignored);
        assert_eq!(button.clicks(), 0);
    }

    #[test]
    fn test_keyboard_activation_needs_focus() {
        let mut button = Button::new("OK");
        let mut data = WidgetData::new("ok").with_bounds(Rect::new(0.0, 0.0, 80.0, 24.0));
        let enter = Event::KeyDown {
            key: Key::Enter,
            modifiers: Default::default(),
        };
        assert_eq!(button.event(&mut data, &enter), EventResponse::Ignored);
        data.set_flag(WidgetFlags::FOCUSED, true);
        assert_eq!(button.event(&mut data, &enter), EventResponse::Handled);
        assert_eq!(button.clicks(), 1);
    }

    #[test]
    fn test_disabled_ignores_input() {
        let mut button = Button::new("OK");
        let mut data = WidgetData::new("ok")
            .with_bounds(Rect::new(0.0, 0.0, 80.0, 24.0))
            .without_flags(WidgetFlags::ENABLED);
        assert_eq!(button.event(&mut data, &down(10.0, 10.0)), EventResponse::Ignored);
        assert!(!data.is_pressed());
    }
}
