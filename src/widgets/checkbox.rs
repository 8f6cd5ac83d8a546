use super::{Event, EventResponse, Key, MouseButton, Widget, WidgetData, WidgetFlags};
use crate::animation::{Animatable, SpringConfig, SpringState};
use crate::primitives::{Color, Rect};
use crate::renderer::PaintContext;

type ToggleHandler = Box<dyn FnMut(bool)>;

const SETTLE_THRESHOLD: f32 = 0.001;

/// Labelled toggle whose fill springs between the off and on colors.
pub struct Checkbox {
    label: String,
    checked: bool,
    /// Fill amount when the current spring started
    from: f32,
    spring: SpringState,
    config: SpringConfig,
    on_toggle: Option<ToggleHandler>,
}

impl Checkbox {
    pub fn new(label: impl Into<String>, checked: bool) -> Self {
        Self {
            label: label.into(),
            checked,
            from: if checked { 1.0 } else { 0.0 },
            spring: SpringState {
                position: 1.0,
                velocity: 0.0,
            },
            config: SpringConfig::new(300.0, 20.0),
            on_toggle: None,
        }
    }

    pub fn on_toggle(mut self, handler: impl FnMut(bool) + 'static) -> Self {
        self.on_toggle = Some(Box::new(handler));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Animates toward the new state without notifying.
    pub fn set_checked(&mut self, checked: bool) {
        if checked == self.checked {
            return;
        }
        self.from = self.fill();
        self.checked = checked;
        self.spring = SpringState::new();
    }

    /// Current fill amount, 0 when off and 1 when on.
    pub fn fill(&self) -> f32 {
        let target = if self.checked { 1.0 } else { 0.0 };
        <f32 as Animatable>::lerp(&self.from, &target, self.spring.position)
    }

    pub fn is_animating(&self) -> bool {
        !self.spring.is_settled(SETTLE_THRESHOLD)
    }

    fn toggle(&mut self) {
        self.set_checked(!self.checked);
        if let Some(handler) = self.on_toggle.as_mut() {
            handler(self.checked);
        }
    }
}

impl std::fmt::Debug for Checkbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checkbox")
            .field("label", &self.label)
            .field("checked", &self.checked)
            .field("fill", &self.fill())
            .finish_non_exhaustive()
    }
}

impl Widget for Checkbox {
    fn default_flags(&self) -> WidgetFlags {
        WidgetFlags::CAPTURES_MOUSE | WidgetFlags::FOCUSABLE
    }

    fn update(&mut self, _data: &mut WidgetData, dt: f32) {
        if self.is_animating() {
            self.spring.step(dt, &self.config);
        } else {
            self.spring.position = 1.0;
            self.spring.velocity = 0.0;
        }
    }

    fn draw(&self, data: &WidgetData, ctx: &mut PaintContext) {
        let theme = ctx.theme;
        let opacity = data.style.opacity;
        let bounds = data.bounds;
        let side = bounds.height.min(theme.widget_height) * 0.7;
        let square = Rect::new(
            bounds.x,
            bounds.y + (bounds.height - side) * 0.5,
            side,
            side,
        );

        let off = if data.is_hovered() {
            theme.input_bg_hover
        } else {
            theme.input_bg
        };
        let on = if data.is_enabled() {
            theme.accent
        } else {
            theme.text_disabled
        };
        let fill = Color::lerp(&off, &on, self.fill().clamp(0.0, 1.0));
        let border = if data.is_focused() {
            theme.border_focused
        } else {
            theme.border_primary
        };
        ctx.draw_box(
            square,
            fill.fade(opacity),
            theme.border_radius,
            Some((border.fade(opacity), theme.border_width)),
        );

        let mark = (self.fill() * side * 0.5).max(0.0);
        if mark > 0.5 {
            ctx.draw_list.add_filled_rect(
                Rect::new(
                    square.center().x - mark * 0.5,
                    square.center().y - mark * 0.5,
                    mark,
                    mark,
                ),
                Color::WHITE.fade(opacity),
            );
        }

        let text = if data.is_enabled() {
            theme.text_primary
        } else {
            theme.text_disabled
        };
        let label_rect = Rect::new(
            square.right(),
            bounds.y,
            (bounds.right() - square.right()).max(0.0),
            bounds.height,
        );
        ctx.draw_text_in(label_rect, theme.padding * 0.75, &self.label, text.fade(opacity));
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
                self.toggle();
                EventResponse::Handled
            }
            Event::KeyDown {
                key: Key::Space | Key::Enter,
                ..
            } if data.is_focused() => {
                self.toggle();
                EventResponse::Handled
            }
            _ => EventResponse::Ignored,
        }
    }

    crate::impl_as_any!();
}
