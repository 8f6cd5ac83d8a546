//! Immediate-mode helpers.
//!
//! Called between [`UiContext::begin_frame`] and [`UiContext::end_frame`],
//! each helper hit-tests its rectangle against this frame's pointer, draws
//! itself straight into the draw list and returns what happened. Widgets are
//! identified by caller-chosen `u32` ids so that a press can be tracked
//! across frames: the *hot* widget is under the pointer, the *active* one
//! owns the current press. Immediate geometry is emitted before the retained
//! tree is drawn, so retained widgets appear on top.

use crate::context::UiContext;
use crate::input::{InputState, MouseButton};
use crate::primitives::{Color, Rect, Vec2};
use crate::renderer::RenderBackend;

const CHECK_LABEL_GAP: f32 = 8.0;

#[derive(Debug, Clone, Default)]
pub struct ImmediateState {
    hot: Option<u32>,
    active: Option<u32>,
    mouse_pos: Vec2,
    mouse_down: bool,
    mouse_pressed: bool,
    /// Whether the active widget was submitted this frame
    active_seen: bool,
}

impl ImmediateState {
    pub(crate) fn begin(&mut self, input: &InputState) {
        self.mouse_pos = input.mouse_pos();
        self.mouse_down = input.is_mouse_down(MouseButton::Left);
        self.mouse_pressed = input.is_mouse_pressed(MouseButton::Left);
        self.hot = None;
        self.active_seen = false;
    }

    /// Forget a press whose widget stopped being submitted.
    pub(crate) fn end(&mut self) {
        if !self.active_seen {
            self.active = None;
        }
    }

    pub fn hot(&self) -> Option<u32> {
        self.hot
    }

    pub fn active(&self) -> Option<u32> {
        self.active
    }

    fn interact(&mut self, id: u32, rect: Rect) -> bool {
        let hovered = rect.contains(self.mouse_pos);
        if hovered {
            self.hot = Some(id);
            if self.mouse_pressed && self.active.is_none() {
                self.active = Some(id);
            }
        }
        if self.active == Some(id) {
            self.active_seen = true;
        }
        hovered
    }

    /// True once when a press that started on `id` is released over it.
    fn released_on(&mut self, id: u32, hovered: bool) -> bool {
        if self.active == Some(id) && !self.mouse_down {
            self.active = None;
            return hovered;
        }
        false
    }
}

impl<B: RenderBackend> UiContext<B> {
    fn immediate_ready(&self, what: &str) -> bool {
        if !self.is_in_frame() {
            log::error!("immediate {} called outside begin_frame/end_frame", what);
            return false;
        }
        true
    }

    /// Push button; returns true on the frame it is clicked.
    pub fn button(&mut self, id: u32, rect: Rect, label: &str) -> bool {
        if !self.immediate_ready("button") {
            return false;
        }
        let hovered = self.immediate.interact(id, rect);
        let clicked = self.immediate.released_on(id, hovered);
        let active = self.immediate.active() == Some(id);

        let mut ctx = self.painter();
        let theme = ctx.theme;
        let fill = if active {
            theme.accent_active
        } else if hovered {
            theme.bg_surface_hover
        } else {
            theme.bg_surface
        };
        let border = if hovered {
            theme.border_focused
        } else {
            theme.border_primary
        };
        ctx.draw_box(rect, fill, theme.border_radius, Some((border, theme.border_width)));
        if !label.is_empty() {
            let size = ctx.measure_text(label);
            let pos = Vec2::new(
                rect.x + (rect.width - size.width) * 0.5,
                rect.y + (rect.height - size.height) * 0.5,
            );
            ctx.draw_text(pos, label, theme.text_primary, 0.0);
        }
        clicked
    }

    /// Square box at the left of `rect` followed by `label`; returns true when toggled.
    pub fn checkbox(&mut self, id: u32, rect: Rect, value: &mut bool, label: &str) -> bool {
        if !self.immediate_ready("checkbox") {
            return false;
        }
        let box_rect = Rect::new(rect.x, rect.y, rect.height, rect.height);
        let hovered = self.immediate.interact(id, box_rect);
        let toggled = self.immediate.released_on(id, hovered);
        if toggled {
            *value = !*value;
        }

        let mut ctx = self.painter();
        let theme = ctx.theme;
        let fill = match (*value, hovered) {
            (true, true) => theme.accent_hover,
            (true, false) => theme.accent,
            (false, true) => theme.input_bg_hover,
            (false, false) => theme.input_bg,
        };
        ctx.draw_box(box_rect, fill, 4.0, Some((theme.border_primary, 1.0)));
        if *value {
            let s = box_rect.height;
            let start = Vec2::new(box_rect.x + s * 0.25, box_rect.y + s * 0.5);
            let knee = start + Vec2::new(s * 0.2, s * 0.2);
            let end = start + Vec2::new(s * 0.5, -s * 0.2);
            ctx.draw_list.add_line(start, knee, Color::WHITE, 2.0);
            ctx.draw_list.add_line(knee, end, Color::WHITE, 2.0);
        }
        if !label.is_empty() {
            let label_rect = Rect::new(
                box_rect.right() + CHECK_LABEL_GAP,
                rect.y,
                (rect.width - box_rect.width - CHECK_LABEL_GAP).max(0.0),
                rect.height,
            );
            ctx.draw_text_in(label_rect, 0.0, label, theme.text_primary);
        }
        toggled
    }

    /// Horizontal slider; returns the possibly edited value.
    pub fn slider(&mut self, id: u32, rect: Rect, value: f32, min: f32, max: f32) -> f32 {
        if !self.immediate_ready("slider") {
            return value;
        }
        self.immediate.interact(id, rect);
        let mut value = value;
        if self.immediate.active() == Some(id) {
            if self.immediate.mouse_down {
                let t = if rect.width > 0.0 {
                    ((self.immediate.mouse_pos.x - rect.x) / rect.width).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                value = min + (max - min) * t;
            } else {
                self.immediate.active = None;
            }
        }

        let mut ctx = self.painter();
        let theme = ctx.theme;
        let radius = rect.height * 0.5;
        ctx.draw_box(rect, theme.input_bg, radius, None);
        let t = if max != min {
            ((value - min) / (max - min)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let filled = Rect::new(rect.x, rect.y, rect.width * t, rect.height);
        ctx.draw_box(filled, theme.accent, radius, None);
        let knob = Vec2::new(rect.x + rect.width * t, rect.y + radius);
        ctx.draw_list.add_circle(knob, radius + 2.0, theme.text_primary, 16);
        value
    }

    /// Text vertically centered in `rect`; `None` uses the theme's primary text color.
    pub fn label(&mut self, rect: Rect, text: &str, color: Option<Color>) {
        if !self.immediate_ready("label") {
            return;
        }
        let mut ctx = self.painter();
        let color = color.unwrap_or(ctx.theme.text_primary);
        ctx.draw_text_in(rect, 0.0, text, color);
    }

    pub fn panel(&mut self, rect: Rect, color: Color) {
        if !self.immediate_ready("panel") {
            return;
        }
        let mut ctx = self.painter();
        let radius = ctx.theme.border_radius;
        ctx.draw_box(rect, color, radius, None);
    }

    pub fn hot_id(&self) -> Option<u32> {
        self.immediate.hot()
    }

    pub fn active_id(&self) -> Option<u32> {
        self.immediate.active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::UiConfig;
    use crate::renderer::HeadlessBackend;

    fn context() -> UiContext<HeadlessBackend> {
        let mut ctx = UiContext::new(UiConfig::default());
        ctx.initialize(HeadlessBackend::new()).unwrap();
        ctx
    }

    fn frame(
        ctx: &mut UiContext<HeadlessBackend>,
        input: &mut InputState,
        f: impl FnOnce(&mut UiContext<HeadlessBackend>),
    ) {
        ctx.begin_frame(1.0 / 60.0, input).unwrap();
        f(ctx);
        ctx.end_frame().unwrap();
        input.next_frame();
    }

    #[test]
    fn test_button_clicks_on_release_inside() {
        let mut ctx = context();
        let mut input = InputState::new();
        let rect = Rect::new(10.0, 10.0, 100.0, 30.0);
        input.set_mouse_pos(Vec2::new(20.0, 20.0));
        input.set_mouse_button(MouseButton::Left, true);

        let mut clicked = false;
        frame(&mut ctx, &mut input, |ctx| clicked = ctx.button(1, rect, "Go"));
        assert!(!clicked);
        assert_eq!(ctx.active_id(), Some(1));

        input.set_mouse_button(MouseButton::Left, false);
        frame(&mut ctx, &mut input, |ctx| clicked = ctx.button(1, rect, "Go"));
        assert!(clicked);
        assert_eq!(ctx.active_id(), None);
    }

    #[test]
    fn test_press_dragged_off_does_not_click() {
        let mut ctx = context();
        let mut input = InputState::new();
        let rect = Rect::new(10.0, 10.0, 100.0, 30.0);
        input.set_mouse_pos(Vec2::new(20.0, 20.0));
        input.set_mouse_button(MouseButton::Left, true);
        frame(&mut ctx, &mut input, |ctx| {
            ctx.button(1, rect, "Go");
        });

        input.set_mouse_pos(Vec2::new(500.0, 500.0));
        input.set_mouse_button(MouseButton::Left, false);
        let mut clicked = true;
        frame(&mut ctx, &mut input, |ctx| clicked = ctx.button(1, rect, "Go"));
        assert!(!clicked);
    }

    #[test]
    fn test_checkbox_toggles() {
        let mut ctx = context();
        let mut input = InputState::new();
        let rect = Rect::new(0.0, 0.0, 150.0, 20.0);
        let mut value = false;
        input.set_mouse_pos(Vec2::new(5.0, 5.0));
        input.set_mouse_button(MouseButton::Left, true);
        frame(&mut ctx, &mut input, |ctx| {
            ctx.checkbox(2, rect, &mut value, "vsync");
        });
        input.set_mouse_button(MouseButton::Left, false);
        frame(&mut ctx, &mut input, |ctx| {
            assert!(ctx.checkbox(2, rect, &mut value, "vsync"));
        });
        assert!(value);
    }

    #[test]
    fn test_slider_follows_pointer_while_held() {
        let mut ctx = context();
        let mut input = InputState::new();
        let rect = Rect::new(0.0, 0.0, 200.0, 10.0);
        let mut value = 0.0;
        input.set_mouse_pos(Vec2::new(50.0, 5.0));
        input.set_mouse_button(MouseButton::Left, true);
        frame(&mut ctx, &mut input, |ctx| value = ctx.slider(3, rect, value, 0.0, 100.0));
        assert_eq!(value, 25.0);

        // Still held outside the track: clamps to the end.
        input.set_mouse_pos(Vec2::new(400.0, 80.0));
        frame(&mut ctx, &mut input, |ctx| value = ctx.slider(3, rect, value, 0.0, 100.0));
        assert_eq!(value, 100.0);

        input.set_mouse_button(MouseButton::Left, false);
        input.set_mouse_pos(Vec2::new(0.0, 5.0));
        frame(&mut ctx, &mut input, |ctx| value = ctx.slider(3, rect, value, 0.0, 100.0));
        assert_eq!(value, 100.0);
        assert_eq!(ctx.active_id(), None);
    }

    #[test]
    fn test_hot_tracks_pointer() {
        let mut ctx = context();
        let mut input = InputState::new();
        input.set_mouse_pos(Vec2::new(15.0, 15.0));
        frame(&mut ctx, &mut input, |ctx| {
            ctx.button(7, Rect::new(10.0, 10.0, 10.0, 10.0), "");
            ctx.button(8, Rect::new(40.0, 10.0, 10.0, 10.0), "");
            assert_eq!(ctx.hot_id(), Some(7));
        });
    }

    #[test]
    fn test_helpers_outside_frame_do_nothing() {
        let mut ctx = context();
        assert!(!ctx.button(1, Rect::new(0.0, 0.0, 10.0, 10.0), "x"));
        assert_eq!(ctx.slider(2, Rect::new(0.0, 0.0, 10.0, 10.0), 0.5, 0.0, 1.0), 0.5);
        assert!(ctx.draw_list().is_empty());
    }
}
