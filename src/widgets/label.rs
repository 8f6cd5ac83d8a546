use super::{Widget, WidgetData};
use crate::primitives::{Color, Vec2};
use crate::renderer::PaintContext;

/// Single- or multi-line text drawn with the default font.
#[derive(Debug, Clone)]
pub struct Label {
    text: String,
    color: Option<Color>,
    wrap: bool,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            wrap: false,
        }
    }

    /// Defaults to the theme's primary text color.
    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Wrap at the widget's width.
    pub fn wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl Widget for Label {
    fn draw(&self, data: &WidgetData, ctx: &mut PaintContext) {
        let color = match (data.is_enabled(), self.color) {
            (false, _) => ctx.theme.text_disabled,
            (true, Some(color)) => color,
            (true, None) => ctx.theme.text_primary,
        };
        let color = color.fade(data.style.opacity);
        let content = data.content_rect();
        let max_width = if self.wrap { content.width } else { 0.0 };
        ctx.draw_text(
            Vec2::new(content.x, content.y),
            &self.text,
            color,
            max_width,
        );
    }

    crate::impl_as_any!();
}
