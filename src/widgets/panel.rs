use super::{draw_background, Widget, WidgetData};
use crate::primitives::Rect;
use crate::renderer::PaintContext;

/// A styled box, optionally with a title strip. Children are laid out by
/// the panel's [`LayoutSpec`](crate::layout::LayoutSpec).
#[derive(Debug, Default)]
pub struct Panel {
    title: Option<String>,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }
}

impl Widget for Panel {
    fn draw(&self, data: &WidgetData, ctx: &mut PaintContext) {
        draw_background(data, ctx);
        if let Some(title) = &self.title {
            let theme = ctx.theme;
            let strip = Rect::new(
                data.bounds.x,
                data.bounds.y,
                data.bounds.width,
                theme.widget_height.min(data.bounds.height),
            );
            ctx.draw_box(strip, theme.bg_header, 0.0, None);
            ctx.draw_text_in(strip, theme.padding, title, theme.text_primary);
        }
    }

    crate::impl_as_any!();
}
