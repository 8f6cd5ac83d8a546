use super::{Widget, WidgetData};
use crate::layout::{Axis, LayoutSpec};
use crate::primitives::Rect;
use crate::renderer::PaintContext;

/// One-pixel rule between groups of widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separator {
    axis: Axis,
}

impl Separator {
    /// A line running left to right.
    pub fn horizontal() -> Self {
        Self {
            axis: Axis::Horizontal,
        }
    }

    pub fn vertical() -> Self {
        Self {
            axis: Axis::Vertical,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Thin on the cross axis and stretched along the line.
    pub fn layout_spec(&self) -> LayoutSpec {
        match self.axis {
            Axis::Horizontal => LayoutSpec::default().height(1.0).grow(0.0).min(0.0, 1.0),
            Axis::Vertical => LayoutSpec::default().width(1.0).grow(0.0).min(1.0, 0.0),
        }
    }
}

impl Widget for Separator {
    fn draw(&self, data: &WidgetData, ctx: &mut PaintContext) {
        let b = data.bounds;
        let line = match self.axis {
            Axis::Horizontal => Rect::new(b.x, b.center().y - 0.5, b.width, 1.0),
            Axis::Vertical => Rect::new(b.center().x - 0.5, b.y, 1.0, b.height),
        };
        let color = ctx.theme.border_secondary.fade(data.style.opacity);
        ctx.draw_list.add_filled_rect(line, color);
    }

    crate::impl_as_any!();
}
