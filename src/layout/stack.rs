use super::{non_negative, Align, AxisSpec, LayoutItem};
use crate::layout::Axis;
use crate::primitives::Rect;

/// Overlay every item on `content`.
///
/// Each item takes its preferred size, or fills when unset, clamped to
/// `[min, max]` and placed by its own `align_x`/`align_y`.
pub fn layout_stack(content: Rect, items: &[LayoutItem]) -> Vec<Rect> {
    items
        .iter()
        .map(|item| {
            let (x, width) = place(
                content.x,
                content.width,
                item.spec.main(Axis::Horizontal),
                item.spec.align_x,
            );
            let (y, height) = place(
                content.y,
                content.height,
                item.spec.main(Axis::Vertical),
                item.spec.align_y,
            );
            Rect::new(x, y, width, height)
        })
        .collect()
}

fn place(origin: f32, extent: f32, axis: AxisSpec, align: Align) -> (f32, f32) {
    let room = (non_negative(extent) - axis.margins()).max(0.0);
    let size = match align {
        Align::Stretch => axis.clamp(room),
        _ if axis.preferred > 0.0 => axis.clamp(axis.preferred),
        _ => axis.clamp(room),
    };
    let offset = match align {
        Align::Start | Align::Stretch => 0.0,
        Align::Center => (room - size) / 2.0,
        Align::End => room - size,
    };
    (origin + axis.margin_start + offset.max(0.0), size)
}
