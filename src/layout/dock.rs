use super::{non_negative, Axis, DockSide, LayoutItem};
use crate::primitives::Rect;

/// Strip height for `Top`/`Bottom` children without a preferred height.
pub const DEFAULT_DOCK_STRIP_EXTENT: f32 = 30.0;
/// Strip width for `Left`/`Right` children without a preferred width.
pub const DEFAULT_DOCK_SIDE_EXTENT: f32 = 200.0;

/// Carve edge strips out of `content` in insertion order, then hand the
/// remainder to every `Fill` item.
///
/// Items docked to [`DockSide::None`] get `None` and keep their bounds.
pub fn layout_dock(content: Rect, items: &[LayoutItem]) -> Vec<Option<Rect>> {
    let mut remaining = Rect::new(
        content.x,
        content.y,
        non_negative(content.width),
        non_negative(content.height),
    );
    let mut rects = vec![None; items.len()];

    for (slot, item) in rects.iter_mut().zip(items) {
        let side = item.spec.dock;
        let axis = match side {
            DockSide::Top | DockSide::Bottom => Axis::Vertical,
            DockSide::Left | DockSide::Right => Axis::Horizontal,
            DockSide::Fill | DockSide::None => continue,
        };
        let spec = item.spec.main(axis);
        let fallback = match axis {
            Axis::Vertical => DEFAULT_DOCK_STRIP_EXTENT,
            Axis::Horizontal => DEFAULT_DOCK_SIDE_EXTENT,
        };
        let wanted = if spec.preferred > 0.0 {
            spec.preferred
        } else {
            fallback
        };
        let available = match axis {
            Axis::Vertical => remaining.height,
            Axis::Horizontal => remaining.width,
        };
        let extent = (spec.clamp(wanted) + spec.margins()).min(available).max(0.0);

        let strip = match side {
            DockSide::Top => {
                let strip = Rect::new(remaining.x, remaining.y, remaining.width, extent);
                remaining.y += extent;
                remaining.height -= extent;
                strip
            }
            DockSide::Bottom => {
                remaining.height -= extent;
                Rect::new(remaining.x, remaining.bottom(), remaining.width, extent)
            }
            DockSide::Left => {
                let strip = Rect::new(remaining.x, remaining.y, extent, remaining.height);
                remaining.x += extent;
                remaining.width -= extent;
                strip
            }
            DockSide::Right => {
                remaining.width -= extent;
                Rect::new(remaining.right(), remaining.y, extent, remaining.height)
            }
            DockSide::Fill | DockSide::None => continue,
        };
        *slot = Some(strip.inset(item.spec.margin));
    }

    for (slot, item) in rects.iter_mut().zip(items) {
        if item.spec.dock == DockSide::Fill {
            *slot = Some(remaining.inset(item.spec.margin));
        }
    }
    rects
}
