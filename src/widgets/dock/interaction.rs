//! Geometry shared by the dock's hit-testing and drawing.

use super::node::DockNode;
use crate::primitives::{Rect, Vec2};
use crate::theme::Theme;

/// Fraction of a leaf's extent that counts as an edge drop band.
pub const DROP_BAND: f32 = 0.3;
/// Pointer travel before a pressed tab turns into a drag.
pub const DRAG_THRESHOLD: f32 = 4.0;
const CLOSE_SIZE: f32 = 12.0;
const CLOSE_INSET: f32 = 6.0;
const CONTENT_INSET: f32 = 2.0;

/// Where a dragged tab lands relative to the leaf under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropZone {
    Left,
    Right,
    Top,
    Bottom,
    /// Into the leaf's own tab list
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DockMetrics {
    pub tab_height: f32,
    pub tab_width: f32,
    pub splitter_size: f32,
}

impl DockMetrics {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            tab_height: theme.tab_height,
            tab_width: theme.tab_width,
            splitter_size: theme.splitter_size,
        }
    }

    pub fn tab_bar(&self, leaf: Rect) -> Rect {
        Rect::new(leaf.x, leaf.y, leaf.width, self.tab_height.min(leaf.height))
    }

    pub fn tab_rect(&self, leaf: Rect, index: usize) -> Rect {
        let bar = self.tab_bar(leaf);
        Rect::new(
            bar.x + index as f32 * self.tab_width,
            bar.y,
            self.tab_width,
            bar.height,
        )
    }

    pub fn close_rect(&self, tab: Rect) -> Rect {
        Rect::new(
            tab.right() - CLOSE_INSET - CLOSE_SIZE,
            tab.y + CLOSE_INSET,
            CLOSE_SIZE,
            CLOSE_SIZE,
        )
    }

    /// Area given to the active tab's content.
    pub fn content_rect(&self, leaf: Rect) -> Rect {
        let bar = self.tab_bar(leaf);
        Rect::new(
            leaf.x,
            bar.bottom(),
            leaf.width,
            (leaf.height - bar.height).max(0.0),
        )
        .shrink(CONTENT_INSET)
    }

    /// Index of the tab under `point`, if the point is on a tab of `leaf`.
    pub fn tab_index_at(&self, leaf: &DockNode, point: Vec2) -> Option<usize> {
        let bar = self.tab_bar(leaf.bounds());
        if !bar.contains(point) || self.tab_width <= 0.0 {
            return None;
        }
        let index = ((point.x - bar.x) / self.tab_width) as usize;
        (index < leaf.tabs().len()).then_some(index)
    }
}

impl Default for DockMetrics {
    fn default() -> Self {
        Self::from_theme(&Theme::dark())
    }
}

/// The nearest edge band containing `point`, or `Fill` in the middle.
pub fn drop_zone(leaf: Rect, point: Vec2) -> DropZone {
    if leaf.width <= 0.0 || leaf.height <= 0.0 {
        return DropZone::Fill;
    }
    let rx = (point.x - leaf.x) / leaf.width;
    let ry = (point.y - leaf.y) / leaf.height;
    let candidates = [
        (rx, DropZone::Left),
        (1.0 - rx, DropZone::Right),
        (ry, DropZone::Top),
        (1.0 - ry, DropZone::Bottom),
    ];
    let (distance, zone) = candidates
        .into_iter()
        .fold((f32::INFINITY, DropZone::Fill), |best, c| {
            if c.0 < best.0 {
                c
            } else {
                best
            }
        });
    if distance < DROP_BAND {
        zone
    } else {
        DropZone::Fill
    }
}

/// Region highlighted while hovering `zone` of `leaf`.
pub fn drop_preview(leaf: Rect, zone: DropZone) -> Rect {
    let half_w = leaf.width * 0.5;
    let half_h = leaf.height * 0.5;
    match zone {
        DropZone::Left => Rect::new(leaf.x, leaf.y, half_w, leaf.height),
        DropZone::Right => Rect::new(leaf.x + half_w, leaf.y, half_w, leaf.height),
        DropZone::Top => Rect::new(leaf.x, leaf.y, leaf.width, half_h),
        DropZone::Bottom => Rect::new(leaf.x, leaf.y + half_h, leaf.width, half_h),
        DropZone::Fill => leaf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_zone_bands() {
        let leaf = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(drop_zone(leaf, Vec2::new(10.0, 50.0)), DropZone::Left);
        assert_eq!(drop_zone(leaf, Vec2::new(90.0, 50.0)), DropZone::Right);
        assert_eq!(drop_zone(leaf, Vec2::new(50.0, 5.0)), DropZone::Top);
        assert_eq!(drop_zone(leaf, Vec2::new(50.0, 95.0)), DropZone::Bottom);
        assert_eq!(drop_zone(leaf, Vec2::new(50.0, 50.0)), DropZone::Fill);
        // Corner goes to the closer edge.
        assert_eq!(drop_zone(leaf, Vec2::new(5.0, 20.0)), DropZone::Left);
    }

    #[test]
    fn test_tab_geometry() {
        let m = DockMetrics {
            tab_height: 30.0,
            tab_width: 120.0,
            splitter_size: 4.0,
        };
        let leaf = Rect::new(0.0, 0.0, 400.0, 300.0);
        assert_eq!(m.tab_rect(leaf, 1), Rect::new(120.0, 0.0, 120.0, 30.0));
        assert_eq!(
            m.close_rect(m.tab_rect(leaf, 0)),
            Rect::new(102.0, 6.0, 12.0, 12.0)
        );
        assert_eq!(m.content_rect(leaf), Rect::new(2.0, 32.0, 396.0, 266.0));
    }

    #[test]
    fn test_drop_preview_halves() {
        let leaf = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(
            drop_preview(leaf, DropZone::Right),
            Rect::new(50.0, 0.0, 50.0, 50.0)
        );
        assert_eq!(drop_preview(leaf, DropZone::Fill), leaf);
    }
}
