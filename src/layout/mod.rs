//! Stateless layout engine.
//!
//! [`compute_layout`] walks the widget tree from a root whose bounds are
//! already set, derives every visible child's bounds from its parent's
//! [`LayoutMode`], recurses, and clears `NEEDS_LAYOUT` on the way back.
//! The per-mode algorithms are pure functions over [`LayoutItem`] slices
//! so they can be exercised without a tree.
//!
//! Degenerate input never fails: NaN and negative sizes collapse to zero,
//! `min` wins over a smaller `max`, and flex, stack and dock children are
//! confined to the parent's content rectangle.

mod dock;
mod flex;
mod split;
mod stack;

pub use dock::{layout_dock, DEFAULT_DOCK_SIDE_EXTENT, DEFAULT_DOCK_STRIP_EXTENT};
pub use flex::layout_flex;
pub use split::split_rect;
pub use stack::layout_stack;

use crate::primitives::{Insets, Rect, Size};
use crate::tree::{Tree, WidgetId};
use crate::widgets::{Placement, WidgetFlags};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// How a container positions its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Children keep whatever bounds they were given.
    #[default]
    None,
    /// Row (`Horizontal`) or column (`Vertical`) with grow/shrink distribution.
    Flex(Axis),
    /// Children overlay the content rectangle.
    Stack,
    /// Edge strips carved in insertion order, remainder to `Fill` children.
    Dock,
    /// The widget's own `arrange` hook places its children.
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
    Stretch,
}

/// Distribution of leftover main-axis space when nothing grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MainAxisAlignment {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DockSide {
    /// Not docked; bounds are left untouched.
    None,
    Top,
    Bottom,
    Left,
    Right,
    #[default]
    Fill,
}

/// Layout inputs of a widget. Read by the engine, never written by it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSpec {
    pub mode: LayoutMode,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    /// Main-axis size before grow/shrink; `None` falls back to the preferred size
    pub flex_basis: Option<f32>,
    /// Space between flex children
    pub gap: f32,
    pub justify: MainAxisAlignment,
    pub padding: Insets,
    pub margin: Insets,
    pub min_size: Size,
    pub max_size: Size,
    /// Zero on an axis means "unset"
    pub preferred_size: Size,
    /// Alignment of this widget inside a stack parent, and of flex children
    /// on the cross axis when this widget is a column (`align_x`) or row (`align_y`)
    pub align_x: Align,
    pub align_y: Align,
    pub dock: DockSide,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            mode: LayoutMode::None,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: None,
            gap: 0.0,
            justify: MainAxisAlignment::Start,
            padding: Insets::ZERO,
            margin: Insets::ZERO,
            min_size: Size::zero(),
            max_size: Size::new(f32::INFINITY, f32::INFINITY),
            preferred_size: Size::zero(),
            align_x: Align::Start,
            align_y: Align::Start,
            dock: DockSide::Fill,
        }
    }
}

impl LayoutSpec {
    pub fn row() -> Self {
        Self {
            mode: LayoutMode::Flex(Axis::Horizontal),
            ..Self::default()
        }
    }

    pub fn column() -> Self {
        Self {
            mode: LayoutMode::Flex(Axis::Vertical),
            ..Self::default()
        }
    }

    pub fn stack() -> Self {
        Self {
            mode: LayoutMode::Stack,
            ..Self::default()
        }
    }

    pub fn dock() -> Self {
        Self {
            mode: LayoutMode::Dock,
            ..Self::default()
        }
    }

    pub fn custom() -> Self {
        Self {
            mode: LayoutMode::Custom,
            ..Self::default()
        }
    }

    pub fn grow(mut self, grow: f32) -> Self {
        self.flex_grow = grow;
        self
    }

    pub fn shrink(mut self, shrink: f32) -> Self {
        self.flex_shrink = shrink;
        self
    }

    pub fn basis(mut self, basis: f32) -> Self {
        self.flex_basis = Some(basis);
        self
    }

    pub fn gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    pub fn justify(mut self, justify: MainAxisAlignment) -> Self {
        self.justify = justify;
        self
    }

    pub fn padding(mut self, padding: impl Into<Insets>) -> Self {
        self.padding = padding.into();
        self
    }

    pub fn margin(mut self, margin: impl Into<Insets>) -> Self {
        self.margin = margin.into();
        self
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.preferred_size = Size::new(width, height);
        self
    }

    pub fn width(mut self, width: f32) -> Self {
        self.preferred_size.width = width;
        self
    }

    pub fn height(mut self, height: f32) -> Self {
        self.preferred_size.height = height;
        self
    }

    pub fn min(mut self, width: f32, height: f32) -> Self {
        self.min_size = Size::new(width, height);
        self
    }

    pub fn max(mut self, width: f32, height: f32) -> Self {
        self.max_size = Size::new(width, height);
        self
    }

    pub fn align(mut self, x: Align, y: Align) -> Self {
        self.align_x = x;
        self.align_y = y;
        self
    }

    pub fn docked(mut self, side: DockSide) -> Self {
        self.dock = side;
        self
    }

    pub(crate) fn main(&self, axis: Axis) -> AxisSpec {
        AxisSpec::of(self, axis)
    }
}

/// One axis of a [`LayoutSpec`], sanitized.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AxisSpec {
    pub preferred: f32,
    pub min: f32,
    pub max: f32,
    pub margin_start: f32,
    pub margin_end: f32,
}

impl AxisSpec {
    fn of(spec: &LayoutSpec, axis: Axis) -> Self {
        let (preferred, min, max, margin_start, margin_end) = match axis {
            Axis::Horizontal => (
                spec.preferred_size.width,
                spec.min_size.width,
                spec.max_size.width,
                spec.margin.left,
                spec.margin.right,
            ),
            Axis::Vertical => (
                spec.preferred_size.height,
                spec.min_size.height,
                spec.max_size.height,
                spec.margin.top,
                spec.margin.bottom,
            ),
        };
        Self {
            preferred: non_negative(preferred),
            min: non_negative(min),
            max: if max.is_nan() { f32::INFINITY } else { max.max(0.0) },
            margin_start: non_negative(margin_start),
            margin_end: non_negative(margin_end),
        }
    }

    pub fn margins(&self) -> f32 {
        self.margin_start + self.margin_end
    }

    pub fn clamp(&self, value: f32) -> f32 {
        clamp_extent(value, self.min, self.max)
    }
}

/// Input to the pure layout passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutItem {
    pub spec: LayoutSpec,
    /// Size from the previous frame, used when nothing else is known
    pub current: Size,
}

impl LayoutItem {
    pub fn new(spec: LayoutSpec) -> Self {
        Self {
            spec,
            current: Size::zero(),
        }
    }
}

/// NaN and negatives become zero; infinity is kept.
pub(crate) fn non_negative(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

/// Clamp into `[min, max]`, letting `min` win when the range is inverted.
pub fn clamp_extent(value: f32, min: f32, max: f32) -> f32 {
    let min = non_negative(min);
    let max = if max.is_nan() { f32::INFINITY } else { max.max(min) };
    non_negative(value).clamp(min, max)
}

/// Move and trim `rect` so it lies inside `area`, never with negative size.
pub fn confine(rect: Rect, area: Rect) -> Rect {
    let x = non_negative_coord(rect.x, area.x, area.right());
    let y = non_negative_coord(rect.y, area.y, area.bottom());
    let right = far_edge(rect.x, rect.width, x, area.right());
    let bottom = far_edge(rect.y, rect.height, y, area.bottom());
    Rect::new(x, y, right - x, bottom - y)
}

/// Replace NaN coordinates with `area`'s origin and bad extents with zero.
///
/// Custom containers may place children outside their content rectangle
/// (a scrolled list does), so their placements are sanitized, not confined.
pub fn sanitize(rect: Rect, area: Rect) -> Rect {
    let coord = |v: f32, fallback: f32| if v.is_finite() { v } else { fallback };
    let extent = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
    Rect::new(
        coord(rect.x, area.x),
        coord(rect.y, area.y),
        extent(rect.width),
        extent(rect.height),
    )
}

fn far_edge(start: f32, extent: f32, lo: f32, hi: f32) -> f32 {
    let edge = start + non_negative(extent);
    if edge.is_nan() {
        lo
    } else {
        edge.clamp(lo, hi.max(lo))
    }
}

fn non_negative_coord(value: f32, lo: f32, hi: f32) -> f32 {
    let value = if value.is_nan() { lo } else { value };
    value.clamp(lo, hi.max(lo))
}

/// Lay out the subtree under `root`, whose own bounds must already be set.
pub fn compute_layout(tree: &mut Tree, root: WidgetId) {
    let mut placements = Vec::new();
    layout_node(tree, root, &mut placements);
}

fn layout_node(tree: &mut Tree, id: WidgetId, placements: &mut Vec<Placement>) {
    let Some(data) = tree.data(id) else {
        return;
    };
    if !data.is_visible() {
        return;
    }
    let spec = data.layout;
    let content = data.content_rect();

    let children: Vec<WidgetId> = tree
        .children(id)
        .iter()
        .copied()
        .filter(|&c| tree.data(c).is_some_and(|d| d.is_visible()))
        .collect();

    match spec.mode {
        LayoutMode::None => {}
        LayoutMode::Flex(axis) => {
            let items = collect_items(tree, &children);
            let cross_align = match axis {
                Axis::Horizontal => spec.align_y,
                Axis::Vertical => spec.align_x,
            };
            let rects = layout_flex(content, axis, spec.gap, spec.justify, cross_align, &items);
            assign(tree, &children, &rects, content);
        }
        LayoutMode::Stack => {
            let items = collect_items(tree, &children);
            let rects = layout_stack(content, &items);
            assign(tree, &children, &rects, content);
        }
        LayoutMode::Dock => {
            let items = collect_items(tree, &children);
            let rects = layout_dock(content, &items);
            for (&child, rect) in children.iter().zip(rects) {
                if let (Some(rect), Some(data)) = (rect, tree.data_mut(child)) {
                    data.bounds = confine(rect, content);
                }
            }
        }
        LayoutMode::Custom => {
            let items: Vec<(WidgetId, LayoutItem)> = children
                .iter()
                .copied()
                .zip(collect_items(tree, &children))
                .collect();
            placements.clear();
            tree.with_widget_mut(id, |widget, data| widget.arrange(data, &items, placements));
            for placement in placements.drain(..) {
                if tree.parent(placement.widget) != Some(id) {
                    continue;
                }
                if let Some(data) = tree.data_mut(placement.widget) {
                    data.bounds = sanitize(placement.bounds, content);
                    data.set_flag(WidgetFlags::VISIBLE, placement.visible);
                }
            }
        }
    }

    let all_children: Vec<WidgetId> = tree.children(id).to_vec();
    for child in all_children {
        layout_node(tree, child, placements);
    }

    if let Some(data) = tree.data_mut(id) {
        data.flags.remove(WidgetFlags::NEEDS_LAYOUT);
    }
}

fn collect_items(tree: &Tree, children: &[WidgetId]) -> Vec<LayoutItem> {
    children
        .iter()
        .filter_map(|&c| tree.data(c))
        .map(|d| LayoutItem {
            spec: d.layout,
            current: d.bounds.size(),
        })
        .collect()
}

fn assign(tree: &mut Tree, children: &[WidgetId], rects: &[Rect], content: Rect) {
    for (&child, &rect) in children.iter().zip(rects) {
        if let Some(data) = tree.data_mut(child) {
            data.bounds = confine(rect, content);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_extent_min_wins() {
        assert_eq!(clamp_extent(50.0, 100.0, 20.0), 100.0);
        assert_eq!(clamp_extent(f32::NAN, 0.0, 10.0), 0.0);
        assert_eq!(clamp_extent(-5.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp_extent(500.0, 0.0, f32::INFINITY), 500.0);
    }

    #[test]
    fn test_confine_keeps_rect_inside() {
        let area = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(
            confine(Rect::new(90.0, -10.0, 50.0, 50.0), area),
            Rect::new(90.0, 0.0, 10.0, 40.0)
        );
        let outside = confine(Rect::new(200.0, 200.0, 10.0, 10.0), area);
        assert_eq!(outside, Rect::new(100.0, 100.0, 0.0, 0.0));
        let nan = confine(Rect::new(f32::NAN, 0.0, f32::NAN, 10.0), area);
        assert!(nan.width >= 0.0 && !nan.x.is_nan());
    }

    #[test]
    fn test_sanitize_allows_overflow_but_not_nan() {
        let area = Rect::new(0.0, 0.0, 100.0, 100.0);
        let scrolled = Rect::new(0.0, -40.0, 100.0, 300.0);
        assert_eq!(sanitize(scrolled, area), scrolled);
        assert_eq!(
            sanitize(Rect::new(f32::NAN, 5.0, -3.0, f32::INFINITY), area),
            Rect::new(0.0, 5.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_axis_spec_sanitizes() {
        let spec = LayoutSpec::default().size(-10.0, f32::NAN).max(f32::NAN, -1.0);
        let h = spec.main(Axis::Horizontal);
        let v = spec.main(Axis::Vertical);
        assert_eq!(h.preferred, 0.0);
        assert_eq!(v.preferred, 0.0);
        assert_eq!(h.max, f32::INFINITY);
        assert_eq!(v.max, 0.0);
    }
}
