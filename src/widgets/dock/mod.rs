//! Dockable tabbed panes.
//!
//! [`DockSystem`] owns a binary tree of [`DockNode`]s rooted at a node that
//! always exists (initially an empty leaf). Leaves hold ordered tabs; splits
//! hold exactly two children, a direction and a ratio. Tab and node ids come
//! from monotonically increasing counters and are never reused.
//!
//! Invalid restructuring requests (unknown ids, splitting a split, merging a
//! leaf, moving into a split) leave the tree untouched and return `false` or
//! `None`.

mod interaction;
mod node;

pub use interaction::{drop_preview, drop_zone, DockMetrics, DropZone, DROP_BAND};
pub use node::{DockNode, DockNodeId, DockNodeKind, SplitDirection, Tab, TabId};

use super::{Event, EventResponse, MouseButton, Placement, Widget, WidgetData, WidgetFlags};
use crate::layout::{LayoutItem, LayoutSpec};
use crate::primitives::{Rect, Vec2};
use crate::renderer::PaintContext;
use crate::tree::WidgetId;

use interaction::DRAG_THRESHOLD;

const MIN_RATIO: f32 = 0.05;
const MAX_RATIO: f32 = 0.95;

/// Clamp a split ratio into the usable range; non-finite input splits evenly.
pub fn clamp_ratio(ratio: f32) -> f32 {
    if ratio.is_finite() {
        ratio.clamp(MIN_RATIO, MAX_RATIO)
    } else {
        0.5
    }
}

type TabClosedHandler = Box<dyn FnMut(&Tab)>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    Idle,
    /// Pressed on a tab, not moved far enough to drag yet
    Pending { tab: TabId, origin: Vec2 },
    Tab {
        tab: TabId,
        pos: Vec2,
        target: Option<(DockNodeId, DropZone)>,
    },
    Splitter { node: DockNodeId },
}

pub struct DockSystem {
    root: DockNode,
    next_tab: u32,
    next_node: u32,
    dirty: bool,
    metrics: DockMetrics,
    on_tab_closed: Option<TabClosedHandler>,
    /// Content of removed tabs, hidden on the next arrange
    orphaned: Vec<WidgetId>,
    drag: Drag,
    hover: Option<Vec2>,
}

impl DockSystem {
    pub fn new() -> Self {
        Self {
            root: DockNode::leaf(DockNodeId(1), Vec::new(), 0),
            next_tab: 1,
            next_node: 2,
            dirty: true,
            metrics: DockMetrics::default(),
            on_tab_closed: None,
            orphaned: Vec::new(),
            drag: Drag::Idle,
            hover: None,
        }
    }

    /// Layout spec the dock's [`WidgetData`] should carry.
    pub fn layout_spec() -> LayoutSpec {
        LayoutSpec::custom()
    }

    pub fn with_metrics(mut self, metrics: DockMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn on_tab_closed(mut self, handler: impl FnMut(&Tab) + 'static) -> Self {
        self.on_tab_closed = Some(Box::new(handler));
        self
    }

    pub fn metrics(&self) -> DockMetrics {
        self.metrics
    }

    pub fn root(&self) -> &DockNode {
        &self.root
    }

    pub fn root_id(&self) -> DockNodeId {
        self.root.id()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether a tab or splitter drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, Drag::Tab { .. } | Drag::Splitter { .. })
    }

    pub fn find_node(&self, id: DockNodeId) -> Option<&DockNode> {
        self.root.find(id)
    }

    /// Leaf under `point` inside the subtree of `node`, using the last
    /// layout's bounds. Pass [`root_id`](Self::root_id) to search everything.
    pub fn find_node_containing_point(&self, node: DockNodeId, point: Vec2) -> Option<&DockNode> {
        self.find_node(node)?.leaf_at(point)
    }

    pub fn find_tab(&self, tab: TabId) -> Option<(DockNodeId, usize)> {
        self.root.find_tab(tab)
    }

    pub fn tab(&self, tab: TabId) -> Option<&Tab> {
        let (leaf, index) = self.find_tab(tab)?;
        self.find_node(leaf)?.tabs().get(index)
    }

    /// Every tab id in depth-first leaf order.
    pub fn tab_ids(&self) -> Vec<TabId> {
        let mut ids = Vec::new();
        self.root
            .walk(&mut |node| ids.extend(node.tabs().iter().map(|t| t.id)));
        ids
    }

    pub fn tab_count(&self) -> usize {
        let mut count = 0;
        self.root.walk(&mut |node| count += node.tabs().len());
        count
    }

    pub fn leaf_ids(&self) -> Vec<DockNodeId> {
        let mut ids = Vec::new();
        self.root.walk(&mut |node| {
            if node.is_leaf() {
                ids.push(node.id());
            }
        });
        ids
    }

    /// Append a tab to `target` (or the root when unspecified or not a leaf)
    /// and make it active.
    ///
    /// When the root itself is split, an unresolved target falls back to the
    /// first leaf in depth-first order.
    pub fn add_tab(
        &mut self,
        title: impl Into<String>,
        content: Option<WidgetId>,
        target: Option<DockNodeId>,
    ) -> TabId {
        let id = TabId(self.next_tab);
        self.next_tab += 1;
        let tab = Tab {
            id,
            title: title.into(),
            content,
        };

        let leaf_id = target
            .and_then(|t| self.root.find(t))
            .filter(|n| n.is_leaf())
            .map(|n| n.id())
            .unwrap_or_else(|| self.root.first_leaf().id());
        if let Some(DockNodeKind::Leaf { tabs, active }) =
            self.root.find_mut(leaf_id).map(|n| &mut n.kind)
        {
            tabs.push(tab);
            *active = tabs.len() - 1;
        }
        log::debug!("dock: added tab {:?} to {:?}", id, leaf_id);
        self.dirty = true;
        id
    }

    /// Remove `tab` from its leaf and report it to the tab-closed handler.
    pub fn remove_tab(&mut self, tab: TabId) -> bool {
        let Some(removed) = self.extract_tab(tab) else {
            return false;
        };
        if let Some(content) = removed.content {
            self.orphaned.push(content);
        }
        if let Some(handler) = self.on_tab_closed.as_mut() {
            handler(&removed);
        }
        log::debug!("dock: removed tab {:?}", tab);
        self.dirty = true;
        true
    }

    /// Move `tab` into leaf `target` at `index` (appending when out of range)
    /// and make it active there.
    pub fn move_tab(&mut self, tab: TabId, target: DockNodeId, index: usize) -> bool {
        if !self.find_node(target).is_some_and(|n| n.is_leaf()) {
            return false;
        }
        let Some(moved) = self.extract_tab(tab) else {
            return false;
        };
        if let Some(DockNodeKind::Leaf { tabs, active }) =
            self.root.find_mut(target).map(|n| &mut n.kind)
        {
            let index = index.min(tabs.len());
            tabs.insert(index, moved);
            *active = index;
        }
        log::debug!("dock: moved tab {:?} to {:?}", tab, target);
        self.dirty = true;
        true
    }

    /// Make `tab` the active tab of its leaf.
    pub fn activate_tab(&mut self, tab: TabId) -> bool {
        let Some((leaf, index)) = self.find_tab(tab) else {
            return false;
        };
        if let Some(DockNodeKind::Leaf { active, .. }) =
            self.root.find_mut(leaf).map(|n| &mut n.kind)
        {
            *active = index;
        }
        self.dirty = true;
        true
    }

    /// Turn leaf `node` into a split. Its tabs move to the new first child;
    /// the second child starts empty. Returns the two new child ids.
    pub fn split_node(
        &mut self,
        node: DockNodeId,
        direction: SplitDirection,
        ratio: f32,
    ) -> Option<(DockNodeId, DockNodeId)> {
        let first_id = DockNodeId(self.next_node);
        let second_id = DockNodeId(self.next_node + 1);
        let target = self.root.find_mut(node).filter(|n| n.is_leaf())?;

        let kind = std::mem::replace(
            &mut target.kind,
            DockNodeKind::Leaf {
                tabs: Vec::new(),
                active: 0,
            },
        );
        let (tabs, active) = match kind {
            DockNodeKind::Leaf { tabs, active } => (tabs, active),
            other => {
                target.kind = other;
                return None;
            }
        };
        target.kind = DockNodeKind::Split {
            direction,
            ratio: clamp_ratio(ratio),
            first: Box::new(DockNode::leaf(first_id, tabs, active)),
            second: Box::new(DockNode::leaf(second_id, Vec::new(), 0)),
        };
        self.next_node += 2;
        log::debug!("dock: split {:?} into {:?}/{:?}", node, first_id, second_id);
        self.dirty = true;
        Some((first_id, second_id))
    }

    /// Collapse split `node` back into a leaf holding every tab of its
    /// subtree in depth-first order.
    pub fn merge_node(&mut self, node: DockNodeId) -> bool {
        let Some(target) = self.root.find_mut(node).filter(|n| !n.is_leaf()) else {
            return false;
        };
        let kind = std::mem::replace(
            &mut target.kind,
            DockNodeKind::Leaf {
                tabs: Vec::new(),
                active: 0,
            },
        );
        let (first, second) = match kind {
            DockNodeKind::Split { first, second, .. } => (first, second),
            other => {
                target.kind = other;
                return false;
            }
        };
        let active_tab = first
            .first_leaf()
            .active_tab()
            .or_else(|| second.first_leaf().active_tab())
            .map(|t| t.id);
        let mut tabs = first.take_tabs();
        tabs.extend(second.take_tabs());
        let active = active_tab
            .and_then(|id| tabs.iter().position(|t| t.id == id))
            .unwrap_or(0);
        target.kind = DockNodeKind::Leaf { tabs, active };
        log::debug!("dock: merged {:?}", node);
        self.dirty = true;
        true
    }

    /// Set the ratio of split `node`, clamped into `[0.05, 0.95]`.
    pub fn set_ratio(&mut self, node: DockNodeId, ratio: f32) -> bool {
        match self.root.find_mut(node).map(|n| &mut n.kind) {
            Some(DockNodeKind::Split { ratio: r, .. }) => {
                *r = clamp_ratio(ratio);
                self.dirty = true;
                true
            }
            _ => false,
        }
    }

    /// Assign bounds to every node from `bounds` and the split ratios.
    pub fn layout(&mut self, bounds: Rect) {
        self.root.layout(bounds, self.metrics.splitter_size);
        self.dirty = false;
    }

    fn extract_tab(&mut self, tab: TabId) -> Option<Tab> {
        let (leaf, index) = self.root.find_tab(tab)?;
        match self.root.find_mut(leaf).map(|n| &mut n.kind) {
            Some(DockNodeKind::Leaf { tabs, active }) => {
                let removed = tabs.remove(index);
                if index < *active || *active >= tabs.len() {
                    *active = active.saturating_sub(1);
                }
                Some(removed)
            }
            _ => None,
        }
    }

    fn swap_children(&mut self, node: DockNodeId) {
        if let Some(DockNodeKind::Split {
            ratio,
            first,
            second,
            ..
        }) = self.root.find_mut(node).map(|n| &mut n.kind)
        {
            std::mem::swap(first, second);
            *ratio = clamp_ratio(1.0 - *ratio);
        }
    }

    fn splitter_at(&self, point: Vec2) -> Option<DockNodeId> {
        let mut hit = None;
        self.root.walk(&mut |node| {
            if hit.is_none() {
                if let Some(rect) = node.splitter_rect() {
                    if rect.expand(1.0).contains(point) {
                        hit = Some(node.id());
                    }
                }
            }
        });
        hit
    }

    /// Drop a dragged tab onto `zone` of `leaf`.
    fn drop_tab(&mut self, tab: TabId, leaf: DockNodeId, zone: DropZone) {
        let Some((source, _)) = self.find_tab(tab) else {
            return;
        };
        if zone == DropZone::Fill {
            if source != leaf {
                self.move_tab(tab, leaf, usize::MAX);
            }
            return;
        }
        if source == leaf && self.find_node(leaf).is_some_and(|n| n.tabs().len() <= 1) {
            return;
        }
        let direction = match zone {
            DropZone::Left | DropZone::Right => SplitDirection::Horizontal,
            _ => SplitDirection::Vertical,
        };
        let Some((_, second)) = self.split_node(leaf, direction, 0.5) else {
            return;
        };
        if matches!(zone, DropZone::Left | DropZone::Top) {
            self.swap_children(leaf);
        }
        self.move_tab(tab, second, usize::MAX);
    }

    fn press(&mut self, point: Vec2) -> EventResponse {
        if let Some(node) = self.splitter_at(point) {
            self.drag = Drag::Splitter { node };
            return EventResponse::Handled;
        }
        let Some(leaf) = self.root.leaf_at(point) else {
            return EventResponse::Ignored;
        };
        let Some(index) = self.metrics.tab_index_at(leaf, point) else {
            return EventResponse::Ignored;
        };
        let tab = leaf.tabs()[index].id;
        let tab_rect = self.metrics.tab_rect(leaf.bounds(), index);
        if self.metrics.close_rect(tab_rect).contains(point) {
            self.remove_tab(tab);
        } else {
            self.activate_tab(tab);
            self.drag = Drag::Pending { tab, origin: point };
        }
        EventResponse::Handled
    }

    fn drag_to(&mut self, point: Vec2) -> EventResponse {
        let drag = self.drag;
        match drag {
            Drag::Idle => return EventResponse::Ignored,
            Drag::Splitter { node } => {
                let Some(split) = self.find_node(node) else {
                    self.drag = Drag::Idle;
                    return EventResponse::Handled;
                };
                let b = split.bounds();
                let ratio = match split.direction() {
                    Some(SplitDirection::Horizontal) if b.width > 0.0 => (point.x - b.x) / b.width,
                    Some(SplitDirection::Vertical) if b.height > 0.0 => (point.y - b.y) / b.height,
                    _ => return EventResponse::Handled,
                };
                self.set_ratio(node, ratio);
            }
            Drag::Pending { tab, origin } => {
                if (point - origin).length() >= DRAG_THRESHOLD {
                    self.drag = Drag::Tab {
                        tab,
                        pos: point,
                        target: self.drop_target(point),
                    };
                }
            }
            Drag::Tab { tab, .. } => {
                self.drag = Drag::Tab {
                    tab,
                    pos: point,
                    target: self.drop_target(point),
                };
            }
        }
        EventResponse::Handled
    }

    fn release(&mut self) -> EventResponse {
        let drag = std::mem::replace(&mut self.drag, Drag::Idle);
        match drag {
            Drag::Idle => EventResponse::Ignored,
            Drag::Tab {
                tab,
                target: Some((leaf, zone)),
                ..
            } => {
                self.drop_tab(tab, leaf, zone);
                EventResponse::Handled
            }
            _ => EventResponse::Handled,
        }
    }

    fn drop_target(&self, point: Vec2) -> Option<(DockNodeId, DropZone)> {
        let leaf = self.root.leaf_at(point)?;
        Some((leaf.id(), drop_zone(leaf.bounds(), point)))
    }

    fn draw_leaf(&self, leaf: &DockNode, ctx: &mut PaintContext) {
        let theme = ctx.theme;
        let bounds = leaf.bounds();
        ctx.draw_box(bounds, theme.bg_secondary, 0.0, None);
        let bar = self.metrics.tab_bar(bounds);
        ctx.draw_box(bar, theme.bg_header, 0.0, None);

        if leaf.tabs().is_empty() {
            let content = self.metrics.content_rect(bounds);
            let size = ctx.measure_text("Empty");
            let center = content.center();
            ctx.draw_text(
                Vec2::new(center.x - size.width * 0.5, center.y - size.height * 0.5),
                "Empty",
                theme.text_disabled,
                0.0,
            );
            return;
        }

        ctx.push_clip(bar);
        for (index, tab) in leaf.tabs().iter().enumerate() {
            let rect = self.metrics.tab_rect(bounds, index);
            let active = leaf.active_index() == Some(index);
            let hovered = self.hover.is_some_and(|p| rect.contains(p));
            let fill = if active {
                theme.bg_surface_active
            } else if hovered {
                theme.bg_surface_hover
            } else {
                theme.bg_surface
            };
            ctx.draw_box(rect.shrink(1.0), fill, 0.0, None);
            if active {
                ctx.draw_list.add_filled_rect(
                    Rect::new(rect.x, rect.bottom() - 2.0, rect.width, 2.0),
                    theme.accent,
                );
            }

            let close = self.metrics.close_rect(rect);
            let text_clip = Rect::new(rect.x, rect.y, (close.x - rect.x).max(0.0), rect.height);
            ctx.push_clip(text_clip);
            let color = if active {
                theme.text_primary
            } else {
                theme.text_secondary
            };
            ctx.draw_text_in(rect, theme.padding, &tab.title, color);
            ctx.pop_clip();

            let glyph = close.shrink(3.0);
            ctx.draw_list.add_line(
                glyph.origin(),
                Vec2::new(glyph.right(), glyph.bottom()),
                theme.text_secondary,
                1.5,
            );
            ctx.draw_list.add_line(
                Vec2::new(glyph.right(), glyph.y),
                Vec2::new(glyph.x, glyph.bottom()),
                theme.text_secondary,
                1.5,
            );
        }
        ctx.pop_clip();
    }
}

impl Default for DockSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DockSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockSystem")
            .field("root", &self.root)
            .field("next_tab", &self.next_tab)
            .field("next_node", &self.next_node)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl Widget for DockSystem {
    /// Tab and splitter drags keep the pointer until release, whatever lies under it.
    fn default_flags(&self) -> WidgetFlags {
        WidgetFlags::CAPTURES_MOUSE
    }

    fn draw(&self, data: &WidgetData, ctx: &mut PaintContext) {
        let theme = ctx.theme;
        ctx.draw_box(data.bounds, theme.bg_primary, 0.0, None);
        self.root.walk(&mut |node| {
            if node.is_leaf() {
                self.draw_leaf(node, ctx);
            } else if let Some(rect) = node.splitter_rect() {
                let active = matches!(self.drag, Drag::Splitter { node: n } if n == node.id());
                let color = if active {
                    theme.accent
                } else {
                    theme.border_primary
                };
                ctx.draw_list.add_filled_rect(rect, color);
            }
        });
    }

    fn draw_overlay(&self, _data: &WidgetData, ctx: &mut PaintContext) {
        let Drag::Tab { tab, pos, target } = self.drag else {
            return;
        };
        let theme = ctx.theme;
        if let Some((leaf, zone)) = target {
            if let Some(node) = self.find_node(leaf) {
                let preview = drop_preview(node.bounds(), zone);
                ctx.draw_box(preview, theme.accent.with_alpha(0.25), 0.0, Some((theme.accent, 1.0)));
            }
        }
        if let Some(tab) = self.tab(tab) {
            let ghost = Rect::new(
                pos.x - self.metrics.tab_width * 0.5,
                pos.y - self.metrics.tab_height * 0.5,
                self.metrics.tab_width,
                self.metrics.tab_height,
            );
            ctx.draw_box(ghost, theme.bg_surface_active.with_alpha(0.85), theme.border_radius, None);
            ctx.draw_text_in(ghost, theme.padding, &tab.title, theme.text_primary);
        }
    }

    fn event(&mut self, _data: &mut WidgetData, event: &Event) -> EventResponse {
        match *event {
            Event::MouseDown {
                x,
                y,
                button: MouseButton::Left,
            } => self.press(Vec2::new(x, y)),
            Event::MouseMove { x, y } => {
                self.hover = Some(Vec2::new(x, y));
                self.drag_to(Vec2::new(x, y))
            }
            Event::MouseUp {
                button: MouseButton::Left,
                ..
            } => self.release(),
            Event::MouseLeave => {
                self.hover = None;
                EventResponse::Ignored
            }
            _ => EventResponse::Ignored,
        }
    }

    fn arrange(
        &mut self,
        data: &WidgetData,
        _children: &[(WidgetId, LayoutItem)],
        placements: &mut Vec<Placement>,
    ) {
        self.layout(data.content_rect());
        for widget in self.orphaned.drain(..) {
            placements.push(Placement {
                widget,
                bounds: Rect::default(),
                visible: false,
            });
        }
        let metrics = self.metrics;
        self.root.walk(&mut |node| {
            let active = node.active_index();
            let content = metrics.content_rect(node.bounds());
            for (index, tab) in node.tabs().iter().enumerate() {
                if let Some(widget) = tab.content {
                    placements.push(Placement {
                        widget,
                        bounds: content,
                        visible: active == Some(index),
                    });
                }
            }
        });
    }

    crate::impl_as_any!();
}
