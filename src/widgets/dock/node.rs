use crate::layout::{split_rect, Axis};
use crate::primitives::{Rect, Vec2};
use crate::tree::WidgetId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub(super) u32);

impl TabId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DockNodeId(pub(super) u32);

impl DockNodeId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// `Horizontal` puts the two panes side by side, `Vertical` stacks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    Horizontal,
    Vertical,
}

impl SplitDirection {
    pub fn axis(self) -> Axis {
        match self {
            SplitDirection::Horizontal => Axis::Horizontal,
            SplitDirection::Vertical => Axis::Vertical,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub id: TabId,
    pub title: String,
    /// Widget shown while the tab is active; owned by the widget tree, not the dock
    pub content: Option<WidgetId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DockNodeKind {
    Leaf {
        tabs: Vec<Tab>,
        active: usize,
    },
    Split {
        direction: SplitDirection,
        ratio: f32,
        first: Box<DockNode>,
        second: Box<DockNode>,
    },
}

/// A pane of the dock: either a tabbed leaf or a split with exactly two children.
#[derive(Debug, Clone, PartialEq)]
pub struct DockNode {
    id: DockNodeId,
    bounds: Rect,
    pub(super) kind: DockNodeKind,
}

impl DockNode {
    pub(super) fn leaf(id: DockNodeId, tabs: Vec<Tab>, active: usize) -> Self {
        Self {
            id,
            bounds: Rect::default(),
            kind: DockNodeKind::Leaf { tabs, active },
        }
    }

    pub fn id(&self) -> DockNodeId {
        self.id
    }

    /// Assigned by the last layout pass.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn kind(&self) -> &DockNodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, DockNodeKind::Leaf { .. })
    }

    /// Tabs of a leaf; empty for a split.
    pub fn tabs(&self) -> &[Tab] {
        match &self.kind {
            DockNodeKind::Leaf { tabs, .. } => tabs,
            DockNodeKind::Split { .. } => &[],
        }
    }

    pub fn active_index(&self) -> Option<usize> {
        match &self.kind {
            DockNodeKind::Leaf { tabs, active } if !tabs.is_empty() => Some(*active),
            _ => None,
        }
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_index().and_then(|i| self.tabs().get(i))
    }

    pub fn children(&self) -> Option<(&DockNode, &DockNode)> {
        match &self.kind {
            DockNodeKind::Split { first, second, .. } => Some((first, second)),
            DockNodeKind::Leaf { .. } => None,
        }
    }

    pub fn direction(&self) -> Option<SplitDirection> {
        match &self.kind {
            DockNodeKind::Split { direction, .. } => Some(*direction),
            DockNodeKind::Leaf { .. } => None,
        }
    }

    pub fn ratio(&self) -> Option<f32> {
        match &self.kind {
            DockNodeKind::Split { ratio, .. } => Some(*ratio),
            DockNodeKind::Leaf { .. } => None,
        }
    }

    pub fn find(&self, id: DockNodeId) -> Option<&DockNode> {
        if self.id == id {
            return Some(self);
        }
        let (first, second) = self.children()?;
        first.find(id).or_else(|| second.find(id))
    }

    pub(super) fn find_mut(&mut self, id: DockNodeId) -> Option<&mut DockNode> {
        if self.id == id {
            return Some(self);
        }
        match &mut self.kind {
            DockNodeKind::Split { first, second, .. } => match first.find_mut(id) {
                Some(found) => Some(found),
                None => second.find_mut(id),
            },
            DockNodeKind::Leaf { .. } => None,
        }
    }

    /// Owning leaf and index of `tab`.
    pub fn find_tab(&self, tab: TabId) -> Option<(DockNodeId, usize)> {
        match &self.kind {
            DockNodeKind::Leaf { tabs, .. } => tabs
                .iter()
                .position(|t| t.id == tab)
                .map(|index| (self.id, index)),
            DockNodeKind::Split { first, second, .. } => {
                first.find_tab(tab).or_else(|| second.find_tab(tab))
            }
        }
    }

    /// Deepest leaf whose bounds contain `point`.
    pub fn leaf_at(&self, point: Vec2) -> Option<&DockNode> {
        if !self.bounds.contains(point) {
            return None;
        }
        match &self.kind {
            DockNodeKind::Leaf { .. } => Some(self),
            DockNodeKind::Split { first, second, .. } => {
                if first.bounds.contains(point) {
                    first.leaf_at(point)
                } else if second.bounds.contains(point) {
                    second.leaf_at(point)
                } else {
                    None
                }
            }
        }
    }

    pub fn first_leaf(&self) -> &DockNode {
        match &self.kind {
            DockNodeKind::Leaf { .. } => self,
            DockNodeKind::Split { first, .. } => first.first_leaf(),
        }
    }

    /// Every node, parents before children, first child before second.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a DockNode)) {
        visit(self);
        if let DockNodeKind::Split { first, second, .. } = &self.kind {
            first.walk(visit);
            second.walk(visit);
        }
    }

    /// Tabs of every leaf under this node in depth-first order.
    pub(super) fn take_tabs(self) -> Vec<Tab> {
        match self.kind {
            DockNodeKind::Leaf { tabs, .. } => tabs,
            DockNodeKind::Split { first, second, .. } => {
                let mut tabs = first.take_tabs();
                tabs.extend(second.take_tabs());
                tabs
            }
        }
    }

    /// Proportion `bounds` through the subtree, leaving `gap` for each splitter.
    pub(super) fn layout(&mut self, bounds: Rect, gap: f32) {
        self.bounds = bounds;
        if let DockNodeKind::Split {
            direction,
            ratio,
            first,
            second,
        } = &mut self.kind
        {
            let (a, b) = split_rect(bounds, direction.axis(), *ratio, gap);
            first.layout(a, gap);
            second.layout(b, gap);
        }
    }

    /// The gap between the two children of a split.
    pub fn splitter_rect(&self) -> Option<Rect> {
        let (first, second) = self.children()?;
        let a = first.bounds;
        let b = second.bounds;
        Some(match self.direction()? {
            SplitDirection::Horizontal => Rect::new(a.right(), a.y, b.x - a.right(), a.height),
            SplitDirection::Vertical => Rect::new(a.x, a.bottom(), a.width, b.y - a.bottom()),
        })
    }
}
