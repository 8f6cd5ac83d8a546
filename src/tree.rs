//! Arena-based widget storage.
//!
//! Widgets are stored densely with a sparse map from generational
//! [`WidgetId`]s to dense slots. Each node owns its children through the
//! `children` list; the `parent` field is a plain id used for upward walks
//! only and never for destruction.
//!
//! - **Generational indices** detect stale ids after a slot is reused.
//! - **Swap-remove** keeps storage dense on removal.
//! - **Atomic subtree removal**: removing a node removes its whole subtree
//!   and reports every id that went away.

use thiserror::Error;

use crate::primitives::Vec2;
use crate::widgets::{widget_hash, Widget, WidgetData, WidgetFlags, FNV_OFFSET};

/// Unique identifier for a widget in the tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct WidgetId {
    index: u32,
    generation: u32,
}

impl WidgetId {
    fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Generation in the high bits, slot index in the low bits.
    pub fn as_u64(self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    #[error("widget {0:?} does not exist (stale or already removed)")]
    StaleWidget(WidgetId),
    #[error("widget {child:?} is not a child of {parent:?}")]
    NotAChild { parent: WidgetId, child: WidgetId },
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCycle { parent: WidgetId, child: WidgetId },
    #[error("widget {0:?} is the context root and cannot be removed")]
    ProtectedRoot(WidgetId),
}

struct SparseEntry {
    dense_index: usize,
    generation: u32,
}

struct Node {
    data: WidgetData,
    widget: Box<dyn Widget>,
    parent: Option<WidgetId>,
    children: Vec<WidgetId>,
    /// Back-pointer for swap-remove fixup
    sparse_index: u32,
}

pub struct Tree {
    dense: Vec<Node>,
    sparse: Vec<Option<SparseEntry>>,
    /// Generation to use the next time a freed slot is handed out
    free_indices: Vec<(u32, u32)>,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
            free_indices: Vec::new(),
        }
    }

    /// Store a detached widget and return its id.
    pub fn insert(&mut self, mut data: WidgetData, widget: Box<dyn Widget>) -> WidgetId {
        data.flags.insert(widget.default_flags());
        let (sparse_index, generation) = match self.free_indices.pop() {
            Some(slot) => slot,
            None => {
                let idx = self.sparse.len() as u32;
                self.sparse.push(None);
                (idx, 0)
            }
        };

        let dense_index = self.dense.len();
        self.dense.push(Node {
            data,
            widget,
            parent: None,
            children: Vec::new(),
            sparse_index,
        });
        self.sparse[sparse_index as usize] = Some(SparseEntry {
            dense_index,
            generation,
        });

        WidgetId::new(sparse_index, generation)
    }

    /// Convenience for `insert` with a fresh [`WidgetData`].
    pub fn create(&mut self, name: &str, widget: impl Widget) -> WidgetId {
        self.insert(WidgetData::new(name), Box::new(widget))
    }

    fn dense_index(&self, id: WidgetId) -> Option<usize> {
        self.sparse
            .get(id.index as usize)
            .and_then(|e| e.as_ref())
            .filter(|e| e.generation == id.generation)
            .map(|e| e.dense_index)
    }

    fn node(&self, id: WidgetId) -> Option<&Node> {
        let idx = self.dense_index(id)?;
        Some(&self.dense[idx])
    }

    fn node_mut(&mut self, id: WidgetId) -> Option<&mut Node> {
        let idx = self.dense_index(id)?;
        Some(&mut self.dense[idx])
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.dense_index(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn data(&self, id: WidgetId) -> Option<&WidgetData> {
        self.node(id).map(|n| &n.data)
    }

    pub fn data_mut(&mut self, id: WidgetId) -> Option<&mut WidgetData> {
        self.node_mut(id).map(|n| &mut n.data)
    }

    pub fn widget(&self, id: WidgetId) -> Option<&dyn Widget> {
        self.node(id).map(|n| &*n.widget)
    }

    /// Downcast the behavior half of a widget.
    pub fn widget_as<T: Widget>(&self, id: WidgetId) -> Option<&T> {
        self.node(id)
            .and_then(|n| n.widget.as_any().downcast_ref::<T>())
    }

    pub fn widget_as_mut<T: Widget>(&mut self, id: WidgetId) -> Option<&mut T> {
        self.node_mut(id)
            .and_then(|n| n.widget.as_any_mut().downcast_mut::<T>())
    }

    /// Run `f` with both halves of a widget borrowed mutably.
    pub fn with_widget_mut<R>(
        &mut self,
        id: WidgetId,
        f: impl FnOnce(&mut dyn Widget, &mut WidgetData) -> R,
    ) -> Option<R> {
        let node = self.node_mut(id)?;
        Some(f(&mut *node.widget, &mut node.data))
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Parent, grandparent, ... up to the root.
    pub fn ancestors(&self, id: WidgetId) -> impl Iterator<Item = WidgetId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    pub fn is_ancestor(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// `root` and every descendant, parents before children.
    pub fn depth_first(&self, root: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        if !self.contains(root) {
            return out;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    // Ownership

    /// Attach `child` as the last child of `parent`, detaching it from any previous parent.
    pub fn add_child(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), TreeError> {
        if !self.contains(parent) {
            return Err(TreeError::StaleWidget(parent));
        }
        if !self.contains(child) {
            return Err(TreeError::StaleWidget(child));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(TreeError::WouldCycle { parent, child });
        }

        if let Some(old_parent) = self.parent(child) {
            if let Some(node) = self.node_mut(old_parent) {
                node.children.retain(|&c| c != child);
            }
            self.mark_needs_layout(old_parent);
        }

        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }

        // Identity hashes are scoped by the parent chain, so the whole subtree moves scope.
        for id in self.depth_first(child) {
            let scope = self
                .parent(id)
                .and_then(|p| self.data(p))
                .map(|d| d.hash())
                .unwrap_or(FNV_OFFSET);
            if let Some(data) = self.data_mut(id) {
                data.rescope(scope);
                data.flags.insert(WidgetFlags::NEEDS_LAYOUT);
            }
        }
        self.mark_needs_layout(parent);
        Ok(())
    }

    /// Insert a new widget directly under `parent`.
    pub fn add_new_child(
        &mut self,
        parent: WidgetId,
        data: WidgetData,
        widget: Box<dyn Widget>,
    ) -> Result<WidgetId, TreeError> {
        if !self.contains(parent) {
            return Err(TreeError::StaleWidget(parent));
        }
        let id = self.insert(data, widget);
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Destroy `child` and its subtree. Returns every removed id.
    pub fn remove_child(
        &mut self,
        parent: WidgetId,
        child: WidgetId,
    ) -> Result<Vec<WidgetId>, TreeError> {
        if !self.contains(parent) {
            return Err(TreeError::StaleWidget(parent));
        }
        if !self.contains(child) {
            return Err(TreeError::StaleWidget(child));
        }
        if self.parent(child) != Some(parent) {
            return Err(TreeError::NotAChild { parent, child });
        }
        self.remove(child)
    }

    /// Destroy every child subtree of `parent`.
    pub fn clear_children(&mut self, parent: WidgetId) -> Result<Vec<WidgetId>, TreeError> {
        let children = self
            .node(parent)
            .map(|n| n.children.clone())
            .ok_or(TreeError::StaleWidget(parent))?;
        let mut removed = Vec::new();
        for child in children {
            removed.extend(self.remove(child)?);
        }
        Ok(removed)
    }

    /// Destroy `id` and its subtree, detaching it from its parent first.
    pub fn remove(&mut self, id: WidgetId) -> Result<Vec<WidgetId>, TreeError> {
        if !self.contains(id) {
            log::warn!("attempted to remove stale widget {:?}", id);
            return Err(TreeError::StaleWidget(id));
        }

        if let Some(parent) = self.parent(id) {
            if let Some(node) = self.node_mut(parent) {
                node.children.retain(|&c| c != id);
            }
            self.mark_needs_layout(parent);
        }

        let doomed = self.depth_first(id);
        for &dead in &doomed {
            self.unregister(dead);
        }
        Ok(doomed)
    }

    fn unregister(&mut self, id: WidgetId) {
        let Some(dense_index) = self.dense_index(id) else {
            return;
        };

        let last = self.dense.len() - 1;
        self.dense.swap_remove(dense_index);
        if dense_index != last {
            let moved_sparse = self.dense[dense_index].sparse_index;
            if let Some(entry) = self.sparse[moved_sparse as usize].as_mut() {
                entry.dense_index = dense_index;
            }
        }

        self.sparse[id.index as usize] = None;
        self.free_indices
            .push((id.index, id.generation.wrapping_add(1)));
    }

    pub fn clear(&mut self) {
        self.dense.clear();
        self.sparse.clear();
        self.free_indices.clear();
    }

    // Dirty tracking

    /// Flag `id` and all of its ancestors as needing layout.
    pub fn mark_needs_layout(&mut self, id: WidgetId) {
        let mut current = Some(id);
        while let Some(cur) = current {
            match self.node_mut(cur) {
                Some(node) => {
                    node.data.flags.insert(WidgetFlags::NEEDS_LAYOUT);
                    current = node.parent;
                }
                None => return,
            }
        }
    }

    pub fn needs_layout(&self, id: WidgetId) -> bool {
        self.data(id)
            .map(|d| d.flags.contains(WidgetFlags::NEEDS_LAYOUT))
            .unwrap_or(false)
    }

    // Queries

    /// First direct child named `name`.
    pub fn find_child(&self, parent: WidgetId, name: &str) -> Option<WidgetId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.data(c).is_some_and(|d| d.name() == name))
    }

    /// First descendant of `root` named `name`, depth-first in insertion order.
    pub fn find_child_recursive(&self, root: WidgetId, name: &str) -> Option<WidgetId> {
        self.depth_first(root)
            .into_iter()
            .skip(1)
            .find(|&id| self.data(id).is_some_and(|d| d.name() == name))
    }

    /// First widget in `root`'s subtree (including `root`) with the given identity hash.
    pub fn find_by_hash(&self, root: WidgetId, hash: u32) -> Option<WidgetId> {
        self.depth_first(root)
            .into_iter()
            .find(|&id| self.data(id).is_some_and(|d| d.hash() == hash))
    }

    /// Identity hash a child named `name` would get under `parent`.
    pub fn child_hash(&self, parent: WidgetId, name: &str) -> Option<u32> {
        self.data(parent).map(|d| widget_hash(d.hash(), name))
    }

    /// Deepest visible and enabled widget under `point`.
    ///
    /// Later children are tested first so the visually topmost one wins.
    /// Invisible widgets hide their whole subtree.
    pub fn hit_test(&self, root: WidgetId, point: Vec2) -> Option<WidgetId> {
        let data = self.data(root)?;
        if !data.is_visible() || !data.bounds.contains(point) {
            return None;
        }
        for &child in self.children(root).iter().rev() {
            if let Some(hit) = self.hit_test(child, point) {
                return Some(hit);
            }
        }
        data.is_enabled().then_some(root)
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
