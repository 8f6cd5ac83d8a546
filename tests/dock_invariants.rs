use std::collections::HashSet;

use dockyard::prelude::*;
use dockyard::widgets::{DockNode, DockNodeId, DockNodeKind};

/// Small deterministic generator so the operation sequences are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            0
        } else {
            self.next() as usize % n
        }
    }
}

fn check_node(node: &DockNode, seen_nodes: &mut HashSet<DockNodeId>, seen_tabs: &mut HashSet<TabId>) {
    assert!(seen_nodes.insert(node.id()), "duplicate node id {:?}", node.id());
    match node.kind() {
        DockNodeKind::Leaf { tabs, active } => {
            assert!(tabs.is_empty() || *active < tabs.len());
            for tab in tabs {
                assert!(seen_tabs.insert(tab.id), "tab {:?} appears twice", tab.id);
            }
        }
        DockNodeKind::Split {
            ratio,
            first,
            second,
            ..
        } => {
            assert!((0.05..=0.95).contains(ratio));
            check_node(first, seen_nodes, seen_tabs);
            check_node(second, seen_nodes, seen_tabs);
        }
    }
}

fn check_dock(dock: &DockSystem) {
    let mut nodes = HashSet::new();
    let mut tabs = HashSet::new();
    check_node(dock.root(), &mut nodes, &mut tabs);
    assert_eq!(tabs.len(), dock.tab_count());
}

#[test]
fn test_random_restructuring_keeps_tree_well_formed() {
    for seed in 1..20u64 {
        let mut rng = Lcg(seed);
        let mut dock = DockSystem::new();
        let mut issued = HashSet::new();

        for step in 0..200 {
            let leaves = dock.leaf_ids();
            let tabs = dock.tab_ids();
            match rng.below(7) {
                0 | 1 => {
                    let target = leaves.get(rng.below(leaves.len())).copied();
                    let id = dock.add_tab(format!("tab {}", step), None, target);
                    assert!(issued.insert(id), "tab id {:?} reused", id);
                }
                2 => {
                    if let Some(&tab) = tabs.get(rng.below(tabs.len())) {
                        assert!(dock.remove_tab(tab));
                        assert!(dock.find_tab(tab).is_none());
                    }
                }
                3 => {
                    if let (Some(&tab), Some(&leaf)) = (
                        tabs.get(rng.below(tabs.len())),
                        leaves.get(rng.below(leaves.len())),
                    ) {
                        assert!(dock.move_tab(tab, leaf, rng.below(4)));
                        assert_eq!(dock.find_tab(tab).map(|(l, _)| l), Some(leaf));
                    }
                }
                4 => {
                    let leaf = leaves[rng.below(leaves.len())];
                    let direction = if rng.below(2) == 0 {
                        SplitDirection::Horizontal
                    } else {
                        SplitDirection::Vertical
                    };
                    let ratio = rng.below(120) as f32 / 100.0 - 0.1;
                    assert!(dock.split_node(leaf, direction, ratio).is_some());
                }
                5 => {
                    let mut splits = Vec::new();
                    dock.root().walk(&mut |n| {
                        if !n.is_leaf() {
                            splits.push(n.id());
                        }
                    });
                    if let Some(&split) = splits.get(rng.below(splits.len())) {
                        let before = dock.tab_count();
                        assert!(dock.merge_node(split));
                        assert_eq!(dock.tab_count(), before);
                    }
                }
                _ => {
                    dock.layout(Rect::new(0.0, 0.0, 1024.0, 768.0));
                }
            }
            check_dock(&dock);
        }
    }
}

#[test]
fn test_split_then_merge_round_trip() {
    let mut dock = DockSystem::new();
    let a = dock.add_tab("A", None, None);
    let b = dock.add_tab("B", None, None);
    let root = dock.root_id();

    let (first, second) = dock
        .split_node(root, SplitDirection::Vertical, 0.3)
        .unwrap();
    assert!(dock.move_tab(a, second, 0));
    assert_eq!(dock.find_tab(a).map(|(leaf, _)| leaf), Some(second));
    assert_eq!(dock.find_tab(b).map(|(leaf, _)| leaf), Some(first));

    assert!(dock.merge_node(root));
    assert!(dock.root().is_leaf());
    let ids: Vec<TabId> = dock.root().tabs().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![b, a]);
    check_dock(&dock);
}

#[test]
fn test_layout_partitions_bounds() {
    let mut dock = DockSystem::new();
    let root = dock.root_id();
    let (left, _) = dock
        .split_node(root, SplitDirection::Horizontal, 0.25)
        .unwrap();
    dock.split_node(left, SplitDirection::Vertical, 0.5).unwrap();
    let area = Rect::new(0.0, 0.0, 800.0, 600.0);
    dock.layout(area);

    let mut leaf_area = 0.0;
    dock.root().walk(&mut |node| {
        let b = node.bounds();
        assert!(b.x >= area.x && b.right() <= area.right() + 1e-3);
        assert!(b.y >= area.y && b.bottom() <= area.bottom() + 1e-3);
        if node.is_leaf() {
            leaf_area += b.width * b.height;
        }
    });
    // Splitter gaps are the only uncovered space.
    assert!(leaf_area <= 800.0 * 600.0);
    assert!(leaf_area > 800.0 * 600.0 * 0.95);
}
