use dockyard::layout::compute_layout;
use dockyard::prelude::*;

fn tree_with_root(spec: LayoutSpec, bounds: Rect) -> (Tree, WidgetId) {
    let mut tree = Tree::new();
    let root = tree.insert(
        WidgetData::new("root").with_layout(spec).with_bounds(bounds),
        Box::new(Panel::new()),
    );
    (tree, root)
}

fn add(tree: &mut Tree, parent: WidgetId, name: &str, spec: LayoutSpec) -> WidgetId {
    tree.add_new_child(
        parent,
        WidgetData::new(name).with_layout(spec),
        Box::new(Panel::new()),
    )
    .unwrap()
}

fn bounds(tree: &Tree, id: WidgetId) -> Rect {
    tree.data(id).map(|d| d.bounds).unwrap()
}

#[test]
fn test_row_distributes_free_space_by_grow() {
    let (mut tree, root) = tree_with_root(LayoutSpec::row(), Rect::new(0.0, 0.0, 400.0, 50.0));
    let a = add(&mut tree, root, "a", LayoutSpec::default().basis(100.0).grow(1.0));
    let b = add(&mut tree, root, "b", LayoutSpec::default().basis(100.0).grow(1.0));
    let c = add(&mut tree, root, "c", LayoutSpec::default().basis(100.0));

    compute_layout(&mut tree, root);

    assert_eq!(bounds(&tree, a), Rect::new(0.0, 0.0, 150.0, 50.0));
    assert_eq!(bounds(&tree, b), Rect::new(150.0, 0.0, 150.0, 50.0));
    assert_eq!(bounds(&tree, c), Rect::new(300.0, 0.0, 100.0, 50.0));
}

#[test]
fn test_dock_carves_in_insertion_order() {
    let (mut tree, root) = tree_with_root(LayoutSpec::dock(), Rect::new(0.0, 0.0, 800.0, 600.0));
    let menu = add(
        &mut tree,
        root,
        "menu",
        LayoutSpec::default().height(24.0).docked(DockSide::Top),
    );
    let outline = add(
        &mut tree,
        root,
        "outline",
        LayoutSpec::default().width(200.0).docked(DockSide::Left),
    );
    let status = add(
        &mut tree,
        root,
        "status",
        LayoutSpec::default().height(20.0).docked(DockSide::Bottom),
    );
    let body = add(&mut tree, root, "body", LayoutSpec::default());

    compute_layout(&mut tree, root);

    assert_eq!(bounds(&tree, menu), Rect::new(0.0, 0.0, 800.0, 24.0));
    assert_eq!(bounds(&tree, outline), Rect::new(0.0, 24.0, 200.0, 576.0));
    assert_eq!(bounds(&tree, status), Rect::new(200.0, 580.0, 600.0, 20.0));
    assert_eq!(bounds(&tree, body), Rect::new(200.0, 24.0, 600.0, 556.0));
}

#[test]
fn test_children_stay_inside_parent_content() {
    let parent_rect = Rect::new(10.0, 10.0, 120.0, 60.0);
    let (mut tree, root) = tree_with_root(
        LayoutSpec::column().padding(Insets::all(4.0)),
        parent_rect,
    );
    let kids: Vec<WidgetId> = (0..4)
        .map(|i| {
            add(
                &mut tree,
                root,
                &format!("kid{}", i),
                LayoutSpec::default().size(500.0, 40.0).shrink(0.0),
            )
        })
        .collect();

    compute_layout(&mut tree, root);

    let content = tree.data(root).unwrap().content_rect();
    for kid in kids {
        let rect = bounds(&tree, kid);
        assert!(rect.width >= 0.0 && rect.height >= 0.0);
        assert!(rect.x >= content.x && rect.right() <= content.right());
        assert!(rect.y >= content.y && rect.bottom() <= content.bottom());
    }
}

#[test]
fn test_nested_layouts_resolve_top_down() {
    let (mut tree, root) = tree_with_root(LayoutSpec::dock(), Rect::new(0.0, 0.0, 300.0, 100.0));
    let bar = add(
        &mut tree,
        root,
        "bar",
        LayoutSpec::row().height(30.0).docked(DockSide::Top),
    );
    let left = add(&mut tree, bar, "left", LayoutSpec::default().grow(1.0));
    let right = add(&mut tree, bar, "right", LayoutSpec::default().grow(2.0));

    compute_layout(&mut tree, root);

    assert_eq!(bounds(&tree, bar), Rect::new(0.0, 0.0, 300.0, 30.0));
    assert_eq!(bounds(&tree, left), Rect::new(0.0, 0.0, 100.0, 30.0));
    assert_eq!(bounds(&tree, right), Rect::new(100.0, 0.0, 200.0, 30.0));
}

#[test]
fn test_hit_test_returns_topmost_widget() {
    let (mut tree, root) = tree_with_root(LayoutSpec::stack(), Rect::new(0.0, 0.0, 200.0, 200.0));
    let below = add(&mut tree, root, "below", LayoutSpec::default());
    let above = add(&mut tree, root, "above", LayoutSpec::default().size(50.0, 50.0));

    compute_layout(&mut tree, root);

    assert_eq!(tree.hit_test(root, Vec2::new(10.0, 10.0)), Some(above));
    assert_eq!(tree.hit_test(root, Vec2::new(150.0, 150.0)), Some(below));
    assert_eq!(tree.hit_test(root, Vec2::new(500.0, 10.0)), None);
}
