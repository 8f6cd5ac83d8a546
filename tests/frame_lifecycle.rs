use dockyard::prelude::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn context() -> UiContext<HeadlessBackend> {
    let mut ctx = UiContext::new(UiConfig::default().viewport(640, 480));
    ctx.initialize(HeadlessBackend::new()).unwrap();
    ctx
}

#[test]
fn test_every_frame_reaches_the_backend() {
    init_logger();
    let mut ctx = context();
    let mut input = InputState::new();
    for expected in 1..=5u64 {
        ctx.begin_frame(1.0 / 60.0, &input).unwrap();
        assert!(ctx.is_in_frame());
        let stats = ctx.end_frame().unwrap();
        assert_eq!(stats.frame, expected);
        input.next_frame();
    }
    let backend = ctx.backend().unwrap();
    assert_eq!(backend.frames_begun(), 5);
    assert_eq!(backend.frames_presented(), 5);
    assert_eq!(backend.submissions().len(), 5);
    assert_eq!(backend.size(), (640, 480));
}

#[test]
fn test_mixed_immediate_and_retained_widgets() {
    init_logger();
    let mut ctx = context();
    let root = ctx.root();
    ctx.add_widget(
        root,
        WidgetData::new("status")
            .with_layout(LayoutSpec::default().height(24.0).docked(DockSide::Bottom))
            .with_background(Color::rgb(0.1, 0.1, 0.1)),
        Label::new("Ready"),
    )
    .unwrap();

    let mut input = InputState::new();
    let button = Rect::new(10.0, 10.0, 100.0, 30.0);
    let mut clicks = 0;
    let mut enabled = false;

    let mut run = |ctx: &mut UiContext<HeadlessBackend>, input: &mut InputState| {
        ctx.begin_frame(1.0 / 60.0, input).unwrap();
        if ctx.button(1, button, "Apply") {
            clicks += 1;
        }
        ctx.checkbox(2, Rect::new(10.0, 50.0, 120.0, 20.0), &mut enabled, "Enabled");
        let stats = ctx.end_frame().unwrap();
        input.next_frame();
        stats
    };

    let idle = run(&mut ctx, &mut input);
    assert!(idle.indices > 0);
    assert_eq!(idle.widgets_drawn, 2);

    input.set_mouse_pos(Vec2::new(50.0, 20.0));
    input.set_mouse_button(MouseButton::Left, true);
    run(&mut ctx, &mut input);
    input.set_mouse_button(MouseButton::Left, false);
    run(&mut ctx, &mut input);

    input.set_mouse_pos(Vec2::new(15.0, 55.0));
    input.set_mouse_button(MouseButton::Left, true);
    run(&mut ctx, &mut input);
    input.set_mouse_button(MouseButton::Left, false);
    run(&mut ctx, &mut input);

    assert_eq!(clicks, 1);
    assert!(enabled);
}

#[test]
fn test_animation_settles_across_frames() {
    init_logger();
    let mut ctx = context();
    let root = ctx.root();
    let panel = ctx
        .add_widget(root, WidgetData::new("fade"), Panel::new())
        .unwrap();
    assert!(ctx.animate(
        panel,
        AnimProperty::Opacity,
        0.0f32,
        Transition::new(0.5, TimingFunction::Linear),
    ));

    let mut input = InputState::new();
    let mut opacities = Vec::new();
    for _ in 0..40 {
        ctx.begin_frame(1.0 / 30.0, &input).unwrap();
        ctx.end_frame().unwrap();
        input.next_frame();
        opacities.push(ctx.tree().data(panel).map(|d| d.style.opacity).unwrap());
    }

    assert!(opacities.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(opacities.last().copied(), Some(0.0));
    assert!(ctx.animations().is_empty());
}

#[test]
fn test_arena_is_reset_each_frame() {
    init_logger();
    let mut ctx = context();
    let mut input = InputState::new();

    ctx.begin_frame(0.016, &input).unwrap();
    let name = ctx.arena_mut().alloc_str("scratch").unwrap();
    assert_eq!(ctx.arena().get_str(name), Some("scratch"));
    let stats = ctx.end_frame().unwrap();
    assert!(stats.arena_bytes >= "scratch".len());
    input.next_frame();

    ctx.begin_frame(0.016, &input).unwrap();
    assert_eq!(ctx.arena().get_str(name), None);
    assert_eq!(ctx.arena().used(), 0);
    ctx.end_frame().unwrap();
}

#[test]
fn test_viewport_resize_relayouts_root() {
    init_logger();
    let mut ctx = context();
    let root = ctx.root();
    let mut input = InputState::new();

    ctx.set_viewport(1024, 768);
    ctx.begin_frame(0.016, &input).unwrap();
    ctx.end_frame().unwrap();
    input.next_frame();

    assert_eq!(
        ctx.tree().data(root).map(|d| d.bounds),
        Some(Rect::new(0.0, 0.0, 1024.0, 768.0))
    );
    assert_eq!(ctx.backend().map(|b| b.size()), Some((1024, 768)));
}

#[test]
fn test_immediate_calls_outside_frame_do_nothing() {
    init_logger();
    let mut ctx = context();
    assert!(!ctx.button(7, Rect::new(0.0, 0.0, 10.0, 10.0), "late"));
    assert!(ctx.draw_list().is_empty());
}
