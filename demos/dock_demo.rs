//! Editor-style layout driven headlessly: a menu strip, a docking area with
//! three tabs, and a property inspector. A scripted pointer drags the
//! "Console" tab onto the right edge to split the pane.
//!
//! Run with `RUST_LOG=debug cargo run --example dock_demo`.

use std::cell::RefCell;
use std::rc::Rc;

use dockyard::prelude::*;

#[derive(Debug, Default, Reflect)]
struct SceneSettings {
    #[reflect(description = "Scene name")]
    title: String,
    #[reflect(slider, range(0.0, 2.0))]
    exposure: f32,
    #[reflect(range(1, 16))]
    samples: i32,
    #[reflect(color)]
    ambient: Color,
    show_grid: bool,
    #[reflect(read_only)]
    objects: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut ui = UiContext::new(UiConfig::default().viewport(1280, 720));
    ui.initialize(HeadlessBackend::new())?;
    let root = ui.root();
    let header = ui.theme().bg_header;

    ui.add_widget(
        root,
        WidgetData::new("menu")
            .with_layout(LayoutSpec::row().height(28.0).docked(DockSide::Top))
            .with_background(header),
        Label::new("File  Edit  View  Help"),
    )?;

    let dock_id = ui.add_widget(
        root,
        WidgetData::new("dock").with_layout(DockSystem::layout_spec()),
        DockSystem::new().on_tab_closed(|tab| log::info!("closed tab {:?}", tab.title)),
    )?;

    let settings = Rc::new(RefCell::new(SceneSettings {
        title: "Harbor".to_string(),
        exposure: 1.0,
        samples: 4,
        objects: 128,
        ..Default::default()
    }));
    let inspector = ui.add_widget(
        dock_id,
        WidgetData::new("inspector"),
        PropertyInspector::new(settings.clone())
            .on_change(|name, value| log::info!("{} = {}", name, value.display())),
    )?;
    let viewport = ui.add_widget(
        dock_id,
        WidgetData::new("viewport").with_background(Color::from_hex(0x202830)),
        Panel::titled("Viewport"),
    )?;
    let console = ui.add_widget(
        dock_id,
        WidgetData::new("console").with_layout(ScrollArea::layout_spec()),
        ScrollArea::new(),
    )?;
    for line in 0..40 {
        ui.add_widget(
            console,
            WidgetData::new(format!("line{}", line)).with_layout(LayoutSpec::default().height(18.0)),
            Label::new(format!("[{:03}] ready", line)),
        )?;
    }

    if let Some(dock) = ui.tree_mut().widget_as_mut::<DockSystem>(dock_id) {
        dock.add_tab("Viewport", Some(viewport), None);
        dock.add_tab("Properties", Some(inspector), None);
        dock.add_tab("Console", Some(console), None);
    }

    // Thumbnails are "decoded" off the UI thread and polled each frame.
    let pool = WorkerPool::new(2)?;
    let mut thumbnails: Vec<TaskHandle<Vec<u8>>> = (0..4u8)
        .map(|i| pool.submit(move || vec![i; 64 * 64]))
        .collect::<Result<_, _>>()?;

    // The tab bar sits under the 28px menu; tabs are 120px wide.
    let script = [
        (Vec2::new(640.0, 400.0), false),
        (Vec2::new(250.0, 43.0), true),
        (Vec2::new(700.0, 300.0), true),
        (Vec2::new(1260.0, 400.0), true),
        (Vec2::new(1260.0, 400.0), false),
    ];

    let mut input = InputState::new();
    for (pos, down) in script {
        input.set_mouse_pos(pos);
        input.set_mouse_button(MouseButton::Left, down);

        ui.begin_frame(1.0 / 60.0, &input)?;
        thumbnails.retain(|handle| match handle.try_take() {
            Some(Ok(pixels)) => {
                log::info!("thumbnail ready ({} bytes)", pixels.len());
                false
            }
            Some(Err(e)) => {
                log::warn!("thumbnail failed: {}", e);
                false
            }
            None => true,
        });
        let stats = ui.end_frame()?;
        log::info!(
            "frame {}: {} widgets, {} commands, {} vertices",
            stats.frame,
            stats.widgets_drawn,
            stats.commands,
            stats.vertices
        );
        input.next_frame();
    }

    pool.wait_idle();

    if let Some(dock) = ui.tree().widget_as::<DockSystem>(dock_id) {
        let mut leaves = Vec::new();
        dock.root().walk(&mut |node| {
            if node.is_leaf() {
                let titles: Vec<&str> = node.tabs().iter().map(|t| t.title.as_str()).collect();
                leaves.push(titles);
            }
        });
        println!("panes after drag: {:?}", leaves);
    }
    println!("scene: {:?}", settings.borrow());

    let backend = ui.shutdown()?;
    println!("presented {} frames", backend.frames_presented());
    Ok(())
}
