//! Immediate-mode controls only: a button, a checkbox and a slider rebuilt
//! every frame from application state, with a scripted pointer.
//!
//! Run with `RUST_LOG=info cargo run --example immediate_demo`.

use dockyard::prelude::*;

struct AppState {
    saves: u32,
    autosave: bool,
    volume: f32,
}

fn draw(ui: &mut UiContext<HeadlessBackend>, state: &mut AppState) {
    let theme_bg = ui.theme().bg_secondary;
    ui.panel(Rect::new(0.0, 0.0, 320.0, 160.0), theme_bg);
    ui.label(Rect::new(12.0, 8.0, 296.0, 20.0), "Settings", None);

    if ui.button(1, Rect::new(12.0, 36.0, 120.0, 28.0), "Save") {
        state.saves += 1;
        log::info!("saved ({} times)", state.saves);
    }
    if ui.checkbox(2, Rect::new(12.0, 76.0, 160.0, 20.0), &mut state.autosave, "Autosave") {
        log::info!("autosave -> {}", state.autosave);
    }
    state.volume = ui.slider(3, Rect::new(12.0, 108.0, 200.0, 20.0), state.volume, 0.0, 100.0);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut ui = UiContext::new(UiConfig::default().viewport(320, 160));
    ui.initialize(HeadlessBackend::new())?;

    let mut state = AppState {
        saves: 0,
        autosave: false,
        volume: 50.0,
    };

    let script = [
        (Vec2::new(60.0, 50.0), true),
        (Vec2::new(60.0, 50.0), false),
        (Vec2::new(20.0, 86.0), true),
        (Vec2::new(20.0, 86.0), false),
        (Vec2::new(40.0, 118.0), true),
        (Vec2::new(162.0, 118.0), true),
        (Vec2::new(400.0, 118.0), true),
        (Vec2::new(400.0, 118.0), false),
    ];

    let mut input = InputState::new();
    for (pos, down) in script {
        input.set_mouse_pos(pos);
        input.set_mouse_button(MouseButton::Left, down);
        ui.begin_frame(1.0 / 60.0, &input)?;
        draw(&mut ui, &mut state);
        let stats = ui.end_frame()?;
        log::debug!(
            "frame {}: hot {:?}, active {:?}, {} indices",
            stats.frame,
            ui.hot_id(),
            ui.active_id(),
            stats.indices
        );
        input.next_frame();
    }

    println!(
        "saves = {}, autosave = {}, volume = {:.1}",
        state.saves, state.autosave, state.volume
    );
    ui.shutdown()?;
    Ok(())
}
