//! A hybrid immediate/retained UI engine.
//!
//! Retained widgets live in a generational [`tree::Tree`] and are laid out by
//! a stateless flex/stack/dock engine every frame. Immediate-mode helpers can
//! be mixed in between [`UiContext::begin_frame`] and
//! [`UiContext::end_frame`]. Everything is drawn into one batched
//! [`renderer::DrawList`] handed to a [`renderer::RenderBackend`], so the
//! core never talks to a GPU API directly.
//!
//! ```ignore
//! use dockyard::prelude::*;
//!
//! let mut ui = UiContext::new(UiConfig::default());
//! ui.initialize(HeadlessBackend::new())?;
//!
//! let root = ui.root();
//! let mut dock = DockSystem::new();
//! let scene = dock.add_tab("Scene", None, None);
//! ui.add_widget(root, WidgetData::new("dock").with_layout(DockSystem::layout_spec()), dock)?;
//!
//! let mut input = InputState::new();
//! loop {
//!     ui.begin_frame(1.0 / 60.0, &input)?;
//!     if ui.button(1, Rect::new(8.0, 8.0, 120.0, 28.0), "Save") {
//!         // ...
//!     }
//!     ui.end_frame()?;
//!     input.next_frame();
//! }
//! ```

// Lets `#[derive(Reflect)]` name `::dockyard` from inside this crate too.
extern crate self as dockyard;

pub mod animation;
pub mod arena;
pub mod context;
pub mod immediate;
pub mod input;
pub mod layout;
pub mod pool;
pub mod primitives;
pub mod reflect;
pub mod renderer;
pub mod theme;
pub mod tree;
pub mod widgets;

pub use context::{FrameError, FrameStats, UiConfig, UiContext};
pub use dockyard_macros::Reflect;
pub use reflect::Reflect;

pub mod prelude {
    pub use crate::animation::{
        AnimProperty, AnimValue, AnimationSystem, SpringConfig, TimingFunction, Transition,
    };
    pub use crate::arena::FrameArena;
    pub use crate::input::{InputState, Key, Modifiers, MouseButton};
    pub use crate::layout::{
        Align, Axis, DockSide, LayoutMode, LayoutSpec, MainAxisAlignment,
    };
    pub use crate::pool::{PoolError, TaskHandle, WorkerPool};
    pub use crate::primitives::{Color, Insets, Rect, Size, Vec2};
    pub use crate::reflect::{PropFlags, PropValue};
    pub use crate::renderer::{
        DrawList, FontId, HeadlessBackend, PaintContext, RenderBackend, TextureHandle,
    };
    pub use crate::theme::Theme;
    pub use crate::tree::{Tree, TreeError, WidgetId};
    pub use crate::widgets::{
        Button, Checkbox, DockSystem, DropZone, Event, EventResponse, Label, Panel,
        PropertyInspector, ScrollArea, Separator, Slider, SplitDirection, Style, TabId, TextInput,
        Widget, WidgetData, WidgetFlags,
    };
    pub use crate::{FrameError, FrameStats, Reflect, UiConfig, UiContext};
}
