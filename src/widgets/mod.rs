//! Widget data, the widget capability trait, and input events.
//!
//! A widget lives in the [`Tree`](crate::tree::Tree) as two halves: the
//! uniform [`WidgetData`] every widget has (name, bounds, layout spec,
//! flags, style) and a boxed [`Widget`] carrying kind-specific behavior.
//! Hooks receive the data half by reference so behavior never has to reach
//! back into the tree.

mod button;
mod checkbox;
pub mod dock;
mod inspector;
mod label;
mod panel;
mod scroll;
mod separator;
mod slider;
mod text_input;

pub use button::Button;
pub use checkbox::Checkbox;
pub use dock::{
    DockMetrics, DockNode, DockNodeId, DockNodeKind, DockSystem, DropZone, SplitDirection, Tab,
    TabId,
};
pub use inspector::PropertyInspector;
pub use label::Label;
pub use panel::Panel;
pub use scroll::{ScrollArea, SCROLL_SPEED};
pub use separator::Separator;
pub use slider::Slider;
pub use text_input::{Selection, TextInput};

use std::any::Any;

use bitflags::bitflags;

use crate::layout::{LayoutItem, LayoutSpec};
use crate::primitives::{Color, Rect};
use crate::renderer::PaintContext;
use crate::tree::WidgetId;

pub use crate::input::{Key, Modifiers, MouseButton};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WidgetFlags: u32 {
        const VISIBLE           = 1 << 0;
        const ENABLED           = 1 << 1;
        const FOCUSABLE         = 1 << 2;
        const CLIP_CHILDREN     = 1 << 3;
        const CAPTURES_MOUSE    = 1 << 4;
        const CAPTURES_KEYBOARD = 1 << 5;
        const HOVERED           = 1 << 6;
        const PRESSED           = 1 << 7;
        const FOCUSED           = 1 << 8;
        const NEEDS_LAYOUT      = 1 << 9;
        const NEEDS_REDRAW      = 1 << 10;
    }
}

impl Default for WidgetFlags {
    fn default() -> Self {
        WidgetFlags::VISIBLE
            | WidgetFlags::ENABLED
            | WidgetFlags::NEEDS_LAYOUT
            | WidgetFlags::NEEDS_REDRAW
    }
}

/// 32-bit FNV-1a, continuing from `seed`.
pub const fn fnv1a(seed: u32, bytes: &[u8]) -> u32 {
    let mut hash = seed;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(0x0100_0193);
        i += 1;
    }
    hash
}

pub const FNV_OFFSET: u32 = 0x811c_9dc5;

/// Identity hash of `name` within the scope identified by `scope`.
///
/// Root widgets (and widgets not yet attached) use [`FNV_OFFSET`] as scope;
/// attached widgets use their parent's hash.
pub fn widget_hash(scope: u32, name: &str) -> u32 {
    fnv1a(scope, name.as_bytes())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub background: Color,
    pub border_color: Color,
    pub border_width: f32,
    pub corner_radius: f32,
    pub opacity: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background: Color::TRANSPARENT,
            border_color: Color::TRANSPARENT,
            border_width: 0.0,
            corner_radius: 0.0,
            opacity: 1.0,
        }
    }
}

/// The part of a widget every kind shares.
#[derive(Debug, Clone)]
pub struct WidgetData {
    name: String,
    hash: u32,
    /// Recomputed by the layout engine every frame.
    pub bounds: Rect,
    pub layout: LayoutSpec,
    pub flags: WidgetFlags,
    pub style: Style,
    pub tooltip: Option<String>,
}

impl WidgetData {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let hash = widget_hash(FNV_OFFSET, &name);
        Self {
            name,
            hash,
            bounds: Rect::default(),
            layout: LayoutSpec::default(),
            flags: WidgetFlags::default(),
            style: Style::default(),
            tooltip: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }

    pub(crate) fn rescope(&mut self, scope: u32) {
        self.hash = widget_hash(scope, &self.name);
    }

    /// Bounds minus padding.
    pub fn content_rect(&self) -> Rect {
        self.bounds.inset(self.layout.padding)
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(WidgetFlags::VISIBLE)
    }

    pub fn is_enabled(&self) -> bool {
        self.flags.contains(WidgetFlags::ENABLED)
    }

    pub fn is_hovered(&self) -> bool {
        self.flags.contains(WidgetFlags::HOVERED)
    }

    pub fn is_pressed(&self) -> bool {
        self.flags.contains(WidgetFlags::PRESSED)
    }

    pub fn is_focused(&self) -> bool {
        self.flags.contains(WidgetFlags::FOCUSED)
    }

    pub fn set_flag(&mut self, flag: WidgetFlags, on: bool) {
        self.flags.set(flag, on);
    }

    // Builders

    pub fn with_layout(mut self, layout: LayoutSpec) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.style.background = color;
        self
    }

    pub fn with_tooltip(mut self, text: impl Into<String>) -> Self {
        self.tooltip = Some(text.into());
        self
    }

    pub fn with_flags(mut self, flags: WidgetFlags) -> Self {
        self.flags.insert(flags);
        self
    }

    pub fn without_flags(mut self, flags: WidgetFlags) -> Self {
        self.flags.remove(flags);
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    MouseMove { x: f32, y: f32 },
    MouseDown { x: f32, y: f32, button: MouseButton },
    MouseUp { x: f32, y: f32, button: MouseButton },
    /// Pointer entered this widget's bounds
    MouseEnter { x: f32, y: f32 },
    /// Pointer left this widget's bounds
    MouseLeave,
    Scroll {
        x: f32,
        y: f32,
        delta_x: f32,
        delta_y: f32,
    },
    KeyDown { key: Key, modifiers: Modifiers },
    KeyUp { key: Key, modifiers: Modifiers },
    /// Committed text from the platform's input method
    TextInput(char),
    FocusIn,
    FocusOut,
}

impl Event {
    /// Pointer coordinates carried by this event, if any.
    pub fn coords(&self) -> Option<(f32, f32)> {
        match self {
            Event::MouseMove { x, y }
            | Event::MouseDown { x, y, .. }
            | Event::MouseUp { x, y, .. }
            | Event::MouseEnter { x, y }
            | Event::Scroll { x, y, .. } => Some((*x, *y)),
            Event::MouseLeave
            | Event::KeyDown { .. }
            | Event::KeyUp { .. }
            | Event::TextInput(_)
            | Event::FocusIn
            | Event::FocusOut => None,
        }
    }

    /// Events that travel up the parent chain until someone handles them.
    pub fn bubbles(&self) -> bool {
        !matches!(
            self,
            Event::MouseEnter { .. } | Event::MouseLeave | Event::FocusIn | Event::FocusOut
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    Ignored,
    Handled,
}

/// Child geometry produced by a widget that arranges its own children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub widget: WidgetId,
    pub bounds: Rect,
    pub visible: bool,
}

/// Kind-specific behavior of a widget.
pub trait Widget: Any {
    /// Flags this kind always carries, added to its [`WidgetData`] on insertion.
    fn default_flags(&self) -> WidgetFlags {
        WidgetFlags::empty()
    }

    /// Per-frame hook, called after layout and before drawing.
    fn update(&mut self, data: &mut WidgetData, dt: f32) {
        let _ = (data, dt);
    }

    /// Emit geometry for this widget. Children are drawn afterwards.
    fn draw(&self, data: &WidgetData, ctx: &mut PaintContext) {
        let _ = (data, ctx);
    }

    /// Emit geometry that must cover this widget's children, such as drag previews.
    fn draw_overlay(&self, data: &WidgetData, ctx: &mut PaintContext) {
        let _ = (data, ctx);
    }

    fn event(&mut self, data: &mut WidgetData, event: &Event) -> EventResponse {
        let _ = (data, event);
        EventResponse::Ignored
    }

    /// Place children for [`LayoutMode::Custom`](crate::layout::LayoutMode::Custom).
    ///
    /// `children` holds the visible children with their layout inputs.
    /// Children without a placement keep their previous bounds.
    fn arrange(
        &mut self,
        data: &WidgetData,
        children: &[(WidgetId, LayoutItem)],
        placements: &mut Vec<Placement>,
    ) {
        let _ = (data, children, placements);
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Implements the `as_any` plumbing of [`Widget`].
#[macro_export]
macro_rules! impl_as_any {
    () => {
        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }
    };
}

/// Fill and border from [`Style`], faded by the widget's opacity.
pub fn draw_background(data: &WidgetData, ctx: &mut PaintContext) {
    let style = &data.style;
    let border = (style.border_width > 0.0)
        .then(|| (style.border_color.fade(style.opacity), style.border_width));
    ctx.draw_box(
        data.bounds,
        style.background.fade(style.opacity),
        style.corner_radius,
        border,
    );
}
