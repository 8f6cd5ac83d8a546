//! The UI context: owner of the widget tree and driver of the frame cycle.
//!
//! One frame is `begin_frame` (clear the draw list, reset the frame arena,
//! advance animations, route input), any number of immediate-mode calls,
//! then `end_frame` (layout, update, draw, tooltip, submit to the backend).
//! Misusing the cycle is reported as a [`FrameError`] and leaves the context
//! untouched.

use thiserror::Error;

use crate::animation::{AnimProperty, AnimValue, AnimationSystem, Transition};
use crate::arena::{FrameArena, DEFAULT_ARENA_CAPACITY};
use crate::immediate::ImmediateState;
use crate::input::{InputState, MouseButton};
use crate::layout::{compute_layout, LayoutSpec};
use crate::primitives::{Rect, Size, Vec2};
use crate::renderer::{
    DrawList, FontAtlas, FontError, FontId, GlyphSource, PaintContext, RenderBackend,
};
use crate::theme::Theme;
use crate::tree::{Tree, TreeError, WidgetId};
use crate::widgets::{Event, EventResponse, Panel, Widget, WidgetData, WidgetFlags};

const TOOLTIP_PADDING: Vec2 = Vec2::new(8.0, 4.0);

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub arena_capacity: usize,
    /// Seconds the pointer must rest on a widget before its tooltip shows
    pub tooltip_delay: f32,
    /// Tooltip position relative to the cursor
    pub tooltip_offset: Vec2,
    pub atlas_width: u32,
    pub atlas_height: u32,
    pub oversample: u32,
    pub theme: Theme,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1280,
            viewport_height: 720,
            arena_capacity: DEFAULT_ARENA_CAPACITY,
            tooltip_delay: 0.5,
            tooltip_offset: Vec2::new(12.0, 16.0),
            atlas_width: 1024,
            atlas_height: 1024,
            oversample: 2,
            theme: Theme::dark(),
        }
    }
}

impl UiConfig {
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    pub fn arena_capacity(mut self, bytes: usize) -> Self {
        self.arena_capacity = bytes;
        self
    }

    pub fn tooltip_delay(mut self, seconds: f32) -> Self {
        self.tooltip_delay = seconds;
        self
    }

    pub fn tooltip_offset(mut self, offset: Vec2) -> Self {
        self.tooltip_offset = offset;
        self
    }

    pub fn atlas_size(mut self, width: u32, height: u32) -> Self {
        self.atlas_width = width;
        self.atlas_height = height;
        self
    }

    pub fn oversample(mut self, factor: u32) -> Self {
        self.oversample = factor;
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("begin_frame called while a frame is already active")]
    FrameAlreadyActive,
    #[error("end_frame called without a matching begin_frame")]
    NoActiveFrame,
    #[error("the context has no render backend; call initialize first")]
    NotInitialized,
    #[error("the context already has a render backend")]
    AlreadyInitialized,
}

/// Counters for one finished frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    pub vertices: usize,
    pub indices: usize,
    pub commands: usize,
    pub widgets_drawn: usize,
    pub animations: usize,
    pub arena_bytes: usize,
}

#[derive(Debug, Default)]
struct Tooltip {
    owner: Option<WidgetId>,
    hover_time: f32,
}

pub struct UiContext<B: RenderBackend> {
    config: UiConfig,
    backend: Option<B>,
    tree: Tree,
    root: WidgetId,
    draw_list: DrawList,
    fonts: FontAtlas,
    animations: AnimationSystem,
    arena: FrameArena,
    pub(crate) immediate: ImmediateState,

    in_frame: bool,
    frame: u64,
    dt: f32,
    mouse_pos: Vec2,

    hovered: Option<WidgetId>,
    captured: Option<WidgetId>,
    focused: Option<WidgetId>,
    tooltip: Tooltip,
}

impl<B: RenderBackend> UiContext<B> {
    pub fn new(config: UiConfig) -> Self {
        let mut tree = Tree::new();
        let data = WidgetData::new("root")
            .with_layout(LayoutSpec::dock())
            .with_bounds(Rect::new(
                0.0,
                0.0,
                config.viewport_width as f32,
                config.viewport_height as f32,
            ));
        let root = tree.insert(data, Box::new(Panel::new()));
        Self {
            fonts: FontAtlas::new(config.oversample),
            arena: FrameArena::new(config.arena_capacity),
            config,
            backend: None,
            tree,
            root,
            draw_list: DrawList::new(),
            animations: AnimationSystem::new(),
            immediate: ImmediateState::default(),
            in_frame: false,
            frame: 0,
            dt: 0.0,
            mouse_pos: Vec2::ZERO,
            hovered: None,
            captured: None,
            focused: None,
            tooltip: Tooltip::default(),
        }
    }

    /// Attach the render backend. Fonts and frames need one.
    pub fn initialize(&mut self, mut backend: B) -> Result<(), FrameError> {
        if self.backend.is_some() {
            log::error!("initialize called twice");
            return Err(FrameError::AlreadyInitialized);
        }
        backend.resize(self.config.viewport_width, self.config.viewport_height);
        backend.set_clear_color(self.config.theme.bg_primary);
        log::info!(
            "ui context initialized on {} backend, viewport {}x{}",
            backend.name(),
            self.config.viewport_width,
            self.config.viewport_height
        );
        self.backend = Some(backend);
        Ok(())
    }

    /// Release backend resources and hand the backend back.
    pub fn shutdown(&mut self) -> Result<B, FrameError> {
        let mut backend = self.backend.take().ok_or(FrameError::NotInitialized)?;
        if self.in_frame {
            log::error!("shutdown during an active frame; the frame is discarded");
            self.in_frame = false;
        }
        self.fonts.release(&mut backend);
        self.animations.clear();
        self.draw_list.clear();
        log::info!("ui context shut down after {} frames", self.frame);
        Ok(backend)
    }

    pub fn is_initialized(&self) -> bool {
        self.backend.is_some()
    }

    pub fn is_in_frame(&self) -> bool {
        self.in_frame
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend.as_mut()
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    pub fn root(&self) -> WidgetId {
        self.root
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }

    pub fn fonts(&self) -> &FontAtlas {
        &self.fonts
    }

    pub fn theme(&self) -> &Theme {
        &self.config.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if let Some(backend) = self.backend.as_mut() {
            backend.set_clear_color(theme.bg_primary);
        }
        self.config.theme = theme;
    }

    pub fn animations(&self) -> &AnimationSystem {
        &self.animations
    }

    pub fn animations_mut(&mut self) -> &mut AnimationSystem {
        &mut self.animations
    }

    /// Scratch memory valid until the next `begin_frame`.
    pub fn arena(&self) -> &FrameArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut FrameArena {
        &mut self.arena
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn viewport(&self) -> Size {
        Size::new(
            self.config.viewport_width as f32,
            self.config.viewport_height as f32,
        )
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        if let Some(backend) = self.backend.as_mut() {
            backend.resize(width, height);
        }
        self.tree.mark_needs_layout(self.root);
    }

    pub(crate) fn painter(&mut self) -> PaintContext<'_> {
        PaintContext::new(&mut self.draw_list, &self.fonts, &self.config.theme)
    }

    // Widgets

    pub fn add_widget(
        &mut self,
        parent: WidgetId,
        data: WidgetData,
        widget: impl Widget,
    ) -> Result<WidgetId, TreeError> {
        self.tree.add_new_child(parent, data, Box::new(widget))
    }

    /// Destroy `id` and its subtree, cancelling their animations.
    pub fn remove_widget(&mut self, id: WidgetId) -> Result<Vec<WidgetId>, TreeError> {
        if id == self.root {
            log::error!("refusing to remove the root widget");
            return Err(TreeError::ProtectedRoot(id));
        }
        let removed = self.tree.remove(id)?;
        let mut cancelled = 0;
        for &dead in &removed {
            cancelled += self.animations.cancel_widget(dead);
        }
        let gone = |slot: &mut Option<WidgetId>| {
            if slot.is_some_and(|w| removed.contains(&w)) {
                *slot = None;
            }
        };
        gone(&mut self.hovered);
        gone(&mut self.captured);
        gone(&mut self.focused);
        gone(&mut self.tooltip.owner);
        log::debug!(
            "removed {} widgets, cancelled {} animations",
            removed.len(),
            cancelled
        );
        Ok(removed)
    }

    pub fn animate(
        &mut self,
        widget: WidgetId,
        property: AnimProperty,
        to: impl Into<AnimValue>,
        transition: Transition,
    ) -> bool {
        self.animations
            .animate(&self.tree, widget, property, to, transition)
    }

    // Fonts

    pub fn add_font(&mut self, bytes: &[u8], pixel_size: f32) -> Result<FontId, FontError> {
        let backend = self.backend.as_mut().ok_or(FontError::NoBackend)?;
        self.fonts.add_font(
            backend,
            bytes,
            pixel_size,
            self.config.atlas_width,
            self.config.atlas_height,
        )
    }

    pub fn add_font_from_source(
        &mut self,
        source: &dyn GlyphSource,
        pixel_size: f32,
    ) -> Result<FontId, FontError> {
        let backend = self.backend.as_mut().ok_or(FontError::NoBackend)?;
        self.fonts.add_font_from_source(
            backend,
            source,
            pixel_size,
            self.config.atlas_width,
            self.config.atlas_height,
        )
    }

    // Interaction state

    pub fn hovered(&self) -> Option<WidgetId> {
        self.hovered
    }

    pub fn focused(&self) -> Option<WidgetId> {
        self.focused
    }

    pub fn captured(&self) -> Option<WidgetId> {
        self.captured
    }

    /// True while the focused widget takes every key and character for itself.
    pub fn wants_keyboard(&self) -> bool {
        self.focused
            .and_then(|id| self.tree.data(id))
            .is_some_and(|d| d.flags.contains(WidgetFlags::CAPTURES_KEYBOARD))
    }

    /// Move keyboard focus, sending `FocusOut`/`FocusIn`.
    pub fn set_focus(&mut self, target: Option<WidgetId>) -> Result<(), TreeError> {
        if let Some(id) = target {
            if !self.tree.contains(id) {
                log::warn!("set_focus on stale widget {:?}", id);
                return Err(TreeError::StaleWidget(id));
            }
        }
        if target == self.focused {
            return Ok(());
        }
        if let Some(old) = self.focused.take() {
            if let Some(data) = self.tree.data_mut(old) {
                data.set_flag(WidgetFlags::FOCUSED, false);
            }
            self.dispatch(old, &Event::FocusOut);
        }
        if let Some(new) = target {
            if let Some(data) = self.tree.data_mut(new) {
                data.set_flag(WidgetFlags::FOCUSED, true);
            }
            self.focused = Some(new);
            self.dispatch(new, &Event::FocusIn);
        }
        Ok(())
    }

    /// Id of the visible tooltip's owner, if one is showing.
    pub fn tooltip_owner(&self) -> Option<WidgetId> {
        let owner = self.tooltip.owner?;
        let has_text = self.tree.data(owner).is_some_and(|d| d.tooltip.is_some());
        (has_text && self.tooltip.hover_time >= self.config.tooltip_delay).then_some(owner)
    }

    // Frame lifecycle

    pub fn begin_frame(&mut self, dt: f32, input: &InputState) -> Result<(), FrameError> {
        if self.backend.is_none() {
            log::error!("begin_frame before initialize");
            return Err(FrameError::NotInitialized);
        }
        if self.in_frame {
            log::error!("begin_frame called twice without end_frame");
            return Err(FrameError::FrameAlreadyActive);
        }
        self.in_frame = true;
        self.frame += 1;
        self.dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.draw_list.clear();
        self.arena.reset();
        self.animations.advance(&mut self.tree, self.dt);
        self.immediate.begin(input);
        self.process_input(input);
        Ok(())
    }

    pub fn end_frame(&mut self) -> Result<FrameStats, FrameError> {
        if !self.in_frame {
            log::error!("end_frame called without begin_frame");
            return Err(FrameError::NoActiveFrame);
        }

        let viewport = Rect::from_size(self.viewport());
        if let Some(root) = self.tree.data_mut(self.root) {
            root.bounds = viewport;
        }
        compute_layout(&mut self.tree, self.root);

        let dt = self.dt;
        for id in self.tree.depth_first(self.root) {
            let visible = self.tree.data(id).is_some_and(|d| d.is_visible());
            if visible {
                self.tree.with_widget_mut(id, |widget, data| widget.update(data, dt));
            }
        }

        let mut widgets_drawn = 0;
        {
            let mut ctx = PaintContext::new(&mut self.draw_list, &self.fonts, &self.config.theme);
            draw_widget(&self.tree, self.root, &mut ctx, &mut widgets_drawn);
        }
        for id in self.tree.depth_first(self.root) {
            if let Some(data) = self.tree.data_mut(id) {
                data.flags.remove(WidgetFlags::NEEDS_REDRAW);
            }
        }
        self.draw_tooltip();

        if let Some(backend) = self.backend.as_mut() {
            backend.begin_frame();
            backend.render_draw_list(
                &self.draw_list,
                self.config.viewport_width,
                self.config.viewport_height,
            );
            backend.end_frame();
            backend.present();
        }

        self.immediate.end();
        self.in_frame = false;
        Ok(FrameStats {
            frame: self.frame,
            vertices: self.draw_list.vertices().len(),
            indices: self.draw_list.indices().len(),
            commands: self.draw_list.commands().len(),
            widgets_drawn,
            animations: self.animations.active_count(),
            arena_bytes: self.arena.used(),
        })
    }

    // Input routing

    /// Deliver `event` to `target`, then up its ancestors while it bubbles
    /// and nobody handled it. Returns the widget that handled it.
    fn dispatch(&mut self, target: WidgetId, event: &Event) -> Option<WidgetId> {
        let chain: Vec<WidgetId> = std::iter::once(target)
            .chain(self.tree.ancestors(target))
            .collect();
        for id in chain {
            if self.deliver(id, event) == EventResponse::Handled {
                return Some(id);
            }
            if !event.bubbles() {
                break;
            }
        }
        None
    }

    /// Hand `event` to one widget. Disabled and missing widgets ignore it.
    fn deliver(&mut self, id: WidgetId, event: &Event) -> EventResponse {
        self.tree
            .with_widget_mut(id, |widget, data| {
                if data.is_enabled() {
                    widget.event(data, event)
                } else {
                    EventResponse::Ignored
                }
            })
            .unwrap_or(EventResponse::Ignored)
    }

    /// Keys go to the focused widget and bubble, unless it captures the keyboard.
    fn dispatch_key(&mut self, focused: WidgetId, event: &Event) {
        if self.wants_keyboard() {
            self.deliver(focused, event);
        } else {
            self.dispatch(focused, event);
        }
    }

    fn process_input(&mut self, input: &InputState) {
        let pos = input.mouse_pos();
        let (x, y) = (pos.x, pos.y);
        self.mouse_pos = pos;
        if self.captured.is_some_and(|id| !self.tree.contains(id)) {
            self.captured = None;
        }
        let hit = self.tree.hit_test(self.root, pos);

        if hit != self.hovered {
            if let Some(old) = self.hovered.take() {
                if let Some(data) = self.tree.data_mut(old) {
                    data.set_flag(WidgetFlags::HOVERED, false);
                }
                self.dispatch(old, &Event::MouseLeave);
            }
            if let Some(new) = hit {
                if let Some(data) = self.tree.data_mut(new) {
                    data.set_flag(WidgetFlags::HOVERED, true);
                }
                self.dispatch(new, &Event::MouseEnter { x, y });
            }
            self.hovered = hit;
        }

        if self.tooltip.owner == hit {
            self.tooltip.hover_time += self.dt;
        } else {
            self.tooltip.owner = hit;
            self.tooltip.hover_time = 0.0;
        }

        let pointer_target = self.captured.or(hit);
        if input.mouse_delta() != Vec2::ZERO {
            if let Some(target) = pointer_target {
                self.dispatch(target, &Event::MouseMove { x, y });
            }
        }

        for button in MouseButton::ALL {
            if input.is_mouse_pressed(button) {
                self.tooltip.hover_time = 0.0;
                if button == MouseButton::Left {
                    let focus = hit.and_then(|h| {
                        std::iter::once(h).chain(self.tree.ancestors(h)).find(|&id| {
                            self.tree
                                .data(id)
                                .is_some_and(|d| d.flags.contains(WidgetFlags::FOCUSABLE))
                        })
                    });
                    if let Err(err) = self.set_focus(focus) {
                        log::warn!("focus change on press failed: {}", err);
                    }
                }
                if let Some(target) = self.captured.or(hit) {
                    let handler = self.dispatch(target, &Event::MouseDown { x, y, button });
                    let captures = handler.and_then(|h| self.tree.data(h)).is_some_and(|d| {
                        d.flags.contains(WidgetFlags::CAPTURES_MOUSE)
                    });
                    if captures && self.captured.is_none() {
                        self.captured = handler;
                    }
                }
            }
            if input.is_mouse_released(button) {
                if let Some(target) = self.captured.or(hit) {
                    self.dispatch(target, &Event::MouseUp { x, y, button });
                }
            }
        }
        if MouseButton::ALL.iter().all(|&b| !input.is_mouse_down(b)) {
            self.captured = None;
        }

        let scroll = input.scroll();
        if scroll != Vec2::ZERO {
            if let Some(target) = hit {
                self.dispatch(
                    target,
                    &Event::Scroll {
                        x,
                        y,
                        delta_x: scroll.x,
                        delta_y: scroll.y,
                    },
                );
            }
        }

        if let Some(focused) = self.focused {
            let modifiers = input.modifiers();
            let pressed: Vec<_> = input.keys_pressed().collect();
            let released: Vec<_> = input.keys_released().collect();
            for key in pressed {
                self.dispatch_key(focused, &Event::KeyDown { key, modifiers });
            }
            for key in released {
                self.dispatch_key(focused, &Event::KeyUp { key, modifiers });
            }
            for &ch in input.text_input() {
                self.dispatch_key(focused, &Event::TextInput(ch));
            }
        }
    }

    fn draw_tooltip(&mut self) {
        let Some(owner) = self.tooltip_owner() else {
            return;
        };
        let Some(text) = self.tree.data(owner).and_then(|d| d.tooltip.clone()) else {
            return;
        };
        let anchor = self.mouse_pos + self.config.tooltip_offset;
        let viewport = self.viewport();
        let mut ctx = PaintContext::new(&mut self.draw_list, &self.fonts, &self.config.theme);
        let size = ctx.measure_text(&text);
        let width = size.width + TOOLTIP_PADDING.x * 2.0;
        let height = size.height + TOOLTIP_PADDING.y * 2.0;
        let x = anchor.x.min(viewport.width - width).max(0.0);
        let y = anchor.y.min(viewport.height - height).max(0.0);
        let rect = Rect::new(x, y, width, height);

        let theme = ctx.theme;
        ctx.draw_box(rect, theme.tooltip_bg, 4.0, Some((theme.border_primary, 1.0)));
        ctx.draw_text(
            Vec2::new(x + TOOLTIP_PADDING.x, y + TOOLTIP_PADDING.y),
            &text,
            theme.tooltip_text,
            0.0,
        );
    }
}

impl<B: RenderBackend> std::fmt::Debug for UiContext<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiContext")
            .field("frame", &self.frame)
            .field("in_frame", &self.in_frame)
            .field("widgets", &self.tree.len())
            .field("initialized", &self.backend.is_some())
            .finish_non_exhaustive()
    }
}

/// Parent first, then children (clipped when asked), then the parent's overlay.
fn draw_widget(tree: &Tree, id: WidgetId, ctx: &mut PaintContext, drawn: &mut usize) {
    let (Some(data), Some(widget)) = (tree.data(id), tree.widget(id)) else {
        return;
    };
    if !data.is_visible() {
        return;
    }
    widget.draw(data, ctx);
    *drawn += 1;

    let clip = data.flags.contains(WidgetFlags::CLIP_CHILDREN);
    if clip {
        ctx.push_clip(data.bounds);
    }
    for &child in tree.children(id) {
        draw_widget(tree, child, ctx, drawn);
    }
    if clip {
        ctx.pop_clip();
    }
    widget.draw_overlay(data, ctx);
}
