//! The seam between the UI core and whatever actually talks to the GPU.
//!
//! The core never creates GPU objects itself. Everything goes through
//! [`RenderBackend`], which a platform layer implements on top of its
//! graphics API of choice.

use std::num::NonZeroU64;

use crate::primitives::Color;
use crate::renderer::DrawList;

/// Opaque handle to a texture owned by a backend.
///
/// The handle can never be zero, so "no texture" is spelled `Option<TextureHandle>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(NonZeroU64);

impl TextureHandle {
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn raw(self) -> u64 {
        self.0.get()
    }
}

/// Opaque handle to an offscreen render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetHandle(NonZeroU64);

impl RenderTargetHandle {
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn raw(self) -> u64 {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFormat {
    #[default]
    Rgba8,
    R8,
}

impl TextureFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::Rgba8 => 4,
            TextureFormat::R8 => 1,
        }
    }
}

/// Description of a texture upload. `data` is tightly packed rows.
#[derive(Debug, Clone, Copy)]
pub struct TextureDesc<'a> {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub data: &'a [u8],
    pub generate_mips: bool,
    pub label: Option<&'a str>,
}

impl<'a> TextureDesc<'a> {
    pub fn rgba8(width: u32, height: u32, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            format: TextureFormat::Rgba8,
            data,
            generate_mips: false,
            label: None,
        }
    }

    pub fn label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    /// True when `data` holds exactly `width * height` pixels.
    pub fn is_consistent(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len()
                == self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTargetDesc {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub clear_color: Color,
}

/// Implemented by the platform layer; consumed by [`crate::UiContext`].
pub trait RenderBackend {
    fn name(&self) -> &str;

    fn begin_frame(&mut self);
    fn end_frame(&mut self);
    fn present(&mut self);
    fn resize(&mut self, width: u32, height: u32);

    /// Draw every command of `draw_list` into the current frame.
    fn render_draw_list(&mut self, draw_list: &DrawList, viewport_width: u32, viewport_height: u32);

    /// Returns `None` when the texture could not be created.
    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Option<TextureHandle>;
    fn destroy_texture(&mut self, handle: TextureHandle);

    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Option<RenderTargetHandle>;
    fn destroy_render_target(&mut self, handle: RenderTargetHandle);

    fn set_clear_color(&mut self, _color: Color) {}
}
