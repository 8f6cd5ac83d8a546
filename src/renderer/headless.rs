//! A [`RenderBackend`] that keeps everything in memory.
//!
//! Useful for tests, tooling and servers that want to drive the UI core
//! without a GPU. It records texture uploads and a summary of every
//! submitted draw list.

use std::collections::HashMap;

use crate::primitives::Color;
use crate::renderer::{
    DrawList, RenderBackend, RenderTargetDesc, RenderTargetHandle, TextureDesc, TextureFormat,
    TextureHandle,
};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredTexture {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub data: Vec<u8>,
}

/// Summary of one `render_draw_list` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Submission {
    pub vertices: usize,
    pub indices: usize,
    pub commands: usize,
    pub viewport: (u32, u32),
}

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_handle: u64,
    textures: HashMap<TextureHandle, StoredTexture>,
    render_targets: HashMap<RenderTargetHandle, RenderTargetDesc>,
    submissions: Vec<Submission>,
    frames_begun: u64,
    frames_presented: u64,
    size: (u32, u32),
    clear_color: Color,
    fail_texture_creation: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `create_texture` fail, simulating a lost device.
    pub fn fail_texture_creation(mut self, fail: bool) -> Self {
        self.fail_texture_creation = fail;
        self
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&StoredTexture> {
        self.textures.get(&handle)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn render_target_count(&self) -> usize {
        self.render_targets.len()
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn last_submission(&self) -> Option<Submission> {
        self.submissions.last().copied()
    }

    pub fn frames_begun(&self) -> u64 {
        self.frames_begun
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    fn allocate_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl RenderBackend for HeadlessBackend {
    fn name(&self) -> &str {
        "headless"
    }

    fn begin_frame(&mut self) {
        self.frames_begun += 1;
    }

    fn end_frame(&mut self) {}

    fn present(&mut self) {
        self.frames_presented += 1;
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn render_draw_list(&mut self, draw_list: &DrawList, viewport_width: u32, viewport_height: u32) {
        self.submissions.push(Submission {
            vertices: draw_list.vertices().len(),
            indices: draw_list.indices().len(),
            commands: draw_list.commands().len(),
            viewport: (viewport_width, viewport_height),
        });
    }

    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Option<TextureHandle> {
        if self.fail_texture_creation {
            return None;
        }
        if !desc.is_consistent() {
            log::warn!(
                "rejecting {}x{} texture with {} bytes of data",
                desc.width,
                desc.height,
                desc.data.len()
            );
            return None;
        }
        let handle = TextureHandle::new(self.allocate_handle())?;
        self.textures.insert(
            handle,
            StoredTexture {
                width: desc.width,
                height: desc.height,
                format: desc.format,
                data: desc.data.to_vec(),
            },
        );
        Some(handle)
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        if self.textures.remove(&handle).is_none() {
            log::warn!("destroy_texture: unknown handle {}", handle.raw());
        }
    }

    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Option<RenderTargetHandle> {
        if desc.width == 0 || desc.height == 0 {
            return None;
        }
        let handle = RenderTargetHandle::new(self.allocate_handle())?;
        self.render_targets.insert(handle, *desc);
        Some(handle)
    }

    fn destroy_render_target(&mut self, handle: RenderTargetHandle) {
        self.render_targets.remove(&handle);
    }

    fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_lifecycle() {
        let mut backend = HeadlessBackend::new();
        let pixels = vec![255u8; 2 * 2 * 4];
        let handle = backend
            .create_texture(&TextureDesc::rgba8(2, 2, &pixels))
            .unwrap();
        assert_eq!(backend.texture_count(), 1);
        assert_eq!(backend.texture(handle).unwrap().width, 2);

        backend.destroy_texture(handle);
        assert_eq!(backend.texture_count(), 0);
    }

    #[test]
    fn test_failing_backend() {
        let mut backend = HeadlessBackend::new().fail_texture_creation(true);
        let pixels = vec![0u8; 4];
        assert!(backend.create_texture(&TextureDesc::rgba8(1, 1, &pixels)).is_none());
    }

    #[test]
    fn test_render_target_rejects_zero_size() {
        let mut backend = HeadlessBackend::new();
        let desc = RenderTargetDesc {
            width: 0,
            height: 64,
            format: TextureFormat::Rgba8,
            clear_color: Color::BLACK,
        };
        assert!(backend.create_render_target(&desc).is_none());
        let desc = RenderTargetDesc { width: 64, ..desc };
        let handle = backend.create_render_target(&desc).unwrap();
        assert_eq!(backend.render_target_count(), 1);
        backend.destroy_render_target(handle);
        assert_eq!(backend.render_target_count(), 0);
    }

    #[test]
    fn test_submission_is_recorded() {
        let mut backend = HeadlessBackend::new();
        let mut list = DrawList::new();
        list.add_filled_rect(crate::primitives::Rect::new(0.0, 0.0, 4.0, 4.0), Color::WHITE);
        backend.render_draw_list(&list, 800, 600);

        let submission = backend.last_submission().unwrap();
        assert_eq!(submission.vertices, 4);
        assert_eq!(submission.indices, 6);
        assert_eq!(submission.commands, 1);
        assert_eq!(submission.viewport, (800, 600));
    }
}
