//! Per-frame batched geometry.
//!
//! Every shape appends vertices and indices to shared buffers and either
//! extends the previous [`DrawCommand`] or opens a new one. A new command is
//! only opened when the texture or the active clip rectangle changes, so a
//! typical frame ends up with a handful of submissions.

use crate::primitives::{Color, Rect, Vec2};
use crate::renderer::TextureHandle;

/// Clip rectangle in effect while the clip stack is empty.
pub const UNBOUNDED_CLIP: Rect = Rect::new(-1.0e7, -1.0e7, 2.0e7, 2.0e7);

const ROUND_CORNER_SEGMENTS: usize = 8;
pub const DEFAULT_CIRCLE_SEGMENTS: usize = 32;

/// Vertex layout consumed by render backends.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UiVertex {
    /// Position in logical pixels
    pub pos: [f32; 2],
    /// Texture coordinates, zero for untextured geometry
    pub uv: [f32; 2],
    /// Color packed as `0xAABBGGRR`
    pub color: u32,
}

/// A contiguous index range drawn with one texture and one scissor rect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub index_offset: u32,
    pub index_count: u32,
    pub clip_rect: Rect,
    pub texture: Option<TextureHandle>,
}

#[derive(Debug, Default)]
pub struct DrawList {
    vertices: Vec<UiVertex>,
    indices: Vec<u32>,
    commands: Vec<DrawCommand>,
    clip_stack: Vec<Rect>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all geometry while keeping the allocated buffers.
    pub fn clear(&mut self) {
        if !self.clip_stack.is_empty() {
            log::error!(
                "draw list cleared with {} unbalanced clip rect(s)",
                self.clip_stack.len()
            );
            self.clip_stack.clear();
        }
        self.vertices.clear();
        self.indices.clear();
        self.commands.clear();
    }

    pub fn vertices(&self) -> &[UiVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn capacity(&self) -> (usize, usize) {
        (self.vertices.capacity(), self.indices.capacity())
    }

    // Clipping

    /// Push a clip rectangle; the active clip becomes its intersection with the current one.
    pub fn push_clip_rect(&mut self, rect: Rect) {
        let clipped = rect.intersection(&self.current_clip_rect());
        self.clip_stack.push(clipped);
    }

    /// Returns `false` (and logs) when the stack was already empty.
    pub fn pop_clip_rect(&mut self) -> bool {
        if self.clip_stack.pop().is_none() {
            log::error!("pop_clip_rect called on an empty clip stack");
            return false;
        }
        true
    }

    pub fn current_clip_rect(&self) -> Rect {
        self.clip_stack.last().copied().unwrap_or(UNBOUNDED_CLIP)
    }

    pub fn clip_depth(&self) -> usize {
        self.clip_stack.len()
    }

    // Shapes

    pub fn add_filled_rect(&mut self, rect: Rect, color: Color) {
        if rect.is_empty() {
            return;
        }
        self.add_gradient_rect(rect, color, color, color, color);
    }

    /// Corner colors run clockwise from the top-left.
    pub fn add_gradient_rect(
        &mut self,
        rect: Rect,
        top_left: Color,
        top_right: Color,
        bottom_right: Color,
        bottom_left: Color,
    ) {
        if rect.is_empty() {
            return;
        }
        let base = self.begin_primitive(None);
        self.push_vertex(Vec2::new(rect.x, rect.y), Vec2::ZERO, top_left.pack_abgr());
        self.push_vertex(Vec2::new(rect.right(), rect.y), Vec2::ZERO, top_right.pack_abgr());
        self.push_vertex(
            Vec2::new(rect.right(), rect.bottom()),
            Vec2::ZERO,
            bottom_right.pack_abgr(),
        );
        self.push_vertex(Vec2::new(rect.x, rect.bottom()), Vec2::ZERO, bottom_left.pack_abgr());
        self.push_quad_indices(base);
    }

    /// Outline drawn as four filled strips inside `rect`.
    pub fn add_rect(&mut self, rect: Rect, color: Color, thickness: f32) {
        if rect.is_empty() || thickness <= 0.0 {
            return;
        }
        let t = thickness.min(rect.width * 0.5).min(rect.height * 0.5);
        self.add_filled_rect(Rect::new(rect.x, rect.y, rect.width, t), color);
        self.add_filled_rect(Rect::new(rect.x, rect.bottom() - t, rect.width, t), color);
        self.add_filled_rect(Rect::new(rect.x, rect.y + t, t, rect.height - 2.0 * t), color);
        self.add_filled_rect(
            Rect::new(rect.right() - t, rect.y + t, t, rect.height - 2.0 * t),
            color,
        );
    }

    /// Filled rectangle with circular corners, emitted as a fan around the center.
    pub fn add_round_rect(&mut self, rect: Rect, color: Color, radius: f32) {
        if rect.is_empty() {
            return;
        }
        let r = radius.min(rect.width * 0.5).min(rect.height * 0.5);
        if r <= 0.0 {
            self.add_filled_rect(rect, color);
            return;
        }

        let packed = color.pack_abgr();
        let base = self.begin_primitive(None);
        self.push_vertex(rect.center(), Vec2::ZERO, packed);

        // Corner centers with the start angle of each quarter arc, clockwise from top-left.
        let corners = [
            (Vec2::new(rect.x + r, rect.y + r), std::f32::consts::PI),
            (Vec2::new(rect.right() - r, rect.y + r), 1.5 * std::f32::consts::PI),
            (Vec2::new(rect.right() - r, rect.bottom() - r), 0.0),
            (Vec2::new(rect.x + r, rect.bottom() - r), 0.5 * std::f32::consts::PI),
        ];
        let step = std::f32::consts::FRAC_PI_2 / ROUND_CORNER_SEGMENTS as f32;
        for (center, start) in corners {
            for i in 0..=ROUND_CORNER_SEGMENTS {
                let angle = start + step * i as f32;
                let p = Vec2::new(center.x + angle.cos() * r, center.y + angle.sin() * r);
                self.push_vertex(p, Vec2::ZERO, packed);
            }
        }

        let rim = (ROUND_CORNER_SEGMENTS as u32 + 1) * 4;
        for i in 0..rim {
            let next = (i + 1) % rim;
            self.push_triangle(base, base + 1 + i, base + 1 + next);
        }
    }

    pub fn add_circle(&mut self, center: Vec2, radius: f32, color: Color, segments: usize) {
        if radius <= 0.0 {
            return;
        }
        let segments = segments.max(3);
        let packed = color.pack_abgr();
        let base = self.begin_primitive(None);
        self.push_vertex(center, Vec2::ZERO, packed);
        let step = std::f32::consts::TAU / segments as f32;
        for i in 0..segments {
            let angle = step * i as f32;
            let p = Vec2::new(center.x + angle.cos() * radius, center.y + angle.sin() * radius);
            self.push_vertex(p, Vec2::ZERO, packed);
        }
        let segments = segments as u32;
        for i in 0..segments {
            self.push_triangle(base, base + 1 + i, base + 1 + (i + 1) % segments);
        }
    }

    pub fn add_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        let packed = color.pack_abgr();
        let base = self.begin_primitive(None);
        self.push_vertex(a, Vec2::ZERO, packed);
        self.push_vertex(b, Vec2::ZERO, packed);
        self.push_vertex(c, Vec2::ZERO, packed);
        self.push_triangle(base, base + 1, base + 2);
    }

    /// Thick line as a quad offset along the segment's perpendicular.
    pub fn add_line(&mut self, from: Vec2, to: Vec2, color: Color, thickness: f32) {
        let dir = (to - from).normalized();
        if dir == Vec2::ZERO || thickness <= 0.0 {
            return;
        }
        let n = dir.perpendicular() * (thickness * 0.5);
        let packed = color.pack_abgr();
        let base = self.begin_primitive(None);
        self.push_vertex(from + n, Vec2::ZERO, packed);
        self.push_vertex(to + n, Vec2::ZERO, packed);
        self.push_vertex(to - n, Vec2::ZERO, packed);
        self.push_vertex(from - n, Vec2::ZERO, packed);
        self.push_quad_indices(base);
    }

    /// Cubic bezier flattened into `segments` thick line pieces.
    pub fn add_bezier_cubic(
        &mut self,
        points: [Vec2; 4],
        color: Color,
        thickness: f32,
        segments: usize,
    ) {
        let segments = segments.max(1);
        let [p0, p1, p2, p3] = points;
        let eval = |t: f32| {
            let mt = 1.0 - t;
            p0 * (mt * mt * mt) + p1 * (3.0 * mt * mt * t) + p2 * (3.0 * mt * t * t) + p3 * (t * t * t)
        };
        let mut prev = p0;
        for i in 1..=segments {
            let next = eval(i as f32 / segments as f32);
            self.add_line(prev, next, color, thickness);
            prev = next;
        }
    }

    pub fn add_textured_rect(
        &mut self,
        rect: Rect,
        texture: TextureHandle,
        uv_min: Vec2,
        uv_max: Vec2,
        tint: Color,
    ) {
        if rect.is_empty() {
            return;
        }
        let packed = tint.pack_abgr();
        let base = self.begin_primitive(Some(texture));
        self.push_vertex(Vec2::new(rect.x, rect.y), uv_min, packed);
        self.push_vertex(Vec2::new(rect.right(), rect.y), Vec2::new(uv_max.x, uv_min.y), packed);
        self.push_vertex(Vec2::new(rect.right(), rect.bottom()), uv_max, packed);
        self.push_vertex(Vec2::new(rect.x, rect.bottom()), Vec2::new(uv_min.x, uv_max.y), packed);
        self.push_quad_indices(base);
    }

    // Internals

    /// Make sure the last command matches the current texture and clip, returning the
    /// index of the next vertex.
    fn begin_primitive(&mut self, texture: Option<TextureHandle>) -> u32 {
        let clip_rect = self.current_clip_rect();
        let mergeable = matches!(
            self.commands.last(),
            Some(last) if last.texture == texture && last.clip_rect == clip_rect
        );
        if !mergeable {
            self.commands.push(DrawCommand {
                index_offset: self.indices.len() as u32,
                index_count: 0,
                clip_rect,
                texture,
            });
        }
        self.vertices.len() as u32
    }

    fn push_vertex(&mut self, pos: Vec2, uv: Vec2, color: u32) {
        self.vertices.push(UiVertex {
            pos: [pos.x, pos.y],
            uv: [uv.x, uv.y],
            color,
        });
    }

    fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
        if let Some(cmd) = self.commands.last_mut() {
            cmd.index_count += 3;
        }
    }

    fn push_quad_indices(&mut self, base: u32) {
        self.push_triangle(base, base + 1, base + 2);
        self.push_triangle(base, base + 2, base + 3);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture(raw: u64) -> TextureHandle {
        TextureHandle::new(raw).unwrap()
    }

    #[test]
    fn test_filled_rect_geometry() {
        let mut list = DrawList::new();
        list.add_filled_rect(Rect::new(0.0, 0.0, 10.0, 20.0), Color::WHITE);

        assert_eq!(list.vertices().len(), 4);
        assert_eq!(list.indices(), &[0, 1, 2, 0, 2, 3]);
        assert_eq!(list.commands().len(), 1);
        assert_eq!(list.commands()[0].index_count, 6);
        assert_eq!(list.commands()[0].clip_rect, UNBOUNDED_CLIP);
    }

    #[test]
    fn test_commands_merge_with_same_texture_and_clip() {
        let mut list = DrawList::new();
        list.add_filled_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
        list.add_circle(Vec2::new(5.0, 5.0), 4.0, Color::BLACK, 12);
        list.add_line(Vec2::ZERO, Vec2::new(10.0, 0.0), Color::WHITE, 2.0);

        assert_eq!(list.commands().len(), 1);
        assert_eq!(list.commands()[0].index_count as usize, list.indices().len());
    }

    #[test]
    fn test_texture_change_opens_command() {
        let mut list = DrawList::new();
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        list.add_filled_rect(rect, Color::WHITE);
        list.add_textured_rect(rect, texture(1), Vec2::ZERO, Vec2::new(1.0, 1.0), Color::WHITE);
        list.add_textured_rect(rect, texture(1), Vec2::ZERO, Vec2::new(1.0, 1.0), Color::WHITE);
        list.add_textured_rect(rect, texture(2), Vec2::ZERO, Vec2::new(1.0, 1.0), Color::WHITE);

        let commands = list.commands();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0].texture, None);
        assert_eq!(commands[1].texture, Some(texture(1)));
        assert_eq!(commands[1].index_offset, 6);
        assert_eq!(commands[1].index_count, 12);
        assert_eq!(commands[2].index_offset, 18);
    }

    #[test]
    fn test_clip_change_opens_command() {
        let mut list = DrawList::new();
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        list.add_filled_rect(rect, Color::WHITE);
        list.push_clip_rect(Rect::new(0.0, 0.0, 5.0, 5.0));
        list.add_filled_rect(rect, Color::WHITE);
        list.pop_clip_rect();
        list.add_filled_rect(rect, Color::WHITE);

        let commands = list.commands();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[1].clip_rect, Rect::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(commands[2].clip_rect, UNBOUNDED_CLIP);
    }

    #[test]
    fn test_clip_stack_intersects() {
        let mut list = DrawList::new();
        list.push_clip_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        list.push_clip_rect(Rect::new(50.0, 50.0, 100.0, 100.0));
        assert_eq!(list.current_clip_rect(), Rect::new(50.0, 50.0, 50.0, 50.0));
        assert_eq!(list.clip_depth(), 2);

        assert!(list.pop_clip_rect());
        assert_eq!(list.current_clip_rect(), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(list.pop_clip_rect());
        assert!(!list.pop_clip_rect());
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut list = DrawList::new();
        for i in 0..64 {
            list.add_filled_rect(Rect::new(i as f32, 0.0, 1.0, 1.0), Color::WHITE);
        }
        let (vtx_cap, idx_cap) = list.capacity();
        list.push_clip_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        list.clear();

        assert!(list.is_empty());
        assert!(list.commands().is_empty());
        assert_eq!(list.clip_depth(), 0);
        assert_eq!(list.capacity(), (vtx_cap, idx_cap));
    }

    #[test]
    fn test_round_rect_fan() {
        let mut list = DrawList::new();
        list.add_round_rect(Rect::new(0.0, 0.0, 40.0, 20.0), Color::WHITE, 4.0);
        let rim = (ROUND_CORNER_SEGMENTS + 1) * 4;
        assert_eq!(list.vertices().len(), rim + 1);
        assert_eq!(list.indices().len(), rim * 3);
        for v in list.vertices() {
            assert!(v.pos[0] >= -0.001 && v.pos[0] <= 40.001);
            assert!(v.pos[1] >= -0.001 && v.pos[1] <= 20.001);
        }
    }

    #[test]
    fn test_round_rect_without_radius_is_plain_quad() {
        let mut list = DrawList::new();
        list.add_round_rect(Rect::new(0.0, 0.0, 40.0, 20.0), Color::WHITE, 0.0);
        assert_eq!(list.vertices().len(), 4);
    }

    #[test]
    fn test_rect_outline_strips() {
        let mut list = DrawList::new();
        list.add_rect(Rect::new(0.0, 0.0, 40.0, 20.0), Color::WHITE, 1.0);
        assert_eq!(list.vertices().len(), 16);
        assert_eq!(list.commands().len(), 1);
    }

    #[test]
    fn test_degenerate_shapes_are_skipped() {
        let mut list = DrawList::new();
        list.add_filled_rect(Rect::new(0.0, 0.0, 0.0, 10.0), Color::WHITE);
        list.add_line(Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0), Color::WHITE, 1.0);
        list.add_circle(Vec2::ZERO, 0.0, Color::WHITE, 16);
        assert!(list.is_empty());
        assert!(list.commands().is_empty());
    }

    #[test]
    fn test_line_is_offset_along_perpendicular() {
        let mut list = DrawList::new();
        list.add_line(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Color::WHITE, 2.0);
        let ys: Vec<f32> = list.vertices().iter().map(|v| v.pos[1]).collect();
        assert_eq!(ys, vec![1.0, 1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_textured_rect_uvs() {
        let mut list = DrawList::new();
        list.add_textured_rect(
            Rect::new(0.0, 0.0, 8.0, 8.0),
            texture(3),
            Vec2::new(0.25, 0.5),
            Vec2::new(0.75, 1.0),
            Color::WHITE,
        );
        let uvs: Vec<[f32; 2]> = list.vertices().iter().map(|v| v.uv).collect();
        assert_eq!(uvs, vec![[0.25, 0.5], [0.75, 0.5], [0.75, 1.0], [0.25, 1.0]]);
    }
}
