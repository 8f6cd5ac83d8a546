//! Font atlas generation, text measurement and text emission.
//!
//! Glyphs are rasterized at `pixel_size * oversample` and packed into a
//! single coverage atlas that is uploaded as white RGBA (alpha = coverage)
//! so text can be tinted by vertex color. Everything handed back to callers
//! (offsets, sizes, advances, line metrics) is in screen pixels: the atlas
//! rectangle of a glyph is `oversample` times larger than its on-screen quad.

use std::collections::HashMap;
use std::num::NonZeroU32;

use fontdue::{Font, FontSettings};
use thiserror::Error;

use crate::primitives::{Color, Rect, Size, Vec2};
use crate::renderer::packer::ShelfPacker;
use crate::renderer::{DrawList, RenderBackend, TextureDesc, TextureHandle};

pub const DEFAULT_OVERSAMPLE: u32 = 2;
/// Printable ASCII, the glyph set every font gets by default.
pub const ASCII_RANGE: std::ops::RangeInclusive<char> = ' '..='~';

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FontError {
    #[error("font data could not be parsed")]
    InvalidFontData,
    #[error("atlas size {width}x{height} is not usable")]
    InvalidAtlasSize { width: u32, height: u32 },
    #[error("pixel size {0} is not usable")]
    InvalidPixelSize(f32),
    #[error("atlas is full, {0:?} did not fit")]
    AtlasFull(char),
    #[error("render backend failed to create the atlas texture")]
    TextureCreationFailed,
    #[error("no render backend is attached")]
    NoBackend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(NonZeroU32);

impl FontId {
    pub fn raw(self) -> u32 {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphInfo {
    /// Normalized atlas coordinates
    pub uv_min: Vec2,
    pub uv_max: Vec2,
    /// Quad offset from the pen position at the top of the line
    pub offset: Vec2,
    /// On-screen quad size
    pub size: Vec2,
    pub advance: f32,
}

/// Vertical metrics at a given pixel size. `descent` is negative below the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
}

/// Coverage bitmap and placement for one glyph.
#[derive(Debug, Clone, Default)]
pub struct RasterizedGlyph {
    /// Left edge relative to the pen
    pub xmin: i32,
    /// Bottom edge relative to the baseline, positive up
    pub ymin: i32,
    pub width: usize,
    pub height: usize,
    pub advance: f32,
    /// `width * height` coverage bytes, row-major
    pub coverage: Vec<u8>,
}

/// Anything that can rasterize glyphs for the atlas.
pub trait GlyphSource {
    fn line_metrics(&self, pixel_size: f32) -> Option<LineMetrics>;
    fn has_glyph(&self, ch: char) -> bool;
    fn rasterize(&self, ch: char, pixel_size: f32) -> RasterizedGlyph;
}

/// [`GlyphSource`] backed by a parsed TrueType/OpenType font.
pub struct FontdueSource {
    font: Font,
}

impl FontdueSource {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FontError> {
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|err| {
            log::warn!("failed to parse font: {err}");
            FontError::InvalidFontData
        })?;
        Ok(Self { font })
    }
}

impl GlyphSource for FontdueSource {
    fn line_metrics(&self, pixel_size: f32) -> Option<LineMetrics> {
        self.font
            .horizontal_line_metrics(pixel_size)
            .map(|m| LineMetrics {
                ascent: m.ascent,
                descent: m.descent,
                line_gap: m.line_gap,
            })
    }

    fn has_glyph(&self, ch: char) -> bool {
        self.font.lookup_glyph_index(ch) != 0
    }

    fn rasterize(&self, ch: char, pixel_size: f32) -> RasterizedGlyph {
        let (metrics, coverage) = self.font.rasterize(ch, pixel_size);
        RasterizedGlyph {
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            width: metrics.width,
            height: metrics.height,
            advance: metrics.advance_width,
            coverage,
        }
    }
}

/// A font baked into its own atlas texture.
#[derive(Debug, Clone)]
pub struct FontInstance {
    id: FontId,
    pixel_size: f32,
    ascent: f32,
    descent: f32,
    line_height: f32,
    glyphs: HashMap<char, GlyphInfo>,
    texture: TextureHandle,
    atlas_size: (u32, u32),
}

impl FontInstance {
    pub fn id(&self) -> FontId {
        self.id
    }

    pub fn pixel_size(&self) -> f32 {
        self.pixel_size
    }

    pub fn ascent(&self) -> f32 {
        self.ascent
    }

    pub fn descent(&self) -> f32 {
        self.descent
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    pub fn atlas_size(&self) -> (u32, u32) {
        self.atlas_size
    }

    pub fn glyph(&self, ch: char) -> Option<&GlyphInfo> {
        self.glyphs.get(&ch)
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Widest line and total height; an empty string still measures one line.
    pub fn measure_text(&self, text: &str) -> Size {
        let mut width: f32 = 0.0;
        let mut line_width = 0.0;
        let mut height = self.line_height;
        for ch in text.chars() {
            if ch == '\n' {
                width = width.max(line_width);
                line_width = 0.0;
                height += self.line_height;
                continue;
            }
            if let Some(glyph) = self.glyphs.get(&ch) {
                line_width += glyph.advance;
            }
        }
        Size::new(width.max(line_width), height)
    }

    /// Emit one textured quad per glyph, wrapping at `max_width` when it is positive.
    ///
    /// Returns the pen position after the last glyph.
    pub fn render_text(
        &self,
        draw_list: &mut DrawList,
        pos: Vec2,
        text: &str,
        color: Color,
        max_width: f32,
    ) -> Vec2 {
        let mut pen = pos;
        for ch in text.chars() {
            if ch == '\n' {
                pen = Vec2::new(pos.x, pen.y + self.line_height);
                continue;
            }
            let Some(glyph) = self.glyphs.get(&ch) else {
                continue;
            };
            if max_width > 0.0 && pen.x > pos.x && pen.x + glyph.advance > pos.x + max_width {
                pen = Vec2::new(pos.x, pen.y + self.line_height);
            }
            if glyph.size.x > 0.0 && glyph.size.y > 0.0 {
                let quad = Rect::new(
                    pen.x + glyph.offset.x,
                    pen.y + glyph.offset.y,
                    glyph.size.x,
                    glyph.size.y,
                );
                draw_list.add_textured_rect(quad, self.texture, glyph.uv_min, glyph.uv_max, color);
            }
            pen.x += glyph.advance;
        }
        pen
    }
}

/// Owns every baked font and hands out [`FontId`]s.
#[derive(Debug)]
pub struct FontAtlas {
    fonts: Vec<FontInstance>,
    next_id: u32,
    oversample: u32,
    charset: Vec<char>,
}

impl Default for FontAtlas {
    fn default() -> Self {
        Self::new(DEFAULT_OVERSAMPLE)
    }
}

impl FontAtlas {
    pub fn new(oversample: u32) -> Self {
        Self {
            fonts: Vec::new(),
            next_id: 1,
            oversample: oversample.max(1),
            charset: ASCII_RANGE.collect(),
        }
    }

    /// Bake these characters in addition to printable ASCII.
    pub fn with_extra_chars(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        for ch in chars {
            if !self.charset.contains(&ch) {
                self.charset.push(ch);
            }
        }
        self
    }

    pub fn oversample(&self) -> u32 {
        self.oversample
    }

    /// Parse `bytes`, bake the glyph set and upload the atlas through `backend`.
    pub fn add_font(
        &mut self,
        backend: &mut dyn RenderBackend,
        bytes: &[u8],
        pixel_size: f32,
        atlas_width: u32,
        atlas_height: u32,
    ) -> Result<FontId, FontError> {
        if atlas_width == 0 || atlas_height == 0 {
            return Err(FontError::InvalidAtlasSize {
                width: atlas_width,
                height: atlas_height,
            });
        }
        let source = FontdueSource::from_bytes(bytes)?;
        self.add_font_from_source(backend, &source, pixel_size, atlas_width, atlas_height)
    }

    pub fn add_font_from_source(
        &mut self,
        backend: &mut dyn RenderBackend,
        source: &dyn GlyphSource,
        pixel_size: f32,
        atlas_width: u32,
        atlas_height: u32,
    ) -> Result<FontId, FontError> {
        if atlas_width == 0 || atlas_height == 0 {
            return Err(FontError::InvalidAtlasSize {
                width: atlas_width,
                height: atlas_height,
            });
        }
        if !(pixel_size.is_finite() && pixel_size > 0.0) {
            return Err(FontError::InvalidPixelSize(pixel_size));
        }
        let metrics = source
            .line_metrics(pixel_size)
            .ok_or(FontError::InvalidFontData)?;

        let scale = self.oversample as f32;
        let raster_size = pixel_size * scale;
        let mut rasterized: Vec<(char, RasterizedGlyph)> = self
            .charset
            .iter()
            .filter(|ch| source.has_glyph(**ch))
            .map(|&ch| (ch, source.rasterize(ch, raster_size)))
            .collect();

        // Tallest first keeps shelves tight.
        rasterized.sort_by(|a, b| b.1.height.cmp(&a.1.height));

        let mut packer = ShelfPacker::new(atlas_width, atlas_height);
        let mut pixels = vec![0u8; atlas_width as usize * atlas_height as usize * 4];
        let mut glyphs = HashMap::with_capacity(rasterized.len());
        let (aw, ah) = (atlas_width as f32, atlas_height as f32);

        for (ch, glyph) in &rasterized {
            let slot = packer
                .pack(glyph.width as u32, glyph.height as u32)
                .ok_or(FontError::AtlasFull(*ch))?;

            for row in 0..glyph.height {
                for col in 0..glyph.width {
                    let coverage = glyph.coverage.get(row * glyph.width + col).copied().unwrap_or(0);
                    let dst = ((slot.y as usize + row) * atlas_width as usize + slot.x as usize + col) * 4;
                    pixels[dst..dst + 4].copy_from_slice(&[255, 255, 255, coverage]);
                }
            }

            let top = (glyph.ymin + glyph.height as i32) as f32 / scale;
            glyphs.insert(
                *ch,
                GlyphInfo {
                    uv_min: Vec2::new(slot.x as f32 / aw, slot.y as f32 / ah),
                    uv_max: Vec2::new(
                        (slot.x + slot.width) as f32 / aw,
                        (slot.y + slot.height) as f32 / ah,
                    ),
                    offset: Vec2::new(glyph.xmin as f32 / scale, metrics.ascent - top),
                    size: Vec2::new(glyph.width as f32 / scale, glyph.height as f32 / scale),
                    advance: glyph.advance / scale,
                },
            );
        }

        let texture = backend
            .create_texture(&TextureDesc::rgba8(atlas_width, atlas_height, &pixels).label("font atlas"))
            .ok_or_else(|| {
                log::error!("{} backend failed to create a font atlas texture", backend.name());
                FontError::TextureCreationFailed
            })?;

        let id = FontId(NonZeroU32::new(self.next_id).ok_or(FontError::InvalidFontData)?);
        self.next_id += 1;

        log::info!(
            "baked font {} at {}px: {} glyphs into {}x{} atlas",
            id.raw(),
            pixel_size,
            glyphs.len(),
            atlas_width,
            atlas_height
        );

        self.fonts.push(FontInstance {
            id,
            pixel_size,
            ascent: metrics.ascent,
            descent: metrics.descent,
            line_height: metrics.ascent - metrics.descent + metrics.line_gap,
            glyphs,
            texture,
            atlas_size: (atlas_width, atlas_height),
        });
        Ok(id)
    }

    pub fn font(&self, id: FontId) -> Option<&FontInstance> {
        self.fonts.iter().find(|font| font.id == id)
    }

    /// The first font that was added.
    pub fn default_font(&self) -> Option<&FontInstance> {
        self.fonts.first()
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    pub fn measure_text(&self, id: FontId, text: &str) -> Option<Size> {
        self.font(id).map(|font| font.measure_text(text))
    }

    pub fn render_text(
        &self,
        draw_list: &mut DrawList,
        id: FontId,
        pos: Vec2,
        text: &str,
        color: Color,
        max_width: f32,
    ) -> Option<Vec2> {
        self.font(id)
            .map(|font| font.render_text(draw_list, pos, text, color, max_width))
    }

    /// Destroy every atlas texture and forget all fonts.
    pub fn release(&mut self, backend: &mut dyn RenderBackend) {
        for font in self.fonts.drain(..) {
            backend.destroy_texture(font.texture);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::renderer::HeadlessBackend;

    /// Box-shaped glyphs whose metrics scale linearly with pixel size.
    pub(crate) struct BoxGlyphs;

    impl GlyphSource for BoxGlyphs {
        fn line_metrics(&self, pixel_size: f32) -> Option<LineMetrics> {
            Some(LineMetrics {
                ascent: pixel_size * 0.75,
                descent: -pixel_size * 0.25,
                line_gap: 0.0,
            })
        }

        fn has_glyph(&self, ch: char) -> bool {
            ch.is_ascii()
        }

        fn rasterize(&self, ch: char, pixel_size: f32) -> RasterizedGlyph {
            let (width, height) = if ch == ' ' {
                (0, 0)
            } else {
                ((pixel_size * 0.5) as usize, (pixel_size * 0.75) as usize)
            };
            RasterizedGlyph {
                xmin: 0,
                ymin: 0,
                width,
                height,
                advance: pixel_size * 0.625,
                coverage: vec![255; width * height],
            }
        }
    }

    fn baked_font(backend: &mut HeadlessBackend) -> (FontAtlas, FontId) {
        let mut atlas = FontAtlas::new(2);
        let id = atlas
            .add_font_from_source(backend, &BoxGlyphs, 10.0, 256, 256)
            .unwrap();
        (atlas, id)
    }

    #[test]
    fn test_glyph_size_is_atlas_rect_over_oversample() {
        let mut backend = HeadlessBackend::new();
        let (atlas, id) = baked_font(&mut backend);
        let font = atlas.font(id).unwrap();
        let glyph = font.glyph('A').unwrap();

        let atlas_w = (glyph.uv_max.x - glyph.uv_min.x) * 256.0;
        let atlas_h = (glyph.uv_max.y - glyph.uv_min.y) * 256.0;
        assert!((atlas_w - 10.0).abs() < 1e-3);
        assert!((atlas_h - 15.0).abs() < 1e-3);
        assert_eq!(glyph.size, Vec2::new(5.0, 7.5));
        assert_eq!(glyph.advance, 6.25);
        // Glyph as tall as the ascent, sitting on the baseline.
        assert_eq!(glyph.offset, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_line_metrics_are_screen_space() {
        let mut backend = HeadlessBackend::new();
        let (atlas, id) = baked_font(&mut backend);
        let font = atlas.font(id).unwrap();
        assert_eq!(font.ascent(), 7.5);
        assert_eq!(font.descent(), -2.5);
        assert_eq!(font.line_height(), 10.0);
        assert_eq!(font.glyph_count(), 95);
    }

    #[test]
    fn test_atlas_uploaded_as_white_coverage() {
        let mut backend = HeadlessBackend::new();
        let (atlas, id) = baked_font(&mut backend);
        let font = atlas.font(id).unwrap();
        let stored = backend.texture(font.texture()).unwrap();
        let glyph = font.glyph('A').unwrap();
        let x = (glyph.uv_min.x * 256.0) as usize;
        let y = (glyph.uv_min.y * 256.0) as usize;
        let idx = (y * 256 + x) * 4;
        assert_eq!(&stored.data[idx..idx + 4], &[255, 255, 255, 255]);
        assert_eq!(stored.data[3], 0);
    }

    #[test]
    fn test_measure_single_line() {
        let mut backend = HeadlessBackend::new();
        let (atlas, id) = baked_font(&mut backend);
        let size = atlas.measure_text(id, "abc").unwrap();
        assert_eq!(size, Size::new(18.75, 10.0));
    }

    #[test]
    fn test_measure_multi_line_uses_widest_line() {
        let mut backend = HeadlessBackend::new();
        let (atlas, id) = baked_font(&mut backend);
        let size = atlas.measure_text(id, "ab\nabcd\n").unwrap();
        assert_eq!(size, Size::new(25.0, 30.0));
    }

    #[test]
    fn test_render_skips_unknown_and_blank_glyphs() {
        let mut backend = HeadlessBackend::new();
        let (atlas, id) = baked_font(&mut backend);
        let mut list = DrawList::new();
        let end = atlas
            .render_text(&mut list, id, Vec2::ZERO, "a é b", Color::WHITE, 0.0)
            .unwrap();

        // 'a' and 'b' produce quads; spaces advance; 'é' is skipped entirely.
        assert_eq!(list.vertices().len(), 8);
        assert_eq!(end.x, 25.0);
        assert_eq!(list.commands()[0].texture, Some(atlas.font(id).unwrap().texture()));
    }

    #[test]
    fn test_render_wraps_at_max_width() {
        let mut backend = HeadlessBackend::new();
        let (atlas, id) = baked_font(&mut backend);
        let mut list = DrawList::new();
        let end = atlas
            .render_text(&mut list, id, Vec2::new(100.0, 50.0), "aaaa", Color::WHITE, 13.0)
            .unwrap();

        let tops: Vec<f32> = list.vertices().iter().step_by(4).map(|v| v.pos[1]).collect();
        assert_eq!(tops, vec![50.0, 50.0, 60.0, 60.0]);
        assert_eq!(end, Vec2::new(112.5, 60.0));
    }

    #[test]
    fn test_zero_sized_atlas_is_rejected() {
        let mut backend = HeadlessBackend::new();
        let mut atlas = FontAtlas::default();
        let err = atlas
            .add_font_from_source(&mut backend, &BoxGlyphs, 10.0, 0, 256)
            .unwrap_err();
        assert_eq!(err, FontError::InvalidAtlasSize { width: 0, height: 256 });
        assert_eq!(atlas.font_count(), 0);
    }

    #[test]
    fn test_malformed_font_bytes() {
        let mut backend = HeadlessBackend::new();
        let mut atlas = FontAtlas::default();
        let err = atlas
            .add_font(&mut backend, b"definitely not a font", 16.0, 512, 512)
            .unwrap_err();
        assert_eq!(err, FontError::InvalidFontData);
        assert_eq!(backend.texture_count(), 0);
    }

    #[test]
    fn test_texture_failure_yields_no_font() {
        let mut backend = HeadlessBackend::new().fail_texture_creation(true);
        let mut atlas = FontAtlas::default();
        let err = atlas
            .add_font_from_source(&mut backend, &BoxGlyphs, 10.0, 256, 256)
            .unwrap_err();
        assert_eq!(err, FontError::TextureCreationFailed);
        assert!(atlas.default_font().is_none());
    }

    #[test]
    fn test_small_atlas_reports_full() {
        let mut backend = HeadlessBackend::new();
        let mut atlas = FontAtlas::default();
        let err = atlas
            .add_font_from_source(&mut backend, &BoxGlyphs, 10.0, 32, 32)
            .unwrap_err();
        assert!(matches!(err, FontError::AtlasFull(_)));
    }

    #[test]
    fn test_release_destroys_textures() {
        let mut backend = HeadlessBackend::new();
        let (mut atlas, _) = baked_font(&mut backend);
        assert_eq!(backend.texture_count(), 1);
        atlas.release(&mut backend);
        assert_eq!(backend.texture_count(), 0);
        assert_eq!(atlas.font_count(), 0);
    }

    #[test]
    fn test_extra_chars_are_baked() {
        let mut backend = HeadlessBackend::new();
        let mut atlas = FontAtlas::new(1).with_extra_chars(['\u{7f}']);
        let id = atlas
            .add_font_from_source(&mut backend, &BoxGlyphs, 10.0, 256, 256)
            .unwrap();
        assert!(atlas.font(id).unwrap().glyph('\u{7f}').is_some());
    }
}
