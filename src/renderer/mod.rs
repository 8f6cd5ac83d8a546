pub mod backend;
pub mod draw_list;
pub mod font_atlas;
pub mod headless;
mod packer;

pub use backend::{
    RenderBackend, RenderTargetDesc, RenderTargetHandle, TextureDesc, TextureFormat, TextureHandle,
};
pub use draw_list::{DrawCommand, DrawList, UiVertex, DEFAULT_CIRCLE_SEGMENTS, UNBOUNDED_CLIP};
pub use font_atlas::{
    FontAtlas, FontError, FontId, FontInstance, FontdueSource, GlyphInfo, GlyphSource,
    LineMetrics, RasterizedGlyph,
};
pub use headless::{HeadlessBackend, StoredTexture, Submission};

use crate::primitives::{Color, Rect, Size, Vec2};
use crate::theme::Theme;

/// Everything a widget needs while drawing itself.
pub struct PaintContext<'a> {
    pub draw_list: &'a mut DrawList,
    pub fonts: &'a FontAtlas,
    pub theme: &'a Theme,
}

impl<'a> PaintContext<'a> {
    pub fn new(draw_list: &'a mut DrawList, fonts: &'a FontAtlas, theme: &'a Theme) -> Self {
        Self {
            draw_list,
            fonts,
            theme,
        }
    }

    /// Filled box with optional rounding and border; zero widths are skipped.
    pub fn draw_box(
        &mut self,
        rect: Rect,
        fill: Color,
        radius: f32,
        border: Option<(Color, f32)>,
    ) {
        if !fill.is_transparent() {
            self.draw_list.add_round_rect(rect, fill, radius);
        }
        if let Some((color, width)) = border {
            if width > 0.0 && !color.is_transparent() {
                self.draw_list.add_rect(rect, color, width);
            }
        }
    }

    /// Draw with the default font; does nothing when no font is loaded.
    pub fn draw_text(&mut self, pos: Vec2, text: &str, color: Color, max_width: f32) {
        if let Some(font) = self.fonts.default_font() {
            font.render_text(self.draw_list, pos, text, color, max_width);
        }
    }

    /// Text size with the default font, or zero when no font is loaded.
    pub fn measure_text(&self, text: &str) -> Size {
        self.fonts
            .default_font()
            .map(|font| font.measure_text(text))
            .unwrap_or_default()
    }

    /// Draw `text` vertically centered in `rect`, starting at its left edge plus `inset`.
    pub fn draw_text_in(&mut self, rect: Rect, inset: f32, text: &str, color: Color) {
        let size = self.measure_text(text);
        let pos = Vec2::new(rect.x + inset, rect.y + (rect.height - size.height) * 0.5);
        self.draw_text(pos, text, color, 0.0);
    }

    pub fn push_clip(&mut self, rect: Rect) {
        self.draw_list.push_clip_rect(rect);
    }

    pub fn pop_clip(&mut self) {
        self.draw_list.pop_clip_rect();
    }
}
