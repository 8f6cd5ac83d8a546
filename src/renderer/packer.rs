//! Row-based ("shelf") rectangle packing for glyph atlases.

/// Gap left between packed rectangles so bilinear sampling never bleeds.
pub const PACK_PADDING: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Places rectangles left to right, opening a new row when the current one is full.
#[derive(Debug)]
pub struct ShelfPacker {
    width: u32,
    height: u32,
    pack_x: u32,
    pack_y: u32,
    row_height: u32,
}

impl ShelfPacker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pack_x: PACK_PADDING,
            pack_y: PACK_PADDING,
            row_height: 0,
        }
    }

    /// Reserve a `width` x `height` slot, or `None` when the atlas is full.
    ///
    /// Zero-area requests succeed at the cursor without consuming space.
    pub fn pack(&mut self, width: u32, height: u32) -> Option<PackedRect> {
        if width == 0 || height == 0 {
            return Some(PackedRect {
                x: self.pack_x,
                y: self.pack_y,
                width,
                height,
            });
        }

        if self.pack_x + width + PACK_PADDING > self.width {
            self.pack_x = PACK_PADDING;
            self.pack_y += self.row_height + PACK_PADDING;
            self.row_height = 0;
        }

        if self.pack_x + width + PACK_PADDING > self.width
            || self.pack_y + height + PACK_PADDING > self.height
        {
            return None;
        }

        let rect = PackedRect {
            x: self.pack_x,
            y: self.pack_y,
            width,
            height,
        };
        self.pack_x += width + PACK_PADDING;
        self.row_height = self.row_height.max(height);
        Some(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_fills_rows() {
        let mut packer = ShelfPacker::new(32, 32);
        let a = packer.pack(10, 8).unwrap();
        let b = packer.pack(10, 4).unwrap();
        let c = packer.pack(10, 6).unwrap();

        assert_eq!((a.x, a.y), (1, 1));
        assert_eq!((b.x, b.y), (12, 1));
        // Third rect does not fit on the first row (1 + 10 + 1 + 10 + 1 + 10 + 1 > 32)
        assert_eq!((c.x, c.y), (1, 10));
    }

    #[test]
    fn test_pack_reports_full_atlas() {
        let mut packer = ShelfPacker::new(16, 16);
        assert!(packer.pack(14, 14).is_some());
        assert!(packer.pack(14, 14).is_none());
        assert!(packer.pack(20, 1).is_none());
    }

    #[test]
    fn test_zero_sized_rects_do_not_consume_space() {
        let mut packer = ShelfPacker::new(16, 16);
        assert!(packer.pack(0, 0).is_some());
        let rect = packer.pack(4, 4).unwrap();
        assert_eq!((rect.x, rect.y), (1, 1));
    }
}
