use super::{non_negative, Axis};
use crate::primitives::Rect;

/// Divide `rect` along `axis` at `ratio`, leaving `gap` between the halves.
///
/// `Axis::Horizontal` places the halves side by side. The ratio is clamped
/// to `[0, 1]` and NaN splits in the middle.
pub fn split_rect(rect: Rect, axis: Axis, ratio: f32, gap: f32) -> (Rect, Rect) {
    let ratio = if ratio.is_nan() { 0.5 } else { ratio.clamp(0.0, 1.0) };
    match axis {
        Axis::Horizontal => {
            let gap = non_negative(gap).min(non_negative(rect.width));
            let usable = (non_negative(rect.width) - gap).max(0.0);
            let first = usable * ratio;
            (
                Rect::new(rect.x, rect.y, first, rect.height),
                Rect::new(rect.x + first + gap, rect.y, usable - first, rect.height),
            )
        }
        Axis::Vertical => {
            let gap = non_negative(gap).min(non_negative(rect.height));
            let usable = (non_negative(rect.height) - gap).max(0.0);
            let first = usable * ratio;
            (
                Rect::new(rect.x, rect.y, rect.width, first),
                Rect::new(rect.x, rect.y + first + gap, rect.width, usable - first),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_horizontal_with_gap() {
        let (a, b) = split_rect(Rect::new(0.0, 0.0, 204.0, 100.0), Axis::Horizontal, 0.5, 4.0);
        assert_eq!(a, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(b, Rect::new(104.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_split_vertical_ratio() {
        let (a, b) = split_rect(Rect::new(0.0, 0.0, 100.0, 400.0), Axis::Vertical, 0.25, 0.0);
        assert_eq!(a.height, 100.0);
        assert_eq!(b, Rect::new(0.0, 100.0, 100.0, 300.0));
    }

    #[test]
    fn test_split_degenerate() {
        let (a, b) = split_rect(Rect::new(0.0, 0.0, 2.0, 10.0), Axis::Horizontal, f32::NAN, 8.0);
        assert_eq!(a.width, 0.0);
        assert_eq!(b.width, 0.0);
    }
}
