use super::{non_negative, Align, Axis, LayoutItem, MainAxisAlignment};
use crate::primitives::Rect;

/// Two-pass flex distribution along `axis` inside `content`.
///
/// Pass one sums bases (explicit basis, else preferred main size, else the
/// current size) plus margins and the grow/shrink weights. Pass two hands
/// out the free space by weight, clamps to `[min, max]`, resolves the cross
/// axis from `cross_align` and advances the cursor.
pub fn layout_flex(
    content: Rect,
    axis: Axis,
    gap: f32,
    justify: MainAxisAlignment,
    cross_align: Align,
    items: &[LayoutItem],
) -> Vec<Rect> {
    if items.is_empty() {
        return Vec::new();
    }

    let (main_origin, cross_origin, available, cross_available) = match axis {
        Axis::Horizontal => (content.x, content.y, content.width, content.height),
        Axis::Vertical => (content.y, content.x, content.height, content.width),
    };
    let available = non_negative(available);
    let cross_available = non_negative(cross_available);
    let gap = non_negative(gap);
    let total_gap = gap * (items.len() - 1) as f32;

    // Pass 1
    let mut bases = Vec::with_capacity(items.len());
    let mut total_basis = 0.0f32;
    let mut total_grow = 0.0f32;
    let mut total_shrink = 0.0f32;
    for item in items {
        let main = item.spec.main(axis);
        let basis = basis_of(item, axis);
        bases.push(basis);
        total_basis += basis + main.margins();
        total_grow += non_negative(item.spec.flex_grow);
        total_shrink += non_negative(item.spec.flex_shrink);
    }
    let free = available - total_basis - total_gap;

    let mut sizes = Vec::with_capacity(items.len());
    let mut used = total_gap;
    for (item, &basis) in items.iter().zip(&bases) {
        let main = item.spec.main(axis);
        let size = if free > 0.0 && total_grow > 0.0 {
            basis + free * non_negative(item.spec.flex_grow) / total_grow
        } else if free < 0.0 && total_shrink > 0.0 {
            basis + free * non_negative(item.spec.flex_shrink) / total_shrink
        } else {
            basis
        };
        let size = main.clamp(size);
        used += size + main.margins();
        sizes.push(size);
    }

    let leftover = (available - used).max(0.0);
    let (mut cursor, spacing) = main_axis_spacing(justify, gap, leftover, items.len());
    cursor += main_origin;

    // Pass 2
    let mut rects = Vec::with_capacity(items.len());
    for (item, &size) in items.iter().zip(&sizes) {
        let main = item.spec.main(axis);
        let cross = item.spec.main(axis.cross());
        let cross_room = (cross_available - cross.margins()).max(0.0);
        let cross_size = match cross_align {
            Align::Stretch => cross.clamp(cross_room),
            _ if cross.preferred > 0.0 => cross.clamp(cross.preferred),
            _ => cross.clamp(cross_room),
        };
        let cross_offset = match cross_align {
            Align::Start | Align::Stretch => 0.0,
            Align::Center => (cross_room - cross_size) / 2.0,
            Align::End => cross_room - cross_size,
        };
        let cross_pos = cross_origin + cross.margin_start + cross_offset.max(0.0);

        cursor += main.margin_start;
        let rect = match axis {
            Axis::Horizontal => Rect::new(cursor, cross_pos, size, cross_size),
            Axis::Vertical => Rect::new(cross_pos, cursor, cross_size, size),
        };
        rects.push(rect);
        cursor += size + main.margin_end + spacing;
    }
    rects
}

fn basis_of(item: &LayoutItem, axis: Axis) -> f32 {
    let main = item.spec.main(axis);
    if let Some(basis) = item.spec.flex_basis {
        return non_negative(basis);
    }
    if main.preferred > 0.0 {
        return main.preferred;
    }
    non_negative(match axis {
        Axis::Horizontal => item.current.width,
        Axis::Vertical => item.current.height,
    })
}

/// Leading offset and per-child spacing for the leftover main-axis space.
fn main_axis_spacing(
    justify: MainAxisAlignment,
    gap: f32,
    free_space: f32,
    child_count: usize,
) -> (f32, f32) {
    match justify {
        MainAxisAlignment::Start => (0.0, gap),
        MainAxisAlignment::Center => (free_space / 2.0, gap),
        MainAxisAlignment::End => (free_space, gap),
        MainAxisAlignment::SpaceBetween => {
            if child_count > 1 {
                (0.0, free_space / (child_count - 1) as f32 + gap)
            } else {
                (0.0, gap)
            }
        }
        MainAxisAlignment::SpaceAround => {
            let space = free_space / child_count as f32;
            (space / 2.0, space + gap)
        }
        MainAxisAlignment::SpaceEvenly => {
            let space = free_space / (child_count + 1) as f32;
            (space, space + gap)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutSpec;
    use crate::primitives::Insets;

    fn row(content: Rect, items: &[LayoutItem]) -> Vec<Rect> {
        layout_flex(
            content,
            Axis::Horizontal,
            0.0,
            MainAxisAlignment::Start,
            Align::Stretch,
            items,
        )
    }

    #[test]
    fn test_grow_distribution() {
        let items = [
            LayoutItem::new(LayoutSpec::default().basis(100.0).grow(1.0)),
            LayoutItem::new(LayoutSpec::default().basis(100.0).grow(1.0)),
            LayoutItem::new(LayoutSpec::default().basis(100.0)),
        ];
        let rects = row(Rect::new(0.0, 0.0, 400.0, 50.0), &items);
        let widths: Vec<f32> = rects.iter().map(|r| r.width).collect();
        assert_eq!(widths, vec![150.0, 150.0, 100.0]);
        assert_eq!(rects[1].x, 150.0);
        assert_eq!(rects[2].x, 300.0);
        assert!(rects.iter().all(|r| r.height == 50.0));
    }

    #[test]
    fn test_shrink_when_overflowing() {
        let items = [
            LayoutItem::new(LayoutSpec::default().basis(300.0)),
            LayoutItem::new(LayoutSpec::default().basis(300.0).shrink(0.0)),
        ];
        let rects = row(Rect::new(0.0, 0.0, 400.0, 20.0), &items);
        assert_eq!(rects[0].width, 100.0);
        assert_eq!(rects[1].width, 300.0);
    }

    #[test]
    fn test_gap_and_margins_advance_cursor() {
        let items = [
            LayoutItem::new(LayoutSpec::default().width(50.0).margin(Insets::symmetric(5.0, 0.0))),
            LayoutItem::new(LayoutSpec::default().width(50.0)),
        ];
        let rects = layout_flex(
            Rect::new(10.0, 0.0, 300.0, 20.0),
            Axis::Horizontal,
            8.0,
            MainAxisAlignment::Start,
            Align::Stretch,
            &items,
        );
        assert_eq!(rects[0].x, 15.0);
        assert_eq!(rects[1].x, 15.0 + 50.0 + 5.0 + 8.0);
    }

    #[test]
    fn test_min_wins_over_max() {
        let items = [LayoutItem::new(
            LayoutSpec::default().basis(10.0).grow(1.0).min(80.0, 0.0).max(40.0, 100.0),
        )];
        let rects = row(Rect::new(0.0, 0.0, 400.0, 20.0), &items);
        assert_eq!(rects[0].width, 80.0);
    }

    #[test]
    fn test_column_cross_alignment() {
        let items = [LayoutItem::new(LayoutSpec::default().size(40.0, 10.0))];
        let content = Rect::new(0.0, 0.0, 100.0, 100.0);
        let center = layout_flex(
            content,
            Axis::Vertical,
            0.0,
            MainAxisAlignment::Start,
            Align::Center,
            &items,
        );
        assert_eq!(center[0], Rect::new(30.0, 0.0, 40.0, 10.0));
        let end = layout_flex(
            content,
            Axis::Vertical,
            0.0,
            MainAxisAlignment::Start,
            Align::End,
            &items,
        );
        assert_eq!(end[0].x, 60.0);
    }

    #[test]
    fn test_justify_space_between() {
        let items = [
            LayoutItem::new(LayoutSpec::default().width(20.0)),
            LayoutItem::new(LayoutSpec::default().width(20.0)),
            LayoutItem::new(LayoutSpec::default().width(20.0)),
        ];
        let rects = layout_flex(
            Rect::new(0.0, 0.0, 100.0, 10.0),
            Axis::Horizontal,
            0.0,
            MainAxisAlignment::SpaceBetween,
            Align::Stretch,
            &items,
        );
        assert_eq!(rects[0].x, 0.0);
        assert_eq!(rects[1].x, 40.0);
        assert_eq!(rects[2].x, 80.0);
    }

    #[test]
    fn test_degenerate_space_never_negative() {
        let items = [
            LayoutItem::new(LayoutSpec::default().basis(f32::NAN).grow(1.0)),
            LayoutItem::new(LayoutSpec::default().basis(50.0)),
        ];
        let rects = row(Rect::new(0.0, 0.0, -20.0, -5.0), &items);
        for r in rects {
            assert!(r.width >= 0.0 && r.height >= 0.0);
            assert!(!r.width.is_nan());
        }
    }
}
