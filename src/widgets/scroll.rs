use super::{
    draw_background, Event, EventResponse, MouseButton, Placement, Widget, WidgetData, WidgetFlags,
};
use crate::layout::{Axis, LayoutItem, LayoutSpec};
use crate::primitives::Rect;
use crate::renderer::PaintContext;
use crate::tree::WidgetId;

/// Pixels moved per wheel notch.
pub const SCROLL_SPEED: f32 = 30.0;
const SCROLLBAR_WIDTH: f32 = 8.0;
const MIN_THUMB: f32 = 20.0;

/// Vertical list of children clipped to the widget and scrolled by the
/// wheel or by dragging the thumb.
///
/// Mount it with [`ScrollArea::layout_spec`]; the area stacks its children
/// top to bottom using each child's preferred height.
#[derive(Debug, Clone, Default)]
pub struct ScrollArea {
    offset: f32,
    content_height: f32,
    viewport: Rect,
    /// Pointer y and offset when the thumb was grabbed
    drag: Option<(f32, f32)>,
}

impl ScrollArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout_spec() -> LayoutSpec {
        LayoutSpec::custom()
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Applied by the next layout pass.
    pub fn scroll_to(&mut self, offset: f32) {
        self.offset = if offset.is_finite() {
            offset.clamp(0.0, self.max_scroll())
        } else {
            0.0
        };
    }

    pub fn content_height(&self) -> f32 {
        self.content_height
    }

    pub fn max_scroll(&self) -> f32 {
        (self.content_height - self.viewport.height).max(0.0)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn overflows(&self) -> bool {
        self.max_scroll() > 0.0
    }

    fn track(&self, bounds: Rect) -> Rect {
        Rect::new(
            bounds.right() - SCROLLBAR_WIDTH,
            bounds.y,
            SCROLLBAR_WIDTH.min(bounds.width),
            bounds.height,
        )
    }

    fn thumb(&self, bounds: Rect) -> Rect {
        let track = self.track(bounds);
        let ratio = if self.content_height > 0.0 {
            self.viewport.height / self.content_height
        } else {
            1.0
        };
        let height = (track.height * ratio).max(MIN_THUMB).min(track.height);
        let travel = track.height - height;
        let y = if self.overflows() {
            track.y + travel * (self.offset / self.max_scroll())
        } else {
            track.y
        };
        Rect::new(track.x, y, track.width, height)
    }

    fn drag_to(&mut self, bounds: Rect, y: f32) {
        let Some((start_y, start_offset)) = self.drag else {
            return;
        };
        let track = self.track(bounds);
        let travel = track.height - self.thumb(bounds).height;
        if travel > 0.0 {
            self.scroll_to(start_offset + (y - start_y) / travel * self.max_scroll());
        }
    }
}

impl Widget for ScrollArea {
    fn default_flags(&self) -> WidgetFlags {
        WidgetFlags::CAPTURES_MOUSE | WidgetFlags::CLIP_CHILDREN
    }

    fn arrange(
        &mut self,
        data: &WidgetData,
        children: &[(WidgetId, LayoutItem)],
        placements: &mut Vec<Placement>,
    ) {
        let area = data.content_rect();
        let gap = data.layout.gap.max(0.0);
        let heights: Vec<f32> = children
            .iter()
            .map(|(_, item)| {
                let v = item.spec.main(Axis::Vertical);
                let height = if v.preferred > 0.0 {
                    v.preferred
                } else {
                    item.current.height
                };
                v.clamp(height)
            })
            .collect();
        let mut content: f32 = children
            .iter()
            .zip(&heights)
            .map(|((_, item), h)| h + item.spec.main(Axis::Vertical).margins())
            .sum();
        content += gap * children.len().saturating_sub(1) as f32;

        self.viewport = area;
        self.content_height = content;
        self.scroll_to(self.offset);

        let width = if self.overflows() {
            (area.width - SCROLLBAR_WIDTH).max(0.0)
        } else {
            area.width
        };
        let mut y = area.y - self.offset;
        for ((id, item), height) in children.iter().zip(heights) {
            let h = item.spec.main(Axis::Horizontal);
            let v = item.spec.main(Axis::Vertical);
            y += v.margin_start;
            placements.push(Placement {
                widget: *id,
                bounds: Rect::new(
                    area.x + h.margin_start,
                    y,
                    h.clamp(width - h.margins()),
                    height,
                ),
                visible: true,
            });
            y += height + v.margin_end + gap;
        }
    }

    fn draw(&self, data: &WidgetData, ctx: &mut PaintContext) {
        draw_background(data, ctx);
    }

    fn draw_overlay(&self, data: &WidgetData, ctx: &mut PaintContext) {
        if !self.overflows() {
            return;
        }
        let theme = ctx.theme;
        let opacity = data.style.opacity;
        ctx.draw_list.add_round_rect(
            self.track(data.bounds),
            theme.bg_secondary.fade(opacity),
            SCROLLBAR_WIDTH * 0.5,
        );
        let thumb = if self.drag.is_some() {
            theme.accent_active
        } else if data.is_hovered() {
            theme.accent_hover
        } else {
            theme.border_primary
        };
        ctx.draw_list.add_round_rect(
            self.thumb(data.bounds).shrink(1.0),
            thumb.fade(opacity),
            SCROLLBAR_WIDTH * 0.5,
        );
    }

    fn event(&mut self, data: &mut WidgetData, event: &Event) -> EventResponse {
        match *event {
            Event::Scroll { delta_y, .. } => {
                let before = self.offset;
                self.scroll_to(self.offset - delta_y * SCROLL_SPEED);
                if self.offset != before {
                    EventResponse::Handled
                } else {
                    EventResponse::Ignored
                }
            }
            Event::MouseDown {
                x,
                y,
                button: MouseButton::Left,
            } if self.overflows() && self.track(data.bounds).contains((x, y).into()) => {
                let thumb = self.thumb(data.bounds);
                if !thumb.contains((x, y).into()) {
                    let track = self.track(data.bounds);
                    let travel = track.height - thumb.height;
                    if travel > 0.0 {
                        let t = (y - track.y - thumb.height * 0.5) / travel;
                        self.scroll_to(t.clamp(0.0, 1.0) * self.max_scroll());
                    }
                }
                self.drag = Some((y, self.offset));
                EventResponse::Handled
            }
            Event::MouseMove { y, .. } if self.drag.is_some() => {
                self.drag_to(data.bounds, y);
                EventResponse::Handled
            }
            Event::MouseUp {
                button: MouseButton::Left,
                ..
            } if self.drag.is_some() => {
                self.drag = None;
                EventResponse::Handled
            }
            _ => EventResponse::Ignored,
        }
    }

    crate::impl_as_any!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Tree;
    use crate::widgets::Label;

    /// Ten 40px rows in a 100px viewport.
    fn list() -> (ScrollArea, WidgetData, Vec<(WidgetId, LayoutItem)>) {
        let mut tree = Tree::new();
        let rows = (0..10)
            .map(|i| {
                let id = tree.insert(
                    WidgetData::new(format!("row{i}")),
                    Box::new(Label::new("row")),
                );
                (id, LayoutItem::new(LayoutSpec::default().height(40.0)))
            })
            .collect();
        let data = WidgetData::new("list")
            .with_layout(ScrollArea::layout_spec())
            .with_bounds(Rect::new(0.0, 0.0, 200.0, 100.0));
        (ScrollArea::new(), data, rows)
    }

    fn wheel(delta_y: f32) -> Event {
        Event::Scroll {
            x: 50.0,
            y: 50.0,
            delta_x: 0.0,
            delta_y,
        }
    }

    #[test]
    fn test_arrange_stacks_rows_and_reserves_scrollbar() {
        let (mut area, data, rows) = list();
        let mut placements = Vec::new();
        area.arrange(&data, &rows, &mut placements);

        assert_eq!(area.content_height(), 400.0);
        assert_eq!(area.max_scroll(), 300.0);
        assert_eq!(placements.len(), 10);
        assert_eq!(placements[1].bounds, Rect::new(0.0, 40.0, 192.0, 40.0));
    }

    #[test]
    fn test_wheel_scrolls_and_clamps() {
        let (mut area, mut data, rows) = list();
        let mut placements = Vec::new();
        area.arrange(&data, &rows, &mut placements);

        assert_eq!(area.event(&mut data, &wheel(-2.0)), EventResponse::Handled);
        assert_eq!(area.offset(), 60.0);
        area.event(&mut data, &wheel(-100.0));
        assert_eq!(area.offset(), 300.0);
        // Already at the bottom: let an outer scroller have it.
        assert_eq!(area.event(&mut data, &wheel(-1.0)), EventResponse::Ignored);

        placements.clear();
        area.arrange(&data, &rows, &mut placements);
        assert_eq!(placements[0].bounds.y, -300.0);
        assert_eq!(placements[9].bounds.y, 60.0);
    }

    #[test]
    fn test_short_content_does_not_scroll() {
        let (mut area, mut data, rows) = list();
        let mut placements = Vec::new();
        area.arrange(&data, &rows[..2], &mut placements);
        assert_eq!(area.max_scroll(), 0.0);
        assert_eq!(placements[0].bounds.width, 200.0);
        assert_eq!(area.event(&mut data, &wheel(-1.0)), EventResponse::Ignored);
    }

    #[test]
    fn test_thumb_drag_maps_travel_to_offset() {
        let (mut area, mut data, rows) = list();
        let mut placements = Vec::new();
        area.arrange(&data, &rows, &mut placements);

        // Thumb is 25px tall at the top of a 100px track: 75px of travel.
        let down = Event::MouseDown {
            x: 196.0,
            y: 10.0,
            button: MouseButton::Left,
        };
        assert_eq!(area.event(&mut data, &down), EventResponse::Handled);
        assert!(area.is_dragging());
        area.event(&mut data, &Event::MouseMove { x: 196.0, y: 47.5 });
        assert_eq!(area.offset(), 150.0);
        area.event(
            &mut data,
            &Event::MouseUp {
                x: 196.0,
                y: 47.5,
                button: MouseButton::Left,
            },
        );
        assert!(!area.is_dragging());
    }

    #[test]
    fn test_press_outside_scrollbar_passes_through() {
        let (mut area, mut data, rows) = list();
        let mut placements = Vec::new();
        area.arrange(&data, &rows, &mut placements);
        let down = Event::MouseDown {
            x: 50.0,
            y: 10.0,
            button: MouseButton::Left,
        };
        assert_eq!(area.event(&mut data, &down), EventResponse::Ignored);
        assert_eq!(
            area.event(
                &mut data,
                &Event::MouseUp {
                    x: 50.0,
                    y: 10.0,
                    button: MouseButton::Left,
                },
            ),
            EventResponse::Ignored
        );
    }
}
