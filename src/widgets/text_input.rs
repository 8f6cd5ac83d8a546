//! Single-line text field.
//!
//! Characters arrive through [`Event::TextInput`]; editing keys arrive as
//! [`Event::KeyDown`] while the field is focused. Positions are counted in
//! `char`s, never bytes.

use super::{Event, EventResponse, Key, MouseButton, Widget, WidgetData, WidgetFlags};
use crate::primitives::{Rect, Vec2};
use crate::renderer::PaintContext;

/// Seconds between caret blinks
const CARET_BLINK: f32 = 0.53;
const CARET_WIDTH: f32 = 1.5;

type TextCallback = Box<dyn FnMut(&str)>;

/// Anchor and caret of the current selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub cursor: usize,
}

impl Selection {
    pub fn new(pos: usize) -> Self {
        Self {
            anchor: pos,
            cursor: pos,
        }
    }

    pub fn has_selection(&self) -> bool {
        self.anchor != self.cursor
    }

    /// `(start, end)` in ascending order.
    pub fn range(&self) -> (usize, usize) {
        if self.anchor <= self.cursor {
            (self.anchor, self.cursor)
        } else {
            (self.cursor, self.anchor)
        }
    }

    pub fn collapse(&mut self) {
        self.anchor = self.cursor;
    }
}

pub struct TextInput {
    text: String,
    placeholder: String,
    password: bool,
    mask: char,
    selection: Selection,
    caret_visible: bool,
    blink: f32,
    on_change: Option<TextCallback>,
    on_submit: Option<TextCallback>,
}

impl TextInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            placeholder: placeholder.into(),
            password: false,
            mask: '*',
            selection: Selection::new(0),
            caret_visible: true,
            blink: 0.0,
            on_change: None,
            on_submit: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    /// Mask every character when drawing.
    pub fn password(mut self, enabled: bool) -> Self {
        self.password = enabled;
        self
    }

    pub fn mask_char(mut self, mask: char) -> Self {
        self.mask = mask;
        self
    }

    pub fn on_change(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Called with the current text when Enter is pressed.
    pub fn on_submit(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.on_submit = Some(Box::new(callback));
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text without notifying `on_change`; the caret moves to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.selection = Selection::new(self.char_count());
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Selected text, empty when the selection is collapsed.
    pub fn selected_text(&self) -> &str {
        let (start, end) = self.selection.range();
        &self.text[self.byte_index(start)..self.byte_index(end)]
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn display_text(&self) -> String {
        if self.password {
            std::iter::repeat(self.mask).take(self.char_count()).collect()
        } else {
            self.text.clone()
        }
    }

    fn notify_change(&mut self) {
        if let Some(callback) = self.on_change.as_mut() {
            callback(&self.text);
        }
    }

    fn reset_blink(&mut self) {
        self.caret_visible = true;
        self.blink = 0.0;
    }

    /// Insert at the caret, replacing the selection.
    fn insert(&mut self, text: &str) {
        let (start, end) = self.selection.range();
        let range = self.byte_index(start)..self.byte_index(end);
        self.text.replace_range(range, text);
        self.selection = Selection::new(start + text.chars().count());
        self.notify_change();
        self.reset_blink();
    }

    fn delete_range(&mut self, start: usize, end: usize) {
        let range = self.byte_index(start)..self.byte_index(end);
        self.text.replace_range(range, "");
        self.selection = Selection::new(start);
        self.notify_change();
    }

    /// Delete the selection, or one character before (`forward == false`)
    /// or after the caret.
    fn delete(&mut self, forward: bool) {
        let cursor = self.selection.cursor;
        if self.selection.has_selection() {
            let (start, end) = self.selection.range();
            self.delete_range(start, end);
        } else if forward {
            if cursor < self.char_count() {
                self.delete_range(cursor, cursor + 1);
            }
        } else if cursor > 0 {
            self.delete_range(cursor - 1, cursor);
        }
        self.reset_blink();
    }

    fn move_caret(&mut self, to: usize, extend: bool) {
        self.selection.cursor = to.min(self.char_count());
        if !extend {
            self.selection.collapse();
        }
        self.reset_blink();
    }

    fn word_boundary(&self, start: usize, forward: bool) -> usize {
        let chars: Vec<char> = self.text.chars().collect();
        if forward {
            let mut pos = start.min(chars.len());
            while pos < chars.len() && !chars[pos].is_whitespace() {
                pos += 1;
            }
            while pos < chars.len() && chars[pos].is_whitespace() {
                pos += 1;
            }
            pos
        } else {
            if start == 0 {
                return 0;
            }
            let mut pos = start.min(chars.len()) - 1;
            while pos > 0 && chars[pos].is_whitespace() {
                pos -= 1;
            }
            while pos > 0 && !chars[pos - 1].is_whitespace() {
                pos -= 1;
            }
            pos
        }
    }

    fn handle_key(&mut self, key: Key, ctrl: bool, shift: bool) -> EventResponse {
        let cursor = self.selection.cursor;
        match key {
            Key::Backspace => self.delete(false),
            Key::Delete => self.delete(true),
            Key::Enter => {
                if let Some(callback) = self.on_submit.as_mut() {
                    callback(&self.text);
                }
            }
            Key::Left if !shift && self.selection.has_selection() => {
                let (start, _) = self.selection.range();
                self.move_caret(start, false);
            }
            Key::Right if !shift && self.selection.has_selection() => {
                let (_, end) = self.selection.range();
                self.move_caret(end, false);
            }
            Key::Left => {
                let to = if ctrl {
                    self.word_boundary(cursor, false)
                } else {
                    cursor.saturating_sub(1)
                };
                self.move_caret(to, shift);
            }
            Key::Right => {
                let to = if ctrl {
                    self.word_boundary(cursor, true)
                } else {
                    cursor + 1
                };
                self.move_caret(to, shift);
            }
            Key::Home => self.move_caret(0, shift),
            Key::End => self.move_caret(self.char_count(), shift),
            Key::Char(c) if ctrl && c.eq_ignore_ascii_case(&'a') => {
                self.selection = Selection {
                    anchor: 0,
                    cursor: self.char_count(),
                };
                self.reset_blink();
            }
            // Printable characters come through `Event::TextInput`.
            _ => return EventResponse::Ignored,
        }
        EventResponse::Handled
    }
}

/// Width of the first `chars` characters of `text`.
fn prefix_width(ctx: &PaintContext, text: &str, chars: usize) -> f32 {
    let end = text
        .char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    ctx.measure_text(&text[..end]).width
}

impl std::fmt::Debug for TextInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextInput")
            .field("text", &self.text)
            .field("selection", &self.selection)
            .field("password", &self.password)
            .finish_non_exhaustive()
    }
}

impl Widget for TextInput {
    fn default_flags(&self) -> WidgetFlags {
        WidgetFlags::FOCUSABLE | WidgetFlags::CAPTURES_KEYBOARD
    }

    fn update(&mut self, data: &mut WidgetData, dt: f32) {
        if !data.is_focused() {
            return;
        }
        self.blink += dt;
        while self.blink >= CARET_BLINK {
            self.blink -= CARET_BLINK;
            self.caret_visible = !self.caret_visible;
        }
    }

    fn draw(&self, data: &WidgetData, ctx: &mut PaintContext) {
        let theme = ctx.theme;
        let bounds = data.bounds;
        let focused = data.is_focused();
        let fill = if focused || data.is_hovered() {
            theme.input_bg_hover
        } else {
            theme.input_bg
        };
        let border = if focused {
            theme.border_focused
        } else {
            theme.border_primary
        };
        ctx.draw_box(bounds, fill, theme.border_radius, Some((border, theme.border_width)));

        let inner = Rect::new(
            bounds.x + theme.padding,
            bounds.y,
            (bounds.width - theme.padding * 2.0).max(0.0),
            bounds.height,
        );
        ctx.push_clip(inner);
        if self.text.is_empty() {
            if !focused {
                ctx.draw_text_in(inner, 0.0, &self.placeholder, theme.text_disabled);
            }
        } else {
            let display = self.display_text();
            if focused && self.selection.has_selection() {
                let (start, end) = self.selection.range();
                let x0 = prefix_width(ctx, &display, start);
                let x1 = prefix_width(ctx, &display, end);
                ctx.draw_list.add_filled_rect(
                    Rect::new(inner.x + x0, inner.y + 4.0, x1 - x0, (inner.height - 8.0).max(0.0)),
                    theme.accent.with_alpha(0.4),
                );
            }
            let color = if data.is_enabled() {
                theme.text_primary
            } else {
                theme.text_disabled
            };
            ctx.draw_text_in(inner, 0.0, &display, color);
        }
        if focused && self.caret_visible {
            let x = inner.x + prefix_width(ctx, &self.display_text(), self.selection.cursor);
            ctx.draw_list.add_filled_rect(
                Rect::new(x, inner.y + 4.0, CARET_WIDTH, (inner.height - 8.0).max(0.0)),
                theme.text_primary,
            );
        }
        ctx.pop_clip();
    }

    fn event(&mut self, data: &mut WidgetData, event: &Event) -> EventResponse {
        match *event {
            Event::MouseDown {
                x,
                y,
                button: MouseButton::Left,
            } if data.bounds.contains(Vec2::new(x, y)) => {
                // Glyph metrics are only known while drawing, so a click
                // places the caret at the end.
                self.move_caret(self.char_count(), false);
                EventResponse::Handled
            }
            Event::KeyDown { key, modifiers } if data.is_focused() => {
                self.handle_key(key, modifiers.ctrl, modifiers.shift)
            }
            Event::TextInput(ch) if data.is_focused() => {
                if ch.is_control() {
                    return EventResponse::Ignored;
                }
                let mut buf = [0u8; 4];
                self.insert(ch.encode_utf8(&mut buf));
                EventResponse::Handled
            }
            Event::FocusIn => {
                self.reset_blink();
                EventResponse::Handled
            }
            Event::FocusOut => {
                self.selection.collapse();
                EventResponse::Handled
            }
            _ => EventResponse::Ignored,
        }
    }

    crate::impl_as_any!();
}
