//! Input device snapshot fed by the platform layer once per frame.
//!
//! The state keeps the current and previous frame side by side so that
//! press and release edges can be derived without an event queue.

use std::collections::HashSet;

use crate::primitives::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

    fn index(self) -> usize {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub logo: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Space,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
    /// Printable key, including letters used for shortcuts
    Char(char),
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    mouse_pos: Vec2,
    prev_mouse_pos: Vec2,
    mouse: [bool; 3],
    prev_mouse: [bool; 3],
    scroll: Vec2,
    keys: HashSet<Key>,
    prev_keys: HashSet<Key>,
    modifiers: Modifiers,
    text: Vec<char>,
    gamepad_buttons: u32,
    prev_gamepad_buttons: u32,
    gamepad_axes: [f32; 4],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roll the current frame into the previous one and clear per-frame accumulators.
    ///
    /// The platform calls this before feeding the events of a new frame.
    pub fn next_frame(&mut self) {
        self.prev_mouse_pos = self.mouse_pos;
        self.prev_mouse = self.mouse;
        self.prev_keys.clone_from(&self.keys);
        self.prev_gamepad_buttons = self.gamepad_buttons;
        self.scroll = Vec2::ZERO;
        self.text.clear();
    }

    // Platform side

    pub fn set_mouse_pos(&mut self, pos: Vec2) {
        self.mouse_pos = pos;
    }

    pub fn set_mouse_button(&mut self, button: MouseButton, down: bool) {
        self.mouse[button.index()] = down;
    }

    pub fn add_scroll(&mut self, dx: f32, dy: f32) {
        self.scroll = self.scroll + Vec2::new(dx, dy);
    }

    pub fn set_key(&mut self, key: Key, down: bool) {
        if down {
            self.keys.insert(key);
        } else {
            self.keys.remove(&key);
        }
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn push_text(&mut self, ch: char) {
        self.text.push(ch);
    }

    pub fn set_gamepad_button(&mut self, button: u8, down: bool) {
        let bit = 1u32 << (button.min(31));
        if down {
            self.gamepad_buttons |= bit;
        } else {
            self.gamepad_buttons &= !bit;
        }
    }

    pub fn set_gamepad_axis(&mut self, axis: usize, value: f32) {
        if let Some(slot) = self.gamepad_axes.get_mut(axis) {
            *slot = value.clamp(-1.0, 1.0);
        }
    }

    // Queries

    pub fn mouse_pos(&self) -> Vec2 {
        self.mouse_pos
    }

    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_pos - self.prev_mouse_pos
    }

    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.mouse[button.index()]
    }

    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse[button.index()] && !self.prev_mouse[button.index()]
    }

    pub fn is_mouse_released(&self, button: MouseButton) -> bool {
        !self.mouse[button.index()] && self.prev_mouse[button.index()]
    }

    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.keys.contains(&key) && !self.prev_keys.contains(&key)
    }

    pub fn is_key_released(&self, key: Key) -> bool {
        !self.keys.contains(&key) && self.prev_keys.contains(&key)
    }

    pub fn keys_pressed(&self) -> impl Iterator<Item = Key> + '_ {
        self.keys.difference(&self.prev_keys).copied()
    }

    pub fn keys_released(&self) -> impl Iterator<Item = Key> + '_ {
        self.prev_keys.difference(&self.keys).copied()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn text_input(&self) -> &[char] {
        &self.text
    }

    pub fn is_gamepad_pressed(&self, button: u8) -> bool {
        let bit = 1u32 << (button.min(31));
        self.gamepad_buttons & bit != 0 && self.prev_gamepad_buttons & bit == 0
    }

    pub fn gamepad_axis(&self, axis: usize) -> f32 {
        self.gamepad_axes.get(axis).copied().unwrap_or(0.0)
    }
}
