//! Color and metric tokens shared by the built-in widgets.

use crate::primitives::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,

    pub bg_primary: Color,
    pub bg_secondary: Color,
    pub bg_tertiary: Color,
    pub bg_surface: Color,
    pub bg_surface_hover: Color,
    pub bg_surface_active: Color,
    pub bg_header: Color,
    pub bg_overlay: Color,

    pub accent: Color,
    pub accent_hover: Color,
    pub accent_active: Color,

    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_disabled: Color,

    pub border_primary: Color,
    pub border_secondary: Color,
    pub border_focused: Color,

    pub input_bg: Color,
    pub input_bg_hover: Color,

    pub tooltip_bg: Color,
    pub tooltip_text: Color,

    pub border_radius: f32,
    pub border_width: f32,
    pub padding: f32,
    pub widget_height: f32,
    pub tab_height: f32,
    pub tab_width: f32,
    pub splitter_size: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            bg_primary: Color::from_rgba8(24, 24, 37, 255),
            bg_secondary: Color::from_rgba8(30, 30, 46, 255),
            bg_tertiary: Color::from_rgba8(36, 36, 54, 255),
            bg_surface: Color::from_rgba8(40, 40, 60, 255),
            bg_surface_hover: Color::from_rgba8(50, 50, 72, 255),
            bg_surface_active: Color::from_rgba8(55, 55, 80, 255),
            bg_header: Color::from_rgba8(28, 28, 42, 255),
            bg_overlay: Color::from_rgba8(0, 0, 0, 180),
            accent: Color::from_rgba8(99, 102, 241, 255),
            accent_hover: Color::from_rgba8(129, 132, 255, 255),
            accent_active: Color::from_rgba8(79, 82, 221, 255),
            text_primary: Color::from_rgba8(205, 214, 244, 255),
            text_secondary: Color::from_rgba8(147, 153, 178, 255),
            text_disabled: Color::from_rgba8(88, 91, 112, 255),
            border_primary: Color::from_rgba8(55, 55, 80, 255),
            border_secondary: Color::from_rgba8(45, 45, 65, 255),
            border_focused: Color::from_rgba8(99, 102, 241, 255),
            input_bg: Color::from_rgba8(30, 30, 46, 255),
            input_bg_hover: Color::from_rgba8(36, 36, 54, 255),
            tooltip_bg: Color::from_rgba8(50, 50, 72, 240),
            tooltip_text: Color::from_rgba8(205, 214, 244, 255),
            border_radius: 6.0,
            border_width: 1.0,
            padding: 8.0,
            widget_height: 28.0,
            tab_height: 30.0,
            tab_width: 120.0,
            splitter_size: 4.0,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            bg_primary: Color::from_rgba8(239, 241, 245, 255),
            bg_secondary: Color::from_rgba8(230, 233, 239, 255),
            bg_tertiary: Color::from_rgba8(220, 224, 232, 255),
            bg_surface: Color::from_rgba8(255, 255, 255, 255),
            bg_surface_hover: Color::from_rgba8(236, 238, 244, 255),
            bg_surface_active: Color::from_rgba8(224, 227, 236, 255),
            bg_header: Color::from_rgba8(230, 233, 239, 255),
            bg_overlay: Color::from_rgba8(0, 0, 0, 100),
            accent: Color::from_rgba8(30, 102, 245, 255),
            accent_hover: Color::from_rgba8(60, 128, 255, 255),
            accent_active: Color::from_rgba8(20, 80, 210, 255),
            text_primary: Color::from_rgba8(76, 79, 105, 255),
            text_secondary: Color::from_rgba8(108, 111, 133, 255),
            text_disabled: Color::from_rgba8(156, 160, 176, 255),
            border_primary: Color::from_rgba8(204, 208, 218, 255),
            border_secondary: Color::from_rgba8(220, 224, 232, 255),
            border_focused: Color::from_rgba8(30, 102, 245, 255),
            input_bg: Color::from_rgba8(255, 255, 255, 255),
            input_bg_hover: Color::from_rgba8(245, 246, 250, 255),
            tooltip_bg: Color::from_rgba8(76, 79, 105, 240),
            tooltip_text: Color::from_rgba8(239, 241, 245, 255),
            ..Self::dark()
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
