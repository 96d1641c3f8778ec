use ratatui::style::Color;

// Compact palette: near-black surfaces, one teal accent, few semantic
// colors. Add roles here rather than scattering raw colors in the
// renderer.
pub const BG: Color = Color::Rgb(13, 15, 18);
pub const BAR_BG: Color = Color::Rgb(20, 24, 30);

pub const FG: Color = Color::Rgb(226, 230, 234);
pub const MUTED: Color = Color::Rgb(148, 156, 166);
pub const DIM: Color = Color::Rgb(100, 108, 120);
pub const BORDER: Color = Color::Rgb(58, 66, 78);

pub const ACCENT: Color = Color::Rgb(64, 196, 180);

pub const SUCCESS: Color = Color::Rgb(140, 220, 160); // sync ok marker
pub const ERROR: Color = Color::Rgb(244, 120, 120); // failures, delete button
