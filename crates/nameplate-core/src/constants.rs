// src/constants.rs
use crate::traits::Color;

// Canvas geometry
pub const CANVAS_WIDTH: f64 = 400.0;
pub const CANVAS_HEIGHT: f64 = 117.0;

// Font stack, in fallback priority order: (logical name, resource key)
pub const DEFAULT_FONTS: [(&str, &str); 2] = [("TnT", "fonts/TnT.ttf"), ("Kukde", "fonts/Kukde.otf")];
pub const DEFAULT_FAMILY: &str = "TnT";
pub const KANA_FAMILY: &str = "Kukde";
pub const HAN_FAMILY: &str = "Kukde";

// Title layout
pub const TITLE_Y: f64 = 50.0;
pub const TITLE_MAX_WIDTH: f64 = 320.0;
pub const TITLE_MAX_FONT_SIZE: f64 = 20.0;
pub const TITLE_MIN_FONT_SIZE: f64 = 10.0;

// Letter-spaced title layout (older variant)
pub const TITLE_LETTER_SPACING: f64 = 1.0;
pub const TITLE_LONG_THRESHOLD: usize = 23;
pub const TITLE_LONG_FONT_SIZE: f64 = 14.0;

// Player name layout
pub const NAME_FONT_SIZE: f64 = 25.0;
pub const NAME_Y: f64 = 91.5;
pub const NAME_STROKE_WIDTH: f64 = 6.0;
pub const NAME_RANK_ANCHOR: f64 = 0.26;
pub const NAME_RANK_GUTTER: f64 = 20.0;

// Rank decoration
pub const DECORATION_SCALE: f64 = 0.85;
pub const DECORATION_MARGIN_RIGHT: f64 = 100.0;
pub const DECORATION_MARGIN_BOTTOM: f64 = 7.5;

// Timing
pub const DEBOUNCE_MS: u64 = 100;
pub const FONT_LOADING_FLOOR_MS: u64 = 0;

// Assets and export
pub const DEFAULT_ASSET_ROOT: &str = "assets";
pub const EXPORT_FILENAME: &str = "nameplate.png";

// Colors
pub const TITLE_COLOR: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
pub const NAME_STROKE_COLOR: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
pub const NAME_FILL_COLOR: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };

// Select options offered by the form
pub const RANK_TIERS: [&str; 19] = [
    "5kyu", "4kyu", "3kyu", "2kyu", "1kyu",
    "1dan", "2dan", "3dan", "4dan", "5dan",
    "6dan", "7dan", "8dan", "9dan", "10dan",
    "kuroto", "meijin", "choujin", "tatsujin",
];
pub const FRAME_COLORS: [&str; 3] = ["red", "silver", "gold"];
pub const PASS_COLORS: [&str; 2] = ["red", "gold"];
