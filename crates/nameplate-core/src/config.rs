// src/config.rs
use crate::assets::FontSpec;
use crate::constants::*;
use crate::font::script::{Script, ScriptRule};
use crate::traits::Color;
use std::path::PathBuf;
use std::time::Duration;

/// How the title line is laid out
#[derive(Clone, Debug, PartialEq)]
pub enum TitleMode {
    /// Whole string, centered, shrunk one pixel at a time until it fits
    AutoShrink { max_width: f64, max_size: f64, min_size: f64 },
    /// Per-grapheme placement with a fixed gap; size picked by grapheme count
    LetterSpaced { spacing: f64, long_threshold: usize, size: f64, long_size: f64 },
}

impl Default for TitleMode {
    fn default() -> Self {
        TitleMode::AutoShrink {
            max_width: TITLE_MAX_WIDTH,
            max_size: TITLE_MAX_FONT_SIZE,
            min_size: TITLE_MIN_FONT_SIZE,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PlateConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Font resources in fallback priority order
    pub fonts: Vec<FontSpec>,
    /// Script rules, checked in order
    pub script_rules: Vec<ScriptRule>,
    pub default_family: String,
    pub title_mode: TitleMode,
    pub title_y: f64,
    pub title_color: Color,
    pub name_font_size: f64,
    pub name_y: f64,
    pub name_stroke_width: f64,
    pub name_stroke_color: Color,
    pub name_fill_color: Color,
    pub decoration_scale: f64,
    pub decoration_margin_right: f64,
    pub decoration_margin_bottom: f64,
    pub debounce: Duration,
    /// Minimum time the font gate stays closed, overlapping the loads
    pub font_loading_floor: Duration,
    pub asset_root: PathBuf,
    pub export_filename: String,
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            fonts: DEFAULT_FONTS
                .iter()
                .map(|(name, key)| FontSpec::new(name, key))
                .collect(),
            script_rules: vec![
                ScriptRule::new(Script::Kana, KANA_FAMILY),
                ScriptRule::new(Script::Han, HAN_FAMILY),
            ],
            default_family: DEFAULT_FAMILY.to_string(),
            title_mode: TitleMode::default(),
            title_y: TITLE_Y,
            title_color: TITLE_COLOR,
            name_font_size: NAME_FONT_SIZE,
            name_y: NAME_Y,
            name_stroke_width: NAME_STROKE_WIDTH,
            name_stroke_color: NAME_STROKE_COLOR,
            name_fill_color: NAME_FILL_COLOR,
            decoration_scale: DECORATION_SCALE,
            decoration_margin_right: DECORATION_MARGIN_RIGHT,
            decoration_margin_bottom: DECORATION_MARGIN_BOTTOM,
            debounce: Duration::from_millis(DEBOUNCE_MS),
            font_loading_floor: Duration::from_millis(FONT_LOADING_FLOOR_MS),
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            export_filename: EXPORT_FILENAME.to_string(),
        }
    }
}

impl PlateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_canvas_size(mut self, width: f64, height: f64) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    pub fn with_fonts(mut self, fonts: Vec<FontSpec>) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn with_script_rules(mut self, rules: Vec<ScriptRule>, default_family: &str) -> Self {
        self.script_rules = rules;
        self.default_family = default_family.to_string();
        self
    }

    pub fn with_title_mode(mut self, mode: TitleMode) -> Self {
        self.title_mode = mode;
        self
    }

    /// The older per-character title layout
    pub fn with_letter_spaced_title(self) -> Self {
        self.with_title_mode(TitleMode::LetterSpaced {
            spacing: TITLE_LETTER_SPACING,
            long_threshold: TITLE_LONG_THRESHOLD,
            size: TITLE_MAX_FONT_SIZE,
            long_size: TITLE_LONG_FONT_SIZE,
        })
    }

    pub fn with_decoration_layout(mut self, scale: f64, margin_right: f64, margin_bottom: f64) -> Self {
        self.decoration_scale = scale;
        self.decoration_margin_right = margin_right;
        self.decoration_margin_bottom = margin_bottom;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_font_loading_floor(mut self, floor: Duration) -> Self {
        self.font_loading_floor = floor;
        self
    }

    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }
}
