//! Font cache with per-character fallback for raster backends

use crate::traits::FontDescription;
use fontdue::{Font, FontSettings};
use std::collections::HashMap;

/// Font selection error types
#[derive(Debug, thiserror::Error)]
pub enum FontSelectionError {
    #[error("Invalid font data for {family}: {reason}")]
    InvalidFontData { family: String, reason: String },

    #[error("No fonts available in fallback chain")]
    NoFontsAvailable,
}

/// Rasterized glyph coverage plus placement metrics
#[derive(Debug, Clone)]
pub struct GlyphBitmap {
    /// 8-bit coverage, `width * height`, rows top to bottom
    pub coverage: Vec<u8>,
    pub width: usize,
    pub height: usize,
    /// Offset of the bitmap's left edge from the pen position
    pub xmin: i32,
    /// Offset of the bitmap's bottom edge above the baseline
    pub ymin: i32,
    pub advance: f32,
}

/// Loaded font faces keyed by logical family name
///
/// Each character is drawn with the first family in the requested stack
/// whose face has a glyph for it, so missing glyphs fall through the stack
/// instead of rendering as tofu in the preferred family.
#[derive(Default)]
pub struct FontCache {
    fonts: Vec<(String, Font)>,
    /// (font index, char, size bits) -> rasterized glyph
    glyph_cache: HashMap<(usize, char, u32), GlyphBitmap>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and register a face, replacing any face already under `family`
    pub fn register(&mut self, family: &str, data: &[u8]) -> Result<(), FontSelectionError> {
        let font = Font::from_bytes(data, FontSettings::default()).map_err(|reason| {
            FontSelectionError::InvalidFontData {
                family: family.to_string(),
                reason: reason.to_string(),
            }
        })?;

        match self.index_of(family) {
            Some(index) => {
                self.fonts[index].1 = font;
                self.glyph_cache.retain(|(i, _, _), _| *i != index);
            }
            None => self.fonts.push((family.to_string(), font)),
        }
        tracing::debug!("Registered font family {}", family);
        Ok(())
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.index_of(family).is_some()
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    fn index_of(&self, family: &str) -> Option<usize> {
        self.fonts.iter().position(|(name, _)| name == family)
    }

    /// Index of the face used for `ch` under the given stack
    pub fn select_for_char(&self, families: &[String], ch: char) -> Result<usize, FontSelectionError> {
        let candidates: Vec<usize> = families.iter().filter_map(|f| self.index_of(f)).collect();

        if let Some(&index) = candidates
            .iter()
            .find(|&&i| self.fonts[i].1.lookup_glyph_index(ch) != 0)
        {
            return Ok(index);
        }

        // Nothing covers the glyph: draw .notdef from the preferred face
        candidates
            .first()
            .copied()
            .or(if self.fonts.is_empty() { None } else { Some(0) })
            .ok_or(FontSelectionError::NoFontsAvailable)
    }

    /// Total advance width of `text` with per-character fallback
    pub fn measure(&self, desc: &FontDescription, text: &str) -> f32 {
        let size = desc.size as f32;
        text.chars()
            .filter_map(|ch| {
                let index = self.select_for_char(&desc.families, ch).ok()?;
                Some(self.fonts[index].1.metrics(ch, size).advance_width)
            })
            .sum()
    }

    pub fn rasterize(&mut self, desc: &FontDescription, ch: char) -> Result<GlyphBitmap, FontSelectionError> {
        let index = self.select_for_char(&desc.families, ch)?;
        let size = desc.size as f32;
        let key = (index, ch, size.to_bits());
        if let Some(glyph) = self.glyph_cache.get(&key) {
            return Ok(glyph.clone());
        }

        let (metrics, coverage) = self.fonts[index].1.rasterize(ch, size);
        let glyph = GlyphBitmap {
            coverage,
            width: metrics.width,
            height: metrics.height,
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            advance: metrics.advance_width,
        };
        self.glyph_cache.insert(key, glyph.clone());
        Ok(glyph)
    }

    /// Ascent and (negative) descent of the preferred face
    pub fn line_metrics(&self, desc: &FontDescription) -> Option<(f32, f32)> {
        let index = desc
            .families
            .iter()
            .find_map(|f| self.index_of(f))
            .or(if self.fonts.is_empty() { None } else { Some(0) })?;
        self.fonts[index]
            .1
            .horizontal_line_metrics(desc.size as f32)
            .map(|m| (m.ascent, m.descent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYSTEM_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

    #[test]
    fn test_invalid_font_data_rejected() {
        let mut cache = FontCache::new();
        let err = cache.register("Broken", b"not a font").unwrap_err();
        assert!(matches!(err, FontSelectionError::InvalidFontData { ref family, .. } if family == "Broken"));
        assert_eq!(cache.font_count(), 0);
    }

    #[test]
    fn test_empty_cache_has_no_fonts() {
        let cache = FontCache::new();
        let families = vec!["TnT".to_string()];
        assert!(matches!(
            cache.select_for_char(&families, 'A'),
            Err(FontSelectionError::NoFontsAvailable)
        ));
        assert_eq!(cache.measure(&FontDescription::new(families, 20.0), "ABC"), 0.0);
    }

    #[test]
    fn test_measure_with_system_font() {
        // Only meaningful where DejaVu is installed
        let Ok(data) = std::fs::read(SYSTEM_FONT) else {
            eprintln!("DejaVu Sans not installed - skipping");
            return;
        };
        let mut cache = FontCache::new();
        cache.register("Sans", &data).unwrap();
        assert!(cache.has_family("Sans"));

        let small = FontDescription::new(vec!["Missing".into(), "Sans".into()], 10.0);
        let large = small.with_size(20.0);
        let narrow = cache.measure(&small, "Hello");
        let wide = cache.measure(&large, "Hello");
        assert!(narrow > 0.0);
        assert!(wide > narrow * 1.5);

        let glyph = cache.rasterize(&large, 'H').unwrap();
        assert_eq!(glyph.coverage.len(), glyph.width * glyph.height);
        assert!(cache.line_metrics(&large).is_some());
    }
}
