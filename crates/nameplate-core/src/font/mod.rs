//! Font handling: script-based family selection, the readiness gate and a
//! fontdue-backed glyph cache for raster backends

pub mod cache;
pub mod gate;
pub mod script;

pub use cache::{FontCache, FontSelectionError, GlyphBitmap};
pub use gate::{FontGate, FontReadiness};
pub use script::{Script, ScriptDetector, ScriptRule};
