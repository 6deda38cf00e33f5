//! Nameplate Core - toolkit-agnostic nameplate compositor
//!
//! This crate turns a filled-in form into a layered nameplate image
//! (background plate, title, player name, optional rank decoration) on any
//! backend that implements the `Surface` and collaborator traits.

pub mod assets;
pub mod compositor;
pub mod config;
pub mod constants;
pub mod debounce;
pub mod dummy_backend;
pub mod error;
pub mod export;
pub mod font;
pub mod layout;
pub mod request;
pub mod traits;

// Re-export main types
pub use assets::{AssetKey, AssetResolver, FontSpec};
pub use compositor::{Collaborators, Completion, Compositor, Phase, PlateEvent};
pub use config::{PlateConfig, TitleMode};
pub use debounce::{Debouncer, LivePreview};
pub use error::{Field, LoadError, PlateError, PlateResult};
pub use export::SurfaceState;
pub use font::{FontCache, FontReadiness, Script, ScriptDetector, ScriptRule};
pub use request::{FormInput, PlateType, RankDecoration, RenderRequest};

// Re-export traits and types
pub use traits::*;
