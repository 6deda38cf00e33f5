//! Nameplate GTK4 - GTK4 and cairo backend for nameplate-core
//!
//! This crate implements the nameplate-core traits on top of a cairo image
//! surface and the GLib main loop, and provides the application window.

mod assets;
mod cairo_renderer;
mod dialogs;
mod event_loop;
mod form;
mod window;

pub use assets::{decode_png, GioAssetLoader};
pub use cairo_renderer::CairoSurface;
pub use dialogs::{DialogNotifier, DownloadsSink};
pub use event_loop::GlibEventLoop;
pub use form::PlateForm;
pub use window::build_window;

// Re-export nameplate-core types for convenience
pub use nameplate_core::*;
