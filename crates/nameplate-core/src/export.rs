//! Export gate: only a complete composite can leave the surface

use crate::error::{PlateError, PlateResult};
use crate::traits::{ExportSink, Surface};
use std::cell::Cell;
use tracing::{error, info};

/// Whether the surface currently holds a complete composite
#[derive(Debug, Default)]
pub struct SurfaceState {
    has_valid_composite: Cell<bool>,
}

impl SurfaceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_valid_composite(&self) -> bool {
        self.has_valid_composite.get()
    }

    /// Returns true if the flag changed
    pub fn arm(&self) -> bool {
        !self.has_valid_composite.replace(true)
    }

    /// Returns true if the flag changed
    pub fn disarm(&self) -> bool {
        self.has_valid_composite.replace(false)
    }
}

/// Encode the surface and hand it to the sink.
///
/// Neither the surface nor the state is touched, so a failed export can
/// simply be retried.
pub fn export_composite<S: Surface + ?Sized>(
    state: &SurfaceState,
    surface: &S,
    sink: &dyn ExportSink,
    filename: &str,
) -> PlateResult<()> {
    if !state.has_valid_composite() {
        return Err(PlateError::NothingToExport);
    }

    let png = surface.encode_png().map_err(|e| {
        error!("Failed to encode composite: {}", e);
        PlateError::Export { message: e.to_string() }
    })?;

    sink.emit_download(&png, filename).map_err(|e| {
        error!("Failed to emit {}: {}", filename, e);
        PlateError::Export { message: e.to_string() }
    })?;

    info!("Exported {} ({} bytes)", filename, png.len());
    Ok(())
}
