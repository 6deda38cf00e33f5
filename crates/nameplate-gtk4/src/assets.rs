//! gio-backed asset loading
//!
//! Files are read with `load_contents_future` on the GLib main context, so
//! loads never block the UI thread. Images are decoded by cairo's PNG reader.

use cairo::{Context, Format, ImageSurface};
use futures::future::LocalBoxFuture;
use gtk4::gio;
use gtk4::prelude::*;
use nameplate_core::{AssetLoader, ImageData, LoadError};
use tracing::debug;

/// Loads resolved asset URLs (plain paths or URIs) through gio
#[derive(Debug, Default, Clone)]
pub struct GioAssetLoader;

impl GioAssetLoader {
    pub fn new() -> Self {
        GioAssetLoader
    }
}

fn file_for(url: &str) -> gio::File {
    if url.contains("://") {
        gio::File::for_uri(url)
    } else {
        gio::File::for_path(url)
    }
}

async fn read_bytes(url: String) -> Result<Vec<u8>, LoadError> {
    let file = file_for(&url);
    match file.load_contents_future().await {
        Ok((bytes, _etag)) => {
            debug!("Loaded {} ({} bytes)", url, bytes.len());
            Ok(bytes.to_vec())
        }
        Err(e) if e.matches(gio::IOErrorEnum::NotFound) => Err(LoadError::NotFound { url }),
        Err(e) => Err(LoadError::Io { url, message: e.to_string() }),
    }
}

/// Decode PNG bytes into premultiplied ARGB32, whatever format the file had
pub fn decode_png(url: &str, bytes: &[u8]) -> Result<ImageData, LoadError> {
    let decode_error = |message: String| LoadError::Decode { url: url.to_string(), message };

    let decoded =
        ImageSurface::create_from_png(&mut std::io::Cursor::new(bytes)).map_err(|e| decode_error(e.to_string()))?;
    let (width, height) = (decoded.width(), decoded.height());

    // Opaque PNGs come back as RGB24; repaint into ARGB32 so alpha is defined
    let mut argb = ImageSurface::create(Format::ARgb32, width, height).map_err(|e| decode_error(e.to_string()))?;
    {
        let cr = Context::new(&argb).map_err(|e| decode_error(e.to_string()))?;
        cr.set_source_surface(&decoded, 0.0, 0.0)
            .map_err(|e| decode_error(e.to_string()))?;
        cr.paint().map_err(|e| decode_error(e.to_string()))?;
    }
    argb.flush();

    let stride = argb.stride() as usize;
    let data = argb.data().map_err(|e| decode_error(e.to_string()))?.to_vec();
    Ok(ImageData { data, width: width as usize, height: height as usize, stride })
}

impl AssetLoader for GioAssetLoader {
    fn load_font(&self, url: &str) -> LocalBoxFuture<'static, Result<Vec<u8>, LoadError>> {
        Box::pin(read_bytes(url.to_string()))
    }

    fn load_image(&self, url: &str) -> LocalBoxFuture<'static, Result<ImageData, LoadError>> {
        let url = url.to_string();
        Box::pin(async move {
            let bytes = read_bytes(url.clone()).await?;
            decode_png(&url, &bytes)
        })
    }
}
