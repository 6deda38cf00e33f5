//! User-facing notifier and the downloads-folder export sink

use gtk4::prelude::*;
use gtk4::{ApplicationWindow, ButtonsType, MessageDialog, MessageType};
use nameplate_core::{BackendError, ExportSink, Notifier};
use std::path::{Path, PathBuf};
use tracing::info;

/// Shows each alert as a modal message dialog over the main window
pub struct DialogNotifier {
    parent: glib::WeakRef<ApplicationWindow>,
}

impl DialogNotifier {
    pub fn new(parent: &ApplicationWindow) -> Self {
        DialogNotifier { parent: parent.downgrade() }
    }
}

impl Notifier for DialogNotifier {
    #[allow(deprecated)]
    fn alert(&self, message: &str) {
        let dialog = MessageDialog::builder()
            .modal(true)
            .message_type(MessageType::Info)
            .buttons(ButtonsType::Ok)
            .text(message)
            .build();
        if let Some(parent) = self.parent.upgrade() {
            dialog.set_transient_for(Some(&parent));
        }
        dialog.connect_response(|dialog, _| dialog.close());
        dialog.present();
    }
}

/// Writes exported images into the user's Downloads directory
pub struct DownloadsSink {
    dir: PathBuf,
}

impl Default for DownloadsSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadsSink {
    /// Downloads folder, or the working directory when there is none
    pub fn new() -> Self {
        let dir = glib::user_special_dir(glib::UserDirectory::Downloads).unwrap_or_else(|| PathBuf::from("."));
        Self::with_dir(dir)
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        DownloadsSink { dir: dir.into() }
    }
}

/// `name.png`, then `name (1).png`, `name (2).png`, ... until one is free
fn unused_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let path = Path::new(filename);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(filename);
    let extension = path.extension().and_then(|s| s.to_str());
    (1..)
        .map(|n| match extension {
            Some(ext) => dir.join(format!("{} ({}).{}", stem, n, ext)),
            None => dir.join(format!("{} ({})", stem, n)),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

impl ExportSink for DownloadsSink {
    fn emit_download(&self, png: &[u8], filename: &str) -> Result<(), BackendError> {
        let path = unused_path(&self.dir, filename);
        std::fs::write(&path, png)?;
        info!("Saved {} ({} bytes)", path.display(), png.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nameplate-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_downloads_never_overwrite() {
        let dir = scratch_dir("downloads");
        let sink = DownloadsSink::with_dir(&dir);

        sink.emit_download(b"first", "nameplate.png").unwrap();
        sink.emit_download(b"second", "nameplate.png").unwrap();

        assert_eq!(std::fs::read(dir.join("nameplate.png")).unwrap(), b"first");
        assert_eq!(std::fs::read(dir.join("nameplate (1).png")).unwrap(), b"second");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let sink = DownloadsSink::with_dir("/nonexistent/nameplate/downloads");
        assert!(matches!(sink.emit_download(b"png", "nameplate.png"), Err(BackendError::Io(_))));
    }
}
