//! Capability traits the core draws, loads, schedules and reports through
//!
//! The core never talks to a toolkit directly. A backend supplies a
//! `Surface` plus the loader, notifier, export sink and event loop; the
//! `dummy_backend` module supplies recording versions for tests.

use crate::error::LoadError;
use futures::future::LocalBoxFuture;
use std::time::Duration;

/// RGBA color with components in 0.0..=1.0
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }
}

/// Horizontal anchor of a text draw relative to its x coordinate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical anchor of a text draw relative to its y coordinate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextBaseline {
    #[default]
    Alphabetic,
    Top,
    Middle,
}

/// Font declaration handed to the surface: size plus the family stack in
/// priority order
#[derive(Clone, Debug, PartialEq)]
pub struct FontDescription {
    pub families: Vec<String>,
    pub size: f64,
}

impl FontDescription {
    pub fn new(families: Vec<String>, size: f64) -> Self {
        Self { families, size }
    }

    /// Same stack at a different pixel size
    pub fn with_size(&self, size: f64) -> Self {
        Self { families: self.families.clone(), size }
    }

    /// Preferred family, if the stack is not empty
    pub fn primary(&self) -> Option<&str> {
        self.families.first().map(String::as_str)
    }
}

/// Decoded raster image: premultiplied ARGB32, native endian, row stride in bytes
#[derive(Clone, Debug, PartialEq)]
pub struct ImageData {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub stride: usize,
}

impl ImageData {
    /// Image of the given size with no pixel data; only geometry matters
    pub fn blank(width: usize, height: usize) -> Self {
        Self { data: Vec::new(), width, height, stride: width * 4 }
    }
}

/// Destination rectangle in surface coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Text drawing sub-trait
pub trait TextRenderer {
    fn set_font(&mut self, font: &FontDescription);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_text_baseline(&mut self, baseline: TextBaseline);
    fn set_line_width(&mut self, width: f64);
    fn set_fill_color(&mut self, color: Color);
    fn set_stroke_color(&mut self, color: Color);
    /// Advance width of `text` in the current font
    fn measure_text(&self, text: &str) -> f64;
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), BackendError>;
    fn stroke_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), BackendError>;
    /// Make a loaded font resource available under `family`
    fn register_font(&mut self, family: &str, data: &[u8]) -> Result<(), BackendError>;
}

/// Image drawing sub-trait
pub trait GraphicsRenderer {
    fn draw_image(&mut self, image: &ImageData, dest: Rect) -> Result<(), BackendError>;
}

/// The single drawing surface the composite is built on
pub trait Surface: TextRenderer + GraphicsRenderer {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn clear(&mut self) -> Result<(), BackendError>;
    /// Serialize the current pixels as PNG
    fn encode_png(&self) -> Result<Vec<u8>, BackendError>;
}

/// Asynchronous resource loading
pub trait AssetLoader {
    fn load_font(&self, url: &str) -> LocalBoxFuture<'static, Result<Vec<u8>, LoadError>>;
    fn load_image(&self, url: &str) -> LocalBoxFuture<'static, Result<ImageData, LoadError>>;
}

/// Alert-style user notification channel
pub trait Notifier {
    fn alert(&self, message: &str);
}

/// Destination for exported images
pub trait ExportSink {
    fn emit_download(&self, png: &[u8], filename: &str) -> Result<(), BackendError>;
}

/// Source of the current form values
pub trait InputSource {
    fn read(&self) -> crate::request::FormInput;
}

/// Handle to a scheduled one-shot timer
pub trait TimerHandle {
    /// Prevent the callback from running; only valid before it fired
    fn cancel(self: Box<Self>);
}

/// Event loop trait
pub trait EventLoop {
    fn schedule_once(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Box<dyn TimerHandle>;
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>);

    /// Future resolving after `delay`, built on `schedule_once`
    fn sleep(&self, delay: Duration) -> LocalBoxFuture<'static, ()> {
        if delay.is_zero() {
            return Box::pin(futures::future::ready(()));
        }
        let (tx, rx) = async_channel::bounded::<()>(1);
        let _handle = self.schedule_once(
            delay,
            Box::new(move || {
                let _ = tx.try_send(());
            }),
        );
        Box::pin(async move {
            let _ = rx.recv().await;
        })
    }
}

/// Error types for backend operations
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Rendering error: {0}")]
    Rendering(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Encoding error: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
