//! Cairo image surface implementation of `Surface`
//!
//! Text goes through the fontdue `FontCache`: each glyph is rasterized to an
//! A8 coverage mask and painted with `mask_surface`, so registered font bytes
//! are usable without installing them system-wide.

use cairo::{Context, Format, ImageSurface, Operator};
use nameplate_core::{
    BackendError, Color, FontCache, FontDescription, GraphicsRenderer, ImageData, Rect, Surface, TextAlign,
    TextBaseline, TextRenderer,
};
use std::f64::consts::PI;

/// Directions used to fake a stroke by repainting the fill mask
const STROKE_SAMPLES: usize = 16;

fn cairo_error(e: cairo::Error) -> BackendError {
    BackendError::Rendering(e.to_string())
}

/// Offscreen ARGB32 canvas holding the composite
pub struct CairoSurface {
    surface: ImageSurface,
    fonts: FontCache,
    font: FontDescription,
    align: TextAlign,
    baseline: TextBaseline,
    line_width: f64,
    fill: Color,
    stroke: Color,
}

impl CairoSurface {
    pub fn new(width: f64, height: f64) -> Result<Self, BackendError> {
        let surface = ImageSurface::create(Format::ARgb32, width.ceil() as i32, height.ceil() as i32)
            .map_err(cairo_error)?;
        Ok(CairoSurface {
            surface,
            fonts: FontCache::new(),
            font: FontDescription::new(Vec::new(), 10.0),
            align: TextAlign::default(),
            baseline: TextBaseline::default(),
            line_width: 1.0,
            fill: Color::default(),
            stroke: Color::default(),
        })
    }

    fn context(&self) -> Result<Context, BackendError> {
        Context::new(&self.surface).map_err(cairo_error)
    }

    /// Paint the composite into a widget's context, scaled to fit and centered
    pub fn paint_to(&self, cr: &Context, width: i32, height: i32) -> Result<(), cairo::Error> {
        let (sw, sh) = (self.surface.width() as f64, self.surface.height() as f64);
        let scale = (width as f64 / sw).min(height as f64 / sh);
        cr.save()?;
        cr.translate((width as f64 - sw * scale) / 2.0, (height as f64 - sh * scale) / 2.0);
        cr.scale(scale, scale);
        cr.set_source_surface(&self.surface, 0.0, 0.0)?;
        cr.paint()?;
        cr.restore()
    }

    /// Left edge of the text run for the current alignment
    fn start_x(&self, x: f64, width: f64) -> f64 {
        match self.align {
            TextAlign::Left => x,
            TextAlign::Center => x - width / 2.0,
            TextAlign::Right => x - width,
        }
    }

    fn baseline_y(&self, y: f64) -> f64 {
        match (self.baseline, self.fonts.line_metrics(&self.font)) {
            (TextBaseline::Alphabetic, _) | (_, None) => y,
            (TextBaseline::Top, Some((ascent, _))) => y + ascent as f64,
            // Middle of the em box: halfway between ascent and descent
            (TextBaseline::Middle, Some((ascent, descent))) => y + (ascent + descent) as f64 / 2.0,
        }
    }

    /// Paint every glyph of `text` once per offset in `offsets`
    fn paint_text(&mut self, text: &str, x: f64, y: f64, color: Color, offsets: &[(f64, f64)]) -> Result<(), BackendError> {
        let cr = self.context()?;
        cr.set_source_rgba(color.r, color.g, color.b, color.a);

        let width = self.measure_text(text);
        let mut pen_x = self.start_x(x, width);
        let baseline = self.baseline_y(y);
        let font = self.font.clone();

        for ch in text.chars() {
            let glyph = self
                .fonts
                .rasterize(&font, ch)
                .map_err(|e| BackendError::Font(e.to_string()))?;

            if glyph.width > 0 && glyph.height > 0 {
                let mask = glyph_mask(&glyph.coverage, glyph.width, glyph.height)?;
                let gx = pen_x + glyph.xmin as f64;
                let gy = baseline - (glyph.ymin as f64 + glyph.height as f64);
                for (dx, dy) in offsets {
                    cr.mask_surface(&mask, gx + dx, gy + dy).map_err(cairo_error)?;
                }
            }
            pen_x += glyph.advance as f64;
        }
        Ok(())
    }
}

/// Copy fontdue coverage rows into a stride-aligned A8 surface
fn glyph_mask(coverage: &[u8], width: usize, height: usize) -> Result<ImageSurface, BackendError> {
    let stride = Format::A8.stride_for_width(width as u32).map_err(cairo_error)? as usize;
    let mut data = vec![0u8; stride * height];
    for (row, src) in coverage.chunks(width).enumerate().take(height) {
        data[row * stride..row * stride + width].copy_from_slice(src);
    }
    ImageSurface::create_for_data(data, Format::A8, width as i32, height as i32, stride as i32).map_err(cairo_error)
}

fn stroke_offsets(line_width: f64) -> Vec<(f64, f64)> {
    let radius = line_width / 2.0;
    if radius <= 0.0 {
        return vec![(0.0, 0.0)];
    }
    (0..STROKE_SAMPLES)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / STROKE_SAMPLES as f64;
            (radius * angle.cos(), radius * angle.sin())
        })
        .chain(std::iter::once((0.0, 0.0)))
        .collect()
}

impl TextRenderer for CairoSurface {
    fn set_font(&mut self, font: &FontDescription) {
        self.font = font.clone();
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.align = align;
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.baseline = baseline;
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill = color;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.stroke = color;
    }

    fn measure_text(&self, text: &str) -> f64 {
        self.fonts.measure(&self.font, text) as f64
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), BackendError> {
        self.paint_text(text, x, y, self.fill, &[(0.0, 0.0)])
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), BackendError> {
        let offsets = stroke_offsets(self.line_width);
        self.paint_text(text, x, y, self.stroke, &offsets)
    }

    fn register_font(&mut self, family: &str, data: &[u8]) -> Result<(), BackendError> {
        self.fonts
            .register(family, data)
            .map_err(|e| BackendError::Font(e.to_string()))
    }
}

impl GraphicsRenderer for CairoSurface {
    fn draw_image(&mut self, image: &ImageData, dest: Rect) -> Result<(), BackendError> {
        if image.data.is_empty() || image.width == 0 || image.height == 0 {
            return Ok(());
        }

        let source = ImageSurface::create_for_data(
            image.data.clone(),
            Format::ARgb32,
            image.width as i32,
            image.height as i32,
            image.stride as i32,
        )
        .map_err(cairo_error)?;

        let cr = self.context()?;
        cr.translate(dest.x, dest.y);
        cr.scale(dest.width / image.width as f64, dest.height / image.height as f64);
        cr.set_source_surface(&source, 0.0, 0.0).map_err(cairo_error)?;
        cr.paint().map_err(cairo_error)
    }
}

impl Surface for CairoSurface {
    fn width(&self) -> f64 {
        self.surface.width() as f64
    }

    fn height(&self) -> f64 {
        self.surface.height() as f64
    }

    fn clear(&mut self) -> Result<(), BackendError> {
        let cr = self.context()?;
        cr.set_operator(Operator::Clear);
        cr.paint().map_err(cairo_error)
    }

    fn encode_png(&self) -> Result<Vec<u8>, BackendError> {
        self.surface.flush();
        let mut png = Vec::new();
        self.surface
            .write_to_png(&mut png)
            .map_err(|e| BackendError::Encode(e.to_string()))?;
        Ok(png)
    }
}
