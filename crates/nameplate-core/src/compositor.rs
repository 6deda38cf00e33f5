//! Compositor: sequences fonts, background, text and decoration onto the
//! surface and owns the draw state machine
//!
//! The compositor is a cheap-clone handle. All state lives behind `Rc` with
//! `Cell`/`RefCell` interiors, and no borrow is held across an await, so
//! overlapping draws interleave safely on a single-threaded executor. Each
//! draw takes a generation number; a completion that no longer owns the
//! latest generation is dropped without touching the surface.

use crate::assets::{AssetKey, AssetResolver};
use crate::config::{PlateConfig, TitleMode};
use crate::error::{PlateError, PlateResult};
use crate::export::{export_composite, SurfaceState};
use crate::font::gate::{fetch_fonts, FontGate, FontReadiness};
use crate::font::script::ScriptDetector;
use crate::layout;
use crate::request::{FormInput, RenderRequest};
use crate::traits::{AssetLoader, EventLoop, ExportSink, Notifier, Surface, TextAlign, TextBaseline};
use async_channel::{Receiver, Sender};
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Draw pipeline phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    BackgroundLoading,
    TextDrawn,
    DecorationLoading,
    Ready,
    Failed,
    DecorationFailed,
}

/// Notifications for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlateEvent {
    FontsReady,
    FontsFailed,
    ExportAvailable(bool),
    SurfaceChanged,
}

/// How a draw attempt settled when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Every layer drew; export is armed
    Ready,
    /// Live preview with empty fields: surface cleared
    Cleared,
    /// Live preview before fonts were ready
    Ignored,
    /// A newer draw took over while this one was loading
    Superseded,
}

/// The non-surface collaborators a compositor needs
#[derive(Clone)]
pub struct Collaborators {
    pub loader: Rc<dyn AssetLoader>,
    pub notifier: Rc<dyn Notifier>,
    pub sink: Rc<dyn ExportSink>,
    pub event_loop: Rc<dyn EventLoop>,
}

struct Inner<S> {
    config: PlateConfig,
    resolver: AssetResolver,
    detector: ScriptDetector,
    surface: RefCell<S>,
    collaborators: Collaborators,
    fonts: FontGate,
    state: SurfaceState,
    phase: Cell<Phase>,
    generation: Cell<u64>,
    subscribers: RefCell<Vec<Sender<PlateEvent>>>,
}

pub struct Compositor<S> {
    inner: Rc<Inner<S>>,
}

impl<S> Clone for Compositor<S> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<S: Surface + 'static> Compositor<S> {
    pub fn new(config: PlateConfig, surface: S, collaborators: Collaborators) -> Self {
        debug!(
            "Creating compositor: canvas={}x{}, fonts={}",
            config.canvas_width,
            config.canvas_height,
            config.fonts.len()
        );
        let stack = config.fonts.iter().map(|f| f.logical_name.clone()).collect();
        let detector = ScriptDetector::new(config.script_rules.clone(), &config.default_family, stack);
        let resolver = AssetResolver::new(config.asset_root.clone());

        Self {
            inner: Rc::new(Inner {
                config,
                resolver,
                detector,
                surface: RefCell::new(surface),
                collaborators,
                fonts: FontGate::new(),
                state: SurfaceState::new(),
                phase: Cell::new(Phase::Idle),
                generation: Cell::new(0),
                subscribers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &PlateConfig {
        &self.inner.config
    }

    pub fn event_loop(&self) -> Rc<dyn EventLoop> {
        Rc::clone(&self.inner.collaborators.event_loop)
    }

    pub fn surface(&self) -> Ref<'_, S> {
        self.inner.surface.borrow()
    }

    pub fn phase(&self) -> Phase {
        self.inner.phase.get()
    }

    pub fn font_readiness(&self) -> FontReadiness {
        self.inner.fonts.readiness()
    }

    pub fn fonts_ready(&self) -> bool {
        self.inner.fonts.is_ready()
    }

    pub fn has_valid_composite(&self) -> bool {
        self.inner.state.has_valid_composite()
    }

    /// New event stream; every subscriber sees every later event
    pub fn subscribe(&self) -> Receiver<PlateEvent> {
        let (tx, rx) = async_channel::unbounded();
        self.inner.subscribers.borrow_mut().push(tx);
        rx
    }

    fn emit(&self, event: PlateEvent) {
        self.inner
            .subscribers
            .borrow_mut()
            .retain(|tx| tx.try_send(event.clone()).is_ok());
    }

    fn set_phase(&self, phase: Phase) {
        let previous = self.inner.phase.replace(phase);
        if previous != phase {
            debug!("Compositor phase {:?} -> {:?}", previous, phase);
        }
    }

    fn next_generation(&self) -> u64 {
        let generation = self.inner.generation.get() + 1;
        self.inner.generation.set(generation);
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.generation.get() == generation
    }

    fn arm(&self) {
        if self.inner.state.arm() {
            self.emit(PlateEvent::ExportAvailable(true));
        }
    }

    fn disarm(&self) {
        if self.inner.state.disarm() {
            self.emit(PlateEvent::ExportAvailable(false));
        }
    }

    fn notify(&self, error: &PlateError) {
        self.inner.collaborators.notifier.alert(error.user_message());
    }

    /// Load every configured font and open the gate.
    ///
    /// Only the first call loads; later calls report the settled outcome
    /// (or `FontsLoading` while the first is still in flight).
    pub async fn load_fonts(&self) -> PlateResult<()> {
        let inner = &*self.inner;
        if !inner.fonts.begin() {
            return inner.fonts.check();
        }

        let floor = inner.collaborators.event_loop.sleep(inner.config.font_loading_floor);
        let fetched = fetch_fonts(
            &inner.config.fonts,
            &inner.resolver,
            inner.collaborators.loader.as_ref(),
            floor,
        )
        .await;

        let registered = fetched.and_then(|fonts| {
            let mut surface = inner.surface.borrow_mut();
            for (family, bytes) in fonts {
                surface
                    .register_font(&family, &bytes)
                    .map_err(|e| PlateError::FontLoad { family, message: e.to_string() })?;
            }
            Ok(())
        });

        match registered {
            Ok(()) => {
                inner.fonts.mark_ready();
                info!("Fonts ready");
                self.emit(PlateEvent::FontsReady);
                Ok(())
            }
            Err(e) => {
                inner.fonts.mark_failed(&e.to_string());
                self.notify(&e);
                self.emit(PlateEvent::FontsFailed);
                Err(e)
            }
        }
    }

    /// Explicit submit: every rejection is reported to the user
    pub async fn submit_draw(&self, form: &FormInput) -> PlateResult<Completion> {
        if let Err(e) = self.inner.fonts.check() {
            self.notify(&e);
            return Err(e);
        }

        let request = match RenderRequest::from_form(form) {
            Ok(request) => request,
            Err(e) => {
                debug!("Rejected submit: {}", e);
                self.notify(&e);
                return Err(e);
            }
        };
        self.draw(request).await
    }

    /// Live preview: incomplete input clears the surface without a notice
    pub async fn request_draw(&self, form: &FormInput) -> PlateResult<Completion> {
        if !self.inner.fonts.is_ready() {
            debug!("Ignoring live draw before fonts are ready");
            return Ok(Completion::Ignored);
        }

        match RenderRequest::from_form(form) {
            Ok(request) => self.draw(request).await,
            Err(e) => {
                debug!("Live draw with incomplete input ({}), clearing", e);
                self.next_generation();
                if let Err(e) = self.inner.surface.borrow_mut().clear() {
                    warn!("Failed to clear surface: {}", e);
                }
                self.disarm();
                self.set_phase(Phase::Idle);
                self.emit(PlateEvent::SurfaceChanged);
                Ok(Completion::Cleared)
            }
        }
    }

    async fn draw(&self, request: RenderRequest) -> PlateResult<Completion> {
        let inner = &*self.inner;
        let generation = self.next_generation();
        self.disarm();
        self.set_phase(Phase::BackgroundLoading);

        let url = inner.resolver.resolve(&AssetKey::Plate {
            plate_type: request.plate_type,
            show_rank: request.show_rank(),
        });
        let background = inner.collaborators.loader.load_image(&url).await;
        if !self.is_current(generation) {
            debug!("Discarding stale background {}", url);
            return Ok(Completion::Superseded);
        }

        let background = match background {
            Ok(image) => image,
            Err(e) => {
                let error = PlateError::BackgroundLoad { url, message: e.to_string() };
                return Err(self.fail(Phase::Failed, error));
            }
        };

        if let Err(e) = self.draw_base_layers(&request, &background) {
            return Err(self.fail(Phase::Failed, e));
        }
        self.set_phase(Phase::TextDrawn);

        let Some(rank) = &request.rank else {
            return Ok(self.finish());
        };

        self.set_phase(Phase::DecorationLoading);
        let url = inner.resolver.resolve(&AssetKey::Decoration(rank));
        let decoration = inner.collaborators.loader.load_image(&url).await;
        if !self.is_current(generation) {
            debug!("Discarding stale decoration {}", url);
            return Ok(Completion::Superseded);
        }

        let decoration = match decoration {
            Ok(image) => image,
            Err(e) => {
                warn!("Decoration {} unavailable: {}", url, e);
                return Err(self.fail(Phase::DecorationFailed, PlateError::DecorationMissing { url }));
            }
        };

        let drawn = {
            let config = &inner.config;
            let mut surface = inner.surface.borrow_mut();
            let rect = layout::decoration_rect(
                surface.width(),
                surface.height(),
                &decoration,
                config.decoration_scale,
                config.decoration_margin_right,
                config.decoration_margin_bottom,
            );
            surface.draw_image(&decoration, rect)
        };
        if let Err(e) = drawn {
            return Err(self.fail(Phase::Failed, e.into()));
        }

        Ok(self.finish())
    }

    fn finish(&self) -> Completion {
        self.set_phase(Phase::Ready);
        self.arm();
        self.emit(PlateEvent::SurfaceChanged);
        info!("Composite ready");
        Completion::Ready
    }

    /// Report a failed draw and fall back to a blank, unexportable surface
    fn fail(&self, phase: Phase, error: PlateError) -> PlateError {
        self.set_phase(phase);
        warn!("Draw failed: {}", error);
        if let Err(e) = self.inner.surface.borrow_mut().clear() {
            warn!("Failed to clear surface: {}", e);
        }
        self.disarm();
        self.notify(&error);
        self.set_phase(Phase::Idle);
        self.emit(PlateEvent::SurfaceChanged);
        error
    }

    fn draw_base_layers(&self, request: &RenderRequest, background: &crate::traits::ImageData) -> PlateResult<()> {
        let mut surface = self.inner.surface.borrow_mut();
        let surface = &mut *surface;
        surface.clear()?;
        let rect = layout::background_rect(surface.width(), surface.height(), background);
        surface.draw_image(background, rect)?;
        self.draw_title(surface, &request.title)?;
        self.draw_name(surface, &request.player_name, request.show_rank())?;
        Ok(())
    }

    fn draw_title(&self, surface: &mut S, title: &str) -> PlateResult<()> {
        let config = &self.inner.config;
        surface.set_text_baseline(TextBaseline::Middle);
        surface.set_fill_color(config.title_color);

        match config.title_mode {
            TitleMode::AutoShrink { max_width, max_size, min_size } => {
                let stack = self.inner.detector.font_stack(title, max_size);
                let size = layout::fit_title(max_width, max_size, min_size, |size| {
                    surface.set_font(&stack.with_size(size));
                    surface.measure_text(title)
                });
                debug!("Title fitted at {}px", size);
                surface.set_font(&stack.with_size(size));
                surface.set_text_align(TextAlign::Center);
                let x = surface.width() / 2.0;
                surface.fill_text(title, x, config.title_y)?;
            }
            TitleMode::LetterSpaced { spacing, long_threshold, size, long_size } => {
                let size = layout::letter_spaced_size(title, long_threshold, size, long_size);
                surface.set_font(&self.inner.detector.font_stack(title, size));
                surface.set_text_align(TextAlign::Left);
                let width = surface.width();
                let glyphs = layout::letter_spaced_title(title, width, spacing, |g| surface.measure_text(g));
                for glyph in glyphs {
                    surface.fill_text(&glyph.text, glyph.x, config.title_y)?;
                }
            }
        }
        Ok(())
    }

    fn draw_name(&self, surface: &mut S, name: &str, show_rank: bool) -> PlateResult<()> {
        let config = &self.inner.config;
        surface.set_font(&self.inner.detector.font_stack(name, config.name_font_size));
        surface.set_text_align(TextAlign::Center);
        surface.set_text_baseline(TextBaseline::Middle);

        let width = surface.measure_text(name);
        let placement = layout::place_name(width, show_rank, surface.width(), config.name_y);

        surface.set_line_width(config.name_stroke_width);
        surface.set_stroke_color(config.name_stroke_color);
        surface.set_fill_color(config.name_fill_color);
        surface.stroke_text(name, placement.x, placement.y)?;
        surface.fill_text(name, placement.x, placement.y)?;
        Ok(())
    }

    /// Export the current composite, reporting any failure to the user
    pub fn export_image(&self) -> PlateResult<()> {
        let inner = &*self.inner;
        let surface = inner.surface.borrow();
        export_composite(
            &inner.state,
            &*surface,
            inner.collaborators.sink.as_ref(),
            &inner.config.export_filename,
        )
        .map_err(|e| {
            self.notify(&e);
            e
        })
    }
}
