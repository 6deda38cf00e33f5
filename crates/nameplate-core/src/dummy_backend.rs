//! Dummy backend for exercising the pipeline without GTK
//!
//! Everything records what it was asked to do. Time is virtual: timers only
//! fire when the test advances the `ManualEventLoop`, so debounce and
//! out-of-order load completion are deterministic.

use crate::compositor::{Collaborators, Compositor};
use crate::config::PlateConfig;
use crate::error::LoadError;
use crate::request::FormInput;
use crate::traits::{
    AssetLoader, BackendError, Color, EventLoop, ExportSink, FontDescription, GraphicsRenderer, ImageData,
    InputSource, Notifier, Rect, Surface, TextAlign, TextBaseline, TextRenderer, TimerHandle,
};
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll};
use std::time::Duration;

/// Width of every character in ems for `RecordingSurface::measure_text`
pub const RECORDED_ADVANCE_EM: f64 = 0.5;

/// A text draw as the surface saw it
#[derive(Clone, Debug, PartialEq)]
pub struct TextDraw {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font: FontDescription,
    pub align: TextAlign,
    pub baseline: TextBaseline,
    pub color: Color,
    pub line_width: f64,
}

/// Recorded surface operations; `Clear` always starts the list
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear,
    Image { width: usize, height: usize, dest: Rect },
    FillText(TextDraw),
    StrokeText(TextDraw),
}

/// Surface that keeps a log of the operations making up its content
pub struct RecordingSurface {
    width: f64,
    height: f64,
    ops: Vec<DrawOp>,
    font: FontDescription,
    align: TextAlign,
    baseline: TextBaseline,
    line_width: f64,
    fill: Color,
    stroke: Color,
    fonts: Vec<String>,
    fail_encoding: Cell<bool>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
            font: FontDescription::new(Vec::new(), 10.0),
            align: TextAlign::default(),
            baseline: TextBaseline::default(),
            line_width: 1.0,
            fill: Color::default(),
            stroke: Color::default(),
            fonts: Vec::new(),
            fail_encoding: Cell::new(false),
        }
    }

    /// Operations since (and including) the last clear
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// True when nothing but clears has been drawn
    pub fn is_blank(&self) -> bool {
        self.ops.iter().all(|op| matches!(op, DrawOp::Clear))
    }

    pub fn images(&self) -> Vec<(usize, usize, Rect)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Image { width, height, dest } => Some((*width, *height, *dest)),
                _ => None,
            })
            .collect()
    }

    pub fn fill_texts(&self) -> Vec<TextDraw> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillText(draw) => Some(draw.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn stroke_texts(&self) -> Vec<TextDraw> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::StrokeText(draw) => Some(draw.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn registered_fonts(&self) -> Vec<String> {
        self.fonts.clone()
    }

    pub fn fail_encoding(&self, fail: bool) {
        self.fail_encoding.set(fail);
    }

    fn text_draw(&self, text: &str, x: f64, y: f64, color: Color) -> TextDraw {
        TextDraw {
            text: text.to_string(),
            x,
            y,
            font: self.font.clone(),
            align: self.align,
            baseline: self.baseline,
            color,
            line_width: self.line_width,
        }
    }
}

impl TextRenderer for RecordingSurface {
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
        text.chars().count() as f64 * self.font.size * RECORDED_ADVANCE_EM
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), BackendError> {
        let draw = self.text_draw(text, x, y, self.fill);
        self.ops.push(DrawOp::FillText(draw));
        Ok(())
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), BackendError> {
        let draw = self.text_draw(text, x, y, self.stroke);
        self.ops.push(DrawOp::StrokeText(draw));
        Ok(())
    }

    fn register_font(&mut self, family: &str, data: &[u8]) -> Result<(), BackendError> {
        if data.is_empty() {
            return Err(BackendError::Font(format!("empty font data for {}", family)));
        }
        self.fonts.push(family.to_string());
        Ok(())
    }
}

impl GraphicsRenderer for RecordingSurface {
    fn draw_image(&mut self, image: &ImageData, dest: Rect) -> Result<(), BackendError> {
        self.ops.push(DrawOp::Image { width: image.width, height: image.height, dest });
        Ok(())
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn clear(&mut self) -> Result<(), BackendError> {
        self.ops.clear();
        self.ops.push(DrawOp::Clear);
        Ok(())
    }

    /// PNG signature followed by the op log, so equal content encodes equally
    fn encode_png(&self) -> Result<Vec<u8>, BackendError> {
        if self.fail_encoding.get() {
            return Err(BackendError::Encode("encoding disabled".into()));
        }
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.extend_from_slice(format!("{:?}", self.ops).as_bytes());
        Ok(bytes)
    }
}

struct PendingTimer {
    id: u64,
    deadline: Duration,
    callback: Box<dyn FnOnce()>,
}

type TimerQueue = RefCell<Vec<PendingTimer>>;

struct ManualTimerHandle {
    id: u64,
    timers: Weak<TimerQueue>,
}

impl TimerHandle for ManualTimerHandle {
    fn cancel(self: Box<Self>) {
        if let Some(timers) = self.timers.upgrade() {
            timers.borrow_mut().retain(|t| t.id != self.id);
        }
    }
}

/// Event loop on a virtual clock, running spawned tasks on a `LocalPool`
pub struct ManualEventLoop {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    timers: Rc<TimerQueue>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
}

impl Default for ManualEventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualEventLoop {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            now: Cell::new(Duration::ZERO),
            next_id: Cell::new(0),
            timers: Rc::new(RefCell::new(Vec::new())),
            pool: RefCell::new(pool),
            spawner,
        }
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Poll spawned tasks until none can make progress
    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    /// Fire the earliest timer due at or before `limit`
    fn fire_due(&self, limit: Option<Duration>) -> bool {
        let timer = {
            let mut timers = self.timers.borrow_mut();
            let next = timers
                .iter()
                .enumerate()
                .filter(|(_, t)| limit.map_or(true, |limit| t.deadline <= limit))
                .min_by_key(|(_, t)| (t.deadline, t.id))
                .map(|(index, _)| index);
            match next {
                Some(index) => timers.remove(index),
                None => return false,
            }
        };
        if timer.deadline > self.now.get() {
            self.now.set(timer.deadline);
        }
        (timer.callback)();
        true
    }

    /// Jump to the next timer and fire it; false when none are pending
    pub fn fire_next(&self) -> bool {
        self.fire_due(None)
    }

    /// Move the clock forward, firing due timers and running tasks as we go
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        loop {
            self.run_until_stalled();
            if !self.fire_due(Some(target)) {
                break;
            }
        }
        self.now.set(target);
        self.run_until_stalled();
    }
}

impl EventLoop for ManualEventLoop {
    fn schedule_once(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Box<dyn TimerHandle> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.timers.borrow_mut().push(PendingTimer {
            id,
            deadline: self.now.get() + delay,
            callback,
        });
        Box::new(ManualTimerHandle { id, timers: Rc::downgrade(&self.timers) })
    }

    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
        if let Err(e) = self.spawner.spawn_local(future) {
            tracing::error!("Failed to spawn task: {}", e);
        }
    }
}

/// Loader answering from a script: every URL succeeds with a default image
/// unless told otherwise, after an optional virtual delay
pub struct ScriptedLoader {
    event_loop: Rc<ManualEventLoop>,
    default_size: (usize, usize),
    sizes: RefCell<HashMap<String, (usize, usize)>>,
    delays: RefCell<HashMap<String, Duration>>,
    failures: RefCell<HashSet<String>>,
    requests: RefCell<Vec<String>>,
}

impl ScriptedLoader {
    pub fn new(event_loop: Rc<ManualEventLoop>) -> Self {
        Self {
            event_loop,
            default_size: (400, 100),
            sizes: RefCell::new(HashMap::new()),
            delays: RefCell::new(HashMap::new()),
            failures: RefCell::new(HashSet::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn set_image(&self, url: &str, width: usize, height: usize) {
        self.sizes.borrow_mut().insert(url.to_string(), (width, height));
    }

    pub fn set_delay(&self, url: &str, delay: Duration) {
        self.delays.borrow_mut().insert(url.to_string(), delay);
    }

    pub fn fail(&self, url: &str) {
        self.failures.borrow_mut().insert(url.to_string());
    }

    /// Every URL requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    fn respond<T: 'static>(&self, url: &str, outcome: Result<T, LoadError>) -> LocalBoxFuture<'static, Result<T, LoadError>> {
        self.requests.borrow_mut().push(url.to_string());
        let delay = self.delays.borrow().get(url).copied().unwrap_or(Duration::ZERO);
        let sleep = self.event_loop.sleep(delay);
        Box::pin(async move {
            sleep.await;
            outcome
        })
    }

    fn outcome(&self, url: &str) -> Result<(), LoadError> {
        if self.failures.borrow().contains(url) {
            Err(LoadError::NotFound { url: url.to_string() })
        } else {
            Ok(())
        }
    }
}

impl AssetLoader for ScriptedLoader {
    fn load_font(&self, url: &str) -> LocalBoxFuture<'static, Result<Vec<u8>, LoadError>> {
        let outcome = self.outcome(url).map(|()| url.as_bytes().to_vec());
        self.respond(url, outcome)
    }

    fn load_image(&self, url: &str) -> LocalBoxFuture<'static, Result<ImageData, LoadError>> {
        let (width, height) = self.sizes.borrow().get(url).copied().unwrap_or(self.default_size);
        let outcome = self.outcome(url).map(|()| ImageData::blank(width, height));
        self.respond(url, outcome)
    }
}

/// Notifier collecting every alert
#[derive(Default)]
pub struct RecordingNotifier {
    messages: RefCell<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

/// Export sink keeping downloads in memory
#[derive(Default)]
pub struct MemorySink {
    downloads: RefCell<Vec<(String, Vec<u8>)>>,
    fail_next: Cell<bool>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> Vec<(String, Vec<u8>)> {
        self.downloads.borrow().clone()
    }

    /// Make the next emit fail once
    pub fn fail_next(&self, fail: bool) {
        self.fail_next.set(fail);
    }
}

impl ExportSink for MemorySink {
    fn emit_download(&self, png: &[u8], filename: &str) -> Result<(), BackendError> {
        if self.fail_next.replace(false) {
            return Err(BackendError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "download blocked",
            )));
        }
        self.downloads.borrow_mut().push((filename.to_string(), png.to_vec()));
        Ok(())
    }
}

/// Form source whose values the test sets directly
#[derive(Default)]
pub struct StaticInput {
    form: RefCell<FormInput>,
}

impl StaticInput {
    pub fn new(form: FormInput) -> Self {
        Self { form: RefCell::new(form) }
    }

    pub fn set(&self, form: FormInput) {
        *self.form.borrow_mut() = form;
    }
}

impl InputSource for StaticInput {
    fn read(&self) -> FormInput {
        self.form.borrow().clone()
    }
}

/// All dummy collaborators wired together
pub struct DummyBackend {
    pub event_loop: Rc<ManualEventLoop>,
    pub loader: Rc<ScriptedLoader>,
    pub notifier: Rc<RecordingNotifier>,
    pub sink: Rc<MemorySink>,
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyBackend {
    pub fn new() -> Self {
        let event_loop = Rc::new(ManualEventLoop::new());
        DummyBackend {
            loader: Rc::new(ScriptedLoader::new(Rc::clone(&event_loop))),
            event_loop,
            notifier: Rc::new(RecordingNotifier::new()),
            sink: Rc::new(MemorySink::new()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            loader: self.loader.clone(),
            notifier: self.notifier.clone(),
            sink: self.sink.clone(),
            event_loop: self.event_loop.clone(),
        }
    }

    /// Compositor over a fresh `RecordingSurface` sized from the config
    pub fn compositor(&self, config: PlateConfig) -> Compositor<RecordingSurface> {
        let surface = RecordingSurface::new(config.canvas_width, config.canvas_height);
        Compositor::new(config, surface, self.collaborators())
    }

    /// Drive `future` to completion, firing virtual timers whenever every
    /// task is stuck. Panics if it can never finish.
    pub fn run<F: Future>(&self, future: F) -> F::Output {
        let mut future = std::pin::pin!(future);
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);
        loop {
            if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
                return output;
            }
            self.event_loop.run_until_stalled();
            if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
                return output;
            }
            assert!(self.event_loop.fire_next(), "future stalled with no pending timers");
        }
    }
}
