//! Debounced live preview
//!
//! Every edit pushes the pending redraw back by the quiet period, so a burst
//! of keystrokes produces one draw with the values present when it fires.

use crate::compositor::{Compositor, PlateEvent};
use crate::traits::{EventLoop, InputSource, Surface, TimerHandle};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, trace};

type PendingSlot = Rc<RefCell<Option<Box<dyn TimerHandle>>>>;

/// Trailing-edge debouncer over an `EventLoop`
pub struct Debouncer {
    event_loop: Rc<dyn EventLoop>,
    delay: Duration,
    pending: PendingSlot,
}

impl Debouncer {
    pub fn new(event_loop: Rc<dyn EventLoop>, delay: Duration) -> Self {
        Self { event_loop, delay, pending: Rc::new(RefCell::new(None)) }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }

    /// Run `task` once the quiet period passes without another call
    pub fn schedule<F>(&self, task: F)
    where
        F: FnOnce() + 'static,
    {
        self.cancel();

        let slot = Rc::downgrade(&self.pending);
        let handle = self.event_loop.schedule_once(
            self.delay,
            Box::new(move || {
                // Fired: the handle must not be cancelled any more
                if let Some(slot) = slot.upgrade() {
                    slot.borrow_mut().take();
                }
                task();
            }),
        );
        *self.pending.borrow_mut() = Some(handle);
    }

    /// Drop the pending task, if any
    pub fn cancel(&self) {
        let previous = self.pending.borrow_mut().take();
        if let Some(handle) = previous {
            trace!("Cancelling pending debounce timer");
            handle.cancel();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Wires form edits to debounced `request_draw` calls
pub struct LivePreview<S> {
    compositor: Compositor<S>,
    input: Rc<dyn InputSource>,
    debouncer: Debouncer,
}

impl<S: Surface + 'static> LivePreview<S> {
    pub fn new(compositor: Compositor<S>, input: Rc<dyn InputSource>) -> Self {
        let debouncer = Debouncer::new(compositor.event_loop(), compositor.config().debounce);
        if !compositor.fonts_ready() {
            Self::redraw_when_fonts_ready(compositor.clone(), Rc::clone(&input));
        }
        Self { compositor, input, debouncer }
    }

    /// Edits made while fonts load are ignored, so draw the form once as it
    /// stands when they arrive
    fn redraw_when_fonts_ready(compositor: Compositor<S>, input: Rc<dyn InputSource>) {
        let events = compositor.subscribe();
        let event_loop = compositor.event_loop();
        event_loop.spawn_local(Box::pin(async move {
            while let Ok(event) = events.recv().await {
                match event {
                    PlateEvent::FontsReady => {
                        let form = input.read();
                        match compositor.request_draw(&form).await {
                            Ok(completion) => debug!("Catch-up preview settled: {:?}", completion),
                            Err(e) => debug!("Catch-up preview failed: {}", e),
                        }
                        break;
                    }
                    PlateEvent::FontsFailed => break,
                    _ => {}
                }
            }
        }));
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Call on every change to any form field
    pub fn on_edit(&self) {
        let compositor = self.compositor.clone();
        let input = Rc::clone(&self.input);
        self.debouncer.schedule(move || {
            let form = input.read();
            let event_loop = compositor.event_loop();
            event_loop.spawn_local(Box::pin(async move {
                match compositor.request_draw(&form).await {
                    Ok(completion) => debug!("Live preview settled: {:?}", completion),
                    Err(e) => debug!("Live preview failed: {}", e),
                }
            }));
        });
    }
}
