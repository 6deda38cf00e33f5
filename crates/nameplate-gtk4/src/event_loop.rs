//! GLib main loop implementation of `EventLoop`

use futures::future::LocalBoxFuture;
use nameplate_core::{EventLoop, TimerHandle};
use std::time::Duration;

/// Timers and tasks on the default GLib main context
#[derive(Debug, Default, Clone)]
pub struct GlibEventLoop;

impl GlibEventLoop {
    pub fn new() -> Self {
        GlibEventLoop
    }
}

struct GlibTimer {
    source: glib::SourceId,
}

impl TimerHandle for GlibTimer {
    fn cancel(self: Box<Self>) {
        // Only reached for timers that have not fired yet
        self.source.remove();
    }
}

impl EventLoop for GlibEventLoop {
    fn schedule_once(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Box<dyn TimerHandle> {
        let source = glib::timeout_add_local_once(delay, move || callback());
        Box::new(GlibTimer { source })
    }

    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
        // Detached: the task runs to completion even if the handle is dropped
        let _ = glib::MainContext::default().spawn_local(future);
    }

    fn sleep(&self, delay: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(glib::timeout_future(delay))
    }
}
