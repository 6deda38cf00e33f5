//! Main window: form, preview canvas and the two action buttons

use crate::assets::GioAssetLoader;
use crate::cairo_renderer::CairoSurface;
use crate::dialogs::{DialogNotifier, DownloadsSink};
use crate::event_loop::GlibEventLoop;
use crate::form::PlateForm;
use gtk4::prelude::*;
use gtk4::{Application, ApplicationWindow, Box as GtkBox, Button, DrawingArea, Label, Orientation};
use nameplate_core::{BackendError, Collaborators, Compositor, InputSource, LivePreview, PlateConfig, PlateEvent};
use std::rc::Rc;
use tracing::{debug, error};

const LOADING_FONTS: &str = "フォントを読込中…";
const FONTS_FAILED: &str = "フォントの読み込みに失敗しました";

/// Widget changes implied by one compositor event
#[derive(Debug, Default, PartialEq, Eq)]
struct ControlUpdate {
    submit_enabled: Option<bool>,
    export_enabled: Option<bool>,
    status: Option<StatusLine>,
    redraw: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum StatusLine {
    Hidden,
    Text(&'static str),
}

fn control_update(event: &PlateEvent) -> ControlUpdate {
    match event {
        PlateEvent::FontsReady => ControlUpdate {
            submit_enabled: Some(true),
            status: Some(StatusLine::Hidden),
            ..Default::default()
        },
        PlateEvent::FontsFailed => ControlUpdate {
            submit_enabled: Some(false),
            status: Some(StatusLine::Text(FONTS_FAILED)),
            ..Default::default()
        },
        PlateEvent::ExportAvailable(available) => ControlUpdate {
            export_enabled: Some(*available),
            ..Default::default()
        },
        PlateEvent::SurfaceChanged => ControlUpdate { redraw: true, ..Default::default() },
    }
}

/// Build the nameplate window and start loading fonts
pub fn build_window(app: &Application, config: PlateConfig) -> Result<ApplicationWindow, BackendError> {
    let window = ApplicationWindow::builder()
        .application(app)
        .title("Nameplate")
        .default_width(480)
        .default_height(520)
        .build();

    let surface = CairoSurface::new(config.canvas_width, config.canvas_height)?;
    let collaborators = Collaborators {
        loader: Rc::new(GioAssetLoader::new()),
        notifier: Rc::new(DialogNotifier::new(&window)),
        sink: Rc::new(DownloadsSink::new()),
        event_loop: Rc::new(GlibEventLoop::new()),
    };
    let compositor = Compositor::new(config, surface, collaborators);

    let area = DrawingArea::new();
    area.set_content_width(compositor.config().canvas_width.ceil() as i32);
    area.set_content_height(compositor.config().canvas_height.ceil() as i32);
    area.set_hexpand(true);
    let draw_compositor = compositor.clone();
    area.set_draw_func(move |_, cr, width, height| {
        if let Err(e) = draw_compositor.surface().paint_to(cr, width, height) {
            error!("Failed to paint preview: {}", e);
        }
    });

    let form = Rc::new(PlateForm::new());
    let status = Label::new(Some(LOADING_FONTS));
    let submit_button = Button::with_label("作成");
    submit_button.set_sensitive(false);
    let export_button = Button::with_label("ダウンロード");
    export_button.set_sensitive(false);

    let buttons = GtkBox::new(Orientation::Horizontal, 8);
    buttons.append(&submit_button);
    buttons.append(&export_button);

    let layout = GtkBox::new(Orientation::Vertical, 12);
    layout.set_margin_top(12);
    layout.set_margin_bottom(12);
    layout.set_margin_start(12);
    layout.set_margin_end(12);
    layout.append(form.widget());
    layout.append(&buttons);
    layout.append(&status);
    layout.append(&area);
    window.set_child(Some(&layout));

    // Compositor events drive widget state
    let events = compositor.subscribe();
    let (events_area, events_status) = (area.clone(), status.clone());
    let (events_submit, events_export) = (submit_button.clone(), export_button.clone());
    glib::MainContext::default().spawn_local(async move {
        while let Ok(event) = events.recv().await {
            debug!("Window event {:?}", event);
            let update = control_update(&event);
            if let Some(enabled) = update.submit_enabled {
                events_submit.set_sensitive(enabled);
            }
            if let Some(enabled) = update.export_enabled {
                events_export.set_sensitive(enabled);
            }
            match update.status {
                Some(StatusLine::Hidden) => events_status.set_visible(false),
                Some(StatusLine::Text(text)) => events_status.set_text(text),
                None => {}
            }
            if update.redraw {
                events_area.queue_draw();
            }
        }
    });

    let input: Rc<dyn InputSource> = form.clone();
    let preview = Rc::new(LivePreview::new(compositor.clone(), input));
    form.connect_changed(move || preview.on_edit());

    let submit_compositor = compositor.clone();
    let submit_form = Rc::clone(&form);
    submit_button.connect_clicked(move |_| {
        let compositor = submit_compositor.clone();
        let form = submit_form.read();
        glib::MainContext::default().spawn_local(async move {
            if let Err(e) = compositor.submit_draw(&form).await {
                debug!("Submit rejected: {}", e);
            }
        });
    });

    let export_compositor = compositor.clone();
    export_button.connect_clicked(move |_| {
        if let Err(e) = export_compositor.export_image() {
            debug!("Export rejected: {}", e);
        }
    });

    glib::MainContext::default().spawn_local(async move {
        if let Err(e) = compositor.load_fonts().await {
            error!("Font loading failed: {}", e);
        }
    });

    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_enabled_once_fonts_ready() {
        let update = control_update(&PlateEvent::FontsReady);
        assert_eq!(update.submit_enabled, Some(true));
        assert_eq!(update.status, Some(StatusLine::Hidden));
        assert_eq!(update.export_enabled, None);
    }

    #[test]
    fn test_submit_stays_disabled_after_font_failure() {
        let update = control_update(&PlateEvent::FontsFailed);
        assert_eq!(update.submit_enabled, Some(false));
        assert_eq!(update.status, Some(StatusLine::Text(FONTS_FAILED)));
    }

    #[test]
    fn test_draw_events_leave_submit_alone() {
        for available in [true, false] {
            let update = control_update(&PlateEvent::ExportAvailable(available));
            assert_eq!(update.export_enabled, Some(available));
            assert_eq!(update.submit_enabled, None);
            assert!(!update.redraw);
        }
        let update = control_update(&PlateEvent::SurfaceChanged);
        assert_eq!(update, ControlUpdate { redraw: true, ..Default::default() });
    }
}
