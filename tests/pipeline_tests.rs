// Integration tests for the nameplate pipeline, run against the dummy backend

use futures::future::join;
use nameplate_core::dummy_backend::{DrawOp, DummyBackend, RecordingSurface, StaticInput};
use nameplate_core::{
    Color, Completion, Compositor, EventLoop, Field, FormInput, LivePreview, Phase, PlateConfig, PlateError,
    PlateEvent, PlateType, Rect, TextAlign, TextBaseline,
};
use std::rc::Rc;
use std::time::Duration;

const BACKGROUND_NO_DAN: &str = "assets/images/plate/no-dan/gold.png";
const BACKGROUND_DAN: &str = "assets/images/plate/dan/gold.png";
const DECORATION: &str = "assets/images/dani/5dan/gold-red.png";

fn form(title: &str, name: &str) -> FormInput {
    FormInput {
        title: title.into(),
        player_name: name.into(),
        plate_type: PlateType::Gold,
        ..Default::default()
    }
}

fn ranked_form(title: &str, name: &str) -> FormInput {
    FormInput {
        show_rank: true,
        rank_tier: "5dan".into(),
        frame_color: "gold".into(),
        pass_color: "red".into(),
        ..form(title, name)
    }
}

fn ready_backend() -> (DummyBackend, Compositor<RecordingSurface>) {
    let backend = DummyBackend::new();
    let compositor = backend.compositor(PlateConfig::default());
    backend.run(compositor.load_fonts()).unwrap();
    (backend, compositor)
}

#[test]
fn test_missing_title_is_rejected_without_drawing() {
    let (backend, compositor) = ready_backend();

    let result = backend.run(compositor.submit_draw(&form("", "Alice")));

    assert_eq!(result, Err(PlateError::Validation { field: Field::Title }));
    assert_eq!(backend.notifier.messages(), ["称号名を入力してください"]);
    assert!(compositor.surface().ops().is_empty());
    assert!(!compositor.has_valid_composite());
    assert_eq!(compositor.phase(), Phase::Idle);
    assert!(backend.loader.requests().iter().all(|url| !url.contains("images")));
}

#[test]
fn test_whitespace_only_name_is_rejected() {
    let (backend, compositor) = ready_backend();
    let result = backend.run(compositor.submit_draw(&form("Champion", "   ")));
    assert_eq!(result, Err(PlateError::Validation { field: Field::PlayerName }));
    assert_eq!(backend.notifier.messages(), ["プレイヤー名を入力してください"]);
}

#[test]
fn test_plain_plate_draws_centered_layers() {
    let (backend, compositor) = ready_backend();

    let result = backend.run(compositor.submit_draw(&form("初心者", "Bob")));
    assert_eq!(result, Ok(Completion::Ready));
    assert_eq!(compositor.phase(), Phase::Ready);
    assert!(compositor.has_valid_composite());
    assert!(backend.notifier.messages().is_empty());
    assert!(backend.loader.requests().contains(&BACKGROUND_NO_DAN.to_string()));

    let surface = compositor.surface();
    assert_eq!(
        surface.images(),
        [(400, 100, Rect { x: 0.0, y: 17.0, width: 400.0, height: 100.0 })]
    );

    let fills = surface.fill_texts();
    let title = &fills[0];
    assert_eq!(title.text, "初心者");
    assert_eq!(title.font.primary(), Some("Kukde"));
    assert_eq!((title.x, title.y), (200.0, 50.0));
    assert_eq!(title.align, TextAlign::Center);
    assert_eq!(title.baseline, TextBaseline::Middle);

    let strokes = surface.stroke_texts();
    assert_eq!(strokes.len(), 1);
    let (outline, name) = (&strokes[0], &fills[1]);
    assert_eq!(name.text, "Bob");
    assert_eq!(name.font.primary(), Some("TnT"));
    assert_eq!(name.font.size, 25.0);
    assert_eq!((name.x, name.y), (200.0, 91.5));
    assert_eq!(name.color, Color::rgb(1.0, 1.0, 1.0));
    assert_eq!((outline.x, outline.y), (name.x, name.y));
    assert_eq!(outline.line_width, 6.0);
    assert_eq!(outline.color, Color::rgb(0.0, 0.0, 0.0));

    // Stroke goes down before the fill so the outline sits underneath
    let stroke_at = surface.ops().iter().position(|op| matches!(op, DrawOp::StrokeText(_)));
    let fill_at = surface
        .ops()
        .iter()
        .position(|op| matches!(op, DrawOp::FillText(t) if t.text == "Bob"));
    assert!(stroke_at < fill_at);
}

#[test]
fn test_ranked_plate_adds_scaled_decoration() {
    let (backend, compositor) = ready_backend();
    backend.loader.set_image(DECORATION, 80, 60);

    let result = backend.run(compositor.submit_draw(&ranked_form("Champion", "Carol")));
    assert_eq!(result, Ok(Completion::Ready));
    assert!(compositor.has_valid_composite());
    assert_eq!(backend.loader.requests()[2..], [BACKGROUND_DAN.to_string(), DECORATION.to_string()]);

    let surface = compositor.surface();
    let images = surface.images();
    assert_eq!(images.len(), 2);
    let (width, height) = (80.0 * 0.85, 60.0 * 0.85);
    let expected = Rect { x: 400.0 - width - 100.0, y: 117.0 - height - 7.5, width, height };
    assert_eq!(images[1], (80, 60, expected));
    assert!((expected.x - 232.0).abs() < 1e-9 && (expected.y - 58.5).abs() < 1e-9);

    // Decoration is the last layer
    assert!(matches!(surface.ops().last(), Some(DrawOp::Image { width: 80, .. })));

    let name = surface.fill_texts().into_iter().find(|t| t.text == "Carol").unwrap();
    assert_eq!(name.x, 0.26 * 400.0);
}

#[test]
fn test_missing_decoration_clears_surface() {
    let (backend, compositor) = ready_backend();
    backend.loader.fail(DECORATION);
    let events = compositor.subscribe();

    let result = backend.run(compositor.submit_draw(&ranked_form("Champion", "Carol")));

    assert_eq!(result, Err(PlateError::DecorationMissing { url: DECORATION.into() }));
    assert_eq!(
        backend.notifier.messages(),
        ["すみません。この段位表示は素材がありません。\n見つかり次第追加します🙇‍♀️"]
    );
    assert!(compositor.surface().is_blank());
    assert!(!compositor.has_valid_composite());
    assert_eq!(compositor.phase(), Phase::Idle);

    let received: Vec<PlateEvent> = std::iter::from_fn(|| events.try_recv().ok()).collect();
    assert!(!received.contains(&PlateEvent::ExportAvailable(true)));
}

#[test]
fn test_missing_background_reports_once() {
    let (backend, compositor) = ready_backend();
    backend.loader.fail(BACKGROUND_NO_DAN);

    let result = backend.run(compositor.submit_draw(&form("Champion", "Bob")));

    assert!(matches!(result, Err(PlateError::BackgroundLoad { ref url, .. }) if url == BACKGROUND_NO_DAN));
    assert_eq!(backend.notifier.messages(), ["プレート画像の読み込みに失敗しました"]);
    assert!(compositor.surface().fill_texts().is_empty());
    assert!(!compositor.has_valid_composite());
}

#[test]
fn test_wide_name_shifts_left_by_half_overflow() {
    let (backend, compositor) = ready_backend();

    // 16 chars at 12.5px = 200px, 20px over the 180px budget
    let name = "Maximilian Grand";
    backend.run(compositor.submit_draw(&ranked_form("Champion", name))).unwrap();

    let surface = compositor.surface();
    let draw = surface.fill_texts().into_iter().find(|t| t.text == name).unwrap();
    assert_eq!(draw.x, 0.26 * 400.0 - 10.0);
}

#[test]
fn test_latest_request_wins() {
    let (backend, compositor) = ready_backend();
    let slow = "assets/images/plate/no-dan/gold.png";
    let fast = "assets/images/plate/no-dan/blue.png";
    backend.loader.set_delay(slow, Duration::from_millis(200));
    backend.loader.set_delay(fast, Duration::from_millis(10));
    backend.loader.set_image(slow, 400, 90);
    backend.loader.set_image(fast, 400, 80);

    let first = form("Old", "Bob");
    let second = FormInput { plate_type: PlateType::Blue, ..form("New", "Bob") };
    let (a, b) = backend.run(join(compositor.submit_draw(&first), compositor.submit_draw(&second)));

    assert_eq!(a, Ok(Completion::Superseded));
    assert_eq!(b, Ok(Completion::Ready));
    assert!(compositor.has_valid_composite());

    let surface = compositor.surface();
    assert_eq!(surface.images().len(), 1);
    assert_eq!(surface.images()[0].1, 80);
    let titles: Vec<String> = surface.fill_texts().into_iter().map(|t| t.text).collect();
    assert_eq!(titles, ["New", "Bob"]);
}

#[test]
fn test_late_decoration_is_discarded() {
    let (backend, compositor) = ready_backend();
    backend.loader.set_delay(DECORATION, Duration::from_millis(200));
    backend.loader.set_image(BACKGROUND_NO_DAN, 400, 80);

    let ranked = ranked_form("Old", "Bob");
    let plain = form("New", "Bob");
    let (a, b) = backend.run(join(compositor.submit_draw(&ranked), compositor.submit_draw(&plain)));

    assert_eq!(a, Ok(Completion::Superseded));
    assert_eq!(b, Ok(Completion::Ready));
    assert!(backend.loader.requests().iter().any(|url| url == DECORATION));
    assert!(compositor.has_valid_composite());
    assert_eq!(compositor.phase(), Phase::Ready);

    let surface = compositor.surface();
    assert_eq!(surface.images().len(), 1);
    assert_eq!(surface.images()[0].1, 80);
    let titles: Vec<String> = surface.fill_texts().into_iter().map(|t| t.text).collect();
    assert_eq!(titles, ["New", "Bob"]);
}

#[test]
fn test_same_request_draws_identically() {
    let (backend, compositor) = ready_backend();
    let request = ranked_form("天下一", "Dana");

    backend.run(compositor.submit_draw(&request)).unwrap();
    let first = compositor.surface().ops().to_vec();
    backend.run(compositor.submit_draw(&request)).unwrap();

    assert_eq!(compositor.surface().ops(), first.as_slice());
}

#[test]
fn test_export_follows_composite_validity() {
    let (backend, compositor) = ready_backend();
    assert_eq!(compositor.export_image(), Err(PlateError::NothingToExport));

    backend.run(compositor.submit_draw(&form("Champion", "Bob"))).unwrap();
    compositor.export_image().unwrap();
    let downloads = backend.sink.downloads();
    assert_eq!(downloads.len(), 1);
    assert_eq!(downloads[0].0, "nameplate.png");
    assert!(downloads[0].1.starts_with(b"\x89PNG"));

    // A failed emit leaves the composite exportable
    backend.sink.fail_next(true);
    assert!(matches!(compositor.export_image(), Err(PlateError::Export { .. })));
    assert!(compositor.has_valid_composite());
    compositor.export_image().unwrap();
    assert_eq!(backend.sink.downloads().len(), 2);

    // Any later failure disarms export again
    backend.loader.fail(BACKGROUND_DAN);
    let _ = backend.run(compositor.submit_draw(&ranked_form("Champion", "Bob")));
    assert_eq!(compositor.export_image(), Err(PlateError::NothingToExport));
    assert_eq!(backend.sink.downloads().len(), 2);
}

#[test]
fn test_export_disabled_while_redrawing() {
    let (backend, compositor) = ready_backend();
    backend.run(compositor.submit_draw(&form("Champion", "Bob"))).unwrap();
    assert!(compositor.has_valid_composite());

    backend.loader.set_delay(BACKGROUND_NO_DAN, Duration::from_millis(50));
    let redraw = compositor.clone();
    let next = form("Grand Champion", "Bob");
    backend.event_loop.spawn_local(Box::pin(async move {
        let _ = redraw.submit_draw(&next).await;
    }));
    backend.event_loop.run_until_stalled();
    assert_eq!(compositor.phase(), Phase::BackgroundLoading);
    assert!(!compositor.has_valid_composite());

    backend.event_loop.advance(Duration::from_millis(50));
    assert_eq!(compositor.phase(), Phase::Ready);
    assert!(compositor.has_valid_composite());
}

#[test]
fn test_live_preview_debounces_edits() {
    let (backend, compositor) = ready_backend();
    let input = Rc::new(StaticInput::default());
    let preview = LivePreview::new(compositor.clone(), input.clone());

    for name in ["E", "Ev", "Eve"] {
        input.set(form("Champion", name));
        preview.on_edit();
        backend.event_loop.advance(Duration::from_millis(50));
    }
    assert!(compositor.surface().ops().is_empty());

    backend.event_loop.advance(Duration::from_millis(100));
    let backgrounds = backend.loader.requests().iter().filter(|u| u.contains("images")).count();
    assert_eq!(backgrounds, 1);
    let surface = compositor.surface();
    assert!(surface.fill_texts().iter().any(|t| t.text == "Eve"));
    assert!(backend.notifier.messages().is_empty());
}
