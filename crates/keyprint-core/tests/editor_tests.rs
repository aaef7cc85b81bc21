use keyprint_core::*;

fn editor_with_image() -> EditorSession {
    let mut editor = EditorSession::from_template(Template::FourByFive);
    editor.set_image("https://img.example/photo.jpg").unwrap();
    editor
}

fn active_transform(editor: &EditorSession) -> ImageTransform {
    editor.active_record().unwrap().transform
}

#[test]
fn test_new_session_starts_clean() {
    let editor = EditorSession::from_template(Template::Cd3Panel);
    assert_eq!(editor.active(), "disc");
    assert_eq!(editor.group(), Some(PanelGroup::Disc));
    assert_eq!(editor.arrangement(), Arrangement::Disc);
    assert!(!editor.can_undo());
    assert!(!editor.can_redo());
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn test_zoom_is_clamped() {
    let mut editor = editor_with_image();
    for _ in 0..200 {
        editor.handle_key(EditorKey::ZoomIn);
    }
    assert_eq!(active_transform(&editor).scale, MAX_SCALE);
    for _ in 0..200 {
        editor.zoom(ZoomDirection::Out);
    }
    assert_eq!(active_transform(&editor).scale, MIN_SCALE);
}

#[test]
fn test_arrow_keys_move_image_opposite() {
    let mut editor = editor_with_image();
    assert!(editor.handle_key(EditorKey::ArrowRight));
    assert!(editor.handle_key(EditorKey::ArrowUp));
    let t = active_transform(&editor);
    assert_eq!((t.translate_x_mm, t.translate_y_mm), (-1.0, 1.0));
}

#[test]
fn test_each_action_records_one_snapshot() {
    let mut editor = editor_with_image();
    let before = editor.history().len();
    editor.nudge(1.0, 0.0);
    editor.zoom(ZoomDirection::In);
    editor.set_background_color(Some("#ff0000".to_string()));
    assert_eq!(editor.history().len(), before + 3);
}

#[test]
fn test_undo_redo_and_truncation() {
    let mut editor = EditorSession::from_template(Template::FourByFive);
    editor.nudge(1.0, 0.0);
    editor.nudge(1.0, 0.0);
    assert_eq!(active_transform(&editor).translate_x_mm, 2.0);

    assert!(editor.undo());
    assert_eq!(active_transform(&editor).translate_x_mm, 1.0);
    assert!(editor.can_redo());

    // a new action drops the redo branch
    editor.nudge(0.0, 5.0);
    assert!(!editor.can_redo());
    assert!(!editor.redo());

    assert!(editor.undo());
    assert!(editor.undo());
    assert!(!editor.undo());
    assert_eq!(active_transform(&editor), ImageTransform::IDENTITY);
}

#[test]
fn test_cover_needs_natural_size() {
    let mut editor = editor_with_image();
    let len = editor.history().len();
    assert!(!editor.cover());
    assert_eq!(editor.history().len(), len);

    editor.record_natural_size("front", 2000, 1000);
    assert_eq!(editor.history().len(), len);
    assert!(editor.cover());
    let covered = active_transform(&editor);
    // 4x5 viewport is 35x45 mm
    let expected = (2.0_f32 / (35.0 / 45.0)).min(MAX_SCALE);
    assert!((covered.scale - expected).abs() < 1e-4);

    // applying cover again changes nothing
    editor.nudge(3.0, 0.0);
    assert!(editor.cover());
    assert_eq!(active_transform(&editor), covered);
}

#[test]
fn test_natural_size_survives_undo() {
    let mut editor = editor_with_image();
    editor.nudge(1.0, 1.0);
    editor.record_natural_size("front", 800, 600);
    assert!(editor.undo());
    assert_eq!(editor.active_record().unwrap().natural_size(), Some((800, 600)));
    assert!(editor.cover());
}

#[test]
fn test_fit_and_center_clear_offsets() {
    let mut editor = editor_with_image();
    editor.nudge(3.0, 4.0);
    editor.fit_width();
    let t = active_transform(&editor);
    assert_eq!((t.translate_x_mm, t.translate_y_mm), (3.0, 0.0));
    editor.nudge(0.0, 2.0);
    editor.fit_height();
    let t = active_transform(&editor);
    assert_eq!((t.translate_x_mm, t.translate_y_mm), (0.0, 2.0));
    editor.center();
    let t = active_transform(&editor);
    assert_eq!((t.translate_x_mm, t.translate_y_mm), (0.0, 0.0));
}

#[test]
fn test_set_image_rejects_garbage() {
    let mut editor = EditorSession::from_template(Template::FourByFive);
    let err = editor.set_image("not an image").unwrap_err();
    assert!(err.is_input_error());
    assert!(!editor.can_undo());
    editor.set_image("data:image/png;base64,AAAA").unwrap();
    assert!(editor.can_undo());
}

#[test]
fn test_drag_records_once() {
    let mut editor = editor_with_image();
    let len = editor.history().len();

    editor.pointer_down(1, 100.0, 100.0);
    for step in 1..=10 {
        let x = 100.0 + step as f32 * 3.78;
        editor.pointer_move(1, x, 100.0).unwrap();
    }
    assert_eq!(editor.history().len(), len);
    assert_eq!(editor.pointer_up(1), PointerRelease::Finished);
    assert_eq!(editor.history().len(), len + 1);

    let t = active_transform(&editor);
    assert!((t.translate_x_mm - 10.0).abs() < 1e-3);
    assert_eq!(t.translate_y_mm, 0.0);
}

#[test]
fn test_tap_without_movement_records_nothing() {
    let mut editor = editor_with_image();
    let len = editor.history().len();
    editor.pointer_down(7, 10.0, 10.0);
    assert_eq!(editor.pointer_up(7), PointerRelease::Finished);
    assert_eq!(editor.history().len(), len);
    assert_eq!(editor.pointer_up(7), PointerRelease::Ignored);
}

#[test]
fn test_pinch_scales_without_rotating() {
    let mut editor = editor_with_image();
    editor.pointer_down(1, 0.0, 0.0);
    editor.pointer_down(2, 100.0, 0.0);
    let update = editor.pointer_move(2, 0.0, 200.0).unwrap();
    assert_eq!(update.scale, Some(2.0));
    assert!((update.rotation_delta_deg.unwrap() - 90.0).abs() < 1e-3);

    assert_eq!(editor.pointer_up(2), PointerRelease::Continuing);
    assert_eq!(editor.pointer_up(1), PointerRelease::Finished);
    let t = active_transform(&editor);
    assert_eq!(t.scale, 2.0);
    assert_eq!(t.rotation_deg, 0.0);
}

#[test]
fn test_group_follows_active_panel() {
    let mut editor = EditorSession::from_template(Template::Cd3Panel);
    editor.set_active("spine-2").unwrap();
    assert_eq!(editor.group(), Some(PanelGroup::Back));
    assert_eq!(editor.arrangement(), Arrangement::BackStrip);

    editor.select_group(PanelGroup::Front).unwrap();
    assert_eq!(editor.active(), "front-left");
    assert!(editor.set_active("case-front").is_err());

    let mut simple = EditorSession::from_template(Template::Cd3Simple);
    assert!(simple.select_group(PanelGroup::Disc).is_err());
    assert_eq!(simple.arrangement(), Arrangement::CdSheet);
}

#[tokio::test]
async fn test_events_are_published() {
    let mut editor = EditorSession::from_template(Template::FourByFive);
    let mut rx = editor.subscribe();
    editor.nudge(1.0, 0.0);

    let first = rx.recv().await.unwrap();
    assert_eq!(
        first,
        EditorEvent::LayoutChanged {
            revision: 1,
            key: Some("front".to_string())
        }
    );
    let second = rx.recv().await.unwrap();
    assert_eq!(second, EditorEvent::HistoryMoved { cursor: 1, len: 2 });
}
