use keyprint_core::codec::{CdPayload, PAYLOAD_VERSION, extract_token};
use keyprint_core::units::SCREEN_PX_PER_MM;
use keyprint_core::*;

const ORIGIN: &str = "https://kiosk.example";

fn edited_cd_panel() -> Layout {
    let mut editor = EditorSession::from_template(Template::Cd3Panel);
    editor.set_image("https://img.example/disc.png").unwrap();
    editor.zoom(ZoomDirection::In);
    editor.set_active("spine-3").unwrap();
    editor.set_image("https://img.example/spine.png").unwrap();
    editor.nudge(0.0, 2.0);
    editor.set_background_color(Some("#112233".to_string()));
    editor.layout().clone()
}

#[test]
fn test_share_url_roundtrip_for_every_template() {
    let layouts = [
        Layout::four_by_five_from_url("https://img.example/a.jpg"),
        Layout::new(Template::Cd3Simple),
        edited_cd_panel(),
    ];
    for layout in layouts {
        let url = share_url(ORIGIN, &layout).unwrap();
        assert!(url.starts_with(ORIGIN));
        assert!(url.contains(layout.template().edit_path()));
        let decoded = decode_scanned(&url).unwrap().to_layout().unwrap();
        assert_eq!(decoded, layout, "{}", layout.template());
    }
}

#[test]
fn test_token_uses_uri_component_alphabet() {
    let token = encode_payload(&Payload::from_layout(&edited_cd_panel())).unwrap();
    assert!(
        token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '$'))
    );
}

#[test]
fn test_decodes_link_written_by_older_kiosk() {
    // Payload exactly as the browser kiosk serialized it, field order included
    let json = r#"{"v":1,"tpl":"4x5","front":{"part":"4x5-front","tx":0,"ty":0,"scale":1,"rot":0,"img":"https://img.example/a.jpg"},"back":{"part":"4x5-back","tx":-3.5,"ty":2,"scale":1.25,"rot":90}}"#;
    let token = lz_str::compress_to_encoded_uri_component(json);

    let layout = decode_scanned(&format!("{ORIGIN}/p/4x5/edit?data={token}"))
        .unwrap()
        .to_layout()
        .unwrap();
    assert_eq!(layout.template(), Template::FourByFive);
    let front = layout.get("front").unwrap();
    assert_eq!(front.image_ref.as_deref(), Some("https://img.example/a.jpg"));
    let back = layout.get("back").unwrap();
    assert_eq!(back.image_ref, None);
    assert_eq!(back.transform.translate_x_mm, -3.5);
    assert_eq!(back.transform.translate_y_mm, 2.0);
    assert_eq!(back.transform.scale, 1.25);
    assert_eq!(back.transform.rotation_deg, 90.0);
}

#[test]
fn test_plus_read_back_as_space_still_decodes() {
    let layout = edited_cd_panel();
    // Vary one offset until the token carries an interior '+'
    let token = (0..200)
        .map(|i| {
            let mut editor = EditorSession::new(layout.clone());
            editor.nudge(i as f32 * 0.1, 0.0);
            encode_payload(&Payload::from_layout(editor.layout())).unwrap()
        })
        .find(|token| token.trim_matches('+').contains('+'))
        .unwrap();
    let expected = decode_payload(&token).unwrap();
    let mangled = token.replace('+', " ");
    assert_eq!(decode_payload(&mangled).unwrap(), expected);
    let scanned = format!("{ORIGIN}/p/cd/edit?data={mangled}&utm=qr");
    assert_eq!(decode_scanned(&scanned).unwrap(), expected);
}

#[test]
fn test_pinch_and_pan_survive_every_scanned_form() {
    let mut editor = EditorSession::from_template(Template::FourByFive);
    editor.set_image("https://img.example/portrait.jpg").unwrap();

    // pinch out to 1.5x
    editor.pointer_down(1, 0.0, 0.0);
    editor.pointer_down(2, 100.0, 0.0);
    editor.pointer_move(2, 150.0, 0.0).unwrap();
    assert_eq!(editor.pointer_up(2), PointerRelease::Continuing);
    // keep the first finger down and pan 10mm right, 5mm down
    editor
        .pointer_move(1, 10.0 * SCREEN_PX_PER_MM, 5.0 * SCREEN_PX_PER_MM)
        .unwrap();
    assert_eq!(editor.pointer_up(1), PointerRelease::Finished);

    editor.set_active("back").unwrap();
    editor.nudge(-1.0, 0.0);
    editor.set_background_color(Some("#f0e0d0".to_string()));

    let edited = editor.layout().clone();
    let front = edited.get("front").unwrap().transform;
    assert!((front.scale - 1.5).abs() < 1e-4);
    assert!((front.translate_x_mm - 10.0).abs() < 1e-3);
    assert!((front.translate_y_mm - 5.0).abs() < 1e-3);

    let url = share_url(ORIGIN, &edited).unwrap();
    let token = extract_token(&url).unwrap();
    let forms = [
        url.clone(),
        format!("{ORIGIN}/#/p/4x5/edit?data={token}"),
        token.clone(),
    ];
    for form in forms {
        let decoded = decode_scanned(&form).unwrap().to_layout().unwrap();
        assert_eq!(decoded.template(), edited.template(), "{form}");
        for (key, record) in edited.iter() {
            let got = decoded.get(key).unwrap();
            assert_eq!(got.kind, record.kind, "{key}");
            assert_eq!(got.image_ref, record.image_ref, "{key}");
            assert_eq!(got.background_color, record.background_color, "{key}");
            assert_eq!(got.transform, record.transform, "{key}");
        }
    }
}

#[test]
fn test_scanned_forms_decode_alike() {
    let layout = Layout::four_by_five_from_url("https://img.example/a.jpg");
    let token = encode_payload(&Payload::from_layout(&layout)).unwrap();
    let forms = [
        format!("{ORIGIN}/p/4x5/edit?data={token}"),
        format!("{ORIGIN}/#/p/4x5/edit?data={token}"),
        format!("  {token}\n"),
        format!("scanned: data={token}&utm=qr"),
    ];
    for form in forms {
        let payload = decode_scanned(&form).unwrap();
        assert_eq!(payload.template(), Template::FourByFive, "{form}");
        assert_eq!(payload.front_image(), Some("https://img.example/a.jpg"));
    }
}

#[test]
fn test_garbage_is_an_input_error() {
    for text in ["", "   ", "!!!not-base64!!!", "AAAA", "https://kiosk.example/?data="] {
        let err = decode_scanned(text).unwrap_err();
        assert!(err.is_input_error(), "{text}: {err}");
    }
}

#[test]
fn test_unknown_version_is_rejected() {
    let mut payload = Payload::from_layout(&Layout::new(Template::Cd3Simple));
    if let Payload::Cd(cd) = &mut payload {
        cd.v = PAYLOAD_VERSION + 1;
    }
    let token = encode_payload(&payload).unwrap();
    let decoded = decode_payload(&token).unwrap();
    let err = decoded.to_layout().unwrap_err();
    assert!(matches!(err, KeyprintError::InvalidPayload(_)));
}

#[test]
fn test_wire_field_names() {
    let layout = Layout::four_by_five_from_url("https://img.example/a.jpg");
    let json = serde_json::to_value(Payload::from_layout(&layout)).unwrap();
    assert_eq!(json["tpl"], "4x5");
    assert_eq!(json["v"], 1);
    assert_eq!(json["front"]["part"], "4x5-front");
    assert_eq!(json["front"]["img"], "https://img.example/a.jpg");
    assert_eq!(json["front"]["scale"], 1.0);
}

#[test]
fn test_cd_payload_accepts_legacy_tag_and_partial_panels() {
    let json = serde_json::json!({
        "tpl": "cd3",
        "v": 1,
        "disc": { "part": "cd-disc", "img": "https://img.example/d.png" },
        "front": { "part": "case-front", "img": "https://img.example/f.png", "scale": 9.0 },
        "back": { "part": "case-back", "img": "https://img.example/b.png", "tx": 1.5 },
        "backPanels": {
            "outside": { "part": "cd-back-outside" },
            "spine1": { "part": "cd-spine-1" },
            "spine2": { "part": "cd-spine-2" },
            "spine3": { "part": "cd-spine-3" },
            "inside": { "part": "cd-back-inside", "img": "https://img.example/i.png" }
        }
    });
    let payload: Payload = serde_json::from_value(json).unwrap();
    assert!(matches!(payload, Payload::Cd(CdPayload { .. })));
    assert_eq!(payload.template(), Template::Cd3Panel);

    let layout = payload.to_layout().unwrap();
    // front panels fall back to the simple front face
    let left = layout.get("front-left").unwrap();
    assert_eq!(left.image_ref.as_deref(), Some("https://img.example/f.png"));
    assert_eq!(left.transform.scale, MAX_SCALE);
    assert_eq!(
        layout.get("back-inside").unwrap().image_ref.as_deref(),
        Some("https://img.example/i.png")
    );
}

#[test]
fn test_extract_prefers_query_parameter() {
    assert_eq!(
        extract_token("https://kiosk.example/p/cd/edit?x=1&data=abc#data=zzz").as_deref(),
        Some("abc")
    );
}
