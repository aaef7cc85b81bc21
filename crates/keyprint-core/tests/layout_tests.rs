use keyprint_core::render::{build_scene, fit_display_scale, html::to_html};
use keyprint_core::specs::SHEET;
use keyprint_core::units::{mm_to_px, px_to_mm};
use keyprint_core::*;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn test_unit_roundtrip() {
    for mm in [0.0, 1.0, 5.5, 40.0, 100.0, 148.0] {
        for dpi in [96, 300, 600] {
            assert!(approx(px_to_mm(mm_to_px(mm, dpi), dpi), mm));
        }
    }
}

#[test]
fn test_every_template_key_has_a_slot() {
    for template in Template::ALL {
        let layout = Layout::new(template);
        for key in layout.keys() {
            let shown = template
                .preview_arrangements()
                .iter()
                .any(|a| a.kind_of(key).is_some());
            assert!(shown, "{template}: '{key}' is never shown");
        }
    }
}

#[test]
fn test_panel_boxes_are_concentric() {
    for kind in PanelKind::ALL {
        let g = kind.geometry();
        assert!(g.bleed.width_mm >= g.trim.width_mm, "{kind}");
        assert!(g.trim.width_mm >= g.safe.width_mm, "{kind}");
        assert!(g.trim.height_mm >= g.viewport.height_mm, "{kind}");
    }

    let sheet = arrange(Arrangement::CardPair, |_| true);
    for p in &sheet.placements {
        assert!(approx(p.bleed.center_x(), p.trim.center_x()));
        assert!(approx(p.trim.center_y(), p.safe.center_y()));
        assert!(approx(p.trim.center_x(), p.viewport.center_x()));
    }
}

#[test]
fn test_four_up_grid() {
    let sheet = arrange(Arrangement::FourUpSheet, |_| true);
    assert_eq!(sheet.size(), SHEET);
    let origins: Vec<(f32, f32)> = sheet
        .placements
        .iter()
        .map(|p| (p.bleed.x, p.bleed.y))
        .collect();
    assert_eq!(origins, vec![(0.0, 0.0), (44.0, 0.0), (0.0, 54.0), (44.0, 54.0)]);

    let a = sheet.placement("a").unwrap();
    assert_eq!((a.trim.x, a.trim.y), (2.0, 2.0));
    let b = sheet.placement("b").unwrap();
    assert!(approx(b.trim.x - a.trim.right(), 4.0));
}

#[test]
fn test_pinned_arrangement_keeps_positions() {
    let full = arrange(Arrangement::FourUpSheet, |_| true);
    let partial = arrange(Arrangement::FourUpSheet, |k| k != "b");
    assert_eq!(partial.placements.len(), 3);
    assert_eq!(partial.placement("c"), full.placement("c"));
    assert_eq!(partial.size(), full.size());
}

#[test]
fn test_cd_sheet_stack() {
    let sheet = arrange(Arrangement::CdSheet, |_| true);
    let ys: Vec<f32> = sheet.placements.iter().map(|p| p.bleed.y).collect();
    assert_eq!(ys, vec![2.0, 48.0, 94.0]);
    let disc = sheet.placement("disc").unwrap();
    assert_eq!(disc.shape, PanelShape::Circle);
    assert!(disc.hole.is_some());
    assert!(sheet.placements.iter().all(|p| p.bleed.bottom() <= SHEET.height_mm));
}

#[test]
fn test_packed_strip_shrinks() {
    let full = arrange(Arrangement::BackStrip, |_| true);
    let without_spine = arrange(Arrangement::BackStrip, |k| k != "spine-2");
    assert_eq!(full.placements.len(), 5);
    assert_eq!(without_spine.placements.len(), 4);
    let spine = full.placement("spine-2").unwrap();
    assert!(approx(
        full.width_mm - without_spine.width_mm,
        spine.bleed.width + 2.0
    ));
    assert!(full.group_guides.is_some());
    assert!(full.fold_lines_x_mm.is_empty());
}

#[test]
fn test_fold_strip_has_fold_lines() {
    let sheet = arrange(Arrangement::BackFoldStrip, |_| true);
    assert_eq!(sheet.fold_lines_x_mm.len(), 4);
    for pair in sheet.placements.windows(2) {
        assert!(approx(pair[0].bleed.right(), pair[1].bleed.x));
    }
    assert!(sheet.group_guides.is_none());
}

#[test]
fn test_hit_test_respects_circle() {
    let layout = Layout::new(Template::Cd3Simple);
    let sheet = arrange(Arrangement::CdSheet, |k| layout.get(k).is_some());
    let scene = build_scene(&sheet, &layout, Some("disc"), 1.0);

    let disc = scene.panel("disc").unwrap();
    assert!(disc.active);
    let (cx, cy) = (disc.viewport.center_x(), disc.viewport.center_y());
    assert_eq!(scene.hit_test(cx, cy), Some("disc"));
    // corner of the bounding box is outside the circle
    assert_eq!(scene.hit_test(disc.viewport.x + 0.5, disc.viewport.y + 0.5), None);

    let front = scene.panel("case-front").unwrap();
    assert_eq!(
        scene.hit_test(front.viewport.center_x(), front.viewport.center_y()),
        Some("case-front")
    );
}

#[test]
fn test_scene_image_needs_natural_size() {
    let layout = Layout::four_by_five_from_url("https://img.example/a.jpg");
    let sheet = arrange(Arrangement::CardPair, |_| true);
    let scene = build_scene(&sheet, &layout, None, 0.5);
    let image = scene.panel("front").unwrap().image.as_ref().unwrap();
    assert!(image.needs_natural_size);
    assert_eq!(image.src, "https://img.example/a.jpg");
}

#[test]
fn test_display_scale_never_enlarges() {
    assert_eq!(fit_display_scale(10_000.0, 10_000.0, 100.0, 148.0, 3.78), 1.0);
    let s = fit_display_scale(189.0, 10_000.0, 100.0, 148.0, 3.78);
    assert!(approx(s, 0.5));
}

#[test]
fn test_html_uses_physical_units() {
    let mut layout = Layout::four_by_five_from_url("https://img.example/a.jpg?x=1&y=2");
    layout.get_mut("front").unwrap().transform.scale = 2.0;
    let sheet = arrange(Arrangement::CardPair, |_| true);
    let html = to_html(&build_scene(&sheet, &layout, Some("front"), 0.75));

    assert!(html.contains("width:90mm;height:54mm;transform:scale(0.75)"));
    assert!(html.contains("translate(0mm, 0mm) scale(2) rotate(0deg)"));
    assert!(html.contains("a.jpg?x=1&amp;y=2"));
    assert!(html.contains("dashed"));
    assert!(html.contains("kp-active"));
}
