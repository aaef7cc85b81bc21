//! HTML emitter for a preview scene
//!
//! Boxes are absolutely positioned in `mm` so the browser lays them out at
//! physical size; only the outer container carries the display scale.

use super::scene::{PanelNode, Scene};
use crate::layout::Rect;
use crate::specs::PanelShape;
use std::fmt::Write;

const TRIM_GUIDE: &str = "0.2mm solid #e53935";
const SAFE_GUIDE: &str = "0.2mm dashed #1e88e5";
const FOLD_GUIDE: &str = "0.2mm dashed #9e9e9e";

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Position of `inner` relative to `outer`, as CSS
fn box_style(inner: &Rect, outer: &Rect) -> String {
    format!(
        "position:absolute;left:{}mm;top:{}mm;width:{}mm;height:{}mm;box-sizing:border-box",
        inner.x - outer.x,
        inner.y - outer.y,
        inner.width,
        inner.height
    )
}

fn radius(shape: PanelShape) -> &'static str {
    match shape {
        PanelShape::Rect => "",
        PanelShape::Circle => ";border-radius:50%",
    }
}

pub fn to_html(scene: &Scene) -> String {
    let origin = Rect::new(0.0, 0.0, scene.width_mm, scene.height_mm);
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<div class="kp-scene" style="position:relative;width:{}mm;height:{}mm;transform:scale({});transform-origin:top left">"#,
        scene.width_mm, scene.height_mm, scene.display_scale
    );

    for panel in &scene.panels {
        write_panel(&mut out, panel, &origin);
    }

    for x in &scene.fold_lines_x_mm {
        let _ = write!(
            out,
            r#"<div class="kp-fold" style="position:absolute;left:{x}mm;top:0;height:100%;border-left:{FOLD_GUIDE}"></div>"#
        );
    }

    if let Some(guides) = &scene.group_guides {
        let _ = write!(
            out,
            r#"<div class="kp-group-trim" style="{};border:{TRIM_GUIDE}"></div><div class="kp-group-safe" style="{};border:{SAFE_GUIDE}"></div>"#,
            box_style(&guides.trim, &origin),
            box_style(&guides.safe, &origin)
        );
    }

    out.push_str("</div>");
    out
}

fn write_panel(out: &mut String, panel: &PanelNode, origin: &Rect) {
    let round = radius(panel.shape);
    let _ = write!(
        out,
        r#"<div class="kp-panel{}" data-key="{}" style="{}{}">"#,
        if panel.active { " kp-active" } else { "" },
        escape(&panel.key),
        box_style(&panel.bleed, origin),
        round
    );

    let background = panel
        .background_color
        .as_deref()
        .map(|c| format!(";background-color:{}", escape(c)))
        .unwrap_or_default();
    let _ = write!(
        out,
        r#"<div class="kp-viewport" style="{};overflow:hidden{round}{background}">"#,
        box_style(&panel.viewport, &panel.bleed)
    );
    if let Some(image) = &panel.image {
        let _ = write!(
            out,
            r#"<img src="{}" draggable="false" style="position:absolute;left:0;top:0;width:100%;height:100%;object-fit:contain;transform:{};transform-origin:center">"#,
            escape(&image.src),
            image.transform.css()
        );
    }
    out.push_str("</div>");

    let _ = write!(
        out,
        r#"<div class="kp-trim" style="{};border:{TRIM_GUIDE};pointer-events:none{round}"></div>"#,
        box_style(&panel.trim, &panel.bleed)
    );
    let _ = write!(
        out,
        r#"<div class="kp-safe" style="{};border:{SAFE_GUIDE};pointer-events:none{round}"></div>"#,
        box_style(&panel.safe, &panel.bleed)
    );
    if let Some(hole) = &panel.hole {
        let _ = write!(
            out,
            r#"<div class="kp-hole" style="{};border-radius:50%;background:#fff;border:{TRIM_GUIDE}"></div>"#,
            box_style(hole, &panel.bleed)
        );
    }
    out.push_str("</div>");
}
