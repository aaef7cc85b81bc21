//! Interactive preview
//!
//! A layout is turned into a `Scene` of nested millimeter boxes, which the
//! kiosk paints directly and `html::to_html` emits for browsers.

pub mod html;
mod scene;

pub use scene::*;
