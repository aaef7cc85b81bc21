//! Layout engine
//!
//! Turns named arrangements into millimeter rectangles:
//! - Slot positions (pinned offsets or packed strips)
//! - Concentric bleed, trim, safe and viewport boxes per panel
//! - Fold lines and group guides for the case back

mod arrangement;
mod types;

pub use arrangement::*;
pub use types::*;
