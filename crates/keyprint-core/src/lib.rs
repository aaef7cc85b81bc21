pub mod codec;
mod editor;
mod events;
mod gesture;
mod history;
pub mod input;
pub mod layout;
mod options;
mod panel;
pub mod raster;
pub mod render;
pub mod share;
mod sheet;
pub mod specs;
pub mod staff;
mod transform;
mod types;
pub mod units;

pub use codec::{Payload, decode_payload, decode_scanned, encode_payload, share_url};
pub use editor::{EditorKey, EditorSession};
pub use events::{EditorEvent, EventBus};
pub use gesture::{GestureEngine, GestureUpdate, PointerRelease};
pub use history::History;
pub use layout::{Arrangement, PanelPlacement, Rect, SheetLayout, arrange};
pub use options::*;
pub use panel::{Layout, PanelGroup, PanelRecord, PanelSource, Template};
pub use raster::{
    HttpImageLoader, ImageLoader, RasterFormat, RasterOptions, RasterOutcome, encode_raster,
    failed_panels_warning, load_with_timeout, rasterize, save_raster,
};
pub use sheet::{SheetKind, SheetPlan};
pub use specs::{PanelGeometry, PanelKind, PanelShape, SizeMm};
pub use transform::*;
pub use types::*;
