pub mod editor;
pub mod staff;

pub use editor::{EditorState, show_editor};
pub use staff::{StaffState, show_staff};
