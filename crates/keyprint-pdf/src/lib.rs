mod options;
mod pdf;
mod types;

pub use options::SheetPdfOptions;
pub use pdf::{generate_sheet_pdf, sheet_pdf_bytes};
pub use types::*;
