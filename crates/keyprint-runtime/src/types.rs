use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Core(#[from] keyprint_core::KeyprintError),

    #[error(transparent)]
    Pdf(#[from] keyprint_pdf::SheetPdfError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
