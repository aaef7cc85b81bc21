use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetPdfError {
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Invalid options: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SheetPdfError>;
