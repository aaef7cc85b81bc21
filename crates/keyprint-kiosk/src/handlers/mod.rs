pub mod config;
pub mod export;
pub mod images;
pub mod share;
