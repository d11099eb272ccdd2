//! Error types for the songbook pipeline
//!
//! Renderer and storage failures are fatal and propagate with `?`.
//! Malformed *notation* is never an error: the tokenizer drops fragments
//! it cannot parse and the resolver returns `None` for unknown tokens.

use thiserror::Error;

/// Top-level pipeline error
#[derive(Debug, Error)]
pub enum SongbookError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("template error: {0}")]
    Template(#[from] mustache::Error),

    /// Structural problem in the song dataset (missing id/title, duplicate ids)
    #[error("invalid songbook: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, SongbookError>;
