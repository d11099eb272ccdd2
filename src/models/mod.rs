//! Data models for the songbook
//!
//! Typed views of book.json, songs/<id>.json and the legacy songs.json
//! monolith, plus serde helpers for their loosely-typed fields.

pub mod serde_helpers;
pub mod song;

// Re-export commonly used types
pub use song::{Book, BookMeta, LegacyBook, Line, Section, Song};
