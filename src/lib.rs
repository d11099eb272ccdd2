//! Songbook pipeline
//!
//! Turns a JSON songbook of sargam (Indian solfege) notation into
//! MusicXML scores, an EPUB, a Word document and a static website.
//! The notation core tokenizes display lines, resolves tokens to
//! Western pitches and expands ornaments into timed events; the
//! renderers are thin surfaces over that core.

pub mod error;
pub mod models;
pub mod notation;
pub mod renderers;
pub mod store;

// Re-export commonly used types
pub use error::{Result, SongbookError};
pub use models::{Book, BookMeta, Line, Section, Song};
pub use notation::{Event, Notation, NotationMapping, ResolvedNote};
