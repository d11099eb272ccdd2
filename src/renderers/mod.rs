//! Renderers module for the songbook
//!
//! Each submodule turns the loaded songbook into one output surface:
//! MusicXML scores, an EPUB2 ebook, a Word document, or a static site.

pub mod docx;
pub mod epub;
pub mod musicxml;
pub mod site;
pub mod util;

// Re-export commonly used types
pub use docx::make_docx;
pub use epub::{make_epub, EpubOptions};
pub use musicxml::{export_songs, ExportOptions, ScoreOptions};
pub use site::build_site;
