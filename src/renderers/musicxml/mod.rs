//! MusicXML export module
//!
//! Produces one MusicXML 3.1 file per song with sargam and Western
//! labels as paired lyric lines.

pub mod builder;
pub mod duration;
pub mod export;

pub use builder::{MusicXmlBuilder, ScoreOptions};
pub use export::{export_songs, ExportOptions};
