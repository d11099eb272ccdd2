//! Song and book data structures mirroring the JSON layout on disk.
//!
//! Unknown keys are tolerated on load; the typed structs carry only what
//! the renderers consume. Maintenance commands that must round-trip
//! hand-edited files work on `serde_json::Value` instead (see the store
//! module) so they never drop fields these structs don't know about.

use serde::{Deserialize, Serialize};

use super::serde_helpers::{boolish_true, default_true};

fn default_book_title() -> String {
    "My Songbook".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

/// Book-level metadata from `book.json` (or the legacy monolith header).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookMeta {
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub cover_image: String,
}

impl Default for BookMeta {
    fn default() -> Self {
        Self {
            creator: String::new(),
            publisher: String::new(),
            language: default_language(),
            isbn: String::new(),
            cover_image: String::new(),
        }
    }
}

/// `book.json`: title, metadata and the song ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    #[serde(default = "default_book_title")]
    pub book_title: String,
    #[serde(default)]
    pub book_meta: BookMeta,
    #[serde(default)]
    pub song_order: Vec<String>,
}

impl Default for Book {
    fn default() -> Self {
        Self {
            book_title: default_book_title(),
            book_meta: BookMeta::default(),
            song_order: Vec::new(),
        }
    }
}

/// Legacy monolithic `songs.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyBook {
    #[serde(default = "default_book_title")]
    pub book_title: String,
    #[serde(default)]
    pub book_meta: BookMeta,
    #[serde(default)]
    pub songs: Vec<Song>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_true", deserialize_with = "boolish_true")]
    pub export: bool,
    #[serde(default)]
    pub info: Vec<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub background_mode: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lines: Vec<Line>,
}

/// One notation line: lyric syllables aligned with sargam, with an
/// optional precomputed Western rendering and token list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Line {
    #[serde(default)]
    pub lyrics: String,
    #[serde(default)]
    pub indian: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub western: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<String>>,
}
