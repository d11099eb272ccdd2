//! Songbook storage
//!
//! Two on-disk layouts are supported:
//!   1. Per-song files (preferred): `book.json` + `songs/<id>.json`
//!   2. Legacy monolith (fallback): `songs.json`
//!
//! All commands go through here so the layout logic lives in one place.

pub mod maintenance;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, SongbookError};
use crate::models::{Book, LegacyBook, Song};

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Pretty-printed with a trailing newline, matching how the files are
/// kept under version control.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}

/// The per-song layout is in use when `songs/` exists and holds at least
/// one JSON file.
pub fn uses_per_song_layout(root: &Path) -> bool {
    let songs_dir = root.join("songs");
    if !songs_dir.is_dir() {
        return false;
    }
    song_files(root).map(|v| !v.is_empty()).unwrap_or(false)
}

/// All `songs/*.json` paths, sorted alphabetically.
pub fn song_files(root: &Path) -> Result<Vec<PathBuf>> {
    let songs_dir = root.join("songs");
    let mut files = Vec::new();
    if !songs_dir.is_dir() {
        return Ok(files);
    }
    for entry in fs::read_dir(&songs_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Book title, metadata and song order, from whichever layout is present.
pub fn load_book(root: &Path) -> Result<Book> {
    if uses_per_song_layout(root) {
        return read_json(&root.join("book.json"));
    }
    let legacy: LegacyBook = read_json(&root.join("songs.json"))?;
    Ok(Book {
        song_order: legacy.songs.iter().map(|s| s.id.clone()).collect(),
        book_title: legacy.book_title,
        book_meta: legacy.book_meta,
    })
}

/// Every song, in `song_order` order. Song files not listed in the order
/// are appended at the end, alphabetically by filename.
pub fn load_all_songs(root: &Path) -> Result<Vec<Song>> {
    if !uses_per_song_layout(root) {
        let legacy: LegacyBook = read_json(&root.join("songs.json"))?;
        return Ok(legacy.songs);
    }

    let order = load_book(root)?.song_order;
    let songs_dir = root.join("songs");

    let mut songs = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for id in order {
        if !seen.insert(id.clone()) {
            continue;
        }
        let path = songs_dir.join(format!("{id}.json"));
        if path.is_file() {
            songs.push(read_json(&path)?);
        }
    }
    for path in song_files(root)? {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        if !seen.contains(stem) {
            songs.push(read_json(&path)?);
        }
    }
    Ok(songs)
}

/// Main entry point for the build commands. Validates ids and titles,
/// then filters out songs whose `export` flag is off.
pub fn load_songbook(root: &Path) -> Result<(Book, Vec<Song>)> {
    let book = load_book(root)?;
    let songs = load_all_songs(root)?;

    let mut seen: HashSet<&str> = HashSet::new();
    for song in &songs {
        if song.id.is_empty() || song.title.is_empty() {
            return Err(SongbookError::Invalid(
                "each song must have an id and a title".to_string(),
            ));
        }
        if !seen.insert(&song.id) {
            return Err(SongbookError::Invalid(format!(
                "duplicate song id: {}",
                song.id
            )));
        }
    }

    let exported = songs.into_iter().filter(|s| s.export).collect();
    Ok((book, exported))
}

/// Save one song to `songs/<id>.json`, creating `songs/` if needed.
pub fn save_song(root: &Path, song: &Song) -> Result<PathBuf> {
    let songs_dir = root.join("songs");
    fs::create_dir_all(&songs_dir)?;
    let path = songs_dir.join(format!("{}.json", song.id));
    write_json(&path, song)?;
    Ok(path)
}

pub fn save_book(root: &Path, book: &Book) -> Result<PathBuf> {
    let path = root.join("book.json");
    write_json(&path, book)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Section;

    fn song(id: &str, title: &str) -> Song {
        Song {
            id: id.to_string(),
            title: title.to_string(),
            export: true,
            info: Vec::new(),
            sections: vec![Section::default()],
            thumbnail: String::new(),
            background: String::new(),
            background_mode: String::new(),
        }
    }

    #[test]
    fn test_per_song_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        save_song(root, &song("alpha", "Alpha")).unwrap();
        save_song(root, &song("beta", "Beta")).unwrap();
        save_book(
            root,
            &Book {
                book_title: "Test Book".into(),
                song_order: vec!["beta".into(), "alpha".into()],
                ..Book::default()
            },
        )
        .unwrap();

        assert!(uses_per_song_layout(root));
        let (book, songs) = load_songbook(root).unwrap();
        assert_eq!(book.book_title, "Test Book");
        let ids: Vec<&str> = songs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["beta", "alpha"]);
    }

    #[test]
    fn test_stray_songs_appended() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        save_song(root, &song("listed", "Listed")).unwrap();
        save_song(root, &song("stray", "Stray")).unwrap();
        save_book(
            root,
            &Book {
                song_order: vec!["listed".into()],
                ..Book::default()
            },
        )
        .unwrap();

        let songs = load_all_songs(root).unwrap();
        let ids: Vec<&str> = songs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["listed", "stray"]);
    }

    #[test]
    fn test_legacy_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("songs.json"),
            r#"{"book_title":"Legacy","songs":[
                {"id":"one","title":"One"},
                {"id":"two","title":"Two","export":"no"}
            ]}"#,
        )
        .unwrap();

        assert!(!uses_per_song_layout(root));
        let (book, songs) = load_songbook(root).unwrap();
        assert_eq!(book.book_title, "Legacy");
        assert_eq!(book.song_order, ["one", "two"]);
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].id, "one");
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("songs.json"),
            r#"{"songs":[{"id":"x","title":"A"},{"id":"x","title":"B"}]}"#,
        )
        .unwrap();
        assert!(load_songbook(root).is_err());
    }
}
