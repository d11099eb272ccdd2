//! Maintenance commands over song JSON files.
//!
//! These operate on `serde_json::Value` rather than the typed models so
//! that keys this tool does not know about survive a rewrite untouched.
//! They target the monolithic `songs.json`, which remains the editing
//! format these cleanups were written for.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Result, SongbookError};
use crate::models::serde_helpers::boolish_value;
use crate::notation::display::DisplayNormalizer;

fn read_value(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn write_value(path: &Path, value: &Value) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}

/// Copy `path` to `<path>.bak` unless a backup already exists. In-place
/// rewrites keep the first pre-rewrite state around.
fn backup_once(path: &Path) -> Result<()> {
    let bak = path.with_extension("json.bak");
    if !bak.exists() {
        fs::copy(path, &bak)?;
    }
    Ok(())
}

fn songs_mut(data: &mut Value) -> Option<&mut Vec<Value>> {
    data.get_mut("songs")?.as_array_mut()
}

fn lines_mut(song: &mut Value) -> Vec<&mut Value> {
    let mut out = Vec::new();
    let Some(sections) = song.get_mut("sections").and_then(Value::as_array_mut) else {
        return out;
    };
    for section in sections {
        if let Some(lines) = section.get_mut("lines").and_then(Value::as_array_mut) {
            out.extend(lines.iter_mut());
        }
    }
    out
}

/// Ensure every song has an explicit boolean `export` key. Existing
/// values are coerced to bool, never flipped. Returns the number of
/// songs updated; the file is rewritten only when something changed.
pub fn normalize_export_flags(json_path: &Path) -> Result<usize> {
    let mut data = read_value(json_path)?;
    let mut changed = 0;

    if let Some(songs) = songs_mut(&mut data) {
        for song in songs.iter_mut() {
            let Some(obj) = song.as_object_mut() else {
                continue;
            };
            match obj.get("export") {
                None => {
                    obj.insert("export".to_string(), Value::Bool(true));
                    changed += 1;
                }
                Some(v) => {
                    let b = boolish_value(Some(v), true);
                    if *v != Value::Bool(b) {
                        obj.insert("export".to_string(), Value::Bool(b));
                        changed += 1;
                    }
                }
            }
        }
    }

    if changed > 0 {
        write_value(json_path, &data)?;
    }
    Ok(changed)
}

/// Canonicalize every `indian` display line. The file is rewritten in
/// place behind a one-time `.bak` backup, and only when something
/// changed. Returns the number of lines rewritten.
pub fn normalize_notation(json_path: &Path, normalizer: &DisplayNormalizer) -> Result<usize> {
    let mut data = read_value(json_path)?;
    let mut changed = 0;

    if let Some(songs) = songs_mut(&mut data) {
        for song in songs.iter_mut() {
            for line in lines_mut(song) {
                let Some(indian) = line.get("indian").and_then(Value::as_str) else {
                    continue;
                };
                let normalized = normalizer.normalize(indian);
                if normalized != indian {
                    line["indian"] = Value::String(normalized);
                    changed += 1;
                }
            }
        }
    }

    if changed > 0 {
        backup_once(json_path)?;
        write_value(json_path, &data)?;
    }
    Ok(changed)
}

/// Strip the derived `western` and `tokens` fields from every line. Both
/// are recomputed from the `indian` line at build time, so the source
/// file keeps a single source of truth. Returns keys removed.
pub fn minimize(data: &mut Value) -> usize {
    let mut removed = 0;
    let Some(songs) = songs_mut(data) else {
        return 0;
    };
    for song in songs.iter_mut() {
        for line in lines_mut(song) {
            let Some(obj) = line.as_object_mut() else {
                continue;
            };
            if obj.remove("western").is_some() {
                removed += 1;
            }
            if obj.remove("tokens").is_some() {
                removed += 1;
            }
        }
    }
    removed
}

/// Minimize a file. With `in_place` the input is overwritten after a
/// one-time `.bak` copy; otherwise the result goes to `out`.
pub fn minimize_file(json_path: &Path, out: &Path, in_place: bool) -> Result<(PathBuf, usize)> {
    let mut data = read_value(json_path)?;
    let removed = minimize(&mut data);

    let target = if in_place {
        backup_once(json_path)?;
        json_path.to_path_buf()
    } else {
        out.to_path_buf()
    };
    write_value(&target, &data)?;
    Ok((target, removed))
}

/// One-time migration: split a monolithic `songs.json` into `book.json`
/// plus `songs/<id>.json`, preserving the song order.
pub fn split(json_path: &Path) -> Result<usize> {
    let root = json_path
        .parent()
        .ok_or_else(|| SongbookError::Invalid("songs.json has no parent directory".into()))?;
    let data = read_value(json_path)?;

    let songs = data
        .get("songs")
        .and_then(Value::as_array)
        .ok_or_else(|| SongbookError::Invalid("songs.json: 'songs' must be a list".into()))?;

    let songs_dir = root.join("songs");
    fs::create_dir_all(&songs_dir)?;

    let mut song_order = Vec::new();
    for song in songs {
        let id = song
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| song.get("id").map(|v| v.to_string()))
            .filter(|s| !s.is_empty() && s.as_str() != "null")
            .ok_or_else(|| {
                let title = song
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or("<unknown>");
                SongbookError::Invalid(format!("song missing 'id': {title}"))
            })?;
        write_value(&songs_dir.join(format!("{id}.json")), song)?;
        song_order.push(Value::String(id));
    }

    let book = serde_json::json!({
        "book_title": data.get("book_title").cloned()
            .unwrap_or_else(|| Value::String("My Songbook".into())),
        "book_meta": data.get("book_meta").cloned().unwrap_or_else(|| Value::Object(Default::default())),
        "song_order": song_order,
    });
    write_value(&root.join("book.json"), &book)?;
    Ok(songs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_export_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songs.json");
        fs::write(
            &path,
            r#"{"songs":[{"id":"a"},{"id":"b","export":"no"},{"id":"c","export":true}]}"#,
        )
        .unwrap();

        assert_eq!(normalize_export_flags(&path).unwrap(), 2);
        let data: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(data["songs"][0]["export"], json!(true));
        assert_eq!(data["songs"][1]["export"], json!(false));
        assert_eq!(data["songs"][2]["export"], json!(true));

        // Second run is a no-op.
        assert_eq!(normalize_export_flags(&path).unwrap(), 0);
    }

    #[test]
    fn test_minimize_strips_derived_fields() {
        let mut data = json!({"songs":[{"id":"a","sections":[{"lines":[
            {"lyrics":"la","indian":"S","western":"C","tokens":["S"]},
            {"lyrics":"li","indian":"R"}
        ]}]}]});
        assert_eq!(minimize(&mut data), 2);
        let line = &data["songs"][0]["sections"][0]["lines"][0];
        assert!(line.get("western").is_none());
        assert!(line.get("tokens").is_none());
        assert_eq!(line["lyrics"], json!("la"));
    }

    #[test]
    fn test_minimize_in_place_writes_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songs.json");
        fs::write(
            &path,
            r#"{"songs":[{"id":"a","sections":[{"lines":[{"indian":"S","western":"C"}]}]}]}"#,
        )
        .unwrap();

        let (target, removed) = minimize_file(&path, &path, true).unwrap();
        assert_eq!(target, path);
        assert_eq!(removed, 1);
        assert!(dir.path().join("songs.json.bak").exists());
    }

    #[test]
    fn test_split_creates_per_song_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songs.json");
        fs::write(
            &path,
            r#"{"book_title":"B","songs":[{"id":"one","title":"One"},{"id":"two","title":"Two"}]}"#,
        )
        .unwrap();

        assert_eq!(split(&path).unwrap(), 2);
        assert!(dir.path().join("book.json").exists());
        assert!(dir.path().join("songs/one.json").exists());
        assert!(dir.path().join("songs/two.json").exists());

        let book: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("book.json")).unwrap())
                .unwrap();
        assert_eq!(book["song_order"], json!(["one", "two"]));
    }

    #[test]
    fn test_normalize_notation_rewrites_indian_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songs.json");
        fs::write(
            &path,
            r#"{"songs":[{"id":"a","sections":[{"lines":[{"indian":"S r M#"}]}]}]}"#,
        )
        .unwrap();

        let normalizer = DisplayNormalizer::default();
        assert_eq!(normalize_notation(&path, &normalizer).unwrap(), 1);
        let data: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            data["songs"][0]["sections"][0]["lines"][0]["indian"],
            json!("Sa Re(k) Ma(T)")
        );

        // The first rewrite keeps the original next to the file.
        let bak = dir.path().join("songs.json.bak");
        assert!(bak.exists());
        let original: Value =
            serde_json::from_str(&fs::read_to_string(&bak).unwrap()).unwrap();
        assert_eq!(
            original["songs"][0]["sections"][0]["lines"][0]["indian"],
            json!("S r M#")
        );

        // A second run changes nothing and leaves the backup alone.
        assert_eq!(normalize_notation(&path, &normalizer).unwrap(), 0);
    }
}
