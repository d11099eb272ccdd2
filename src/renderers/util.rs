//! Shared helpers for the render backends.

use std::path::{Path, PathBuf};

/// Escape text for XML/XHTML element content and attributes.
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Lowercase, ASCII-alphanumeric slug with `-` separators.
pub fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_dash = true;
    for c in s.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    let out = out.trim_end_matches('-').to_string();
    if out.is_empty() {
        "song".to_string()
    } else {
        out
    }
}

/// Resolve a relative path inside `base_dir`. Returns None when the
/// path is empty, missing, or escapes the base directory. Image
/// references in song JSON come from hand-edited files and must never
/// read outside the project root.
pub fn safe_path(base_dir: &Path, rel: &str) -> Option<PathBuf> {
    let rel = rel.trim();
    if rel.is_empty() {
        return None;
    }
    let joined = base_dir.join(rel);
    let base = base_dir.canonicalize().ok()?;
    let resolved = joined.canonicalize().ok()?;
    if !resolved.starts_with(&base) {
        return None;
    }
    Some(resolved)
}

/// Guess a media type from a file extension (images only).
pub fn image_media_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "image/png",
    }
}
