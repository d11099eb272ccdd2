//! Note resolver
//!
//! Maps a single canonical token to a resolved Western pitch using the
//! mapping table. Unknown base letters resolve to `None` rather than an
//! error: malformed input is expected and must not abort a batch.

use lazy_static::lazy_static;
use regex::Regex;

use super::mapping::NotationMapping;

lazy_static! {
    static ref RE_KOMAL_INLINE: Regex = Regex::new(r"^([A-Z])\((?:k|K)\)$").unwrap();
}

/// A token resolved to a concrete pitch, plus the display labels the
/// MusicXML lyric lines carry. Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNote {
    /// Step letter A-G
    pub step: String,
    /// -1 flat, 0 natural, 1 sharp
    pub alter: i8,
    /// Absolute octave number
    pub octave: i32,
    /// The token as authored (curly apostrophe normalized)
    pub indian_label: String,
    /// Compact Western label, e.g. `D♭4`
    pub western_label: String,
}

/// Resolve one canonical token against the mapping table.
///
/// Octave arithmetic: high marker -> `default_octave + 1`, low marker ->
/// `default_octave - 1`. The markers are mutually exclusive in canonical
/// form; if both somehow appear, low wins (it is checked first).
pub fn resolve(
    token: &str,
    default_octave: i32,
    mapping: &NotationMapping,
) -> Option<ResolvedNote> {
    let raw = token.trim();
    if raw.is_empty() {
        return None;
    }

    let mut t = raw.replace('’', "'");
    let indian_label = t.clone();

    let mut low = false;
    if t.starts_with(',') {
        low = true;
        t.remove(0);
    }

    let mut high = false;
    if t.ends_with('\'') {
        high = true;
        t.pop();
    } else if t.ends_with('.') {
        low = true;
        t.pop();
    }

    // Inline komal forms like D(k) normally never reach here (the tokenizer
    // lowers them), but tokens supplied directly in song data might.
    if RE_KOMAL_INLINE.is_match(&t) {
        let inline = mapping.inline_komal();
        if let Some(komal) = t.chars().next().and_then(|c| inline.get(&c)) {
            t = komal.clone();
        }
    }

    let pitch = mapping.western(&t)?;

    let octave = if low {
        default_octave - 1
    } else if high {
        default_octave + 1
    } else {
        default_octave
    };

    let accidental = match pitch.alter {
        -1 => "♭",
        1 => "#",
        _ => "",
    };
    let western_label = format!("{}{}{}", pitch.step, accidental, octave);

    Some(ResolvedNote {
        step: pitch.step.clone(),
        alter: pitch.alter,
        octave,
        indian_label,
        western_label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m() -> NotationMapping {
        NotationMapping::default()
    }

    #[test]
    fn test_plain_note() {
        let n = resolve("S", 4, &m()).unwrap();
        assert_eq!(n.step, "C");
        assert_eq!(n.alter, 0);
        assert_eq!(n.octave, 4);
        assert_eq!(n.western_label, "C4");
    }

    #[test]
    fn test_octave_markers() {
        assert_eq!(resolve("S'", 4, &m()).unwrap().octave, 5);
        assert_eq!(resolve("S.", 4, &m()).unwrap().octave, 3);
        assert_eq!(resolve(",S", 4, &m()).unwrap().octave, 3);
    }

    #[test]
    fn test_low_takes_precedence_over_high() {
        // Canonical tokens never carry both markers; when both appear the
        // comma is consumed first and wins.
        assert_eq!(resolve(",S'", 4, &m()).unwrap().octave, 3);
    }

    #[test]
    fn test_komal_labels() {
        let n = resolve("r", 4, &m()).unwrap();
        assert_eq!(n.step, "D");
        assert_eq!(n.alter, -1);
        assert_eq!(n.western_label, "D♭4");
    }

    #[test]
    fn test_tivra_ma() {
        let n = resolve("M", 4, &m()).unwrap();
        assert_eq!((n.step.as_str(), n.alter), ("F", 1));
        assert_eq!(n.western_label, "F#4");
    }

    #[test]
    fn test_inline_komal_token() {
        let n = resolve("D(k)", 4, &m()).unwrap();
        assert_eq!((n.step.as_str(), n.alter), ("A", -1));
    }

    #[test]
    fn test_unknown_token_is_none() {
        assert!(resolve("X", 4, &m()).is_none());
        assert!(resolve("", 4, &m()).is_none());
    }

    #[test]
    fn test_curly_apostrophe() {
        let n = resolve("S’", 4, &m()).unwrap();
        assert_eq!(n.octave, 5);
        assert_eq!(n.indian_label, "S'");
    }
}
