//! Notation mapping table
//!
//! Static configuration mapping swara letters to Western step/alter pairs,
//! octave markers and accidental markers. Loaded once at process start from
//! `notation_mapping.json` and immutable thereafter; a built-in default
//! (Sa=C major scale, komal flats on Re/Ga/Dha/Ni, tivra Ma=F#) is used
//! when the file is missing or unreadable.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Western step letter plus alteration for one canonical token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StepAlter {
    /// Step letter A-G
    pub step: String,
    /// Alteration: -1 flat, 0 natural, 1 sharp
    #[serde(default)]
    pub alter: i8,
}

impl StepAlter {
    fn new(step: &str, alter: i8) -> Self {
        Self {
            step: step.to_string(),
            alter,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OctaveMarkers {
    #[serde(default = "default_low_marker")]
    pub low: String,
    #[serde(default)]
    pub middle: String,
    #[serde(default = "default_high_marker")]
    pub high: String,
}

impl Default for OctaveMarkers {
    fn default() -> Self {
        Self {
            low: default_low_marker(),
            middle: String::new(),
            high: default_high_marker(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccidentalMarkers {
    #[serde(default = "default_komal_marker")]
    pub komal: String,
    #[serde(default = "default_tivra_marker")]
    pub tivra: String,
}

impl Default for AccidentalMarkers {
    fn default() -> Self {
        Self {
            komal: default_komal_marker(),
            tivra: default_tivra_marker(),
        }
    }
}

fn default_low_marker() -> String {
    ".".to_string()
}

fn default_high_marker() -> String {
    "'".to_string()
}

fn default_komal_marker() -> String {
    "(k)".to_string()
}

fn default_tivra_marker() -> String {
    "(T)".to_string()
}

fn default_word_to_token() -> HashMap<String, String> {
    to_map(&[
        ("Sa", "S"),
        ("Re", "R"),
        ("Ga", "G"),
        ("Ma", "m"),
        ("Pa", "P"),
        ("Dha", "D"),
        ("Ni", "N"),
    ])
}

fn default_komal_word_to_token() -> HashMap<String, String> {
    to_map(&[("Re", "r"), ("Ga", "g"), ("Dha", "d"), ("Ni", "n")])
}

fn default_tivra_word_to_token() -> HashMap<String, String> {
    to_map(&[("Ma", "M")])
}

fn default_token_to_western() -> HashMap<String, StepAlter> {
    [
        ("S", StepAlter::new("C", 0)),
        ("R", StepAlter::new("D", 0)),
        ("G", StepAlter::new("E", 0)),
        ("m", StepAlter::new("F", 0)),
        ("M", StepAlter::new("F", 1)),
        ("P", StepAlter::new("G", 0)),
        ("D", StepAlter::new("A", 0)),
        ("N", StepAlter::new("B", 0)),
        ("r", StepAlter::new("D", -1)),
        ("g", StepAlter::new("E", -1)),
        ("d", StepAlter::new("A", -1)),
        ("n", StepAlter::new("B", -1)),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.clone()))
    .collect()
}

fn to_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// The complete notation mapping table.
///
/// Every key in `token_to_western` is a single case-sensitive letter;
/// uppercase denotes natural/tivra variants and lowercase komal variants
/// by convention of the table (not enforced structurally).
#[derive(Debug, Clone, Deserialize)]
pub struct NotationMapping {
    #[serde(default)]
    pub octave_markers: OctaveMarkers,
    #[serde(default)]
    pub accidental_markers: AccidentalMarkers,
    /// Word-form swara name -> canonical token letter (Sa -> S)
    #[serde(default = "default_word_to_token")]
    pub word_to_token: HashMap<String, String>,
    /// Word-form swara name -> komal (flat) token letter (Re -> r)
    #[serde(default = "default_komal_word_to_token")]
    pub komal_word_to_token: HashMap<String, String>,
    /// Word-form swara name -> tivra (sharp) token letter (Ma -> M)
    #[serde(default = "default_tivra_word_to_token")]
    pub tivra_word_to_token: HashMap<String, String>,
    /// Canonical token letter -> Western step/alter
    #[serde(default = "default_token_to_western")]
    pub token_to_western: HashMap<String, StepAlter>,
}

impl Default for NotationMapping {
    fn default() -> Self {
        Self {
            octave_markers: OctaveMarkers::default(),
            accidental_markers: AccidentalMarkers::default(),
            word_to_token: default_word_to_token(),
            komal_word_to_token: default_komal_word_to_token(),
            tivra_word_to_token: default_tivra_word_to_token(),
            token_to_western: default_token_to_western(),
        }
    }
}

impl NotationMapping {
    /// Load `notation_mapping.json` from `dir`, falling back to the
    /// built-in default table when the file is missing or unreadable.
    pub fn load_or_default(dir: &Path) -> Self {
        let path = dir.join("notation_mapping.json");
        match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(mapping) => mapping,
                Err(e) => {
                    log::warn!("unreadable {}: {}; using built-in mapping", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Look up the Western step/alter pair for a base token letter.
    pub fn western(&self, base: &str) -> Option<&StepAlter> {
        self.token_to_western.get(base)
    }

    /// All base token letters, as a character set for pattern building.
    pub fn base_letters(&self) -> Vec<char> {
        let mut letters: Vec<char> = self
            .token_to_western
            .keys()
            .filter_map(|k| {
                let mut chars = k.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            })
            .collect();
        letters.sort_unstable();
        letters.dedup();
        letters
    }

    /// Uppercase letter -> komal token, for inline `(k)` forms like `D(k)`.
    ///
    /// Derived by joining `word_to_token` with `komal_word_to_token` on the
    /// word name: Re -> (R, r), so `R(k)` normalizes to `r`.
    pub fn inline_komal(&self) -> HashMap<char, String> {
        let mut out = HashMap::new();
        for (word, komal_tok) in &self.komal_word_to_token {
            if let Some(natural) = self.word_to_token.get(word) {
                if let Some(c) = single_char(natural) {
                    out.insert(c, komal_tok.clone());
                }
            }
        }
        out
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping_sa_is_c() {
        let mapping = NotationMapping::default();
        let sa = mapping.western("S").unwrap();
        assert_eq!(sa.step, "C");
        assert_eq!(sa.alter, 0);
    }

    #[test]
    fn test_default_mapping_komal_and_tivra() {
        let mapping = NotationMapping::default();
        assert_eq!(mapping.western("r").unwrap(), &StepAlter::new("D", -1));
        assert_eq!(mapping.western("M").unwrap(), &StepAlter::new("F", 1));
        assert!(mapping.western("X").is_none());
    }

    #[test]
    fn test_partial_json_falls_back_per_key() {
        // Missing keys take built-in defaults rather than failing.
        let mapping: NotationMapping =
            serde_json::from_str(r#"{"octave_markers": {"low": "_", "high": "^"}}"#).unwrap();
        assert_eq!(mapping.octave_markers.low, "_");
        assert_eq!(mapping.octave_markers.high, "^");
        assert_eq!(mapping.accidental_markers.komal, "(k)");
        assert_eq!(mapping.western("P").unwrap().step, "G");
    }

    #[test]
    fn test_inline_komal_joins_word_tables() {
        let mapping = NotationMapping::default();
        let inline = mapping.inline_komal();
        assert_eq!(inline.get(&'R').map(String::as_str), Some("r"));
        assert_eq!(inline.get(&'G').map(String::as_str), Some("g"));
        assert_eq!(inline.get(&'D').map(String::as_str), Some("d"));
        assert_eq!(inline.get(&'N').map(String::as_str), Some("n"));
        assert!(inline.get(&'S').is_none());
    }

    #[test]
    fn test_base_letters() {
        let mapping = NotationMapping::default();
        let letters = mapping.base_letters();
        for c in "SRGmMPDNrgdn".chars() {
            assert!(letters.contains(&c), "missing base letter {}", c);
        }
        assert_eq!(letters.len(), 12);
    }
}
