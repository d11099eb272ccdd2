//! Letter-style notation tokenizer
//!
//! Converts a letter-style notation line (`S R G m M P D N`, lowercase
//! `r g d n` for komal) into canonical tokens. Word-style input is handled
//! by the separate word-to-letter pass in [`super::words`]; the two passes
//! are composed in [`super::Notation::tokenize`].
//!
//! Unparseable fragments are dropped silently: the input is hand-authored
//! and partial recovery beats all-or-nothing failure.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use super::mapping::NotationMapping;

lazy_static! {
    static ref RE_WS: Regex = Regex::new(r"\s+").unwrap();
    static ref RE_TRAILING_DASHES: Regex = Regex::new(r"--+$").unwrap();
    static ref RE_TRAILING_DOTS: Regex = Regex::new(r"\.{3,}$").unwrap();
}

/// Compiled letter-pass patterns for one mapping table.
#[derive(Debug)]
pub struct LetterPass {
    /// `,S` / `S'` / `S.` / `S:` and combinations
    note_simple: Regex,
    /// `A~B`
    meend: Regex,
    /// `(A)B` with optional octave mark on the main note
    kan: Regex,
    /// `D(k)` style inline komal
    komal_inline: Regex,
    /// Uppercase letter -> komal token for inline forms
    inline_komal: HashMap<char, String>,
}

impl LetterPass {
    pub fn new(mapping: &NotationMapping) -> Self {
        let letters: String = mapping.base_letters().iter().collect();
        let inline_komal = mapping.inline_komal();
        let inline_letters: String = {
            let mut cs: Vec<char> = inline_komal.keys().copied().collect();
            cs.sort_unstable();
            cs.into_iter().collect()
        };

        // The letter sets come from the mapping table and are plain ASCII
        // letters, so they can be interpolated into character classes as-is.
        let note_simple = Regex::new(&format!(r"^,?[{letters}](?:['’.])?:?$")).unwrap();
        let meend = Regex::new(&format!(r"^([{letters}])~([{letters}])$")).unwrap();
        let kan = Regex::new(&format!(r"^\(([{letters}])\)([{letters}])(['’.])?$")).unwrap();
        let komal_inline = Regex::new(&format!(r"^([{inline_letters}])\((?:k|K)\)$")).unwrap();

        Self {
            note_simple,
            meend,
            kan,
            komal_inline,
            inline_komal,
        }
    }

    /// Tokenize a letter-style line. Returns an empty vector when nothing
    /// in the line parses as letter notation (the signal for the caller to
    /// try the word-to-letter fallback).
    pub fn tokenize(&self, line: &str) -> Vec<String> {
        let s = line.trim();
        if s.is_empty() {
            return Vec::new();
        }

        // Normalize run delimiters into whitespace or a hold marker.
        let s = s.replace('|', " ").replace('…', " ... ");
        let s = RE_WS.replace_all(&s, " ");

        let mut out = Vec::new();
        for part in s.split(' ') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            // Hold patterns like "G...", "G---", "G:" normalize to ":".
            let mut p = part.to_string();
            let mut hold = "";
            if p.contains("...")
                || RE_TRAILING_DASHES.is_match(&p)
                || RE_TRAILING_DOTS.is_match(&p)
                || p.ends_with(':')
            {
                hold = ":";
                if let Some(stripped) = p.strip_suffix(':') {
                    p = stripped.to_string();
                }
                p = RE_TRAILING_DASHES.replace(&p, "").into_owned();
                p = RE_TRAILING_DOTS.replace(&p, "").into_owned();
                p = p.replace("...", "");
                p = p.trim().to_string();
            }

            if let Some(caps) = self.kan.captures(&p) {
                let main = format!("{}{}", &caps[2], caps.get(3).map_or("", |m| m.as_str()));
                out.push(format!(
                    "({}){}",
                    self.norm_note(&caps[1]),
                    self.norm_note(&main)
                ));
                continue;
            }

            if let Some(caps) = self.meend.captures(&p) {
                out.push(format!(
                    "{}~{}",
                    self.norm_note(&caps[1]),
                    self.norm_note(&caps[2])
                ));
                continue;
            }

            if self.komal_inline.is_match(&p) || self.note_simple.is_match(&p) {
                out.push(format!("{}{}", self.norm_note(&p), hold));
                continue;
            }

            log::debug!("dropping unparseable fragment {:?}", part);
        }

        out
    }

    /// Normalize one note fragment: curly apostrophe, comma prefix, octave
    /// suffix and inline komal. The comma prefix survives into the canonical
    /// token; the resolver and transliterator treat it as the low marker.
    fn norm_note(&self, tok: &str) -> String {
        let mut t = tok.trim().replace('’', "'");

        let low = t.starts_with(',');
        if low {
            t.remove(0);
        }

        let mut octave = "";
        if t.ends_with('\'') {
            octave = "'";
            t.pop();
        } else if t.ends_with('.') {
            octave = ".";
            t.pop();
        }

        let stripped = t.clone();
        if let Some(caps) = self.komal_inline.captures(&stripped) {
            if let Some(komal) = caps[1]
                .chars()
                .next()
                .and_then(|c| self.inline_komal.get(&c))
            {
                t = komal.clone();
            }
        }
        t = t.replace("(k)", "").replace("(K)", "");

        if low {
            format!(",{}{}", t, octave)
        } else {
            format!("{}{}", t, octave)
        }
    }
}
