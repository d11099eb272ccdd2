//! Word-to-letter notation pass
//!
//! Converts display-style word notation (`Sa Re Ga Ma Pa Dha Ni`, with
//! inline accidental suffixes `(k)` / `(T)`, possibly concatenated like
//! `SaGaRe`) into letter-token notation that the letter-pass tokenizer
//! accepts. This is the fallback half of the two-pass tokenizer: it only
//! runs when the letter pass recognized nothing in a line.
//!
//! All patterns are derived from the mapping table, longest name first so
//! `Dha` never loses its tail to a shorter match.

use regex::Regex;
use std::collections::HashMap;

use super::mapping::NotationMapping;

/// Compiled word-pass rules for one mapping table.
#[derive(Debug)]
pub struct WordPass {
    /// `Re.(k)` -> `Re(k).` (octave mark before accidental, word forms)
    reorder_words: Regex,
    /// `R.(k)` -> `R(k).` (letter forms)
    reorder_letters: Regex,
    /// Tivra forms: `Ma(T)`, `Ma#`, `M(T)`, `M#` -> `M`
    tivra_rules: Vec<(Regex, String)>,
    /// Komal word forms: `Re(k)` -> `r`
    komal_word_rules: Vec<(Regex, String)>,
    /// Komal inline letter forms: `R(k)` -> `r`
    komal_inline: Regex,
    inline_komal: HashMap<char, String>,
    /// Plain word -> letter, longest name first, case-insensitive
    word_rules: Vec<(Regex, String)>,
    /// Base letters, for separating concatenated notes
    note_letters: Vec<char>,
}

impl WordPass {
    pub fn new(mapping: &NotationMapping) -> Self {
        let mut words: Vec<&String> = mapping.word_to_token.keys().collect();
        words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let word_alt: String = words
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|");

        let letters: String = mapping.base_letters().iter().collect();
        let inline_komal = mapping.inline_komal();
        let inline_letters: String = {
            let mut cs: Vec<char> = inline_komal.keys().copied().collect();
            cs.sort_unstable();
            cs.into_iter().collect()
        };

        let reorder_words = Regex::new(&format!(
            r"(?i)\b({word_alt})([.'])(\((?:k|t)\))"
        ))
        .unwrap();
        let reorder_letters = Regex::new(&format!(
            r"([{letters}])([.'])(\((?:k|K|t|T)\))"
        ))
        .unwrap();

        let mut tivra_rules = Vec::new();
        for (word, tok) in &mapping.tivra_word_to_token {
            let w = regex::escape(word);
            let t = regex::escape(tok);
            tivra_rules.push((Regex::new(&format!(r"(?i){w}\(t\)")).unwrap(), tok.clone()));
            tivra_rules.push((Regex::new(&format!(r"(?i)\b{w}#")).unwrap(), tok.clone()));
            tivra_rules.push((Regex::new(&format!(r"\b{t}\((?:T|t)\)")).unwrap(), tok.clone()));
            tivra_rules.push((Regex::new(&format!(r"\b{t}#")).unwrap(), tok.clone()));
        }

        let mut komal_word_rules = Vec::new();
        for (word, tok) in &mapping.komal_word_to_token {
            let w = regex::escape(word);
            komal_word_rules.push((Regex::new(&format!(r"(?i){w}\(k\)")).unwrap(), tok.clone()));
        }

        let komal_inline =
            Regex::new(&format!(r"([{inline_letters}])\((?:k|K)\)")).unwrap();

        let word_rules = words
            .iter()
            .filter_map(|w| {
                let tok = mapping.word_to_token.get(*w)?;
                let pattern = Regex::new(&format!("(?i){}", regex::escape(w))).ok()?;
                Some((pattern, tok.clone()))
            })
            .collect();

        Self {
            reorder_words,
            reorder_letters,
            tivra_rules,
            komal_word_rules,
            komal_inline,
            inline_komal,
            word_rules,
            note_letters: mapping.base_letters(),
        }
    }

    /// Apply the full word-to-letter rewrite to a line.
    pub fn apply(&self, line: &str) -> String {
        let s = line.trim();
        if s.is_empty() {
            return String::new();
        }

        let mut s = s.replace('’', "'");

        // Accept display ordering where the octave marker precedes (k)/(T).
        s = self.reorder_words.replace_all(&s, "${1}${3}${2}").into_owned();
        s = self.reorder_letters.replace_all(&s, "${1}${3}${2}").into_owned();

        for (re, rep) in &self.tivra_rules {
            s = re.replace_all(&s, rep.as_str()).into_owned();
        }
        for (re, rep) in &self.komal_word_rules {
            s = re.replace_all(&s, rep.as_str()).into_owned();
        }

        let inline = &self.inline_komal;
        s = self
            .komal_inline
            .replace_all(&s, |caps: &regex::Captures| {
                let c = caps[1].chars().next().unwrap_or_default();
                inline
                    .get(&c)
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned();

        for (re, rep) in &self.word_rules {
            s = re.replace_all(&s, rep.as_str()).into_owned();
        }

        let s = self.separate_notes(&s);
        let s = s.split_whitespace().collect::<Vec<_>>().join(" ");
        s
    }

    /// Insert spaces between adjacent note letters so concatenated word
    /// forms like `SaGaRe` (now `SGR`) re-tokenize correctly. An octave
    /// mark stays attached to its note: `S'G` -> `S' G`.
    fn separate_notes(&self, s: &str) -> String {
        let chars: Vec<char> = s.chars().collect();
        let is_note = |c: char| self.note_letters.contains(&c);

        let mut out = String::with_capacity(s.len() + 8);
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            out.push(c);
            if is_note(c) {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '\'' || chars[j] == '.') {
                    out.push(chars[j]);
                    j += 1;
                }
                if j < chars.len() && is_note(chars[j]) {
                    out.push(' ');
                }
                i = j;
            } else {
                i += 1;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass() -> WordPass {
        WordPass::new(&NotationMapping::default())
    }

    #[test]
    fn test_plain_words() {
        assert_eq!(pass().apply("Sa Re Ga"), "S R G");
        assert_eq!(pass().apply("Ni Sa DhaDhaGa Dha Pa"), "N S D D G D P");
    }

    #[test]
    fn test_concatenated_words() {
        assert_eq!(pass().apply("SaGaRe"), "S G R");
    }

    #[test]
    fn test_komal_and_tivra_forms() {
        assert_eq!(pass().apply("Re(k) Ga(k)"), "r g");
        assert_eq!(pass().apply("Ma(T)"), "M");
        assert_eq!(pass().apply("Ma#"), "M");
        assert_eq!(pass().apply("M#"), "M");
    }

    #[test]
    fn test_octave_before_accidental_is_reordered() {
        assert_eq!(pass().apply("Re'(k)"), "r'");
        assert_eq!(pass().apply("Re.(k)"), "r.");
        assert_eq!(pass().apply("Ma'(T)"), "M'");
    }

    #[test]
    fn test_meend_and_comma_preserved() {
        assert_eq!(
            pass().apply("Pa Pa ,PaNiSaGa Re ,Pa Ni SaGaRe~Sa"),
            "P P ,P N S G R ,P N S G R~S"
        );
    }

    #[test]
    fn test_hold_marker_preserved() {
        assert_eq!(pass().apply("Pa Ni Re Sa: Sa:"), "P N R S: S:");
    }

    #[test]
    fn test_case_insensitive_words() {
        assert_eq!(pass().apply("SA RE ga"), "S R G");
    }
}
