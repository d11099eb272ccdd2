//! Canonicalizes Indian display strings to the word form:
//! `Sa Re Ga Ma Pa Dha Ni`, komal as `Re(k)`, tivra as `Ma(T)`, low octave
//! as a dot suffix. Letter shorthand, ALL-CAPS words, `#` tivra, comma
//! octave prefixes and misordered markers are all rewritten.
//!
//! Display-only: tokens are derived from the notation line at build time,
//! so this never has to touch token data.

use std::collections::HashMap;

use regex::{Captures, Regex};

use crate::notation::mapping::NotationMapping;

/// Rewrites free-form sargam text into the canonical word display form.
#[derive(Debug)]
pub struct DisplayNormalizer {
    oct_low: String,
    acc_komal: String,
    acc_tivra: String,
    // "Re.(k)" -> "Re(k)." for words and bare letters.
    reorder_word: Regex,
    reorder_letter: Regex,
    // M# / MA(T) / Ma# etc, all to the canonical tivra word.
    tivra_rules: Vec<(Regex, String)>,
    komal_inline: Regex,
    komal_inline_words: HashMap<String, String>,
    komal_word_rules: Vec<(Regex, String)>,
    word_canon: Regex,
    canon_words: HashMap<String, String>,
    komal_lower: HashMap<char, String>,
    letter_word: HashMap<char, String>,
    tivra_letters: HashMap<char, String>,
    word_low: Regex,
    acc_komal_case: Regex,
    acc_tivra_case: Regex,
    final_order: Regex,
}

impl DisplayNormalizer {
    pub fn new(mapping: &NotationMapping) -> Self {
        let oct_low = mapping.octave_markers.low.clone();
        let acc_komal = mapping.accidental_markers.komal.clone();
        let acc_tivra = mapping.accidental_markers.tivra.clone();

        let mut words: Vec<String> = mapping.word_to_token.keys().cloned().collect();
        for w in mapping
            .komal_word_to_token
            .keys()
            .chain(mapping.tivra_word_to_token.keys())
        {
            if !words.contains(w) {
                words.push(w.clone());
            }
        }
        words.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let word_alt = words.join("|");

        let mut tivra_rules = Vec::new();
        for (word, tok) in &mapping.tivra_word_to_token {
            let canon = format!("{word}{acc_tivra}");
            tivra_rules.push((
                Regex::new(&format!(r"(?i)\b{word}\((?:t)\)")).unwrap(),
                canon.clone(),
            ));
            tivra_rules.push((
                Regex::new(&format!(r"\b{tok}\((?:T|t)\)")).unwrap(),
                canon.clone(),
            ));
            tivra_rules.push((
                Regex::new(&format!(r"(?i)\b{word}#")).unwrap(),
                canon.clone(),
            ));
            tivra_rules.push((Regex::new(&format!(r"\b{tok}#")).unwrap(), canon));
        }

        // Inline komal letters are the uppercase naturals of the komal words:
        // R(k) G(k) D(k) N(k).
        let mut komal_inline_words = HashMap::new();
        let mut inline_class = String::new();
        let mut komal_word_rules = Vec::new();
        let mut komal_lower = HashMap::new();
        for (word, tok) in &mapping.komal_word_to_token {
            let upper = tok.to_uppercase();
            inline_class.push_str(&upper);
            komal_inline_words.insert(upper, format!("{word}{acc_komal}"));
            komal_word_rules.push((
                Regex::new(&format!(r"(?i)\b{word}\((?:k|K)\)")).unwrap(),
                format!("{word}{acc_komal}"),
            ));
            if let Some(c) = tok.chars().next() {
                komal_lower.insert(c, word.clone());
            }
        }
        let komal_inline = Regex::new(&format!(r"\b([{inline_class}])\((?:k|K)\)")).unwrap();

        let mut canon_words = HashMap::new();
        for w in &words {
            canon_words.insert(w.to_uppercase(), w.clone());
        }
        let word_canon = Regex::new(&format!(r"(?i)\b({word_alt})\b")).unwrap();

        let mut letter_word = HashMap::new();
        for (word, tok) in &mapping.word_to_token {
            if let Some(c) = tok.chars().next() {
                letter_word.insert(c, word.clone());
            }
        }
        let mut tivra_letters = HashMap::new();
        for (word, tok) in &mapping.tivra_word_to_token {
            if let Some(c) = tok.chars().next() {
                tivra_letters.insert(c, word.clone());
            }
        }

        let word_low =
            Regex::new(&format!(r",({word_alt})(\((?:k|K|t|T)\))?")).unwrap();

        Self {
            oct_low,
            acc_komal,
            acc_tivra,
            reorder_word: Regex::new(&format!(
                r"(?i)\b({word_alt})([.'])(\((?:k|K|t|T)\))"
            ))
            .unwrap(),
            reorder_letter: Regex::new(r"([SRGmMPDNrgdn])([.'])(\((?:k|K|t|T)\))").unwrap(),
            tivra_rules,
            komal_inline,
            komal_inline_words,
            komal_word_rules,
            word_canon,
            canon_words,
            komal_lower,
            letter_word,
            tivra_letters,
            word_low,
            acc_komal_case: Regex::new(r"\((?:k|K)\)").unwrap(),
            acc_tivra_case: Regex::new(r"\((?:t|T)\)").unwrap(),
            final_order: Regex::new(&format!(
                r"(?i)\b({word_alt})([.']+)(\((?:k|K|t|T)\))"
            ))
            .unwrap(),
        }
    }

    pub fn normalize(&self, s: &str) -> String {
        if s.is_empty() {
            return String::new();
        }

        let mut out = s.replace('\u{2019}', "'");

        // Octave marker before accidental back to accidental-first.
        out = self.reorder_word.replace_all(&out, "${1}${3}${2}").into_owned();
        out = self
            .reorder_letter
            .replace_all(&out, "${1}${3}${2}")
            .into_owned();

        for (re, repl) in &self.tivra_rules {
            out = re.replace_all(&out, repl.as_str()).into_owned();
        }

        let stripped = out;
        out = self
            .komal_inline
            .replace_all(&stripped, |caps: &Captures| {
                self.komal_inline_words[&caps[1]].clone()
            })
            .into_owned();
        for (re, repl) in &self.komal_word_rules {
            out = re.replace_all(&out, repl.as_str()).into_owned();
        }

        let stripped = out;
        out = self
            .word_canon
            .replace_all(&stripped, |caps: &Captures| {
                self.canon_words[&caps[1].to_uppercase()].clone()
            })
            .into_owned();

        out = self.expand_letters(&out, true);
        out = self.expand_letters(&out, false);

        // Legacy comma-prefix low octave on word tokens: ,Sa -> Sa.
        let stripped = out;
        out = self
            .word_low
            .replace_all(&stripped, |caps: &Captures| {
                let acc = caps.get(2).map_or("", |m| m.as_str());
                format!("{}{}{}", &caps[1], acc, self.oct_low)
            })
            .into_owned();

        out = self
            .acc_komal_case
            .replace_all(&out, self.acc_komal.as_str())
            .into_owned();
        out = self
            .acc_tivra_case
            .replace_all(&out, self.acc_tivra.as_str())
            .into_owned();

        out = self
            .final_order
            .replace_all(&out, "${1}${3}${2}")
            .into_owned();

        out
    }

    /// Expands single-letter notes to their word form. `komal` selects the
    /// lowercase komal pass; otherwise the uppercase naturals (and the tivra
    /// letter) are expanded. A letter only counts as a note when it is not
    /// followed by another lowercase letter, so letters inside words like
    /// "Gum" or already-expanded "Dha" are left alone.
    fn expand_letters(&self, s: &str, komal: bool) -> String {
        let chars: Vec<char> = s.chars().collect();
        let mut out = String::with_capacity(s.len() + 16);
        let mut i = 0;
        while i < chars.len() {
            let comma = chars[i] == ','
                && i + 1 < chars.len()
                && self.is_note(chars[i + 1], komal);
            let j = if comma { i + 1 } else { i };
            if j < chars.len() && self.is_note(chars[j], komal) {
                let oct_start = j + 1;
                let mut k = oct_start;
                if k < chars.len() && chars[k] == '\'' {
                    k += 1;
                    if k < chars.len() && chars[k] == '\'' {
                        k += 1;
                    }
                } else if k < chars.len() && chars[k] == '.' {
                    k += 1;
                }
                // Octave marks are never lowercase, so giving one back is
                // always enough to satisfy the trailing check.
                if k < chars.len() && chars[k].is_ascii_lowercase() && k > oct_start {
                    k -= 1;
                }
                if !(k < chars.len() && chars[k].is_ascii_lowercase()) {
                    let mut octv: String = chars[oct_start..k].iter().collect();
                    if comma {
                        octv = self.oct_low.clone();
                    }
                    out.push_str(&self.expansion(chars[j], komal, &octv));
                    i = k;
                    continue;
                }
            }
            out.push(chars[i]);
            i += 1;
        }
        out
    }

    fn is_note(&self, c: char, komal: bool) -> bool {
        if komal {
            self.komal_lower.contains_key(&c)
        } else {
            self.letter_word.contains_key(&c) || self.tivra_letters.contains_key(&c)
        }
    }

    fn expansion(&self, c: char, komal: bool, octv: &str) -> String {
        if komal {
            format!("{}{}{}", self.komal_lower[&c], self.acc_komal, octv)
        } else if let Some(word) = self.tivra_letters.get(&c) {
            format!("{}{}{}", word, self.acc_tivra, octv)
        } else {
            format!("{}{}", self.letter_word[&c], octv)
        }
    }
}

impl Default for DisplayNormalizer {
    fn default() -> Self {
        Self::new(&NotationMapping::default())
    }
}
