//! Notation core: tokenizer, resolver, transliterator and event expansion
//!
//! The mapping table is loaded once and injected here; every operation is a
//! pure function of its inputs plus that immutable table, so batch callers
//! can process songs in parallel without any shared mutable state.

pub mod display;
pub mod events;
pub mod mapping;
pub mod resolver;
pub mod tokenizer;
pub mod western;
pub mod words;

pub use events::{Event, MeasureClock};
pub use mapping::{NotationMapping, StepAlter};
pub use resolver::ResolvedNote;

use tokenizer::LetterPass;
use words::WordPass;

/// The notation engine: one mapping table plus the pattern passes compiled
/// from it. Immutable after construction.
#[derive(Debug)]
pub struct Notation {
    mapping: NotationMapping,
    letters: LetterPass,
    words: WordPass,
}

impl Notation {
    pub fn new(mapping: NotationMapping) -> Self {
        let letters = LetterPass::new(&mapping);
        let words = WordPass::new(&mapping);
        Self {
            mapping,
            letters,
            words,
        }
    }

    pub fn mapping(&self) -> &NotationMapping {
        &self.mapping
    }

    /// Tokenize a notation line in either letter or word style.
    ///
    /// Two passes: try the letter tokenizer first; when it recognizes
    /// nothing, rewrite word-style names to letters and retokenize. The
    /// caller never declares which style a line uses.
    pub fn tokenize(&self, line: &str) -> Vec<String> {
        let tokens = self.letters.tokenize(line);
        if !tokens.is_empty() {
            return tokens;
        }
        self.letters.tokenize(&self.words.apply(line))
    }

    /// Resolve one canonical token to a Western pitch.
    pub fn resolve(&self, token: &str, default_octave: i32) -> Option<ResolvedNote> {
        resolver::resolve(token, default_octave, &self.mapping)
    }

    /// Render a notation line as a compact Western display string.
    pub fn transliterate(
        &self,
        line: &str,
        include_octave: bool,
        default_octave: i32,
    ) -> String {
        let tokens = self.tokenize(line);
        western::transliterate_tokens(&tokens, include_octave, default_octave, &self.mapping)
    }

    /// Expand a token sequence into timed musical events.
    pub fn compile(&self, tokens: &[String]) -> Vec<Event> {
        events::compile(tokens)
    }
}

impl Default for Notation {
    fn default() -> Self {
        Self::new(NotationMapping::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_style_fallback() {
        let notation = Notation::default();
        assert_eq!(notation.tokenize("Sa Re Ga"), vec!["S", "R", "G"]);
        assert_eq!(notation.tokenize("SaGaRe"), vec!["S", "G", "R"]);
        assert_eq!(notation.tokenize("Re(k) Ga(k)"), vec!["r", "g"]);
    }

    #[test]
    fn test_letter_style_skips_word_pass() {
        let notation = Notation::default();
        assert_eq!(notation.tokenize("S R G m"), vec!["S", "R", "G", "m"]);
    }

    #[test]
    fn test_transliterate_word_line() {
        let notation = Notation::default();
        assert_eq!(notation.transliterate("Sa Re Ga", false, 4), "C D E");
    }

    #[test]
    fn test_empty_line() {
        let notation = Notation::default();
        assert!(notation.tokenize("").is_empty());
        assert_eq!(notation.transliterate("", false, 4), "");
    }
}
