// End-to-end checks of the notation core: tokenizing display lines,
// resolving pitches and transliterating to Western labels.

use songbook::notation::{Event, Notation};

fn toks(line: &str) -> Vec<String> {
    Notation::default().tokenize(line)
}

#[test]
fn test_letter_line_tokenizes_directly() {
    assert_eq!(toks("S R G m"), ["S", "R", "G", "m"]);
    assert_eq!(toks("r g d n"), ["r", "g", "d", "n"]);
}

#[test]
fn test_word_line_falls_back_to_word_pass() {
    assert_eq!(toks("Sa Re Ga"), ["S", "R", "G"]);
    assert_eq!(toks("SaGaRe"), ["S", "G", "R"]);
    assert_eq!(toks("Re(k) Ga(k)"), ["r", "g"]);
    assert_eq!(toks("Ma(t) Pa"), ["M", "P"]);
}

#[test]
fn test_octave_markers_survive_tokenizing() {
    assert_eq!(toks("S' N."), ["S'", "N."]);
    assert_eq!(toks(",N S"), [",N", "S"]);
    // Curly apostrophe normalizes to the plain one.
    assert_eq!(toks("S\u{2019}"), ["S'"]);
}

#[test]
fn test_hold_and_ornaments() {
    assert_eq!(toks("G: m"), ["G:", "m"]);
    assert_eq!(toks("G--- m"), ["G:", "m"]);
    assert_eq!(toks("G~m (S)R"), ["G~m", "(S)R"]);
}

#[test]
fn test_unrecognized_fragments_dropped() {
    assert_eq!(toks("S xyz R"), ["S", "R"]);
    assert!(toks("").is_empty());
    assert!(toks("hello world").is_empty());
}

#[test]
fn test_tokenize_idempotent_on_canonical_tokens() {
    for line in ["S R G m M P D N", "r g d n", "S' N. ,P", "G~m (S)R G:"] {
        let first = toks(line);
        let again = toks(&first.join(" "));
        assert_eq!(first, again, "not idempotent for {line}");
    }
}

#[test]
fn test_resolution_to_western_pitches() {
    let notation = Notation::default();

    let sa = notation.resolve("S", 4).unwrap();
    assert_eq!((sa.step.as_str(), sa.alter, sa.octave), ("C", 0, 4));

    let komal_re = notation.resolve("r", 4).unwrap();
    assert_eq!((komal_re.step.as_str(), komal_re.alter), ("D", -1));
    assert_eq!(komal_re.western_label, "D\u{266d}4");

    let tivra_ma = notation.resolve("M", 4).unwrap();
    assert_eq!((tivra_ma.step.as_str(), tivra_ma.alter), ("F", 1));

    let high = notation.resolve("S'", 4).unwrap();
    assert_eq!(high.octave, 5);
    let low_dot = notation.resolve("N.", 4).unwrap();
    assert_eq!(low_dot.octave, 3);
    let low_comma = notation.resolve(",N", 4).unwrap();
    assert_eq!(low_comma.octave, 3);

    assert!(notation.resolve("x", 4).is_none());
}

#[test]
fn test_transliteration() {
    let notation = Notation::default();
    assert_eq!(notation.transliterate("S R G", false, 4), "C D E");
    assert_eq!(notation.transliterate("Sa Re Ga", false, 4), "C D E");
    assert_eq!(notation.transliterate("S R G", true, 4), "C4 D4 E4");
    // Ornament shapes survive the transliteration.
    assert_eq!(notation.transliterate("G~m", false, 4), "E~F");
    assert_eq!(notation.transliterate("(S)R G:", false, 4), "(C)D E:");
    // A comma low-octave marker binds to the preceding note.
    assert_eq!(notation.transliterate("P ,N S", false, 4), "G, B C");
}

#[test]
fn test_event_expansion() {
    let notation = Notation::default();

    let events = notation.compile(&["G~m".to_string()]);
    assert_eq!(
        events,
        vec![
            Event::Note("G".to_string()),
            Event::SlurStart,
            Event::Note("m".to_string()),
            Event::SlurStop,
        ]
    );

    let events = notation.compile(&["(S)R".to_string()]);
    assert_eq!(
        events,
        vec![Event::Grace("S".to_string()), Event::Note("R".to_string())]
    );

    let events = notation.compile(&["G:".to_string()]);
    assert_eq!(events, vec![Event::Hold("G".to_string())]);

    // Kan with a hold keeps both the grace and the lengthened main note.
    let events = notation.compile(&["(S)R:".to_string()]);
    assert_eq!(
        events,
        vec![Event::Grace("S".to_string()), Event::Hold("R".to_string())]
    );
}
