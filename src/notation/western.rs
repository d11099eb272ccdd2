//! Western transliteration
//!
//! Renders a canonical token sequence as a compact human-readable Western
//! string for display (no timing). Ornament and hold syntax is preserved:
//! kan renders as `(grace)main`, meend as `a~b`, hold keeps its `:`.

use lazy_static::lazy_static;
use regex::Regex;

use super::mapping::NotationMapping;
use super::resolver;

lazy_static! {
    static ref RE_MEEND: Regex = Regex::new(r"^(.+)~(.+)$").unwrap();
    static ref RE_KAN: Regex = Regex::new(r"^\(([^)]+)\)(.+)$").unwrap();
}

/// Render one base token as a Western label, or empty when unresolvable.
fn note_label(
    token: &str,
    include_octave: bool,
    default_octave: i32,
    mapping: &NotationMapping,
) -> String {
    match resolver::resolve(token, default_octave, mapping) {
        None => String::new(),
        Some(note) => {
            if include_octave {
                note.western_label
            } else {
                let accidental = match note.alter {
                    -1 => "♭",
                    1 => "#",
                    _ => "",
                };
                format!("{}{}", note.step, accidental)
            }
        }
    }
}

/// Transliterate a token sequence to a Western display string.
///
/// A leading low-octave comma on a token binds *backward*: it is appended
/// to the previous rendered segment when one exists, and kept as a prefix
/// only at the start of the line.
pub fn transliterate_tokens(
    tokens: &[String],
    include_octave: bool,
    default_octave: i32,
    mapping: &NotationMapping,
) -> String {
    let mut out: Vec<String> = Vec::new();

    for token in tokens {
        let mut t = token.trim().to_string();
        if t.is_empty() {
            continue;
        }

        let comma_prefix = t.starts_with(',');
        if comma_prefix {
            t.remove(0);
        }

        let hold = t.ends_with(':');
        if hold {
            t.pop();
        }

        let label = |tok: &str| note_label(tok, include_octave, default_octave, mapping);

        let mut seg = if let Some(caps) = RE_KAN.captures(&t) {
            format!("({}){}", label(&caps[1]), label(&caps[2]))
        } else if let Some(caps) = RE_MEEND.captures(&t) {
            format!("{}~{}", label(&caps[1]), label(&caps[2]))
        } else {
            label(&t)
        };

        if seg.is_empty() {
            continue;
        }
        if hold {
            seg.push(':');
        }

        if comma_prefix {
            match out.last_mut() {
                Some(prev) => {
                    *prev = format!("{},", prev.trim_end());
                }
                None => {
                    seg.insert(0, ',');
                }
            }
        }

        out.push(seg);
    }

    out.join(" ").trim().to_string()
}
