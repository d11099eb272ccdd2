//! Musical event expansion
//!
//! Expands a canonical token sequence into a linear event sequence for the
//! MusicXML writer. Ordering is significant: slur events bracket the two
//! notes of a meend, and a grace always immediately precedes its main note.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_MEEND: Regex = Regex::new(r"^(.+)~(.+)$").unwrap();
    static ref RE_KAN: Regex = Regex::new(r"^\(([^)]+)\)(.+)$").unwrap();
}

/// One musical event. `Note` and `Grace` carry the source token; `Hold`
/// carries the token with its hold marker already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Plain note, one duration unit
    Note(String),
    /// Grace note, zero duration units
    Grace(String),
    SlurStart,
    SlurStop,
    /// Held note, two duration units
    Hold(String),
}

impl Event {
    /// Duration in units; slur boundaries and graces consume none.
    pub fn duration_units(&self) -> u32 {
        match self {
            Event::Note(_) => 1,
            Event::Hold(_) => 2,
            Event::Grace(_) | Event::SlurStart | Event::SlurStop => 0,
        }
    }
}

/// Expand tokens into events.
///
/// - `X`      -> `Note(X)`
/// - `X:`     -> `Hold(X)`
/// - `A~B`    -> `Note(A) SlurStart Note(B) SlurStop`
/// - `(A)B`   -> `Grace(A) Note(B)` (`Hold(B)` when B carries a hold marker)
pub fn compile(tokens: &[String]) -> Vec<Event> {
    let mut events = Vec::new();
    for token in tokens {
        let t = token.trim();
        if t.is_empty() {
            continue;
        }

        if let Some(caps) = RE_KAN.captures(t) {
            events.push(Event::Grace(caps[1].to_string()));
            let main = caps[2].to_string();
            match main.strip_suffix(':') {
                Some(held) => events.push(Event::Hold(held.to_string())),
                None => events.push(Event::Note(main)),
            }
            continue;
        }

        if let Some(held) = t.strip_suffix(':') {
            events.push(Event::Hold(held.to_string()));
            continue;
        }

        if let Some(caps) = RE_MEEND.captures(t) {
            events.push(Event::Note(caps[1].to_string()));
            events.push(Event::SlurStart);
            events.push(Event::Note(caps[2].to_string()));
            events.push(Event::SlurStop);
            continue;
        }

        events.push(Event::Note(t.to_string()));
    }
    events
}

/// Running position within the current measure, in duration units.
///
/// The MusicXML writer asks [`MeasureClock::would_overflow`] before emitting
/// any duration-consuming event and closes/reopens the measure first when
/// the answer is yes, so an event never spans a measure boundary.
#[derive(Debug, Clone, Copy)]
pub struct MeasureClock {
    capacity: u32,
    used: u32,
}

impl MeasureClock {
    pub fn new(beats_per_measure: u32, divisions_per_beat: u32) -> Self {
        Self {
            capacity: beats_per_measure * divisions_per_beat,
            used: 0,
        }
    }

    pub fn would_overflow(&self, duration_units: u32) -> bool {
        self.used + duration_units > self.capacity
    }

    pub fn advance(&mut self, duration_units: u32) {
        self.used += duration_units;
    }

    pub fn reset(&mut self) {
        self.used = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_plain_note() {
        assert_eq!(compile(&toks(&["G"])), vec![Event::Note("G".into())]);
    }

    #[test]
    fn test_hold() {
        let events = compile(&toks(&["G:"]));
        assert_eq!(events, vec![Event::Hold("G".into())]);
        assert_eq!(events[0].duration_units(), 2);
    }

    #[test]
    fn test_meend_brackets_with_slur() {
        assert_eq!(
            compile(&toks(&["G~R"])),
            vec![
                Event::Note("G".into()),
                Event::SlurStart,
                Event::Note("R".into()),
                Event::SlurStop,
            ]
        );
    }

    #[test]
    fn test_kan_grace_before_main() {
        let events = compile(&toks(&["(R)G"]));
        assert_eq!(
            events,
            vec![Event::Grace("R".into()), Event::Note("G".into())]
        );
        let total: u32 = events.iter().map(Event::duration_units).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn test_kan_with_held_main() {
        assert_eq!(
            compile(&toks(&["(R)G:"])),
            vec![Event::Grace("R".into()), Event::Hold("G".into())]
        );
    }

    #[test]
    fn test_ordering_preserved() {
        let events = compile(&toks(&["S", "G~R", "(N)S'", "P:"]));
        assert_eq!(
            events,
            vec![
                Event::Note("S".into()),
                Event::Note("G".into()),
                Event::SlurStart,
                Event::Note("R".into()),
                Event::SlurStop,
                Event::Grace("N".into()),
                Event::Note("S'".into()),
                Event::Hold("P".into()),
            ]
        );
    }

    #[test]
    fn test_measure_clock() {
        let mut clock = MeasureClock::new(4, 2);
        for _ in 0..8 {
            assert!(!clock.would_overflow(1));
            clock.advance(1);
        }
        assert!(clock.would_overflow(1));
        clock.reset();
        assert!(!clock.would_overflow(2));
    }
}
