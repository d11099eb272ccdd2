// Duration helpers for MusicXML export

/// Map duration units (divisions-based) to a MusicXML type label.
///
/// With divisions=2: 1=eighth, 2=quarter, 4=half, 8=whole. Anything
/// else falls back to quarter.
pub fn duration_to_note_type(dur_units: u32) -> &'static str {
    match dur_units {
        0 | 1 => "eighth",
        2 => "quarter",
        4 => "half",
        8 => "whole",
        _ => "quarter",
    }
}
