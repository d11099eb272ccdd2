//! Per-song MusicXML export
//!
//! Writes one `<song_id>.musicxml` per song. Every token becomes an
//! eighth note by default; holds double the duration, meend becomes a
//! slur and kan a grace note.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::Song;
use crate::notation::{Event, MeasureClock, Notation};

use super::builder::{MusicXmlBuilder, ScoreOptions};

/// Settings for the MusicXML export pass.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    pub score: ScoreOptions,
    /// Octave emitted for Sa.
    pub default_octave: i32,
    /// Base note duration in divisions units (1 = eighth at divisions=2).
    pub note_duration: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            score: ScoreOptions::default(),
            default_octave: 4,
            note_duration: 1,
        }
    }
}

/// Export one MusicXML file per song, returning the written paths.
pub fn export_songs(
    songs: &[Song],
    outdir: &Path,
    notation: &Notation,
    options: &ExportOptions,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(outdir)?;
    let mut written = Vec::with_capacity(songs.len());
    for song in songs {
        let path = outdir.join(format!("{}.musicxml", song.id));
        let xml = render_song(song, notation, options);
        fs::write(&path, xml)?;
        log::info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

fn render_song(song: &Song, notation: &Notation, options: &ExportOptions) -> String {
    let mut builder = MusicXmlBuilder::new(&song.title, options.score);
    let mut clock = MeasureClock::new(options.score.beats, options.score.divisions);
    builder.start_measure();

    for section in &song.sections {
        let name = section.name.trim();
        if !name.is_empty() {
            builder.direction_words(name);
        }
        for line in &section.lines {
            let phrase = line.lyrics.trim();
            if !phrase.is_empty() {
                builder.direction_words(phrase);
            }

            let tokens = match &line.tokens {
                Some(tokens) if !tokens.is_empty() => tokens.clone(),
                _ => notation.tokenize(&line.indian),
            };

            let events = notation.compile(&tokens);
            for (i, event) in events.iter().enumerate() {
                let (token, duration, is_grace) = match event {
                    Event::SlurStart | Event::SlurStop => continue,
                    Event::Note(t) => (t, options.note_duration, false),
                    Event::Hold(t) => (t, options.note_duration * 2, false),
                    Event::Grace(t) => (t, options.note_duration, true),
                };

                // A slur boundary follows the note it belongs to: the note
                // before SlurStart opens the slur, the one before SlurStop
                // closes it.
                let slur = match events.get(i + 1) {
                    Some(Event::SlurStart) => Some("start"),
                    Some(Event::SlurStop) => Some("stop"),
                    _ => None,
                };

                let Some(note) = notation.resolve(token, options.default_octave) else {
                    continue;
                };

                // Grace notes take no time, so they never force a new
                // measure even when emitted at a full one.
                if !is_grace && clock.would_overflow(duration) {
                    builder.end_measure();
                    builder.start_measure();
                    clock.reset();
                }

                builder.write_note(&note, duration, is_grace, slur);
                if !is_grace {
                    clock.advance(duration);
                }
            }
        }
    }

    builder.end_measure();
    builder.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Line, Section};

    fn song_with_indian(indian: &str) -> Song {
        Song {
            id: "test".to_string(),
            title: "Test".to_string(),
            export: true,
            info: Vec::new(),
            sections: vec![Section {
                name: "Sthayi".to_string(),
                lines: vec![Line {
                    lyrics: "la la".to_string(),
                    indian: indian.to_string(),
                    western: None,
                    tokens: None,
                }],
            }],
            thumbnail: String::new(),
            background: String::new(),
            background_mode: String::new(),
        }
    }

    #[test]
    fn test_render_basic_line() {
        let notation = Notation::default();
        let xml = render_song(
            &song_with_indian("S R G"),
            &notation,
            &ExportOptions::default(),
        );
        assert_eq!(xml.matches("<note>").count(), 3);
        assert!(xml.contains("<step>C</step>"));
        assert!(xml.contains("<words>Sthayi</words>"));
        assert!(xml.contains("<words>la la</words>"));
    }

    #[test]
    fn test_measure_break_on_ninth_eighth() {
        // 4/4 at divisions=2 holds 8 eighth notes per measure.
        let notation = Notation::default();
        let xml = render_song(
            &song_with_indian("S R G m P D N S' S"),
            &notation,
            &ExportOptions::default(),
        );
        assert!(xml.contains("<measure number=\"2\">"));
        assert_eq!(xml.matches("<measure number=").count(), 2);
    }

    #[test]
    fn test_meend_becomes_slur() {
        let notation = Notation::default();
        let xml = render_song(
            &song_with_indian("G~m"),
            &notation,
            &ExportOptions::default(),
        );
        // G~m resolves to E then F; the slur opens on the E and closes
        // on the F.
        let start = xml.find("<slur type=\"start\"/>").unwrap();
        let stop = xml.find("<slur type=\"stop\"/>").unwrap();
        let second_note = xml.find("<step>F</step>").unwrap();
        assert!(start < second_note);
        assert!(stop > second_note);
    }

    #[test]
    fn test_kan_becomes_grace() {
        let notation = Notation::default();
        let xml = render_song(
            &song_with_indian("(S)R"),
            &notation,
            &ExportOptions::default(),
        );
        assert!(xml.contains("<grace/>"));
    }

    #[test]
    fn test_hold_doubles_duration() {
        let notation = Notation::default();
        let xml = render_song(
            &song_with_indian("G:"),
            &notation,
            &ExportOptions::default(),
        );
        assert!(xml.contains("<duration>2</duration>"));
        assert!(xml.contains("<type>quarter</type>"));
    }

    #[test]
    fn test_precomputed_tokens_win() {
        let notation = Notation::default();
        let mut song = song_with_indian("S R G");
        song.sections[0].lines[0].tokens = Some(vec!["P".to_string()]);
        let xml = render_song(&song, &notation, &ExportOptions::default());
        assert_eq!(xml.matches("<note>").count(), 1);
        assert!(xml.contains("<step>G</step>"));
    }

    #[test]
    fn test_unresolvable_token_emits_nothing() {
        let notation = Notation::default();
        let mut song = song_with_indian("S");
        song.sections[0].lines[0].tokens = Some(vec!["X".to_string(), "S".to_string()]);
        let xml = render_song(&song, &notation, &ExportOptions::default());
        assert_eq!(xml.matches("<note>").count(), 1);
        assert_eq!(xml.matches("<measure number=").count(), 1);
    }
}
