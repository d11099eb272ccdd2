// MusicXML builder state machine

use crate::notation::ResolvedNote;
use crate::renderers::util::xml_escape;

use super::duration::duration_to_note_type;

/// Score-wide settings for one exported song.
#[derive(Debug, Clone, Copy)]
pub struct ScoreOptions {
    pub divisions: u32,
    pub beats: u32,
    pub beat_type: u32,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self {
            divisions: 2,
            beats: 4,
            beat_type: 4,
        }
    }
}

/// State machine for building a single-part MusicXML document.
///
/// Lyric line 1 carries the sargam label, lyric line 2 the Western
/// pitch label, so the score doubles as a transliteration chart.
pub struct MusicXmlBuilder {
    buffer: String,
    options: ScoreOptions,
    measure_number: usize,
    attributes_written: bool,
    title: String,
}

impl MusicXmlBuilder {
    pub fn new(title: &str, options: ScoreOptions) -> Self {
        Self {
            buffer: String::new(),
            options,
            measure_number: 1,
            attributes_written: false,
            title: title.to_string(),
        }
    }

    /// Start a new measure. The first measure carries the attributes
    /// block (divisions, C major, time signature, treble clef) and the
    /// legend explaining the two lyric lines.
    pub fn start_measure(&mut self) {
        self.buffer.push_str(&format!(
            "    <measure number=\"{}\">\n",
            self.measure_number
        ));
        if !self.attributes_written {
            self.buffer.push_str("      <attributes>\n");
            self.buffer.push_str(&format!(
                "        <divisions>{}</divisions>\n",
                self.options.divisions
            ));
            self.buffer.push_str("        <key><fifths>0</fifths></key>\n");
            self.buffer.push_str(&format!(
                "        <time><beats>{}</beats><beat-type>{}</beat-type></time>\n",
                self.options.beats, self.options.beat_type
            ));
            self.buffer
                .push_str("        <clef><sign>G</sign><line>2</line></clef>\n");
            self.buffer.push_str("      </attributes>\n");
            self.direction_words(
                "Lyric1=Indian (Sargam), Lyric2=Western (Pitch+Oct). \
                 Ornaments: meend \"~\" as slur, kan \"(x)y\" as grace, hold \":\" as longer duration.",
            );
            self.attributes_written = true;
        }
    }

    /// Close the current measure and advance the number.
    pub fn end_measure(&mut self) {
        self.buffer.push_str("    </measure>\n");
        self.measure_number += 1;
    }

    /// Emit a `<direction>` with a text annotation below the staff.
    pub fn direction_words(&mut self, words: &str) {
        self.buffer.push_str(&format!(
            "      <direction placement=\"below\"><direction-type><words>{}</words></direction-type></direction>\n",
            xml_escape(words)
        ));
    }

    /// Write one pitched note. Grace notes omit the duration element.
    pub fn write_note(
        &mut self,
        note: &ResolvedNote,
        duration: u32,
        is_grace: bool,
        slur: Option<&str>,
    ) {
        self.buffer.push_str("      <note>\n");
        if is_grace {
            self.buffer.push_str("        <grace/>\n");
        }
        self.buffer.push_str("        <pitch>\n");
        self.buffer
            .push_str(&format!("          <step>{}</step>\n", note.step));
        if note.alter != 0 {
            self.buffer
                .push_str(&format!("          <alter>{}</alter>\n", note.alter));
        }
        self.buffer
            .push_str(&format!("          <octave>{}</octave>\n", note.octave));
        self.buffer.push_str("        </pitch>\n");
        if is_grace {
            self.buffer.push_str("        <type>eighth</type>\n");
        } else {
            self.buffer
                .push_str(&format!("        <duration>{duration}</duration>\n"));
            self.buffer.push_str(&format!(
                "        <type>{}</type>\n",
                duration_to_note_type(duration)
            ));
        }
        if let Some(slur) = slur {
            self.buffer.push_str("        <notations>\n");
            self.buffer
                .push_str(&format!("          <slur type=\"{slur}\"/>\n"));
            self.buffer.push_str("        </notations>\n");
        }
        self.buffer.push_str(&format!(
            "        <lyric number=\"1\"><text>{}</text></lyric>\n",
            xml_escape(&note.indian_label)
        ));
        self.buffer.push_str(&format!(
            "        <lyric number=\"2\"><text>{}</text></lyric>\n",
            xml_escape(&note.western_label)
        ));
        self.buffer.push_str("      </note>\n");
    }

    /// Wrap the accumulated measures in the document frame and return
    /// the complete MusicXML text.
    pub fn finalize(self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n");
        out.push_str(
            "<!DOCTYPE score-partwise PUBLIC \"-//Recordare//DTD MusicXML 3.1 Partwise//EN\" \
             \"http://www.musicxml.org/dtds/partwise.dtd\">\n",
        );
        out.push_str("<score-partwise version=\"3.1\">\n");
        out.push_str(&format!(
            "  <work><work-title>{}</work-title></work>\n",
            xml_escape(&self.title)
        ));
        out.push_str(
            "  <identification><encoding><software>songbook</software></encoding></identification>\n",
        );
        out.push_str(
            "  <part-list><score-part id=\"P1\"><part-name>Lead</part-name></score-part></part-list>\n",
        );
        out.push_str("  <part id=\"P1\">\n");
        out.push_str(&self.buffer);
        out.push_str("  </part>\n");
        out.push_str("</score-partwise>\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(step: &str, alter: i8, octave: i32) -> ResolvedNote {
        ResolvedNote {
            step: step.to_string(),
            alter,
            octave,
            indian_label: "S".to_string(),
            western_label: format!("{step}{octave}"),
        }
    }

    #[test]
    fn test_document_frame() {
        let mut b = MusicXmlBuilder::new("Song & Title", ScoreOptions::default());
        b.start_measure();
        b.end_measure();
        let xml = b.finalize();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<work-title>Song &amp; Title</work-title>"));
        assert!(xml.contains("<divisions>2</divisions>"));
        assert!(xml.contains("<beats>4</beats><beat-type>4</beat-type>"));
        assert!(xml.ends_with("</score-partwise>\n"));
    }

    #[test]
    fn test_attributes_only_in_first_measure() {
        let mut b = MusicXmlBuilder::new("T", ScoreOptions::default());
        b.start_measure();
        b.end_measure();
        b.start_measure();
        b.end_measure();
        let xml = b.finalize();
        assert_eq!(xml.matches("<attributes>").count(), 1);
        assert!(xml.contains("<measure number=\"2\">"));
    }

    #[test]
    fn test_write_note_with_alter_and_slur() {
        let mut b = MusicXmlBuilder::new("T", ScoreOptions::default());
        b.start_measure();
        b.write_note(&note("E", -1, 4), 1, false, Some("start"));
        b.end_measure();
        let xml = b.finalize();
        assert!(xml.contains("<step>E</step>"));
        assert!(xml.contains("<alter>-1</alter>"));
        assert!(xml.contains("<slur type=\"start\"/>"));
        assert!(xml.contains("<type>eighth</type>"));
    }

    #[test]
    fn test_grace_note_has_no_duration() {
        let mut b = MusicXmlBuilder::new("T", ScoreOptions::default());
        b.start_measure();
        b.write_note(&note("C", 0, 4), 1, true, None);
        b.end_measure();
        let xml = b.finalize();
        assert!(xml.contains("<grace/>"));
        assert!(!xml.contains("<duration>"));
    }
}
