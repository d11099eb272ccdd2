//! DOCX generator
//!
//! Writes a minimal WordprocessingML package: one page per song with a
//! header table (thumbnail slot, title, info) and a two-column body
//! table pairing consecutive line blocks, section headings on merged
//! rows. Images are not embedded; the thumbnail cell carries a text
//! placeholder, matching what the document shows when a picture is
//! unavailable.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::Result;
use crate::models::Song;
use crate::notation::Notation;
use crate::renderers::util::xml_escape;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>
"#;

const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>
"#;

/// One run paragraph with direct formatting. `size` is in half-points.
fn para(text: &str, bold: bool, size: u32) -> String {
    let bold_tag = if bold { "<w:b/>" } else { "" };
    format!(
        "<w:p><w:r><w:rPr>{bold_tag}<w:sz w:val=\"{size}\"/></w:rPr><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
        xml_escape(text)
    )
}

fn page_break() -> &'static str {
    "<w:p><w:r><w:br w:type=\"page\"/></w:r></w:p>"
}

/// A lyric/sargam/Western stack inside one table cell.
fn line_block(lyric: &str, indian: &str, western: &str) -> String {
    let mut out = String::new();
    out.push_str(&para(lyric, true, 20));
    out.push_str(&para(indian, false, 18));
    out.push_str(&para(western, false, 18));
    out
}

fn cell(content: &str) -> String {
    // A table cell must contain at least one paragraph.
    let body = if content.is_empty() { "<w:p/>" } else { content };
    format!("<w:tc><w:tcPr><w:tcW w:w=\"0\" w:type=\"auto\"/></w:tcPr>{body}</w:tc>")
}

fn merged_cell(content: &str) -> String {
    format!(
        "<w:tc><w:tcPr><w:tcW w:w=\"0\" w:type=\"auto\"/><w:gridSpan w:val=\"2\"/></w:tcPr>{content}</w:tc>"
    )
}

fn table(rows: &[String]) -> String {
    format!(
        "<w:tbl><w:tblPr><w:tblW w:w=\"0\" w:type=\"auto\"/></w:tblPr>\
         <w:tblGrid><w:gridCol/><w:gridCol/></w:tblGrid>{}</w:tbl>",
        rows.join("")
    )
}

enum Block {
    Heading(String),
    Line {
        lyric: String,
        indian: String,
        western: String,
    },
}

fn song_blocks(song: &Song, notation: &Notation) -> Vec<Block> {
    let mut blocks = Vec::new();
    for section in &song.sections {
        let name = section.name.trim();
        if !name.is_empty() {
            blocks.push(Block::Heading(name.to_uppercase()));
        }
        for line in &section.lines {
            let lyric = line.lyrics.trim().to_string();
            let indian = line.indian.trim().to_string();
            let mut western = line
                .western
                .as_deref()
                .unwrap_or_default()
                .trim()
                .to_string();
            if western.is_empty() {
                western = notation.transliterate(&indian, false, 4);
            }
            if lyric.is_empty() && indian.is_empty() && western.is_empty() {
                continue;
            }
            blocks.push(Block::Line {
                lyric,
                indian,
                western,
            });
        }
    }
    blocks
}

fn render_song(out: &mut String, song: &Song, notation: &Notation, first: bool) {
    if !first {
        out.push_str(page_break());
    }

    // Header table: thumbnail | title + info
    let mut header_right = para(&song.title, true, 28);
    for info in song.info.iter().take(12) {
        header_right.push_str(&para(info, false, 18));
    }
    out.push_str(&table(&[format!(
        "<w:tr>{}{}</w:tr>",
        cell(&para("Thumbnail", false, 18)),
        cell(&header_right)
    )]));
    out.push_str("<w:p/>");

    // Body: pair consecutive line blocks into two columns; headings
    // take a merged row of their own.
    let blocks = song_blocks(song, notation);
    let mut rows = Vec::new();
    let mut i = 0;
    while i < blocks.len() {
        match &blocks[i] {
            Block::Heading(name) => {
                rows.push(format!(
                    "<w:tr>{}</w:tr>",
                    merged_cell(&para(name, true, 20))
                ));
                i += 1;
            }
            Block::Line {
                lyric,
                indian,
                western,
            } => {
                let left = line_block(lyric, indian, western);
                let right = match blocks.get(i + 1) {
                    Some(Block::Line {
                        lyric,
                        indian,
                        western,
                    }) => {
                        i += 2;
                        line_block(lyric, indian, western)
                    }
                    _ => {
                        i += 1;
                        String::new()
                    }
                };
                rows.push(format!("<w:tr>{}{}</w:tr>", cell(&left), cell(&right)));
            }
        }
    }
    if !rows.is_empty() {
        out.push_str(&table(&rows));
    }
}

fn document_xml(book_title: &str, songs: &[Song], notation: &Notation) -> String {
    let mut body = String::new();
    body.push_str(&para(book_title, true, 40));
    body.push_str(&para("Generated from songs.json", false, 18));
    body.push_str(page_break());

    for (idx, song) in songs.iter().enumerate() {
        render_song(&mut body, song, notation, idx == 0);
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{body}<w:sectPr/></w:body></w:document>"
    )
}

/// Write the whole songbook as a single `.docx`.
pub fn make_docx(
    book_title: &str,
    songs: &[Song],
    out_path: &Path,
    notation: &Notation,
) -> Result<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut zip = ZipWriter::new(File::create(out_path)?);
    let options = SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;
    zip.start_file("_rels/.rels", options)?;
    zip.write_all(RELS.as_bytes())?;
    zip.start_file("word/document.xml", options)?;
    zip.write_all(document_xml(book_title, songs, notation).as_bytes())?;

    zip.finish()?;
    log::info!("wrote {}", out_path.display());
    Ok(())
}
