//! EPUB2 generator
//!
//! Reflowable ebook: index page, optional cover, one XHTML page per
//! song with lyric / sargam / Western blocks. The container is written
//! straight into the zip, mimetype entry first and stored uncompressed
//! as the format requires.

use std::collections::HashSet;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::models::{Book, Song};
use crate::notation::Notation;
use crate::renderers::util::{image_media_type, safe_path, slugify, xml_escape};

#[derive(Debug, Clone, Copy)]
pub struct EpubOptions {
    /// Opacity for per-song background images (0.0-0.2 recommended).
    pub bg_opacity: f64,
}

impl Default for EpubOptions {
    fn default() -> Self {
        Self { bg_opacity: 0.10 }
    }
}

fn xhtml_doc(title: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
  <title>{}</title>
  <meta charset="utf-8"/>
  <link rel="stylesheet" type="text/css" href="styles.css"/>
</head>
<body>
{}
</body>
</html>
"#,
        xml_escape(title),
        body
    )
}

fn styles_css(bg_opacity: f64) -> String {
    format!(
        r#"
body {{ font-family: serif; line-height: 1.45; margin: 0; padding: 0; }}
.page {{ padding: 1.0rem 1.0rem 1.5rem 1.0rem; position: relative; }}
.bg {{ position: fixed; inset: 0; background-size: cover; background-position: center;
      opacity: {bg_opacity}; z-index: 0; }}
.content {{ position: relative; z-index: 1; }}
.header {{ display: flex; gap: 0.9rem; align-items: flex-start; margin-bottom: 0.9rem; }}
.thumb {{ width: 96px; height: 96px; object-fit: cover; border-radius: 10px; }}
.title {{ font-size: 1.4rem; font-weight: 700; margin: 0; }}
.meta {{ font-size: 0.95rem; margin-top: 0.25rem; }}
.block {{ margin: 0.75rem 0 0.9rem 0; }}
.ly {{ font-weight: 700; margin: 0 0 0.25rem 0; }}
.sa {{ font-size: 1.05rem; margin: 0 0 0.15rem 0; }}
.we {{ font-size: 0.95rem; font-style: italic; margin: 0; opacity: 0.9; }}
a {{ text-decoration: none; }}
.index a {{ display: block; padding: 0.45rem 0; }}
.small {{ font-size: 0.9rem; opacity: 0.85; }}
"#
    )
}

/// Collects zip entries and the image manifest while pages are built.
struct EpubArchive {
    zip: ZipWriter<File>,
    images: Vec<String>,
    image_names: HashSet<String>,
}

impl EpubArchive {
    fn create(out_path: &Path) -> Result<Self> {
        if out_path.exists() {
            fs::remove_file(out_path)?;
        }
        let mut zip = ZipWriter::new(File::create(out_path)?);
        // mimetype must be the first entry and stored uncompressed.
        zip.start_file(
            "mimetype",
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
        )?;
        zip.write_all(b"application/epub+zip")?;
        Ok(Self {
            zip,
            images: Vec::new(),
            image_names: HashSet::new(),
        })
    }

    fn add_text(&mut self, name: &str, text: &str) -> Result<()> {
        self.zip.start_file(name, SimpleFileOptions::default())?;
        self.zip.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Copy an image referenced from song JSON into `OEBPS/images/`.
    /// Returns the href relative to OEBPS, or None when the reference
    /// is missing or unsafe.
    fn add_image(&mut self, base_dir: &Path, rel: &str) -> Result<Option<String>> {
        let Some(src) = safe_path(base_dir, rel) else {
            return Ok(None);
        };
        let Some(name) = src.file_name().and_then(|n| n.to_str()).map(String::from) else {
            return Ok(None);
        };
        let href = format!("images/{name}");
        if self.image_names.insert(name) {
            self.zip
                .start_file(format!("OEBPS/{href}"), SimpleFileOptions::default())?;
            self.zip.write_all(&fs::read(&src)?)?;
            let media_type = image_media_type(&src);
            let item_id = slugify(&href);
            self.images.push(format!(
                r#"<item id="img-{item_id}" href="{href}" media-type="{media_type}"/>"#
            ));
        }
        Ok(Some(href))
    }
}

pub fn make_epub(
    book: &Book,
    songs: &[Song],
    base_dir: &Path,
    out_path: &Path,
    notation: &Notation,
    options: &EpubOptions,
) -> Result<()> {
    let book_title = &book.book_title;
    let meta = &book.book_meta;
    let mut archive = EpubArchive::create(out_path)?;

    archive.add_text(
        "META-INF/container.xml",
        r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#,
    )?;
    archive.add_text("OEBPS/styles.css", &styles_css(options.bg_opacity))?;

    // Index page
    let index_items: Vec<String> = songs
        .iter()
        .map(|s| {
            format!(
                r#"<a href="{}.xhtml">{}</a>"#,
                s.id,
                xml_escape(&s.title)
            )
        })
        .collect();
    let index_body = format!(
        r#"
<div class="page">
  <div class="content">
    <h1 class="title">{}</h1>
    <div class="meta small">Tap a song. EPUB is reflowable (fonts scale).</div>
    <div class="index" style="margin-top:1rem;">
      {}
    </div>
  </div>
</div>
"#,
        xml_escape(book_title),
        index_items.join("\n")
    );
    archive.add_text("OEBPS/index.xhtml", &xhtml_doc("Index", &index_body))?;

    // Optional cover page
    let cover_href = archive.add_image(base_dir, &meta.cover_image)?;
    if let Some(cover) = &cover_href {
        let cover_body = format!(
            r#"
<div class="page">
  <div class="content" style="text-align:center;">
    <h1 class="title">{}</h1>
    <div style="margin-top:1rem;">
      <img src="{cover}" alt="cover" style="max-width:90%; border-radius:14px;"/>
    </div>
  </div>
</div>
"#,
            xml_escape(book_title)
        );
        archive.add_text("OEBPS/cover.xhtml", &xhtml_doc("Cover", &cover_body))?;
    }

    // Song pages
    for song in songs {
        let thumb = archive.add_image(base_dir, &song.thumbnail)?;
        let bg = archive.add_image(base_dir, &song.background)?;

        let bg_div = bg
            .map(|b| format!(r#"<div class="bg" style="background-image:url({b});"></div>"#))
            .unwrap_or_default();
        let thumb_img = thumb
            .map(|t| format!(r#"<img class="thumb" src="{t}" alt="thumbnail"/>"#))
            .unwrap_or_default();

        let meta_html: Vec<String> = song.info.iter().take(12).map(|l| xml_escape(l)).collect();

        let mut blocks = Vec::new();
        for section in &song.sections {
            let name = section.name.trim();
            if !name.is_empty() {
                blocks.push(format!(
                    r#"<div class="block"><p class="ly">{}</p></div>"#,
                    xml_escape(&name.to_uppercase())
                ));
            }
            for line in &section.lines {
                let lyric = xml_escape(&line.lyrics);
                let indian = xml_escape(&line.indian);
                let western_raw = match &line.western {
                    Some(w) if !w.trim().is_empty() => w.clone(),
                    _ => notation.transliterate(&line.indian, false, 4),
                };
                let western = xml_escape(&western_raw);
                if lyric.is_empty() && indian.is_empty() && western.is_empty() {
                    continue;
                }
                blocks.push(format!(
                    r#"
<div class="block">
  <p class="ly">{lyric}</p>
  <p class="sa">{indian}</p>
  <p class="we">{western}</p>
</div>"#
                ));
            }
        }

        let song_body = format!(
            r#"
<div class="page">
  {bg_div}
  <div class="content">
    <div class="header">
      {thumb_img}
      <div>
        <h1 class="title">{title}</h1>
        <div class="meta">{meta}</div>
      </div>
    </div>
    {blocks}
    <div class="small"><a href="index.xhtml">Back to Index</a></div>
  </div>
</div>
"#,
            title = xml_escape(&song.title),
            meta = meta_html.join("<br/>"),
            blocks = blocks.join("")
        );
        archive.add_text(
            &format!("OEBPS/{}.xhtml", song.id),
            &xhtml_doc(&song.title, &song_body),
        )?;
    }

    // OPF + NCX
    let identifier = if meta.isbn.trim().is_empty() {
        format!(
            "urn:uuid:songbook-{}",
            chrono::Utc::now().date_naive()
        )
    } else {
        meta.isbn.trim().to_string()
    };

    let mut manifest = vec![
        r#"<item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>"#.to_string(),
        r#"<item id="css" href="styles.css" media-type="text/css"/>"#.to_string(),
        r#"<item id="index" href="index.xhtml" media-type="application/xhtml+xml"/>"#.to_string(),
    ];
    let mut spine = Vec::new();
    let mut navpoints = Vec::new();
    let mut play = 1;

    let mut cover_meta = "";
    if let Some(cover) = &cover_href {
        manifest.push(
            r#"<item id="coverpage" href="cover.xhtml" media-type="application/xhtml+xml"/>"#
                .to_string(),
        );
        manifest.push(format!(
            r#"<item id="coverimage" href="{cover}" media-type="{}"/>"#,
            image_media_type(Path::new(cover))
        ));
        spine.push(r#"<itemref idref="coverpage"/>"#.to_string());
        navpoints.push(format!(
            r#"<navPoint id="nav{play}" playOrder="{play}"><navLabel><text>Cover</text></navLabel><content src="cover.xhtml"/></navPoint>"#
        ));
        cover_meta = r#"<meta name="cover" content="coverimage"/>"#;
        play += 1;
    }

    spine.push(r#"<itemref idref="index"/>"#.to_string());
    navpoints.push(format!(
        r#"<navPoint id="nav{play}" playOrder="{play}"><navLabel><text>Index</text></navLabel><content src="index.xhtml"/></navPoint>"#
    ));
    play += 1;

    for song in songs {
        manifest.push(format!(
            r#"<item id="{id}" href="{id}.xhtml" media-type="application/xhtml+xml"/>"#,
            id = song.id
        ));
        spine.push(format!(r#"<itemref idref="{}"/>"#, song.id));
        navpoints.push(format!(
            r#"<navPoint id="nav{play}" playOrder="{play}"><navLabel><text>{title}</text></navLabel><content src="{id}.xhtml"/></navPoint>"#,
            title = xml_escape(&song.title),
            id = song.id
        ));
        play += 1;
    }

    manifest.extend(archive.images.iter().cloned());

    let creator_tag = if meta.creator.trim().is_empty() {
        String::new()
    } else {
        format!("<dc:creator>{}</dc:creator>", xml_escape(meta.creator.trim()))
    };
    let publisher_tag = if meta.publisher.trim().is_empty() {
        String::new()
    } else {
        format!(
            "<dc:publisher>{}</dc:publisher>",
            xml_escape(meta.publisher.trim())
        )
    };
    let language = if meta.language.trim().is_empty() {
        "en"
    } else {
        meta.language.trim()
    };

    let content_opf = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" unique-identifier="BookId" version="2.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>{title}</dc:title>
    <dc:language>{language}</dc:language>
    <dc:identifier id="BookId">{identifier}</dc:identifier>
    {creator_tag}
    {publisher_tag}
    <dc:date>{date}</dc:date>
    {cover_meta}
  </metadata>
  <manifest>
    {manifest}
  </manifest>
  <spine toc="ncx">
    {spine}
  </spine>
</package>
"#,
        title = xml_escape(book_title),
        language = xml_escape(language),
        identifier = xml_escape(&identifier),
        date = chrono::Utc::now().date_naive(),
        manifest = manifest.join(""),
        spine = spine.join("")
    );
    archive.add_text("OEBPS/content.opf", &content_opf)?;

    let toc_ncx = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="{identifier}"/>
    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle><text>{title}</text></docTitle>
  <navMap>
    {navpoints}
  </navMap>
</ncx>
"#,
        identifier = xml_escape(&identifier),
        title = xml_escape(book_title),
        navpoints = navpoints.join("")
    );
    archive.add_text("OEBPS/toc.ncx", &toc_ncx)?;

    archive.zip.finish()?;
    log::info!("wrote {}", out_path.display());
    Ok(())
}
