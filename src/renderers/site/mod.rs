//! Static website generator
//!
//! Builds a GitHub Pages friendly `dist/` tree: an index with
//! client-side search over song cards, one page per song, static
//! assets and a copy of the images directory. Pages are rendered from
//! embedded Mustache templates.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::models::{Book, Song};
use crate::notation::Notation;

const PAGE_TEMPLATE: &str = include_str!("templates/page.mustache");
const INDEX_TEMPLATE: &str = include_str!("templates/index.mustache");
const SONG_TEMPLATE: &str = include_str!("templates/song.mustache");

const STYLE_CSS: &str = include_str!("assets/style.css");
const APP_JS: &str = include_str!("assets/app.js");

#[derive(Serialize)]
struct PageContext {
    title: String,
    base_href: String,
    body: String,
}

#[derive(Serialize)]
struct IndexContext {
    book_title: String,
    subtitle: String,
    has_cover: bool,
    cover: String,
    count: usize,
    cards: Vec<CardContext>,
    date: String,
}

#[derive(Serialize)]
struct CardContext {
    id: String,
    title: String,
    hay: String,
    has_thumb: bool,
    thumb: String,
    meta: String,
}

#[derive(Serialize)]
struct SongContext {
    id: String,
    title: String,
    book_title: String,
    info_html: String,
    has_bg: bool,
    bg: String,
    sections: Vec<SectionContext>,
}

#[derive(Serialize)]
struct SectionContext {
    name: String,
    lines: Vec<LineContext>,
}

#[derive(Serialize)]
struct LineContext {
    lyrics: String,
    indian: String,
    has_western: bool,
    western: String,
    /// True when the western column is absent and the row collapses to
    /// two columns.
    two: bool,
}

/// Normalized, safe relative asset path for generated HTML. Rejects
/// parent traversal and strips any leading slash.
fn safe_rel_asset_path(p: &str) -> Option<String> {
    if p.is_empty() {
        return None;
    }
    let p = p.replace('\\', "/");
    let p = p.trim_start_matches('/');
    if p.is_empty() || p.split('/').any(|part| part == "..") {
        return None;
    }
    Some(p.to_string())
}

fn html_escape(s: &str) -> String {
    crate::renderers::util::xml_escape(s)
}

fn render_page(title: &str, base_href: &str, body: String) -> Result<String> {
    let template = mustache::compile_str(PAGE_TEMPLATE)?;
    Ok(template.render_to_string(&PageContext {
        title: title.to_string(),
        base_href: base_href.to_string(),
        body,
    })?)
}

fn render_index(book: &Book, songs: &[Song]) -> Result<String> {
    let mut sorted: Vec<&Song> = songs.iter().filter(|s| !s.id.trim().is_empty()).collect();
    sorted.sort_by(|a, b| {
        let ka = if a.title.is_empty() { &a.id } else { &a.title };
        let kb = if b.title.is_empty() { &b.id } else { &b.title };
        ka.cmp(kb)
    });

    let cards: Vec<CardContext> = sorted
        .iter()
        .map(|s| {
            let id = s.id.trim().to_string();
            let title = if s.title.trim().is_empty() {
                id.clone()
            } else {
                s.title.trim().to_string()
            };
            let thumb = safe_rel_asset_path(&s.thumbnail);
            let info_text: Vec<&str> = s
                .info
                .iter()
                .take(3)
                .map(String::as_str)
                .filter(|x| !x.is_empty())
                .collect();
            let meta = info_text.join(" \u{2022} ");
            let hay = format!("{id} {title} {meta}").trim().to_string();
            CardContext {
                id,
                title,
                hay,
                has_thumb: thumb.is_some(),
                thumb: thumb.unwrap_or_default(),
                meta: if meta.is_empty() {
                    " ".to_string()
                } else {
                    meta
                },
            }
        })
        .collect();

    let cover = safe_rel_asset_path(&book.book_meta.cover_image);
    let creator = book.book_meta.creator.trim();
    let subtitle = if creator.is_empty() {
        "Static song notation viewer".to_string()
    } else {
        creator.to_string()
    };

    let context = IndexContext {
        book_title: book.book_title.clone(),
        subtitle,
        has_cover: cover.is_some(),
        cover: cover.unwrap_or_default(),
        count: cards.len(),
        cards,
        date: chrono::Local::now().format("%Y-%m-%d").to_string(),
    };

    let template = mustache::compile_str(INDEX_TEMPLATE)?;
    let body = template.render_to_string(&context)?;
    render_page(&book.book_title, "./", body)
}

fn render_song_page(book: &Book, song: &Song, notation: &Notation) -> Result<String> {
    let info_lines: Vec<String> = song
        .info
        .iter()
        .filter(|x| !x.is_empty())
        .map(|x| html_escape(x))
        .collect();
    let info_html = if info_lines.is_empty() {
        html_escape(&book.book_title)
    } else {
        info_lines.join("<br/>")
    };

    let bg = safe_rel_asset_path(&song.background);

    let sections: Vec<SectionContext> = song
        .sections
        .iter()
        .map(|section| {
            let name = section.name.trim();
            SectionContext {
                name: if name.is_empty() {
                    "SECTION".to_string()
                } else {
                    name.to_string()
                },
                lines: section
                    .lines
                    .iter()
                    .map(|line| {
                        let western = match &line.western {
                            Some(w) if !w.trim().is_empty() => w.clone(),
                            _ => notation.transliterate(&line.indian, false, 4),
                        };
                        let has_western = !western.trim().is_empty();
                        LineContext {
                            lyrics: line.lyrics.clone(),
                            indian: line.indian.clone(),
                            has_western,
                            western,
                            two: !has_western,
                        }
                    })
                    .collect(),
            }
        })
        .collect();

    let context = SongContext {
        id: song.id.trim().to_string(),
        title: song.title.clone(),
        book_title: book.book_title.clone(),
        info_html,
        has_bg: bg.is_some(),
        bg: bg.unwrap_or_default(),
        sections,
    };

    let template = mustache::compile_str(SONG_TEMPLATE)?;
    let body = template.render_to_string(&context)?;
    render_page(
        &format!("{} \u{2014} {}", song.title, book.book_title),
        "../../",
        body,
    )
}

fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Build the whole site under `dist`. The directory is recreated from
/// scratch on every build.
pub fn build_site(
    book: &Book,
    songs: &[Song],
    base_dir: &Path,
    dist: &Path,
    notation: &Notation,
) -> Result<()> {
    if dist.exists() {
        fs::remove_dir_all(dist)?;
    }
    fs::create_dir_all(dist.join("assets"))?;

    fs::write(dist.join(".nojekyll"), "")?;
    fs::write(dist.join("assets/style.css"), STYLE_CSS)?;
    fs::write(dist.join("assets/app.js"), APP_JS)?;

    let images = base_dir.join("images");
    if images.exists() {
        copy_tree(&images, &dist.join("images"))?;
    }

    fs::write(dist.join("index.html"), render_index(book, songs)?)?;

    for song in songs {
        let id = song.id.trim();
        if id.is_empty() {
            continue;
        }
        let dir = dist.join("songs").join(id);
        fs::create_dir_all(&dir)?;
        fs::write(
            dir.join("index.html"),
            render_song_page(book, song, notation)?,
        )?;
    }

    log::info!("site written to {}", dist.display());
    Ok(())
}
