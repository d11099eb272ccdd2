//! Command line interface for the songbook pipeline.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use songbook::error::Result;
use songbook::notation::display::DisplayNormalizer;
use songbook::notation::{Notation, NotationMapping};
use songbook::renderers::musicxml::{ExportOptions, ScoreOptions};
use songbook::renderers::{build_site, make_docx, make_epub, EpubOptions};
use songbook::store;
use songbook::store::maintenance;

#[derive(Parser)]
#[command(name = "songbook", version, about = "Generate EPUB / DOCX / MusicXML / website from a songbook")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the songbook into the selected output formats
    Build(BuildArgs),
    /// Canonicalize the Indian display lines in songs.json
    NormalizeNotation {
        /// Path to songs.json
        #[arg(long, default_value = "songs.json")]
        input: PathBuf,
    },
    /// Write explicit boolean `export` flags into songs.json
    NormalizeExport {
        /// Path to songs.json
        #[arg(long, default_value = "songs.json")]
        input: PathBuf,
    },
    /// Split a monolithic songs.json into book.json + songs/<id>.json
    Split {
        /// Path to songs.json
        #[arg(long, default_value = "songs.json")]
        input: PathBuf,
    },
    /// Remove derived fields (western/tokens) from songs.json
    Minimize {
        /// Input JSON
        #[arg(long = "in", default_value = "songs.json")]
        input: PathBuf,
        /// Output JSON
        #[arg(long, default_value = "songs.clean.json")]
        out: PathBuf,
        /// Overwrite the input file (writes a .bak once if missing)
        #[arg(long)]
        in_place: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Epub,
    Docx,
    Musicxml,
    Site,
    All,
}

impl Format {
    fn wants(self, other: Format) -> bool {
        self == other || matches!(self, Format::All)
    }
}

#[derive(Args)]
struct BuildArgs {
    /// Project directory holding book.json + songs/ (or songs.json)
    #[arg(long, default_value = ".")]
    input_dir: PathBuf,
    /// Output directory
    #[arg(long, default_value = "output")]
    outdir: PathBuf,
    #[arg(long, value_enum, default_value_t = Format::All)]
    format: Format,
    /// EPUB background opacity (0.0-0.2 recommended)
    #[arg(long, default_value_t = 0.10)]
    epub_bg_opacity: f64,
    /// MusicXML divisions per quarter note
    #[arg(long, default_value_t = 2)]
    musicxml_divisions: u32,
    /// MusicXML beats per measure
    #[arg(long, default_value_t = 4)]
    musicxml_beats: u32,
    /// MusicXML beat type
    #[arg(long, default_value_t = 4)]
    musicxml_beat_type: u32,
    /// Default octave for Sa
    #[arg(long, default_value_t = 4)]
    musicxml_octave: i32,
}

fn run_build(args: &BuildArgs) -> Result<()> {
    let base_dir = &args.input_dir;
    let mapping = NotationMapping::load_or_default(base_dir);
    let notation = Notation::new(mapping);

    let (book, songs) = store::load_songbook(base_dir)?;
    std::fs::create_dir_all(&args.outdir)?;

    let base_name = book.book_title.replace(' ', "_");

    if args.format.wants(Format::Epub) {
        let path = args.outdir.join(format!("{base_name}.epub"));
        make_epub(
            &book,
            &songs,
            base_dir,
            &path,
            &notation,
            &EpubOptions {
                bg_opacity: args.epub_bg_opacity,
            },
        )?;
        println!("EPUB: {}", path.display());
    }

    if args.format.wants(Format::Docx) {
        let path = args.outdir.join(format!("{base_name}.docx"));
        make_docx(&book.book_title, &songs, &path, &notation)?;
        println!("DOCX: {}", path.display());
    }

    if args.format.wants(Format::Musicxml) {
        let options = ExportOptions {
            score: ScoreOptions {
                divisions: args.musicxml_divisions,
                beats: args.musicxml_beats,
                beat_type: args.musicxml_beat_type,
            },
            default_octave: args.musicxml_octave,
            note_duration: 1,
        };
        let written =
            songbook::renderers::export_songs(&songs, &args.outdir, &notation, &options)?;
        println!("MusicXML: {} file(s) in {}", written.len(), args.outdir.display());
    }

    if args.format.wants(Format::Site) {
        let dist = args.outdir.join("dist");
        build_site(&book, &songs, base_dir, &dist, &notation)?;
        println!("Site: {}", dist.display());
    }

    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Build(args) => run_build(args),
        Command::NormalizeNotation { input } => {
            let mapping = NotationMapping::load_or_default(
                input.parent().unwrap_or_else(|| std::path::Path::new(".")),
            );
            let normalizer = DisplayNormalizer::new(&mapping);
            let n = maintenance::normalize_notation(input, &normalizer)?;
            println!("Normalized {n} line(s) in {}", input.display());
            Ok(())
        }
        Command::NormalizeExport { input } => {
            let n = maintenance::normalize_export_flags(input)?;
            println!("Updated export flag on {n} song(s) in {}", input.display());
            Ok(())
        }
        Command::Split { input } => {
            let n = maintenance::split(input)?;
            println!("Extracted {n} song(s) from {}", input.display());
            Ok(())
        }
        Command::Minimize {
            input,
            out,
            in_place,
        } => {
            let (target, removed) = maintenance::minimize_file(input, out, *in_place)?;
            println!(
                "Wrote {} (removed {removed} keys: western/tokens)",
                target.display()
            );
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
