// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! # Command line tag editor.
//!
//! A thin front end over [`tagnorm::Session`]. Every command opens the given
//! files and directories, runs one bulk operation on all of them and, unless
//! `--dry-run` is given, saves the result.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Builder as LoggerBuilder;
use log::LevelFilter;

use tagnorm::Session;
use tagnorm::backend::LoftyBackend;
use tagnorm::config::{self, AppConfig};
use tagnorm::editor::rename::RenameMode;
use tagnorm::file::FileIndex;
use tagnorm::model::{FrameCollection, FrameType, StandardFields, StandardTagsFilter};
use tagnorm::tag::{TagSlot, TagVersion};
use tagnorm::util::format::format_time;

#[derive(Parser)]
#[command(name = "tagnorm")]
#[command(about = "Read and normalise audio file tags", long_about = None)]
struct Cli {
    /// More output, repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Descend into sub-directories
    #[arg(short, long, global = true)]
    recursive: bool,

    /// Show what would change without writing anything
    #[arg(short = 'n', long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Slot {
    #[value(name = "1")]
    One,
    #[value(name = "2")]
    Two,
}

impl From<Slot> for TagSlot {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::One => TagSlot::V1,
            Slot::Two => TagSlot::V2,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Source {
    #[value(name = "1")]
    V1,
    #[value(name = "2")]
    V2,
    #[value(name = "21")]
    V2V1,
}

impl From<Source> for TagVersion {
    fn from(source: Source) -> Self {
        match source {
            Source::V1 => TagVersion::V1,
            Source::V2 => TagVersion::V2,
            Source::V2V1 => TagVersion::V2V1,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Field {
    Title,
    Artist,
    Album,
    Comment,
    Year,
    Track,
    Genre,
}

impl From<Field> for StandardFields {
    fn from(field: Field) -> Self {
        match field {
            Field::Title => StandardFields::TITLE,
            Field::Artist => StandardFields::ARTIST,
            Field::Album => StandardFields::ALBUM,
            Field::Comment => StandardFields::COMMENT,
            Field::Year => StandardFields::YEAR,
            Field::Track => StandardFields::TRACK,
            Field::Genre => StandardFields::GENRE,
        }
    }
}

/// No fields given means all fields.
fn filter_of(fields: &[Field]) -> StandardTagsFilter {
    if fields.is_empty() {
        StandardTagsFilter::all()
    } else {
        StandardTagsFilter::new(fields.iter().fold(StandardFields::empty(), |acc, f| acc | StandardFields::from(*f)))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show tags and details
    Show {
        paths: Vec<PathBuf>,
    },
    /// Set tag fields, an empty value removes the field
    Set {
        #[arg(short, long, default_value = "2")]
        tag: Slot,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        artist: Option<String>,
        #[arg(long)]
        album: Option<String>,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long)]
        year: Option<u32>,
        #[arg(long)]
        track: Option<u32>,
        #[arg(long)]
        genre: Option<String>,
        paths: Vec<PathBuf>,
    },
    /// Remove tag fields, all of them remove the tag
    Remove {
        #[arg(short, long, default_value = "2")]
        tag: Slot,
        #[arg(short, long, value_delimiter = ',')]
        fields: Vec<Field>,
        paths: Vec<PathBuf>,
    },
    /// Copy one tag to the other
    Copy {
        #[arg(long, default_value = "1")]
        from: Slot,
        #[arg(short, long, value_delimiter = ',')]
        fields: Vec<Field>,
        paths: Vec<PathBuf>,
    },
    /// Rename files after their tags
    Rename {
        /// Filename format, e.g. "%T %a - %t"
        #[arg(long)]
        format: Option<String>,
        #[arg(short, long, default_value = "21")]
        source: Source,
        paths: Vec<PathBuf>,
    },
    /// Set tags from file names
    FromFilename {
        /// Pattern, e.g. "%a - %l/%T %t"
        #[arg(short, long)]
        pattern: String,
        #[arg(short, long, default_value = "2")]
        tag: Slot,
        #[arg(short, long, value_delimiter = ',')]
        fields: Vec<Field>,
        paths: Vec<PathBuf>,
    },
    /// Print one formatted line per file
    Export {
        #[arg(long)]
        format: Option<String>,
        #[arg(short, long, default_value = "21")]
        source: Source,
        paths: Vec<PathBuf>,
    },
    /// Rename directories after the tags of their files
    RenameDir {
        /// Directory format, e.g. "%a - %l"
        #[arg(long)]
        format: Option<String>,
        #[arg(short, long, default_value = "21")]
        source: Source,
        /// Create the new directory inside the current one
        #[arg(long)]
        create: bool,
        paths: Vec<PathBuf>,
    },
    /// Show the configuration, optionally writing it back
    Config {
        #[arg(long)]
        save: bool,
    },
}

fn init_env_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = LoggerBuilder::new();
    builder.filter_level(level);
    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

/// Opens the given paths, or the configured media directories if none are
/// given.
fn open_all(session: &mut Session, paths: &[PathBuf], recursive: bool) -> Result<Vec<FileIndex>> {
    let paths: Vec<PathBuf> = if paths.is_empty() {
        session.config().media_dirs.iter().map(PathBuf::from).collect()
    } else {
        paths.to_vec()
    };
    if paths.is_empty() {
        bail!("No files given and no media directories configured");
    }
    let mut selection = Vec::new();
    for path in &paths {
        if path.is_dir() {
            let opened = session
                .open_directory(path, recursive)
                .with_context(|| format!("Failed to read directory {}", path.display()))?;
            selection.extend(opened);
        } else {
            let idx = session
                .open_file(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            selection.push(idx);
        }
    }
    Ok(selection)
}

fn print_tag(label: &str, frames: Option<FrameCollection>, format: Option<&str>) {
    match (frames, format) {
        (Some(frames), Some(format)) => {
            println!("  {label} ({format})");
            for frame in frames.iter().filter(|f| !f.is_empty()) {
                println!("    {:<14} {}", frame.name(), frame.value());
            }
        }
        _ => println!("  {label}: none"),
    }
}

fn show(session: &Session, selection: &[FileIndex]) {
    let store = session.store();
    for idx in selection {
        let Some(file) = store.get(*idx) else {
            continue;
        };
        let detail = file.detail();
        println!("{}", file.path().display());
        println!(
            "  {} {} kbps{} {} Hz {}",
            file.format(),
            detail.bitrate.unwrap_or(0),
            if detail.vbr { " VBR" } else { "" },
            detail.sample_rate.unwrap_or(0),
            detail.duration.map(|d| format_time(d.as_secs())).unwrap_or_default(),
        );
        for slot in [TagSlot::V1, TagSlot::V2] {
            if file.is_tag_supported(slot) {
                print_tag(&format!("Tag {slot}"), store.frames(*idx, slot), file.tag_format(slot));
            }
        }
    }
}

fn finish(session: &mut Session, dry_run: bool, changed: usize) -> Result<()> {
    if dry_run {
        println!("{changed} files would change");
        return Ok(());
    }
    let saved = session.save().context("Failed to save files")?;
    println!("{saved} files saved");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_env_logger(cli.verbose);

    let config: AppConfig = config::load_config();
    let mut session = Session::new(Box::new(LoftyBackend::new()), config);

    match cli.command {
        Commands::Show { paths } => {
            let selection = open_all(&mut session, &paths, cli.recursive)?;
            show(&session, &selection);
        }
        Commands::Set {
            tag,
            title,
            artist,
            album,
            comment,
            year,
            track,
            genre,
            paths,
        } => {
            let selection = open_all(&mut session, &paths, cli.recursive)?;
            let mut frames = FrameCollection::new();
            for (frame_type, value) in [
                (FrameType::Title, title),
                (FrameType::Artist, artist),
                (FrameType::Album, album),
                (FrameType::Comment, comment),
                (FrameType::Genre, genre),
            ] {
                if let Some(value) = value {
                    frames.set_text(frame_type, value);
                }
            }
            if let Some(year) = year {
                frames.set_number(FrameType::Year, year);
            }
            if let Some(track) = track {
                frames.set_number(FrameType::Track, track);
            }
            let changed = session.apply_frames(&selection, tag.into(), &frames, &StandardTagsFilter::all());
            finish(&mut session, cli.dry_run, changed)?;
        }
        Commands::Remove { tag, fields, paths } => {
            let selection = open_all(&mut session, &paths, cli.recursive)?;
            let changed = session.remove_tags(&selection, tag.into(), &filter_of(&fields));
            finish(&mut session, cli.dry_run, changed)?;
        }
        Commands::Copy { from, fields, paths } => {
            let selection = open_all(&mut session, &paths, cli.recursive)?;
            let changed = session.copy_between(&selection, from.into(), &filter_of(&fields));
            finish(&mut session, cli.dry_run, changed)?;
        }
        Commands::Rename { format, source, paths } => {
            let selection = open_all(&mut session, &paths, cli.recursive)?;
            let changed = session.filename_from_tags(&selection, source.into(), format.as_deref());
            for idx in &selection {
                if let Some(file) = session.store().get(*idx).filter(|f| f.is_filename_changed()) {
                    println!("{} -> {}", file.current_filename(), file.filename());
                }
            }
            finish(&mut session, cli.dry_run, changed)?;
        }
        Commands::FromFilename {
            pattern,
            tag,
            fields,
            paths,
        } => {
            let selection = open_all(&mut session, &paths, cli.recursive)?;
            let changed = session
                .tags_from_filename(&selection, tag.into(), &pattern, &filter_of(&fields))
                .context("Invalid filename pattern")?;
            finish(&mut session, cli.dry_run, changed)?;
        }
        Commands::Export { format, source, paths } => {
            let selection = open_all(&mut session, &paths, cli.recursive)?;
            for line in session.export_lines(&selection, source.into(), format.as_deref()) {
                println!("{line}");
            }
        }
        Commands::RenameDir {
            format,
            source,
            create,
            paths,
        } => {
            let selection = open_all(&mut session, &paths, cli.recursive)?;
            let mode = if create { RenameMode::Create } else { RenameMode::Rename };
            let mut plan = session.plan_rename_directory(&selection, source.into(), format.as_deref(), mode);
            for action in plan.actions() {
                println!("{action}");
            }
            if !cli.dry_run {
                let performed = session
                    .rename_directory(&mut plan)
                    .context("Failed to rename directories")?;
                println!("{performed} actions performed");
            }
        }
        Commands::Config { save } => {
            println!("{:#?}", session.config());
            if save {
                config::save_config(session.config()).context("Failed to save configuration")?;
            }
        }
    }

    Ok(())
}
