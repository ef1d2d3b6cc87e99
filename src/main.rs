use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use mdfold_lib::config::Config;
use mdfold_lib::{
    Caret, Document, FoldRegion, Labeler, LevelShift, LineIndex, LineNumbers, MarkdownPresentation, OutlineNode,
    PlaceholderKind, ShiftOutcome, apply_edits, build_outline, compute_fold_regions, parse_document, placeholder_text,
    shift_carets,
};

/// Exit status for usage, I/O and configuration failures
const TOOL_ERROR: i32 = 2;

fn tool_error(message: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", "Error".red().bold(), message);
    std::process::exit(TOOL_ERROR);
}

#[derive(Parser)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Control colored output: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_parser = ["auto", "always", "never"])]
    color: String,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ignore all configuration files and use built-in defaults
    #[arg(long, global = true, conflicts_with = "config")]
    no_config: bool,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the foldable regions of a Markdown file
    Folds {
        /// Markdown file, or `-` for stdin
        file: String,
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the header outline of a Markdown file
    Outline {
        /// Markdown file, or `-` for stdin
        file: String,
        #[arg(long)]
        json: bool,
    },
    /// Raise or lower header levels at the given carets
    Shift {
        /// Markdown file, or `-` for stdin
        file: String,
        /// Byte offset (`N`) or selection (`START:END`); may be repeated
        #[arg(long = "caret", required = true, value_parser = parse_caret)]
        carets: Vec<Caret>,
        #[arg(long, value_enum, default_value_t = Direction::Increase)]
        direction: Direction,
        /// Rewrite the file in place instead of printing the result
        #[arg(long, conflicts_with = "json")]
        write: bool,
        /// Print the outcome of every caret as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Increase,
    Decrease,
}

impl From<Direction> for LevelShift {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Increase => LevelShift::Increase,
            Direction::Decrease => LevelShift::Decrease,
        }
    }
}

fn parse_caret(value: &str) -> Result<Caret, String> {
    let parse_offset = |part: &str| {
        part.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid offset '{part}': {e}"))
    };
    match value.split_once(':') {
        Some((start, end)) => Ok(Caret::selection(parse_offset(start)?, parse_offset(end)?)),
        None => Ok(Caret::at(parse_offset(value)?)),
    }
}

fn read_input(file: &str) -> io::Result<String> {
    if file == "-" {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        fs::read_to_string(file)
    }
}

fn load_document(file: &str) -> Document {
    let content = read_input(file).unwrap_or_else(|e| tool_error(format!("Failed to read {file}: {e}")));
    parse_document(&content).unwrap_or_else(|e| tool_error(format!("Failed to build tree for {file}: {e}")))
}

fn load_config(cli: &Cli) -> Config {
    if cli.no_config {
        log::debug!("[mdfold-config] --no-config given, using defaults");
        return Config::default();
    }
    Config::load(cli.config.as_deref()).unwrap_or_else(|e| tool_error(e))
}

fn document_name(file: &str) -> String {
    if file == "-" {
        return "<stdin>".to_string();
    }
    Path::new(file)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string())
}

#[derive(Serialize)]
struct FoldEntry {
    start: usize,
    end: usize,
    start_line: usize,
    end_line: usize,
    kind: PlaceholderKind,
    placeholder: String,
}

fn fold_entries(doc: &Document, regions: &[FoldRegion], labeler: &Labeler) -> Vec<FoldEntry> {
    let lines = LineIndex::new(doc.source());
    regions
        .iter()
        .filter_map(|region| {
            let start_line = lines.line_number(region.range.start).ok()?;
            let end_line = lines.line_number(region.range.end.saturating_sub(1)).ok()?;
            Some(FoldEntry {
                start: region.range.start,
                end: region.range.end,
                start_line: start_line + 1,
                end_line: end_line + 1,
                kind: region.placeholder,
                placeholder: placeholder_text(doc, region, labeler),
            })
        })
        .collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => tool_error(format!("Failed to serialize output: {e}")),
    }
}

fn handle_folds(file: &str, json: bool, config: &Config) {
    let doc = load_document(file);
    let lines = LineIndex::new(doc.source());
    let regions = compute_fold_regions(&doc, &lines);
    let entries = fold_entries(&doc, &regions, &Labeler::from_config(config));

    if json {
        print_json(&entries);
        return;
    }
    if entries.is_empty() {
        println!("{}", "No foldable regions".dimmed());
        return;
    }
    for entry in &entries {
        println!(
            "{:>5}-{:<5} {}",
            entry.start_line.to_string().cyan(),
            entry.end_line.to_string().cyan(),
            entry.placeholder.replace('\n', "\\n")
        );
    }
}

#[derive(Serialize)]
struct OutlineEntry {
    text: Option<String>,
    location: Option<String>,
    start: usize,
    end: usize,
    children: Vec<OutlineEntry>,
}

impl OutlineEntry {
    fn from_node(node: &OutlineNode<'_>) -> Self {
        let presentation = node.presentation();
        Self {
            text: presentation.presentable_text,
            location: presentation.location_text,
            start: node.range().start,
            end: node.range().end,
            children: node.children().iter().map(Self::from_node).collect(),
        }
    }
}

fn print_outline(node: &OutlineNode<'_>, depth: usize) {
    for child in node.children() {
        let presentation = child.presentation();
        let text = presentation.presentable_text.unwrap_or_default();
        match presentation.location_text {
            Some(location) => println!("{}{} {}", "  ".repeat(depth), text.bold(), location.dimmed()),
            None => println!("{}{}", "  ".repeat(depth), text.bold()),
        }
        print_outline(child, depth + 1);
    }
}

fn handle_outline(file: &str, json: bool) {
    let doc = load_document(file);
    let provider = MarkdownPresentation::new(&doc, Some(document_name(file)));
    let root = build_outline(&doc, &provider);

    if json {
        print_json(&OutlineEntry::from_node(&root));
        return;
    }
    println!("{}", root.presentable_text().unwrap_or_default().underline());
    print_outline(&root, 1);
}

#[derive(Serialize)]
struct ShiftEntry {
    caret_start: usize,
    caret_end: usize,
    applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    replacement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

fn handle_shift(file: &str, carets: &[Caret], direction: Direction, write: bool, json: bool) {
    if write && file == "-" {
        tool_error("--write cannot be used with stdin");
    }
    let doc = load_document(file);
    let lines = LineIndex::new(doc.source());
    let outcomes = shift_carets(&doc, &lines, carets, direction.into());

    if json {
        let entries: Vec<ShiftEntry> = carets
            .iter()
            .zip(&outcomes)
            .map(|(caret, outcome)| match outcome {
                ShiftOutcome::Applied { edit, .. } => ShiftEntry {
                    caret_start: caret.start,
                    caret_end: caret.end,
                    applied: true,
                    start: Some(edit.range.start),
                    end: Some(edit.range.end),
                    replacement: Some(edit.replacement.clone()),
                    reason: None,
                },
                ShiftOutcome::Skipped(err) => ShiftEntry {
                    caret_start: caret.start,
                    caret_end: caret.end,
                    applied: false,
                    start: None,
                    end: None,
                    replacement: None,
                    reason: Some(err.to_string()),
                },
            })
            .collect();
        print_json(&entries);
        return;
    }

    for (caret, outcome) in carets.iter().zip(&outcomes) {
        if let ShiftOutcome::Skipped(err) = outcome {
            eprintln!("{}: caret {}:{} skipped: {}", "Warning".yellow().bold(), caret.start, caret.end, err);
        }
    }

    let updated = apply_edits(doc.source(), outcomes.iter().filter_map(ShiftOutcome::edit));
    if write {
        let applied = outcomes.iter().filter(|outcome| outcome.is_applied()).count();
        if applied > 0 {
            fs::write(file, &updated).unwrap_or_else(|e| tool_error(format!("Failed to write {file}: {e}")));
        }
        eprintln!("{} {applied} header edit(s) to {file}", "Applied".green().bold());
    } else {
        print!("{updated}");
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.color.as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::unset_override(),
    }

    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    } else if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(log::LevelFilter::Warn);
    }
    logger.init();

    let config = load_config(&cli);
    match &cli.command {
        Commands::Folds { file, json } => handle_folds(file, *json, &config),
        Commands::Outline { file, json } => handle_outline(file, *json),
        Commands::Shift {
            file,
            carets,
            direction,
            write,
            json,
        } => handle_shift(file, carets, *direction, *write, *json),
    }
}
