use crate::config::{EngineConfig, MissingColumnPolicy};
use crate::core::binder::resolve_column;
use crate::core::{EnhanceReport, Enhancer, TableStatus};
use crate::error::{EnhanceError, EnhanceResult};
use crate::parser;
use crate::types::Table;
use crate::writer;
use clap::ValueEnum;
use colored::Colorize;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

/// Output written by `augment`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// The input page with its tables augmented
    #[default]
    Html,
    /// JSON report of the computed values
    Json,
}

/// Options shared by `augment` and `watch`
#[derive(Debug, Clone, Default)]
pub struct AugmentOptions {
    pub config: Option<PathBuf>,
    pub aggregate: bool,
    pub policy: Option<MissingColumnPolicy>,
    pub format: OutputFormat,
    pub dry_run: bool,
    pub verbose: bool,
}

/// Load the config file (if any) and apply command line overrides
pub fn load_config(
    path: Option<&Path>,
    aggregate: bool,
    policy: Option<MissingColumnPolicy>,
) -> EnhanceResult<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if aggregate {
        config.aggregate_destinations = true;
    }
    if let Some(policy) = policy {
        config.missing_column_policy = policy;
    }
    Ok(config)
}

/// Read the page, `-` meaning stdin
fn read_input(path: &Path) -> EnhanceResult<String> {
    if path.as_os_str() == "-" {
        let mut html = String::new();
        std::io::stdin().read_to_string(&mut html)?;
        return Ok(html);
    }
    if !path.exists() {
        return Err(EnhanceError::Parse(format!(
            "File not found: {}",
            path.display()
        )));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Run the engine to completion on a single-threaded runtime
fn run_engine(config: EngineConfig, html: &str) -> EnhanceResult<(Vec<Table>, EnhanceReport)> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(Enhancer::new(config).enhance_html(html))
}

fn print_report(report: &EnhanceReport) {
    for table in &report.tables {
        match &table.status {
            TableStatus::Augmented => {
                eprintln!(
                    "   📊 Table #{} ({}): {} rows, {} destinations",
                    table.position,
                    table.kind.bright_blue().bold(),
                    table.rows.len(),
                    table.groups.len()
                );
            }
            TableStatus::Skipped { missing_column } => {
                eprintln!(
                    "   ⏭️  Table #{} ({}): skipped, no '{}' column",
                    table.position,
                    table.kind.bright_blue(),
                    missing_column.yellow()
                );
            }
        }
    }
}

/// Execute the augment command
pub fn augment(
    input: PathBuf,
    output: Option<PathBuf>,
    opts: &AugmentOptions,
) -> EnhanceResult<()> {
    eprintln!("{}", "✈️  fse-enhance - Augmenting tables".bold().green());
    eprintln!("   Input: {}", input.display());
    if opts.dry_run {
        eprintln!("{}", "📋 DRY RUN MODE - No output will be written".yellow());
    }
    eprintln!();

    let config = load_config(opts.config.as_deref(), opts.aggregate, opts.policy)?;
    if opts.verbose {
        eprintln!(
            "   Classes: {} | aggregate: {} | missing columns: {:?}",
            config.recognized_classes.join(", ").cyan(),
            config.aggregate_destinations,
            config.missing_column_policy
        );
    }

    let html = read_input(&input)?;
    let (tables, report) = run_engine(config, &html)?;

    if report.tables.is_empty() {
        eprintln!("{}", "⚠️  No assignment or hold tables found".yellow());
    } else {
        print_report(&report);
    }
    eprintln!(
        "{} {} augmented, {} skipped, {} rows",
        "✅".green(),
        report.augmented(),
        report.skipped(),
        report.rows()
    );

    if opts.dry_run {
        return Ok(());
    }

    let rendered = match opts.format {
        OutputFormat::Html => writer::render_page(&html, &tables)?,
        OutputFormat::Json => writer::render_json(&report)?,
    };
    match output {
        Some(path) => {
            writer::write_output(&path, &rendered)?;
            eprintln!("   Wrote {}", path.display().to_string().bold());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

/// Execute the inspect command - show what the engine would work on
pub fn inspect(input: PathBuf, config: Option<PathBuf>) -> EnhanceResult<()> {
    let config = load_config(config.as_deref(), false, None)?;
    let html = read_input(&input)?;
    let tables = parser::parse_tables(&html)?;

    println!("{}", "🔍 fse-enhance - Table inspection".bold().green());
    println!("   File: {}", input.display());
    println!("   Tables on page: {}\n", tables.len());

    let names = [
        ("pay", &config.columns.pay),
        ("distance", &config.columns.distance),
        ("cargo", &config.columns.cargo),
        ("destination", &config.columns.destination),
    ];

    let mut candidates = 0;
    for table in &tables {
        if !parser::is_candidate(table, &config.recognized_classes) {
            continue;
        }
        candidates += 1;
        let kind = table
            .kind(&config.recognized_classes)
            .map(|k| k.label().to_string())
            .unwrap_or_default();
        println!(
            "   📊 Table #{} ({}) - {} rows",
            table.position,
            kind.bright_blue().bold(),
            table.row_count()
        );
        for (label, name) in &names {
            match resolve_column(table, name) {
                Some(index) => println!("      {label:<12} '{name}' → column {index}"),
                None => println!("      {label:<12} '{name}' → {}", "missing".red()),
            }
        }
        if let Err(msg) = table.validate_widths() {
            println!("      {} {}", "⚠️".yellow(), msg);
        }
    }

    if candidates == 0 {
        println!("{}", "   No assignment or hold tables found".yellow());
    }
    Ok(())
}

/// Execute the watch command - re-run augment whenever the input changes
pub fn watch(input: PathBuf, output: PathBuf, opts: &AugmentOptions) -> EnhanceResult<()> {
    println!("{}", "👁️  fse-enhance - Watch Mode".bold().green());
    println!("   Watching: {}", input.display());
    println!("   Output: {}", output.display());
    println!("   Press {} to stop\n", "Ctrl+C".bold().yellow());

    if !input.exists() {
        return Err(EnhanceError::Watch(format!(
            "File not found: {}",
            input.display()
        )));
    }

    let canonical_path = input.canonicalize()?;
    let parent_dir = canonical_path
        .parent()
        .ok_or_else(|| EnhanceError::Watch("Cannot determine parent directory".to_string()))?;

    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(Duration::from_millis(200), tx)
        .map_err(|e| EnhanceError::Watch(format!("Failed to create file watcher: {}", e)))?;
    debouncer
        .watcher()
        .watch(parent_dir, RecursiveMode::NonRecursive)
        .map_err(|e| EnhanceError::Watch(format!("Failed to watch directory: {}", e)))?;

    println!("{}", "🔄 Initial run...".cyan());
    run_watch_action(&input, &output, opts);
    println!();

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().any(|event| {
                    event.kind == DebouncedEventKind::Any
                        && event
                            .path
                            .canonicalize()
                            .map(|p| p == canonical_path)
                            .unwrap_or(false)
                });
                if relevant {
                    println!("\n{}", "🔄 Change detected".cyan());
                    run_watch_action(&input, &output, opts);
                    println!();
                }
            }
            Ok(Err(error)) => {
                eprintln!("{} Watch error: {}", "❌".red(), error);
            }
            Err(e) => {
                eprintln!("{} Channel error: {}", "❌".red(), e);
                break;
            }
        }
    }

    Ok(())
}

fn run_watch_action(input: &Path, output: &Path, opts: &AugmentOptions) {
    match augment(input.to_path_buf(), Some(output.to_path_buf()), opts) {
        Ok(()) => println!("{}", "✅ Output updated".bold().green()),
        Err(e) => println!("{} {}", "❌ Augment failed:".bold().red(), e),
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
