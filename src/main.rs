use anyhow::Context;
use clap::{Parser, Subcommand};
use fse_enhance::cli::{self, AugmentOptions, OutputFormat};
use fse_enhance::config::MissingColumnPolicy;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fse-enhance")]
#[command(about = "Price per NM metrics for FS Economy assignment tables")]
#[command(long_about = "fse-enhance - FS Economy assignment table metrics

Reads a saved FS Economy page and appends to every assignment/hold table:
  Price per nm/qty       - pay / passengers (77 kg each) or units / NM
  Total per destination  - (--aggregate) pay summed per destination, best sum per NM highlighted

COMMANDS:
  augment  - Compute the metrics and write the augmented tables
  inspect  - Show which tables and columns would be used
  watch    - Re-run augment whenever the page file changes

EXAMPLES:
  fse-enhance augment assignments.html -o enhanced.html
  fse-enhance augment assignments.html --aggregate --format json
  fse-enhance inspect assignments.html")]
#[command(version)]
struct Cli {
    /// Log engine diagnostics (same as RUST_LOG=fse_enhance=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Compute the per-row metric (and optionally per-destination totals)
and write the augmented tables.

Tables are picked by class (assignmentTable, assigmentTable, holdTable) and
must have Pay, NM and Cargo columns; --aggregate also needs Dest.

MISSING COLUMNS:
  --policy skip   leave that table alone and continue (default)
  --policy abort  fail the whole run

Use '-' as input to read the page from stdin. Without -o the result goes to stdout.")]
    /// Compute metrics and write the augmented tables
    Augment {
        /// Saved HTML page ('-' for stdin)
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// YAML engine config
        #[arg(short, long, env = "FSE_ENHANCE_CONFIG")]
        config: Option<PathBuf>,

        /// Add per-destination totals
        #[arg(short, long)]
        aggregate: bool,

        /// What to do with a table missing a required column
        #[arg(long, value_enum)]
        policy: Option<MissingColumnPolicy>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Html)]
        format: OutputFormat,

        /// Compute and report without writing output
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Show which tables and columns the engine would use
    Inspect {
        /// Saved HTML page ('-' for stdin)
        input: PathBuf,

        /// YAML engine config
        #[arg(short, long, env = "FSE_ENHANCE_CONFIG")]
        config: Option<PathBuf>,
    },

    #[command(long_about = "Watch a saved page and re-run augment on every change.

Press Ctrl+C to stop watching.")]
    /// Re-run augment whenever the page changes
    Watch {
        /// Saved HTML page
        input: PathBuf,

        /// Output file, rewritten on every change
        #[arg(short, long)]
        output: PathBuf,

        /// YAML engine config
        #[arg(short, long, env = "FSE_ENHANCE_CONFIG")]
        config: Option<PathBuf>,

        /// Add per-destination totals
        #[arg(short, long)]
        aggregate: bool,

        /// What to do with a table missing a required column
        #[arg(long, value_enum)]
        policy: Option<MissingColumnPolicy>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Html)]
        format: OutputFormat,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "fse_enhance=debug"
    } else {
        "fse_enhance=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Augment {
            input,
            output,
            config,
            aggregate,
            policy,
            format,
            dry_run,
        } => {
            let opts = AugmentOptions {
                config,
                aggregate,
                policy,
                format,
                dry_run,
                verbose: cli.verbose,
            };
            cli::augment(input.clone(), output, &opts)
                .with_context(|| format!("augmenting {}", input.display()))
        }

        Commands::Inspect { input, config } => cli::inspect(input.clone(), config)
            .with_context(|| format!("inspecting {}", input.display())),

        Commands::Watch {
            input,
            output,
            config,
            aggregate,
            policy,
            format,
        } => {
            let opts = AugmentOptions {
                config,
                aggregate,
                policy,
                format,
                dry_run: false,
                verbose: cli.verbose,
            };
            cli::watch(input, output, &opts).context("watch mode")
        }
    }
}
