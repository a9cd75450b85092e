use clap::{Parser, Subcommand};
use royalbit_tabcalc::cli::{self, ImportOptions};
use royalbit_tabcalc::error::TabcalcResult;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tabcalc")]
#[command(about = "Turn spreadsheet-style calculator tables into cell graphs.")]
#[command(long_about = "tabcalc - Spreadsheet table → calculator cell graph

Reads a parametric calculator written as a table (one row per variable:
label, value, unit, min, max, step) and produces a JSON/YAML calculator
whose formula cells reference other cells by identifier.

COMMANDS:
  import     - Table (.tsv, .xlsx, stdin) to calculator JSON/YAML
  validate   - Check calculator documents for structural errors
  translate  - Translate a single formula (debug aid)

EXAMPLES:
  tabcalc import tank.tsv -o tank.json
  pbpaste | tabcalc import - --name \"Tank\" > tank.json
  tabcalc import tank.xlsx --sheet Sizing -o tank.yaml
  tabcalc validate tank.json other.yaml
  tabcalc translate \"=PI()*B2^2\" --labels Diamètre")]
#[command(version)]
struct Cli {
    /// Show debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Import a calculator table.

TABLE LAYOUT:
  Row 1 is a header. Each following row is one cell:
    label <TAB> value <TAB> unit <TAB> min <TAB> max <TAB> step

  A numeric value makes an input cell. A value starting with '=' is a
  formula; references to column B (B2, B3, ...) become cell identifiers
  derived from the labels (\"Diamètre\" → diametre).

  =PI()*B2^2       →  Math.PI * diametre ** 2
  =SUM(B2:B4)      →  (a + b + c)
  =IF(B2>1,B2,0)   →  (a > 1 ? a : 0)

OUTPUT:
  Without -o, JSON is written to stdout and messages go to stderr.
  With -o, the format follows the extension (.json, .yaml, .yml).

Exits with an error when the resulting calculator fails validation.")]
    /// Import a table into a calculator document
    Import {
        /// Table file: .tsv text, .xlsx workbook, or '-' for stdin
        input: PathBuf,

        /// Output file (.json or .yaml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Calculator name (defaults to the input file name)
        #[arg(long)]
        name: Option<String>,

        /// Calculator description
        #[arg(long)]
        description: Option<String>,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Worksheet to read from a workbook (defaults to the first)
        #[arg(long)]
        sheet: Option<String>,

        /// Use textual formula rewriting instead of parsing
        #[arg(long)]
        textual: bool,

        /// Resolve SUM ranges with the historic row - 1 convention
        #[arg(long)]
        legacy_range_offset: bool,
    },

    #[command(long_about = "Validate calculator documents.

Checks every cell for a unique id, a label, a known kind, a value (inputs)
and an expression (formulas). All problems are reported, not just the
first one.

BATCH VALIDATION:
  tabcalc validate a.json b.yaml c.json")]
    /// Validate calculator documents (JSON or YAML)
    Validate {
        /// Calculator file(s) to validate
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Translate one formula against a list of row labels
    Translate {
        /// Formula, e.g. "=PI()*B2^2"
        formula: String,

        /// Row labels in table order, starting at row 2
        #[arg(short, long, value_delimiter = ',')]
        labels: Vec<String>,

        /// Use textual formula rewriting instead of parsing
        #[arg(long)]
        textual: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "royalbit_tabcalc=debug"
    } else {
        // Import warnings are printed by the commands themselves
        "royalbit_tabcalc=error"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> TabcalcResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Import {
            input,
            output,
            name,
            description,
            config,
            sheet,
            textual,
            legacy_range_offset,
        } => cli::import(ImportOptions {
            input,
            output,
            name,
            description,
            config,
            sheet,
            textual,
            legacy_range_offset,
            verbose: cli.verbose,
        }),

        Commands::Validate { files } => cli::validate(files),

        Commands::Translate {
            formula,
            labels,
            textual,
        } => cli::translate(formula, labels, textual),
    }
}
