use crate::config::{ImportConfig, Translation};
use crate::core::{validate as validate_calculator, FormulaTranslator, Importer, KnownIds};
use crate::error::{TabcalcError, TabcalcResult};
use crate::excel::{is_workbook, WorkbookReader};
use crate::parser::{self, slugify};
use crate::types::{ImportReport, ValidationReport};
use crate::writer::{self, DocumentFormat};
use colored::Colorize;
use std::fmt::Display;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Options of the import command
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Table file (`.tsv` text, `.xlsx` workbook, or `-` for stdin)
    pub input: PathBuf,
    /// Output document; JSON on stdout when absent
    pub output: Option<PathBuf>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub config: Option<PathBuf>,
    pub sheet: Option<String>,
    pub textual: bool,
    pub legacy_range_offset: bool,
    pub verbose: bool,
}

/// Status lines go to stdout, or to stderr when stdout carries the document
struct Console {
    stderr: bool,
}

impl Console {
    fn line(&self, text: impl Display) {
        if self.stderr {
            eprintln!("{}", text);
        } else {
            println!("{}", text);
        }
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Build the import configuration: file first, then command-line overrides
fn resolve_config(options: &ImportOptions) -> TabcalcResult<ImportConfig> {
    let mut config = match &options.config {
        Some(path) => ImportConfig::from_file(path)?,
        None => ImportConfig::default(),
    };

    if let Some(name) = &options.name {
        config.name = name.clone();
    }
    if let Some(description) = &options.description {
        config.description = description.clone();
    }
    if options.textual {
        config.translation = Translation::Textual;
    }
    if options.legacy_range_offset {
        config.legacy_range_offset = true;
    }

    // Unnamed calculators take the input file name
    if config.name.is_empty() && !is_stdin(&options.input) {
        if let Some(stem) = options.input.file_stem().and_then(|s| s.to_str()) {
            config.name = stem.to_string();
        }
    }

    Ok(config)
}

/// Read the table and run the import
fn run_import(importer: &Importer, options: &ImportOptions) -> TabcalcResult<ImportReport> {
    if is_stdin(&options.input) {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(importer.import_text(&text));
    }

    if is_workbook(&options.input) {
        let records = WorkbookReader::new(&options.input)
            .with_sheet(options.sheet.clone())
            .read_records()?;
        return Ok(importer.import_records(&records));
    }

    let text = fs::read_to_string(&options.input)?;
    Ok(importer.import_text(&text))
}

fn print_errors(console: &Console, report: &ValidationReport) {
    for error in &report.errors {
        console.line(format!("   ❌ {}", error).red());
    }
}

/// Execute the import command
pub fn import(options: ImportOptions) -> TabcalcResult<()> {
    let console = Console {
        stderr: options.output.is_none(),
    };

    console.line("📥 tabcalc - Importing table".bold().green());
    console.line(format!("   Input:  {}", options.input.display()));
    if let Some(output) = &options.output {
        console.line(format!("   Output: {}", output.display()));
    }

    let config = resolve_config(&options)?;
    if options.verbose {
        console.line(format!(
            "   Translation: {:?}, value column: {}",
            config.translation, config.value_column
        ));
    }
    console.line("");

    let importer = Importer::new(config)?;
    let report = run_import(&importer, &options)?;
    let calculator = &report.calculator;

    console.line(format!(
        "   Found {} cells ({} inputs, {} formulas)",
        calculator.cells.len(),
        calculator.inputs().count(),
        calculator.formulas().count()
    ));

    if options.verbose {
        for cell in &calculator.cells {
            match &cell.expression {
                Some(expression) => {
                    console.line(format!("      {} = {}", cell.id.bright_blue(), expression))
                }
                None => console.line(format!(
                    "      {} = {}",
                    cell.id.bright_blue(),
                    cell.value.map(|v| v.to_string()).unwrap_or_default()
                )),
            }
        }
    }

    if !report.warnings.is_empty() {
        console.line(format!("\n{}", format!("⚠️  {} warnings:", report.warnings.len()).yellow()));
        for warning in &report.warnings {
            console.line(format!("   {}", warning).yellow());
        }
    }

    match &options.output {
        Some(path) => writer::write_calculator(path, calculator)?,
        None => print!("{}", writer::render(calculator, DocumentFormat::Json)?),
    }

    let validation = validate_calculator(calculator);
    console.line("");
    if validation.valid {
        console.line("✅ Import complete, calculator is valid".bold().green());
        Ok(())
    } else {
        console.line(
            format!("❌ Calculator has {} validation errors", validation.errors.len())
                .bold()
                .red(),
        );
        print_errors(&console, &validation);
        Err(TabcalcError::Validation(format!(
            "{} validation errors",
            validation.errors.len()
        )))
    }
}

/// Execute the validate command
pub fn validate(files: Vec<PathBuf>) -> TabcalcResult<()> {
    let console = Console { stderr: false };
    let mut invalid = 0;

    for file in &files {
        console.line(format!("{} {}", "🔍 Validating".bold().green(), file.display()));

        let calculator = match parser::load_calculator(file) {
            Ok(calculator) => calculator,
            Err(e) => {
                console.line(format!("   ❌ {}", e).red());
                invalid += 1;
                continue;
            }
        };

        let report = validate_calculator(&calculator);
        if report.valid {
            console.line(format!("   ✅ Valid ({} cells)", calculator.cells.len()).green());
        } else {
            print_errors(&console, &report);
            invalid += 1;
        }
    }

    console.line("");
    if invalid == 0 {
        console.line(format!("✅ All {} files are valid!", files.len()).bold().green());
        Ok(())
    } else {
        console.line(
            format!("❌ {} of {} files are invalid", invalid, files.len())
                .bold()
                .red(),
        );
        Err(TabcalcError::Validation(format!(
            "{} of {} files are invalid",
            invalid,
            files.len()
        )))
    }
}

/// Execute the translate command
///
/// `labels` are the row labels in table order (row 2 first).
pub fn translate(formula: String, labels: Vec<String>, textual: bool) -> TabcalcResult<()> {
    let config = ImportConfig {
        translation: if textual {
            Translation::Textual
        } else {
            Translation::Structured
        },
        ..ImportConfig::default()
    };
    let translator = FormulaTranslator::new(&config)?;

    let mut known = KnownIds::new();
    for (index, label) in labels.iter().enumerate() {
        known.assign(index, slugify(label));
    }

    let mut warnings = Vec::new();
    let expression = translator.translate(&formula, &known, &mut warnings);

    for warning in &warnings {
        eprintln!("{}", format!("⚠️  {}", warning).yellow());
    }
    println!("{}", expression);
    Ok(())
}
