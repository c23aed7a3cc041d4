use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use ncreport_engine::{
    build_report_with, load_record_sets_from_dir, AggregateOptions, Diagnostic, DuplicatePolicy,
};
use ncreport_model::ReportBook;

#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Summary,
}

#[derive(Clone, Debug, ValueEnum)]
enum DuplicateArg {
    LastWins,
    KeepFirst,
}

/// CLI arguments for the `ncreport` binary.
///
/// This lives in the library crate so integration tests can call
/// [`run_with_args`] without spawning a process.
#[derive(Parser)]
#[command(
    about = "Build a nonconformance condition report from a directory of CSV record sets."
)]
pub struct Args {
    /// Directory containing `Conditions.csv`, `Parts.csv`, etc. Missing files
    /// are treated as empty record sets.
    input: PathBuf,

    /// Write the report document here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Policy for duplicate condition numbers in the `Conditions` set.
    #[arg(long, value_enum, default_value_t = DuplicateArg::LastWins)]
    duplicates: DuplicateArg,

    /// Exit non-zero when aggregation produced any diagnostics.
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    book: &'a ReportBook,
    diagnostics: &'a [Diagnostic],
    unrecognized_files: &'a [String],
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let code = run_with_args(args)?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Execute with parsed arguments, returning the intended process exit code.
pub fn run_with_args(args: Args) -> Result<i32> {
    let (sets, unrecognized_files) = load_record_sets_from_dir(&args.input)
        .with_context(|| format!("load record sets from {}", args.input.display()))?;

    let options = AggregateOptions {
        duplicates: match args.duplicates {
            DuplicateArg::LastWins => DuplicatePolicy::LastWriteWins,
            DuplicateArg::KeepFirst => DuplicatePolicy::KeepFirst,
        },
    };

    let mut book = ReportBook::new();
    let diagnostics = build_report_with(&mut book, &sets, &options);

    for name in &unrecognized_files {
        eprintln!("warning: ignoring unrecognized record set file '{name}.csv'");
    }
    for diagnostic in &diagnostics {
        eprintln!("warning: {diagnostic}");
    }

    match args.format {
        OutputFormat::Json => {
            let report = JsonReport {
                book: &book,
                diagnostics: &diagnostics,
                unrecognized_files: &unrecognized_files,
            };
            match &args.output {
                Some(path) => {
                    let file = std::fs::File::create(path)
                        .with_context(|| format!("create {}", path.display()))?;
                    let mut writer = std::io::BufWriter::new(file);
                    serde_json::to_writer_pretty(&mut writer, &report)?;
                    writer.write_all(b"\n")?;
                }
                None => {
                    let stdout = std::io::stdout();
                    let mut handle = stdout.lock();
                    serde_json::to_writer_pretty(&mut handle, &report)?;
                    handle.write_all(b"\n")?;
                }
            }
        }
        OutputFormat::Summary => {
            let doc = book
                .documents
                .first()
                .expect("build_report always produces a document");
            println!("report: {}", doc.name);
            println!("  regions: {}", doc.regions.len());
            println!("  rows: {}", doc.used_rows());
            println!("  diagnostics: {}", diagnostics.len());
        }
    }

    if args.strict && !diagnostics.is_empty() {
        return Ok(1);
    }
    Ok(0)
}
