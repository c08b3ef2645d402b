use std::path::PathBuf;

use anyhow::{Context, Result};
use arrow::util::pretty::pretty_format_batches;
use clap::{Parser, Subcommand};

use spectrus::data::export::{collect_dataset, export_file};
use spectrus::{
    encode_all, encode_library, read_encoded, read_files, BatchReport, DecodedRecord,
    FailurePolicy, LibraryConfig, SpectreFiles,
};

#[derive(Parser, Debug)]
#[command(name = "spectrus", version, about = "USGS Spectral Library v7 encoder")]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root directory for encoded records (overrides the config)
    #[arg(long, global = true)]
    output_root: Option<PathBuf>,

    /// Stop a batch at the first failing file
    #[arg(long, global = true)]
    abort_on_error: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode one category folder
    Encode {
        /// Folder holding the wavelength / bandpass files
        instruments_dir: PathBuf,
        /// Folder holding the reflectance files, e.g. ChapterM_Minerals
        measurements_dir: PathBuf,
    },
    /// Encode every category folder of a library root
    EncodeLibrary { root: PathBuf },
    /// Print a reflectance file joined with its calibration files
    Read {
        #[arg(long)]
        reflectance: PathBuf,
        #[arg(long)]
        wavelength: Option<PathBuf>,
        #[arg(long)]
        bandpass: Option<PathBuf>,
    },
    /// Print an encoded record
    ReadEncoded { path: PathBuf },
    /// Export the records of a category to .parquet, .json or .csv
    Export { category_dir: PathBuf, output: PathBuf },
}

fn load_config(cli: &Cli) -> Result<LibraryConfig> {
    let mut config = match &cli.config {
        Some(path) => LibraryConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LibraryConfig::default(),
    };
    if let Some(root) = &cli.output_root {
        config.output_root = root.clone();
    }
    if cli.abort_on_error {
        config.failure_policy = FailurePolicy::Abort;
    }
    Ok(config)
}

fn print_report(report: &BatchReport) {
    println!(
        "{}: {} encoded, {} unmatched, {} failed",
        report.category,
        report.encoded.len(),
        report.unmatched.len(),
        report.failures.len()
    );
    for e in &report.unmatched {
        println!("  unmatched: {e}");
    }
    for (path, e) in &report.failures {
        println!("  failed: {}: {e}", path.display());
    }
}

fn print_record(record: &DecodedRecord) -> Result<()> {
    println!("label: {}", record.label);
    println!("index: {}", record.index_name().unwrap_or_default());
    for line in &record.metadata {
        println!("  {line}");
    }
    println!("{}", pretty_format_batches(&[record.data.clone()])?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    log::debug!("config: {config:?}");

    match &cli.command {
        Command::Encode {
            instruments_dir,
            measurements_dir,
        } => {
            let report = encode_all(instruments_dir, measurements_dir, &config)?;
            print_report(&report);
        }
        Command::EncodeLibrary { root } => {
            for report in encode_library(root, &config)? {
                print_report(&report);
            }
        }
        Command::Read {
            reflectance,
            wavelength,
            bandpass,
        } => {
            let files =
                SpectreFiles::triple(reflectance.clone(), wavelength.clone(), bandpass.clone());
            print_record(&read_files(&files)?)?;
        }
        Command::ReadEncoded { path } => print_record(&read_encoded(path)?)?,
        Command::Export {
            category_dir,
            output,
        } => {
            let dataset = collect_dataset(category_dir)?;
            export_file(&dataset, output)
                .with_context(|| format!("exporting to {}", output.display()))?;
            println!("Wrote {} spectra to {}", dataset.len(), output.display());
        }
    }
    Ok(())
}
