use anyhow::Result;
use clap::Parser;
use log::info;
use shutter_inspector::report::{self, Summary};
use shutter_inspector::{compare_files, Analyzer, AppConfig, AppError, ExifTool, MetadataBackend};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

/// Honest EXIF inspector for checking camera shutter mileage.
///
/// Many cameras (most Canon bodies among them) never write a shutter count
/// into their files; for those the count cannot be read from a photo.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// File or directory to analyze
    path: PathBuf,

    /// Save results to a JSON file
    #[arg(long = "json", value_name = "OUT")]
    json_output: Option<PathBuf>,

    /// Save results to a CSV file
    #[arg(long = "csv", value_name = "OUT")]
    csv_output: Option<PathBuf>,

    /// Human-readable console output
    #[arg(long)]
    pretty: bool,

    /// Include the raw ExifTool tag map in the JSON output
    #[arg(long)]
    raw_exif: bool,

    /// Compare against another file (seller check)
    #[arg(long = "compare", value_name = "FILE")]
    compare_file: Option<PathBuf>,

    /// Path to the ExifTool executable
    #[arg(long = "exiftool", value_name = "PATH")]
    exiftool: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = AppConfig::new()?;
    if let Some(exiftool) = &cli.exiftool {
        config.exiftool_path = exiftool.clone();
    }

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        config.log_level.parse().unwrap_or(log::LevelFilter::Info)
    };
    env_logger::Builder::new().filter_level(level).init();

    info!("Starting shutter-inspector");

    let exiftool = match ExifTool::probe(&config) {
        Ok(exiftool) => exiftool,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    println!("ExifTool version: {}", exiftool.version());

    let backend: Arc<dyn MetadataBackend> = Arc::new(exiftool);
    let analyzer = Analyzer::new(Arc::new(config), backend)?;

    if let Some(other) = &cli.compare_file {
        if let Err(e) = check_compare_target(&cli.path) {
            eprintln!("ERROR: {}", e);
            return Ok(ExitCode::FAILURE);
        }
        let result = compare_files(&analyzer, &cli.path, other);
        println!("{}", report::format_comparison_pretty(&result));
        if let Some(out) = &cli.json_output {
            report::save_comparison_json(&result, out)?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    let analyses = if cli.path.is_file() {
        vec![analyzer.analyze_file(&cli.path, cli.raw_exif)]
    } else if cli.path.is_dir() {
        analyzer.analyze_directory(&cli.path, cli.raw_exif)?
    } else {
        eprintln!("ERROR: {}", AppError::NotFound(cli.path.display().to_string()));
        return Ok(ExitCode::FAILURE);
    };

    if analyses.is_empty() {
        println!("No supported files found");
        return Ok(ExitCode::SUCCESS);
    }

    if cli.pretty || (cli.json_output.is_none() && cli.csv_output.is_none()) {
        for analysis in &analyses {
            println!("{}", report::format_analysis_pretty(analysis));
            println!();
        }
    }
    if let Some(out) = &cli.json_output {
        report::save_json(&analyses, out)?;
        println!("Saved to {:?}", out);
    }
    if let Some(out) = &cli.csv_output {
        report::save_csv(&analyses, out)?;
        println!("Saved to {:?}", out);
    }

    println!("{}", Summary::from_analyses(&analyses));
    info!("shutter-inspector finished");
    Ok(ExitCode::SUCCESS)
}

fn check_compare_target(path: &Path) -> Result<(), AppError> {
    if !path.exists() {
        return Err(AppError::NotFound(path.display().to_string()));
    }
    if !path.is_file() {
        return Err(AppError::Generic(format!(
            "Comparison needs a file, not a directory: {}",
            path.display()
        )));
    }
    Ok(())
}
