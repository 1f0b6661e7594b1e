//! skillsheet CLI - batch conversion of assessment payloads to Excel.

use anyhow::{bail, Context};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use skillsheet::pipeline::{process_file, zip_outputs, BatchFailure, BatchOutcome, Mode};

#[derive(Parser)]
#[command(name = "skillsheet")]
#[command(version = "0.1.0")]
#[command(about = "Convert interview-assessment JSON payloads into templated Excel workbooks", long_about = None)]
struct Cli {
    /// Input payload files (.txt with a JSON record)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Template workbook supplying the Task/Skill sheets
    #[arg(short, long)]
    template: PathBuf,

    /// Operating mode
    #[arg(short, long, value_enum, default_value = "non-track")]
    mode: Mode,

    /// Directory for the generated workbooks
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Also bundle all outputs into a zip archive at this path
    #[arg(long)]
    zip: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "skillsheet=debug,info"
    } else {
        "skillsheet=info,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let template_bytes = std::fs::read(&cli.template)
        .with_context(|| format!("failed to read template {}", cli.template.display()))?;

    let mut files = Vec::with_capacity(cli.inputs.len());
    for path in &cli.inputs {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read input {}", path.display()))?;
        files.push((name, bytes));
    }

    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("failed to create {}", cli.out_dir.display()))?;

    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("valid progress template"),
    );
    bar.set_message("converting");

    let mut outcome = BatchOutcome::default();
    for (name, bytes) in &files {
        match process_file(name, bytes, &template_bytes, cli.mode) {
            Ok(converted) => outcome.outputs.push(converted),
            Err(e) => outcome.failures.push(BatchFailure {
                file: name.clone(),
                message: e.to_string(),
            }),
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    for converted in &outcome.outputs {
        let path = cli.out_dir.join(&converted.name);
        std::fs::write(&path, &converted.bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("{} {}", "created".green().bold(), path.display());
    }

    if let Some(zip_path) = &cli.zip {
        if outcome.outputs.is_empty() {
            eprintln!("{} nothing to bundle", "warning:".yellow().bold());
        } else {
            let bytes = zip_outputs(&outcome.outputs)?;
            std::fs::write(zip_path, bytes)
                .with_context(|| format!("failed to write {}", zip_path.display()))?;
            println!("{} {}", "bundled".green().bold(), zip_path.display());
        }
    }

    if !outcome.failures.is_empty() {
        eprintln!(
            "{} {} file(s) failed to convert",
            "warning:".yellow().bold(),
            outcome.failures.len()
        );
        for failure in &outcome.failures {
            eprintln!("  {} {}", failure.file.yellow(), failure.message);
        }
    }

    println!(
        "{} {} converted, {} failed",
        "done:".bold(),
        outcome.outputs.len(),
        outcome.failures.len()
    );

    if outcome.outputs.is_empty() {
        bail!("no file converted successfully");
    }
    Ok(())
}
