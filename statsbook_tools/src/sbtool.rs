//! Command-line stand-in for the desktop shell: read a workbook grid
//! dump, run the engine, print the diagnostic report, optionally write
//! the derbyJSON game record.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use statsbook::{parse_workbook, Category, InMemoryGrid};

#[derive(Parser)]
#[command(
    name = "sbtool",
    about = "Transform a statsbook grid dump into derbyJSON plus an error report"
)]
struct Args {
    /// Workbook grid dump (JSON: {"Sheet": {"A1": value, ...}, ...})
    workbook: PathBuf,

    /// Write the derbyJSON game record to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the error summary as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let text = fs::read_to_string(&args.workbook)
        .with_context(|| format!("reading {}", args.workbook.display()))?;
    let grid: InMemoryGrid =
        serde_json::from_str(&text).context("workbook dump is not valid grid JSON")?;

    let filename = args
        .workbook
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.workbook.display().to_string());

    let parsed = parse_workbook(&grid, &filename)?;

    println!("Filename: {}", parsed.summary.filename);
    println!("SB Version: {}", parsed.summary.version);
    println!();

    if let Some(output) = &args.output {
        fs::write(output, serde_json::to_string_pretty(&parsed.game)?)
            .with_context(|| format!("writing {}", output.display()))?;
        println!("Game record written to {}", output.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&parsed.errors)?);
        return Ok(());
    }

    if parsed.errors.is_clean() {
        println!("No errors found!");
        return Ok(());
    }

    for category in Category::ALL {
        let flagged: Vec<_> = parsed
            .errors
            .category(category)
            .filter(|(_, entry)| !entry.events.is_empty())
            .collect();
        if flagged.is_empty() {
            continue;
        }

        println!("=== {} ===", category.heading());
        for (_, entry) in flagged {
            println!("{}", entry.description);
            for event in &entry.events {
                println!("    {event}");
            }
        }
        println!();
    }

    Ok(())
}
