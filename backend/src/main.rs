//! Funnel CLI - Olist sales funnel cleaning and dashboard
//!
//! ```bash
//! funnel serve                                  # Start HTTP server (port 3000)
//! funnel parse leads.csv                        # Inspect one CSV
//! funnel clean leads.csv deals.csv --out-dir out
//! funnel report leads.csv deals.csv --segment pet --start 2018-01-01
//! ```

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use funnel::clean::{format_delimiter, write_tables};
use funnel::{
    classify, clean_paths, parse_csv_file_auto, recompute, BatchReport, Filters, ServerConfig,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "funnel")]
#[command(about = "Clean Olist marketing funnel exports and compute dashboard metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on (overrides FUNNEL_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Parse a CSV file and describe it
    Parse {
        /// Input CSV file
        input: PathBuf,
    },

    /// Clean a batch of CSV files
    Clean {
        /// Input CSV files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Write the cleaned tables as CSV into this directory
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Clean a batch and print the dashboard snapshot as JSON
    Report {
        /// Input CSV files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// First day of the date range (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day of the date range (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Business segment to keep; repeat for several (default: all)
        #[arg(long = "segment")]
        segments: Vec<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { port } => cmd_serve(port).await,
        Commands::Parse { input } => cmd_parse(&input),
        Commands::Clean { inputs, out_dir } => cmd_clean(&inputs, out_dir.as_deref()),
        Commands::Report {
            inputs,
            start,
            end,
            segments,
            output,
        } => {
            let filters = Filters {
                start_date: start,
                end_date: end,
                segments: (!segments.is_empty()).then_some(segments),
            };
            cmd_report(&inputs, &filters, output.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ServerConfig::from_env()?;
    if let Some(port) = port {
        config = config.with_port(port);
    }
    funnel::server::start_server(config).await
}

fn cmd_parse(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let result = parse_csv_file_auto(input)?;

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(result.delimiter));
    eprintln!("   Columns: {}", result.table.headers.join(", "));
    match classify(&result.table) {
        Some(kind) => eprintln!("   Kind: {}", kind),
        None => eprintln!("   Kind: unrecognized (would be ignored)"),
    }
    eprintln!("✅ Parsed {} rows", result.table.len());

    Ok(())
}

fn cmd_clean(inputs: &[PathBuf], out_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🧹 Cleaning {} file(s)", inputs.len());

    let report = clean_paths(inputs)?;
    print_summary(&report);

    if let Some(dir) = out_dir {
        for path in write_tables(&report.tables, dir)? {
            eprintln!("   💾 {}", path.display());
        }
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_report(
    inputs: &[PathBuf],
    filters: &Filters,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = clean_paths(inputs)?;
    print_summary(&report);

    let snapshot = recompute(&report.tables, filters);
    eprintln!(
        "\n📊 {} MQLs, {} closed deals, {:.2}% conversion",
        snapshot.kpis.total_mqls, snapshot.kpis.closed_deals, snapshot.kpis.conversion_rate
    );

    let json = serde_json::to_string_pretty(&snapshot)?;
    write_output(&json, output)?;

    Ok(())
}

fn print_summary(report: &BatchReport) {
    eprintln!();
    for file in &report.files {
        match (file.kind, file.clean_rows) {
            (Some(kind), Some(rows)) => eprintln!(
                "   {} → {} ({} rows, {} after cleaning)",
                file.name, kind, file.raw_rows, rows
            ),
            _ => eprintln!("   {} → ignored", file.name),
        }
    }
    if let Some(merged) = &report.tables.merged {
        eprintln!("   🔗 merged: {} rows", merged.len());
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
