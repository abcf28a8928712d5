use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Look up who currently holds a role at a company", long_about = None)]
pub struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Lookup service base URL (overrides config and SCOUT_API_BASE_URL)
    #[arg(long, global = true)]
    pub api: Option<String>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up one company / role pair
    Lookup {
        #[arg(long)]
        company: String,
        #[arg(long)]
        role: String,
        /// Also fetch the PDF report for the result
        #[arg(long)]
        pdf: bool,
    },
    /// Run lookups for every row of a CSV with "Title" and "Company Name" columns
    Batch {
        file: PathBuf,
        /// Row cap for this run (defaults to max_batch_rows)
        #[arg(long)]
        max_rows: Option<usize>,
        /// Also download the CSV companion report
        #[arg(long)]
        csv: bool,
        /// Generate the report but only print its URL
        #[arg(long)]
        no_download: bool,
    },
}
