use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// provsheet - normalize spreadsheet credential exports for provisioning
#[derive(Parser)]
#[command(name = "provsheet")]
#[command(about = "Convert spreadsheet credential exports into a normalized provisioning dataset")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract and normalize an export into a JSON document
    Extract {
        /// Path to the delimited export file
        #[arg(short, long)]
        input: PathBuf,

        /// Path to write the normalized JSON document to
        #[arg(short, long)]
        output: PathBuf,

        /// Header shape (auto, legacy, matrix)
        #[arg(short, long, default_value = "auto")]
        shape: String,

        /// Field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Detect and print the column schema without extracting
    Inspect {
        /// Path to the delimited export file
        #[arg(short, long)]
        input: PathBuf,

        /// Header shape (auto, legacy, matrix)
        #[arg(short, long, default_value = "auto")]
        shape: String,

        /// Field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,
    },
    /// Re-validate a previously generated JSON document
    Validate {
        /// Path to the document to validate
        document: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
