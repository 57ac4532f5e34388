use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "class-dumper")]
#[command(about = "Dump class, method and field declarations from compiled class files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log filter, e.g. `debug` or `class_dumper=trace`. Overrides CLASS_DUMPER_LOG.
    #[arg(long, value_name = "FILTER", global = true)]
    pub log: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Walk a directory or jar and write one line per declared symbol.
    Dump {
        #[arg(value_name = "ROOT")]
        root: PathBuf,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Relative path prefix to include; repeatable.
        #[arg(short = 'p', long = "prefix", value_name = "PREFIX")]
        prefixes: Vec<String>,

        /// Include every `.class` file regardless of prefix.
        #[arg(long, conflicts_with = "prefixes")]
        all: bool,

        #[arg(short = 'f', long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,

        /// Skip unreadable or malformed class files instead of aborting.
        #[arg(long)]
        keep_going: bool,

        /// Parse class files on a thread pool.
        #[arg(long)]
        parallel: bool,
    },
    /// Print the symbol lines of a single class file.
    Inspect {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(short = 'f', long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}
