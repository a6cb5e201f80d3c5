use std::path::PathBuf;
use clap::{Parser, Subcommand};

/// Splits a file into parts plus one XOR parity part, and joins them back.
/// Any single lost part, parity included, can be rebuilt during the join.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log per-part progress (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print the operation report as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a file into data parts and a parity part
    Split {
        /// Number of data parts (2-999)
        // kept as text so a bad number maps to the part count exit code
        #[arg(value_name = "PARTS")]
        parts: String,

        /// File to split
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Directory the parts are written to, created if missing
        #[arg(value_name = "OUTPUT_DIR")]
        output_dir: PathBuf,
    },
    /// Rebuild the original file from its parts
    Join {
        /// A directory holding the parts, or one part file to pick its set
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Where to write the rebuilt file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },
}
