use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "avs3probe")]
#[command(author, version, about = "Raw AVS3 video stream detection and inspection")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a file as a raw AVS3 stream
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the start codes found in a file
    Units {
        /// File to scan
        #[arg(required = true)]
        file: PathBuf,

        /// Stop after this many start codes
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Detect the format and split the file into packets
    Demux {
        /// File to demux
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
