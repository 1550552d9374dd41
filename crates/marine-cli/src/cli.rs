//! CLI argument definitions using clap
//!
//! This module contains all the clap structs for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Marine Insights - ocean, fisheries and biodiversity analytics client
#[derive(Parser)]
#[command(name = "marine")]
#[command(about = "Client for the Marine Insights analytics backend", long_about = None)]
#[command(version)]
pub struct Cli {
    /// API base prefix: an absolute URL or a path prefix such as /api
    #[arg(long, env = "MARINE_API_BASE", global = true)]
    pub api_base: Option<String>,

    /// Origin that origin-relative requests are sent to
    #[arg(long, global = true)]
    pub origin: Option<String>,

    /// Config file (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Use the offline mock backend instead of the network
    #[arg(long, global = true)]
    pub mock: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a fish image (falls back to alternate endpoints, then a mock result)
    Classify {
        /// Image file (jpg, png, webp)
        image: PathBuf,
    },

    /// Analyze stock vs catch volumes for overfishing
    Overfishing {
        /// CSV with Date, Stock_Volume, Catch_Volume columns
        csv: PathBuf,
    },

    /// Predict chlorophyll from depth, salinity and pH readings
    Chlorophyll {
        /// CSV with depth, salinity, ph (and optionally chlorophyll) columns
        csv: PathBuf,
    },

    /// Forecast sea surface temperature
    Sst {
        /// CSV with date, value columns
        #[arg(required_unless_present = "hint")]
        csv: Option<PathBuf>,

        /// Show the backend's upload instructions instead
        #[arg(long)]
        hint: bool,
    },

    /// Analyze an eDNA sequence file and optionally ask about the species
    Edna {
        /// FASTA or FASTQ file
        file: PathBuf,

        /// Question about the dominant species (repeatable)
        #[arg(long = "ask")]
        questions: Vec<String>,
    },

    /// Ask the fisheries assistant a question
    Chat {
        /// Question text
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Print the URL a request path resolves to
    Url {
        /// Request path, e.g. /predict/csv
        path: String,

        /// Query parameter as key=value (repeatable; a bare key is skipped)
        #[arg(short = 'p', long = "param")]
        params: Vec<String>,
    },

    /// Show the effective configuration
    Config,
}
