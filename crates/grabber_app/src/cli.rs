use std::path::PathBuf;

use clap::{Parser, Subcommand};
use grabber_core::SpeedFactor;

use crate::platform::logging::LogDestination;

#[derive(Parser)]
#[command(name = "grabber")]
#[command(author, version, about = "Download a video at an exact height, optionally sped up")]
pub struct Cli {
    /// Settings file (RON). Defaults to ./grabber.ron when present
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Where log output goes
    #[arg(long, global = true, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the video heights offered for a URL
    Qualities {
        #[arg(required = true)]
        url: String,
    },

    /// Download a video, re-encoding it when a speed factor is given.
    /// Type `q` and Enter while it runs to stop.
    Download {
        #[arg(required = true)]
        url: String,

        /// Exact video height to fetch, e.g. 1080
        #[arg(short = 'H', long)]
        height: u32,

        /// Playback speed of the result (1.0 keeps the original)
        #[arg(short, long, default_value = "1.0")]
        speed: SpeedFactor,

        /// Directory for the downloaded file
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// File name stem to use instead of the video title
        #[arg(long)]
        name: Option<String>,
    },

    /// Print the effective settings as RON
    ShowConfig,
}
