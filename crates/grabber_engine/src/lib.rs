//! Grabber engine: external process pipeline for download/transcode jobs.
mod cancel;
mod commands;
mod config;
mod controller;
mod error;
mod files;
mod lines;
mod probe;
mod process;
mod sink;

pub use cancel::CancellationToken;
pub use commands::{
    describe_command, download_args, filter_graph, format_selector, metadata_args, title_args,
    transcode_args,
};
pub use config::EngineConfig;
pub use controller::{JobController, JobHandle, JobOutcome};
pub use error::{ProbeError, StageError};
pub use files::prepare_output_dir;
pub use lines::OutputLines;
pub use probe::{list_heights, parse_heights, query_title, resolve_output_basename};
pub use process::{spawn_stage, ProcessHandle, SpawnedStage};
pub use sink::{ChannelEventSink, JobEventSink};
