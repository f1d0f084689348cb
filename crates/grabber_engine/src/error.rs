use std::io;
use std::path::PathBuf;

/// Why a stage ended without producing its output.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("could not launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {}{}", exit_text(.code), diagnostics(.command, .tail))]
    Exit {
        program: String,
        code: Option<i32>,
        command: String,
        tail: String,
    },
    #[error("expected output {} was not produced{}", .path.display(), diagnostics(.command, .tail))]
    MissingOutput {
        path: PathBuf,
        command: String,
        tail: String,
    },
    #[error("output directory {} is not usable: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Failure of the title query or format listing.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("could not launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {}", exit_text(.code))]
    Exit { program: String, code: Option<i32> },
    #[error("metadata is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Command line and last output lines, appended to stage failure messages.
fn diagnostics(command: &str, tail: &str) -> String {
    let mut text = format!("\ncommand: {command}");
    if !tail.is_empty() {
        text.push_str("\noutput:\n");
        text.push_str(tail);
    }
    text
}

pub(crate) fn exit_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
