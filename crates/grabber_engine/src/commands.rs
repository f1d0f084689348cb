//! Argument lists for the external tools.

use std::path::Path;

use grabber_core::{SpeedFactor, PROGRESS_TEMPLATE};

/// Exact-height video plus best audio, else the best combined stream at that height.
pub fn format_selector(height: u32) -> String {
    format!("(bestvideo[height={height}]+bestaudio)/best[height={height}]")
}

pub fn download_args(url: &str, height: u32, output: &Path) -> Vec<String> {
    vec![
        "-f".to_string(),
        format_selector(height),
        "--merge-output-format".to_string(),
        "mp4".to_string(),
        "--progress-template".to_string(),
        PROGRESS_TEMPLATE.to_string(),
        "-o".to_string(),
        output.display().to_string(),
        url.to_string(),
    ]
}

pub fn title_args(url: &str) -> Vec<String> {
    vec![
        "--get-title".to_string(),
        "--encoding".to_string(),
        "utf-8".to_string(),
        url.to_string(),
    ]
}

pub fn metadata_args(url: &str) -> Vec<String> {
    vec!["-J".to_string(), url.to_string()]
}

/// Speeds video up by scaling timestamps and audio by changing tempo.
pub fn filter_graph(speed: SpeedFactor) -> String {
    format!("[0:v]setpts=PTS/{speed}[v];[0:a]atempo={speed}[a]")
}

pub fn transcode_args(
    input: &Path,
    output: &Path,
    speed: SpeedFactor,
    video_codec: &str,
    audio_codec: &str,
) -> Vec<String> {
    vec![
        "-nostdin".to_string(),
        "-y".to_string(),
        "-i".to_string(),
        input.display().to_string(),
        "-filter_complex".to_string(),
        filter_graph(speed),
        "-map".to_string(),
        "[v]".to_string(),
        "-map".to_string(),
        "[a]".to_string(),
        "-c:v".to_string(),
        video_codec.to_string(),
        "-c:a".to_string(),
        audio_codec.to_string(),
        output.display().to_string(),
    ]
}

/// Shell-like rendering of a command line for logs.
pub fn describe_command(program: &Path, args: &[String]) -> String {
    let mut rendered = quote(&program.display().to_string());
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&quote(arg));
    }
    rendered
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.contains(char::is_whitespace) {
        format!("\"{arg}\"")
    } else {
        arg.to_string()
    }
}
