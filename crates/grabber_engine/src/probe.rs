//! One-shot downloader queries that run before a job: title and available heights.

use std::collections::BTreeSet;
use std::path::Path;
use std::process::{Output, Stdio};

use engine_logging::{engine_debug, engine_warn};
use grabber_core::{sanitize_title, FALLBACK_TITLE};
use serde::Deserialize;
use tokio::process::Command;

use crate::commands::{metadata_args, title_args};
use crate::{EngineConfig, ProbeError};

#[derive(Debug, Deserialize)]
struct VideoMetadata {
    #[serde(default)]
    formats: Vec<FormatEntry>,
}

#[derive(Debug, Deserialize)]
struct FormatEntry {
    #[serde(default)]
    height: Option<f64>,
}

/// Display title of the video, trimmed. May be empty.
pub async fn query_title(config: &EngineConfig, url: &str) -> Result<String, ProbeError> {
    let output = run_capture(&config.downloader, &title_args(url)).await?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Sanitized title for output files, falling back to a placeholder on any failure.
pub async fn resolve_output_basename(config: &EngineConfig, url: &str) -> String {
    match query_title(config, url).await {
        Ok(title) if !title.is_empty() => {
            engine_debug!("Title: {:?}", title);
            sanitize_title(&title)
        }
        Ok(_) => {
            engine_warn!("Downloader reported an empty title; using {:?}", FALLBACK_TITLE);
            FALLBACK_TITLE.to_string()
        }
        Err(err) => {
            engine_warn!("Title lookup failed ({}); using {:?}", err, FALLBACK_TITLE);
            FALLBACK_TITLE.to_string()
        }
    }
}

/// Distinct video heights offered for `url`, highest first.
pub async fn list_heights(config: &EngineConfig, url: &str) -> Result<Vec<u32>, ProbeError> {
    let output = run_capture(&config.downloader, &metadata_args(url)).await?;
    parse_heights(&output.stdout)
}

/// Extracts the distinct `formats[].height` values from a metadata document, descending.
pub fn parse_heights(json: &[u8]) -> Result<Vec<u32>, ProbeError> {
    let metadata: VideoMetadata = serde_json::from_slice(json)?;
    let heights: BTreeSet<u32> = metadata
        .formats
        .iter()
        .filter_map(|format| format.height)
        .filter(|height| height.is_finite() && *height >= 1.0)
        .map(|height| height as u32)
        .collect();
    Ok(heights.into_iter().rev().collect())
}

async fn run_capture(program: &Path, args: &[String]) -> Result<Output, ProbeError> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| ProbeError::Spawn {
            program: program.display().to_string(),
            source,
        })?;
    if !output.status.success() {
        engine_debug!(
            "{} stderr: {}",
            program.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Err(ProbeError::Exit {
            program: program.display().to_string(),
            code: output.status.code(),
        });
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::parse_heights;
    use crate::ProbeError;

    #[test]
    fn heights_are_distinct_and_descending() {
        let json = br#"{
            "title": "x",
            "formats": [
                {"format_id": "140"},
                {"format_id": "137", "height": 1080},
                {"format_id": "22", "height": 720},
                {"format_id": "299", "height": 1080},
                {"format_id": "sb0", "height": null},
                {"format_id": "18", "height": 360.0}
            ]
        }"#;
        assert_eq!(parse_heights(json).unwrap(), vec![1080, 720, 360]);
    }

    #[test]
    fn missing_formats_means_no_heights() {
        assert!(parse_heights(b"{}").unwrap().is_empty());
    }

    #[test]
    fn garbage_is_a_json_error() {
        assert!(matches!(parse_heights(b"ERROR: nope"), Err(ProbeError::Json(_))));
    }
}
