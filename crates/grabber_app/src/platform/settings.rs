//! Optional RON settings file overriding the engine defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use engine_logging::engine_info;
use grabber_engine::EngineConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SETTINGS_FILE: &str = "grabber.ron";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub downloader: Option<PathBuf>,
    pub transcoder: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub log_tail_lines: Option<usize>,
}

impl Settings {
    /// Reads `path`, or `./grabber.ron` if it exists when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
        };
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading settings {}", path.display()))
            }
        };
        let settings = Self::parse(&content)
            .with_context(|| format!("parsing settings {}", path.display()))?;
        engine_info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(content)?)
    }

    /// Settings that reproduce `config` exactly.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            downloader: Some(config.downloader.clone()),
            transcoder: Some(config.transcoder.clone()),
            output_dir: Some(config.output_dir.clone()),
            video_codec: Some(config.video_codec.clone()),
            audio_codec: Some(config.audio_codec.clone()),
            poll_interval_ms: Some(config.poll_interval.as_millis() as u64),
            log_tail_lines: Some(config.log_tail_lines),
        }
    }

    pub fn to_ron(&self) -> anyhow::Result<String> {
        let pretty = ron::ser::PrettyConfig::new();
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    pub fn into_config(self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if let Some(downloader) = self.downloader {
            config.downloader = downloader;
        }
        if let Some(transcoder) = self.transcoder {
            config.transcoder = transcoder;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(codec) = self.video_codec {
            config.video_codec = codec;
        }
        if let Some(codec) = self.audio_codec {
            config.audio_codec = codec;
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(lines) = self.log_tail_lines {
            config.log_tail_lines = lines;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn partial_settings_keep_defaults() {
        let settings =
            Settings::parse(r#"(transcoder: Some("/opt/ffmpeg/bin/ffmpeg"), poll_interval_ms: Some(0))"#)
                .unwrap();
        let config = settings.into_config();
        assert_eq!(config.transcoder, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.downloader, PathBuf::from("yt-dlp"));
        assert_eq!(config.poll_interval, Duration::from_millis(1));
    }

    #[test]
    fn printed_settings_read_back_identically() {
        let original = Settings::from_config(&grabber_engine::EngineConfig::default());
        let text = original.to_ron().unwrap();
        assert_eq!(Settings::parse(&text).unwrap(), original);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(Settings::load(Some(&temp.path().join("absent.ron"))).is_err());
    }
}
