use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Media-fetch tool (stage 1, title query, format listing).
    pub downloader: PathBuf,
    /// Media-transcode tool (stage 2).
    pub transcoder: PathBuf,
    /// Directory receiving intermediate and final files.
    pub output_dir: PathBuf,
    pub video_codec: String,
    pub audio_codec: String,
    /// How often a running process is polled for exit.
    pub poll_interval: Duration,
    /// Number of trailing downloader lines kept for failure diagnostics.
    pub log_tail_lines: usize,
    /// How long to keep collecting transcoder output after it exits.
    pub output_grace: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            downloader: PathBuf::from("yt-dlp"),
            transcoder: PathBuf::from("ffmpeg"),
            output_dir: PathBuf::from("."),
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            poll_interval: Duration::from_millis(50),
            log_tail_lines: 40,
            output_grace: Duration::from_secs(2),
        }
    }
}
