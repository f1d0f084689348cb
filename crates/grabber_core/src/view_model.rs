use crate::{format_bytes, DownloadProgress, ProgressEvent, Stage, DOWNLOAD_SHARE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressMode {
    #[default]
    Determinate,
    /// Stage running without percentage data; show a busy indicator.
    Busy,
}

/// What a front end shows for the current job, folded from [`ProgressEvent`]s.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressView {
    pub percent: u8,
    pub mode: ProgressMode,
    pub status: String,
    pub size_text: String,
    pub speed_text: String,
    pub finished: bool,
}

impl ProgressView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event. Events after a terminal one are ignored.
    pub fn apply(&mut self, event: &ProgressEvent) {
        if self.finished {
            return;
        }
        match event {
            ProgressEvent::Preparing => {
                *self = Self {
                    status: "Preparing…".to_string(),
                    ..Self::default()
                };
            }
            ProgressEvent::StageActive {
                stage: Stage::Download,
            } => {
                self.status = "Downloading…".to_string();
            }
            ProgressEvent::StageActive {
                stage: Stage::Transcode,
            } => {
                self.mode = ProgressMode::Busy;
                self.status = "Encoding…".to_string();
            }
            ProgressEvent::Downloading(progress) => self.apply_download(progress),
            ProgressEvent::Progress { percent } => {
                self.percent = (*percent).min(100);
            }
            ProgressEvent::StageComplete { .. } => {}
            ProgressEvent::Failed { stage, .. } => {
                self.finish();
                self.clear_stats();
                match stage {
                    Stage::Download => {
                        self.percent = 0;
                        self.status = "Download failed".to_string();
                    }
                    Stage::Transcode => {
                        self.percent = DOWNLOAD_SHARE;
                        self.status = "Encoding failed".to_string();
                    }
                }
            }
            ProgressEvent::Stopped => {
                self.finish();
                self.clear_stats();
                self.percent = 0;
                self.status = "Stopped".to_string();
            }
            ProgressEvent::Done => {
                self.finish();
                self.percent = 100;
                self.status = "Done".to_string();
            }
        }
    }

    fn apply_download(&mut self, progress: &DownloadProgress) {
        self.size_text = format!(
            "{} / {}",
            format_bytes(progress.total_bytes),
            format_bytes(progress.downloaded_bytes)
        );
        self.speed_text = match progress.speed_bytes_per_sec {
            Some(speed) => format!("{}/s", format_bytes(Some(speed))),
            None => "N/A".to_string(),
        };
        self.status = format!("Downloading… ({})", self.speed_text);
        if let Some(percent) = progress.percent {
            self.percent = percent;
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        self.mode = ProgressMode::Determinate;
    }

    fn clear_stats(&mut self) {
        self.size_text.clear();
        self.speed_text.clear();
    }
}
