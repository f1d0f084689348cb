use std::fmt;

/// One external-process-driven phase of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Download,
    Transcode,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Download => write!(f, "download"),
            Stage::Transcode => write!(f, "transcode"),
        }
    }
}

/// Byte/speed/percent snapshot reported by the downloader.
///
/// `percent` is overall job progress, already rescaled into the download share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DownloadProgress {
    pub downloaded_bytes: Option<u64>,
    pub total_bytes: Option<u64>,
    pub speed_bytes_per_sec: Option<u64>,
    pub percent: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Job accepted; title lookup and stage-1 launch in progress.
    Preparing,
    /// A stage started producing work. For `Transcode` this also means no
    /// further percentage data will arrive until the stage ends.
    StageActive { stage: Stage },
    Downloading(DownloadProgress),
    /// Explicit overall progress checkpoint.
    Progress { percent: u8 },
    StageComplete { stage: Stage },
    Failed { stage: Stage, reason: String },
    Stopped,
    /// Job finished; overall progress is 100%.
    Done,
}

impl ProgressEvent {
    /// True for events after which nothing else is emitted for the job.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Failed { .. } | ProgressEvent::Stopped | ProgressEvent::Done
        )
    }
}
