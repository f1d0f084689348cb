//! Grabber core: pure job model, progress protocol and view-model helpers.
mod bytes;
mod event;
mod names;
mod protocol;
mod request;
mod source_url;
mod state;
mod view_model;

pub use bytes::format_bytes;
pub use event::{DownloadProgress, ProgressEvent, Stage};
pub use names::{sanitize_title, OutputNames, FALLBACK_TITLE};
pub use protocol::{
    parse_progress_line, scale_download_percent, ParseAnomaly, RawProgress, StreamProgressParser,
    DOWNLOAD_SHARE, NOT_AVAILABLE, PROGRESS_PREFIX, PROGRESS_TEMPLATE,
};
pub use request::{InputError, JobRequest, SpeedFactor};
pub use source_url::normalize_source_url;
pub use state::{JobState, TransitionError};
pub use view_model::{ProgressMode, ProgressView};
