//! Parser for the downloader's tagged progress lines.
//!
//! The downloader is launched with [`PROGRESS_TEMPLATE`], which makes it print
//! `download-stats:<downloaded>/<total>@<speed>#<percentage>` among its regular
//! log output. Any field may be the literal `NA`.

use engine_logging::{engine_trace, engine_warn};

use crate::{DownloadProgress, ProgressEvent};

pub const PROGRESS_PREFIX: &str = "download-stats:";
pub const NOT_AVAILABLE: &str = "NA";
pub const PROGRESS_TEMPLATE: &str = "download-stats:%(progress.downloaded_bytes)s/%(progress.total_bytes)s@%(progress.speed)s#%(progress.percentage)s";

/// Share of overall job progress reserved for the download stage.
pub const DOWNLOAD_SHARE: u8 = 80;

/// Fields of one progress line, before any rescaling.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawProgress {
    pub downloaded_bytes: Option<u64>,
    pub total_bytes: Option<u64>,
    pub speed_bytes_per_sec: Option<u64>,
    pub percent: Option<f64>,
}

impl RawProgress {
    /// Converts to a `Downloading` payload, mapping the percentage into the download share.
    pub fn to_progress(&self) -> DownloadProgress {
        DownloadProgress {
            downloaded_bytes: self.downloaded_bytes,
            total_bytes: self.total_bytes,
            speed_bytes_per_sec: self.speed_bytes_per_sec,
            percent: self.percent.map(scale_download_percent),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseAnomaly {
    #[error("progress payload {payload:?} does not have the downloaded/total@speed#percent shape")]
    FieldCount { payload: String },
    #[error("progress field {field} is not a number: {value:?}")]
    NotNumeric { field: &'static str, value: String },
}

/// Parses one output line.
///
/// `Ok(None)` for lines without the progress tag, `Err` for tagged lines whose
/// payload is malformed.
pub fn parse_progress_line(line: &str) -> Result<Option<RawProgress>, ParseAnomaly> {
    let Some(payload) = line.strip_prefix(PROGRESS_PREFIX) else {
        return Ok(None);
    };
    let payload = payload.trim();
    let shape_error = || ParseAnomaly::FieldCount {
        payload: payload.to_string(),
    };

    let (head, percent) = payload.split_once('#').ok_or_else(shape_error)?;
    let (sizes, speed) = head.split_once('@').ok_or_else(shape_error)?;
    let (downloaded, total) = sizes.split_once('/').ok_or_else(shape_error)?;
    if percent.contains('#') || speed.contains('@') || total.contains('/') {
        return Err(shape_error());
    }

    Ok(Some(RawProgress {
        downloaded_bytes: parse_amount("downloaded_bytes", downloaded)?,
        total_bytes: parse_amount("total_bytes", total)?,
        speed_bytes_per_sec: parse_amount("speed", speed)?,
        percent: parse_number("percentage", percent.trim().trim_end_matches('%'))?,
    }))
}

/// Maps a raw 0..=100 download percentage into the `0..=DOWNLOAD_SHARE` overall range.
pub fn scale_download_percent(raw: f64) -> u8 {
    let scaled = (raw * f64::from(DOWNLOAD_SHARE) / 100.0).floor();
    scaled.clamp(0.0, f64::from(DOWNLOAD_SHARE)) as u8
}

fn parse_amount(field: &'static str, raw: &str) -> Result<Option<u64>, ParseAnomaly> {
    Ok(parse_number(field, raw)?.map(|value| value.round() as u64))
}

fn parse_number(field: &'static str, raw: &str) -> Result<Option<f64>, ParseAnomaly> {
    let raw = raw.trim();
    if raw == NOT_AVAILABLE {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        _ => Err(ParseAnomaly::NotNumeric {
            field,
            value: raw.to_string(),
        }),
    }
}

/// Line-by-line adapter used by the job pipeline.
///
/// Malformed progress lines are logged and counted, never surfaced as events.
#[derive(Debug, Default)]
pub struct StreamProgressParser {
    anomalies: u64,
}

impl StreamProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&mut self, line: &str) -> Option<ProgressEvent> {
        match parse_progress_line(line) {
            Ok(Some(raw)) => Some(ProgressEvent::Downloading(raw.to_progress())),
            Ok(None) => {
                engine_trace!("downloader: {}", line);
                None
            }
            Err(anomaly) => {
                self.anomalies += 1;
                engine_warn!("Ignoring progress line {:?}: {}", line, anomaly);
                None
            }
        }
    }

    /// Number of malformed progress lines seen so far.
    pub fn anomalies(&self) -> u64 {
        self.anomalies
    }
}
