use std::fmt;
use std::str::FromStr;

use crate::{normalize_source_url, sanitize_title};

/// Largest tempo factor the transcoder's audio filter accepts.
const MAX_SPEED: f64 = 100.0;

/// Rejected before a job starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("a source URL is required")]
    MissingUrl,
    #[error("target height must be a positive number of lines, got {0}")]
    InvalidHeight(u32),
    #[error("invalid speed factor {0:?}: expected a number between 1.0 and 100")]
    InvalidSpeed(String),
}

/// Playback speed multiplier applied by the transcode stage. `1.0` skips that stage.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SpeedFactor(f64);

impl SpeedFactor {
    pub const IDENTITY: SpeedFactor = SpeedFactor(1.0);

    pub fn new(value: f64) -> Result<Self, InputError> {
        if value.is_finite() && (1.0..=MAX_SPEED).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InputError::InvalidSpeed(value.to_string()))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// True when no transcode stage is needed.
    pub fn is_identity(self) -> bool {
        self.0 == 1.0
    }
}

impl Default for SpeedFactor {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl FromStr for SpeedFactor {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches(['x', 'X']);
        let value = trimmed
            .parse::<f64>()
            .map_err(|_| InputError::InvalidSpeed(s.to_string()))?;
        Self::new(value).map_err(|_| InputError::InvalidSpeed(s.to_string()))
    }
}

/// `1.0` for the identity factor, shortest form otherwise (`2`, `1.25`).
impl fmt::Display for SpeedFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            f.write_str("1.0")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// One download invocation. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    source_url: String,
    target_height: u32,
    speed_factor: SpeedFactor,
    output_basename: Option<String>,
}

impl JobRequest {
    pub fn new(
        source_url: &str,
        target_height: u32,
        speed_factor: SpeedFactor,
    ) -> Result<Self, InputError> {
        let source_url = normalize_source_url(source_url);
        if source_url.is_empty() {
            return Err(InputError::MissingUrl);
        }
        if target_height == 0 {
            return Err(InputError::InvalidHeight(target_height));
        }
        Ok(Self {
            source_url,
            target_height,
            speed_factor,
            output_basename: None,
        })
    }

    /// Uses `basename` for output files instead of asking the downloader for the title.
    pub fn with_output_basename(mut self, basename: &str) -> Self {
        self.output_basename = Some(sanitize_title(basename));
        self
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn target_height(&self) -> u32 {
        self.target_height
    }

    pub fn speed_factor(&self) -> SpeedFactor {
        self.speed_factor
    }

    pub fn output_basename(&self) -> Option<&str> {
        self.output_basename.as_deref()
    }

    pub fn needs_transcode(&self) -> bool {
        !self.speed_factor.is_identity()
    }
}

#[cfg(test)]
mod tests {
    use super::{InputError, JobRequest, SpeedFactor};

    #[test]
    fn speed_display_matches_menu_labels() {
        assert_eq!(SpeedFactor::IDENTITY.to_string(), "1.0");
        assert_eq!("1".parse::<SpeedFactor>().unwrap().to_string(), "1.0");
        assert_eq!("2".parse::<SpeedFactor>().unwrap().to_string(), "2");
        assert_eq!("2.0".parse::<SpeedFactor>().unwrap().to_string(), "2");
        assert_eq!("1.75".parse::<SpeedFactor>().unwrap().to_string(), "1.75");
        assert_eq!("1.25".parse::<SpeedFactor>().unwrap().to_string(), "1.25");
        assert_eq!("1.5x".parse::<SpeedFactor>().unwrap().to_string(), "1.5");
    }

    #[test]
    fn speed_below_one_is_rejected() {
        assert_eq!(
            "0.5".parse::<SpeedFactor>(),
            Err(InputError::InvalidSpeed("0.5".to_string()))
        );
        assert!("fast".parse::<SpeedFactor>().is_err());
        assert!(SpeedFactor::new(f64::NAN).is_err());
    }

    #[test]
    fn request_requires_url_and_height() {
        assert_eq!(
            JobRequest::new("   ", 720, SpeedFactor::IDENTITY),
            Err(InputError::MissingUrl)
        );
        assert_eq!(
            JobRequest::new("https://youtu.be/abc", 0, SpeedFactor::IDENTITY),
            Err(InputError::InvalidHeight(0))
        );
    }

    #[test]
    fn explicit_basename_is_sanitized() {
        let request = JobRequest::new("https://youtu.be/abc", 720, SpeedFactor::IDENTITY)
            .unwrap()
            .with_output_basename("a/b:c");
        assert_eq!(request.output_basename(), Some("abc"));
        assert!(!request.needs_transcode());
    }
}
