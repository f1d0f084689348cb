use crate::SpeedFactor;

/// Title used when the downloader reports none or everything gets stripped.
pub const FALLBACK_TITLE: &str = "video";

/// Removes characters common filesystems reject; blank results fall back to [`FALLBACK_TITLE`].
pub fn sanitize_title(input: &str) -> String {
    let cleaned: String = input.chars().filter(|c| !is_forbidden(*c)).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        cleaned.to_string()
    }
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' | '\0'..='\u{1F}'
    )
}

/// File names produced by one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
    /// `"<title> (<height> - <speed>x).mp4"`
    pub final_name: String,
    /// `"<title> (<height>)_temp.mp4"`, present only when a transcode stage runs.
    pub intermediate_name: Option<String>,
}

impl OutputNames {
    /// `basename` is expected to be sanitized already.
    pub fn new(basename: &str, height: u32, speed: SpeedFactor) -> Self {
        let final_name = format!("{basename} ({height} - {speed}x).mp4");
        let intermediate_name =
            (!speed.is_identity()).then(|| format!("{basename} ({height})_temp.mp4"));
        Self {
            final_name,
            intermediate_name,
        }
    }

    /// Where the downloader writes: the intermediate file if one is needed, else the final file.
    pub fn download_target(&self) -> &str {
        self.intermediate_name.as_deref().unwrap_or(&self.final_name)
    }
}
