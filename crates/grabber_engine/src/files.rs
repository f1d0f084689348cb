use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use engine_logging::{engine_debug, engine_warn};
use tempfile::NamedTempFile;

use crate::StageError;

/// Ensure the output directory exists and is writable; create if missing.
pub fn prepare_output_dir(dir: &Path) -> Result<(), StageError> {
    let to_error = |source: io::Error| StageError::OutputDir {
        path: dir.to_path_buf(),
        source,
    };
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(to_error)?;
        if !meta.is_dir() {
            return Err(to_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "path is not a directory",
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(to_error)?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(to_error)?;
    Ok(())
}

/// Best-effort removal of `paths` and the downloader's partial siblings.
pub(crate) fn remove_artifacts(paths: &[&Path]) {
    for path in paths {
        remove_files(&partial_variants(path));
    }
}

fn remove_files(paths: &[PathBuf]) {
    for candidate in paths {
        match fs::remove_file(candidate) {
            Ok(()) => engine_debug!("Removed {}", candidate.display()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => engine_warn!("Could not remove {}: {}", candidate.display(), err),
        }
    }
}

/// A file a stage is about to write, as it looked before the stage ran.
///
/// A file from an earlier run that the stage never touched survives cleanup.
#[derive(Debug)]
pub(crate) struct StageOutput {
    path: PathBuf,
    existed: bool,
    modified: Option<SystemTime>,
}

impl StageOutput {
    pub(crate) fn observe(path: PathBuf) -> Self {
        let meta = fs::metadata(&path).ok();
        Self {
            existed: meta.is_some(),
            modified: meta.and_then(|m| m.modified().ok()),
            path,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// True if the file now exists and was created or rewritten since [`observe`](Self::observe).
    pub(crate) fn was_written(&self) -> bool {
        match fs::metadata(&self.path) {
            Ok(meta) => !self.existed || meta.modified().ok() != self.modified,
            Err(_) => false,
        }
    }

    /// Removes partial siblings, and the file itself when this job wrote it.
    pub(crate) fn discard(&self) {
        if self.was_written() {
            remove_artifacts(&[self.path.as_path()]);
        } else {
            if self.existed {
                engine_debug!("Keeping untouched {}", self.path.display());
            }
            let [_, part, ytdl] = partial_variants(&self.path);
            remove_files(&[part, ytdl]);
        }
    }
}

fn partial_variants(path: &Path) -> [PathBuf; 3] {
    [
        path.to_path_buf(),
        with_suffix(path, ".part"),
        with_suffix(path, ".ytdl"),
    ]
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
