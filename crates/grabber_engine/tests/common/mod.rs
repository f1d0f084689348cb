//! Fake downloader/transcoder scripts for driving the pipeline without the real tools.
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use grabber_core::ProgressEvent;
use grabber_engine::EngineConfig;
use tempfile::TempDir;

/// Shared head of every fake downloader: answers the title and metadata
/// queries, records its arguments and finds the `-o` target in `$out`.
const DOWNLOADER_PRELUDE: &str = r#"
here="$(dirname "$0")"
out=""
prev=""
for arg in "$@"; do
  case "$arg" in
    --get-title) echo "Test: Clip?"; exit 0 ;;
    -J) echo '{"formats":[{"height":720},{"height":1080},{"format_id":"audio"},{"height":720}]}'; exit 0 ;;
  esac
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
done
printf '%s\n' "$@" > "$here/downloader.args"
"#;

const TRANSCODER_PRELUDE: &str = r#"
here="$(dirname "$0")"
printf '%s\n' "$@" > "$here/transcoder.args"
for arg in "$@"; do last="$arg"; done
"#;

pub struct Workspace {
    _temp: TempDir,
    pub bin: PathBuf,
    pub out: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        engine_logging::initialize_for_tests();
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        let out = temp.path().join("out");
        fs::create_dir_all(&bin).unwrap();
        Self {
            _temp: temp,
            bin,
            out,
        }
    }

    pub fn downloader(&self, body: &str) -> PathBuf {
        self.script("fake-downloader", &format!("{DOWNLOADER_PRELUDE}{body}"))
    }

    pub fn transcoder(&self, body: &str) -> PathBuf {
        self.script("fake-transcoder", &format!("{TRANSCODER_PRELUDE}{body}"))
    }

    fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.bin.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    pub fn config(&self, downloader: PathBuf, transcoder: PathBuf) -> EngineConfig {
        EngineConfig {
            downloader,
            transcoder,
            output_dir: self.out.clone(),
            poll_interval: Duration::from_millis(10),
            ..EngineConfig::default()
        }
    }

    /// Arguments a fake tool was last called with, one per line.
    pub fn recorded_args(&self, tool: &str) -> Option<Vec<String>> {
        let text = fs::read_to_string(self.bin.join(format!("{tool}.args"))).ok()?;
        Some(text.lines().map(str::to_string).collect())
    }

    pub fn output_files(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.out) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn read_pid(&self, name: &str) -> u32 {
        fs::read_to_string(self.bin.join(name))
            .unwrap()
            .trim()
            .parse()
            .unwrap()
    }
}

/// Waits for an event matching `pred`, returning everything received up to and including it.
pub fn wait_for(
    rx: &mpsc::Receiver<ProgressEvent>,
    pred: impl Fn(&ProgressEvent) -> bool,
) -> Vec<ProgressEvent> {
    let mut seen = Vec::new();
    loop {
        let event = rx
            .recv_timeout(Duration::from_secs(10))
            .expect("expected event did not arrive");
        let done = pred(&event);
        seen.push(event);
        if done {
            return seen;
        }
    }
}

/// True once `pid` has exited (gone or zombie).
#[cfg(target_os = "linux")]
pub fn process_gone(pid: u32) -> bool {
    let stat = match fs::read_to_string(std::path::Path::new("/proc").join(pid.to_string()).join("stat")) {
        Ok(stat) => stat,
        Err(_) => return true,
    };
    // Field 3, after the parenthesised command name.
    stat.rsplit(')')
        .next()
        .and_then(|rest| rest.split_whitespace().next())
        .map(|state| state == "Z" || state == "X")
        .unwrap_or(true)
}
