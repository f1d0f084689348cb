use std::fmt;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use engine_logging::{engine_debug, engine_trace};
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

use crate::OutputLines;

/// Shared handle to a running external process.
///
/// Cloned into the [`CancellationToken`](crate::CancellationToken) so a stop
/// request can reach the process from any thread.
#[derive(Clone)]
pub struct ProcessHandle {
    child: Arc<Mutex<Child>>,
    program: String,
    pid: Option<u32>,
}

impl ProcessHandle {
    fn new(child: Child, program: String) -> Self {
        let pid = child.id();
        Self {
            child: Arc::new(Mutex::new(child)),
            program,
            pid,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Requests termination without waiting for it. Failures are logged and swallowed.
    pub fn terminate(&self) {
        match self.lock().start_kill() {
            Ok(()) => engine_debug!("Sent kill to {} (pid {:?})", self.program, self.pid),
            Err(err) => engine_debug!("Kill of {} not delivered: {}", self.program, err),
        }
    }

    pub fn try_wait(&self) -> io::Result<Option<ExitStatus>> {
        self.lock().try_wait()
    }

    /// Polls for exit every `interval`. The lock is never held across an await.
    pub async fn wait(&self, interval: Duration) -> io::Result<ExitStatus> {
        loop {
            if let Some(status) = self.try_wait()? {
                return Ok(status);
            }
            tokio::time::sleep(interval).await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Child> {
        self.child.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("program", &self.program)
            .field("pid", &self.pid)
            .finish()
    }
}

/// A launched stage: its process plus stdout and stderr merged into one line stream.
pub struct SpawnedStage {
    pub process: ProcessHandle,
    pub output: mpsc::UnboundedReceiver<String>,
}

/// Launches `program` with piped output. Must be called inside a tokio runtime.
pub fn spawn_stage(program: &Path, args: &[String]) -> io::Result<SpawnedStage> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let (tx, rx) = mpsc::unbounded_channel();
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(forward_lines(stdout, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(forward_lines(stderr, tx));
    }

    let program = program.display().to_string();
    engine_debug!("Spawned {} (pid {:?})", program, child.id());
    Ok(SpawnedStage {
        process: ProcessHandle::new(child, program),
        output: rx,
    })
}

async fn forward_lines<R: AsyncRead + Unpin>(reader: R, tx: mpsc::UnboundedSender<String>) {
    let mut lines = OutputLines::new(reader);
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                engine_trace!("Output stream closed with error: {}", err);
                break;
            }
        }
    }
}

/// Collects whatever output is still buffered, waiting at most `grace` for the streams to close.
pub(crate) async fn drain_output(
    output: &mut mpsc::UnboundedReceiver<String>,
    captured: &mut Vec<String>,
    grace: Duration,
) {
    let collect = async {
        while let Some(line) = output.recv().await {
            captured.push(line);
        }
    };
    if tokio::time::timeout(grace, collect).await.is_err() {
        engine_debug!("Output streams still open after {:?}; giving up on the rest", grace);
    }
}

/// Bounded buffer of the most recent output lines.
#[derive(Debug)]
pub(crate) struct LogTail {
    lines: std::collections::VecDeque<String>,
    capacity: usize,
}

impl LogTail {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            lines: std::collections::VecDeque::with_capacity(capacity.min(256)),
            capacity,
        }
    }

    pub(crate) fn push(&mut self, line: &str) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.to_string());
    }

    pub(crate) fn render(&self) -> String {
        self.lines.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::LogTail;

    #[test]
    fn tail_keeps_most_recent_lines() {
        let mut tail = LogTail::new(2);
        for line in ["a", "b", "c"] {
            tail.push(line);
        }
        assert_eq!(tail.render(), "b\nc");
    }
}
