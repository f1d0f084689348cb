//! Runs one download job in the foreground, drawing its progress on one terminal line.

use std::io::{self, BufRead, Write};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::engine_info;
use grabber_core::{JobRequest, ProgressEvent, ProgressView};
use grabber_engine::{
    CancellationToken, ChannelEventSink, EngineConfig, JobController, JobOutcome,
};

use super::render::render_line;

const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

pub fn run_download(config: EngineConfig, request: JobRequest) -> JobOutcome {
    let controller = JobController::new(config);
    engine_info!(
        "Writing to {}",
        controller.config().output_dir.display()
    );
    let (tx, rx) = mpsc::channel::<ProgressEvent>();
    let handle = controller.start(
        request,
        Arc::new(ChannelEventSink::new(tx)),
        CancellationToken::new(),
    );
    engine_info!("Started job {}", handle.job_id());
    spawn_stop_listener(handle.token().clone());

    let mut view = ProgressView::new();
    let mut tick = 0usize;
    let mut stdout = io::stdout();
    loop {
        match rx.recv_timeout(REDRAW_INTERVAL) {
            Ok(event) => {
                view.apply(&event);
                if let ProgressEvent::Failed { stage, reason } = &event {
                    let _ = writeln!(stdout, "\r{}", render_line(&view, tick));
                    eprintln!("{stage} failed: {reason}");
                    break;
                }
                if event.is_terminal() {
                    let _ = writeln!(stdout, "\r{}", render_line(&view, tick));
                    break;
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // Thread gone without a terminal event; join reports the outcome.
                if handle.is_finished() {
                    break;
                }
                tick = tick.wrapping_add(1);
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
        let _ = write!(stdout, "\r{}", render_line(&view, tick));
        let _ = stdout.flush();
    }
    handle.join()
}

/// Stops the job when `q` or `stop` is entered on stdin.
fn spawn_stop_listener(token: CancellationToken) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { return };
            if is_stop_command(&line) {
                engine_info!("Stop requested from terminal");
                token.request_stop();
                return;
            }
        }
    });
}

fn is_stop_command(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "q" | "stop")
}

#[cfg(test)]
mod tests {
    use super::is_stop_command;

    #[test]
    fn recognizes_stop_commands() {
        assert!(is_stop_command("q"));
        assert!(is_stop_command(" STOP \n"));
        assert!(!is_stop_command("quit now"));
        assert!(!is_stop_command(""));
    }
}
