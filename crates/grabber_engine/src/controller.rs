//! Download-then-transcode job pipeline.
//!
//! Each job runs on its own thread with a single-threaded tokio runtime. Stage 1
//! streams the downloader's output through the progress parser; stage 2 runs the
//! transcoder only when a speed change was requested. Every event goes through a
//! [`JobState`] guard, so nothing is emitted after a terminal event.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use grabber_core::{
    JobRequest, JobState, OutputNames, ProgressEvent, Stage, StreamProgressParser, DOWNLOAD_SHARE,
};

use crate::commands::{describe_command, download_args, transcode_args};
use crate::files::{prepare_output_dir, remove_artifacts, StageOutput};
use crate::process::{drain_output, spawn_stage, LogTail, SpawnedStage};
use crate::probe::resolve_output_basename;
use crate::{CancellationToken, EngineConfig, JobEventSink, ProcessHandle, StageError};

/// How a job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Done { output: PathBuf },
    Failed { stage: Stage },
    Stopped,
}

/// Starts jobs. Holds the tool configuration shared by all of them.
pub struct JobController {
    config: Arc<EngineConfig>,
    next_job_id: AtomicU64,
}

impl JobController {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
            next_job_id: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs `request` on a dedicated thread and returns immediately.
    pub fn start(
        &self,
        request: JobRequest,
        sink: Arc<dyn JobEventSink>,
        token: CancellationToken,
    ) -> JobHandle {
        let job_id = self.next_job_id.fetch_add(1, Ordering::Relaxed);
        let config = Arc::clone(&self.config);
        let job_token = token.clone();
        let thread = thread::spawn(move || run_job_thread(job_id, config, request, sink, job_token));
        JobHandle {
            job_id,
            token,
            thread,
        }
    }
}

pub struct JobHandle {
    job_id: u64,
    token: CancellationToken,
    thread: JoinHandle<JobOutcome>,
}

impl JobHandle {
    pub fn job_id(&self) -> u64 {
        self.job_id
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Same as calling `request_stop` on the job's token.
    pub fn stop(&self) {
        self.token.request_stop();
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Blocks until the job thread exits.
    pub fn join(self) -> JobOutcome {
        let job_id = self.job_id;
        self.thread.join().unwrap_or_else(|_| {
            engine_error!("Job {} thread panicked", job_id);
            JobOutcome::Failed {
                stage: Stage::Download,
            }
        })
    }
}

fn run_job_thread(
    job_id: u64,
    config: Arc<EngineConfig>,
    request: JobRequest,
    sink: Arc<dyn JobEventSink>,
    token: CancellationToken,
) -> JobOutcome {
    let _context = engine_logging::enter_job(job_id);
    let mut emitter = Emitter::new(sink);
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            emitter.emit(ProgressEvent::Preparing);
            return fail(&mut emitter, Stage::Download, StageError::Io(err), &[]);
        }
    };
    let job = JobRun {
        config,
        request,
        token,
        emitter,
    };
    runtime.block_on(job.run())
}

/// Forwards events to the sink unless the job's state machine rejects them.
struct Emitter {
    sink: Arc<dyn JobEventSink>,
    state: JobState,
}

impl Emitter {
    fn new(sink: Arc<dyn JobEventSink>) -> Self {
        Self {
            sink,
            state: JobState::Idle,
        }
    }

    fn emit(&mut self, event: ProgressEvent) {
        match self.state.on_event(&event) {
            Ok(next) => {
                self.state = next;
                self.sink.notify(event);
            }
            Err(err) => engine_warn!("Dropping event: {}", err),
        }
    }
}

enum StageResult {
    Completed,
    Stopped,
    Failed(StageError),
}

struct JobRun {
    config: Arc<EngineConfig>,
    request: JobRequest,
    token: CancellationToken,
    emitter: Emitter,
}

impl JobRun {
    async fn run(mut self) -> JobOutcome {
        engine_info!(
            "Job for {} at {}p, {}x",
            self.request.source_url(),
            self.request.target_height(),
            self.request.speed_factor()
        );
        self.emitter.emit(ProgressEvent::Preparing);

        let basename = match self.request.output_basename() {
            Some(name) => Some(name.to_string()),
            None => tokio::select! {
                biased;
                _ = self.token.cancelled() => None,
                name = resolve_output_basename(&self.config, self.request.source_url()) => Some(name),
            },
        };
        let Some(basename) = basename else {
            return self.stopped(&[]);
        };

        let names = OutputNames::new(
            &basename,
            self.request.target_height(),
            self.request.speed_factor(),
        );
        if let Err(err) = prepare_output_dir(&self.config.output_dir) {
            return fail(&mut self.emitter, Stage::Download, err, &[]);
        }
        let downloaded = StageOutput::observe(self.config.output_dir.join(names.download_target()));
        let final_path = self.config.output_dir.join(&names.final_name);

        match self.download(downloaded.path()).await {
            StageResult::Completed => {}
            StageResult::Stopped => return self.stopped(&[&downloaded]),
            StageResult::Failed(err) => {
                return fail(&mut self.emitter, Stage::Download, err, &[&downloaded])
            }
        }

        self.emitter.emit(ProgressEvent::Progress {
            percent: DOWNLOAD_SHARE,
        });
        self.emitter.emit(ProgressEvent::StageComplete {
            stage: Stage::Download,
        });

        if !self.request.needs_transcode() {
            engine_info!("Saved {}", final_path.display());
            self.emitter.emit(ProgressEvent::Done);
            return JobOutcome::Done { output: final_path };
        }

        self.emitter.emit(ProgressEvent::StageActive {
            stage: Stage::Transcode,
        });
        if self.token.is_stopped() {
            return self.stopped(&[&downloaded]);
        }

        let transcoded = StageOutput::observe(final_path.clone());
        let result = self.transcode(downloaded.path(), &final_path).await;
        remove_artifacts(&[downloaded.path()]);
        match result {
            StageResult::Completed => {
                engine_info!("Saved {}", final_path.display());
                self.emitter.emit(ProgressEvent::Done);
                JobOutcome::Done { output: final_path }
            }
            StageResult::Stopped => self.stopped(&[&transcoded]),
            StageResult::Failed(err) => {
                fail(&mut self.emitter, Stage::Transcode, err, &[&transcoded])
            }
        }
    }

    async fn download(&mut self, target: &Path) -> StageResult {
        let program = &self.config.downloader;
        let args = download_args(
            self.request.source_url(),
            self.request.target_height(),
            target,
        );
        let command_line = describe_command(program, &args);
        engine_info!("Launching downloader: {}", command_line);

        let SpawnedStage {
            process,
            mut output,
        } = match spawn_stage(program, &args) {
            Ok(stage) => stage,
            Err(source) => {
                return StageResult::Failed(StageError::Spawn {
                    program: program.display().to_string(),
                    source,
                })
            }
        };
        self.token.register_process(process.clone());

        let mut tail = LogTail::new(self.config.log_tail_lines);
        let mut parser = StreamProgressParser::new();
        let mut started = false;
        loop {
            if self.token.is_stopped() {
                return self.abort(&process);
            }
            let next = tokio::select! {
                biased;
                _ = self.token.cancelled() => None,
                line = output.recv() => Some(line),
            };
            let line = match next {
                None => return self.abort(&process),
                Some(None) => break,
                Some(Some(line)) => line,
            };
            tail.push(&line);
            if let Some(event) = parser.parse(&line) {
                if !started {
                    started = true;
                    engine_debug!("First progress line received");
                    self.emitter.emit(ProgressEvent::StageActive {
                        stage: Stage::Download,
                    });
                }
                self.emitter.emit(event);
            }
        }
        if parser.anomalies() > 0 {
            engine_warn!("Skipped {} malformed progress lines", parser.anomalies());
        }

        let exit = tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            status = process.wait(self.config.poll_interval) => Some(status),
        };
        let status = match exit {
            None => return self.abort(&process),
            Some(status) => {
                self.token.clear_process();
                match status {
                    Ok(status) => status,
                    Err(err) => return StageResult::Failed(err.into()),
                }
            }
        };
        if self.token.is_stopped() {
            return StageResult::Stopped;
        }

        if !status.success() {
            return StageResult::Failed(StageError::Exit {
                program: process.program().to_string(),
                code: status.code(),
                command: command_line,
                tail: tail.render(),
            });
        }
        if !target.exists() {
            return StageResult::Failed(StageError::MissingOutput {
                path: target.to_path_buf(),
                command: command_line,
                tail: tail.render(),
            });
        }
        StageResult::Completed
    }

    async fn transcode(&mut self, input: &Path, output_path: &Path) -> StageResult {
        let program = &self.config.transcoder;
        let args = transcode_args(
            input,
            output_path,
            self.request.speed_factor(),
            &self.config.video_codec,
            &self.config.audio_codec,
        );
        let command_line = describe_command(program, &args);
        engine_info!("Launching transcoder: {}", command_line);

        let SpawnedStage {
            process,
            mut output,
        } = match spawn_stage(program, &args) {
            Ok(stage) => stage,
            Err(source) => {
                return StageResult::Failed(StageError::Spawn {
                    program: program.display().to_string(),
                    source,
                })
            }
        };
        self.token.register_process(process.clone());

        // No progress protocol here: wait for exit, then look at the output.
        let exit = tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            status = process.wait(self.config.poll_interval) => Some(status),
        };
        let status = match exit {
            None => return self.abort(&process),
            Some(status) => {
                self.token.clear_process();
                match status {
                    Ok(status) => status,
                    Err(err) => return StageResult::Failed(err.into()),
                }
            }
        };
        if self.token.is_stopped() {
            return StageResult::Stopped;
        }

        let mut captured = Vec::new();
        drain_output(&mut output, &mut captured, self.config.output_grace).await;
        if status.success() && output_path.exists() {
            return StageResult::Completed;
        }
        engine_debug!("Transcoder output:\n{}", captured.join("\n"));
        let mut tail = LogTail::new(self.config.log_tail_lines);
        for line in &captured {
            tail.push(line);
        }
        if !status.success() {
            StageResult::Failed(StageError::Exit {
                program: process.program().to_string(),
                code: status.code(),
                command: command_line,
                tail: tail.render(),
            })
        } else {
            StageResult::Failed(StageError::MissingOutput {
                path: output_path.to_path_buf(),
                command: command_line,
                tail: tail.render(),
            })
        }
    }

    /// Kills the stage process without waiting for it to exit.
    fn abort(&self, process: &ProcessHandle) -> StageResult {
        self.token.clear_process();
        process.terminate();
        StageResult::Stopped
    }

    fn stopped(&mut self, artifacts: &[&StageOutput]) -> JobOutcome {
        engine_info!("Job stopped");
        discard_all(artifacts);
        self.emitter.emit(ProgressEvent::Stopped);
        JobOutcome::Stopped
    }
}

fn fail(
    emitter: &mut Emitter,
    stage: Stage,
    err: StageError,
    artifacts: &[&StageOutput],
) -> JobOutcome {
    engine_error!("{} stage failed: {}", stage, err);
    discard_all(artifacts);
    emitter.emit(ProgressEvent::Failed {
        stage,
        reason: err.to_string(),
    });
    JobOutcome::Failed { stage }
}

fn discard_all(artifacts: &[&StageOutput]) {
    for artifact in artifacts {
        artifact.discard();
    }
}
