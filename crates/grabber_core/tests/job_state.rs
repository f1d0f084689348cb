use grabber_core::{
    DownloadProgress, JobState, ProgressEvent, ProgressMode, ProgressView, Stage,
};
use pretty_assertions::assert_eq;

fn run(events: &[ProgressEvent]) -> Result<JobState, grabber_core::TransitionError> {
    events
        .iter()
        .try_fold(JobState::Idle, |state, event| state.on_event(event))
}

fn downloading(percent: Option<u8>) -> ProgressEvent {
    ProgressEvent::Downloading(DownloadProgress {
        downloaded_bytes: Some(10),
        total_bytes: Some(100),
        speed_bytes_per_sec: Some(2048),
        percent,
    })
}

#[test]
fn plain_download_reaches_done() {
    let events = [
        ProgressEvent::Preparing,
        ProgressEvent::StageActive {
            stage: Stage::Download,
        },
        downloading(Some(8)),
        downloading(Some(80)),
        ProgressEvent::Progress { percent: 80 },
        ProgressEvent::StageComplete {
            stage: Stage::Download,
        },
        ProgressEvent::Done,
    ];
    assert_eq!(run(&events), Ok(JobState::Done));
}

#[test]
fn transcoded_job_passes_through_transcoding() {
    let events = [
        ProgressEvent::Preparing,
        ProgressEvent::StageActive {
            stage: Stage::Download,
        },
        ProgressEvent::StageComplete {
            stage: Stage::Download,
        },
        ProgressEvent::Progress { percent: 80 },
        ProgressEvent::StageActive {
            stage: Stage::Transcode,
        },
        ProgressEvent::Done,
    ];
    assert_eq!(run(&events), Ok(JobState::Done));
}

#[test]
fn preparing_must_come_first() {
    assert!(run(&[downloading(None)]).is_err());
    assert!(run(&[ProgressEvent::Stopped]).is_err());
    assert_eq!(
        run(&[ProgressEvent::Preparing, ProgressEvent::Stopped]),
        Ok(JobState::Stopped)
    );
}

#[test]
fn nothing_follows_a_terminal_event() {
    let err = run(&[
        ProgressEvent::Preparing,
        ProgressEvent::Stopped,
        ProgressEvent::Done,
    ])
    .unwrap_err();
    assert_eq!(err.from, JobState::Stopped);
    assert_eq!(err.event, ProgressEvent::Done);
}

#[test]
fn view_tracks_download_then_busy_transcode() {
    let mut view = ProgressView::new();
    view.apply(&ProgressEvent::Preparing);
    assert_eq!(view.status, "Preparing…");

    view.apply(&ProgressEvent::StageActive {
        stage: Stage::Download,
    });
    view.apply(&downloading(Some(40)));
    assert_eq!(view.percent, 40);
    assert_eq!(view.size_text, "100 B / 10 B");
    assert_eq!(view.speed_text, "2.00 KiB/s");
    assert_eq!(view.status, "Downloading… (2.00 KiB/s)");

    view.apply(&ProgressEvent::Downloading(DownloadProgress::default()));
    assert_eq!(view.percent, 40, "unknown percentage keeps the bar");
    assert_eq!(view.speed_text, "N/A");

    view.apply(&ProgressEvent::Progress { percent: 80 });
    view.apply(&ProgressEvent::StageActive {
        stage: Stage::Transcode,
    });
    assert_eq!(view.mode, ProgressMode::Busy);

    view.apply(&ProgressEvent::Failed {
        stage: Stage::Transcode,
        reason: "exit 1".into(),
    });
    assert_eq!(view.percent, 80);
    assert_eq!(view.mode, ProgressMode::Determinate);
    assert_eq!(view.status, "Encoding failed");
    assert!(view.finished);

    view.apply(&ProgressEvent::Done);
    assert_eq!(view.status, "Encoding failed");
}

#[test]
fn failed_download_resets_bar() {
    let mut view = ProgressView::new();
    view.apply(&ProgressEvent::Preparing);
    view.apply(&downloading(Some(60)));
    view.apply(&ProgressEvent::Failed {
        stage: Stage::Download,
        reason: "exit 1".into(),
    });
    assert_eq!(view.percent, 0);
    assert!(view.size_text.is_empty());
    assert_eq!(view.status, "Download failed");
}
