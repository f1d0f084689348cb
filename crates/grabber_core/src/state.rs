use crate::{ProgressEvent, Stage};

/// Lifecycle of a single job, advanced by the events the job emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Idle,
    Preparing,
    Downloading,
    DownloadDone,
    DownloadFailed,
    Transcoding,
    TranscodeFailed,
    Stopped,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("event {event:?} is not allowed in state {from:?}")]
pub struct TransitionError {
    pub from: JobState,
    pub event: ProgressEvent,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::DownloadFailed | JobState::TranscodeFailed | JobState::Stopped | JobState::Done
        )
    }

    /// Returns the state after `event`, or an error if the event is out of order.
    pub fn on_event(self, event: &ProgressEvent) -> Result<JobState, TransitionError> {
        use JobState as S;
        use ProgressEvent as E;

        let next = match (self, event) {
            (S::Idle, E::Preparing) => Some(S::Preparing),
            (S::Preparing, E::StageActive { stage: Stage::Download }) => Some(S::Downloading),
            (S::Downloading, E::Downloading(_)) => Some(S::Downloading),
            (S::Preparing | S::Downloading, E::StageComplete { stage: Stage::Download }) => {
                Some(S::DownloadDone)
            }
            (S::Preparing | S::Downloading, E::Failed { stage: Stage::Download, .. }) => {
                Some(S::DownloadFailed)
            }
            (S::DownloadDone, E::StageActive { stage: Stage::Transcode }) => Some(S::Transcoding),
            (S::DownloadDone | S::Transcoding, E::Done) => Some(S::Done),
            (S::Transcoding, E::Failed { stage: Stage::Transcode, .. }) => Some(S::TranscodeFailed),
            (state, E::Progress { .. }) if !state.is_terminal() && state != S::Idle => Some(state),
            (state, E::Stopped) if !state.is_terminal() && state != S::Idle => Some(S::Stopped),
            _ => None,
        };

        next.ok_or_else(|| TransitionError {
            from: self,
            event: event.clone(),
        })
    }
}
