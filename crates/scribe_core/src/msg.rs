use crate::{ArtifactPoll, JobId, LogSnapshot, Submission};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User submitted a validated upload form.
    SubmitRequested(Submission),
    /// Submission endpoint accepted the job.
    SubmitSucceeded { job_id: JobId },
    /// Submission endpoint rejected the job or could not be reached.
    SubmitFailed { job_id: JobId, message: String },
    /// Log poll tick returned a snapshot.
    LogPolled {
        job_id: JobId,
        snapshot: LogSnapshot,
    },
    /// Log poll tick failed (network, timeout, malformed body).
    LogPollFailed { job_id: JobId, message: String },
    /// Artifact poll tick returned a payload or "not ready".
    ArtifactPolled { job_id: JobId, poll: ArtifactPoll },
    /// Artifact poll tick failed.
    ArtifactPollFailed { job_id: JobId, message: String },
    /// User scrolled the log console. Extents are in pixels.
    ConsoleScrolled {
        viewport_height: f64,
        content_height: f64,
        scroll_offset: f64,
    },
    /// User clicked "scroll to bottom".
    ScrollToBottomClicked,
    /// User collapsed or expanded the console panel.
    ConsoleToggled,
    /// The consuming view is going away; release every timer.
    Dispose,
    /// UI/render tick to coalesce rendering.
    Tick,
}
