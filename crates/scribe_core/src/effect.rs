use crate::{JobId, PollChannel, Submission};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Submit {
        job_id: JobId,
        submission: Submission,
    },
    StartPolling {
        job_id: JobId,
        channel: PollChannel,
    },
    StopPolling {
        job_id: JobId,
        channel: PollChannel,
    },
    ScrollConsoleToBottom,
    Notify(Notification),
}

/// One-time user-visible signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Completed { job_id: JobId },
    SubmissionFailed { job_id: JobId, message: String },
    Stalled { job_id: JobId },
}
