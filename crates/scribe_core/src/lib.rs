//! Scribe core: pure job-monitor state machine and console presentation helpers.
mod classify;
mod console;
mod effect;
mod form;
mod msg;
mod scroll;
mod state;
mod update;
mod view_model;

pub use classify::{classify, Severity};
pub use console::{ConsoleUpdate, LogConsole};
pub use effect::{Effect, Notification};
pub use form::{is_valid_email, validate_submission, Submission, ValidationError};
pub use msg::Msg;
pub use scroll::{ScrollCommand, ScrollTracker, PIN_THRESHOLD_PX};
pub use state::{
    AppState, Artifact, ArtifactPoll, Job, JobId, JobStatus, LogSnapshot, MonitorConfig,
    PollChannel, PollHandle, DEFAULT_STALE_AFTER_FAILURES,
};
pub use update::update;
pub use view_model::{AppViewModel, ArtifactView, LogLineView};
