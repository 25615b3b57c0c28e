use crate::scroll::{ScrollCommand, ScrollTracker};
use crate::view_model::{AppViewModel, ArtifactView, LogLineView};

pub type JobId = u64;

/// Consecutive failed log ticks before a running job is reported as stalled.
pub const DEFAULT_STALE_AFTER_FAILURES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Idle,
    Submitting,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PollChannel {
    Log,
    Artifact,
}

/// Full log state as reported by the backend on one tick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogSnapshot {
    pub logs: Vec<String>,
    pub processing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactPoll {
    Ready(String),
    NotReady,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Bumped every time the payload changes within a job, starting at 1.
    pub revision: u32,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Job {
    id: Option<JobId>,
    status: JobStatus,
    logs: Vec<String>,
    artifact: Option<Artifact>,
}

impl Job {
    pub fn id(&self) -> Option<JobId> {
        self.id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }
}

/// Logical ownership of one channel's repeating timer for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PollHandle {
    pub job_id: JobId,
    pub channel: PollChannel,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PollRegistry {
    log: Option<PollHandle>,
    artifact: Option<PollHandle>,
}

impl PollRegistry {
    fn slot(&mut self, channel: PollChannel) -> &mut Option<PollHandle> {
        match channel {
            PollChannel::Log => &mut self.log,
            PollChannel::Artifact => &mut self.artifact,
        }
    }

    fn register(&mut self, handle: PollHandle) -> Option<PollHandle> {
        self.slot(handle.channel).replace(handle)
    }

    fn is_live(&self, job_id: JobId, channel: PollChannel) -> bool {
        let slot = match channel {
            PollChannel::Log => self.log,
            PollChannel::Artifact => self.artifact,
        };
        slot.is_some_and(|handle| handle.job_id == job_id)
    }

    fn live(&self) -> Vec<PollHandle> {
        self.log.into_iter().chain(self.artifact).collect()
    }

    fn release_all(&mut self) -> Vec<PollHandle> {
        self.log.take().into_iter().chain(self.artifact.take()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    pub stale_after_failures: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            stale_after_failures: DEFAULT_STALE_AFTER_FAILURES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    config: MonitorConfig,
    job: Job,
    next_job_id: JobId,
    polls: PollRegistry,
    scroll: ScrollTracker,
    console_open: bool,
    log_failures: u32,
    stalled: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MonitorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn live_polls(&self) -> Vec<PollHandle> {
        self.polls.live()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            job_id: self.job.id,
            status: self.job.status,
            logs: self.job.logs.iter().map(|line| LogLineView::new(line)).collect(),
            artifact: self.job.artifact.as_ref().map(|artifact| ArtifactView {
                revision: artifact.revision,
                html: artifact.html.clone(),
            }),
            pinned_to_bottom: self.scroll.is_pinned(),
            console_open: self.console_open,
            active_polls: self.polls.live().len(),
            stalled: self.stalled,
            dirty: self.dirty,
        }
    }

    /// Returns whether the state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Resets the job record for a new submission. Returns the new id and the
    /// handles of the previous job that must be stopped.
    pub(crate) fn begin_submission(&mut self) -> (JobId, Vec<PollHandle>) {
        let released = self.polls.release_all();
        self.next_job_id += 1;
        let job_id = self.next_job_id;
        self.job = Job {
            id: Some(job_id),
            status: JobStatus::Submitting,
            logs: Vec::new(),
            artifact: None,
        };
        self.scroll = ScrollTracker::new();
        self.console_open = true;
        self.log_failures = 0;
        self.stalled = false;
        self.dirty = true;
        (job_id, released)
    }

    fn is_current(&self, job_id: JobId, status: JobStatus) -> bool {
        self.job.id == Some(job_id) && self.job.status == status
    }

    /// Submitting -> Running. Registers one handle per channel and returns them.
    pub(crate) fn mark_running(&mut self, job_id: JobId) -> Option<Vec<PollHandle>> {
        if !self.is_current(job_id, JobStatus::Submitting) {
            return None;
        }
        self.job.status = JobStatus::Running;
        let handles = vec![
            PollHandle {
                job_id,
                channel: PollChannel::Log,
            },
            PollHandle {
                job_id,
                channel: PollChannel::Artifact,
            },
        ];
        for handle in &handles {
            self.polls.register(*handle);
        }
        self.dirty = true;
        Some(handles)
    }

    /// Submitting -> Failed. Returns false for responses to an outdated submission.
    pub(crate) fn mark_failed(&mut self, job_id: JobId) -> bool {
        if !self.is_current(job_id, JobStatus::Submitting) {
            return false;
        }
        self.job.status = JobStatus::Failed;
        self.dirty = true;
        true
    }

    /// Stale-response guard for poll results.
    pub(crate) fn accepts_poll(&self, job_id: JobId, channel: PollChannel) -> bool {
        self.is_current(job_id, JobStatus::Running) && self.polls.is_live(job_id, channel)
    }

    pub(crate) fn logs_len(&self) -> usize {
        self.job.logs.len()
    }

    /// Snapshot replace. Returns whether the log grew.
    pub(crate) fn replace_logs(&mut self, logs: Vec<String>) -> bool {
        let grew = logs.len() > self.job.logs.len();
        if logs != self.job.logs {
            self.job.logs = logs;
            self.dirty = true;
        }
        grew
    }

    /// Running -> Completed. Returns the handles to stop.
    pub(crate) fn complete(&mut self) -> Vec<PollHandle> {
        self.job.status = JobStatus::Completed;
        self.stalled = false;
        self.dirty = true;
        self.polls.release_all()
    }

    pub(crate) fn release_all_polls(&mut self) -> Vec<PollHandle> {
        let released = self.polls.release_all();
        if !released.is_empty() {
            self.dirty = true;
        }
        released
    }

    /// Returns whether the payload differs from the current artifact.
    pub(crate) fn set_artifact(&mut self, html: String) -> bool {
        let revision = match &self.job.artifact {
            Some(current) if current.html == html => return false,
            Some(current) => current.revision + 1,
            None => 1,
        };
        self.job.artifact = Some(Artifact { revision, html });
        self.dirty = true;
        true
    }

    /// Counts a failed log tick. Returns true exactly once, when the job
    /// crosses the stale threshold.
    pub(crate) fn record_log_failure(&mut self) -> bool {
        self.log_failures = self.log_failures.saturating_add(1);
        let threshold = self.config.stale_after_failures.max(1);
        if !self.stalled && self.log_failures >= threshold {
            self.stalled = true;
            self.dirty = true;
            return true;
        }
        false
    }

    pub(crate) fn clear_log_failures(&mut self) {
        self.log_failures = 0;
        if self.stalled {
            self.stalled = false;
            self.dirty = true;
        }
    }

    pub(crate) fn on_scroll(&mut self, viewport_height: f64, content_height: f64, offset: f64) {
        let was_pinned = self.scroll.is_pinned();
        self.scroll.on_scroll(viewport_height, content_height, offset);
        if was_pinned != self.scroll.is_pinned() {
            self.dirty = true;
        }
    }

    pub(crate) fn on_content_grew(&self) -> ScrollCommand {
        self.scroll.on_content_grew()
    }

    pub(crate) fn force_pin(&mut self) -> ScrollCommand {
        self.dirty = true;
        self.scroll.force_pin()
    }

    pub(crate) fn toggle_console(&mut self) {
        self.console_open = !self.console_open;
        self.dirty = true;
    }
}
