use crate::{classify, JobId, JobStatus, Severity};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub job_id: Option<JobId>,
    pub status: JobStatus,
    pub logs: Vec<LogLineView>,
    pub artifact: Option<ArtifactView>,
    pub pinned_to_bottom: bool,
    pub console_open: bool,
    pub active_polls: usize,
    pub stalled: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLineView {
    pub text: String,
    pub severity: Severity,
}

impl LogLineView {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            severity: classify(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactView {
    pub revision: u32,
    pub html: String,
}
