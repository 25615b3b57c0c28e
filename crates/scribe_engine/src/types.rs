use std::fmt;

use bytes::Bytes;
use serde::Deserialize;

pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    Log,
    Artifact,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Log => write!(f, "log"),
            Channel::Artifact => write!(f, "artifact"),
        }
    }
}

/// Multipart payload for the submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub archive: Bytes,
    pub email: String,
}

/// Body of the log endpoint: the full log so far plus the backend's busy flag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
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
pub enum EngineEvent {
    SubmitCompleted {
        job_id: JobId,
        result: Result<(), ClientError>,
    },
    LogPolled {
        job_id: JobId,
        result: Result<LogSnapshot, ClientError>,
    },
    ArtifactPolled {
        job_id: JobId,
        result: Result<ArtifactPoll, ClientError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    MalformedBody,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::MalformedBody => write!(f, "malformed response body"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
