//! Scribe engine: backend client, poll timers and effect execution.
mod api;
mod engine;
mod persist;
mod poller;
mod settings;
mod types;

pub use api::{JobApi, ReqwestJobApi};
pub use engine::{EngineError, EngineHandle};
pub use persist::{ensure_output_dir, AtomicFileWriter, JobOutputs, PersistError};
pub use poller::{ChannelEventSink, EventSink, PollHandle};
pub use settings::EngineSettings;
pub use types::{
    ArtifactPoll, Channel, ClientError, EngineEvent, FailureKind, JobId, LogSnapshot, Upload,
};
