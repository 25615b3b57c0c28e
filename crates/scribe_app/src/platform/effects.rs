use std::sync::{mpsc, Arc};

use bytes::Bytes;
use scribe_core::{ArtifactPoll, Effect, LogSnapshot, Msg, PollChannel, Submission};
use scribe_engine::{
    Channel, EngineError, EngineEvent, EngineHandle, EngineSettings, EventSink, Upload,
};
use scribe_logging::{scribe_debug, scribe_info, scribe_warn};

use super::app::AppEvent;

/// Executes engine-bound effects and hands the presentation ones back to the caller.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: EngineSettings, events: mpsc::Sender<AppEvent>) -> Result<Self, EngineError> {
        let sink = Arc::new(MsgSink { tx: events });
        let engine = EngineHandle::new(settings, sink)?;
        Ok(Self { engine })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut presentation = Vec::new();
        for effect in effects {
            match effect {
                Effect::Submit { job_id, submission } => {
                    scribe_info!(
                        "Submit job_id={} file={} bytes={}",
                        job_id,
                        submission.file_name(),
                        submission.archive().len()
                    );
                    self.engine.submit(job_id, to_upload(&submission));
                }
                Effect::StartPolling { job_id, channel } => {
                    self.engine.start_polling(job_id, map_channel(channel));
                }
                Effect::StopPolling { job_id, channel } => {
                    self.engine.stop_polling(job_id, map_channel(channel));
                }
                other => presentation.push(other),
            }
        }
        presentation
    }

    pub fn dispose(&mut self) {
        self.engine.dispose();
    }
}

/// Forwards engine results onto the app's message channel.
struct MsgSink {
    tx: mpsc::Sender<AppEvent>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(AppEvent::Msg(map_event(event)));
    }
}

fn to_upload(submission: &Submission) -> Upload {
    Upload {
        file_name: submission.file_name().to_string(),
        archive: Bytes::copy_from_slice(submission.archive()),
        email: submission.email().to_string(),
    }
}

fn map_channel(channel: PollChannel) -> Channel {
    match channel {
        PollChannel::Log => Channel::Log,
        PollChannel::Artifact => Channel::Artifact,
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::SubmitCompleted { job_id, result } => match result {
            Ok(()) => Msg::SubmitSucceeded { job_id },
            Err(err) => {
                scribe_warn!("Submission for job {} failed: {}", job_id, err);
                Msg::SubmitFailed {
                    job_id,
                    message: err.to_string(),
                }
            }
        },
        EngineEvent::LogPolled { job_id, result } => match result {
            Ok(snapshot) => Msg::LogPolled {
                job_id,
                snapshot: LogSnapshot {
                    logs: snapshot.logs,
                    processing: snapshot.processing,
                },
            },
            Err(err) => {
                scribe_debug!("Log poll failed for job {}: {}", job_id, err);
                Msg::LogPollFailed {
                    job_id,
                    message: err.to_string(),
                }
            }
        },
        EngineEvent::ArtifactPolled { job_id, result } => match result {
            Ok(poll) => Msg::ArtifactPolled {
                job_id,
                poll: match poll {
                    scribe_engine::ArtifactPoll::Ready(html) => ArtifactPoll::Ready(html),
                    scribe_engine::ArtifactPoll::NotReady => ArtifactPoll::NotReady,
                },
            },
            Err(err) => {
                scribe_debug!("Artifact poll failed for job {}: {}", job_id, err);
                Msg::ArtifactPollFailed {
                    job_id,
                    message: err.to_string(),
                }
            }
        },
    }
}
