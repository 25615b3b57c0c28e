use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use scribe_logging::{scribe_debug, scribe_trace};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{Channel, EngineEvent, JobApi, JobId};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// A live repeating poll for one channel of one job.
///
/// Cancelling stops the timer before its next tick. A request that is already in
/// flight runs to completion but its result is dropped. Dropping the handle cancels it.
pub struct PollHandle {
    job_id: JobId,
    channel: Channel,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn spawn(
        runtime: &Handle,
        api: Arc<dyn JobApi>,
        job_id: JobId,
        channel: Channel,
        period: Duration,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let token = CancellationToken::new();
        let task = runtime.spawn(run_poll_loop(
            api,
            job_id,
            channel,
            period,
            sink,
            token.clone(),
        ));
        Self {
            job_id,
            channel,
            token,
            task,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True once the loop task has returned.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn run_poll_loop(
    api: Arc<dyn JobApi>,
    job_id: JobId,
    channel: Channel,
    period: Duration,
    sink: Arc<dyn EventSink>,
    token: CancellationToken,
) {
    let period = period.max(MIN_POLL_INTERVAL);
    let mut ticker = interval_at(Instant::now() + period, period);
    // A tick that fires while a request is pending is dropped, so at most one
    // request per channel is ever in flight.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut tick: u64 = 0;

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }
        tick += 1;
        scribe_trace!("Poll tick {} job_id={} channel={}", tick, job_id, channel);

        let event = match channel {
            Channel::Log => EngineEvent::LogPolled {
                job_id,
                result: api.fetch_logs().await,
            },
            Channel::Artifact => EngineEvent::ArtifactPolled {
                job_id,
                result: api.fetch_artifact().await,
            },
        };

        if token.is_cancelled() {
            scribe_trace!("Dropping {} result for cancelled job {}", channel, job_id);
            break;
        }
        sink.emit(event);
    }
    scribe_debug!("Poll loop stopped job_id={} channel={}", job_id, channel);
}

/// At most one live handle per channel.
#[derive(Default)]
pub(crate) struct PollRegistry {
    handles: HashMap<Channel, PollHandle>,
}

impl PollRegistry {
    /// Registers `handle`, cancelling whatever was live on its channel.
    pub(crate) fn start(&mut self, handle: PollHandle) {
        if let Some(previous) = self.handles.insert(handle.channel(), handle) {
            previous.cancel();
        }
    }

    /// Cancels the channel's handle if it belongs to `job_id`. Unknown handles are a no-op.
    pub(crate) fn stop(&mut self, job_id: JobId, channel: Channel) -> bool {
        match self.handles.get(&channel) {
            Some(handle) if handle.job_id() == job_id => {
                if let Some(handle) = self.handles.remove(&channel) {
                    handle.cancel();
                }
                true
            }
            _ => false,
        }
    }

    pub(crate) fn stop_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.cancel();
        }
    }

    pub(crate) fn active(&self) -> Vec<(JobId, Channel)> {
        let mut active: Vec<_> = self
            .handles
            .values()
            .filter(|handle| !handle.is_cancelled())
            .map(|handle| (handle.job_id(), handle.channel()))
            .collect();
        active.sort_by_key(|(_, channel)| *channel);
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArtifactPoll, ClientError, LogSnapshot, Upload};

    struct NeverCalled;

    #[async_trait::async_trait]
    impl JobApi for NeverCalled {
        async fn submit(&self, _upload: &Upload) -> Result<(), ClientError> {
            unreachable!("submit is not polled")
        }

        async fn fetch_logs(&self) -> Result<LogSnapshot, ClientError> {
            Ok(LogSnapshot::default())
        }

        async fn fetch_artifact(&self) -> Result<ArtifactPoll, ClientError> {
            Ok(ArtifactPoll::NotReady)
        }
    }

    struct Discard;

    impl EventSink for Discard {
        fn emit(&self, _event: EngineEvent) {}
    }

    #[test]
    fn cancelled_loop_finishes_and_registry_forgets_it() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let spawn = |job_id, channel| {
            PollHandle::spawn(
                runtime.handle(),
                Arc::new(NeverCalled),
                job_id,
                channel,
                Duration::from_secs(60),
                Arc::new(Discard),
            )
        };

        let mut registry = PollRegistry::default();
        registry.start(spawn(1, Channel::Artifact));
        registry.start(spawn(1, Channel::Log));
        assert_eq!(
            registry.active(),
            vec![(1, Channel::Log), (1, Channel::Artifact)]
        );

        assert!(!registry.stop(2, Channel::Log));
        assert!(registry.stop(1, Channel::Log));
        assert_eq!(registry.active(), vec![(1, Channel::Artifact)]);

        let handle = spawn(3, Channel::Log);
        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !handle.is_finished() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(handle.is_finished());

        registry.stop_all();
        assert!(registry.active().is_empty());
    }
}
