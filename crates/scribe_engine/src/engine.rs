use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use scribe_logging::{scribe_debug, scribe_info, scribe_warn};

use crate::api::{JobApi, ReqwestJobApi};
use crate::poller::{EventSink, PollHandle, PollRegistry};
use crate::{Channel, ClientError, EngineEvent, EngineSettings, JobId, Upload};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("invalid client configuration: {0}")]
    Client(#[from] ClientError),
}

enum EngineCommand {
    Submit { job_id: JobId, upload: Upload },
    StartPolling { job_id: JobId, channel: Channel },
    StopPolling { job_id: JobId, channel: Channel },
    Shutdown,
}

/// Owns the background runtime thread, the HTTP client and every live poll timer.
///
/// Commands are processed in the order they are sent. Dropping the handle stops all
/// polls and joins the thread.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    registry: Arc<Mutex<PollRegistry>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        let api = Arc::new(ReqwestJobApi::new(&settings)?);
        Self::with_api(api, settings, sink)
    }

    /// Same as [`EngineHandle::new`] but with a caller-provided backend client.
    pub fn with_api(
        api: Arc<dyn JobApi>,
        settings: EngineSettings,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("scribe-engine")
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let registry = Arc::new(Mutex::new(PollRegistry::default()));
        let worker_registry = registry.clone();

        let worker = thread::Builder::new()
            .name("scribe-engine-commands".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::Submit { job_id, upload } => {
                            let api = api.clone();
                            let sink = sink.clone();
                            runtime.spawn(async move {
                                let result = api.submit(&upload).await;
                                sink.emit(EngineEvent::SubmitCompleted { job_id, result });
                            });
                        }
                        EngineCommand::StartPolling { job_id, channel } => {
                            scribe_debug!("Starting {} poll for job {}", channel, job_id);
                            let handle = PollHandle::spawn(
                                runtime.handle(),
                                api.clone(),
                                job_id,
                                channel,
                                settings.poll_interval(channel),
                                sink.clone(),
                            );
                            lock(&worker_registry).start(handle);
                        }
                        EngineCommand::StopPolling { job_id, channel } => {
                            if lock(&worker_registry).stop(job_id, channel) {
                                scribe_debug!("Stopped {} poll for job {}", channel, job_id);
                            }
                        }
                        EngineCommand::Shutdown => break,
                    }
                }
                lock(&worker_registry).stop_all();
                runtime.shutdown_timeout(Duration::from_secs(1));
                scribe_info!("Engine stopped");
            })?;

        Ok(Self {
            cmd_tx,
            registry,
            worker: Some(worker),
        })
    }

    pub fn submit(&self, job_id: JobId, upload: Upload) {
        self.send(EngineCommand::Submit { job_id, upload });
    }

    pub fn start_polling(&self, job_id: JobId, channel: Channel) {
        self.send(EngineCommand::StartPolling { job_id, channel });
    }

    pub fn stop_polling(&self, job_id: JobId, channel: Channel) {
        self.send(EngineCommand::StopPolling { job_id, channel });
    }

    /// Live (not cancelled) poll handles, ordered by channel.
    pub fn active_polls(&self) -> Vec<(JobId, Channel)> {
        lock(&self.registry).active()
    }

    /// Stops every poll and joins the engine thread. Calling it twice is a no-op.
    pub fn dispose(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if worker.join().is_err() {
            scribe_warn!("Engine thread panicked during shutdown");
        }
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            scribe_warn!("Engine command dropped: engine already stopped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn lock(registry: &Mutex<PollRegistry>) -> MutexGuard<'_, PollRegistry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
