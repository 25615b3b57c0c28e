use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use scribe_engine::{
    ArtifactPoll, Channel, ChannelEventSink, ClientError, EngineEvent, EngineHandle,
    EngineSettings, JobApi, LogSnapshot, Upload,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_settings(base_url: String) -> EngineSettings {
    EngineSettings {
        base_url,
        log_poll_interval: Duration::from_millis(20),
        artifact_poll_interval: Duration::from_millis(20),
        ..EngineSettings::default()
    }
}

fn engine(settings: EngineSettings) -> (EngineHandle, mpsc::Receiver<EngineEvent>) {
    let (tx, rx) = mpsc::channel();
    let handle = EngineHandle::new(settings, Arc::new(ChannelEventSink::new(tx))).unwrap();
    (handle, rx)
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

fn next_event(rx: &mpsc::Receiver<EngineEvent>) -> EngineEvent {
    rx.recv_timeout(Duration::from_secs(2)).expect("engine event")
}

#[tokio::test(flavor = "multi_thread")]
async fn submit_then_poll_both_channels() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"logs":["Starting..."],"processing":true}"#,
            "application/json",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/graph"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (mut engine, rx) = engine(fast_settings(server.uri()));
    engine.submit(
        1,
        Upload {
            file_name: "code.zip".to_string(),
            archive: bytes::Bytes::from_static(b"PK"),
            email: "a@b.com".to_string(),
        },
    );
    assert_eq!(
        next_event(&rx),
        EngineEvent::SubmitCompleted {
            job_id: 1,
            result: Ok(())
        }
    );

    engine.start_polling(1, Channel::Log);
    engine.start_polling(1, Channel::Artifact);
    assert!(wait_until(|| engine.active_polls().len() == 2));
    assert_eq!(
        engine.active_polls(),
        vec![(1, Channel::Log), (1, Channel::Artifact)]
    );

    let mut saw_log = false;
    let mut saw_artifact = false;
    while !(saw_log && saw_artifact) {
        match next_event(&rx) {
            EngineEvent::LogPolled { job_id, result } => {
                assert_eq!(job_id, 1);
                assert_eq!(result.unwrap().logs, vec!["Starting...".to_string()]);
                saw_log = true;
            }
            EngineEvent::ArtifactPolled { job_id, result } => {
                assert_eq!(job_id, 1);
                assert_eq!(result, Ok(ArtifactPoll::NotReady));
                saw_artifact = true;
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    engine.stop_polling(1, Channel::Log);
    engine.stop_polling(1, Channel::Artifact);
    // Stopping twice is harmless.
    engine.stop_polling(1, Channel::Log);
    assert!(wait_until(|| engine.active_polls().is_empty()));

    engine.dispose();
    while rx.try_recv().is_ok() {}
    std::thread::sleep(Duration::from_millis(80));
    assert!(rx.try_recv().is_err(), "no events after dispose");
    engine.dispose();
}

#[tokio::test(flavor = "multi_thread")]
async fn artifact_becomes_ready_on_fourth_tick() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/graph"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/graph"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>graph</html>", "text/html"))
        .mount(&server)
        .await;

    let (engine, rx) = engine(fast_settings(server.uri()));
    engine.start_polling(1, Channel::Artifact);

    let polls: Vec<ArtifactPoll> = (0..4)
        .map(|_| match next_event(&rx) {
            EngineEvent::ArtifactPolled { result, .. } => result.expect("no tick failure"),
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    assert_eq!(
        polls,
        vec![
            ArtifactPoll::NotReady,
            ArtifactPoll::NotReady,
            ArtifactPoll::NotReady,
            ArtifactPoll::Ready("<html>graph</html>".to_string()),
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn restarting_a_channel_replaces_the_previous_job_handle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (engine, _rx) = engine(fast_settings(server.uri()));
    engine.start_polling(1, Channel::Log);
    engine.start_polling(2, Channel::Log);
    assert!(wait_until(|| engine.active_polls() == vec![(2, Channel::Log)]));

    // Stop for an old job id does not touch the new handle.
    engine.stop_polling(1, Channel::Log);
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(engine.active_polls(), vec![(2, Channel::Log)]);
}

/// Backend double that records how many log requests overlap.
struct SlowApi {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
    delay: Duration,
}

impl SlowApi {
    fn new(delay: Duration) -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            delay,
        }
    }
}

#[async_trait::async_trait]
impl JobApi for SlowApi {
    async fn submit(&self, _upload: &Upload) -> Result<(), ClientError> {
        Ok(())
    }

    async fn fetch_logs(&self) -> Result<LogSnapshot, ClientError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(LogSnapshot {
            logs: vec!["tick".to_string()],
            processing: true,
        })
    }

    async fn fetch_artifact(&self) -> Result<ArtifactPoll, ClientError> {
        Ok(ArtifactPoll::NotReady)
    }
}

#[test]
fn slow_requests_never_overlap_on_one_channel() {
    let api = Arc::new(SlowApi::new(Duration::from_millis(60)));
    let (tx, rx) = mpsc::channel();
    let settings = EngineSettings {
        log_poll_interval: Duration::from_millis(10),
        ..EngineSettings::default()
    };
    let mut engine =
        EngineHandle::with_api(api.clone(), settings, Arc::new(ChannelEventSink::new(tx))).unwrap();

    engine.start_polling(7, Channel::Log);
    for _ in 0..3 {
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(2)),
            Ok(EngineEvent::LogPolled { job_id: 7, .. })
        ));
    }
    engine.dispose();

    assert_eq!(api.max_in_flight.load(Ordering::SeqCst), 1);
    assert!(api.calls.load(Ordering::SeqCst) >= 3);
}

#[test]
fn result_of_request_in_flight_at_cancel_is_dropped() {
    let api = Arc::new(SlowApi::new(Duration::from_millis(150)));
    let (tx, rx) = mpsc::channel();
    let settings = EngineSettings {
        log_poll_interval: Duration::from_millis(10),
        ..EngineSettings::default()
    };
    let engine =
        EngineHandle::with_api(api.clone(), settings, Arc::new(ChannelEventSink::new(tx))).unwrap();

    engine.start_polling(1, Channel::Log);
    assert!(wait_until(|| api.in_flight.load(Ordering::SeqCst) == 1));
    engine.stop_polling(1, Channel::Log);
    assert!(wait_until(|| engine.active_polls().is_empty()));

    // The request finishes after cancellation; its result never reaches the sink.
    assert!(wait_until(|| api.in_flight.load(Ordering::SeqCst) == 0));
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
}
