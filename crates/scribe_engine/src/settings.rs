use std::time::Duration;

use crate::Channel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub base_url: String,
    pub submit_path: String,
    pub logs_path: String,
    pub artifact_path: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub log_poll_interval: Duration,
    pub artifact_poll_interval: Duration,
    pub max_artifact_bytes: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            submit_path: "/api/upload".to_string(),
            logs_path: "/api/logs".to_string(),
            artifact_path: "/api/graph".to_string(),
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(5),
            log_poll_interval: Duration::from_secs(1),
            artifact_poll_interval: Duration::from_secs(1),
            max_artifact_bytes: 8 * 1024 * 1024,
        }
    }
}

impl EngineSettings {
    pub fn poll_interval(&self, channel: Channel) -> Duration {
        match channel {
            Channel::Log => self.log_poll_interval,
            Channel::Artifact => self.artifact_poll_interval,
        }
    }
}
