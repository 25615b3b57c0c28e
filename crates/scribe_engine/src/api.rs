use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use url::Url;

use crate::{ArtifactPoll, ClientError, EngineSettings, FailureKind, LogSnapshot, Upload};

/// The three backend endpoints the monitor depends on.
#[async_trait::async_trait]
pub trait JobApi: Send + Sync {
    async fn submit(&self, upload: &Upload) -> Result<(), ClientError>;

    async fn fetch_logs(&self) -> Result<LogSnapshot, ClientError>;

    /// `Ok(ArtifactPoll::NotReady)` for any non-success status or empty body.
    async fn fetch_artifact(&self) -> Result<ArtifactPoll, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestJobApi {
    client: reqwest::Client,
    submit_url: Url,
    logs_url: Url,
    artifact_url: Url,
    max_artifact_bytes: u64,
}

impl ReqwestJobApi {
    pub fn new(settings: &EngineSettings) -> Result<Self, ClientError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let endpoint = |path: &str| {
            base.join(path)
                .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))
        };

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            client,
            submit_url: endpoint(&settings.submit_path)?,
            logs_url: endpoint(&settings.logs_path)?,
            artifact_url: endpoint(&settings.artifact_path)?,
            max_artifact_bytes: settings.max_artifact_bytes,
        })
    }
}

#[async_trait::async_trait]
impl JobApi for ReqwestJobApi {
    async fn submit(&self, upload: &Upload) -> Result<(), ClientError> {
        let file = Part::bytes(upload.archive.to_vec()).file_name(upload.file_name.clone());
        let form = Form::new()
            .part("file", file)
            .text("email", upload.email.clone());

        let response = self
            .client
            .post(self.submit_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        Ok(())
    }

    async fn fetch_logs(&self) -> Result<LogSnapshot, ClientError> {
        let response = self
            .client
            .get(self.logs_url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| ClientError::new(FailureKind::MalformedBody, err.to_string()))
    }

    async fn fetch_artifact(&self) -> Result<ArtifactPoll, ClientError> {
        let response = self
            .client
            .get(self.artifact_url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if !response.status().is_success() {
            return Ok(ArtifactPoll::NotReady);
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.max_artifact_bytes {
                return Err(too_large(self.max_artifact_bytes, content_len));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > self.max_artifact_bytes {
                return Err(too_large(self.max_artifact_bytes, next_len));
            }
            body.extend_from_slice(&chunk);
        }

        let html = String::from_utf8(body)
            .map_err(|err| ClientError::new(FailureKind::MalformedBody, err.to_string()))?;
        if html.trim().is_empty() {
            // The backend answers 200 with an empty document until the graph exists.
            return Ok(ArtifactPoll::NotReady);
        }
        Ok(ArtifactPoll::Ready(html))
    }
}

fn too_large(max_bytes: u64, actual: u64) -> ClientError {
    ClientError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "artifact too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ClientError::new(FailureKind::MalformedBody, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}
