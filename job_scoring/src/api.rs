//! HTTP implementation of the Jobs, Candidates and analysis services.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    multipart::{Form, Part},
    Client, Response, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::service::{CandidatesService, JobAnalyzer, JobsService, ServiceError};
use crate::{FileHandle, Job, JobAnalysis, JobCreate, JobUpdate, JobsPublic, Message, SavedFile};

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ServiceError::Decode(e.to_string())
        } else {
            ServiceError::Transport(e.to_string())
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    retry_for: Duration,
}

impl ApiClient {
    pub fn new(cfg: &ClientConfig) -> Result<Self, ServiceError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &cfg.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ServiceError::Transport(format!("invalid API token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(Self {
            client: Client::builder()
                .timeout(cfg.timeout)
                .default_headers(headers)
                .build()?,
            base_url: cfg.api_url.clone(),
            retry_for: cfg.retry_for,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::Transport(format!("{} cannot be a base url", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn with_retry<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, ServiceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let policy = ExponentialBackoff {
            max_elapsed_time: Some(self.retry_for),
            ..ExponentialBackoff::default()
        };

        retry(policy, || {
            let attempt = op();
            async move {
                attempt.await.map_err(|e| {
                    if e.is_transient() {
                        warn!("{what} failed, retrying: {e}");
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
            }
        })
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        query: &[(&str, u32)],
        what: &str,
    ) -> Result<T, ServiceError> {
        debug!(?query, "GET {url}");
        let resp = self.client.get(url.clone()).query(query).send().await?;
        read_json(resp, what).await
    }
}

async fn read_json<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T, ServiceError> {
    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ServiceError::NotFound(what.to_string()));
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ServiceError::Status {
            status: status.as_u16(),
            detail: error_detail(&body),
        });
    }
    Ok(resp.json::<T>().await?)
}

/// FastAPI puts the reason in `detail`, either a string or a list of
/// validation errors.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("detail").map(|d| match d.as_str() {
                Some(s) => s.to_string(),
                None => d.to_string(),
            })
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl JobsService for ApiClient {
    async fn read_job(&self, id: &str) -> Result<Job, ServiceError> {
        let url = self.endpoint(&["jobs", id])?;
        let what = format!("job {id}");
        self.with_retry(&what, || self.get_json(&url, &[], &what))
            .await
    }

    async fn create_job(&self, job: &JobCreate) -> Result<Job, ServiceError> {
        let url = self.endpoint(&["jobs", ""])?;
        debug!("POST {url}");
        let resp = self.client.post(url).json(job).send().await?;
        read_json(resp, "jobs").await
    }

    async fn update_job(&self, id: &str, job: &JobUpdate) -> Result<Job, ServiceError> {
        let url = self.endpoint(&["jobs", id])?;
        debug!("PUT {url}");
        let resp = self.client.put(url).json(job).send().await?;
        read_json(resp, &format!("job {id}")).await
    }

    async fn read_jobs(&self, skip: u32, limit: u32) -> Result<JobsPublic, ServiceError> {
        let url = self.endpoint(&["jobs", ""])?;
        let query = [("skip", skip), ("limit", limit)];
        self.with_retry("job list", || self.get_json(&url, &query, "jobs"))
            .await
    }

    async fn delete_job(&self, id: &str) -> Result<Message, ServiceError> {
        let url = self.endpoint(&["jobs", id])?;
        debug!("DELETE {url}");
        let resp = self.client.delete(url).send().await?;
        read_json(resp, &format!("job {id}")).await
    }
}

#[async_trait]
impl CandidatesService for ApiClient {
    async fn save_file(&self, file: &FileHandle) -> Result<SavedFile, ServiceError> {
        let url = self.endpoint(&["candidate", "save-cv"])?;
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }

        debug!(file = %file.name, bytes = file.len(), "POST {url}");
        let resp = self
            .client
            .post(url)
            .multipart(Form::new().part("file", part))
            .send()
            .await?;
        read_json(resp, "candidate upload").await
    }
}

#[async_trait]
impl JobAnalyzer for ApiClient {
    async fn analyse_job(
        &self,
        title: &str,
        description: &str,
    ) -> Result<JobAnalysis, ServiceError> {
        let url = self.endpoint(&["analyse_job"])?;
        let payload = json!({
            "title": title,
            "description": description,
        });

        debug!("POST {url}");
        let resp = self.client.post(url).json(&payload).send().await?;
        read_json(resp, "job analysis").await
    }
}
