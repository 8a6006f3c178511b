use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::{FileHandle, Job, JobAnalysis, JobCreate, JobUpdate, JobsPublic, Message, SavedFile};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("server responded {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// Worth another attempt for idempotent calls.
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Transport(_) => true,
            ServiceError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Job records held by the recruiting backend.
#[async_trait]
pub trait JobsService: Send + Sync {
    async fn read_job(&self, id: &str) -> Result<Job, ServiceError>;

    async fn create_job(&self, job: &JobCreate) -> Result<Job, ServiceError>;

    async fn update_job(&self, id: &str, job: &JobUpdate) -> Result<Job, ServiceError>;

    async fn read_jobs(&self, skip: u32, limit: u32) -> Result<JobsPublic, ServiceError>;

    async fn delete_job(&self, id: &str) -> Result<Message, ServiceError>;
}

/// Candidate file storage. Every call stores one file and returns the name the
/// server filed it under.
#[async_trait]
pub trait CandidatesService: Send + Sync {
    async fn save_file(&self, file: &FileHandle) -> Result<SavedFile, ServiceError>;
}

#[async_trait]
pub trait JobAnalyzer: Send + Sync {
    async fn analyse_job(
        &self,
        title: &str,
        description: &str,
    ) -> Result<JobAnalysis, ServiceError>;
}

pub type DynJobsService = Arc<dyn JobsService>;
pub type DynCandidatesService = Arc<dyn CandidatesService>;
pub type DynJobAnalyzer = Arc<dyn JobAnalyzer>;
