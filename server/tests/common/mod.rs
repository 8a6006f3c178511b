#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use job_scoring::{
    CandidatesService, FileHandle, Job, JobAnalysis, JobAnalyzer, JobCreate, JobUpdate,
    JobsPublic, JobsService, Message, SavedFile, ServiceError,
};
use job_scoring_server::{app, state::AppState};

/// One in-memory backend standing in for the jobs, candidates and analysis
/// endpoints.
#[derive(Default)]
pub struct Backend {
    jobs: Mutex<HashMap<String, Job>>,
    uploads: Mutex<Vec<FileHandle>>,
    next_id: AtomicU64,
}

impl Backend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, id: &str, title: &str, description: &str, files: &str) {
        self.jobs.lock().unwrap().insert(
            id.to_string(),
            Job {
                id: id.to_string(),
                title: title.to_string(),
                description: Some(description.to_string()),
                files: Some(files.to_string()),
                owner_id: None,
            },
        );
    }

    pub fn stored(&self, id: &str) -> Option<Job> {
        self.jobs.lock().unwrap().get(id).cloned()
    }

    pub fn uploads(&self) -> Vec<FileHandle> {
        self.uploads.lock().unwrap().clone()
    }
}

fn missing(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("job {id}"))
}

#[async_trait]
impl JobsService for Backend {
    async fn read_job(&self, id: &str) -> Result<Job, ServiceError> {
        self.stored(id).ok_or_else(|| missing(id))
    }

    async fn create_job(&self, job: &JobCreate) -> Result<Job, ServiceError> {
        let id = format!("job-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let created = Job {
            id: id.clone(),
            title: job.title.clone(),
            description: job.description.clone(),
            files: job.files.clone(),
            owner_id: Some("owner-1".to_string()),
        };
        self.jobs.lock().unwrap().insert(id, created.clone());
        Ok(created)
    }

    async fn update_job(&self, id: &str, job: &JobUpdate) -> Result<Job, ServiceError> {
        let mut jobs = self.jobs.lock().unwrap();
        let stored = jobs.get_mut(id).ok_or_else(|| missing(id))?;
        if let Some(title) = &job.title {
            stored.title = title.clone();
        }
        if let Some(description) = &job.description {
            stored.description = Some(description.clone());
        }
        if let Some(files) = &job.files {
            stored.files = Some(files.clone());
        }
        Ok(stored.clone())
    }

    async fn read_jobs(&self, skip: u32, limit: u32) -> Result<JobsPublic, ServiceError> {
        let jobs = self.jobs.lock().unwrap();
        let mut all: Vec<Job> = jobs.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(JobsPublic {
            count: all.len() as u64,
            data: all.into_iter().skip(skip as usize).take(limit as usize).collect(),
        })
    }

    async fn delete_job(&self, id: &str) -> Result<Message, ServiceError> {
        match self.jobs.lock().unwrap().remove(id) {
            Some(_) => Ok(Message {
                message: "Job deleted successfully".to_string(),
            }),
            None => Err(missing(id)),
        }
    }
}

#[async_trait]
impl CandidatesService for Backend {
    async fn save_file(&self, file: &FileHandle) -> Result<SavedFile, ServiceError> {
        self.uploads.lock().unwrap().push(file.clone());
        Ok(SavedFile {
            file_name: file.name.clone(),
        })
    }
}

#[async_trait]
impl JobAnalyzer for Backend {
    async fn analyse_job(&self, _title: &str, description: &str) -> Result<JobAnalysis, ServiceError> {
        let technical_skill = ["Rust", "Go", "SQL"]
            .into_iter()
            .filter(|skill| description.contains(skill))
            .map(str::to_string)
            .collect();
        Ok(JobAnalysis {
            technical_skill,
            ..JobAnalysis::default()
        })
    }
}

pub fn state_for(backend: Arc<Backend>) -> AppState {
    AppState::new(backend.clone(), backend.clone(), backend)
}

/// Serve the app on an ephemeral port and return its `/api` base url.
pub async fn spawn_app(backend: Arc<Backend>) -> anyhow::Result<String> {
    serve(state_for(backend)).await
}

pub async fn serve(state: AppState) -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app(state)).await;
    });
    Ok(format!("http://{addr}/api"))
}
