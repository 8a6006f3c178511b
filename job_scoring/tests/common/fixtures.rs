use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use job_scoring::{
    CandidatesService, FileHandle, Job, JobCreate, JobEditor, JobUpdate, JobsPublic, JobsService,
    Message, SavedFile, ServiceError,
};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq)]
pub enum JobCall {
    Read(String),
    Create(JobCreate),
    Update(String, JobUpdate),
    List(u32, u32),
    Delete(String),
}

/// In-memory Jobs API that records every call.
#[derive(Default)]
pub struct FakeJobs {
    jobs: Mutex<HashMap<String, Job>>,
    calls: Mutex<Vec<JobCall>>,
    next_id: AtomicU64,
    fail_writes: AtomicBool,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeJobs {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, id: &str, title: &str, description: Option<&str>, files: Option<&str>) {
        self.jobs.lock().unwrap().insert(
            id.to_string(),
            Job {
                id: id.to_string(),
                title: title.to_string(),
                description: description.map(str::to_string),
                files: files.map(str::to_string),
                owner_id: None,
            },
        );
    }

    pub fn stored(&self, id: &str) -> Option<Job> {
        self.jobs.lock().unwrap().get(id).cloned()
    }

    pub fn calls(&self) -> Vec<JobCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every following call wait until the returned handle is notified.
    pub fn hold(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(notify.clone());
        notify
    }

    async fn record(&self, call: JobCall) {
        self.calls.lock().unwrap().push(call);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn write_result(&self) -> Result<(), ServiceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ServiceError::Status {
                status: 500,
                detail: "database unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl JobsService for FakeJobs {
    async fn read_job(&self, id: &str) -> Result<Job, ServiceError> {
        self.record(JobCall::Read(id.to_string())).await;
        self.stored(id)
            .ok_or_else(|| ServiceError::NotFound(format!("job {id}")))
    }

    async fn create_job(&self, job: &JobCreate) -> Result<Job, ServiceError> {
        self.record(JobCall::Create(job.clone())).await;
        self.write_result()?;
        let id = (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string();
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
        self.record(JobCall::Update(id.to_string(), job.clone())).await;
        self.write_result()?;
        let mut jobs = self.jobs.lock().unwrap();
        let stored = jobs
            .get_mut(id)
            .ok_or_else(|| ServiceError::NotFound(format!("job {id}")))?;
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
        self.record(JobCall::List(skip, limit)).await;
        let jobs = self.jobs.lock().unwrap();
        let mut all: Vec<Job> = jobs.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(JobsPublic {
            count: all.len() as u64,
            data: all.into_iter().skip(skip as usize).take(limit as usize).collect(),
        })
    }

    async fn delete_job(&self, id: &str) -> Result<Message, ServiceError> {
        self.record(JobCall::Delete(id.to_string())).await;
        match self.jobs.lock().unwrap().remove(id) {
            Some(_) => Ok(Message {
                message: "Job deleted successfully".to_string(),
            }),
            None => Err(ServiceError::NotFound(format!("job {id}"))),
        }
    }
}

/// In-memory candidate file store. Stored names are the uploaded names with
/// an optional prefix, like a server that renames files on disk.
#[derive(Default)]
pub struct FakeCandidates {
    uploads: Mutex<Vec<FileHandle>>,
    prefix: String,
    fail_on: Mutex<Option<String>>,
}

impl FakeCandidates {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn renaming(prefix: &str) -> Arc<Self> {
        Arc::new(Self {
            prefix: prefix.to_string(),
            ..Self::default()
        })
    }

    pub fn fail_on(&self, name: &str) {
        *self.fail_on.lock().unwrap() = Some(name.to_string());
    }

    pub fn uploads(&self) -> Vec<FileHandle> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn uploaded_names(&self) -> Vec<String> {
        self.uploads().into_iter().map(|h| h.name).collect()
    }
}

#[async_trait]
impl CandidatesService for FakeCandidates {
    async fn save_file(&self, file: &FileHandle) -> Result<SavedFile, ServiceError> {
        self.uploads.lock().unwrap().push(file.clone());
        if self.fail_on.lock().unwrap().as_deref() == Some(file.name.as_str()) {
            return Err(ServiceError::Transport("connection reset".to_string()));
        }
        Ok(SavedFile {
            file_name: format!("{}{}", self.prefix, file.name),
        })
    }
}

pub fn make_editor(jobs: &Arc<FakeJobs>, candidates: &Arc<FakeCandidates>) -> JobEditor {
    JobEditor::new(jobs.clone(), candidates.clone())
}

pub fn pdf(name: &str) -> FileHandle {
    FileHandle::new(name, format!("%PDF-1.7 {name}").into_bytes())
        .with_content_type("application/pdf")
}
