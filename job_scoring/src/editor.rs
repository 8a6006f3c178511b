//! Job-scoring editor: an input form and a read-only view over one job.
//!
//! [`EditorState`] holds two copies of the job. The draft is what the form
//! edits; the committed copy is what the server last confirmed. The committed
//! copy is only ever replaced from a server response, and whenever the editor
//! is in [`Mode::Viewing`] the draft equals it.
//!
//! [`JobEditor`] wraps the state with the Jobs and Candidates services. Loads
//! and saves on one editor run one at a time, and a response that comes back
//! after the editor was re-targeted or disposed is dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::files::{encode_names, FileAttachment, FilesField};
use crate::service::{DynCandidatesService, DynJobsService, ServiceError};
use crate::{FileHandle, Job, JobCreate, JobUpdate};

pub const DEFAULT_UPLOAD_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Editing,
    Viewing,
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("{0}")]
    Validation(String),

    #[error("job {0} not found")]
    NotFound(String),

    #[error("could not load job: {0}")]
    Load(#[source] ServiceError),

    #[error("could not upload {name}: {source}")]
    Upload {
        name: String,
        #[source]
        source: ServiceError,
    },

    #[error("could not save job: {0}")]
    Persist(#[source] ServiceError),

    #[error("job is not being edited")]
    NotEditing,

    #[error("a load or save is still running for this job")]
    Busy,

    #[error("editor moved on to another job before the response arrived")]
    Stale,

    #[error("editor has been closed")]
    Disposed,
}

/// Title, description and attachments of one job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobFields {
    pub title: String,
    pub description: String,
    pub files: Vec<FileAttachment>,
}

impl JobFields {
    pub fn from_job(job: &Job) -> Self {
        Self {
            title: job.title.clone(),
            description: job.description.clone().unwrap_or_default(),
            files: FilesField::decode(job.files.as_deref()).into_attachments(),
        }
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    fn without_payloads(&self) -> Self {
        Self {
            title: self.title.clone(),
            description: self.description.clone(),
            files: self.files.iter().map(FileAttachment::without_payload).collect(),
        }
    }
}

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorSnapshot {
    pub job_id: Option<String>,
    pub mode: Mode,
    pub draft: JobFields,
    pub committed: JobFields,
}

/// Everything a save needs, captured from the draft in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub job_id: Option<String>,
    pub title: String,
    pub description: String,
    pub uploads: Vec<FileHandle>,
}

impl SaveRequest {
    pub fn into_create(self, files: String) -> JobCreate {
        JobCreate {
            title: self.title,
            description: Some(self.description),
            files: Some(files),
        }
    }

    pub fn into_update(self, files: String) -> JobUpdate {
        JobUpdate {
            title: Some(self.title),
            description: Some(self.description),
            files: Some(files),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditorState {
    job_id: Option<String>,
    mode: Mode,
    draft: JobFields,
    committed: JobFields,
    // Only grows, so an id is never handed out twice in one session.
    next_file_id: u32,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    /// A new, unsaved job.
    pub fn new() -> Self {
        Self {
            job_id: None,
            mode: Mode::Editing,
            draft: JobFields::default(),
            committed: JobFields::default(),
            next_file_id: 1,
        }
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn draft(&self) -> &JobFields {
        &self.draft
    }

    pub fn committed(&self) -> &JobFields {
        &self.committed
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            job_id: self.job_id.clone(),
            mode: self.mode,
            draft: self.draft.clone(),
            committed: self.committed.clone(),
        }
    }

    fn ensure_editing(&self) -> Result<(), EditorError> {
        match self.mode {
            Mode::Editing => Ok(()),
            Mode::Viewing => Err(EditorError::NotEditing),
        }
    }

    pub fn enter_edit(&mut self) {
        if self.mode == Mode::Editing {
            return;
        }
        self.draft = self.committed.without_payloads();
        self.mode = Mode::Editing;
    }

    /// Throw the draft away. A job that was never saved has nothing to show,
    /// so it stays in the form with an empty draft.
    pub fn cancel_edit(&mut self) {
        if self.job_id.is_none() {
            self.draft = JobFields::default();
            return;
        }
        self.draft = self.committed.without_payloads();
        self.mode = Mode::Viewing;
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), EditorError> {
        self.ensure_editing()?;
        self.draft.title = title.into();
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), EditorError> {
        self.ensure_editing()?;
        self.draft.description = description.into();
        Ok(())
    }

    /// Append one attachment per handle, returning the ids handed out.
    pub fn attach_files<I>(&mut self, handles: I) -> Result<Vec<u32>, EditorError>
    where
        I: IntoIterator<Item = FileHandle>,
    {
        self.ensure_editing()?;

        let highest = self.draft.files.iter().map(|f| f.id).max().unwrap_or(0);
        self.next_file_id = self.next_file_id.max(highest + 1);

        let mut ids = Vec::new();
        for handle in handles {
            let id = self.next_file_id;
            self.next_file_id += 1;
            self.draft.files.push(FileAttachment::pending(id, handle));
            ids.push(id);
        }
        Ok(ids)
    }

    /// Returns whether anything was removed.
    pub fn remove_file(&mut self, file_id: u32) -> Result<bool, EditorError> {
        self.ensure_editing()?;
        let before = self.draft.files.len();
        self.draft.files.retain(|f| f.id != file_id);
        Ok(self.draft.files.len() != before)
    }

    pub fn prepare_save(&self) -> Result<SaveRequest, EditorError> {
        self.ensure_editing()?;
        if self.draft.title.trim().is_empty() {
            return Err(EditorError::Validation("Title is required".to_string()));
        }

        Ok(SaveRequest {
            job_id: self.job_id.clone(),
            title: self.draft.title.clone(),
            description: self.draft.description.clone(),
            uploads: self.draft.files.iter().map(FileAttachment::upload_handle).collect(),
        })
    }

    /// Replace both copies with what the server returned and switch to the
    /// read-only view.
    pub fn commit(&mut self, job: &Job) {
        self.committed = JobFields::from_job(job);
        self.draft = self.committed.clone();
        self.job_id = Some(job.id.clone());
        self.mode = Mode::Viewing;

        let decoded = u32::try_from(self.committed.files.len()).unwrap_or(u32::MAX - 1);
        self.next_file_id = self.next_file_id.max(decoded + 1);
    }

    /// Back to an empty, unsaved job. The attachment counter is kept.
    pub fn reset(&mut self) {
        self.job_id = None;
        self.mode = Mode::Editing;
        self.draft = JobFields::default();
        self.committed = JobFields::default();
    }
}

pub struct JobEditor {
    jobs: DynJobsService,
    candidates: DynCandidatesService,
    state: Mutex<EditorState>,
    // Held for the whole of a load or save.
    in_flight: Mutex<()>,
    epoch: AtomicU64,
    disposed: AtomicBool,
    upload_concurrency: usize,
}

impl std::fmt::Debug for JobEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobEditor")
            .field("epoch", &self.epoch.load(Ordering::SeqCst))
            .field("disposed", &self.disposed.load(Ordering::SeqCst))
            .field("upload_concurrency", &self.upload_concurrency)
            .finish()
    }
}

impl JobEditor {
    pub fn new(jobs: DynJobsService, candidates: DynCandidatesService) -> Self {
        Self {
            jobs,
            candidates,
            state: Mutex::new(EditorState::new()),
            in_flight: Mutex::new(()),
            epoch: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
            upload_concurrency: DEFAULT_UPLOAD_CONCURRENCY,
        }
    }

    pub fn with_upload_concurrency(mut self, limit: usize) -> Self {
        self.upload_concurrency = limit.max(1);
        self
    }

    pub async fn snapshot(&self) -> EditorSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn mode(&self) -> Mode {
        self.state.lock().await.mode()
    }

    pub async fn job_id(&self) -> Option<String> {
        self.state.lock().await.job_id().map(str::to_string)
    }

    fn ensure_live(&self) -> Result<(), EditorError> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(EditorError::Disposed);
        }
        Ok(())
    }

    fn ensure_current(&self, epoch: u64) -> Result<(), EditorError> {
        self.ensure_live()?;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            return Err(EditorError::Stale);
        }
        Ok(())
    }

    /// Fetch a job and show it read-only. If the job cannot be read the editor
    /// falls back to an empty, unsaved draft.
    pub async fn load(&self, job_id: &str) -> Result<EditorSnapshot, EditorError> {
        let _turn = self.in_flight.lock().await;
        self.ensure_live()?;
        let epoch = self.epoch.load(Ordering::SeqCst);

        debug!(job_id, "loading job");
        let result = self.jobs.read_job(job_id).await;

        let mut state = self.state.lock().await;
        if let Err(e) = self.ensure_current(epoch) {
            warn!(job_id, "dropping load response: {e}");
            return Err(e);
        }

        match result {
            Ok(job) => {
                state.commit(&job);
                info!(job_id, files = state.committed().files.len(), "job loaded");
                Ok(state.snapshot())
            }
            Err(ServiceError::NotFound(_)) => {
                state.reset();
                warn!(job_id, "job not found");
                Err(EditorError::NotFound(job_id.to_string()))
            }
            Err(e) => {
                state.reset();
                warn!(job_id, "job load failed: {e}");
                Err(EditorError::Load(e))
            }
        }
    }

    /// Upload every attachment, then create or update the job with the full
    /// list of stored names. Nothing changes locally unless the whole round
    /// trip succeeds.
    pub async fn save(&self) -> Result<Job, EditorError> {
        let _turn = self.in_flight.lock().await;
        self.ensure_live()?;
        let epoch = self.epoch.load(Ordering::SeqCst);

        let mut request = self.state.lock().await.prepare_save()?;
        let names = self.upload_all(std::mem::take(&mut request.uploads)).await?;
        let files = encode_names(&names);

        let result = match request.job_id.clone() {
            None => {
                debug!(files = %files, "creating job");
                self.jobs.create_job(&request.into_create(files)).await
            }
            Some(id) => {
                debug!(job_id = %id, files = %files, "updating job");
                self.jobs.update_job(&id, &request.into_update(files)).await
            }
        };
        let job = result.map_err(|e| {
            warn!("job save failed: {e}");
            EditorError::Persist(e)
        })?;

        let mut state = self.state.lock().await;
        if let Err(e) = self.ensure_current(epoch) {
            warn!(job_id = %job.id, "dropping save response: {e}");
            return Err(e);
        }
        state.commit(&job);
        info!(job_id = %job.id, files = state.committed().files.len(), "job saved");
        Ok(job)
    }

    async fn upload_all(&self, uploads: Vec<FileHandle>) -> Result<Vec<String>, EditorError> {
        stream::iter(uploads)
            .map(|handle| {
                let candidates = self.candidates.clone();
                async move {
                    match candidates.save_file(&handle).await {
                        Ok(saved) => Ok(saved.file_name),
                        Err(source) => {
                            warn!(file = %handle.name, "upload failed: {source}");
                            Err(EditorError::Upload {
                                name: handle.name,
                                source,
                            })
                        }
                    }
                }
            })
            .buffered(self.upload_concurrency)
            .try_collect()
            .await
    }

    // Draft changes are refused while a load or save is out, since its
    // response would overwrite them.
    fn ensure_idle(&self) -> Result<MutexGuard<'_, ()>, EditorError> {
        self.ensure_live()?;
        self.in_flight.try_lock().map_err(|_| EditorError::Busy)
    }

    pub async fn enter_edit(&self) -> Result<EditorSnapshot, EditorError> {
        let _idle = self.ensure_idle()?;
        let mut state = self.state.lock().await;
        state.enter_edit();
        Ok(state.snapshot())
    }

    pub async fn cancel_edit(&self) -> Result<EditorSnapshot, EditorError> {
        let _idle = self.ensure_idle()?;
        let mut state = self.state.lock().await;
        state.cancel_edit();
        Ok(state.snapshot())
    }

    pub async fn set_title(&self, title: impl Into<String>) -> Result<(), EditorError> {
        let _idle = self.ensure_idle()?;
        self.state.lock().await.set_title(title)
    }

    pub async fn set_description(&self, description: impl Into<String>) -> Result<(), EditorError> {
        let _idle = self.ensure_idle()?;
        self.state.lock().await.set_description(description)
    }

    pub async fn attach_files(&self, handles: Vec<FileHandle>) -> Result<Vec<u32>, EditorError> {
        let _idle = self.ensure_idle()?;
        self.state.lock().await.attach_files(handles)
    }

    pub async fn remove_file(&self, file_id: u32) -> Result<bool, EditorError> {
        let _idle = self.ensure_idle()?;
        self.state.lock().await.remove_file(file_id)
    }

    /// Point the editor at a fresh unsaved job. Loads or saves still running
    /// for the previous job are dropped when they return.
    pub async fn start_new(&self) -> Result<EditorSnapshot, EditorError> {
        self.ensure_live()?;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;
        state.reset();
        Ok(state.snapshot())
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}
