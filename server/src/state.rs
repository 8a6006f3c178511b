use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use job_scoring::{DynCandidatesService, DynJobAnalyzer, DynJobsService, JobEditor};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::info;
use uuid::Uuid;

pub struct Session {
    pub editor: Arc<JobEditor>,
    pub last_seen: Instant,
}

// Open editor sessions: editor_id → session
#[derive(Clone)]
pub struct AppState {
    pub editors: Arc<DashMap<Uuid, Session>>,
    pub jobs: DynJobsService,
    pub candidates: DynCandidatesService,
    pub analyzer: DynJobAnalyzer,
    pub upload_concurrency: usize,
}

impl AppState {
    pub fn new(
        jobs: DynJobsService,
        candidates: DynCandidatesService,
        analyzer: DynJobAnalyzer,
    ) -> Self {
        AppState {
            editors: Arc::new(DashMap::new()),
            jobs,
            candidates,
            analyzer,
            upload_concurrency: job_scoring::editor::DEFAULT_UPLOAD_CONCURRENCY,
        }
    }

    pub fn with_upload_concurrency(mut self, limit: usize) -> Self {
        self.upload_concurrency = limit.max(1);
        self
    }

    pub fn open_editor(&self) -> (Uuid, Arc<JobEditor>) {
        let id = Uuid::new_v4();
        let editor = Arc::new(
            JobEditor::new(self.jobs.clone(), self.candidates.clone())
                .with_upload_concurrency(self.upload_concurrency),
        );
        self.editors.insert(
            id,
            Session {
                editor: editor.clone(),
                last_seen: Instant::now(),
            },
        );
        (id, editor)
    }

    /// Look up a session and mark it as used.
    pub fn editor(&self, id: &Uuid) -> Option<Arc<JobEditor>> {
        self.editors.get_mut(id).map(|mut session| {
            session.last_seen = Instant::now();
            session.editor.clone()
        })
    }

    /// Drop the session. Anything still in flight for it is discarded.
    pub fn close_editor(&self, id: &Uuid) -> bool {
        match self.editors.remove(id) {
            Some((_, session)) => {
                session.editor.dispose();
                true
            }
            None => false,
        }
    }

    /// Close every session untouched for longer than `max_idle`.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let before = self.editors.len();
        self.editors.retain(|id, session| {
            let idle = session.last_seen.elapsed();
            if idle < max_idle {
                return true;
            }
            session.editor.dispose();
            info!(editor_id = %id, idle_secs = idle.as_secs(), "idle editor evicted");
            false
        });
        before.saturating_sub(self.editors.len())
    }

    /// Run [`AppState::evict_idle`] every `every` until the task is aborted.
    pub fn spawn_sweeper(&self, max_idle: Duration, every: Duration) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval(every);
            loop {
                ticker.tick().await;
                state.evict_idle(max_idle);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use job_scoring::{
        CandidatesService, FileHandle, Job, JobAnalysis, JobAnalyzer, JobCreate, JobUpdate,
        JobsPublic, JobsService, Message, SavedFile, ServiceError,
    };

    struct Offline;

    fn offline() -> ServiceError {
        ServiceError::Transport("offline".to_string())
    }

    #[async_trait]
    impl JobsService for Offline {
        async fn read_job(&self, _id: &str) -> Result<Job, ServiceError> {
            Err(offline())
        }
        async fn create_job(&self, _job: &JobCreate) -> Result<Job, ServiceError> {
            Err(offline())
        }
        async fn update_job(&self, _id: &str, _job: &JobUpdate) -> Result<Job, ServiceError> {
            Err(offline())
        }
        async fn read_jobs(&self, _skip: u32, _limit: u32) -> Result<JobsPublic, ServiceError> {
            Err(offline())
        }
        async fn delete_job(&self, _id: &str) -> Result<Message, ServiceError> {
            Err(offline())
        }
    }

    #[async_trait]
    impl CandidatesService for Offline {
        async fn save_file(&self, _file: &FileHandle) -> Result<SavedFile, ServiceError> {
            Err(offline())
        }
    }

    #[async_trait]
    impl JobAnalyzer for Offline {
        async fn analyse_job(&self, _t: &str, _d: &str) -> Result<JobAnalysis, ServiceError> {
            Err(offline())
        }
    }

    fn state() -> AppState {
        let backend = Arc::new(Offline);
        AppState::new(backend.clone(), backend.clone(), backend)
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted_and_disposed() {
        let state = state();
        let (stale_id, stale) = state.open_editor();
        time::sleep(Duration::from_millis(60)).await;
        let (fresh_id, _) = state.open_editor();

        assert_eq!(state.evict_idle(Duration::from_millis(40)), 1);
        assert!(stale.is_disposed());
        assert!(state.editor(&stale_id).is_none());
        assert!(state.editor(&fresh_id).is_some());
    }

    #[tokio::test]
    async fn lookups_keep_a_session_alive() {
        let state = state();
        let (id, _) = state.open_editor();
        time::sleep(Duration::from_millis(60)).await;
        assert!(state.editor(&id).is_some());

        assert_eq!(state.evict_idle(Duration::from_millis(40)), 0);
        assert!(state.editor(&id).is_some());
    }
}
