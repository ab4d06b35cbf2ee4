use std::collections::HashMap;
use std::sync::{Arc, RwLock as StdRwLock};

use serde::Serialize;
use tokio::sync::RwLock;

use corso_core::api::{BatchGenerationStatus, CourseId, CourseService};
use corso_core::bulk::BulkSummary;
use corso_core::collection::CollectionCoordinator;
use corso_core::session::{CourseSession, SessionError};
use corso_core::{Config, SanitizedConfig};

/// How a background bulk run ended.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BulkRunOutcome {
    NothingToDo,
    Completed(BulkSummary),
    Failed { error: String },
}

/// Server-side view of a course's bulk generation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkRunState {
    pub running: bool,
    pub latest: Option<BatchGenerationStatus>,
    pub outcome: Option<BulkRunOutcome>,
}

/// Shared application state
pub struct AppState {
    config: Config,
    service: Arc<dyn CourseService>,
    collection: CollectionCoordinator,
    sessions: RwLock<HashMap<CourseId, Arc<CourseSession>>>,
    // Std lock: the bulk progress callback is synchronous.
    bulk_runs: Arc<StdRwLock<HashMap<CourseId, BulkRunState>>>,
}

impl AppState {
    pub fn new(config: Config, service: Arc<dyn CourseService>) -> Self {
        Self {
            config,
            collection: CollectionCoordinator::new(service.clone()),
            service,
            sessions: RwLock::new(HashMap::new()),
            bulk_runs: Arc::new(StdRwLock::new(HashMap::new())),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn collection(&self) -> &CollectionCoordinator {
        &self.collection
    }

    pub fn service(&self) -> &Arc<dyn CourseService> {
        &self.service
    }

    /// Get the open session for a course, opening one on first use.
    ///
    /// Sessions carry a bulk progress callback that mirrors every status poll
    /// into the server-side run map.
    pub async fn session(&self, course_id: CourseId) -> Result<Arc<CourseSession>, SessionError> {
        if let Some(session) = self.sessions.read().await.get(&course_id) {
            return Ok(session.clone());
        }

        let bulk_runs = self.bulk_runs.clone();
        let callback = Arc::new(move |status: &BatchGenerationStatus| {
            let mut runs = bulk_runs.write().unwrap();
            runs.entry(course_id).or_default().latest = Some(status.clone());
        });

        let session = CourseSession::open(
            self.service.clone(),
            course_id,
            self.config.lesson.clone(),
            self.config.bulk.clone(),
        )
        .await?
        .with_bulk_progress(callback);

        let session = Arc::new(session);
        let mut sessions = self.sessions.write().await;
        Ok(sessions.entry(course_id).or_insert(session).clone())
    }

    /// Drop the open session for a course, if any.
    pub async fn close_session(&self, course_id: CourseId) {
        self.sessions.write().await.remove(&course_id);
        self.bulk_runs.write().unwrap().remove(&course_id);
    }

    pub fn bulk_run_state(&self, course_id: CourseId) -> BulkRunState {
        self.bulk_runs
            .read()
            .unwrap()
            .get(&course_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Mark a bulk run as started. Returns false if one is already running.
    pub fn try_start_bulk_run(&self, course_id: CourseId) -> bool {
        let mut runs = self.bulk_runs.write().unwrap();
        let run = runs.entry(course_id).or_default();
        if run.running {
            return false;
        }
        *run = BulkRunState {
            running: true,
            latest: None,
            outcome: None,
        };
        true
    }

    pub fn finish_bulk_run(&self, course_id: CourseId, outcome: BulkRunOutcome) {
        let mut runs = self.bulk_runs.write().unwrap();
        let run = runs.entry(course_id).or_default();
        run.running = false;
        run.outcome = Some(outcome);
    }
}
