//! Dashboard store
//!
//! Two tracks share one error slot: metric fetches (`loading`) and manual
//! processing runs (`processing_in_progress`). A processing run adds its
//! count to `processed_today` without re-fetching the metrics.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::notify::{Notifier, Slice};
use super::request::{RequestId, RequestSequence, Track};
use super::rejection_message;
use crate::error::ApiError;
use crate::gateway::AssistantApi;
use crate::types::{DashboardStats, ProcessingResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub stats: DashboardStats,
    pub loading: bool,
    pub error: Option<String>,
    pub processing_in_progress: bool,
    pub last_processing_result: Option<ProcessingResult>,
    #[serde(skip)]
    stats_track: Track,
    #[serde(skip)]
    processing_track: Track,
}

#[derive(Debug, Clone)]
pub enum DashboardAction {
    FetchStatsPending(RequestId),
    FetchStatsFulfilled(RequestId, DashboardStats),
    FetchStatsRejected(RequestId, ApiError),
    ProcessingPending(RequestId),
    ProcessingFulfilled(RequestId, ProcessingResult),
    ProcessingRejected(RequestId, ApiError),
    ClearError,
    ClearProcessingResult,
}

impl DashboardState {
    pub fn reduce(&mut self, action: DashboardAction) {
        match action {
            DashboardAction::FetchStatsPending(id) => {
                self.stats_track.begin(id);
                self.loading = true;
                self.error = None;
            }
            DashboardAction::FetchStatsFulfilled(id, stats) => {
                if !self.stats_track.is_current(id) {
                    debug!("Dropping stale dashboard stats {:?}", id);
                    return;
                }
                self.loading = false;
                self.stats = stats;
            }
            DashboardAction::FetchStatsRejected(id, err) => {
                if !self.stats_track.is_current(id) {
                    return;
                }
                self.loading = false;
                self.error = Some(rejection_message(&err, "Failed to fetch dashboard stats"));
            }
            DashboardAction::ProcessingPending(id) => {
                self.processing_track.begin(id);
                self.processing_in_progress = true;
                self.error = None;
            }
            DashboardAction::ProcessingFulfilled(id, result) => {
                // Optimistic: the counter is not re-fetched. Every finished
                // run counts, including ones overtaken by a newer run.
                self.stats.processed_today = self
                    .stats
                    .processed_today
                    .saturating_add(result.processed_count);
                if !self.processing_track.is_current(id) {
                    debug!("Processing run {:?} finished after a newer run", id);
                    return;
                }
                self.processing_in_progress = false;
                self.last_processing_result = Some(result);
            }
            DashboardAction::ProcessingRejected(id, err) => {
                if !self.processing_track.is_current(id) {
                    return;
                }
                self.processing_in_progress = false;
                self.error = Some(rejection_message(&err, "Failed to trigger email processing"));
            }
            DashboardAction::ClearError => self.error = None,
            DashboardAction::ClearProcessingResult => self.last_processing_result = None,
        }
    }
}

pub struct DashboardStore {
    state: RwLock<DashboardState>,
    api: Arc<dyn AssistantApi>,
    requests: RequestSequence,
    notifier: Notifier,
}

impl DashboardStore {
    pub fn new(api: Arc<dyn AssistantApi>, notifier: Notifier) -> Self {
        Self {
            state: RwLock::new(DashboardState::default()),
            api,
            requests: RequestSequence::default(),
            notifier,
        }
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    pub async fn dispatch(&self, action: DashboardAction) {
        self.state.write().await.reduce(action);
        self.notifier.notify(Slice::Dashboard);
    }

    pub async fn fetch_stats(&self) -> Result<DashboardStats, ApiError> {
        let id = self.requests.next();
        self.dispatch(DashboardAction::FetchStatsPending(id)).await;

        let result = self.api.get_dashboard_stats().await;
        match &result {
            Ok(stats) => self.dispatch(DashboardAction::FetchStatsFulfilled(id, *stats)).await,
            Err(e) => self.dispatch(DashboardAction::FetchStatsRejected(id, e.clone())).await,
        }
        result
    }

    pub async fn trigger_processing(&self) -> Result<ProcessingResult, ApiError> {
        let id = self.requests.next();
        self.dispatch(DashboardAction::ProcessingPending(id)).await;

        let result = self.api.trigger_processing().await;
        match &result {
            Ok(r) => self.dispatch(DashboardAction::ProcessingFulfilled(id, r.clone())).await,
            Err(e) => self.dispatch(DashboardAction::ProcessingRejected(id, e.clone())).await,
        }
        result
    }
}
