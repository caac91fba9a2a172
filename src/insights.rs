use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Build;
use crate::providers::{BuildHistory, FetchOutcome, HistoryRequest, Provider};
use crate::statistics::{BuildStatistics, StatusCounts};

/// Build history of one project together with its derived statistics.
#[derive(Debug, Serialize)]
pub struct BuildInsights {
    pub provider: String,
    pub account: String,
    pub project: String,
    pub branch: Option<String>,
    pub include_pull_requests: bool,
    pub collected_at: DateTime<Utc>,
    pub requested_builds: usize,
    pub outcome: FetchOutcome,
    pub requests: usize,
    pub status_counts: StatusCounts,
    pub success_rate: f64,
    pub statistics: BuildStatistics,
    pub builds: Vec<Build>,
}

impl BuildInsights {
    pub fn new(provider: Provider, request: &HistoryRequest, history: BuildHistory) -> Self {
        let status_counts = StatusCounts::from_builds(&history.builds);

        Self {
            provider: provider.name().to_string(),
            account: request.account.clone(),
            project: request.project.clone(),
            branch: request.filter.branch.clone(),
            include_pull_requests: request.filter.include_pull_requests,
            collected_at: Utc::now(),
            requested_builds: request.count,
            outcome: history.outcome,
            requests: history.requests,
            status_counts,
            success_rate: status_counts.success_rate(),
            statistics: BuildStatistics::from_builds(&history.builds),
            builds: history.builds,
        }
    }
}
