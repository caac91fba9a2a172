use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::encode;
use crate::error::{BuildStatsError, Result};
use crate::models::{Build, BuildStatus};

pub(super) const NAME: &str = "CircleCI";
pub(super) const DEFAULT_BASE_URL: &str = "https://circleci.com";

#[derive(Debug, Deserialize)]
struct CircleCiBuild {
    build_num: i64,
    status: Option<String>,
    start_time: Option<DateTime<Utc>>,
    stop_time: Option<DateTime<Utc>>,
    branch: Option<String>,
    subject: Option<String>,
}

pub(super) fn history_url(
    base_url: &str,
    account: &str,
    project: &str,
    limit: usize,
    branch: Option<&str>,
    offset: Option<u32>,
) -> String {
    let mut url = format!("{base_url}/api/v1/project/{account}/{project}");

    if let Some(branch) = branch {
        url.push_str(&format!("/tree/{}", encode(branch)));
    }

    url.push_str(&format!("?limit={limit}"));

    if let Some(offset) = offset {
        url.push_str(&format!("&offset={offset}"));
    }

    url
}

/// Parses a CircleCI v1 recent-builds response.
///
/// CircleCI has no pull-request flag; merge commits whose subject mentions a
/// pull request are treated as pull-request builds.
pub(super) fn parse(body: &str) -> Result<Vec<Build>> {
    let builds: Vec<CircleCiBuild> =
        serde_json::from_str(body).map_err(|source| BuildStatsError::Parse {
            provider: NAME,
            source,
        })?;

    Ok(builds
        .into_iter()
        .map(|b| {
            let from_pull_request = b
                .subject
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains("pull request"));

            Build::new(
                b.build_num,
                b.build_num,
                convert_status(b.status.as_deref()),
                b.start_time,
                b.stop_time,
                b.branch,
                from_pull_request,
            )
        })
        .collect())
}

fn convert_status(status: Option<&str>) -> BuildStatus {
    match status {
        Some("success" | "fixed" | "no_tests") => BuildStatus::Success,
        Some("failed" | "infrastructure_fail" | "timedout") => BuildStatus::Failed,
        Some("canceled" | "not_run" | "not_running") => BuildStatus::Cancelled,
        Some("scheduled" | "queued" | "running") => BuildStatus::Pending,
        _ => BuildStatus::Unknown,
    }
}
