use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{BuildStatsError, Result};
use crate::models::{Build, BuildStatus};

pub(super) const NAME: &str = "TravisCI";
pub(super) const DEFAULT_BASE_URL: &str = "https://api.travis-ci.org";

const PULL_REQUEST_EVENT: &str = "pull_request";

#[derive(Debug, Deserialize)]
struct TravisBuild {
    id: i64,
    /// Build numbers are sent as decimal strings.
    number: String,
    state: Option<String>,
    result: Option<i64>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    branch: Option<String>,
    event_type: Option<String>,
}

pub(super) fn history_url(
    base_url: &str,
    account: &str,
    project: &str,
    after_number: Option<i64>,
) -> String {
    let url = format!("{base_url}/repos/{account}/{project}/builds");

    match after_number {
        Some(number) => format!("{url}?after_number={number}"),
        None => url,
    }
}

pub(super) fn parse(body: &str) -> Result<Vec<Build>> {
    let builds: Vec<TravisBuild> =
        serde_json::from_str(body).map_err(|source| BuildStatsError::Parse {
            provider: NAME,
            source,
        })?;

    builds
        .into_iter()
        .map(|b| {
            let number = b
                .number
                .trim()
                .parse::<i64>()
                .map_err(|_| BuildStatsError::InvalidBuildNumber {
                    provider: NAME,
                    value: b.number.clone(),
                })?;

            Ok(Build::new(
                b.id,
                number,
                convert_status(b.state.as_deref(), b.result),
                b.started_at,
                b.finished_at,
                b.branch,
                b.event_type.as_deref() == Some(PULL_REQUEST_EVENT),
            ))
        })
        .collect()
}

/// A finished build passed only with an explicit zero result.
fn convert_status(state: Option<&str>, result: Option<i64>) -> BuildStatus {
    match state {
        Some("finished") if result == Some(0) => BuildStatus::Success,
        Some("finished") => BuildStatus::Failed,
        Some("started") => BuildStatus::Pending,
        _ => BuildStatus::Unknown,
    }
}
