use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::encode;
use crate::error::{BuildStatsError, Result};
use crate::models::{Build, BuildStatus};

pub(super) const NAME: &str = "AppVeyor";
pub(super) const DEFAULT_BASE_URL: &str = "https://ci.appveyor.com";

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    builds: Vec<AppVeyorBuild>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppVeyorBuild {
    build_id: i64,
    build_number: i64,
    status: Option<String>,
    started: Option<DateTime<Utc>>,
    finished: Option<DateTime<Utc>>,
    branch: Option<String>,
}

pub(super) fn history_url(
    base_url: &str,
    account: &str,
    project: &str,
    records: usize,
    branch: Option<&str>,
    start_build_id: Option<i64>,
) -> String {
    let mut url =
        format!("{base_url}/api/projects/{account}/{project}/history?recordsNumber={records}");

    if let Some(branch) = branch {
        url.push_str(&format!("&branch={}", encode(branch)));
    }

    if let Some(id) = start_build_id {
        url.push_str(&format!("&startBuildId={id}"));
    }

    url
}

/// Parses an AppVeyor project history response.
///
/// AppVeyor does not flag pull-request builds, so none are marked as such.
pub(super) fn parse(body: &str) -> Result<Vec<Build>> {
    let response: HistoryResponse =
        serde_json::from_str(body).map_err(|source| BuildStatsError::Parse {
            provider: NAME,
            source,
        })?;

    Ok(response
        .builds
        .into_iter()
        .map(|b| {
            Build::new(
                b.build_id,
                b.build_number,
                convert_status(b.status.as_deref()),
                b.started,
                b.finished,
                b.branch,
                false,
            )
        })
        .collect())
}

fn convert_status(status: Option<&str>) -> BuildStatus {
    match status {
        Some("success") => BuildStatus::Success,
        Some("failed") => BuildStatus::Failed,
        Some("cancelled") => BuildStatus::Cancelled,
        Some("queued" | "running") => BuildStatus::Pending,
        _ => BuildStatus::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    const HISTORY: &str = r#"{
        "project": { "projectId": 12345, "accountName": "dustinmoris", "slug": "buildstats" },
        "builds": [
            {
                "buildId": 3904413,
                "jobs": [],
                "buildNumber": 51,
                "version": "1.0.51",
                "message": "Fixed chart colours",
                "branch": "master",
                "commitId": "b7fd1c7f",
                "status": "success",
                "started": "2016-04-24T18:31:17.8722052+00:00",
                "finished": "2016-04-24T18:33:47.8722052+00:00",
                "created": "2016-04-24T18:31:06.4517378+00:00"
            },
            {
                "buildId": 3904400,
                "buildNumber": 50,
                "branch": "develop",
                "status": "cancelled",
                "started": "2016-04-24T18:20:00+00:00",
                "finished": "2016-04-24T18:20:30+00:00"
            },
            {
                "buildId": 3904390,
                "buildNumber": 49,
                "branch": "master",
                "status": "queued"
            }
        ]
    }"#;

    #[test]
    fn parses_builds_in_order() {
        let builds = parse(HISTORY).unwrap();

        assert_eq!(builds.len(), 3);
        assert_eq!(builds[0].build_id(), 3_904_413);
        assert_eq!(builds[0].build_number(), 51);
        assert_eq!(builds[0].branch(), Some("master"));
        assert_eq!(builds[0].status(), BuildStatus::Success);
        assert_eq!(builds[0].total_time(), TimeDelta::seconds(150));
        assert_eq!(
            builds[0].started(),
            Some(Utc.with_ymd_and_hms(2016, 4, 24, 18, 31, 17).unwrap()
                + TimeDelta::nanoseconds(872_205_200))
        );

        assert_eq!(builds[1].build_number(), 50);
        assert_eq!(builds[1].status(), BuildStatus::Cancelled);

        assert_eq!(builds[2].status(), BuildStatus::Pending);
        assert_eq!(builds[2].started(), None);
        assert_eq!(builds[2].total_time(), TimeDelta::zero());
    }

    #[test]
    fn never_marks_pull_requests() {
        assert!(parse(HISTORY)
            .unwrap()
            .iter()
            .all(|b| !b.from_pull_request()));
    }

    #[test]
    fn empty_history_yields_no_builds() {
        assert!(parse(r#"{"builds": []}"#).unwrap().is_empty());
    }

    #[test]
    fn parsing_is_deterministic() {
        assert_eq!(parse(HISTORY).unwrap(), parse(HISTORY).unwrap());
    }

    #[test]
    fn malformed_body_is_a_parse_error() {
        let err = parse("<html>Service Unavailable</html>").unwrap_err();
        assert!(matches!(
            err,
            BuildStatsError::Parse {
                provider: "AppVeyor",
                ..
            }
        ));
    }

    #[test]
    fn maps_status_vocabulary() {
        assert_eq!(convert_status(Some("success")), BuildStatus::Success);
        assert_eq!(convert_status(Some("failed")), BuildStatus::Failed);
        assert_eq!(convert_status(Some("cancelled")), BuildStatus::Cancelled);
        assert_eq!(convert_status(Some("queued")), BuildStatus::Pending);
        assert_eq!(convert_status(Some("running")), BuildStatus::Pending);
        assert_eq!(convert_status(Some("starting")), BuildStatus::Unknown);
        assert_eq!(convert_status(Some("canceled")), BuildStatus::Unknown);
        assert_eq!(convert_status(None), BuildStatus::Unknown);
    }

    #[test]
    fn builds_history_urls() {
        let base = DEFAULT_BASE_URL;
        assert_eq!(
            history_url(base, "dustinmoris", "buildstats", 10, None, None),
            "https://ci.appveyor.com/api/projects/dustinmoris/buildstats/history?recordsNumber=10"
        );
        assert_eq!(
            history_url(base, "acme", "api", 25, Some("release/2.0"), Some(3_904_390)),
            "https://ci.appveyor.com/api/projects/acme/api/history?recordsNumber=25&branch=release%2F2.0&startBuildId=3904390"
        );
    }
}
