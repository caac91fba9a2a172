use chrono::{DateTime, TimeDelta, Utc};
use serde::{Serialize, Serializer};

/// Normalized outcome of a CI build.
///
/// Every provider's raw status vocabulary maps onto this closed set; values a
/// provider reports that are not recognized become `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Success,
    Failed,
    Cancelled,
    Pending,
    Unknown,
}

impl BuildStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Pending => "pending",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single historical CI run, normalized across providers.
///
/// Built once by a provider parser and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Build {
    build_id: i64,
    build_number: i64,
    status: BuildStatus,
    started: Option<DateTime<Utc>>,
    finished: Option<DateTime<Utc>>,
    #[serde(rename = "total_time_ms", serialize_with = "serialize_millis")]
    total_time: TimeDelta,
    branch: Option<String>,
    from_pull_request: bool,
}

impl Build {
    /// Creates a build record.
    ///
    /// `total_time` is `finished - started` only when both timestamps are
    /// present; a build that has not started or not finished has zero duration.
    pub fn new(
        build_id: i64,
        build_number: i64,
        status: BuildStatus,
        started: Option<DateTime<Utc>>,
        finished: Option<DateTime<Utc>>,
        branch: Option<String>,
        from_pull_request: bool,
    ) -> Self {
        let total_time = match (started, finished) {
            (Some(started), Some(finished)) => finished - started,
            _ => TimeDelta::zero(),
        };

        Self {
            build_id,
            build_number,
            status,
            started,
            finished,
            total_time,
            branch,
            from_pull_request,
        }
    }

    pub fn build_id(&self) -> i64 {
        self.build_id
    }

    pub fn build_number(&self) -> i64 {
        self.build_number
    }

    pub fn status(&self) -> BuildStatus {
        self.status
    }

    pub fn started(&self) -> Option<DateTime<Utc>> {
        self.started
    }

    pub fn finished(&self) -> Option<DateTime<Utc>> {
        self.finished
    }

    pub fn total_time(&self) -> TimeDelta {
        self.total_time
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn from_pull_request(&self) -> bool {
        self.from_pull_request
    }
}

fn serialize_millis<S: Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(value.num_milliseconds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 3, 1, hour, min, sec).unwrap()
    }

    #[test]
    fn total_time_is_difference_of_timestamps() {
        let build = Build::new(
            1,
            1,
            BuildStatus::Success,
            Some(at(10, 0, 0)),
            Some(at(10, 7, 30)),
            None,
            false,
        );

        assert_eq!(build.total_time(), TimeDelta::seconds(450));
    }

    #[test]
    fn total_time_is_zero_without_finish() {
        let build = Build::new(
            1,
            1,
            BuildStatus::Pending,
            Some(at(10, 0, 0)),
            None,
            None,
            false,
        );

        assert_eq!(build.total_time(), TimeDelta::zero());
    }

    #[test]
    fn total_time_is_zero_without_start() {
        let build = Build::new(
            1,
            1,
            BuildStatus::Failed,
            None,
            Some(at(10, 0, 0)),
            None,
            false,
        );

        assert_eq!(build.total_time(), TimeDelta::zero());
    }

    #[test]
    fn serializes_duration_as_milliseconds() {
        let build = Build::new(
            42,
            7,
            BuildStatus::Cancelled,
            Some(at(10, 0, 0)),
            Some(at(10, 0, 2)),
            Some("main".to_string()),
            true,
        );

        let json = serde_json::to_value(&build).unwrap();
        assert_eq!(json["total_time_ms"], 2000);
        assert_eq!(json["status"], "cancelled");
        assert_eq!(json["branch"], "main");
        assert_eq!(json["from_pull_request"], true);
    }
}
