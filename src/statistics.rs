use chrono::TimeDelta;
use serde::{Serialize, Serializer};

use crate::models::{Build, BuildStatus};

/// Duration statistics over a set of builds.
///
/// Cancelled builds never contribute: they are excluded from the longest,
/// shortest and average calculations. When no eligible build remains every
/// value is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildStatistics {
    #[serde(rename = "longest_ms", serialize_with = "serialize_millis")]
    pub longest: TimeDelta,
    #[serde(rename = "shortest_ms", serialize_with = "serialize_millis")]
    pub shortest: TimeDelta,
    #[serde(rename = "average_ms", serialize_with = "serialize_millis")]
    pub average: TimeDelta,
}

impl Default for BuildStatistics {
    fn default() -> Self {
        Self {
            longest: TimeDelta::zero(),
            shortest: TimeDelta::zero(),
            average: TimeDelta::zero(),
        }
    }
}

impl BuildStatistics {
    /// Computes longest, shortest and average build time.
    ///
    /// The average is taken over millisecond totals and rounded back to the
    /// nearest millisecond.
    pub fn from_builds(builds: &[Build]) -> Self {
        let durations: Vec<TimeDelta> = builds
            .iter()
            .filter(|b| b.status() != BuildStatus::Cancelled)
            .map(Build::total_time)
            .collect();

        let (Some(longest), Some(shortest)) = (
            durations.iter().copied().max(),
            durations.iter().copied().min(),
        ) else {
            return Self::default();
        };

        #[allow(clippy::cast_precision_loss)]
        let mean_ms = durations
            .iter()
            .map(|d| d.num_milliseconds() as f64)
            .sum::<f64>()
            / durations.len() as f64;

        #[allow(clippy::cast_possible_truncation)]
        let average = TimeDelta::milliseconds(mean_ms.round() as i64);

        Self {
            longest,
            shortest,
            average,
        }
    }
}

/// Number of builds per normalized status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub success: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub pending: usize,
    pub unknown: usize,
}

impl StatusCounts {
    pub fn from_builds(builds: &[Build]) -> Self {
        builds.iter().fold(Self::default(), |mut counts, build| {
            match build.status() {
                BuildStatus::Success => counts.success += 1,
                BuildStatus::Failed => counts.failed += 1,
                BuildStatus::Cancelled => counts.cancelled += 1,
                BuildStatus::Pending => counts.pending += 1,
                BuildStatus::Unknown => counts.unknown += 1,
            }
            counts
        })
    }

    /// Percentage of finished builds (success or failed) that succeeded.
    pub fn success_rate(&self) -> f64 {
        let finished = self.success + self.failed;

        #[allow(clippy::cast_precision_loss)]
        let rate = if finished > 0 {
            (self.success as f64 / finished as f64) * 100.0
        } else {
            0.0
        };

        rate
    }
}

fn serialize_millis<S: Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(value.num_milliseconds())
}
