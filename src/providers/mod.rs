mod appveyor;
mod circleci;
mod history;
mod packages;
mod travis;

pub use history::{BuildFilter, BuildHistory, FetchOutcome, HistoryClient, HistoryRequest};
pub use packages::{MyGetClient, NuGetClient, PackageInfo, MYGET_BASE_URL, NUGET_BASE_URL};

use crate::error::Result;
use crate::models::Build;

/// Number of requests AppVeyor and CircleCI fetches may issue.
pub const FIXED_MAX_ATTEMPTS: usize = 5;

/// Builds returned per TravisCI page; the API does not accept a page size.
pub const TRAVIS_PAGE_SIZE: usize = 25;

/// Most builds the CircleCI API returns per request, whatever `limit` says.
pub const CIRCLECI_MAX_PAGE_SIZE: usize = 100;

/// How many pages beyond the strictly necessary ones a TravisCI fetch may
/// spend, to make up for builds dropped by branch or pull-request filters.
pub const TRAVIS_ATTEMPT_MARGIN: usize = 5;

/// Continuation position in a provider's build history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// First page, no continuation parameter.
    Start,
    /// AppVeyor: return builds older than this build id.
    StartBuildId(i64),
    /// CircleCI: skip this many builds.
    Offset(u32),
    /// TravisCI: return builds numbered below this one.
    AfterNumber(i64),
}

/// CI services whose build history can be fetched.
///
/// Each variant carries its own paging policy, request URL shape, cursor
/// arithmetic and response parser; the pagination loop itself is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    AppVeyor,
    TravisCi,
    CircleCi,
}

impl Provider {
    pub fn name(self) -> &'static str {
        match self {
            Self::AppVeyor => appveyor::NAME,
            Self::TravisCi => travis::NAME,
            Self::CircleCi => circleci::NAME,
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::AppVeyor => appveyor::DEFAULT_BASE_URL,
            Self::TravisCi => travis::DEFAULT_BASE_URL,
            Self::CircleCi => circleci::DEFAULT_BASE_URL,
        }
    }

    /// Builds requested per page for a fetch of `requested` builds.
    pub fn page_size(self, requested: usize) -> usize {
        match self {
            Self::AppVeyor | Self::CircleCi => requested,
            Self::TravisCi => TRAVIS_PAGE_SIZE,
        }
    }

    /// Largest page the provider serves, if it caps the requested size.
    pub fn max_page_size(self) -> Option<usize> {
        match self {
            Self::AppVeyor => None,
            Self::TravisCi => Some(TRAVIS_PAGE_SIZE),
            Self::CircleCi => Some(CIRCLECI_MAX_PAGE_SIZE),
        }
    }

    /// Length of a page that leaves more history to fetch. Anything shorter
    /// is the provider's last page.
    pub fn full_page_len(self, requested: usize) -> usize {
        let page_size = self.page_size(requested);
        self.max_page_size()
            .map_or(page_size, |max| page_size.min(max))
    }

    /// Upper bound on requests for a fetch of `requested` builds.
    ///
    /// TravisCI scales with the number of fixed-size pages the request
    /// needs: `ceil(requested / 25 * 5)`.
    pub fn max_attempts(self, requested: usize) -> usize {
        match self {
            Self::AppVeyor | Self::CircleCi => FIXED_MAX_ATTEMPTS,
            Self::TravisCi => requested
                .saturating_mul(TRAVIS_ATTEMPT_MARGIN)
                .div_ceil(TRAVIS_PAGE_SIZE),
        }
    }

    pub fn initial_cursor(self) -> Cursor {
        match self {
            Self::AppVeyor | Self::CircleCi => Cursor::Start,
            Self::TravisCi => Cursor::AfterNumber(i64::MAX),
        }
    }

    /// Request URL for one page of history.
    pub fn history_url(
        self,
        base_url: &str,
        account: &str,
        project: &str,
        page_size: usize,
        branch: Option<&str>,
        cursor: Cursor,
    ) -> String {
        match self {
            Self::AppVeyor => {
                let start_build_id = match cursor {
                    Cursor::StartBuildId(id) => Some(id),
                    _ => None,
                };
                appveyor::history_url(base_url, account, project, page_size, branch, start_build_id)
            }
            Self::CircleCi => {
                let offset = match cursor {
                    Cursor::Offset(offset) => Some(offset),
                    _ => None,
                };
                circleci::history_url(base_url, account, project, page_size, branch, offset)
            }
            Self::TravisCi => {
                let after_number = match cursor {
                    Cursor::AfterNumber(number) => Some(number),
                    _ => None,
                };
                travis::history_url(base_url, account, project, after_number)
            }
        }
    }

    /// Cursor for the page following one whose last (unfiltered) build is `last`.
    pub fn next_cursor(self, cursor: Cursor, last: &Build) -> Cursor {
        match self {
            Self::AppVeyor => Cursor::StartBuildId(last.build_id()),
            Self::CircleCi => match cursor {
                Cursor::Offset(offset) => Cursor::Offset(offset + 1),
                _ => Cursor::Offset(1),
            },
            Self::TravisCi => Cursor::AfterNumber(last.build_number()),
        }
    }

    pub fn parse(self, body: &str) -> Result<Vec<Build>> {
        match self {
            Self::AppVeyor => appveyor::parse(body),
            Self::TravisCi => travis::parse(body),
            Self::CircleCi => circleci::parse(body),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Form-encodes a single query or path component.
pub(crate) fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
