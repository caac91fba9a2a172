use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildStatsError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Malformed {provider} response: {source}")]
    Parse {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid {provider} build number: {value:?}")]
    InvalidBuildNumber {
        provider: &'static str,
        value: String,
    },

    #[error("Package not found: {0}")]
    PackageNotFound(String),
}

pub type Result<T> = std::result::Result<T, BuildStatsError>;
