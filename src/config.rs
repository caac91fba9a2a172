use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::providers::{Provider, MYGET_BASE_URL, NUGET_BASE_URL};

/// Configuration file structure for buildstats.
///
/// Configuration files are loaded from the current directory or a path given
/// on the command line. Every section is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default = "ServiceConfig::appveyor")]
    pub appveyor: ServiceConfig,

    #[serde(default = "ServiceConfig::travis_ci")]
    pub travis_ci: ServiceConfig,

    #[serde(default = "ServiceConfig::circle_ci")]
    pub circle_ci: ServiceConfig,

    #[serde(default = "ServiceConfig::nuget")]
    pub nuget: ServiceConfig,

    #[serde(default = "ServiceConfig::myget")]
    pub myget: ServiceConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HistoryConfig {
    /// Builds fetched when `--builds` is not given
    #[serde(default = "default_build_count")]
    pub default_build_count: usize,

    /// Per-request HTTP timeout
    pub timeout_seconds: Option<u64>,
}

/// API root of a CI service or package registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServiceConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Summary,
    Json,
    Csv,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history: HistoryConfig::default(),
            appveyor: ServiceConfig::appveyor(),
            travis_ci: ServiceConfig::travis_ci(),
            circle_ci: ServiceConfig::circle_ci(),
            nuget: ServiceConfig::nuget(),
            myget: ServiceConfig::myget(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_build_count: default_build_count(),
            timeout_seconds: None,
        }
    }
}

impl ServiceConfig {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }

    fn appveyor() -> Self {
        Self::new(Provider::AppVeyor.default_base_url())
    }

    fn travis_ci() -> Self {
        Self::new(Provider::TravisCi.default_base_url())
    }

    fn circle_ci() -> Self {
        Self::new(Provider::CircleCi.default_base_url())
    }

    fn nuget() -> Self {
        Self::new(NUGET_BASE_URL)
    }

    fn myget() -> Self {
        Self::new(MYGET_BASE_URL)
    }
}

fn default_build_count() -> usize {
    25
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./buildstats.toml
    /// 3. ./buildstats.json
    /// 4. ./buildstats.yaml
    /// 5. ./buildstats.yml
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = [
            "buildstats.toml",
            "buildstats.json",
            "buildstats.yaml",
            "buildstats.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }

    pub fn base_url(&self, provider: Provider) -> &str {
        match provider {
            Provider::AppVeyor => &self.appveyor.base_url,
            Provider::TravisCi => &self.travis_ci.base_url,
            Provider::CircleCi => &self.circle_ci.base_url,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.history.timeout_seconds.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.history.default_build_count, 25);
        assert_eq!(config.base_url(Provider::AppVeyor), "https://ci.appveyor.com");
        assert_eq!(config.base_url(Provider::TravisCi), "https://api.travis-ci.org");
        assert_eq!(config.base_url(Provider::CircleCi), "https://circleci.com");
        assert_eq!(config.nuget.base_url, NUGET_BASE_URL);
        assert!(config.timeout().is_none());
        assert!(matches!(config.output.format, OutputFormat::Summary));
    }

    #[test]
    fn load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
[history]
default-build-count = 40
timeout-seconds = 15

[circle-ci]
base-url = "https://circle.example.com"

[output]
format = "json"
pretty = true
"#;
        write!(temp_file, "{toml_content}").unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.history.default_build_count, 40);
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.base_url(Provider::CircleCi), "https://circle.example.com");
        assert_eq!(config.base_url(Provider::AppVeyor), "https://ci.appveyor.com");
        assert!(matches!(config.output.format, OutputFormat::Json));
        assert!(config.output.pretty);
    }

    #[test]
    fn load_json_config() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        let json_content = r#"{
  "travis-ci": { "base-url": "https://api.travis-ci.com" },
  "output": { "format": "csv" }
}"#;
        write!(temp_file, "{json_content}").unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.base_url(Provider::TravisCi), "https://api.travis-ci.com");
        assert_eq!(config.history.default_build_count, 25);
        assert!(matches!(config.output.format, OutputFormat::Csv));
    }

    #[test]
    fn load_yaml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".yml").unwrap();
        write!(
            temp_file,
            "history:\n  default-build-count: 10\nmyget:\n  base-url: https://myget.example.com\n"
        )
        .unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.history.default_build_count, 10);
        assert_eq!(config.myget.base_url, "https://myget.example.com");
    }

    #[test]
    fn load_missing_explicit_path_fails() {
        let result = Config::load(Some(Path::new("nonexistent-buildstats.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("default-build-count = 25"));
        assert!(toml.contains("https://circleci.com"));

        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.circle_ci, config.circle_ci);
    }
}
