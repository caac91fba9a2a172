use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::config::{Config, OutputFormat};
use crate::insights::BuildInsights;
use crate::output::{self, FetchProgress};
use crate::providers::{
    BuildFilter, HistoryClient, HistoryRequest, MyGetClient, NuGetClient, PackageInfo, Provider,
};
use crate::transport::HttpTransport;

#[derive(Parser)]
#[command(name = "buildstats")]
#[command(author, version, about = "CI build history and build-time statistics", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./buildstats.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output file path (defaults to stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Output format (defaults to the configured format)
    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Pretty print JSON output
    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct HistoryArgs {
    /// Account or organization that owns the project
    account: String,

    /// Project (repository) name
    project: String,

    /// Number of most recent builds to fetch
    #[arg(short = 'n', long)]
    builds: Option<usize>,

    /// Only include builds of this branch
    #[arg(short, long)]
    branch: Option<String>,

    /// Leave out builds triggered by pull requests
    #[arg(long, default_value_t = false)]
    exclude_pull_requests: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build history from AppVeyor
    Appveyor(HistoryArgs),

    /// Build history from TravisCI
    Travis(HistoryArgs),

    /// Build history from CircleCI
    Circleci(HistoryArgs),

    /// Latest version and downloads of a NuGet package
    Nuget {
        package: String,

        /// Consider prerelease versions as the latest
        #[arg(long, default_value_t = false)]
        include_prereleases: bool,
    },

    /// Latest version and downloads of a package in a MyGet feed
    Myget {
        feed: String,
        package: String,
    },
}

impl HistoryArgs {
    fn to_request(&self, default_count: usize) -> HistoryRequest {
        HistoryRequest {
            account: self.account.clone(),
            project: self.project.clone(),
            count: self.builds.unwrap_or(default_count),
            filter: BuildFilter {
                branch: self.branch.clone(),
                include_pull_requests: !self.exclude_pull_requests,
            },
        }
    }
}

impl Cli {
    fn writer(&self) -> Result<Box<dyn Write>> {
        match &self.output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output file: {}", path.display()))?;
                Ok(Box::new(BufWriter::new(file)))
            }
            None => Ok(Box::new(io::stdout().lock())),
        }
    }

    fn finish_output(&self, mut writer: Box<dyn Write>) -> Result<()> {
        writer.flush()?;
        if let Some(path) = &self.output {
            info!("Output written to: {}", path.display());
        }
        Ok(())
    }

    async fn execute_history(
        &self,
        config: &Config,
        provider: Provider,
        args: &HistoryArgs,
    ) -> Result<()> {
        let format = self.format.unwrap_or(config.output.format);
        let pretty = self.pretty || config.output.pretty;
        let request = args.to_request(config.history.default_build_count);

        info!(
            "Collecting {provider} build history for {}/{}",
            request.account, request.project
        );

        let transport = HttpTransport::new(config.timeout())?;
        let client = HistoryClient::new(transport, provider, config.base_url(provider))?;

        let progress = FetchProgress::start(&format!("Fetching {provider} builds"));
        let history = client
            .fetch_history(&request)
            .await
            .with_context(|| format!("Failed to fetch {provider} build history"))?;
        progress.finish(&format!("Fetched {} builds", history.builds.len()));

        let insights = BuildInsights::new(client.provider(), &request, history);

        match (format, &self.output) {
            (OutputFormat::Summary, None) => {
                output::print_summary(&insights);
                Ok(())
            }
            (OutputFormat::Csv, _) => {
                let mut writer = self.writer()?;
                output::export_csv(&insights, &mut writer)?;
                self.finish_output(writer)
            }
            // Summaries go to the terminal; files get JSON.
            (OutputFormat::Json, _) | (OutputFormat::Summary, Some(_)) => {
                let mut writer = self.writer()?;
                output::export_json(&insights, pretty, &mut writer)?;
                self.finish_output(writer)
            }
        }
    }

    fn emit_package(&self, config: &Config, info: &PackageInfo) -> Result<()> {
        let pretty = self.pretty || config.output.pretty;

        match (self.format.unwrap_or(config.output.format), &self.output) {
            (OutputFormat::Summary, None) => {
                output::print_package(info);
                Ok(())
            }
            (OutputFormat::Csv, _) => bail!("CSV output is only available for build history"),
            (OutputFormat::Json, _) | (OutputFormat::Summary, Some(_)) => {
                let mut writer = self.writer()?;
                output::export_json(info, pretty, &mut writer)?;
                self.finish_output(writer)
            }
        }
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match &self.command {
            Commands::Appveyor(args) => {
                self.execute_history(&config, Provider::AppVeyor, args)
                    .await
            }
            Commands::Travis(args) => {
                self.execute_history(&config, Provider::TravisCi, args)
                    .await
            }
            Commands::Circleci(args) => {
                self.execute_history(&config, Provider::CircleCi, args)
                    .await
            }
            Commands::Nuget {
                package,
                include_prereleases,
            } => {
                let transport = HttpTransport::new(config.timeout())?;
                let client = NuGetClient::new(transport, &config.nuget.base_url)?;
                let info = client
                    .get_package_info(package, *include_prereleases)
                    .await?;
                self.emit_package(&config, &info)
            }
            Commands::Myget { feed, package } => {
                let transport = HttpTransport::new(config.timeout())?;
                let client = MyGetClient::new(transport, &config.myget.base_url)?;
                let info = client.get_package_info(feed, package).await?;
                self.emit_package(&config, &info)
            }
        }
    }
}
