mod exports;
mod progress;
mod styling;
mod summary;
mod tables;

pub use exports::{export_csv, export_json};
pub use progress::FetchProgress;
pub use styling::{dim, magenta_bold};
pub use summary::{print_package, print_summary};

/// Prints the buildstats banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("📈 buildstats"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("CI build history and build-time statistics")
    );
}
