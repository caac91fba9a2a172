use anyhow::Result;
use serde::Serialize;
use std::io::Write;

use crate::insights::BuildInsights;

/// Writes any report as JSON.
pub fn export_json<T: Serialize>(report: &T, pretty: bool, output: &mut dyn Write) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    writeln!(output, "{json}")?;
    Ok(())
}

/// Writes the build list as CSV, one row per build, most recent first.
pub fn export_csv(insights: &BuildInsights, output: &mut dyn Write) -> Result<()> {
    writeln!(
        output,
        "Build Number,Build ID,Status,Branch,Pull Request,Started,Finished,Duration Seconds"
    )?;

    for build in &insights.builds {
        #[allow(clippy::cast_precision_loss)]
        let seconds = build.total_time().num_milliseconds() as f64 / 1000.0;

        writeln!(
            output,
            "{},{},{},{},{},{},{},{:.1}",
            build.build_number(),
            build.build_id(),
            build.status(),
            csv_field(build.branch().unwrap_or("")),
            build.from_pull_request(),
            build.started().map(|t| t.to_rfc3339()).unwrap_or_default(),
            build.finished().map(|t| t.to_rfc3339()).unwrap_or_default(),
            seconds
        )?;
    }

    Ok(())
}

/// Quotes a field, doubling embedded quotes.
fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
