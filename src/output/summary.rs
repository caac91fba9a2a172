use std::fmt::Write;

use comfy_table::{Cell, CellAlignment};

use crate::insights::BuildInsights;
use crate::providers::{FetchOutcome, PackageInfo};

use super::styling::{bright, bright_red, bright_yellow, cyan, dim, success_rate};
use super::tables::{
    color_coded_success_cell, create_cyan_header, create_table, format_downloads, format_duration,
    status_cell,
};

/// Prints a human-readable summary of a project's build history to stdout.
///
/// Displays:
/// - Overview: provider, project, filters, how the fetch ended
/// - Build Times: longest, shortest and average (cancelled builds excluded)
/// - Builds: one row per build, most recent first
pub fn print_summary(insights: &BuildInsights) {
    println!("{}", render_summary(insights));
}

pub fn print_package(info: &PackageInfo) {
    println!("{}", render_package(info));
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

fn outcome_line(outcome: FetchOutcome) -> String {
    match outcome {
        FetchOutcome::Fulfilled | FetchOutcome::ProviderExhausted => dim(outcome).to_string(),
        FetchOutcome::AttemptsExhausted => bright_yellow(outcome).to_string(),
        FetchOutcome::TransportFailed => bright_red(outcome).to_string(),
    }
}

fn render_summary(insights: &BuildInsights) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📊", "Overview");

    let branch = insights.branch.as_deref().unwrap_or("all branches");
    let pull_requests = if insights.include_pull_requests {
        "included"
    } else {
        "excluded"
    };

    let _ = writeln!(
        output,
        "  {} {}\n  {} {}/{}\n  {} {}\n  {} {}\n  {} {} of {} requested ({} requests, {})\n  {} {}\n  {} {}\n",
        dim("Provider:"),
        cyan(&insights.provider),
        dim("Project:"),
        cyan(&insights.account),
        cyan(&insights.project),
        dim("Branch:"),
        cyan(branch),
        dim("Pull requests:"),
        cyan(pull_requests),
        dim("Builds:"),
        bright_yellow(insights.builds.len()),
        insights.requested_builds,
        insights.requests,
        outcome_line(insights.outcome),
        dim("Success rate:"),
        success_rate(insights.success_rate),
        dim("Collected:"),
        dim(insights.collected_at.format("%Y-%m-%d %H:%M UTC"))
    );

    if insights.builds.is_empty() {
        let _ = writeln!(output, "{}", bright_yellow("No builds found."));
        return output;
    }

    add_section_header(&mut output, "⏱️", "Build Times");

    let stats = &insights.statistics;
    let mut stats_table = create_table();
    stats_table.set_header(create_cyan_header(&["Longest", "Shortest", "Average", "Success"]));
    stats_table.add_row(vec![
        Cell::new(format_duration(stats.longest)),
        Cell::new(format_duration(stats.shortest)),
        Cell::new(format_duration(stats.average)),
        color_coded_success_cell(insights.success_rate),
    ]);
    let _ = writeln!(output, "{stats_table}\n");

    add_section_header(&mut output, "📋", "Builds");

    let mut builds_table = create_table();
    builds_table.set_header(create_cyan_header(&[
        "Build", "Status", "Branch", "PR", "Started", "Duration",
    ]));

    for build in &insights.builds {
        builds_table.add_row(vec![
            Cell::new(format!("#{}", build.build_number())).set_alignment(CellAlignment::Right),
            status_cell(build.status()),
            Cell::new(build.branch().unwrap_or("-")),
            Cell::new(if build.from_pull_request() { "yes" } else { "" }),
            Cell::new(
                build
                    .started()
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default(),
            ),
            Cell::new(format_duration(build.total_time())).set_alignment(CellAlignment::Right),
        ]);
    }

    let _ = writeln!(output, "{builds_table}");

    output
}

fn render_package(info: &PackageInfo) -> String {
    let mut output = String::new();
    add_section_header(&mut output, "📦", "Package");
    let _ = writeln!(
        output,
        "  {} {}\n  {} {}\n  {} {}",
        dim("Name:"),
        cyan(&info.name),
        dim("Version:"),
        bright_yellow(&info.version),
        dim("Downloads:"),
        bright_yellow(format_downloads(info.downloads))
    );
    output
}
