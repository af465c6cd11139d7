use std::fmt::Display;
use std::time::Duration;

use colored::*;
use proxysift_common::success;
use proxysift_core::pipeline::RunSummary;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;
pub const PRINT_TARGET: &str = "proxysift::print";

/// Width of the key column in [`aligned_line`].
const KEY_WIDTH: usize = 12;

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, "{msg}");
}

pub fn banner(quiet: bool) {
    if quiet {
        return;
    }

    let text_content: String = format!("⟦ PROXYSIFT v{} ⟧", env!("CARGO_PKG_VERSION"));
    let text_width: usize = UnicodeWidthStr::width(text_content.as_str());
    let side: usize = TOTAL_WIDTH.saturating_sub(text_width) / 2;
    let text: ColoredString = text_content.color(colors::PRIMARY).bold();
    let sep: ColoredString = "═".repeat(side).color(colors::SEPARATOR);

    print(&format!("{sep}{text}{sep}"));
}

pub fn header(msg: &str, quiet: bool) {
    if quiet {
        return;
    }

    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: String = format!(
        "{}{}{}",
        "─".repeat(left).color(colors::SEPARATOR),
        formatted.to_uppercase().color(colors::PRIMARY),
        "─".repeat(right).color(colors::SEPARATOR)
    );

    print(&line);
}

pub fn fat_separator() {
    print(&"═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR).to_string());
}

pub fn aligned_line<V: Display>(key: &str, value: V) {
    let dots: String = ".".repeat((KEY_WIDTH + 1).saturating_sub(key.len()));
    let prefix: ColoredString = ">".color(colors::SEPARATOR);
    print(&format!(
        "{} {}{}{} {}",
        prefix,
        key.color(colors::PRIMARY),
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR),
        value.to_string().color(colors::TEXT_DEFAULT)
    ));
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}{}", space, msg, space));
}

fn seconds(elapsed: Duration) -> ColoredString {
    format!("{:.2}s", elapsed.as_secs_f64()).bold().color(colors::ACCENT)
}

fn summary_line(summary: &RunSummary) -> String {
    let passed: ColoredString = format!("{} of {}", summary.passed, summary.candidates).bold().green();
    format!(
        "Validation complete: {passed} endpoints passed in {}",
        seconds(summary.elapsed)
    )
}

/// Final report of a run. With `quiet` only a single line is emitted.
pub fn summary(summary: &RunSummary, output: &str, quiet: bool) {
    let line: String = summary_line(summary);

    if quiet {
        success!("{line}");
        return;
    }

    header("run summary", quiet);
    let fetched: usize = summary.sources_attempted - summary.sources_failed;
    aligned_line(
        "Sources",
        format!("{fetched} fetched, {} failed", summary.sources_failed),
    );
    aligned_line("Candidates", summary.candidates);
    aligned_line("Passed", summary.passed.to_string().green().bold());
    aligned_line("Failed", summary.failed);
    aligned_line("Errored", summary.errored);

    let written: ColoredString = match (&summary.write_error, &summary.publish_error) {
        (Some(_), _) => "not written".red(),
        (None, Some(_)) => format!("{output} (publish failed)").yellow(),
        (None, None) => output.normal(),
    };
    aligned_line("Output", written);

    fat_separator();
    centerln(&line);
}
