//! Slack mrkdwn rendering of a [`UsageSummary`].

#![allow(missing_docs)]

use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::report::aggregate::UsageSummary;

/// `Xh MMm`, truncating leftover seconds.
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{hours}h {minutes:02}m")
}

#[allow(clippy::cast_precision_loss)]
fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Build the daily summary message.
///
/// The `top_n` longest-running apps are listed individually and the rest are
/// folded into one `Other (N apps)` row. Labels are padded to the widest one.
#[must_use]
pub fn format_report(summary: &UsageSummary, top_n: usize, day: NaiveDate) -> String {
    let total = summary.total_active_seconds;
    let mut out = String::new();

    let _ = writeln!(
        out,
        ":bar_chart: *App Usage Summary for {} ({})*",
        day.format("%Y-%m-%d"),
        day.format("%A")
    );
    out.push('\n');
    let _ = writeln!(out, "Total tracked time: {}", format_duration(total));
    out.push('\n');

    let ranked = summary.ranked_apps();
    let split = top_n.min(ranked.len());
    let (top, rest) = ranked.split_at(split);

    let other = (!rest.is_empty()).then(|| {
        (
            format!("Other ({} apps)", rest.len()),
            rest.iter().map(|(_, secs)| secs).sum::<u64>(),
        )
    });

    let width = top
        .iter()
        .map(|(name, _)| name.chars().count())
        .chain(other.as_ref().map(|(label, _)| label.chars().count()))
        .max()
        .unwrap_or(10);

    let rows = top
        .iter()
        .map(|(name, secs)| (*name, *secs))
        .chain(other.as_ref().map(|(label, secs)| (label.as_str(), *secs)));
    for (label, secs) in rows {
        let _ = writeln!(
            out,
            "  {label:<width$}  {}  ({:.1}%)",
            format_duration(secs),
            percent(secs, total)
        );
    }
    out.push('\n');

    if let Some(top_switch) = &summary.top_switch {
        let _ = writeln!(
            out,
            "Top switch: {} <-> {} ({} times)",
            top_switch.pair.first, top_switch.pair.second, top_switch.count
        );
    }
    let _ = write!(
        out,
        "Idle time excluded: {}",
        format_duration(summary.idle_seconds)
    );
    out
}
