#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rendering of [`QsoStats`] records.
//!
//! Produces self-contained HTML fragments with inline styles (so they can
//! be dropped into any host page) plus a plain-text rendition for
//! terminals. All user-supplied text is HTML-escaped.

use std::fmt::Write as _;

use htmlize::escape_text;
use qso_widget_models::Layout;
use qso_widget_stats_models::QsoStats;

/// Placeholder shown for absent values in the horizontal bar.
pub const PLACEHOLDER: &str = "—";

/// Prefix of every failure message shown inside a widget.
pub const ERROR_PREFIX: &str = "Widget load error: ";

const FONT: &str = "font-family:Arial, sans-serif";

const TABLE_STYLE: &str = "border-collapse:collapse;font-family:Arial, sans-serif;font-size:13px";
const TH_STYLE: &str = "text-align:left;padding:6px 8px;border:1px solid #ddd";
const TD_STYLE: &str = "padding:6px 8px;border:1px solid #ddd";
const BAR_STYLE: &str = "display:flex;gap:12px;align-items:center;\
                         font-family:Arial, sans-serif;font-size:14px;padding:6px 8px;\
                         background:rgba(255,255,255,0.95);border:1px solid #ddd;\
                         border-radius:4px;width:100%";
const BAR_LABEL_STYLE: &str = "font-weight:600;color:#444";
const BAR_VALUE_STYLE: &str = "color:#111";
const ERROR_STYLE: &str = "color:#900;font-family:Arial, sans-serif;font-size:13px";

/// Returns the `(label, value)` rows for the table layout.
///
/// `Total QSOs` is always present; other rows appear only when the
/// statistic is.
#[must_use]
pub fn table_rows(stats: &QsoStats) -> Vec<(&'static str, String)> {
    let mut rows = vec![("Total QSOs", stats.total.to_string())];

    if let Some(unique) = stats.unique_calls {
        rows.push(("Unique Calls", unique.to_string()));
    }
    if let Some(miles) = stats.longest_miles {
        rows.push(("Longest (mi)", miles.to_string()));
    }
    if let Some(call) = &stats.longest_call {
        rows.push(("Longest Call", call.clone()));
    }
    if let Some(first) = &stats.first_qso {
        rows.push(("First QSO", first.clone()));
    }
    if let Some(last) = &stats.last_qso {
        rows.push(("Last QSO", last.clone()));
    }

    rows
}

/// Returns the three `(label, value)` items of the horizontal bar.
#[must_use]
pub fn bar_items(stats: &QsoStats) -> [(&'static str, String); 3] {
    [
        ("QSOs", stats.total.to_string()),
        (
            "Longest (mi)",
            stats
                .longest_miles
                .map_or_else(|| PLACEHOLDER.to_string(), |m| m.to_string()),
        ),
        (
            "Longest Call",
            stats
                .longest_call
                .clone()
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        ),
    ]
}

/// Renders `stats` as an HTML fragment in the given layout.
#[must_use]
pub fn render_html(stats: &QsoStats, layout: Layout) -> String {
    match layout {
        Layout::Table => render_table(stats),
        Layout::Horizontal => render_horizontal(stats),
    }
}

/// Renders the two-column table layout.
#[must_use]
pub fn render_table(stats: &QsoStats) -> String {
    let mut html = format!("<table style=\"{TABLE_STYLE}\">");
    for (label, value) in table_rows(stats) {
        write!(
            html,
            "<tr><th style=\"{TH_STYLE}\">{}</th><td style=\"{TD_STYLE}\">{}</td></tr>",
            escape_text(label),
            escape_text(value.as_str()),
        )
        .ok();
    }
    html.push_str("</table>");
    html
}

/// Renders the horizontal stat bar.
#[must_use]
pub fn render_horizontal(stats: &QsoStats) -> String {
    let mut html = format!("<div style=\"{BAR_STYLE}\">");
    for (label, value) in bar_items(stats) {
        write!(
            html,
            "<div><div style=\"{BAR_LABEL_STYLE}\">{}</div>\
             <div style=\"{BAR_VALUE_STYLE}\">{}</div></div>",
            escape_text(label),
            escape_text(value.as_str()),
        )
        .ok();
    }
    html.push_str("</div>");
    html
}

/// Renders the placeholder shown while a widget's source is loading.
#[must_use]
pub fn render_loading() -> String {
    format!("<div style=\"{FONT};font-size:13px\">Loading…</div>")
}

/// Renders a styled error message.
///
/// The message is shown verbatim; callers add [`ERROR_PREFIX`] where the
/// failure happened while loading.
#[must_use]
pub fn render_error(message: &str) -> String {
    format!(
        "<div style=\"{ERROR_STYLE}\">{}</div>",
        escape_text(message)
    )
}

/// Renders `stats` as plain text for a terminal.
#[must_use]
pub fn render_text(stats: &QsoStats, layout: Layout) -> String {
    match layout {
        Layout::Table => {
            let rows = table_rows(stats);
            let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
            rows.iter()
                .map(|(label, value)| format!("{label:<width$}  {value}"))
                .collect::<Vec<_>>()
                .join("\n")
        }
        Layout::Horizontal => bar_items(stats)
            .iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect::<Vec<_>>()
            .join(" | "),
    }
}
