#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! QSO statistics widget loader.
//!
//! Each [`WidgetConfig`] is loaded independently: fetch the source body,
//! parse it as JSON, derive a [`QsoStats`] record, and render it. Every
//! failure is caught at the widget and turned into a rendered error
//! message, so one broken source never affects another.
//!
//! [`page`] wires this to HTML documents: it discovers marker elements and
//! rewrites their contents with the rendered results.

pub mod fetch;
pub mod page;

use qso_widget_render::{ERROR_PREFIX, render_error, render_html};
use qso_widget_stats::{StatsError, stats_from_value};

pub use fetch::{FileFetcher, HttpFetcher, PayloadFetcher, SourceFetcher};
pub use qso_widget_models::{Layout, WidgetConfig, WidgetManifest};
pub use qso_widget_stats_models::QsoStats;

/// Errors that can occur while loading a widget.
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    /// The marker has no source URL.
    #[error("No data-src provided")]
    MissingConfiguration,

    /// The source answered with a non-success status.
    #[error("HTTP {status}")]
    Http {
        /// HTTP status code.
        status: u16,
    },

    /// The request could not be completed.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A local source could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The body is not valid JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The JSON matches none of the accepted shapes.
    #[error(transparent)]
    Format(#[from] StatsError),
}

impl WidgetError {
    /// Message shown inside the widget in place of the statistics.
    ///
    /// A missing source is reported as-is; load failures carry the
    /// [`ERROR_PREFIX`].
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::MissingConfiguration => self.to_string(),
            _ => format!("{ERROR_PREFIX}{self}"),
        }
    }
}

/// The result of loading one widget.
#[derive(Debug)]
pub enum WidgetOutcome {
    /// Statistics were derived and rendered.
    Rendered {
        /// The derived statistics.
        stats: QsoStats,
        /// Rendered HTML fragment.
        html: String,
    },
    /// Loading failed; `html` holds the rendered error message.
    Failed {
        /// What went wrong.
        error: WidgetError,
        /// Rendered error fragment.
        html: String,
    },
}

impl WidgetOutcome {
    /// The HTML fragment to place inside the marker element.
    #[must_use]
    pub fn html(&self) -> &str {
        match self {
            Self::Rendered { html, .. } | Self::Failed { html, .. } => html,
        }
    }

    /// The derived statistics, if loading succeeded.
    #[must_use]
    pub const fn stats(&self) -> Option<&QsoStats> {
        match self {
            Self::Rendered { stats, .. } => Some(stats),
            Self::Failed { .. } => None,
        }
    }

    /// The failure, if loading failed.
    #[must_use]
    pub const fn error(&self) -> Option<&WidgetError> {
        match self {
            Self::Rendered { .. } => None,
            Self::Failed { error, .. } => Some(error),
        }
    }
}

/// Fetches, parses, and derives statistics for one widget.
///
/// A missing `src` fails immediately without touching the fetcher.
///
/// # Errors
///
/// Returns [`WidgetError`] for a missing source, a fetch failure, a body
/// that is not JSON, or JSON of an unrecognized shape.
pub async fn fetch_stats<F>(fetcher: &F, config: &WidgetConfig) -> Result<QsoStats, WidgetError>
where
    F: PayloadFetcher + ?Sized,
{
    let src = config
        .src
        .as_deref()
        .ok_or(WidgetError::MissingConfiguration)?;

    let body = fetcher.fetch(src).await?;
    let value: serde_json::Value = serde_json::from_str(&body)?;
    Ok(stats_from_value(&value)?)
}

/// Loads and renders one widget, converting any failure into an error
/// fragment.
pub async fn load_widget<F>(fetcher: &F, config: &WidgetConfig) -> WidgetOutcome
where
    F: PayloadFetcher + ?Sized,
{
    match fetch_stats(fetcher, config).await {
        Ok(stats) => {
            log::debug!(
                "Loaded {} ({} contacts)",
                config.src.as_deref().unwrap_or_default(),
                stats.total
            );
            let html = render_html(&stats, config.layout);
            WidgetOutcome::Rendered { stats, html }
        }
        Err(error) => {
            log::warn!(
                "Widget {} failed: {error}",
                config.src.as_deref().unwrap_or("<no src>")
            );
            let html = render_error(&error.display_message());
            WidgetOutcome::Failed { error, html }
        }
    }
}

/// Returns one independent load future per descriptor.
///
/// The futures share nothing but the fetcher and may be driven in any
/// order or concurrently.
pub fn widget_tasks<'a, F>(
    fetcher: &'a F,
    configs: &'a [WidgetConfig],
) -> Vec<impl Future<Output = WidgetOutcome> + Send + 'a>
where
    F: PayloadFetcher + ?Sized,
{
    configs
        .iter()
        .map(|config| load_widget(fetcher, config))
        .collect()
}

/// Loads all widgets concurrently, returning outcomes in descriptor order.
pub async fn load_widgets<F>(fetcher: &F, configs: &[WidgetConfig]) -> Vec<WidgetOutcome>
where
    F: PayloadFetcher + ?Sized,
{
    log::info!("Loading {} widget(s)", configs.len());
    futures::future::join_all(widget_tasks(fetcher, configs)).await
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::{PayloadFetcher, WidgetError};

    /// Canned response for [`StubFetcher`].
    pub enum Canned {
        Body(&'static str),
        Status(u16),
    }

    /// In-memory fetcher keyed by source string.
    #[derive(Default)]
    pub struct StubFetcher {
        responses: BTreeMap<String, Canned>,
        pub calls: AtomicUsize,
    }

    impl StubFetcher {
        pub fn with(mut self, src: &str, canned: Canned) -> Self {
            self.responses.insert(src.to_string(), canned);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PayloadFetcher for StubFetcher {
        async fn fetch(&self, src: &str) -> Result<String, WidgetError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.responses.get(src) {
                Some(Canned::Body(body)) => Ok((*body).to_string()),
                Some(Canned::Status(status)) => Err(WidgetError::Http { status: *status }),
                None => Err(WidgetError::Http { status: 404 }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_support::{Canned, StubFetcher};

    #[tokio::test]
    async fn missing_src_does_not_fetch() {
        let fetcher = StubFetcher::default();
        let outcome = load_widget(&fetcher, &WidgetConfig::default()).await;

        assert!(matches!(
            outcome.error(),
            Some(WidgetError::MissingConfiguration)
        ));
        assert!(outcome.html().contains("No data-src provided"));
        assert!(!outcome.html().contains(ERROR_PREFIX));
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn renders_table_by_default() {
        let fetcher = StubFetcher::default().with(
            "a.json",
            Canned::Body(r#"{"contacts":[{"call":"K1ABC","qso_date":"2024-01-01"}]}"#),
        );
        let outcome = load_widget(&fetcher, &WidgetConfig::new("a.json", Layout::Table)).await;

        let stats = outcome.stats().unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.unique_calls, Some(1));
        assert!(outcome.html().starts_with("<table"));
    }

    #[tokio::test]
    async fn renders_horizontal_layout() {
        let fetcher = StubFetcher::default().with("a.json", Canned::Body(r#"{"total": 42}"#));
        let outcome =
            load_widget(&fetcher, &WidgetConfig::new("a.json", Layout::Horizontal)).await;

        assert_eq!(
            outcome.stats(),
            Some(&QsoStats {
                total: 42,
                ..QsoStats::default()
            })
        );
        assert!(outcome.html().contains("display:flex"));
    }

    #[tokio::test]
    async fn malformed_json_is_parse_error() {
        let fetcher = StubFetcher::default().with("bad.json", Canned::Body("{not json"));
        let outcome = load_widget(&fetcher, &WidgetConfig::new("bad.json", Layout::Table)).await;

        assert!(outcome.stats().is_none());
        assert!(matches!(outcome.error(), Some(WidgetError::Parse(_))));
        assert!(outcome.html().contains("Widget load error: JSON parse error"));
    }

    #[tokio::test]
    async fn http_status_is_reported() {
        let fetcher = StubFetcher::default().with("gone.json", Canned::Status(503));
        let outcome = load_widget(&fetcher, &WidgetConfig::new("gone.json", Layout::Table)).await;

        assert!(matches!(
            outcome.error(),
            Some(WidgetError::Http { status: 503 })
        ));
        assert!(outcome.html().contains("Widget load error: HTTP 503"));
    }

    #[tokio::test]
    async fn unexpected_shape_is_format_error() {
        let fetcher = StubFetcher::default().with("s.json", Canned::Body(r#""hello""#));
        let outcome = load_widget(&fetcher, &WidgetConfig::new("s.json", Layout::Table)).await;

        assert!(matches!(
            outcome.error(),
            Some(WidgetError::Format(StatsError::UnexpectedFormat))
        ));
        assert!(outcome
            .html()
            .contains("Widget load error: Unexpected JSON format"));
    }

    #[tokio::test]
    async fn failures_are_isolated_per_widget() {
        let fetcher = StubFetcher::default()
            .with("ok.json", Canned::Body("[]"))
            .with("bad.json", Canned::Body("<html>"));
        let configs = vec![
            WidgetConfig::new("ok.json", Layout::Table),
            WidgetConfig::new("bad.json", Layout::Table),
            WidgetConfig::default(),
            WidgetConfig::new("ok.json", Layout::Horizontal),
        ];

        let outcomes = load_widgets(&fetcher, &configs).await;

        assert_eq!(outcomes.len(), 4);
        assert!(outcomes[0].stats().is_some());
        assert!(matches!(outcomes[1].error(), Some(WidgetError::Parse(_))));
        assert!(matches!(
            outcomes[2].error(),
            Some(WidgetError::MissingConfiguration)
        ));
        assert!(outcomes[3].stats().is_some());
        assert_eq!(fetcher.call_count(), 3);
    }

    #[tokio::test]
    async fn tasks_can_run_in_any_order() {
        let fetcher = StubFetcher::default()
            .with("a.json", Canned::Body("[{}]"))
            .with("b.json", Canned::Body("[{}, {}]"));
        let configs = vec![
            WidgetConfig::new("a.json", Layout::Table),
            WidgetConfig::new("b.json", Layout::Table),
        ];

        let mut tasks = widget_tasks(&fetcher, &configs);
        let second = tasks.pop().unwrap().await;
        let first = tasks.pop().unwrap().await;

        assert_eq!(first.stats().map(|s| s.total), Some(1));
        assert_eq!(second.stats().map(|s| s.total), Some(2));
    }
}
