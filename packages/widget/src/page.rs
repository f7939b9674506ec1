//! Marker discovery and page rewriting.
//!
//! A page hosts widgets through marker elements:
//!
//! ```html
//! <div class="qso-widget" data-src="https://example.com/log.json" data-layout="horizontal"></div>
//! ```
//!
//! [`discover_widgets`] reads the markers in document order, and
//! [`rewrite_markers`] replaces the content of the n-th marker with the n-th
//! fragment. [`render_page`] does both around a concurrent load.

use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use qso_widget_models::{LAYOUT_ATTRIBUTE, MARKER_CLASS, SRC_ATTRIBUTE, WidgetConfig};
use qso_widget_render::{render_error, render_loading};
use scraper::{Html, Selector};

use crate::{PayloadFetcher, WidgetError, load_widgets};

/// Errors from page processing.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// The marker selector could not be parsed.
    #[error("Invalid selector '{selector}': {message}")]
    Selector {
        /// The offending selector.
        selector: String,
        /// Parser message.
        message: String,
    },

    /// The document could not be rewritten.
    #[error("HTML rewrite failed: {0}")]
    Rewrite(#[from] lol_html::errors::RewritingError),
}

fn marker_selector() -> String {
    format!(".{MARKER_CLASS}")
}

/// Returns the widget descriptors of every marker in `html`, in document
/// order.
///
/// # Errors
///
/// Returns [`PageError::Selector`] if the marker selector is rejected.
pub fn discover_widgets(html: &str) -> Result<Vec<WidgetConfig>, PageError> {
    let selector_str = marker_selector();
    let selector = Selector::parse(&selector_str).map_err(|e| PageError::Selector {
        selector: selector_str.clone(),
        message: e.to_string(),
    })?;

    let document = Html::parse_document(html);
    let configs: Vec<WidgetConfig> = document
        .select(&selector)
        .map(|el| {
            let element = el.value();
            WidgetConfig::from_attributes(
                element.attr(SRC_ATTRIBUTE),
                element.attr(LAYOUT_ATTRIBUTE),
            )
        })
        .collect();

    log::debug!("Discovered {} widget marker(s)", configs.len());
    Ok(configs)
}

/// Replaces the inner content of each marker with the fragment at the same
/// index. Markers beyond the end of `fragments` are left untouched.
///
/// # Errors
///
/// Returns [`PageError::Rewrite`] if the document cannot be processed.
pub fn rewrite_markers<S: AsRef<str>>(html: &str, fragments: &[S]) -> Result<String, PageError> {
    let mut index = 0usize;
    let selector = marker_selector();

    let rewritten = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!(selector, |el| {
                if let Some(fragment) = fragments.get(index) {
                    el.set_inner_content(fragment.as_ref(), ContentType::Html);
                }
                index += 1;
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )?;

    Ok(rewritten)
}

/// Fills every marker with its initial state: the loading placeholder, or
/// the configuration error for markers without a source.
///
/// # Errors
///
/// Returns [`PageError`] if discovery or rewriting fails.
pub fn render_placeholders(html: &str) -> Result<String, PageError> {
    let fragments: Vec<String> = discover_widgets(html)?
        .iter()
        .map(|config| {
            if config.src.is_some() {
                render_loading()
            } else {
                render_error(&WidgetError::MissingConfiguration.display_message())
            }
        })
        .collect();

    rewrite_markers(html, &fragments)
}

/// Discovers every marker in `html`, loads all widgets concurrently, and
/// returns the page with each marker's content replaced by its rendered
/// statistics or error message.
///
/// # Errors
///
/// Returns [`PageError`] if discovery or rewriting fails. Individual widget
/// failures are rendered into the page, not returned.
pub async fn render_page<F>(fetcher: &F, html: &str) -> Result<String, PageError>
where
    F: PayloadFetcher + ?Sized,
{
    let configs = discover_widgets(html)?;
    let outcomes = load_widgets(fetcher, &configs).await;

    let failed = outcomes.iter().filter(|o| o.error().is_some()).count();
    if failed > 0 {
        log::warn!("{failed} of {} widget(s) failed to load", outcomes.len());
    }

    let fragments: Vec<&str> = outcomes.iter().map(crate::WidgetOutcome::html).collect();
    rewrite_markers(html, &fragments)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use qso_widget_models::Layout;

    use super::*;
    use crate::test_support::{Canned, StubFetcher};

    const PAGE: &str = r#"<!DOCTYPE html>
<html><body>
<h1>Log</h1>
<div class="qso-widget" data-src="a.json"></div>
<p>between</p>
<div class="box qso-widget" data-src="b.json" data-layout="horizontal">old</div>
<div class="qso-widget"></div>
<div class="other" data-src="ignored.json"></div>
</body></html>"#;

    #[test]
    fn discovers_markers_in_document_order() {
        let configs = discover_widgets(PAGE).unwrap();
        assert_eq!(
            configs,
            vec![
                WidgetConfig::new("a.json", Layout::Table),
                WidgetConfig::new("b.json", Layout::Horizontal),
                WidgetConfig::default(),
            ]
        );
    }

    #[test]
    fn page_without_markers_is_empty() {
        assert!(discover_widgets("<p>nothing</p>").unwrap().is_empty());
    }

    #[test]
    fn rewrites_markers_by_index() {
        let html = r#"<div class="qso-widget">x</div><div class="qso-widget">y</div>"#;
        let out = rewrite_markers(html, &["<b>1</b>", "<b>2</b>"]).unwrap();
        assert_eq!(
            out,
            r#"<div class="qso-widget"><b>1</b></div><div class="qso-widget"><b>2</b></div>"#
        );
    }

    #[test]
    fn extra_markers_are_left_alone() {
        let html = r#"<div class="qso-widget">x</div><div class="qso-widget">y</div>"#;
        let out = rewrite_markers(html, &["1"]).unwrap();
        assert_eq!(
            out,
            r#"<div class="qso-widget">1</div><div class="qso-widget">y</div>"#
        );
    }

    #[test]
    fn placeholders_distinguish_missing_src() {
        let out = render_placeholders(PAGE).unwrap();
        assert_eq!(out.matches("Loading…").count(), 2);
        assert_eq!(out.matches("No data-src provided").count(), 1);
        assert!(out.contains("<p>between</p>"));
    }

    #[tokio::test]
    async fn renders_every_marker() {
        let fetcher = StubFetcher::default()
            .with(
                "a.json",
                Canned::Body(r#"[{"call":"K1ABC","date":"2024-05-01"}]"#),
            )
            .with("b.json", Canned::Status(500));

        let out = render_page(&fetcher, PAGE).await.unwrap();

        assert!(out.contains(">Total QSOs</th>"));
        assert!(out.contains(">2024-05-01</td>"));
        assert!(out.contains("Widget load error: HTTP 500"));
        assert!(!out.contains(">old</div>"));
        assert!(out.contains("No data-src provided"));
        assert!(out.contains(r#"<div class="other" data-src="ignored.json"></div>"#));
        assert_eq!(fetcher.call_count(), 2);
    }
}
