#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Widget descriptor and layout types.
//!
//! A [`WidgetConfig`] is what a marker element carries: the URL of its JSON
//! source and the layout to render with. Descriptors come either from page
//! markup or from a TOML manifest parsed by [`parse_manifest`].

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Attribute on a marker element holding the source URL.
pub const SRC_ATTRIBUTE: &str = "data-src";

/// Attribute on a marker element selecting the layout.
pub const LAYOUT_ATTRIBUTE: &str = "data-layout";

/// CSS class that flags an element as a widget host.
pub const MARKER_CLASS: &str = "qso-widget";

/// How a statistics record is presented.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Layout {
    /// Two-column table, one row per present statistic.
    #[default]
    Table,
    /// Single-row stat bar.
    Horizontal,
}

impl Layout {
    /// Interprets a `data-layout` attribute value.
    ///
    /// Only `"horizontal"` selects [`Layout::Horizontal`]; anything else,
    /// including a missing attribute, falls back to the table.
    #[must_use]
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some("horizontal") => Self::Horizontal,
            _ => Self::Table,
        }
    }
}

/// Configuration for one widget instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// URL (or local path) of the JSON source. `None` is a configuration
    /// error reported at render time.
    #[serde(default)]
    pub src: Option<String>,
    /// Presentation layout.
    #[serde(default)]
    pub layout: Layout,
}

impl WidgetConfig {
    /// Creates a descriptor for `src` with the given layout.
    #[must_use]
    pub fn new(src: impl Into<String>, layout: Layout) -> Self {
        Self {
            src: Some(src.into()),
            layout,
        }
    }

    /// Builds a descriptor from raw marker attributes.
    ///
    /// An empty `data-src` counts as missing.
    #[must_use]
    pub fn from_attributes(src: Option<&str>, layout: Option<&str>) -> Self {
        Self {
            src: src.filter(|s| !s.is_empty()).map(str::to_owned),
            layout: Layout::from_attribute(layout),
        }
    }
}

/// A list of widgets loaded from a TOML file.
///
/// ```toml
/// [[widget]]
/// src = "https://example.com/log.json"
/// layout = "horizontal"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetManifest {
    /// Widget descriptors in declaration order.
    #[serde(default, rename = "widget")]
    pub widgets: Vec<WidgetConfig>,
}

/// Errors from manifest parsing.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The manifest is not valid TOML or has the wrong structure.
    #[error("Invalid widget manifest: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Parses a TOML widget manifest.
///
/// # Errors
///
/// Returns [`ManifestError`] if the TOML is malformed or a field has the
/// wrong type (e.g. an unknown layout name).
pub fn parse_manifest(toml_str: &str) -> Result<WidgetManifest, ManifestError> {
    Ok(toml::de::from_str(toml_str)?)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn layout_attribute_defaults_to_table() {
        assert_eq!(Layout::from_attribute(None), Layout::Table);
        assert_eq!(Layout::from_attribute(Some("")), Layout::Table);
        assert_eq!(Layout::from_attribute(Some("grid")), Layout::Table);
        assert_eq!(Layout::from_attribute(Some("Horizontal")), Layout::Table);
        assert_eq!(
            Layout::from_attribute(Some("horizontal")),
            Layout::Horizontal
        );
    }

    #[test]
    fn layout_parses_from_name() {
        assert_eq!(Layout::from_str("horizontal").unwrap(), Layout::Horizontal);
        assert_eq!(Layout::from_str("table").unwrap(), Layout::Table);
        assert!(Layout::from_str("bar").is_err());
        assert_eq!(Layout::Horizontal.to_string(), "horizontal");
    }

    #[test]
    fn empty_src_attribute_is_missing() {
        let config = WidgetConfig::from_attributes(Some(""), Some("horizontal"));
        assert_eq!(config.src, None);
        assert_eq!(config.layout, Layout::Horizontal);
    }

    #[test]
    fn parses_manifest() {
        let manifest = parse_manifest(
            r#"
            [[widget]]
            src = "https://example.com/a.json"

            [[widget]]
            src = "logs/b.json"
            layout = "horizontal"

            [[widget]]
            layout = "table"
            "#,
        )
        .unwrap();

        assert_eq!(
            manifest.widgets,
            vec![
                WidgetConfig::new("https://example.com/a.json", Layout::Table),
                WidgetConfig::new("logs/b.json", Layout::Horizontal),
                WidgetConfig {
                    src: None,
                    layout: Layout::Table,
                },
            ]
        );
    }

    #[test]
    fn empty_manifest_has_no_widgets() {
        assert!(parse_manifest("").unwrap().widgets.is_empty());
    }

    #[test]
    fn rejects_unknown_layout() {
        assert!(parse_manifest("[[widget]]\nlayout = \"grid\"\n").is_err());
    }
}
