//! Host collaborator traits
//!
//! The documentation engine owns link resolution and template rendering.
//! This module defines the seams the formatter and the template hook use,
//! plus a plain HTML builder used by the CLI and tests.

use anyhow::Result;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::NeedsError;

/// Output format of the active builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Latex,
    Text,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Html => write!(f, "html"),
            OutputFormat::Latex => write!(f, "latex"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = NeedsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "latex" => Ok(OutputFormat::Latex),
            "text" => Ok(OutputFormat::Text),
            _ => Err(NeedsError::UnknownFormat(s.to_string())),
        }
    }
}

/// Link resolution provided by the documentation builder
pub trait Builder {
    /// Relative URI from document `from` to document `to`.
    /// Returns `None` when `to` is not known to the builder.
    fn relative_uri(&self, from: &str, to: &str) -> Option<String>;

    fn format(&self) -> OutputFormat;
}

/// Template engine provided by the documentation builder
pub trait TemplateRenderer {
    fn render_string(&self, source: &str, context: &BTreeMap<String, Value>) -> Result<String>;
}

/// Builder producing `<docname>.html` targets
///
/// When constructed with a set of docnames, links to any other document
/// fail to resolve.
#[derive(Debug, Clone, Default)]
pub struct HtmlBuilder {
    docnames: Option<HashSet<String>>,
}

impl HtmlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_docnames<I, S>(docnames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            docnames: Some(docnames.into_iter().map(Into::into).collect()),
        }
    }

    pub fn target_uri(docname: &str) -> String {
        format!("{}.html", docname)
    }
}

impl Builder for HtmlBuilder {
    fn relative_uri(&self, from: &str, to: &str) -> Option<String> {
        if to.is_empty() {
            return None;
        }
        if let Some(known) = &self.docnames {
            if !known.contains(to) {
                return None;
            }
        }
        Some(relative_uri(
            &Self::target_uri(from),
            &Self::target_uri(to),
        ))
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

/// Relative URL from `base` to `to`, both given as `/`-separated paths
pub fn relative_uri(base: &str, to: &str) -> String {
    if to.starts_with('/') {
        return to.to_string();
    }
    let base = base.split('#').next().unwrap_or(base);
    let base_parts: Vec<&str> = base.split('/').collect();
    let to_parts: Vec<&str> = to.split('/').collect();

    let common = base_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(b, t)| b == t)
        .count();
    let base_rest = &base_parts[common..];
    let to_rest = &to_parts[common..];

    if base_rest == to_rest {
        return String::new();
    }
    if base_rest.len() == 1 && to_rest == [""] {
        return "./".to_string();
    }
    let ups = base_rest.len().saturating_sub(1);
    format!("{}{}", "../".repeat(ups), to_rest.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_uri() {
        assert_eq!(relative_uri("index.html", "index.html"), "");
        assert_eq!(relative_uri("index.html", "specs.html"), "specs.html");
        assert_eq!(
            relative_uri("guide/intro.html", "specs.html"),
            "../specs.html"
        );
        assert_eq!(
            relative_uri("guide/intro.html", "guide/setup.html"),
            "setup.html"
        );
        assert_eq!(
            relative_uri("index.html", "api/needs.html"),
            "api/needs.html"
        );
    }

    #[test]
    fn test_html_builder_unknown_docname() {
        let builder = HtmlBuilder::with_docnames(["index", "specs"]);
        assert_eq!(
            builder.relative_uri("index", "specs"),
            Some("specs.html".to_string())
        );
        assert_eq!(builder.relative_uri("index", "missing"), None);
        assert_eq!(HtmlBuilder::new().relative_uri("index", ""), None);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("HTML".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert!("epub".parse::<OutputFormat>().is_err());
    }
}
