use anyhow::Result;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::builder::{Builder, OutputFormat, TemplateRenderer};

/// Renders a document's source as a template before it is parsed.
///
/// Only HTML output is templated; for other formats `source` is left as is.
/// Rendering errors are returned unchanged.
pub fn render_source_template(
    builder: &dyn Builder,
    renderer: &dyn TemplateRenderer,
    context: &BTreeMap<String, Value>,
    docname: &str,
    source: &mut String,
) -> Result<()> {
    if builder.format() != OutputFormat::Html {
        return Ok(());
    }

    let rendered = renderer.render_string(source.as_str(), context)?;
    tracing::debug!(docname, "rendered source template");
    *source = rendered;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::HtmlBuilder;

    /// Replaces `{{ key }}` with string context values
    struct Placeholders;

    impl TemplateRenderer for Placeholders {
        fn render_string(&self, source: &str, context: &BTreeMap<String, Value>) -> Result<String> {
            let mut out = source.to_string();
            for (key, value) in context {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                out = out.replace(&format!("{{{{ {} }}}}", key), &text);
            }
            if out.contains("{{") {
                anyhow::bail!("undefined variable in template");
            }
            Ok(out)
        }
    }

    struct LatexBuilder;

    impl Builder for LatexBuilder {
        fn relative_uri(&self, _from: &str, _to: &str) -> Option<String> {
            None
        }

        fn format(&self) -> OutputFormat {
            OutputFormat::Latex
        }
    }

    fn context() -> BTreeMap<String, Value> {
        let mut ctx = BTreeMap::new();
        ctx.insert("project".to_string(), Value::String("demo".to_string()));
        ctx
    }

    #[test]
    fn test_html_source_is_rendered() {
        let mut source = "Needs of {{ project }}".to_string();
        render_source_template(&HtmlBuilder::new(), &Placeholders, &context(), "index", &mut source)
            .unwrap();
        assert_eq!(source, "Needs of demo");
    }

    #[test]
    fn test_other_formats_are_untouched() {
        let mut source = "Needs of {{ project }}".to_string();
        render_source_template(&LatexBuilder, &Placeholders, &context(), "index", &mut source)
            .unwrap();
        assert_eq!(source, "Needs of {{ project }}");
    }

    #[test]
    fn test_render_error_propagates() {
        let mut source = "{{ missing }}".to_string();
        let result =
            render_source_template(&HtmlBuilder::new(), &Placeholders, &context(), "index", &mut source);
        assert!(result.is_err());
        assert_eq!(source, "{{ missing }}");
    }
}
