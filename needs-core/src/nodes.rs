//! Presentation nodes
//!
//! A tiny document tree for table cells: an entry holds paragraphs, a
//! paragraph holds inline nodes (text, emphasis, references). Nodes can be
//! rendered to HTML or flattened to plain text.

/// Inline content of a paragraph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Emphasis(String),
    Reference { refuri: String, children: Vec<Inline> },
}

impl Inline {
    pub fn text(s: impl Into<String>) -> Self {
        Inline::Text(s.into())
    }

    pub fn emphasis(s: impl Into<String>) -> Self {
        Inline::Emphasis(s.into())
    }

    pub fn reference(refuri: impl Into<String>, children: Vec<Inline>) -> Self {
        Inline::Reference {
            refuri: refuri.into(),
            children,
        }
    }

    pub fn to_plain_text(&self) -> String {
        match self {
            Inline::Text(s) | Inline::Emphasis(s) => s.clone(),
            Inline::Reference { children, .. } => {
                children.iter().map(Inline::to_plain_text).collect()
            }
        }
    }

    pub fn to_html(&self) -> String {
        match self {
            Inline::Text(s) => escape_html(s),
            Inline::Emphasis(s) => format!("<em>{}</em>", escape_html(s)),
            Inline::Reference { refuri, children } => {
                let inner: String = children.iter().map(Inline::to_html).collect();
                format!(
                    "<a class=\"reference internal\" href=\"{}\">{}</a>",
                    escape_html(refuri),
                    inner
                )
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub children: Vec<Inline>,
}

impl Paragraph {
    pub fn push(&mut self, node: Inline) {
        self.children.push(node);
    }

    pub fn to_plain_text(&self) -> String {
        self.children.iter().map(Inline::to_plain_text).collect()
    }

    pub fn to_html(&self) -> String {
        let inner: String = self.children.iter().map(Inline::to_html).collect();
        format!("<p>{}</p>", inner)
    }
}

/// A table cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub children: Vec<Paragraph>,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn push(&mut self, paragraph: Paragraph) {
        self.children.push(paragraph);
    }

    /// All inline nodes of the cell, in document order
    pub fn inlines(&self) -> impl Iterator<Item = &Inline> {
        self.children.iter().flat_map(|p| p.children.iter())
    }

    pub fn to_plain_text(&self) -> String {
        self.children
            .iter()
            .map(Paragraph::to_plain_text)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn to_html(&self) -> String {
        let inner: String = self.children.iter().map(Paragraph::to_html).collect();
        format!("<td>{}</td>", inner)
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_entry_renders_empty_cell() {
        let entry = Entry::new();
        assert!(entry.is_empty());
        assert_eq!(entry.to_html(), "<td></td>");
        assert_eq!(entry.to_plain_text(), "");
    }

    #[test]
    fn test_reference_html() {
        let mut paragraph = Paragraph::default();
        paragraph.push(Inline::reference(
            "specs.html#REQ_001",
            vec![Inline::text("REQ_001")],
        ));
        paragraph.push(Inline::emphasis("; "));
        paragraph.push(Inline::text("a<b"));

        let mut entry = Entry::new();
        entry.push(paragraph);

        assert_eq!(
            entry.to_html(),
            "<td><p><a class=\"reference internal\" href=\"specs.html#REQ_001\">REQ_001</a><em>; </em>a&lt;b</p></td>"
        );
        assert_eq!(entry.to_plain_text(), "REQ_001; a<b");
    }
}
