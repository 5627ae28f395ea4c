//! Table cell construction for need tables

use std::collections::BTreeMap;

use crate::builder::Builder;
use crate::models::{Field, Need};
use crate::nodes::{Entry, Inline, Paragraph};

/// Separator placed between the items of a list-valued cell
pub const ITEM_SEPARATOR: &str = "; ";

/// How the items of a cell are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefMode {
    /// Literal text
    #[default]
    PlainText,
    /// Link to an anchor named after the item, in the need's own document
    SelfReference,
    /// Treat the item as a need id and link to that need
    LookupReference,
}

/// Builds a table cell for `field` of `need`.
///
/// Items that cannot be linked (unknown document, unknown id) are rendered
/// as plain text. A need without a value for `field` gives an empty cell.
pub fn row_col_maker(
    builder: &dyn Builder,
    fromdocname: &str,
    all_needs: &BTreeMap<String, Need>,
    need: &Need,
    field: Field,
    mode: RefMode,
) -> Entry {
    let mut entry = Entry::new();

    let Some(value) = need.field(field) else {
        return entry;
    };
    let items = value.items();

    let mut paragraph = Paragraph::default();
    for (index, item) in items.iter().enumerate() {
        let text = Inline::text(*item);
        let refuri = match mode {
            RefMode::PlainText => None,
            RefMode::SelfReference => self_reference(builder, fromdocname, need, item),
            RefMode::LookupReference => lookup_reference(builder, fromdocname, all_needs, item),
        };

        match refuri {
            Some(uri) => paragraph.push(Inline::reference(uri, vec![text])),
            None => paragraph.push(text),
        }

        if index + 1 < items.len() {
            paragraph.push(Inline::emphasis(ITEM_SEPARATOR));
        }
    }

    entry.push(paragraph);
    entry
}

fn self_reference(builder: &dyn Builder, fromdocname: &str, need: &Need, item: &str) -> Option<String> {
    let docname = need.docname.as_deref()?;
    let uri = builder.relative_uri(fromdocname, docname)?;
    Some(format!("{}#{}", uri, item))
}

fn lookup_reference(
    builder: &dyn Builder,
    fromdocname: &str,
    all_needs: &BTreeMap<String, Need>,
    id: &str,
) -> Option<String> {
    let target = all_needs.get(id)?;
    let docname = target.docname.as_deref()?;
    let uri = builder.relative_uri(fromdocname, docname)?;
    Some(format!("{}#{}", uri, target.id))
}

/// Sort key for needs by status; a missing or empty status sorts first
pub fn status_sorter(need: &Need) -> &str {
    match need.status.as_deref() {
        Some(status) if !status.is_empty() => status,
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::HtmlBuilder;

    fn sample_needs() -> BTreeMap<String, Need> {
        let mut needs = BTreeMap::new();
        needs.insert(
            "REQ_001".to_string(),
            Need::new("REQ_001", "Login", "req")
                .with_status("open")
                .with_docname("guide/login")
                .with_links(vec!["SPEC_001".to_string(), "SPEC_404".to_string()]),
        );
        needs.insert(
            "SPEC_001".to_string(),
            Need::new("SPEC_001", "Login form", "spec").with_docname("specs"),
        );
        needs
    }

    fn references(entry: &Entry) -> Vec<&str> {
        entry
            .inlines()
            .filter_map(|node| match node {
                Inline::Reference { refuri, .. } => Some(refuri.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_absent_field_gives_empty_cell() {
        let needs = sample_needs();
        let need = &needs["SPEC_001"];
        let entry = row_col_maker(
            &HtmlBuilder::new(),
            "index",
            &needs,
            need,
            Field::Status,
            RefMode::PlainText,
        );
        assert!(entry.is_empty());
    }

    #[test]
    fn test_plain_list_has_separators_in_order() {
        let needs = sample_needs();
        let need = Need::new("REQ_002", "Logout", "req").with_tags(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ]);
        let entry = row_col_maker(
            &HtmlBuilder::new(),
            "index",
            &needs,
            &need,
            Field::Tags,
            RefMode::PlainText,
        );

        let nodes: Vec<&Inline> = entry.inlines().collect();
        assert_eq!(
            nodes,
            vec![
                &Inline::text("a"),
                &Inline::emphasis("; "),
                &Inline::text("b"),
                &Inline::emphasis("; "),
                &Inline::text("c"),
            ]
        );
    }

    #[test]
    fn test_scalar_is_single_item() {
        let needs = sample_needs();
        let entry = row_col_maker(
            &HtmlBuilder::new(),
            "index",
            &needs,
            &needs["REQ_001"],
            Field::Title,
            RefMode::PlainText,
        );
        assert_eq!(entry.to_plain_text(), "Login");
        assert_eq!(entry.inlines().count(), 1);
    }

    #[test]
    fn test_self_reference_uses_own_document() {
        let needs = sample_needs();
        let entry = row_col_maker(
            &HtmlBuilder::new(),
            "index",
            &needs,
            &needs["REQ_001"],
            Field::Id,
            RefMode::SelfReference,
        );
        assert_eq!(references(&entry), vec!["guide/login.html#REQ_001"]);
    }

    #[test]
    fn test_self_reference_without_docname_falls_back() {
        let needs = sample_needs();
        let need = Need::new("REQ_003", "Orphan", "req");
        let entry = row_col_maker(
            &HtmlBuilder::new(),
            "index",
            &needs,
            &need,
            Field::Id,
            RefMode::SelfReference,
        );
        assert!(references(&entry).is_empty());
        assert_eq!(entry.to_plain_text(), "REQ_003");
    }

    #[test]
    fn test_lookup_reference_targets_linked_need() {
        let needs = sample_needs();
        let entry = row_col_maker(
            &HtmlBuilder::new(),
            "guide/login",
            &needs,
            &needs["REQ_001"],
            Field::Links,
            RefMode::LookupReference,
        );

        // SPEC_404 is unknown and stays plain text
        assert_eq!(references(&entry), vec!["../specs.html#SPEC_001"]);
        assert_eq!(entry.to_plain_text(), "SPEC_001; SPEC_404");
    }

    #[test]
    fn test_lookup_reference_unresolvable_document() {
        let needs = sample_needs();
        let builder = HtmlBuilder::with_docnames(["index", "guide/login"]);
        let entry = row_col_maker(
            &builder,
            "index",
            &needs,
            &needs["REQ_001"],
            Field::Links,
            RefMode::LookupReference,
        );
        assert!(references(&entry).is_empty());
    }

    #[test]
    fn test_status_sorter() {
        let open = Need::new("A", "a", "req").with_status("open");
        let empty = Need::new("B", "b", "req").with_status("");
        let missing = Need::new("C", "c", "req");

        assert_eq!(status_sorter(&open), "open");
        assert_eq!(status_sorter(&empty), "");
        assert_eq!(status_sorter(&missing), "");
    }

    #[test]
    fn test_status_sort_is_stable() {
        let mut needs = vec![
            Need::new("A", "a", "req").with_status("open"),
            Need::new("B", "b", "req"),
            Need::new("C", "c", "req").with_status("closed"),
            Need::new("D", "d", "req").with_status(""),
        ];
        needs.sort_by(|a, b| status_sorter(a).cmp(status_sorter(b)));

        let ids: Vec<&str> = needs.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "D", "C", "A"]);
    }
}
