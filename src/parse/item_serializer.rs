use crate::model::{Document, Item};

/// Serialize one item to its line (without the trailing newline)
pub fn serialize_item(item: &Item) -> String {
    match item.kind.checkbox_char() {
        Some(c) => format!("- [{}] {}", c, item.text),
        None => format!("## {}", item.text),
    }
}

/// Serialize the whole document, one line per item, each newline-terminated
pub fn serialize_document(doc: &Document) -> String {
    let mut out = String::new();
    for item in doc.items() {
        out.push_str(&serialize_item(item));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemKind;
    use crate::parse::parse_line;

    #[test]
    fn round_trip_every_kind() {
        let kinds = ItemKind::TASK_CYCLE
            .iter()
            .copied()
            .chain(std::iter::once(ItemKind::Heading));
        for kind in kinds {
            let item = Item::new(kind, "some text · with ünïcode");
            let line = serialize_item(&item);
            assert_eq!(parse_line(&line), Some(item), "{}", line);
        }
    }

    #[test]
    fn serialize_formats() {
        assert_eq!(serialize_item(&Item::heading("Errands")), "## Errands");
        assert_eq!(serialize_item(&Item::task("buy milk")), "- [ ] buy milk");
        assert_eq!(
            serialize_item(&Item::new(ItemKind::NotImportant, "later")),
            "- [-] later"
        );
    }

    #[test]
    fn document_ends_every_line_with_newline() {
        let doc = Document::from_items(vec![Item::task("a"), Item::heading("H")]);
        assert_eq!(serialize_document(&doc), "- [ ] a\n## H\n");
        assert_eq!(serialize_document(&Document::new()), "");
    }
}
