use crate::model::{Document, Item, ItemKind};

const HEADING_MARKER: &str = "##";

/// Parse one line of the task file.
///
/// Recognizes `## <text>` and `- [c] <text>` where `c` is one of the five
/// checkbox characters. Anything else yields `None` and is dropped by the
/// caller. Surrounding whitespace on the line and on the text is ignored.
pub fn parse_line(line: &str) -> Option<Item> {
    let line = line.trim();

    if let Some(rest) = line.strip_prefix(HEADING_MARKER) {
        let text = marker_tail(rest)?;
        return Some(Item::heading(text));
    }

    let rest = line.strip_prefix("- [")?;
    let mut chars = rest.chars();
    let c = chars.next()?;
    let kind = match c {
        // Some editors write the done marker in upper case
        'X' => ItemKind::Done,
        c => ItemKind::from_checkbox_char(c)?,
    };
    let rest = chars.as_str().strip_prefix(']')?;
    let text = marker_tail(rest)?;
    Some(Item::new(kind, text))
}

/// The text after a marker: either nothing, or a space and then the text.
/// `##x` and `- [ ]x` are not markers.
fn marker_tail(rest: &str) -> Option<&str> {
    if rest.is_empty() {
        return Some("");
    }
    if rest.starts_with(char::is_whitespace) {
        return Some(rest.trim());
    }
    None
}

/// Parse a whole file. Unrecognized lines are skipped.
pub fn parse_document(text: &str) -> (Document, usize) {
    let mut items = Vec::new();
    let mut dropped = 0;
    for line in text.lines() {
        match parse_line(line) {
            Some(item) => items.push(item),
            None if line.trim().is_empty() => {}
            None => dropped += 1,
        }
    }
    (Document::from_items(items), dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_six_prefixes() {
        let cases = [
            ("## Errands", ItemKind::Heading, "Errands"),
            ("- [ ] buy milk", ItemKind::Todo, "buy milk"),
            ("- [~] write report", ItemKind::Doing, "write report"),
            ("- [x] pay bills", ItemKind::Done, "pay bills"),
            ("- [!] call mom", ItemKind::Important, "call mom"),
            ("- [-] tidy desk", ItemKind::NotImportant, "tidy desk"),
        ];
        for (line, kind, text) in cases {
            assert_eq!(parse_line(line), Some(Item::new(kind, text)), "{}", line);
        }
    }

    #[test]
    fn ignores_unknown_lines() {
        for line in [
            "",
            "just some prose",
            "# Title",
            "### Sub heading",
            "- [>] active in another tool",
            "- plain bullet",
            "-[ ] missing space",
            "- [ ]no space after marker",
            "##no space",
        ] {
            assert_eq!(parse_line(line), None, "{:?}", line);
        }
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(
            parse_line("   - [ ]   padded text   \r"),
            Some(Item::task("padded text"))
        );
        assert_eq!(parse_line("##   Spaced  "), Some(Item::heading("Spaced")));
    }

    #[test]
    fn empty_text_is_allowed() {
        assert_eq!(parse_line("- [ ]"), Some(Item::task("")));
        assert_eq!(parse_line("- [x] "), Some(Item::new(ItemKind::Done, "")));
        assert_eq!(parse_line("##"), Some(Item::heading("")));
    }

    #[test]
    fn upper_case_x_is_done() {
        assert_eq!(
            parse_line("- [X] shipped"),
            Some(Item::new(ItemKind::Done, "shipped"))
        );
    }

    #[test]
    fn document_keeps_order_and_counts_dropped() {
        let (doc, dropped) =
            parse_document("- [ ] buy milk\n## Errands\nnoise\n\n- [x] pay bills\n");
        assert_eq!(
            doc.items(),
            &[
                Item::task("buy milk"),
                Item::heading("Errands"),
                Item::new(ItemKind::Done, "pay bills"),
            ]
        );
        assert_eq!(dropped, 1);
    }
}
