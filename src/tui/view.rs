use ratatui::layout::Size;

use crate::model::{Document, Item, ItemKind, ViewMode};

use super::surface::Tone;

/// First screen row of the list body
pub const BODY_TOP: u16 = 2;
/// Rows below the body: editor prompt, status, key help
const BODY_RESERVED: u16 = 4;

pub const EMPTY_HINT: &str = "No tasks yet. Press 'i' to add a task.";
pub const NOTHING_TO_GROUP_HINT: &str = "No tasks to group.";
const UNGROUPED_LABEL: &str = "UNGROUPED:";

/// State groups in display order
const STATE_GROUPS: [(ItemKind, &str); 5] = [
    (ItemKind::Todo, "TO DO:"),
    (ItemKind::Done, "DONE:"),
    (ItemKind::Doing, "IN PROGRESS:"),
    (ItemKind::Important, "IMPORTANT:"),
    (ItemKind::NotImportant, "NOT IMPORTANT:"),
];

/// One line of the list body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub text: String,
    pub tone: Tone,
    /// Selectable rows carry their display index; headers and spacers do not
    pub display_index: Option<usize>,
}

impl Row {
    fn label(text: &str, tone: Tone) -> Row {
        Row {
            text: text.to_string(),
            tone,
            display_index: None,
        }
    }

    fn blank() -> Row {
        Row::label("", Tone::Hint)
    }
}

/// The list as one view mode shows it.
///
/// `mapping[display_index]` is the document index of the item on that
/// selectable row. The mapping always covers every displayed item, even
/// those whose rows did not fit on the screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    rows: Vec<Row>,
    mapping: Vec<usize>,
}

impl Projection {
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn mapping(&self) -> &[usize] {
        &self.mapping
    }

    /// Number of selectable items
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Document index of the item at `cursor`, or None for no selection
    pub fn actual_index(&self, cursor: usize) -> Option<usize> {
        self.mapping.get(cursor).copied()
    }

    /// Display index of the item at document index `original`
    pub fn display_index_of(&self, original: usize) -> Option<usize> {
        self.mapping.iter().position(|&i| i == original)
    }

    /// Pull `cursor` back into range after the item count changed
    pub fn clamp(&self, cursor: usize) -> usize {
        cursor.min(self.mapping.len().saturating_sub(1))
    }

    fn push_item(&mut self, index: usize, item: &Item, text: String) {
        self.rows.push(Row {
            text,
            tone: tone_for(item.kind),
            display_index: Some(self.mapping.len()),
        });
        self.mapping.push(index);
    }
}

/// Number of list rows that fit on a screen of `size`
pub fn body_height(size: Size) -> usize {
    usize::from(size.height.saturating_sub(BODY_RESERVED))
}

pub fn tone_for(kind: ItemKind) -> Tone {
    match kind {
        ItemKind::Todo => Tone::Todo,
        ItemKind::Doing => Tone::Doing,
        ItemKind::Done => Tone::Done,
        ItemKind::Important => Tone::Important,
        ItemKind::NotImportant => Tone::NotImportant,
        ItemKind::Heading => Tone::Heading,
    }
}

fn bullet(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Todo => "-",
        ItemKind::Doing => "~",
        ItemKind::Done => "\u{2713}",
        ItemKind::Important => "!",
        ItemKind::NotImportant => "\u{00b7}",
        ItemKind::Heading => "#",
    }
}

fn item_text(item: &Item) -> String {
    format!(" {} {}", bullet(item.kind), item.text)
}

/// Build the rows and mapping for `mode`. Rows past `height` are dropped.
pub fn project(items: &[Item], mode: ViewMode, height: usize) -> Projection {
    let mut projection = match mode {
        ViewMode::Flat => project_flat(items),
        ViewMode::GroupedByState => project_by_state(items),
        ViewMode::GroupedByHeading => project_by_heading(items),
    };
    if projection.mapping.is_empty() {
        let hint = if items.is_empty() {
            EMPTY_HINT
        } else {
            NOTHING_TO_GROUP_HINT
        };
        projection.rows = vec![Row::label(hint, Tone::Hint)];
    }
    projection.rows.truncate(height);
    projection
}

fn project_flat(items: &[Item]) -> Projection {
    let mut projection = Projection::default();
    for (index, item) in items.iter().enumerate() {
        projection.push_item(index, item, item_text(item));
    }
    projection
}

fn project_by_state(items: &[Item]) -> Projection {
    let mut projection = Projection::default();
    for (kind, label) in STATE_GROUPS {
        let mut members = items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.kind == kind)
            .peekable();
        if members.peek().is_none() {
            continue;
        }
        projection.rows.push(Row::label(label, Tone::GroupHeader));
        for (index, item) in members {
            projection.push_item(index, item, item_text(item));
        }
        projection.rows.push(Row::blank());
    }
    projection
}

fn project_by_heading(items: &[Item]) -> Projection {
    let mut projection = Projection::default();
    let mut in_section = false;
    for (index, item) in items.iter().enumerate() {
        if item.is_heading() {
            if in_section {
                projection.rows.push(Row::blank());
            }
            in_section = true;
            projection.push_item(index, item, format!("{}:", item.text));
            continue;
        }
        if !in_section {
            projection
                .rows
                .push(Row::label(UNGROUPED_LABEL, Tone::GroupHeader));
            in_section = true;
        }
        projection.push_item(index, item, item_text(item));
    }
    projection
}

/// Caches the projection until the document, view mode or screen size
/// changes.
#[derive(Debug, Default)]
pub struct Projector {
    key: Option<(u64, ViewMode, Size)>,
    cached: Projection,
}

impl Projector {
    pub fn new() -> Self {
        Projector::default()
    }

    pub fn projection(&mut self, document: &Document, mode: ViewMode, size: Size) -> &Projection {
        let key = (document.revision(), mode, size);
        if self.key != Some(key) {
            self.cached = project(document.items(), mode, body_height(size));
            self.key = Some(key);
            tracing::debug!(
                ?mode,
                items = document.len(),
                shown = self.cached.len(),
                "projection rebuilt"
            );
        }
        &self.cached
    }

    /// Force the next call to rebuild
    pub fn invalidate(&mut self) {
        self.key = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_document;
    use pretty_assertions::assert_eq;

    const SCENARIO: &str = "- [ ] buy milk\n## Errands\n- [x] pay bills\n";

    fn items(md: &str) -> Vec<Item> {
        parse_document(md).0.items().to_vec()
    }

    fn texts(projection: &Projection) -> Vec<&str> {
        projection.rows().iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn scenario_mappings() {
        let items = items(SCENARIO);
        assert_eq!(items.len(), 3);
        assert_eq!(project(&items, ViewMode::Flat, 50).mapping(), &[0, 1, 2]);
        assert_eq!(
            project(&items, ViewMode::GroupedByHeading, 50).mapping(),
            &[0, 1, 2]
        );
        assert_eq!(
            project(&items, ViewMode::GroupedByState, 50).mapping(),
            &[0, 2]
        );
    }

    #[test]
    fn flat_rows() {
        let items = items(SCENARIO);
        let projection = project(&items, ViewMode::Flat, 50);
        assert_eq!(
            texts(&projection),
            vec![" - buy milk", " # Errands", " \u{2713} pay bills"]
        );
        assert_eq!(projection.rows()[1].tone, Tone::Heading);
        assert_eq!(projection.rows()[2].display_index, Some(2));
    }

    #[test]
    fn state_groups_in_fixed_order() {
        let md = "\
- [-] meh
- [ ] a
- [!] urgent
- [x] done one
- [~] working
- [ ] b
";
        let projection = project(&items(md), ViewMode::GroupedByState, 50);
        assert_eq!(projection.mapping(), &[1, 5, 3, 4, 2, 0]);
        assert_eq!(
            texts(&projection),
            vec![
                "TO DO:",
                " - a",
                " - b",
                "",
                "DONE:",
                " \u{2713} done one",
                "",
                "IN PROGRESS:",
                " ~ working",
                "",
                "IMPORTANT:",
                " ! urgent",
                "",
                "NOT IMPORTANT:",
                " \u{00b7} meh",
                "",
            ]
        );
    }

    #[test]
    fn state_view_skips_empty_groups_and_headings() {
        let md = "## H\n- [x] one\n## G\n- [x] two\n";
        let projection = project(&items(md), ViewMode::GroupedByState, 50);
        assert_eq!(texts(&projection), vec!["DONE:", " \u{2713} one", " \u{2713} two", ""]);
        assert_eq!(projection.mapping(), &[1, 3]);
    }

    #[test]
    fn header_rows_are_not_selectable() {
        let md = "- [ ] a\n- [ ] b\n- [x] c\n";
        let projection = project(&items(md), ViewMode::GroupedByState, 50);
        let selectable: Vec<Option<usize>> =
            projection.rows().iter().map(|r| r.display_index).collect();
        assert_eq!(
            selectable,
            vec![None, Some(0), Some(1), None, None, Some(2), None]
        );
        // Moving down twice from the top lands on the Done item.
        assert_eq!(projection.actual_index(2), Some(2));
    }

    #[test]
    fn heading_view_sections() {
        let md = "- [ ] loose\n## Work\n- [ ] report\n## Home\n- [~] dishes\n";
        let projection = project(&items(md), ViewMode::GroupedByHeading, 50);
        assert_eq!(projection.mapping(), &[0, 1, 2, 3, 4]);
        assert_eq!(
            texts(&projection),
            vec![
                "UNGROUPED:",
                " - loose",
                "",
                "Work:",
                " - report",
                "",
                "Home:",
                " ~ dishes",
            ]
        );
        assert_eq!(projection.rows()[0].display_index, None);
        assert_eq!(projection.rows()[3].display_index, Some(1));
    }

    #[test]
    fn heading_view_without_loose_items() {
        let md = "## Work\n- [ ] report\n";
        let projection = project(&items(md), ViewMode::GroupedByHeading, 50);
        assert_eq!(texts(&projection), vec!["Work:", " - report"]);
    }

    #[test]
    fn mapping_is_complete_in_every_mode() {
        let md = "\
- [ ] a
## H1
- [x] b
- [!] c
## H2
- [-] d
- [~] e
";
        let items = items(md);
        for mode in [
            ViewMode::Flat,
            ViewMode::GroupedByState,
            ViewMode::GroupedByHeading,
        ] {
            let mut mapping = project(&items, mode, 50).mapping().to_vec();
            mapping.sort_unstable();
            let expected: Vec<usize> = (0..items.len())
                .filter(|&i| mode != ViewMode::GroupedByState || !items[i].is_heading())
                .collect();
            assert_eq!(mapping, expected, "{:?}", mode);
        }
    }

    #[test]
    fn rows_truncate_but_mapping_does_not() {
        let md = "- [ ] a\n- [ ] b\n- [ ] c\n- [ ] d\n";
        let projection = project(&items(md), ViewMode::Flat, 2);
        assert_eq!(projection.rows().len(), 2);
        assert_eq!(projection.len(), 4);
    }

    #[test]
    fn empty_hints() {
        let projection = project(&[], ViewMode::Flat, 10);
        assert_eq!(texts(&projection), vec![EMPTY_HINT]);
        assert!(projection.is_empty());

        let only_headings = items("## Lonely\n");
        let projection = project(&only_headings, ViewMode::GroupedByState, 10);
        assert_eq!(texts(&projection), vec![NOTHING_TO_GROUP_HINT]);
    }

    #[test]
    fn clamp_and_lookup() {
        let projection = project(&items(SCENARIO), ViewMode::GroupedByState, 10);
        assert_eq!(projection.clamp(5), 1);
        assert_eq!(projection.actual_index(1), Some(2));
        assert_eq!(projection.actual_index(2), None);
        assert_eq!(projection.display_index_of(2), Some(1));
        assert_eq!(projection.display_index_of(1), None);
        assert_eq!(Projection::default().clamp(3), 0);
    }

    #[test]
    fn projector_rebuilds_only_on_change() {
        let mut doc = parse_document(SCENARIO).0;
        let mut projector = Projector::new();
        let size = Size::new(40, 20);

        let first = projector.projection(&doc, ViewMode::Flat, size).clone();
        assert_eq!(first.len(), 3);

        doc.push(Item::task("new"));
        assert_eq!(projector.projection(&doc, ViewMode::Flat, size).len(), 4);
        assert_eq!(
            projector.projection(&doc, ViewMode::GroupedByState, size).len(),
            3
        );
        let small = projector.projection(&doc, ViewMode::Flat, Size::new(40, 5));
        assert_eq!(small.rows().len(), 1);
    }

    #[test]
    fn body_height_leaves_room_for_chrome() {
        assert_eq!(body_height(Size::new(80, 24)), 20);
        assert_eq!(body_height(Size::new(80, 3)), 0);
    }
}
