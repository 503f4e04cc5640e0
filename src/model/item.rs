/// What a line in the list is: a task in one of five states, or a heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Todo,
    Doing,
    Done,
    Important,
    NotImportant,
    Heading,
}

impl ItemKind {
    /// The five task states, in the order the full cycle visits them
    pub const TASK_CYCLE: [ItemKind; 5] = [
        ItemKind::Todo,
        ItemKind::Doing,
        ItemKind::Done,
        ItemKind::Important,
        ItemKind::NotImportant,
    ];

    /// The character used inside the checkbox `[ ]`. Headings have none.
    pub fn checkbox_char(self) -> Option<char> {
        match self {
            ItemKind::Todo => Some(' '),
            ItemKind::Doing => Some('~'),
            ItemKind::Done => Some('x'),
            ItemKind::Important => Some('!'),
            ItemKind::NotImportant => Some('-'),
            ItemKind::Heading => None,
        }
    }

    /// Parse a checkbox character into a task state
    pub fn from_checkbox_char(c: char) -> Option<ItemKind> {
        match c {
            ' ' => Some(ItemKind::Todo),
            '~' => Some(ItemKind::Doing),
            'x' => Some(ItemKind::Done),
            '!' => Some(ItemKind::Important),
            '-' => Some(ItemKind::NotImportant),
            _ => None,
        }
    }

    pub fn is_heading(self) -> bool {
        self == ItemKind::Heading
    }

    /// Next state in Todo -> Doing -> Done -> Important -> NotImportant -> Todo.
    /// Headings are fixed points.
    pub fn cycled(self) -> ItemKind {
        match self {
            ItemKind::Todo => ItemKind::Doing,
            ItemKind::Doing => ItemKind::Done,
            ItemKind::Done => ItemKind::Important,
            ItemKind::Important => ItemKind::NotImportant,
            ItemKind::NotImportant => ItemKind::Todo,
            ItemKind::Heading => ItemKind::Heading,
        }
    }

    /// Todo becomes Done; every other task state collapses to Todo.
    pub fn toggled(self) -> ItemKind {
        match self {
            ItemKind::Heading => ItemKind::Heading,
            ItemKind::Todo => ItemKind::Done,
            _ => ItemKind::Todo,
        }
    }
}

/// One entry of the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Single-line text, never containing a newline
    pub text: String,
    pub kind: ItemKind,
}

impl Item {
    /// Text is trimmed, and line breaks are folded into single spaces, so the
    /// item reads back unchanged from its serialized line.
    pub fn new(kind: ItemKind, text: impl Into<String>) -> Self {
        let text: String = text.into();
        let text = if text.contains(['\n', '\r']) {
            text.split(['\n', '\r'])
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        } else if text.trim().len() != text.len() {
            text.trim().to_string()
        } else {
            text
        };
        Item { text, kind }
    }

    pub fn task(text: impl Into<String>) -> Self {
        Item::new(ItemKind::Todo, text)
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Item::new(ItemKind::Heading, text)
    }

    pub fn is_heading(&self) -> bool {
        self.kind.is_heading()
    }

    /// Advance through all five task states. No-op on headings.
    pub fn cycle_all_states(&mut self) {
        self.kind = self.kind.cycled();
    }

    /// Binary Todo/Done toggle. No-op on headings.
    pub fn toggle_simple(&mut self) {
        self.kind = self.kind.toggled();
    }
}
