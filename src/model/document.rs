use super::item::{Item, ItemKind};

/// The ordered list of items for the whole session.
///
/// Items are addressed by their index in document order. Every mutation bumps
/// `revision`, which lets derived views notice that they are stale without the
/// caller having to remember to tell them.
#[derive(Debug, Clone, Default)]
pub struct Document {
    items: Vec<Item>,
    revision: u64,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    pub fn from_items(items: Vec<Item>) -> Self {
        Document { items, revision: 0 }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Deep copy of the items, for history snapshots
    pub fn snapshot(&self) -> Vec<Item> {
        self.items.clone()
    }

    /// Append an item, returning its index
    pub fn push(&mut self, item: Item) -> usize {
        self.items.push(item);
        self.touch();
        self.items.len() - 1
    }

    /// Remove the item at `index`. Out-of-range is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<Item> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        self.touch();
        Some(item)
    }

    /// Replace the text of the item at `index`
    pub fn set_text(&mut self, index: usize, text: &str) -> bool {
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };
        *item = Item::new(item.kind, text);
        self.touch();
        true
    }

    /// Apply a kind transition to the item at `index`
    pub fn update_kind(&mut self, index: usize, f: impl FnOnce(ItemKind) -> ItemKind) -> bool {
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };
        item.kind = f(item.kind);
        self.touch();
        true
    }

    /// Swap the items at two indices. Returns false when either is out of range.
    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        if a >= self.items.len() || b >= self.items.len() {
            return false;
        }
        self.items.swap(a, b);
        self.touch();
        true
    }

    /// Replace every item at once (undo restores through here)
    pub fn replace_all(&mut self, items: Vec<Item>) {
        self.items = items;
        self.touch();
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
