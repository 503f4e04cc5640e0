use std::time::Duration;

use super::keys::Key;

/// How long a lone ESC waits for the key that turns it into an Alt binding
pub const FOLLOW_UP_WAIT: Duration = Duration::from_millis(100);

/// Everything the list screen can do in response to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CursorUp,
    CursorDown,
    AddTask,
    AddHeading,
    Edit,
    Delete,
    /// Full five-state cycle
    CycleState,
    /// Todo/Done toggle
    ToggleState,
    CycleView,
    Undo,
    MoveUp,
    MoveDown,
    Quit,
}

impl Command {
    /// Commands that change the document
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            Command::AddTask
                | Command::AddHeading
                | Command::Edit
                | Command::Delete
                | Command::CycleState
                | Command::ToggleState
                | Command::MoveUp
                | Command::MoveDown
        )
    }
}

/// Primary bindings. Keys without a command return None.
pub fn command_for(key: Key) -> Option<Command> {
    let command = match key {
        Key::Up | Key::Char('k') => Command::CursorUp,
        Key::Down | Key::Char('j') => Command::CursorDown,
        Key::Char('i') | Key::Char('o') => Command::AddTask,
        Key::Char('#') => Command::AddHeading,
        Key::Char('e') => Command::Edit,
        Key::Char('d') => Command::Delete,
        Key::Char('c') => Command::CycleState,
        Key::Char(' ') | Key::Char('h') | Key::Alt(' ') => Command::ToggleState,
        Key::Char('v') => Command::CycleView,
        Key::Char('u') => Command::Undo,
        Key::Char('K') | Key::ShiftUp | Key::AltUp | Key::Alt('k') => Command::MoveUp,
        Key::Char('J') | Key::ShiftDown | Key::AltDown | Key::Alt('j') => Command::MoveDown,
        Key::Char('q') | Key::Ctrl('c') | Key::Interrupt => Command::Quit,
        _ => return None,
    };
    Some(command)
}

/// Alt bindings reachable as a lone ESC followed by another key
fn alt_follow_up(key: Key) -> Option<Command> {
    match key {
        Key::Char('k') | Key::Up => Some(Command::MoveUp),
        Key::Char('j') | Key::Down => Some(Command::MoveDown),
        Key::Char(' ') => Some(Command::ToggleState),
        _ => None,
    }
}

/// Resolves keys to commands, remembering the previous key so that ESC
/// followed by a key typed separately still acts as Alt+key.
///
/// The pairing only holds within [`FOLLOW_UP_WAIT`]: the caller reads the
/// next key with that deadline while [`Bindings::awaiting_follow_up`] is true
/// and calls [`Bindings::expire`] when nothing arrives.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    last: Option<Key>,
}

impl Bindings {
    pub fn new() -> Self {
        Bindings::default()
    }

    /// A lone ESC was the last key
    pub fn awaiting_follow_up(&self) -> bool {
        self.last == Some(Key::Esc)
    }

    /// Forget the previous key
    pub fn expire(&mut self) {
        self.last = None;
    }

    pub fn resolve(&mut self, key: Key) -> Option<Command> {
        let previous = self.last.replace(key);
        if previous == Some(Key::Esc)
            && let Some(command) = alt_follow_up(key)
        {
            return Some(command);
        }
        command_for(key)
    }
}
