use std::io;
use std::time::Duration;

use ratatui::layout::Size;

use crate::util::unicode;

/// Key code delivered when the terminal was resized
pub const RESIZE: i32 = 0x19a;
/// Key code delivered when the process received an interrupt signal
pub const INTERRUPT: i32 = 0x200;

/// Semantic style class of a piece of text. The theme decides the colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Todo,
    Doing,
    Done,
    Important,
    NotImportant,
    Heading,
    GroupHeader,
    Selected,
    Title,
    Help,
    Hint,
    Status,
    Prompt,
    Input,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub row: u16,
    pub col: u16,
    pub text: String,
    pub tone: Tone,
}

/// One frame worth of styled text placed at (row, column).
///
/// Writes are clipped to the canvas: anything past the right edge is cut and
/// rows below the bottom are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    size: Size,
    placements: Vec<Placement>,
    cursor: Option<(u16, u16)>,
}

impl Canvas {
    pub fn new(size: Size) -> Self {
        Canvas {
            size,
            placements: Vec::new(),
            cursor: None,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn put(&mut self, row: u16, col: u16, text: &str, tone: Tone) {
        if row >= self.size.height || col >= self.size.width {
            return;
        }
        let room = usize::from(self.size.width - col);
        let text = unicode::truncate_to_width(text, room);
        if text.is_empty() {
            return;
        }
        self.placements.push(Placement {
            row,
            col,
            text: text.to_string(),
            tone,
        });
    }

    /// Drop everything placed on rows `from` and below
    pub fn clear_from_row(&mut self, from: u16) {
        self.placements.retain(|p| p.row < from);
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Show the terminal cursor at (row, col); None hides it
    pub fn set_cursor(&mut self, cursor: Option<(u16, u16)>) {
        let size = self.size;
        self.cursor = cursor.filter(|&(row, col)| row < size.height && col < size.width);
    }

    pub fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor
    }
}

/// What the session needs from a terminal.
///
/// Key codes 0..=255 are raw input bytes; anything at or above 256 is a
/// special event such as [`RESIZE`] or [`INTERRUPT`].
pub trait Surface {
    fn size(&mut self) -> io::Result<Size>;

    fn present(&mut self, canvas: &Canvas) -> io::Result<()>;

    /// Block until the next code arrives
    fn next_code(&mut self) -> io::Result<i32>;

    /// Wait at most `wait` for the next code
    fn next_code_within(&mut self, wait: Duration) -> io::Result<Option<i32>>;
}
