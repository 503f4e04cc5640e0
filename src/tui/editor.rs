use std::io;

use ratatui::layout::Size;

use crate::util::unicode;

use super::keys::{Key, KeyDecoder, read_key};
use super::surface::{Canvas, Surface, Tone};

/// Column where the input text starts
const INPUT_COL: u16 = 5;
/// Columns kept free around the input field
const INPUT_MARGIN: u16 = 10;
const PROMPT_COL: u16 = 2;

/// What a key did to the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Confirm,
    Cancel,
    Interrupt,
}

/// Single-line text buffer with a caret.
///
/// The caret is a byte offset that always sits on a grapheme boundary, so
/// every motion moves over whole user-visible characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEditor {
    buffer: String,
    caret: usize,
}

impl LineEditor {
    /// Start with `text`, caret at the end
    pub fn new(text: &str) -> Self {
        LineEditor {
            buffer: text.to_string(),
            caret: text.len(),
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn into_text(self) -> String {
        self.buffer
    }

    pub fn insert(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        self.buffer.insert(self.caret, c);
        self.caret += c.len_utf8();
    }

    pub fn delete_back(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.buffer, self.caret) {
            self.buffer.drain(prev..self.caret);
            self.caret = prev;
        }
    }

    pub fn delete_forward(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(&self.buffer, self.caret) {
            self.buffer.drain(self.caret..next);
        }
    }

    pub fn left(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.buffer, self.caret) {
            self.caret = prev;
        }
    }

    pub fn right(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(&self.buffer, self.caret) {
            self.caret = next;
        }
    }

    pub fn home(&mut self) {
        self.caret = 0;
    }

    pub fn end(&mut self) {
        self.caret = self.buffer.len();
    }

    pub fn word_left(&mut self) {
        self.caret = unicode::word_boundary_left(&self.buffer, self.caret);
    }

    pub fn word_right(&mut self) {
        self.caret = unicode::word_boundary_right(&self.buffer, self.caret);
    }

    pub fn delete_word_back(&mut self) {
        let target = unicode::word_boundary_left(&self.buffer, self.caret);
        self.buffer.drain(target..self.caret);
        self.caret = target;
    }

    pub fn kill_to_start(&mut self) {
        self.buffer.drain(..self.caret);
        self.caret = 0;
    }

    pub fn kill_to_end(&mut self) {
        self.buffer.truncate(self.caret);
    }

    pub fn handle_key(&mut self, key: Key) -> Outcome {
        match key {
            Key::Enter => return Outcome::Confirm,
            Key::Esc | Key::Ctrl('c') => return Outcome::Cancel,
            Key::Interrupt => return Outcome::Interrupt,

            Key::Left | Key::Ctrl('b') => self.left(),
            Key::Right | Key::Ctrl('f') => self.right(),
            Key::Home | Key::Ctrl('a') => self.home(),
            Key::End | Key::Ctrl('e') => self.end(),
            Key::CtrlLeft | Key::AltLeft | Key::Alt('b') => self.word_left(),
            Key::CtrlRight | Key::AltRight | Key::Alt('f') => self.word_right(),

            Key::Backspace => self.delete_back(),
            Key::Delete | Key::Ctrl('d') => self.delete_forward(),
            Key::Ctrl('w') | Key::AltBackspace => self.delete_word_back(),
            Key::Ctrl('u') => self.kill_to_start(),
            Key::Ctrl('k') => self.kill_to_end(),

            Key::Char(c) => self.insert(c),
            _ => {}
        }
        Outcome::Continue
    }

    /// The part of the buffer that fits in `width` cells, and the caret's
    /// column inside it.
    ///
    /// The window is derived from the caret alone: it starts at 0 while the
    /// caret fits, otherwise it ends just after the caret so as much text
    /// before the caret as possible stays in view.
    pub fn visible(&self, width: usize) -> Option<(&str, usize)> {
        if width == 0 {
            return None;
        }
        let caret_col = unicode::byte_offset_to_display_col(&self.buffer, self.caret);
        let want = caret_col.saturating_sub(width - 1);
        let start = unicode::display_col_to_byte_offset(&self.buffer, want);
        let start_col = unicode::byte_offset_to_display_col(&self.buffer, start);
        let shown = unicode::truncate_to_width(&self.buffer[start..], width);
        Some((shown, caret_col - start_col))
    }
}

/// Result of a prompt. Cancelling returns the initial text unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompted {
    pub text: String,
    /// The session was interrupted while the prompt was open
    pub interrupted: bool,
}

/// Draw the prompt label and the visible part of the input over the bottom
/// rows of `canvas`.
pub fn draw_prompt(canvas: &mut Canvas, label: &str, editor: &LineEditor) {
    let Size { width, height } = canvas.size();
    let prompt_row = height.saturating_sub(3);
    let input_row = height.saturating_sub(2);
    canvas.clear_from_row(prompt_row);
    canvas.put(prompt_row, PROMPT_COL, label, Tone::Prompt);

    let field = usize::from(width.saturating_sub(INPUT_MARGIN));
    match editor.visible(field) {
        Some((shown, caret_col)) => {
            canvas.put(input_row, INPUT_COL, shown, Tone::Input);
            let caret_col = u16::try_from(caret_col).unwrap_or(u16::MAX);
            let col = INPUT_COL.saturating_add(caret_col);
            canvas.set_cursor(Some((input_row, col)));
        }
        None => canvas.set_cursor(None),
    }
}

/// Run the editor as a modal loop until the user confirms or cancels.
///
/// `background` draws the screen behind the prompt for the current size; it
/// is called again every frame so a resize is picked up.
pub fn prompt<S, F>(
    surface: &mut S,
    decoder: &mut KeyDecoder,
    label: &str,
    initial: &str,
    background: F,
) -> io::Result<Prompted>
where
    S: Surface,
    F: Fn(Size) -> Canvas,
{
    let mut editor = LineEditor::new(initial);
    loop {
        let mut canvas = background(surface.size()?);
        draw_prompt(&mut canvas, label, &editor);
        surface.present(&canvas)?;

        let key = read_key(surface, decoder)?;
        match editor.handle_key(key) {
            Outcome::Continue => {}
            Outcome::Confirm => {
                return Ok(Prompted {
                    text: editor.into_text(),
                    interrupted: false,
                });
            }
            Outcome::Cancel => {
                return Ok(Prompted {
                    text: initial.to_string(),
                    interrupted: false,
                });
            }
            Outcome::Interrupt => {
                tracing::info!("interrupted while editing");
                return Ok(Prompted {
                    text: initial.to_string(),
                    interrupted: true,
                });
            }
        }
    }
}
