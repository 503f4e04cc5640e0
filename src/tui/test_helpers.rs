use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Size;

use super::render::paint;
use super::surface::{Canvas, INTERRUPT, Surface};
use super::theme::Theme;

/// Scripted gap in the input: the lookahead after ESC expires here
pub const PAUSE: i32 = -1;

/// In-memory surface that replays a queue of key codes and keeps every frame.
///
/// Once the script runs out it reports an interrupt, so a session under test
/// always ends.
pub struct ScriptedSurface {
    size: Size,
    codes: VecDeque<i32>,
    frames: Vec<Canvas>,
}

impl ScriptedSurface {
    pub fn new(width: u16, height: u16) -> Self {
        ScriptedSurface {
            size: Size::new(width, height),
            codes: VecDeque::new(),
            frames: Vec::new(),
        }
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.codes.extend(bytes.iter().map(|&b| i32::from(b)));
    }

    pub fn push_code(&mut self, code: i32) {
        self.codes.push_back(code);
    }

    pub fn frames(&self) -> &[Canvas] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Canvas> {
        self.frames.last()
    }
}

impl Surface for ScriptedSurface {
    fn size(&mut self) -> io::Result<Size> {
        Ok(self.size)
    }

    fn present(&mut self, canvas: &Canvas) -> io::Result<()> {
        self.frames.push(canvas.clone());
        Ok(())
    }

    fn next_code(&mut self) -> io::Result<i32> {
        while self.codes.front() == Some(&PAUSE) {
            self.codes.pop_front();
        }
        Ok(self.codes.pop_front().unwrap_or(INTERRUPT))
    }

    fn next_code_within(&mut self, _wait: Duration) -> io::Result<Option<i32>> {
        if self.codes.front() == Some(&PAUSE) {
            self.codes.pop_front();
            return Ok(None);
        }
        Ok(self.codes.pop_front())
    }
}

/// Paint a canvas into an in-memory buffer and return plain text (no styles).
pub fn render_to_string(canvas: &Canvas) -> String {
    let size = canvas.size();
    let backend = TestBackend::new(size.width, size.height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| paint(canvas, frame.buffer_mut(), &Theme::default()))
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}
