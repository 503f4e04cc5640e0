use ratatui::style::{Color, Modifier, Style};

use super::surface::Tone;

/// Colours for the list screen
#[derive(Debug, Clone)]
pub struct Theme {
    pub text: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub cyan: Color,
    pub selection_fg: Color,
    pub selection_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            text: Color::White,
            dim: Color::DarkGray,
            red: Color::Red,
            yellow: Color::Yellow,
            green: Color::Green,
            cyan: Color::Cyan,
            selection_fg: Color::White,
            selection_bg: Color::Blue,
        }
    }
}

impl Theme {
    pub fn style(&self, tone: Tone) -> Style {
        let plain = Style::default();
        match tone {
            Tone::Todo | Tone::Input => plain.fg(self.text),
            Tone::Doing => plain.fg(self.yellow),
            Tone::Done => plain.fg(self.green),
            Tone::Important => plain.fg(self.red),
            Tone::NotImportant | Tone::Hint => plain.fg(self.dim),
            Tone::Heading | Tone::GroupHeader => {
                plain.fg(self.cyan).add_modifier(Modifier::BOLD)
            }
            Tone::Selected => plain.fg(self.selection_fg).bg(self.selection_bg),
            Tone::Title => plain.fg(self.text).add_modifier(Modifier::BOLD),
            Tone::Help => plain.fg(self.dim),
            Tone::Status => plain.fg(self.red),
            Tone::Prompt => plain.fg(self.cyan),
        }
    }
}
