use ratatui::buffer::Buffer;
use ratatui::layout::Size;

use crate::model::ViewMode;
use crate::util::unicode;

use super::surface::{Canvas, Tone};
use super::theme::Theme;
use super::view::{BODY_TOP, Projection};

pub const TITLE: &str = " Todo List ";
const LEFT_MARGIN: u16 = 2;

/// Key help for the bottom row
pub fn help_line(mode: ViewMode) -> String {
    format!(
        "[{}] i:add | #:heading | e:edit | d:delete | space/h:toggle | c:cycle | v:view | u:undo | J/K:move | q:quit",
        mode.label()
    )
}

/// Compose the list screen: title, list body, status and key help.
pub fn compose(
    size: Size,
    projection: &Projection,
    cursor: usize,
    mode: ViewMode,
    status: Option<&str>,
) -> Canvas {
    let mut canvas = Canvas::new(size);
    let title_width = u16::try_from(unicode::display_width(TITLE)).unwrap_or(u16::MAX);
    canvas.put(0, size.width.saturating_sub(title_width) / 2, TITLE, Tone::Title);

    for (offset, row) in projection.rows().iter().enumerate() {
        let Ok(offset) = u16::try_from(offset) else {
            break;
        };
        let tone = if row.display_index == Some(cursor) {
            Tone::Selected
        } else {
            row.tone
        };
        canvas.put(BODY_TOP.saturating_add(offset), LEFT_MARGIN, &row.text, tone);
    }

    if let Some(status) = status {
        canvas.put(size.height.saturating_sub(2), LEFT_MARGIN, status, Tone::Status);
    }
    canvas.put(
        size.height.saturating_sub(1),
        LEFT_MARGIN,
        &help_line(mode),
        Tone::Help,
    );
    canvas
}

/// Copy a canvas into a ratatui buffer. Placements outside the buffer are
/// skipped, which covers a canvas composed just before a resize.
pub fn paint(canvas: &Canvas, buf: &mut Buffer, theme: &Theme) {
    let area = buf.area;
    for p in canvas.placements() {
        let x = area.x.saturating_add(p.col);
        let y = area.y.saturating_add(p.row);
        if x >= area.right() || y >= area.bottom() {
            continue;
        }
        let room = usize::from(area.right() - x);
        buf.set_stringn(x, y, &p.text, room, theme.style(p.tone));
    }
}
