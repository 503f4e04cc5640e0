use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells
pub fn display_width(s: &str) -> usize {
    s.graphemes(true).map(grapheme_width).sum()
}

/// Cut a string down to at most `max_cells` terminal cells. Wide graphemes
/// that would straddle the edge are dropped whole.
pub fn truncate_to_width(s: &str, max_cells: usize) -> &str {
    let mut width = 0;
    for (i, g) in s.grapheme_indices(true) {
        let gw = grapheme_width(g);
        if width + gw > max_cells {
            return &s[..i];
        }
        width += gw;
    }
    s
}

/// Next grapheme boundary after `byte_offset`. Returns None if at end.
pub fn next_grapheme_boundary(s: &str, byte_offset: usize) -> Option<usize> {
    if byte_offset >= s.len() {
        return None;
    }
    match s[byte_offset..].grapheme_indices(true).nth(1) {
        Some((i, _)) => Some(byte_offset + i),
        None => Some(s.len()),
    }
}

/// Previous grapheme boundary before `byte_offset`. Returns None if at start.
pub fn prev_grapheme_boundary(s: &str, byte_offset: usize) -> Option<usize> {
    if byte_offset == 0 {
        return None;
    }
    s[..byte_offset]
        .grapheme_indices(true)
        .next_back()
        .map(|(i, _)| i)
}

/// Convert byte offset to display column (terminal cells).
pub fn byte_offset_to_display_col(s: &str, byte_offset: usize) -> usize {
    display_width(&s[..byte_offset.min(s.len())])
}

/// Convert display column to byte offset, snapping to grapheme boundary.
/// A column inside a wide grapheme resolves to the grapheme after it, so the
/// result never shows half a character at the left edge.
pub fn display_col_to_byte_offset(s: &str, target_col: usize) -> usize {
    let mut col = 0;
    for (i, g) in s.grapheme_indices(true) {
        if col >= target_col {
            return i;
        }
        col += grapheme_width(g);
    }
    s.len()
}

/// Start of the word left of `byte_offset`: skip whitespace, then skip
/// non-whitespace.
pub fn word_boundary_left(s: &str, byte_offset: usize) -> usize {
    let graphemes: Vec<(usize, &str)> = s[..byte_offset].grapheme_indices(true).collect();
    let mut idx = graphemes.len();
    while idx > 0 && is_blank(graphemes[idx - 1].1) {
        idx -= 1;
    }
    while idx > 0 && !is_blank(graphemes[idx - 1].1) {
        idx -= 1;
    }
    graphemes.get(idx).map_or(0, |&(i, _)| i)
}

/// End of the word right of `byte_offset`: skip whitespace, then skip
/// non-whitespace.
pub fn word_boundary_right(s: &str, byte_offset: usize) -> usize {
    let mut graphemes = s[byte_offset..].grapheme_indices(true).peekable();
    while graphemes.next_if(|&(_, g)| is_blank(g)).is_some() {}
    while graphemes.next_if(|&(_, g)| !is_blank(g)).is_some() {}
    graphemes
        .peek()
        .map_or(s.len(), |&(i, _)| byte_offset + i)
}

fn is_blank(g: &str) -> bool {
    g.chars().all(char::is_whitespace)
}

fn grapheme_width(g: &str) -> usize {
    UnicodeWidthStr::width(g)
}
