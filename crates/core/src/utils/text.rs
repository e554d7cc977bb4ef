//! Helpers for moving between editor-style positions and byte offsets.

/// Byte offset of a 1-based `line` and `column` inside `text`.
///
/// Columns count characters, not bytes. Positions past the end of a line clamp
/// to the end of that line; lines past the end of the text clamp to the end of
/// the text.
pub fn offset_at(text: &str, line: usize, column: usize) -> usize {
    let line = line.max(1);
    let mut line_start = 0;
    for _ in 1..line {
        match text[line_start..].find('\n') {
            Some(pos) => line_start += pos + 1,
            None => return text.len(),
        }
    }

    let line_end = text[line_start..]
        .find('\n')
        .map(|pos| line_start + pos)
        .unwrap_or(text.len());
    let line_text = &text[line_start..line_end];

    line_text
        .char_indices()
        .nth(column.saturating_sub(1))
        .map(|(idx, _)| line_start + idx)
        .unwrap_or(line_end)
}

/// Round `offset` down to a char boundary inside `text`.
pub fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
