use crate::ast::Position;

/// Line view over a raw document.
///
/// Lines are split the way `str::lines` does it: a trailing newline ends the
/// last line instead of opening an empty one, and `""` has no lines at all.
#[derive(Debug, Clone)]
pub struct SourceText<'a> {
    text: &'a str,
    lines: Vec<&'a str>,
}

impl<'a> SourceText<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            lines: text.lines().collect(),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> Option<&'a str> {
        self.lines.get(index).copied()
    }

    pub fn lines(&self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        self.lines.iter().copied().enumerate()
    }

    /// The "not found" sentinel: one line past the last line, column 0.
    pub fn end_position(&self) -> Position {
        Position::new(to_u32(self.lines.len()), 0)
    }

    /// Position just past the last character of `index`.
    pub fn line_end(&self, index: usize) -> Position {
        let width = self.line(index).map_or(0, utf16_len);
        Position::new(to_u32(index), width)
    }

    /// Scalar text written from `position` to the end of its line, with the
    /// position where it starts. Leading blanks and a trailing ` #` comment
    /// are dropped.
    pub fn value_at(&self, position: Position) -> Option<(Position, &'a str)> {
        let line = self.line(position.line as usize)?;
        let rest = &line[byte_in_line(line, position.character)..];
        let value = rest.trim_start_matches([' ', '\t']);
        let start = position.translate(utf16_len(&rest[..rest.len() - value.len()]));
        let value = value.split(" #").next().unwrap_or_default().trim_end();
        Some((start, value))
    }
}

pub(crate) fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Width of `s` in UTF-16 code units.
pub fn utf16_len(s: &str) -> u32 {
    to_u32(s.encode_utf16().count())
}

/// Width of the leading whitespace of `line`.
pub fn indentation(line: &str) -> u32 {
    let trimmed = line.trim_start_matches([' ', '\t']);
    utf16_len(&line[..line.len() - trimmed.len()])
}

/// Blank lines and full-line comments take no part in indentation tracking.
pub fn is_ignorable(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// If `content` (already left-trimmed) starts with a list-item marker,
/// returns the item body and its byte offset within `content`.
pub fn list_item_body(content: &str) -> Option<(&str, usize)> {
    let rest = content.strip_prefix('-')?;
    if rest.is_empty() {
        return Some(("", content.len()));
    }
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let body = rest.trim_start_matches([' ', '\t']);
    Some((body, content.len() - body.len()))
}

/// Extracts the mapping key written at the start of `content`.
///
/// Returns the unquoted key and the byte index of its `:` separator. A colon
/// only separates a key when it is followed by whitespace or ends the line,
/// so `image: nginx:1.27` yields `image`.
pub fn line_key(content: &str) -> Option<(&str, usize)> {
    if let Some(quote) = content.chars().next().filter(|c| *c == '"' || *c == '\'') {
        let close = content[1..].find(quote)? + 1;
        let after = &content[close + 1..];
        let colon = close + 1 + after.len() - after.trim_start().len();
        return is_separator(content, colon).then(|| (&content[1..close], colon));
    }

    let colon = content
        .char_indices()
        .find(|(i, c)| *c == ':' && is_separator(content, *i))
        .map(|(i, _)| i)?;
    let key = content[..colon].trim_end();
    (!key.is_empty()).then_some((key, colon))
}

fn is_separator(content: &str, index: usize) -> bool {
    let mut rest = content[index..].chars();
    rest.next() == Some(':') && rest.next().map_or(true, char::is_whitespace)
}

/// Converts a line/UTF-16 position into a byte offset into `text`.
/// Positions past the end of a line clamp to that line's end; positions past
/// the last line clamp to the end of the text.
pub fn offset_at(text: &str, position: Position) -> usize {
    let mut line_start = 0;
    for (index, raw_line) in text.split_inclusive('\n').enumerate() {
        if index == position.line as usize {
            let line = raw_line.trim_end_matches(['\n', '\r']);
            return line_start + byte_in_line(line, position.character);
        }
        line_start += raw_line.len();
    }
    text.len()
}

/// Byte offset of the UTF-16 column `character` in `line`, clamped to its end.
fn byte_in_line(line: &str, character: u32) -> usize {
    let mut units = 0;
    for (byte, c) in line.char_indices() {
        if units >= character {
            return byte;
        }
        units += to_u32(c.len_utf16());
    }
    line.len()
}
