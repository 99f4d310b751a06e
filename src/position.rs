use std::fmt::{Display, Formatter};

/// The line and column (both 1-based) of a byte offset into a source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Create a new Position from a known line and column number.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Locate `offset` within `source`, which must be the buffer the offset was taken from.
    pub fn locate(source: &str, offset: usize) -> Self {
        let bytes = source.as_bytes();
        let line_breaks: Vec<usize> = bytes
            .iter()
            .enumerate()
            .filter_map(|(i, b)| if *b == b'\n' { Some(i) } else { None })
            .collect();

        let index = match line_breaks.binary_search(&offset) {
            Ok(i) | Err(i) => i,
        };

        if index == 0 {
            let s = std::str::from_utf8(&bytes[..offset.min(bytes.len())]).unwrap_or("");
            Position::new(1, s.chars().count() + 1)
        } else {
            let break_point = line_breaks[index - 1] + 1;
            let end = offset.max(break_point).min(bytes.len());
            let s = std::str::from_utf8(&bytes[break_point..end]).unwrap_or("");
            Position::new(index + 1, s.chars().count() + 1)
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
