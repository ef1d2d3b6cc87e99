//! Offset to line mapping.

use crate::error::MalformedRangeError;

/// Line-number lookup supplied by the host editor.
///
/// Lines are 0-based. Offsets past the end of the text are malformed; the
/// end-of-text offset itself belongs to the last line.
pub trait LineNumbers {
    fn line_number(&self, offset: usize) -> Result<usize, MalformedRangeError>;
}

/// Line starts of a text, computed once
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset where each line starts
    line_offsets: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut line_offsets = vec![0];
        line_offsets.extend(
            content
                .bytes()
                .enumerate()
                .filter(|&(_, byte)| byte == b'\n')
                .map(|(idx, _)| idx + 1),
        );
        Self {
            line_offsets,
            len: content.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_offsets.len()
    }

    /// Byte offset where `line` starts
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_offsets.get(line).copied()
    }
}

impl LineNumbers for LineIndex {
    fn line_number(&self, offset: usize) -> Result<usize, MalformedRangeError> {
        if offset > self.len {
            return Err(MalformedRangeError { offset, len: self.len });
        }
        Ok(match self.line_offsets.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line - 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_numbers() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_number(0), Ok(0));
        assert_eq!(index.line_number(2), Ok(0));
        assert_eq!(index.line_number(3), Ok(1));
        assert_eq!(index.line_number(6), Ok(2));
        assert_eq!(index.line_number(7), Ok(3));
        assert_eq!(index.line_number(9), Ok(3));
        assert_eq!(index.line_start(2), Some(6));
    }

    #[test]
    fn test_out_of_bounds() {
        let index = LineIndex::new("abc");
        assert_eq!(
            index.line_number(4),
            Err(MalformedRangeError { offset: 4, len: 3 })
        );
    }
}
