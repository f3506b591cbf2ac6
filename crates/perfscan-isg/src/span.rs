//! Source location tracking

use serde::{Deserialize, Serialize};

/// A span representing a range in source code
///
/// Offsets are bytes into the original source; lines are 1-based and
/// inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of the start
    pub start: usize,
    /// Byte offset of the end (exclusive)
    pub end: usize,
    /// Line of the first byte
    pub start_line: u32,
    /// Line of the last byte
    pub end_line: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, start_line: u32, end_line: u32) -> Self {
        Self {
            start,
            end,
            start_line,
            end_line,
        }
    }

    pub fn dummy() -> Self {
        Self::new(0, 0, 1, 1)
    }

    /// Merge two spans into one that covers both
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            start_line: self.start_line.min(other.start_line),
            end_line: self.end_line.max(other.end_line),
        }
    }

    /// Whether `other` lies entirely within this span
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.end < self.start || self.end_line < self.start_line
    }

    /// Human-readable line range, e.g. `line 4` or `lines 4–9`
    pub fn lines(&self) -> String {
        if self.start_line == self.end_line {
            format!("line {}", self.start_line)
        } else {
            format!("lines {}–{}", self.start_line, self.end_line)
        }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::dummy()
    }
}
