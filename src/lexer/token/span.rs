use std::ops::Range;

/// Byte range of a token inside the script it was lexed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// The byte position of the start of the token.
    pub start: u32,
    /// The length of the token in bytes.
    pub length: u32,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self {
            start: start as u32,
            length: (end - start) as u32,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end()
    }

    pub fn end(&self) -> usize {
        (self.start + self.length) as usize
    }
}
