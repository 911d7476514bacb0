mod span;

use compact_str::CompactString;
pub use span::Span;
use std::fmt::Display;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `@name(`, always lowercased.
    FunctionOpen,
    /// Bare keyword, bare `@name` or unquoted literal.
    Word,
    /// Quoted literal. The text keeps its quotes and escapes.
    Quoted,
    Comma,
    CloseParen,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::FunctionOpen => write!(f, "FUNCTION"),
            TokenKind::Word => write!(f, "WORD"),
            TokenKind::Quoted => write!(f, "QUOTED"),
            TokenKind::Comma => write!(f, "COMMA"),
            TokenKind::CloseParen => write!(f, "CLOSE_PAREN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: CompactString,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<CompactString>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// True for `@name(` and bare `@name` tokens.
    pub fn is_at_token(&self) -> bool {
        matches!(self.kind, TokenKind::FunctionOpen | TokenKind::Word) && self.text.starts_with('@')
    }

    /// True for tokens that carry a literal value rather than a call.
    pub fn is_literal(&self) -> bool {
        match self.kind {
            TokenKind::Quoted => true,
            TokenKind::Word => !self.text.starts_with('@'),
            _ => false,
        }
    }

    /// Any token ending in `(` opens a parenthesis group, including
    /// literal words such as `abc(`.
    pub fn opens_group(&self) -> bool {
        matches!(self.kind, TokenKind::FunctionOpen | TokenKind::Word) && self.text.ends_with('(')
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}
