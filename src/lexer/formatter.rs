use super::{
    token::{Token, TokenKind},
    LineBreaks,
};
use crate::lexer::Lexer;

/// Interface for creating new token formatters.
pub trait TokenFormatter {
    /// Formats a token into a string.
    fn format(&self, token: &Token) -> String;
}

pub trait ToFormatter<F>
where
    F: TokenFormatter,
{
    fn create_formatter(&self) -> F;
}

pub struct BasicFormatter {
    line_breaks: LineBreaks,
}

impl BasicFormatter {
    pub fn new(text: &str) -> Self {
        Self {
            line_breaks: LineBreaks::new(text),
        }
    }
}

impl<'src> ToFormatter<BasicFormatter> for Lexer<'src> {
    fn create_formatter(&self) -> BasicFormatter {
        BasicFormatter {
            line_breaks: self.get_line_breaks(),
        }
    }
}

impl TokenFormatter for BasicFormatter {
    fn format(&self, token: &Token) -> String {
        let line = self.line_breaks.get_line_from_span(token.span);
        match token.kind {
            TokenKind::Comma => format!("[line {line}] COMMA ,"),
            TokenKind::CloseParen => format!("[line {line}] CLOSE_PAREN )"),
            TokenKind::Quoted => {
                let lexeme = &token.text;
                let value = crate::value::unquote(lexeme);
                format!("[line {line}] QUOTED {lexeme} {value}")
            }
            kind => format!("[line {line}] {kind} {}", token.text),
        }
    }
}

pub struct DebugFormatter;

impl<'src> ToFormatter<DebugFormatter> for Lexer<'src> {
    fn create_formatter(&self) -> DebugFormatter {
        DebugFormatter {}
    }
}

impl TokenFormatter for DebugFormatter {
    fn format(&self, token: &Token) -> String {
        format!("{token:?}")
    }
}
