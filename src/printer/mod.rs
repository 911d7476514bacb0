//! Re-lays a script out one statement per line, indenting the bodies of
//! branches and loops with tabs.

mod error;

pub use error::PrettyPrintError;

use crate::keyword::Keyword;
use crate::lexer::{self, Token, TokenKind};

#[derive(Debug)]
struct Layout {
    result: String,
    indent: i64,
    parens: i64,
    if_line: bool,
    loop_header: bool,
}

impl Layout {
    fn new(capacity: usize) -> Self {
        Self {
            result: String::with_capacity(capacity),
            indent: 1,
            parens: 0,
            if_line: false,
            loop_header: false,
        }
    }

    fn push(&mut self, token: &Token) {
        let keyword = Keyword::from_token(token);
        if matches!(
            keyword,
            Some(
                Keyword::ElseIf
                    | Keyword::Else
                    | Keyword::EndIf
                    | Keyword::EndFor
                    | Keyword::EndForEachKey
                    | Keyword::EndForEachList
            )
        ) {
            self.indent -= 1;
        }

        if self.parens == 0 {
            if self.if_line {
                self.result.push(' ');
            } else {
                if !self.result.is_empty() {
                    self.result.push('\n');
                }
                for _ in 1..self.indent {
                    self.result.push('\t');
                }
            }
        }
        self.result.push_str(&token.text);

        match keyword {
            Some(Keyword::If | Keyword::ElseIf) => self.if_line = true,
            Some(Keyword::Else) => self.indent += 1,
            Some(Keyword::Then) => {
                self.indent += 1;
                self.if_line = false;
            }
            Some(Keyword::For | Keyword::ForEachKey | Keyword::ForEachList) => {
                self.loop_header = true
            }
            _ => {}
        }

        if token.opens_group() {
            self.parens += 1;
        } else if token.kind == TokenKind::CloseParen {
            self.parens -= 1;
            if self.loop_header && self.parens == 0 {
                self.loop_header = false;
                self.indent += 1;
            }
        }
    }

    fn finish(self) -> Result<String, PrettyPrintError> {
        if self.indent != 1 {
            return Err(PrettyPrintError::UnbalancedIndent(self.indent));
        }
        if self.parens != 0 {
            return Err(PrettyPrintError::UnbalancedParens(self.parens));
        }
        Ok(self.result)
    }
}

/// Formats a script. Text that is not a script is returned unchanged.
pub fn pretty_print(script: &str) -> Result<String, PrettyPrintError> {
    if !script.trim_start().starts_with('@') {
        return Ok(script.to_string());
    }
    let mut layout = Layout::new(script.len());
    for token in lexer::tokenize(script) {
        layout.push(&token);
    }
    layout.finish()
}
