use crate::keyword::{Arity, Keyword};
use crate::lexer::Span;
use crate::value::ValueError;
use compact_str::CompactString;
use std::fmt::Display;
use thiserror::Error;

/// Which structural pairing was found broken while executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Imbalance {
    UnclosedParenthesis,
    UnmatchedParenthesis,
    MissingThen,
    MissingEndIf,
    MissingEnd(Keyword),
    Unexpected(Keyword),
}

impl Display for Imbalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Imbalance::UnclosedParenthesis => write!(f, "missing closing parenthesis"),
            Imbalance::UnmatchedParenthesis => write!(f, "closing parenthesis without a call"),
            Imbalance::MissingThen => write!(f, "condition without {}", Keyword::Then),
            Imbalance::MissingEndIf => write!(f, "branch without {}", Keyword::EndIf),
            Imbalance::MissingEnd(end) => write!(f, "loop without {end}"),
            Imbalance::Unexpected(keyword) => write!(f, "unexpected {keyword}"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    #[error("Value is not numeric: {0}")]
    NotNumeric(String),
    #[error("Value is not boolean: {0}")]
    NotBoolean(String),
    #[error("Token not found: {0}")]
    TokenNotFound(CompactString),
    #[error("Incorrect number of parameters: {token}{expected}) - Found: {found}")]
    ParamCountMismatch {
        token: CompactString,
        expected: Arity,
        found: usize,
    },
    #[error("Structural imbalance: {0}")]
    StructuralImbalance(Imbalance),
    #[error("Divide by zero")]
    DivideByZero,
    #[error("Unexpected character within list: {0}")]
    UnexpectedCharacter(char),
    #[error("Unexpected token: {0}")]
    UnexpectedToken(CompactString),
    #[error("Invalid list index: {0}")]
    InvalidIndex(i64),
    #[error("Script nesting deeper than {0} levels")]
    RecursionLimit(usize),
}

impl From<ValueError> for RuntimeErrorKind {
    fn from(value: ValueError) -> Self {
        match value {
            ValueError::NotNumeric(v) => RuntimeErrorKind::NotNumeric(v),
            ValueError::NotBoolean(v) => RuntimeErrorKind::NotBoolean(v),
            ValueError::UnexpectedCharacter(c) => RuntimeErrorKind::UnexpectedCharacter(c),
        }
    }
}

/// A failure raised while running a script. `span` points into the
/// innermost script, which is the first entry of `scripts`; the remaining
/// entries are the enclosing scripts, outermost last.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}{}", .scripts.iter().map(|s| format!("\n{s}")).collect::<String>())]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Option<Span>,
    pub scripts: Vec<String>,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, span: Span) -> Self {
        Self {
            kind,
            span: Some(span),
            scripts: Vec::new(),
        }
    }

    /// Records the script the error travelled through.
    pub fn in_script(mut self, script: &str) -> Self {
        self.scripts.push(script.to_string());
        self
    }

    /// Text of the script the span refers to.
    pub fn script_text(&self) -> Option<&str> {
        self.scripts.first().map(String::as_str)
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            RuntimeErrorKind::NotNumeric(_) => "RT001",
            RuntimeErrorKind::NotBoolean(_) => "RT002",
            RuntimeErrorKind::TokenNotFound(_) => "RT003",
            RuntimeErrorKind::ParamCountMismatch { .. } => "RT004",
            RuntimeErrorKind::StructuralImbalance(_) => "RT005",
            RuntimeErrorKind::DivideByZero => "RT006",
            RuntimeErrorKind::UnexpectedCharacter(_) => "RT007",
            RuntimeErrorKind::UnexpectedToken(_) => "RT008",
            RuntimeErrorKind::InvalidIndex(_) => "RT009",
            RuntimeErrorKind::RecursionLimit(_) => "RT010",
        }
    }
}

/// Attaches the span of the token being executed to a bare error kind.
pub(crate) trait AtSpan<T> {
    fn at(self, span: Span) -> Result<T, RuntimeError>;
}

impl<T, E> AtSpan<T> for Result<T, E>
where
    E: Into<RuntimeErrorKind>,
{
    fn at(self, span: Span) -> Result<T, RuntimeError> {
        self.map_err(|e| RuntimeError::new(e.into(), span))
    }
}
