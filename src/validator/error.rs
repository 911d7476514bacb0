use crate::keyword::Keyword;
use crate::lexer::Span;
use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    #[error("Token not found: {0}")]
    TokenNotFound(CompactString),
    #[error("{keyword} at {index} is invalid.")]
    InvalidTransition { keyword: Keyword, index: usize },
    #[error("Mismatched parenthesis")]
    MismatchedParentheses,
    #[error("Mismatched {}/{} counts", Keyword::If, Keyword::EndIf)]
    MismatchedIf,
    #[error("Mismatched {}/{} vs {} counts", Keyword::If, Keyword::ElseIf, Keyword::Then)]
    MismatchedThen,
    #[error("Mismatched @{}/@{}", .0.name(), .0.loop_end().map_or("", Keyword::name))]
    MismatchedLoop(Keyword),
    #[error("Empty or whitespace key found")]
    EmptyKey,
}

/// A problem found without running the script. `span` points into `script`
/// when the problem belongs to one token; `key` names the store entry the
/// script came from when a whole dictionary is checked.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub span: Option<Span>,
    pub script: Option<String>,
    pub key: Option<String>,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind) -> Self {
        Self {
            kind,
            span: None,
            script: None,
            key: None,
        }
    }

    pub fn at(kind: ValidationErrorKind, span: Span) -> Self {
        Self {
            span: Some(span),
            ..Self::new(kind)
        }
    }

    pub fn in_script(mut self, script: &str) -> Self {
        self.script = Some(script.to_string());
        self
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            ValidationErrorKind::TokenNotFound(_) => "VA001",
            ValidationErrorKind::InvalidTransition { .. } => "VA002",
            ValidationErrorKind::MismatchedParentheses => "VA003",
            ValidationErrorKind::MismatchedIf => "VA004",
            ValidationErrorKind::MismatchedThen => "VA005",
            ValidationErrorKind::MismatchedLoop(_) => "VA006",
            ValidationErrorKind::EmptyKey => "VA007",
        }
    }
}
