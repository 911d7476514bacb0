use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrettyPrintError {
    #[error("Indent should be 1 at end of script: {0}")]
    UnbalancedIndent(i64),
    #[error("Parenthesis should be 0 at end of script: {0}")]
    UnbalancedParens(i64),
}

impl PrettyPrintError {
    pub fn code(&self) -> &'static str {
        match self {
            PrettyPrintError::UnbalancedIndent(_) => "PP001",
            PrettyPrintError::UnbalancedParens(_) => "PP002",
        }
    }
}
