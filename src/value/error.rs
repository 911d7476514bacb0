use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("Value is not numeric: {0}")]
    NotNumeric(String),
    #[error("Value is not boolean: {0}")]
    NotBoolean(String),
    #[error("Unexpected character within list: {0}")]
    UnexpectedCharacter(char),
}
