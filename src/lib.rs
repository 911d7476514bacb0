pub mod help;
pub mod interpreter;
pub mod keyword;
pub mod lexer;
pub mod printer;
pub mod store;
pub mod validator;
pub mod value;

pub use help::help;
pub use interpreter::{Engine, Options};
pub use printer::pretty_print;
