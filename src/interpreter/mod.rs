//! The DAGS execution engine.
//!
//! Scripts are interpreted straight from their token vector: a cursor walks
//! the tokens and each step consumes one command, writing whatever the
//! command produces into an output buffer. Calls nested as arguments are
//! evaluated first, into a scratch buffer that becomes the argument.

mod builtins;
mod command;
pub mod context;
mod control;
pub mod error;
pub mod formatter;
pub mod options;

use crate::store::{self, Store};
use crate::validator::{ValidationError, ValidationErrorKind, Validator};
use crate::{lexer, value};
pub use context::SystemContext;
use error::RuntimeError;
use error::RuntimeErrorKind;
use indexmap::IndexMap;
pub use options::Options;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::VecDeque;

pub struct Engine<S: Store> {
    store: S,
    in_channel: VecDeque<String>,
    out_channel: VecDeque<String>,
    options: Options,
    rng: StdRng,
    depth: usize,
}

impl Engine<IndexMap<String, String>> {
    /// Engine over a fresh, empty, order preserving store.
    pub fn in_memory() -> Self {
        Self::new(IndexMap::new())
    }
}

impl<S: Store> Engine<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, Options::default())
    }

    pub fn with_options(store: S, options: Options) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            store,
            in_channel: VecDeque::new(),
            out_channel: VecDeque::new(),
            options,
            rng,
            depth: 0,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Host to engine queue, drained by `@getinchannel`.
    pub fn in_channel_mut(&mut self) -> &mut VecDeque<String> {
        &mut self.in_channel
    }

    /// Engine to host queue, filled by `@setoutchannel`.
    pub fn out_channel_mut(&mut self) -> &mut VecDeque<String> {
        &mut self.out_channel
    }

    /// Runs one script, passing everything it writes to `context`. Output
    /// and store writes made before a failure are kept.
    pub fn run_script<C: SystemContext>(
        &mut self,
        script: &str,
        context: &mut C,
    ) -> Result<(), RuntimeError> {
        if value::is_null(script) {
            return Ok(());
        }
        tracing::debug!(length = script.len(), "running script");
        let mut buffer = String::new();
        let result = self.execute(script, &mut buffer);
        context.write(&buffer);
        if let Err(ref error) = result {
            tracing::debug!(code = error.code(), kind = %error.kind, "script failed");
        }
        result
    }

    /// Checks one script without running it. Problems are appended to
    /// `diagnostics`.
    pub fn validate_script(&self, script: &str, diagnostics: &mut Vec<ValidationError>) -> bool {
        if script.trim().is_empty() {
            return true;
        }
        let tokens = lexer::tokenize(script);
        match Validator::new(&self.store).validate(&tokens) {
            Ok(()) => true,
            Err(error) => {
                tracing::debug!(code = error.code(), kind = %error.kind, "validation failed");
                diagnostics.push(error.in_script(script));
                false
            }
        }
    }

    /// Validates every stored value that looks like a script, and reports
    /// blank keys.
    pub fn validate_dictionary(&self, diagnostics: &mut Vec<ValidationError>) -> bool {
        let mut ok = true;
        for key in self.store.keys() {
            if key.trim().is_empty() {
                diagnostics.push(ValidationError::new(ValidationErrorKind::EmptyKey));
                ok = false;
                continue;
            }
            let script = store::get(&self.store, &key);
            if value::is_script(&script) {
                let before = diagnostics.len();
                if !self.validate_script(&script, diagnostics) {
                    for diagnostic in &mut diagnostics[before..] {
                        diagnostic.key = Some(key.clone());
                    }
                    ok = false;
                }
            }
        }
        ok
    }

    /// Runs a nested script in the current engine state, writing into `out`.
    fn execute(&mut self, script: &str, out: &mut String) -> Result<(), RuntimeError> {
        if let Some(max_depth) = self.options.max_depth {
            if self.depth > max_depth {
                return Err(RuntimeError {
                    kind: RuntimeErrorKind::RecursionLimit(max_depth),
                    span: None,
                    scripts: vec![script.to_string()],
                });
            }
        }
        self.depth += 1;
        tracing::trace!(depth = self.depth, script, "entering script");
        let tokens = lexer::tokenize(script);
        let result = self.execute_tokens(&tokens, out);
        self.depth -= 1;
        result.map_err(|error| error.in_script(script))
    }

    fn execute_tokens(&mut self, tokens: &[lexer::Token], out: &mut String) -> Result<(), RuntimeError> {
        let mut index = 0;
        while index < tokens.len() {
            self.run_command(tokens, &mut index, out)?;
        }
        Ok(())
    }
}
