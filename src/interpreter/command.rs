use super::error::{AtSpan, Imbalance, RuntimeError, RuntimeErrorKind};
use super::Engine;
use crate::keyword::{Arity, Keyword};
use crate::lexer::{Token, TokenKind};
use crate::store::{self, Store};
use crate::value;

impl<S: Store> Engine<S> {
    /// Executes the command starting at `index` and moves `index` past it.
    pub(super) fn run_command(
        &mut self,
        tokens: &[Token],
        index: &mut usize,
        out: &mut String,
    ) -> Result<(), RuntimeError> {
        let token = &tokens[*index];
        match token.kind {
            TokenKind::Comma => Err(RuntimeError::new(
                RuntimeErrorKind::UnexpectedToken(token.text.clone()),
                token.span,
            )),
            TokenKind::CloseParen => Err(RuntimeError::new(
                RuntimeErrorKind::StructuralImbalance(Imbalance::UnmatchedParenthesis),
                token.span,
            )),
            _ if token.is_literal() => {
                out.push_str(&literal_value(token));
                *index += 1;
                Ok(())
            }
            _ => match Keyword::from_token(token) {
                Some(keyword) if keyword.is_structural() || keyword.loop_end().is_some() => {
                    self.run_control(keyword, tokens, index, out)
                }
                Some(keyword) => {
                    let arguments = self.call_arguments(tokens, index)?;
                    check_arity(token, keyword.arity(), arguments.len())?;
                    tracing::trace!(keyword = keyword.name(), ?arguments, "dispatch");
                    self.call_keyword(keyword, token, arguments, out)
                }
                None => self.call_macro(tokens, index, out),
            },
        }
    }

    /// Evaluates the arguments of the call at `index`, eagerly and left to
    /// right, and moves `index` past the closing parenthesis. Bare tokens
    /// have no arguments.
    pub(super) fn call_arguments(
        &mut self,
        tokens: &[Token],
        index: &mut usize,
    ) -> Result<Vec<String>, RuntimeError> {
        let open = &tokens[*index];
        *index += 1;
        if open.kind != TokenKind::FunctionOpen {
            return Ok(Vec::new());
        }

        let mut arguments = Vec::new();
        let mut current = String::new();
        let mut seen = false;
        loop {
            let Some(token) = tokens.get(*index) else {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::StructuralImbalance(Imbalance::UnclosedParenthesis),
                    open.span,
                ));
            };
            match token.kind {
                TokenKind::Comma => {
                    arguments.push(std::mem::take(&mut current));
                    *index += 1;
                }
                TokenKind::CloseParen => {
                    if seen {
                        arguments.push(current);
                    }
                    *index += 1;
                    return Ok(arguments);
                }
                _ if token.is_literal() => {
                    current.push_str(&literal_value(token));
                    *index += 1;
                }
                _ => {
                    if let Some(keyword) = Keyword::from_token(token) {
                        if keyword.is_structural() || keyword.loop_end().is_some() {
                            return Err(RuntimeError::new(
                                RuntimeErrorKind::UnexpectedToken(token.text.clone()),
                                token.span,
                            ));
                        }
                    }
                    self.run_command(tokens, index, &mut current)?;
                }
            }
            seen = true;
        }
    }

    fn call_keyword(
        &mut self,
        keyword: Keyword,
        token: &Token,
        arguments: Vec<String>,
        out: &mut String,
    ) -> Result<(), RuntimeError> {
        let span = token.span;
        let args = arguments.as_slice();
        match keyword {
            Keyword::Set => store::set(&mut self.store, &args[0], &args[1]),
            Keyword::Swap => {
                let first = store::get(&self.store, &args[0]);
                let second = store::get(&self.store, &args[1]);
                store::set(&mut self.store, &args[0], &second);
                store::set(&mut self.store, &args[1], &first);
            }
            Keyword::AddTo
            | Keyword::SubTo
            | Keyword::MulTo
            | Keyword::DivTo
            | Keyword::ModTo => {
                let current = store::get_int(&self.store, &args[0]).at(span)?;
                let operand = value::to_int(&args[1]).at(span)?;
                let result = super::builtins::arithmetic(keyword, current, operand).at(span)?;
                store::set(&mut self.store, &args[0], &result.to_string());
            }
            Keyword::Comment => {}
            Keyword::Script => {
                let script = store::get(&self.store, &args[0]);
                self.execute(&script, out)?;
            }
            Keyword::Exec => self.execute(&args[0], out)?,
            Keyword::Write => args.iter().for_each(|arg| out.push_str(arg)),
            Keyword::Msg => {
                out.push_str(&store::get(&self.store, &args[0]));
                out.push_str(value::NEWLINE_ESCAPE);
            }
            Keyword::Nl => out.push_str(value::NEWLINE_ESCAPE),
            Keyword::Get => out.push_str(&store::get(&self.store, &args[0])),
            Keyword::GetValue => {
                let stored = store::get(&self.store, &args[0]);
                if value::is_script(&stored) {
                    self.execute(&stored, out)?;
                } else {
                    out.push_str(&stored);
                }
            }
            Keyword::TrueData
            | Keyword::FalseData
            | Keyword::IsNullData
            | Keyword::IsScriptData
            | Keyword::IsBoolData => {
                let stored = store::get(&self.store, &args[0]);
                let result = super::builtins::predicate(keyword, &stored);
                out.push_str(value::bool_to_string(result));
            }
            Keyword::Rnd => {
                let limit = value::to_int(&args[0]).at(span)?;
                out.push_str(&super::builtins::random_below(&mut self.rng, limit).to_string());
            }
            Keyword::Rand => {
                let percent = value::to_int(&args[0]).at(span)?;
                let hit = super::builtins::random_percent(&mut self.rng, percent);
                out.push_str(value::bool_to_string(hit));
            }
            Keyword::GetInChannel => {
                out.push_str(&self.in_channel.pop_front().unwrap_or_default());
            }
            Keyword::SetOutChannel => self.out_channel.push_back(args[0].clone()),
            Keyword::AddList
            | Keyword::ClearList
            | Keyword::GetList
            | Keyword::SetList
            | Keyword::InsertAtList
            | Keyword::RemoveAtList
            | Keyword::ListLength => self.list_command(keyword, args, out).at(span)?,
            Keyword::GetArray | Keyword::SetArray | Keyword::ClearArray => {
                self.array_command(keyword, args, out).at(span)?
            }
            _ => out.push_str(&super::builtins::function(keyword, args).at(span)?),
        }
        Ok(())
    }

    /// Runs a stored script invoked by name. `@name(` picks the first key
    /// starting with that text and binds the parameters the key declares,
    /// e.g. key `@boo(x)` substitutes `$x`. A bare `@name` runs the value of
    /// that exact key.
    fn call_macro(
        &mut self,
        tokens: &[Token],
        index: &mut usize,
        out: &mut String,
    ) -> Result<(), RuntimeError> {
        let token = &tokens[*index];
        let not_found = || {
            RuntimeError::new(
                RuntimeErrorKind::TokenNotFound(token.text.clone()),
                token.span,
            )
        };

        if token.kind != TokenKind::FunctionOpen {
            let script = store::get(&self.store, &token.text);
            if script.is_empty() {
                return Err(not_found());
            }
            tracing::trace!(name = %token.text, "bare macro");
            *index += 1;
            return self.execute(&script, out);
        }

        let (key, mut script) = store::get_by_prefix(&self.store, &token.text)
            .into_iter()
            .next()
            .ok_or_else(not_found)?;
        let parameters = declared_parameters(&key, token.text.len());
        let arguments = self.call_arguments(tokens, index)?;
        check_arity(token, Arity::exact(parameters.len()), arguments.len())?;
        tracing::trace!(%key, ?arguments, "macro call");
        for (parameter, argument) in parameters.iter().zip(&arguments) {
            script = script.replace(&format!("${parameter}"), argument);
        }
        self.execute(&script, out)
    }
}

pub(super) fn literal_value(token: &Token) -> String {
    match token.kind {
        TokenKind::Quoted => value::unquote(&token.text),
        _ => token.text.to_string(),
    }
}

pub(super) fn check_arity(token: &Token, arity: Arity, found: usize) -> Result<(), RuntimeError> {
    if arity.accepts(found) {
        return Ok(());
    }
    Err(RuntimeError::new(
        RuntimeErrorKind::ParamCountMismatch {
            token: token.text.clone(),
            expected: arity,
            found,
        },
        token.span,
    ))
}

/// Parameter names written in a macro key after its `@name(` prefix.
fn declared_parameters(key: &str, prefix_len: usize) -> Vec<&str> {
    let list = key.get(prefix_len..).unwrap_or_default();
    let list = list.trim_end().strip_suffix(')').unwrap_or(list);
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}
