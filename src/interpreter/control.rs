//! IF chains and loops. Both work on the token vector directly: branches
//! that are not taken are skipped by counting nesting, never evaluated.

use super::command::{check_arity, literal_value};
use super::error::{AtSpan, Imbalance, RuntimeError, RuntimeErrorKind};
use super::Engine;
use crate::keyword::Keyword;
use crate::lexer::{Span, Token, TokenKind};
use crate::store::{self, list, Store};
use crate::value;

/// Where skipping an untaken branch stopped.
enum BranchEnd {
    ElseIf(usize),
    Else(usize),
    EndIf(usize),
}

impl<S: Store> Engine<S> {
    pub(super) fn run_control(
        &mut self,
        keyword: Keyword,
        tokens: &[Token],
        index: &mut usize,
        out: &mut String,
    ) -> Result<(), RuntimeError> {
        let span = tokens[*index].span;
        match keyword {
            Keyword::If => self.run_if(tokens, index),
            // Reached only at the end of a taken branch.
            Keyword::ElseIf | Keyword::Else => {
                let end = skip_to_endif(tokens, *index + 1).ok_or_else(|| {
                    RuntimeError::new(
                        RuntimeErrorKind::StructuralImbalance(Imbalance::MissingEndIf),
                        span,
                    )
                })?;
                *index = end + 1;
                Ok(())
            }
            Keyword::EndIf => {
                *index += 1;
                Ok(())
            }
            Keyword::For | Keyword::ForEachKey | Keyword::ForEachList => {
                self.run_loop(keyword, tokens, index, out)
            }
            _ => Err(RuntimeError::new(
                RuntimeErrorKind::StructuralImbalance(Imbalance::Unexpected(keyword)),
                span,
            )),
        }
    }

    fn run_if(&mut self, tokens: &[Token], index: &mut usize) -> Result<(), RuntimeError> {
        let if_span = tokens[*index].span;
        *index += 1;
        loop {
            if self.evaluate_condition(tokens, index, if_span)? {
                return Ok(());
            }
            match skip_branch(tokens, *index) {
                Some(BranchEnd::ElseIf(position)) => *index = position + 1,
                Some(BranchEnd::Else(position) | BranchEnd::EndIf(position)) => {
                    *index = position + 1;
                    return Ok(());
                }
                None => {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::StructuralImbalance(Imbalance::MissingEndIf),
                        if_span,
                    ))
                }
            }
        }
    }

    /// Evaluates the condition up to and including THEN. Atoms combine left
    /// to right with no precedence and every atom is evaluated.
    fn evaluate_condition(
        &mut self,
        tokens: &[Token],
        index: &mut usize,
        if_span: Span,
    ) -> Result<bool, RuntimeError> {
        let mut result: Option<bool> = None;
        let mut connector: Option<Keyword> = None;
        let mut negate = false;
        loop {
            let Some(token) = tokens.get(*index) else {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::StructuralImbalance(Imbalance::MissingThen),
                    if_span,
                ));
            };
            let unexpected =
                || RuntimeError::new(RuntimeErrorKind::UnexpectedToken(token.text.clone()), token.span);
            let keyword = Keyword::from_token(token);
            match keyword {
                Some(Keyword::Then) => {
                    if connector.is_some() || negate {
                        return Err(unexpected());
                    }
                    *index += 1;
                    return Ok(result.unwrap_or(false));
                }
                Some(Keyword::And | Keyword::Or) => {
                    if result.is_none() || connector.is_some() || negate {
                        return Err(unexpected());
                    }
                    connector = keyword;
                    *index += 1;
                    continue;
                }
                Some(Keyword::Not) => {
                    negate = !negate;
                    *index += 1;
                    continue;
                }
                Some(other) if other.is_structural() || other.loop_end().is_some() => {
                    return Err(unexpected());
                }
                _ => {}
            }
            if result.is_some() && connector.is_none() {
                return Err(unexpected());
            }
            if matches!(token.kind, TokenKind::Comma | TokenKind::CloseParen) {
                return Err(unexpected());
            }

            let mut atom = String::new();
            if token.is_literal() {
                atom = literal_value(token);
                *index += 1;
            } else {
                self.run_command(tokens, index, &mut atom)?;
            }
            let atom = value::to_bool(&atom).at(token.span)? != negate;
            result = Some(match (result, connector) {
                (Some(previous), Some(Keyword::And)) => previous && atom,
                (Some(previous), Some(_)) => previous || atom,
                _ => atom,
            });
            connector = None;
            negate = false;
        }
    }

    fn run_loop(
        &mut self,
        keyword: Keyword,
        tokens: &[Token],
        index: &mut usize,
        out: &mut String,
    ) -> Result<(), RuntimeError> {
        let header = &tokens[*index];
        let span = header.span;
        let arguments = self.call_arguments(tokens, index)?;
        check_arity(header, keyword.arity(), arguments.len())?;

        let body_start = *index;
        let body_end = find_loop_end(keyword, tokens, body_start).ok_or_else(|| {
            let end = keyword.loop_end().unwrap_or(keyword);
            RuntimeError::new(
                RuntimeErrorKind::StructuralImbalance(Imbalance::MissingEnd(end)),
                span,
            )
        })?;
        *index = body_end + 1;
        let body = &tokens[body_start..body_end];

        if keyword == Keyword::For {
            let start = value::to_int(&arguments[1]).at(span)?;
            let end = value::to_int(&arguments[2]).at(span)?;
            tracing::trace!(start, end, "for loop");
            for current in start..=end {
                self.run_iteration(&arguments[0], &current.to_string(), body, out)?;
            }
            return Ok(());
        }

        let values: Vec<String> = match keyword {
            Keyword::ForEachKey => {
                let prefix = &arguments[1];
                let suffix = arguments.get(2).map_or("", String::as_str);
                store::get_by_prefix(&self.store, prefix)
                    .into_iter()
                    .filter_map(|(key, _)| loop_key(&key, prefix.len(), suffix))
                    .collect()
            }
            Keyword::ForEachList => {
                list::expand_list(&store::get(&self.store, &arguments[1])).at(span)?
            }
            other => unreachable!("{other} is not a loop"),
        };
        tracing::trace!(keyword = keyword.name(), count = values.len(), "loop");
        for item in &values {
            self.run_iteration(&arguments[0], item, body, out)?;
        }
        Ok(())
    }

    fn run_iteration(
        &mut self,
        variable: &str,
        value: &str,
        body: &[Token],
        out: &mut String,
    ) -> Result<(), RuntimeError> {
        let body = substitute(body, &format!("${variable}"), value);
        self.execute_tokens(&body, out)
    }
}

/// Skips an untaken branch starting at `start`, stopping at the ELSEIF, ELSE
/// or ENDIF that belongs to the current IF.
fn skip_branch(tokens: &[Token], start: usize) -> Option<BranchEnd> {
    let mut depth = 0usize;
    for (position, token) in tokens.iter().enumerate().skip(start) {
        match Keyword::from_token(token) {
            Some(Keyword::If) => depth += 1,
            Some(Keyword::EndIf) if depth == 0 => return Some(BranchEnd::EndIf(position)),
            Some(Keyword::EndIf) => depth -= 1,
            Some(Keyword::ElseIf) if depth == 0 => return Some(BranchEnd::ElseIf(position)),
            Some(Keyword::Else) if depth == 0 => return Some(BranchEnd::Else(position)),
            _ => {}
        }
    }
    None
}

/// Position of the ENDIF closing the current IF.
fn skip_to_endif(tokens: &[Token], start: usize) -> Option<usize> {
    let mut position = start;
    loop {
        match skip_branch(tokens, position)? {
            BranchEnd::EndIf(end) => return Some(end),
            BranchEnd::ElseIf(next) | BranchEnd::Else(next) => position = next + 1,
        }
    }
}

/// Position of the end keyword matching the loop header, counting nested
/// loops of the same family.
fn find_loop_end(keyword: Keyword, tokens: &[Token], start: usize) -> Option<usize> {
    let end = keyword.loop_end()?;
    let mut depth = 0usize;
    for (position, token) in tokens.iter().enumerate().skip(start) {
        match Keyword::from_token(token) {
            Some(found) if found == keyword => depth += 1,
            Some(found) if found == end && depth == 0 => return Some(position),
            Some(found) if found == end => depth -= 1,
            _ => {}
        }
    }
    None
}

/// The loop value for a FOREACHKEY key: the key with prefix and suffix cut.
fn loop_key(key: &str, prefix_len: usize, suffix: &str) -> Option<String> {
    let rest = key.get(prefix_len..)?;
    let rest = if suffix.is_empty() {
        rest
    } else {
        rest.strip_suffix(suffix)?
    };
    Some(rest.to_string())
}

/// Copies the body with every `placeholder` replaced by `value`.
fn substitute(body: &[Token], placeholder: &str, value: &str) -> Vec<Token> {
    body.iter()
        .map(|token| match token.kind {
            TokenKind::FunctionOpen | TokenKind::Word | TokenKind::Quoted
                if token.text.contains(placeholder) =>
            {
                Token::new(
                    token.kind,
                    token.text.replace(placeholder, value),
                    token.span,
                )
            }
            _ => token.clone(),
        })
        .collect()
}
