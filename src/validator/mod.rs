//! Static checks over a token sequence. Nothing is executed and the store is
//! only read, to confirm that called macros exist.

mod error;
pub mod formatter;

pub use error::{ValidationError, ValidationErrorKind};

use crate::keyword::Keyword;
use crate::lexer::{Token, TokenKind};
use crate::store::{self, Store};

/// Counters collected while scanning. Loop levels are signed since an END
/// before its header only shows up in the final balance.
#[derive(Debug)]
struct ScanState {
    paren_level: i64,
    if_last: Keyword,
    if_count: usize,
    elseif_count: usize,
    then_count: usize,
    endif_count: usize,
    for_level: i64,
    foreachkey_level: i64,
    foreachlist_level: i64,
}

impl Default for ScanState {
    fn default() -> Self {
        Self {
            paren_level: 0,
            if_last: Keyword::EndIf,
            if_count: 0,
            elseif_count: 0,
            then_count: 0,
            endif_count: 0,
            for_level: 0,
            foreachkey_level: 0,
            foreachlist_level: 0,
        }
    }
}

impl ScanState {
    /// Legal states to come from when entering `keyword`.
    fn allowed_predecessors(keyword: Keyword) -> &'static [Keyword] {
        match keyword {
            Keyword::If | Keyword::EndIf => &[Keyword::Then, Keyword::Else, Keyword::EndIf],
            Keyword::Then => &[Keyword::If, Keyword::ElseIf],
            Keyword::ElseIf | Keyword::Else => &[Keyword::Then, Keyword::EndIf],
            _ => &[],
        }
    }

    fn transition(&mut self, keyword: Keyword, index: usize) -> Result<(), ValidationErrorKind> {
        if !Self::allowed_predecessors(keyword).contains(&self.if_last) {
            return Err(ValidationErrorKind::InvalidTransition { keyword, index });
        }
        match keyword {
            Keyword::If => self.if_count += 1,
            Keyword::Then => self.then_count += 1,
            Keyword::ElseIf => self.elseif_count += 1,
            Keyword::EndIf => self.endif_count += 1,
            _ => {}
        }
        self.if_last = keyword;
        Ok(())
    }

    fn count_keyword(&mut self, keyword: Keyword, index: usize) -> Result<(), ValidationErrorKind> {
        match keyword {
            Keyword::If | Keyword::Then | Keyword::ElseIf | Keyword::Else | Keyword::EndIf => {
                self.transition(keyword, index)?
            }
            Keyword::For => self.for_level += 1,
            Keyword::EndFor => self.for_level -= 1,
            Keyword::ForEachKey => self.foreachkey_level += 1,
            Keyword::EndForEachKey => self.foreachkey_level -= 1,
            Keyword::ForEachList => self.foreachlist_level += 1,
            Keyword::EndForEachList => self.foreachlist_level -= 1,
            _ => {}
        }
        Ok(())
    }

    fn finish(&self) -> Result<(), ValidationErrorKind> {
        if self.paren_level != 0 {
            Err(ValidationErrorKind::MismatchedParentheses)
        } else if self.if_count != self.endif_count {
            Err(ValidationErrorKind::MismatchedIf)
        } else if self.if_count + self.elseif_count != self.then_count {
            Err(ValidationErrorKind::MismatchedThen)
        } else if self.for_level != 0 {
            Err(ValidationErrorKind::MismatchedLoop(Keyword::For))
        } else if self.foreachkey_level != 0 {
            Err(ValidationErrorKind::MismatchedLoop(Keyword::ForEachKey))
        } else if self.foreachlist_level != 0 {
            Err(ValidationErrorKind::MismatchedLoop(Keyword::ForEachList))
        } else {
            Ok(())
        }
    }
}

pub struct Validator<'a, S: Store + ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> Validator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Scans `tokens` once. A call to an unknown macro stops the scan at
    /// once; the balance checks run after the last token.
    pub fn validate(&self, tokens: &[Token]) -> Result<(), ValidationError> {
        let mut state = ScanState::default();
        for (index, token) in tokens.iter().enumerate() {
            match token.kind {
                TokenKind::FunctionOpen => state.paren_level += 1,
                TokenKind::CloseParen => state.paren_level -= 1,
                _ => {}
            }
            if let Some(keyword) = Keyword::from_token(token) {
                state
                    .count_keyword(keyword, index)
                    .map_err(|kind| ValidationError::at(kind, token.span))?;
            } else if token.is_at_token() && !self.exists(token) {
                return Err(ValidationError::at(
                    ValidationErrorKind::TokenNotFound(token.text.clone()),
                    token.span,
                ));
            }
        }
        tracing::trace!(?state, "scan finished");
        state.finish().map_err(ValidationError::new)
    }

    fn exists(&self, token: &Token) -> bool {
        match token.kind {
            TokenKind::FunctionOpen => !store::get_by_prefix(self.store, &token.text).is_empty(),
            _ => !store::get(self.store, &token.text).is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use indexmap::IndexMap;

    fn check(script: &str) -> Result<(), ValidationErrorKind> {
        let store: IndexMap<String, String> = IndexMap::new();
        Validator::new(&store)
            .validate(&tokenize(script))
            .map_err(|error| error.kind)
    }

    #[test]
    fn balanced_if_chain_passes() {
        assert_eq!(
            check("@if @eq(1,1) @then @write(a) @elseif @true(x) @then @nl @else @nl @endif"),
            Ok(())
        );
    }

    #[test]
    fn then_needs_if() {
        assert_eq!(
            check("@write(a) @then"),
            Err(ValidationErrorKind::InvalidTransition {
                keyword: Keyword::Then,
                index: 3
            })
        );
    }

    #[test]
    fn final_checks_run_in_order() {
        assert_eq!(check("@write(a"), Err(ValidationErrorKind::MismatchedParentheses));
        assert_eq!(check("@if x @then"), Err(ValidationErrorKind::MismatchedIf));
        assert_eq!(
            check("@for(i,1,2) @foreachlist(v,l)"),
            Err(ValidationErrorKind::MismatchedLoop(Keyword::For))
        );
    }

    #[test]
    fn unknown_macro_reported_first() {
        assert_eq!(
            check("@if @missing(1) @then"),
            Err(ValidationErrorKind::TokenNotFound("@missing(".into()))
        );
    }

    #[test]
    fn stored_macros_are_found() {
        let mut store: IndexMap<String, String> = IndexMap::new();
        store::set(&mut store, "@boo(x)", "@write($x)");
        store::set(&mut store, "@bare", "@nl");
        let validator = Validator::new(&store);
        assert!(validator.validate(&tokenize("@BOO(1) @bare")).is_ok());
    }
}
