use super::token::{Span, Token, TokenKind};

#[derive(Debug, Clone, Copy)]
pub struct SourceChar {
    pub value: char,
    pub offset: usize,
}

impl SourceChar {
    pub fn next_offset(&self) -> usize {
        self.offset + self.value.len_utf8()
    }
}

pub enum LexerStateTransition {
    Stay,
    ChangeState(LexerState),
    ChangeStateAndEmit {
        new_state: LexerState,
        token: Token,
    },
    ChangeStateAndEmitAndPutBack {
        new_state: LexerState,
        token: Token,
        put_back: SourceChar,
    },
    Finished,
}

pub trait LexerStateExecutor {
    fn execute(&self, source: &str, next_char: Option<SourceChar>) -> LexerStateTransition;
}

#[derive(Debug, Clone, Default)]
pub enum LexerState {
    #[default]
    Normal,
    Word(WordState),
    Quote(QuoteState),
}

impl LexerState {
    pub fn execute(&self, source: &str, next_char: Option<SourceChar>) -> LexerStateTransition {
        match self {
            LexerState::Normal => NormalState.execute(source, next_char),
            LexerState::Word(s) => s.execute(source, next_char),
            LexerState::Quote(s) => s.execute(source, next_char),
        }
    }
}

struct NormalState;

impl LexerStateExecutor for NormalState {
    fn execute(&self, _source: &str, next_char: Option<SourceChar>) -> LexerStateTransition {
        let Some(c) = next_char else {
            return LexerStateTransition::Finished;
        };

        let just = |kind: TokenKind| LexerStateTransition::ChangeStateAndEmit {
            new_state: LexerState::Normal,
            token: Token::new(
                kind,
                c.value.to_string(),
                Span::new(c.offset, c.next_offset()),
            ),
        };

        match c.value {
            ',' => just(TokenKind::Comma),
            ')' => just(TokenKind::CloseParen),
            '"' => LexerStateTransition::ChangeState(LexerState::Quote(QuoteState {
                start: c.offset,
                escaped: false,
            })),
            v if v.is_whitespace() => LexerStateTransition::Stay,
            v => LexerStateTransition::ChangeState(LexerState::Word(WordState {
                start: c.offset,
                function: v == '@',
            })),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WordState {
    start: usize,
    /// Set while the word began with `@` and may still become `@name(`.
    function: bool,
}

impl WordState {
    fn lex_word(&self, source: &str, end: usize) -> Token {
        let span = Span::new(self.start, end);
        let lexeme = &source[span.range()];
        let kind = if self.function && lexeme.ends_with('(') {
            TokenKind::FunctionOpen
        } else {
            TokenKind::Word
        };
        if self.function {
            Token::new(kind, lexeme.to_lowercase(), span)
        } else {
            Token::new(kind, lexeme, span)
        }
    }
}

impl LexerStateExecutor for WordState {
    fn execute(&self, source: &str, next_char: Option<SourceChar>) -> LexerStateTransition {
        let Some(c) = next_char else {
            return LexerStateTransition::ChangeStateAndEmit {
                new_state: LexerState::Normal,
                token: self.lex_word(source, source.len()),
            };
        };

        match c.value {
            '(' => LexerStateTransition::ChangeStateAndEmit {
                new_state: LexerState::Normal,
                token: self.lex_word(source, c.next_offset()),
            },
            // `@` inside a word starts a new call, e.g. `key.@get(i)`.
            ',' | ')' | '@' => LexerStateTransition::ChangeStateAndEmitAndPutBack {
                new_state: LexerState::Normal,
                token: self.lex_word(source, c.offset),
                put_back: c,
            },
            v if v.is_whitespace() => LexerStateTransition::ChangeStateAndEmit {
                new_state: LexerState::Normal,
                token: self.lex_word(source, c.offset),
            },
            _ => LexerStateTransition::Stay,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuoteState {
    start: usize,
    escaped: bool,
}

impl LexerStateExecutor for QuoteState {
    fn execute(&self, source: &str, next_char: Option<SourceChar>) -> LexerStateTransition {
        let Some(c) = next_char else {
            let span = Span::new(self.start, source.len());
            return LexerStateTransition::ChangeStateAndEmit {
                new_state: LexerState::Normal,
                token: Token::new(TokenKind::Quoted, &source[span.range()], span),
            };
        };

        if self.escaped {
            return LexerStateTransition::ChangeState(LexerState::Quote(QuoteState {
                start: self.start,
                escaped: false,
            }));
        }

        match c.value {
            '\\' => LexerStateTransition::ChangeState(LexerState::Quote(QuoteState {
                start: self.start,
                escaped: true,
            })),
            '"' => {
                let span = Span::new(self.start, c.next_offset());
                LexerStateTransition::ChangeStateAndEmit {
                    new_state: LexerState::Normal,
                    token: Token::new(TokenKind::Quoted, &source[span.range()], span),
                }
            }
            _ => LexerStateTransition::Stay,
        }
    }
}
