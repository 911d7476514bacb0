//! The single keyword table. The validator, the engine, the pretty-printer
//! and the help text all resolve tokens through [`Keyword::from_token`].

use crate::lexer::{Token, TokenKind};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Abs,
    Add,
    AddList,
    AddTo,
    And,
    ClearArray,
    ClearList,
    Comment,
    Concat,
    Div,
    DivTo,
    Else,
    ElseIf,
    EndFor,
    EndForEachKey,
    EndForEachList,
    EndIf,
    Eq,
    Exec,
    False,
    FalseData,
    For,
    ForEachKey,
    ForEachList,
    Format,
    Ge,
    Get,
    GetArray,
    GetInChannel,
    GetList,
    GetValue,
    Gt,
    If,
    InsertAtList,
    IsBool,
    IsBoolData,
    IsNull,
    IsNullData,
    IsScript,
    IsScriptData,
    Le,
    ListLength,
    Lower,
    Lt,
    Mod,
    ModTo,
    Msg,
    Mul,
    MulTo,
    Ne,
    Nl,
    Not,
    Or,
    Rand,
    RemoveAtList,
    Replace,
    Rnd,
    Script,
    Set,
    SetArray,
    SetList,
    SetOutChannel,
    Sub,
    Substring,
    SubTo,
    Swap,
    Then,
    Trim,
    True,
    TrueData,
    Upper,
    Write,
}

/// How a keyword may be spelled in a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    /// `@name`
    Bare,
    /// `@name(...)`
    Call,
    Either,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub const fn exact(count: usize) -> Self {
        Self {
            min: count,
            max: Some(count),
        }
    }

    const fn at_least(count: usize) -> Self {
        Self {
            min: count,
            max: None,
        }
    }

    const fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{max}"),
            Some(max) => write!(f, "{}-{max}", self.min),
            None => write!(f, "{}+", self.min),
        }
    }
}

/// Sections of the help text, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Group {
    Statement,
    Numeric,
    Output,
    Function,
    IfToken,
    IfCondition,
    Connector,
    ForLoop,
    ForEachKeyLoop,
    ForEachListLoop,
    List,
    Array,
    Channel,
}

impl Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let title = match self {
            Group::Statement => "Statements",
            Group::Numeric => "Numeric statements",
            Group::Output => "Output statements",
            Group::Function => "Functions",
            Group::IfToken => "If tokens",
            Group::IfCondition => "If conditions",
            Group::Connector => "Condition connectors/modifiers",
            Group::ForLoop => "For loop",
            Group::ForEachKeyLoop => "ForEachKey loop",
            Group::ForEachListLoop => "ForEachList loop",
            Group::List => "List statements/functions",
            Group::Array => "Array statements/functions",
            Group::Channel => "In/Out Channel commands",
        };
        write!(f, "{title}")
    }
}

#[derive(Debug)]
pub struct KeywordSpec {
    pub keyword: Keyword,
    pub name: &'static str,
    pub form: Form,
    pub arity: Arity,
    /// Parameter list shown by the help text.
    pub params: &'static str,
    pub group: Group,
}

const fn call(
    keyword: Keyword,
    name: &'static str,
    arity: Arity,
    params: &'static str,
    group: Group,
) -> KeywordSpec {
    KeywordSpec {
        keyword,
        name,
        form: Form::Call,
        arity,
        params,
        group,
    }
}

const fn bare(keyword: Keyword, name: &'static str, group: Group) -> KeywordSpec {
    KeywordSpec {
        keyword,
        name,
        form: Form::Bare,
        arity: Arity::exact(0),
        params: "",
        group,
    }
}

const fn either(keyword: Keyword, name: &'static str, group: Group) -> KeywordSpec {
    KeywordSpec {
        keyword,
        name,
        form: Form::Either,
        arity: Arity::exact(0),
        params: "",
        group,
    }
}

use Arity as A;
use Group as G;
use Keyword as K;

pub static KEYWORDS: [KeywordSpec; 72] = [
    call(K::Comment, "comment", A::exact(1), "x", G::Statement),
    call(K::Exec, "exec", A::exact(1), "script", G::Statement),
    call(K::Script, "script", A::exact(1), "key", G::Statement),
    call(K::Set, "set", A::exact(2), "key,x", G::Statement),
    call(K::Swap, "swap", A::exact(2), "key1,key2", G::Statement),
    call(K::AddTo, "addto", A::exact(2), "key,x", G::Numeric),
    call(K::DivTo, "divto", A::exact(2), "key,x", G::Numeric),
    call(K::ModTo, "modto", A::exact(2), "key,x", G::Numeric),
    call(K::MulTo, "multo", A::exact(2), "key,x", G::Numeric),
    call(K::SubTo, "subto", A::exact(2), "key,x", G::Numeric),
    either(K::Nl, "nl", G::Output),
    call(K::Msg, "msg", A::exact(1), "key", G::Output),
    call(K::Write, "write", A::at_least(1), "x,...", G::Output),
    call(K::Abs, "abs", A::exact(1), "x", G::Function),
    call(K::Add, "add", A::exact(2), "x,y", G::Function),
    call(K::Concat, "concat", A::at_least(1), "x,y,...", G::Function),
    call(K::Div, "div", A::exact(2), "x,y", G::Function),
    call(K::Format, "format", A::at_least(1), "x,y0,y1,...", G::Function),
    call(K::Get, "get", A::exact(1), "key", G::Function),
    call(K::GetValue, "getvalue", A::exact(1), "key", G::Function),
    call(K::Lower, "lower", A::exact(1), "x", G::Function),
    call(K::Mod, "mod", A::exact(2), "x,y", G::Function),
    call(K::Mul, "mul", A::exact(2), "x,y", G::Function),
    call(K::Replace, "replace", A::exact(3), "x,y,z", G::Function),
    call(K::Rnd, "rnd", A::exact(1), "x", G::Function),
    call(K::Sub, "sub", A::exact(2), "x,y", G::Function),
    call(K::Substring, "substring", A::between(2, 3), "value,start[,len]", G::Function),
    call(K::Trim, "trim", A::exact(1), "x", G::Function),
    call(K::Upper, "upper", A::exact(1), "x", G::Function),
    bare(K::If, "if", G::IfToken),
    bare(K::Then, "then", G::IfToken),
    bare(K::ElseIf, "elseif", G::IfToken),
    bare(K::Else, "else", G::IfToken),
    bare(K::EndIf, "endif", G::IfToken),
    call(K::Eq, "eq", A::exact(2), "x,y", G::IfCondition),
    call(K::False, "false", A::exact(1), "x", G::IfCondition),
    call(K::FalseData, "falsedata", A::exact(1), "key", G::IfCondition),
    call(K::Ge, "ge", A::exact(2), "x,y", G::IfCondition),
    call(K::Gt, "gt", A::exact(2), "x,y", G::IfCondition),
    call(K::IsBool, "isbool", A::exact(1), "x", G::IfCondition),
    call(K::IsBoolData, "isbooldata", A::exact(1), "key", G::IfCondition),
    call(K::IsNull, "isnull", A::exact(1), "x", G::IfCondition),
    call(K::IsNullData, "isnulldata", A::exact(1), "key", G::IfCondition),
    call(K::IsScript, "isscript", A::exact(1), "x", G::IfCondition),
    call(K::IsScriptData, "isscriptdata", A::exact(1), "key", G::IfCondition),
    call(K::Le, "le", A::exact(2), "x,y", G::IfCondition),
    call(K::Lt, "lt", A::exact(2), "x,y", G::IfCondition),
    call(K::Ne, "ne", A::exact(2), "x,y", G::IfCondition),
    call(K::Rand, "rand", A::exact(1), "x", G::IfCondition),
    call(K::True, "true", A::exact(1), "x", G::IfCondition),
    call(K::TrueData, "truedata", A::exact(1), "key", G::IfCondition),
    bare(K::And, "and", G::Connector),
    bare(K::Or, "or", G::Connector),
    bare(K::Not, "not", G::Connector),
    call(K::For, "for", A::exact(3), "token,start,end", G::ForLoop),
    bare(K::EndFor, "endfor", G::ForLoop),
    call(K::ForEachKey, "foreachkey", A::between(2, 3), "token,prefix[,suffix]", G::ForEachKeyLoop),
    bare(K::EndForEachKey, "endforeachkey", G::ForEachKeyLoop),
    call(K::ForEachList, "foreachlist", A::exact(2), "token,name", G::ForEachListLoop),
    bare(K::EndForEachList, "endforeachlist", G::ForEachListLoop),
    call(K::AddList, "addlist", A::exact(2), "name,value", G::List),
    call(K::ClearList, "clearlist", A::exact(1), "name", G::List),
    call(K::GetList, "getlist", A::exact(2), "name,pos", G::List),
    call(K::InsertAtList, "insertatlist", A::exact(3), "name,pos,value", G::List),
    call(K::ListLength, "listlength", A::exact(1), "name", G::List),
    call(K::RemoveAtList, "removeatlist", A::exact(2), "name,pos", G::List),
    call(K::SetList, "setlist", A::exact(3), "name,pos,value", G::List),
    call(K::ClearArray, "cleararray", A::exact(1), "name", G::Array),
    call(K::GetArray, "getarray", A::exact(3), "name,y,x", G::Array),
    call(K::SetArray, "setarray", A::exact(4), "name,y,x,value", G::Array),
    either(K::GetInChannel, "getinchannel", G::Channel),
    call(K::SetOutChannel, "setoutchannel", A::exact(1), "value", G::Channel),
];

/// The hashmap for keywords, keyed by lowercase name without `@` or `(`.
pub static KEYWORD_HASHMAP: LazyLock<HashMap<&'static str, &'static KeywordSpec>> =
    LazyLock::new(|| KEYWORDS.iter().map(|spec| (spec.name, spec)).collect());

static SPEC_HASHMAP: LazyLock<HashMap<Keyword, &'static KeywordSpec>> =
    LazyLock::new(|| KEYWORDS.iter().map(|spec| (spec.keyword, spec)).collect());

impl Keyword {
    /// Resolves a token against the table. The spelling must match the
    /// keyword's form: `@if(` and bare `@write` are not keywords.
    pub fn from_token(token: &Token) -> Option<Keyword> {
        let (name, call_form) = match token.kind {
            TokenKind::FunctionOpen => (token.text.strip_prefix('@')?.strip_suffix('(')?, true),
            TokenKind::Word => (token.text.strip_prefix('@')?, false),
            _ => return None,
        };
        let spec = KEYWORD_HASHMAP.get(name.to_ascii_lowercase().as_str())?;
        let allowed = match spec.form {
            Form::Bare => !call_form,
            Form::Call => call_form,
            Form::Either => true,
        };
        allowed.then_some(spec.keyword)
    }

    pub fn spec(self) -> &'static KeywordSpec {
        SPEC_HASHMAP
            .get(&self)
            .expect("Every keyword has an entry in the table.")
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn arity(self) -> Arity {
        self.spec().arity
    }

    /// Closing keyword of a loop header.
    pub fn loop_end(self) -> Option<Keyword> {
        match self {
            Keyword::For => Some(Keyword::EndFor),
            Keyword::ForEachKey => Some(Keyword::EndForEachKey),
            Keyword::ForEachList => Some(Keyword::EndForEachList),
            _ => None,
        }
    }

    /// Keywords that only shape control flow and never produce a value.
    pub fn is_structural(self) -> bool {
        matches!(
            self.spec().group,
            Group::IfToken | Group::Connector
        ) || matches!(
            self,
            Keyword::EndFor | Keyword::EndForEachKey | Keyword::EndForEachList
        )
    }
}

impl Display for Keyword {
    /// The keyword as written in a script, e.g. `@for(` or `@endif`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.spec().form {
            Form::Call => write!(f, "@{}(", self.name()),
            Form::Bare | Form::Either => write!(f, "@{}", self.name()),
        }
    }
}
