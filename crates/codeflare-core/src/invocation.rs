//! Lexing of raw invocation tokens into words and flags.
//!
//! Line splitting happens before this point; an [`Invocation`] starts from
//! an ordered list of tokens. Whether a flag consumes the following word is
//! not decided here: that depends on the flag schema of the entry being
//! matched (see [`crate::FlagSchema::split`]).

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::fmt;

use itertools::Itertools;

const END_OF_FLAGS: &str = "--";

/// A lexed invocation token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Positional word, or the value of a preceding flag.
    Word(String),
    /// Word after `--`; always positional.
    Operand(String),
    Flag(FlagToken),
}

/// A token spelled `-x`, `-abc`, `--name` or `--name=value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagToken {
    /// Name without dashes or inline value.
    pub name: String,
    /// Inline value after `=`.
    pub value: Option<String>,
    /// Single dash form; candidates for switch bundles.
    pub short: bool,
}

impl FlagToken {
    /// The flag as the user typed it, without any inline value.
    pub fn spelled(&self) -> String {
        if self.short {
            format!("-{}", self.name)
        } else {
            format!("--{}", self.name)
        }
    }
}

/// One user command as an ordered token sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    raw: Vec<String>,
    tokens: Vec<Token>,
}

impl Invocation {
    pub fn new<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let raw: Vec<String> = raw.into_iter().map(Into::into).collect();
        let tokens = lex(&raw);
        Self { raw, tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Words and operands in order, ignoring which ones flags may consume.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Word(word) | Token::Operand(word) => Some(word.as_str()),
            Token::Flag(_) => None,
        })
    }

    /// True when a long or short flag with this exact name was given.
    pub fn has_flag(&self, name: &str) -> bool {
        self.tokens
            .iter()
            .any(|token| matches!(token, Token::Flag(flag) if flag.name == name))
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw.iter().join(" "))
    }
}

fn lex(raw: &[String]) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(raw.len());
    let mut rest = raw.iter();

    for token in rest.by_ref() {
        if token == END_OF_FLAGS {
            break;
        }
        tokens.push(lex_one(token));
    }
    tokens.extend(rest.map(|operand| Token::Operand(operand.clone())));

    tokens
}

fn lex_one(token: &str) -> Token {
    if let Some(long) = token.strip_prefix("--") {
        return Token::Flag(flag_token(long, false));
    }

    match token.strip_prefix('-') {
        Some(short) if !short.is_empty() && !looks_numeric(short) => {
            Token::Flag(flag_token(short, true))
        }
        _ => Token::Word(token.to_string()),
    }
}

fn flag_token(body: &str, short: bool) -> FlagToken {
    let (name, value) = body
        .split_once('=')
        .map_or((body, None), |(name, value)| (name, Some(value.to_string())));

    FlagToken {
        name: name.to_string(),
        value,
        short,
    }
}

/// Digit-led number such as `5` or `1.5`; `inf` and `nan` are flag names.
fn looks_numeric(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_digit() || c == '.') && text.parse::<f64>().is_ok()
}
