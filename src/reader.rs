//! Streaming reader turning raw text into nested lists.
//!
//! The reader is a character-level state machine. It keeps a stack of frames, one per
//! list being read, and hands every completed top-level form to a sink as soon as its
//! closing parenthesis is seen. Text may arrive in arbitrary chunks: a form left open at
//! the end of one [`Reader::feed`] call is continued by the next one.
//!
//! Unbalanced input is not an error here. An unclosed form simply stays pending, and a
//! stray `)` outside any list is ignored. Opening more than [`MAX_PARSE_DEPTH`] lists
//! at once is a [`ParseErrorKind::TooDeeplyNested`] error.

use nom::{Parser, combinator::all_consuming, number::complete::double};

use crate::ast::{NumberType, Value};
use crate::{Error, MAX_PARSE_DEPTH, ParseError, ParseErrorKind};
use std::mem;

/// A completed top-level form
#[derive(Debug, Clone, PartialEq)]
pub enum Form {
    /// A parenthesized list, ready for evaluation
    List(Value),
    /// A bare token or string outside any list, to be resolved and printed
    Atom(Value),
}

impl Form {
    pub fn value(&self) -> &Value {
        match self {
            Form::List(value) | Form::Atom(value) => value,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Form::List(value) | Form::Atom(value) => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TokenKind {
    Number,
    Symbol,
    /// A leading `-` whose kind is decided by the character that follows it
    Sign,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    text: String,
}

impl Token {
    fn start(c: char) -> Self {
        let kind = if c.is_ascii_digit() {
            TokenKind::Number
        } else if c == '-' {
            TokenKind::Sign
        } else {
            TokenKind::Symbol
        };
        Token {
            kind,
            text: c.to_string(),
        }
    }

    fn push(&mut self, c: char) {
        if self.kind == TokenKind::Sign {
            self.kind = if c.is_ascii_digit() {
                TokenKind::Number
            } else {
                TokenKind::Symbol
            };
        }
        self.text.push(c);
    }

    fn into_value(self) -> Result<Value, Error> {
        match self.kind {
            TokenKind::Number => parse_number(&self.text).map(Value::Number),
            TokenKind::Symbol | TokenKind::Sign => Ok(Value::Symbol(self.text)),
        }
    }
}

/// Parse a complete numeric token as a double
fn parse_number(text: &str) -> Result<NumberType, Error> {
    match all_consuming(double::<&str, nom::error::Error<&str>>).parse(text) {
        Ok((_, n)) => Ok(n),
        Err(_) => Err(Error::ParseError(ParseError::new(
            ParseErrorKind::InvalidNumber,
            format!("Invalid number literal '{text}'"),
            Some(text.to_owned()),
        ))),
    }
}

/// One level of list nesting
#[derive(Debug, Default)]
struct Frame {
    in_list: bool,
    list: Vec<Value>,
    token: Option<Token>,
    string: Option<String>,
}

#[derive(Debug, Default)]
pub struct Reader {
    /// Enclosing frames, innermost last
    frames: Vec<Frame>,
    current: Frame,
}

impl Reader {
    pub fn new() -> Self {
        Reader::default()
    }

    /// Feed a chunk of source text, calling `sink` once per completed top-level form.
    ///
    /// A bare token outside any list is completed by whitespace or by the end of the
    /// chunk. An error returned by `sink` stops reading immediately and is propagated;
    /// the reader keeps whatever partial state it had, so callers usually [`reset`] it.
    ///
    /// [`reset`]: Reader::reset
    pub fn feed<F>(&mut self, source: &str, mut sink: F) -> Result<(), Error>
    where
        F: FnMut(Form) -> Result<(), Error>,
    {
        for c in source.chars() {
            self.step(c, &mut sink)?;
        }

        if self.frames.is_empty() && !self.current.in_list && self.current.string.is_none() {
            self.flush_token(&mut sink)?;
        }
        Ok(())
    }

    /// True when no list, string or token is partially read
    pub fn is_idle(&self) -> bool {
        self.frames.is_empty()
            && !self.current.in_list
            && self.current.token.is_none()
            && self.current.string.is_none()
    }

    /// Number of lists currently open
    pub fn depth(&self) -> usize {
        if self.current.in_list {
            self.frames.len() + 1
        } else {
            self.frames.len()
        }
    }

    /// Drop any partially read form
    pub fn reset(&mut self) {
        *self = Reader::default();
    }

    fn step<F>(&mut self, c: char, sink: &mut F) -> Result<(), Error>
    where
        F: FnMut(Form) -> Result<(), Error>,
    {
        if let Some(text) = self.current.string.as_mut() {
            if c == '"' {
                let text = mem::take(text);
                self.current.string = None;
                return self.emit(Value::Text(text), sink);
            }
            text.push(c);
            return Ok(());
        }

        match c {
            '"' => {
                self.flush_token(sink)?;
                self.current.string = Some(String::new());
            }
            '(' => {
                self.flush_token(sink)?;
                if self.depth() >= MAX_PARSE_DEPTH {
                    return Err(Error::ParseError(ParseError::from_message(
                        ParseErrorKind::TooDeeplyNested,
                        format!("Expression too deeply nested (max depth: {MAX_PARSE_DEPTH})"),
                    )));
                }
                if self.current.in_list {
                    let parent = mem::take(&mut self.current);
                    self.frames.push(parent);
                }
                self.current.in_list = true;
            }
            ')' => {
                self.flush_token(sink)?;
                if !self.current.in_list {
                    log::warn!(target: "reader", "ignoring ')' outside of any list");
                    return Ok(());
                }
                self.current.in_list = false;
                let list = Value::List(mem::take(&mut self.current.list));
                match self.frames.pop() {
                    Some(parent) => {
                        self.current = parent;
                        self.current.list.push(list);
                    }
                    None => {
                        log::trace!(target: "reader", "read form {list}");
                        sink(Form::List(list))?;
                    }
                }
            }
            c if c.is_whitespace() => self.flush_token(sink)?,
            c => match self.current.token.as_mut() {
                Some(token) => token.push(c),
                None => self.current.token = Some(Token::start(c)),
            },
        }
        Ok(())
    }

    fn flush_token<F>(&mut self, sink: &mut F) -> Result<(), Error>
    where
        F: FnMut(Form) -> Result<(), Error>,
    {
        match self.current.token.take() {
            Some(token) => {
                let value = token.into_value()?;
                self.emit(value, sink)
            }
            None => Ok(()),
        }
    }

    /// Append a finished atom to the open list, or hand it out as a bare form
    fn emit<F>(&mut self, value: Value, sink: &mut F) -> Result<(), Error>
    where
        F: FnMut(Form) -> Result<(), Error>,
    {
        if self.current.in_list {
            self.current.list.push(value);
            Ok(())
        } else {
            sink(Form::Atom(value))
        }
    }
}

/// Read every form in a complete source text.
pub fn read_forms(source: &str) -> Result<Vec<Form>, Error> {
    let mut reader = Reader::new();
    let mut forms = Vec::new();
    reader.feed(source, |form| {
        forms.push(form);
        Ok(())
    })?;

    if !reader.is_idle() {
        return Err(Error::ParseError(ParseError::from_message(
            ParseErrorKind::Incomplete,
            format!("Input ended inside {} open list(s)", reader.depth()),
        )));
    }
    Ok(forms)
}

/// Read exactly one form from a complete source text.
pub fn read(source: &str) -> Result<Value, Error> {
    let mut forms = read_forms(source)?.into_iter();
    match (forms.next(), forms.next()) {
        (Some(form), None) => Ok(form.into_value()),
        (None, _) => Err(Error::ParseError(ParseError::from_message(
            ParseErrorKind::Incomplete,
            "Expected a form, found empty input",
        ))),
        (Some(_), Some(extra)) => Err(Error::ParseError(ParseError::new(
            ParseErrorKind::TrailingContent,
            "Unexpected content after the first form",
            Some(extra.into_value().to_string()),
        ))),
    }
}
