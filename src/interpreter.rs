//! The `evaluate(source)` entry point.
//!
//! An [`Interpreter`] owns the global memory, the streaming reader and the output
//! channel written by `print`. Source text may be fed in arbitrary pieces: every
//! top-level list is evaluated as soon as it is closed, and a bare top-level atom is
//! resolved and written to the output.
//!
//! ```
//! use sublisp::Interpreter;
//!
//! let mut interpreter = Interpreter::with_output(Vec::new()).unwrap();
//! interpreter.evaluate("(define a 10)\na").unwrap();
//! assert_eq!(interpreter.take_output(), "10.0");
//! ```

use crate::ast::Value;
use crate::evaluator::{EvalContext, eval};
use crate::memory::Memory;
use crate::reader::{Form, Reader};
use crate::{Error, MAX_EVAL_DEPTH, prelude};
use std::io::{self, Write};
use std::mem;

/// Interpreter settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Nesting level at which evaluation stops with [`Error::StackExhausted`]
    pub max_eval_depth: usize,
    /// Whether a new interpreter starts with the prelude definitions
    pub load_prelude: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_eval_depth: MAX_EVAL_DEPTH,
            load_prelude: true,
        }
    }
}

pub struct Interpreter<W: Write = io::Stdout> {
    memory: Memory,
    reader: Reader,
    out: W,
    config: Config,
}

impl Interpreter<io::Stdout> {
    /// Interpreter printing to standard output, with the default configuration
    pub fn new() -> Result<Self, Error> {
        Self::with_config(Config::default(), io::stdout())
    }
}

impl<W: Write> Interpreter<W> {
    pub fn with_output(out: W) -> Result<Self, Error> {
        Self::with_config(Config::default(), out)
    }

    pub fn with_config(config: Config, out: W) -> Result<Self, Error> {
        let mut memory = Memory::new();
        if config.load_prelude {
            prelude::load(&mut memory)?;
        }
        Ok(Interpreter {
            memory,
            reader: Reader::new(),
            out,
            config,
        })
    }

    /// Feed source text and evaluate every top-level list it completes.
    ///
    /// Returns the values of the evaluated lists in order, `define` and `do` included
    /// as [`Value::Void`]. The first error aborts the call and discards whatever the
    /// reader had pending, so the next call starts from a clean state.
    pub fn evaluate(&mut self, source: &str) -> Result<Vec<Value>, Error> {
        let Interpreter {
            memory,
            reader,
            out,
            config,
        } = self;
        let mut ctx = EvalContext::new(out).with_max_depth(config.max_eval_depth);
        let mut values = Vec::new();

        let result = reader.feed(source, |form| {
            match form {
                Form::List(expr) => values.push(eval(&expr, memory, &mut ctx)?),
                Form::Atom(expr) => {
                    let value = eval(&expr, memory, &mut ctx)?;
                    write!(ctx.out, "{}", value.printed())?;
                    ctx.out.flush()?;
                }
            }
            Ok(())
        });

        if let Err(err) = result {
            log::debug!(target: "eval", "evaluation aborted: {err}");
            reader.reset();
            return Err(err);
        }
        Ok(values)
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// True when no partially read form is waiting for more input
    pub fn is_idle(&self) -> bool {
        self.reader.is_idle()
    }
}

impl Interpreter<Vec<u8>> {
    /// Drain everything printed so far
    pub fn take_output(&mut self) -> String {
        String::from_utf8_lossy(&mem::take(&mut self.out)).into_owned()
    }
}
