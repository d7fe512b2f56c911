//! Bootstrap definitions loaded into a fresh global memory.
//!
//! The prelude gives the `%`-marked primitives their plain names and adds a few small
//! library functions on top, among them a pair type built only from closures:
//!
//! ```text
//! (define one-two (pair 1 2))
//! (left one-two)             ; 1.0
//! (right one-two)            ; 2.0
//! ```
//!
//! `nil` is the text `"null"` and ends chains of pairs; `left` and `right` of `nil`
//! give `nil` back.

use crate::Error;
use crate::evaluator::{EvalContext, eval};
use crate::memory::Memory;
use crate::reader::read_forms;

/// Source text of the prelude
pub const PRELUDE: &str = include_str!("../prelude/prelude.lisp");

/// Evaluate every prelude definition into `memory`, returning how many forms were loaded
pub fn load(memory: &mut Memory) -> Result<usize, Error> {
    let forms = read_forms(PRELUDE)?;
    let mut out = std::io::sink();
    let mut ctx = EvalContext::new(&mut out);
    for form in &forms {
        eval(form.value(), memory, &mut ctx)?;
    }
    log::debug!(target: "eval", "prelude loaded: {} definitions", forms.len());
    Ok(forms.len())
}
