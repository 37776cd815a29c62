#![forbid(unsafe_code)]

//! Parsing and printing of the TypeScript declaration subset that generated files consist of.

use std::ops::Range;

use thiserror::Error;

pub mod ast;
pub mod lexer;
pub mod options;

mod parser;
mod printer;

pub use parser::parse_source;
pub use printer::{print_decorator, print_import, print_source};

#[cfg(test)]
mod tests;

#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("{msg} at {}..{}", span.start, span.end)]
pub struct SyntaxError {
    pub msg: String,
    pub span: Range<usize>,
}

impl SyntaxError {
    pub fn new(msg: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            msg: msg.into(),
            span,
        }
    }
}
