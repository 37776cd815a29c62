use std::ops::Range;

use logos::Logos;

use crate::SyntaxError;

pub(crate) mod kind;

pub use kind::Kind;

#[derive(Clone, Debug)]
pub struct Token {
    pub kind: Kind,
    pub span: Range<usize>,
    /// Whether a line break separates this token from the previous one.
    pub newline_before: bool,
}

/// Lex a source text into significant tokens. Whitespace is dropped, comments are kept.
pub fn lex(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut lexer = Kind::lexer(source);
    let mut tokens = vec![];
    let mut newline_before = false;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(Kind::Whitespace) => {
                if lexer.slice().contains('\n') {
                    newline_before = true;
                }
            }
            Ok(kind) => {
                tokens.push(Token {
                    kind,
                    span,
                    newline_before,
                });
                newline_before = false;
            }
            Err(()) => {
                return Err(SyntaxError::new(
                    format!("unexpected character `{}`", lexer.slice()),
                    span,
                ));
            }
        }
    }

    Ok(tokens)
}

/// Strip the quotes of a string literal without interpreting escapes.
pub fn unquote(text: &str) -> &str {
    if text.len() >= 2 {
        &text[1..text.len() - 1]
    } else {
        text
    }
}
