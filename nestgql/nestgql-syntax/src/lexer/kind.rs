//! A logos-based lexer.

use logos::{Lexer, Logos};

/// The Kind of token the lexer can produce.
///
/// Only the distinctions the declaration parser needs are made here. Everything else
/// (operators, keywords) is lexed as `Operator` or `Ident` and interpreted by the parser.
#[derive(Logos, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Kind {
    #[regex(r"[ \t\n\r\f]+")]
    Whitespace,

    #[regex(r"//[^\n\r]*", priority = 3)]
    LineComment,

    #[token("/*", lex_block_comment)]
    BlockComment,

    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token("{")]
    CurlyOpen,

    #[token("}")]
    CurlyClose,

    #[token("[")]
    SquareOpen,

    #[token("]")]
    SquareClose,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[token(":")]
    Colon,

    #[token("?")]
    Question,

    #[token("!")]
    Bang,

    #[token("=")]
    Equals,

    #[token("=>")]
    FatArrow,

    #[token(".")]
    Dot,

    #[token("...")]
    Spread,

    #[token("@")]
    At,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    DoubleQuoteText,

    #[regex(r"'([^'\\\n]|\\.)*'")]
    SingleQuoteText,

    #[regex(r"`([^`\\]|\\.)*`")]
    TemplateText,

    #[regex(r"[0-9][0-9_]*(\.[0-9]+)?([eE][+-]?[0-9]+)?n?")]
    Number,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    #[regex(r"[-+*/%&|^~#]", priority = 1)]
    Operator,
}

impl Kind {
    pub fn is_comment(self) -> bool {
        matches!(self, Self::LineComment | Self::BlockComment)
    }

    pub fn is_text(self) -> bool {
        matches!(
            self,
            Self::DoubleQuoteText | Self::SingleQuoteText | Self::TemplateText
        )
    }
}

fn lex_block_comment(lexer: &mut Lexer<Kind>) -> Option<()> {
    let len = lexer.remainder().find("*/")?;
    lexer.bump(len + 2);
    Some(())
}
