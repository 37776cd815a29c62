use std::fmt::Display;

use crate::lexer::{Kind, lex, unquote};

/// An object literal passed as a decorator argument, e.g. `{ nullable: true }`.
///
/// Values are kept as verbatim expression text. Keys keep their position when set.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct ObjectLiteral {
    entries: Vec<(String, String)>,
}

impl ObjectLiteral {
    /// Parse a plain `{ key: value, ... }` literal.
    ///
    /// Returns `None` for anything else, including literals with spreads, shorthand
    /// properties or methods.
    pub fn parse(text: &str) -> Option<Self> {
        let tokens = lex(text).ok()?;
        let slice = |from: usize, to: usize| &text[tokens[from].span.start..tokens[to - 1].span.end];

        let mut cursor = 0;
        if tokens.first()?.kind != Kind::CurlyOpen {
            return None;
        }
        cursor += 1;

        let mut entries = vec![];
        loop {
            let token = tokens.get(cursor)?;
            let key = match token.kind {
                Kind::CurlyClose => {
                    cursor += 1;
                    break;
                }
                Kind::Ident | Kind::Number => text[token.span.clone()].to_string(),
                Kind::DoubleQuoteText | Kind::SingleQuoteText => {
                    unquote(&text[token.span.clone()]).to_string()
                }
                _ => return None,
            };
            cursor += 1;
            if tokens.get(cursor)?.kind != Kind::Colon {
                return None;
            }
            cursor += 1;

            let value_start = cursor;
            let mut depth = 0usize;
            loop {
                match tokens.get(cursor)?.kind {
                    Kind::ParenOpen | Kind::CurlyOpen | Kind::SquareOpen => depth += 1,
                    Kind::ParenClose | Kind::CurlyClose | Kind::SquareClose if depth == 0 => break,
                    Kind::ParenClose | Kind::CurlyClose | Kind::SquareClose => depth -= 1,
                    Kind::Comma if depth == 0 => break,
                    _ => {}
                }
                cursor += 1;
            }
            if cursor == value_start {
                return None;
            }
            entries.push((key, slice(value_start, cursor).to_string()));

            if tokens[cursor].kind == Kind::Comma {
                cursor += 1;
            }
        }

        (cursor == tokens.len()).then_some(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }

    /// Set `key`, replacing the value in place when it exists.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Display for ObjectLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.entries.is_empty() {
            return f.write_str("{}");
        }
        f.write_str("{ ")?;
        for (index, (key, value)) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            if is_identifier(key) {
                write!(f, "{key}: {value}")?;
            } else {
                write!(f, "'{key}': {value}")?;
            }
        }
        f.write_str(" }")
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
