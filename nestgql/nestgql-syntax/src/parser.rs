use std::ops::Range;

use tracing::trace;

use crate::{
    SyntaxError,
    ast::{
        ClassDecl, ClassMember, Decorator, EnumDecl, EnumEntry, EnumMember, ImportDecl,
        ImportSpecifier, Item, OtherItem, OtherKind, PropertyDecl, PropertyToken, SourceFile,
    },
    lexer::{Kind, Token, lex, unquote},
};

const PROPERTY_MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "readonly",
    "static",
    "declare",
    "abstract",
    "override",
    "accessor",
];

/// Parse one TypeScript source file into its declaration tree.
///
/// Constructs outside the modelled subset are kept verbatim, so this only fails on
/// lexical errors and unbalanced brackets.
pub fn parse_source(source: &str) -> Result<SourceFile, SyntaxError> {
    let tokens = lex(source)?;
    let mut parser = Parser {
        source,
        tokens,
        cursor: 0,
    };

    let mut items = vec![];
    while !parser.at_end() {
        items.push(parser.item()?);
    }

    Ok(SourceFile { items })
}

/// Where a verbatim scan stops.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Scan {
    /// A whole statement, including its `;`.
    Statement,
    /// A type annotation. Angle brackets nest.
    Type,
    /// A property initializer.
    Expression,
    /// An enum member initializer, ending at `,`.
    EnumInitializer,
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    cursor: usize,
}

impl<'a> Parser<'a> {
    fn item(&mut self) -> Result<Item, SyntaxError> {
        let start = self.cursor;

        if self.at_comment() {
            return Ok(Item::Comment(self.bump().to_string()));
        }

        if self.at_keyword("import") {
            if let Some(import) = self.attempt(Self::import_decl) {
                return Ok(Item::Import(import));
            }
            return self.other_item(OtherKind::Statement, None);
        }

        let decorators = self.decorators();
        let exported = self.eat_keyword("export");
        let plain = !self.at_keyword("default") && !self.at_keyword("declare");
        let is_abstract = self.eat_keyword("abstract");

        if plain && self.at_keyword("class") {
            if let Some(class) = self.class_decl(decorators, exported, is_abstract)? {
                return Ok(Item::Class(class));
            }
            self.cursor = start;
            return self.other_item(OtherKind::Statement, None);
        }

        if plain && decorators.is_empty() && !is_abstract {
            let is_const = self.at_keyword("const") && self.keyword_nth(1, "enum");
            if is_const {
                self.cursor += 1;
            }
            if self.at_keyword("enum") {
                if let Some(enum_decl) = self.attempt(|p| p.enum_decl(exported, is_const)) {
                    return Ok(Item::Enum(enum_decl));
                }
            }
        }

        let (kind, name) = match self.text() {
            "interface" => (OtherKind::Interface, self.ident_nth(1)),
            "type" => (OtherKind::TypeAlias, self.ident_nth(1)),
            "function" => (OtherKind::Function, self.ident_nth(1)),
            "async" if self.keyword_nth(1, "function") => (OtherKind::Function, self.ident_nth(2)),
            "const" | "let" | "var" => (OtherKind::Variable, self.ident_nth(1)),
            _ => (OtherKind::Statement, None),
        };
        let kind = if decorators.is_empty() && !is_abstract {
            kind
        } else {
            OtherKind::Statement
        };

        self.cursor = start;
        self.other_item(kind, name.map(str::to_string))
    }

    fn other_item(&mut self, kind: OtherKind, name: Option<String>) -> Result<Item, SyntaxError> {
        let start = self.cursor;
        self.decorators();
        self.scan(Scan::Statement)?;
        if self.cursor == start {
            return Err(self.error_here(format!("unexpected `{}`", self.text())));
        }
        Ok(Item::Other(OtherItem {
            kind,
            name,
            text: self.slice(start, self.cursor).to_string(),
        }))
    }

    fn import_decl(&mut self) -> Option<ImportDecl> {
        self.cursor += 1;

        let type_only = self.at_keyword("type")
            && (matches!(self.kind_nth(1), Some(Kind::CurlyOpen))
                || self.operator_nth(1, "*")
                || (self.kind_nth(1) == Some(Kind::Ident) && !self.keyword_nth(1, "from")));
        if type_only {
            self.cursor += 1;
        }

        let mut default = None;
        let mut namespace = None;
        let mut named = vec![];

        if self.kind()? == Kind::Ident {
            default = Some(self.bump().to_string());
            self.eat(Kind::Comma);
        }

        if self.operator_nth(0, "*") {
            self.cursor += 1;
            if !self.eat_keyword("as") {
                return None;
            }
            namespace = Some(self.ident()?.to_string());
        } else if self.eat(Kind::CurlyOpen) {
            loop {
                if self.eat(Kind::CurlyClose) {
                    break;
                }
                // inline `type` specifiers are kept verbatim
                if self.at_keyword("type") && self.kind_nth(1) == Some(Kind::Ident) {
                    return None;
                }
                let name = self.ident()?.to_string();
                let alias = if self.eat_keyword("as") {
                    Some(self.ident()?.to_string())
                } else {
                    None
                };
                named.push(ImportSpecifier { name, alias });
                if !self.eat(Kind::Comma) {
                    if !self.eat(Kind::CurlyClose) {
                        return None;
                    }
                    break;
                }
            }
        }

        if !self.eat_keyword("from") {
            return None;
        }
        let module = match self.kind()? {
            Kind::DoubleQuoteText | Kind::SingleQuoteText => unquote(self.bump()).to_string(),
            _ => return None,
        };
        self.eat(Kind::Semicolon);

        Some(ImportDecl {
            type_only,
            default,
            namespace,
            named,
            module,
        })
    }

    fn class_decl(
        &mut self,
        decorators: Vec<Decorator>,
        exported: bool,
        is_abstract: bool,
    ) -> Result<Option<ClassDecl>, SyntaxError> {
        self.cursor += 1;
        let Some(name) = self.ident() else {
            return Ok(None);
        };

        let heritage_start = self.cursor;
        while !matches!(self.kind(), Some(Kind::CurlyOpen) | None) {
            self.cursor += 1;
        }
        if self.at_end() {
            return Ok(None);
        }
        let heritage = self.slice(heritage_start, self.cursor);
        self.cursor += 1;

        let mut members = vec![];
        loop {
            match self.kind() {
                None => return Err(self.error_here("unterminated class body")),
                Some(Kind::CurlyClose) => {
                    self.cursor += 1;
                    break;
                }
                Some(Kind::Semicolon) => {
                    self.cursor += 1;
                }
                Some(kind) if kind.is_comment() => {
                    members.push(ClassMember::Comment(self.bump().to_string()));
                }
                Some(_) => members.push(self.class_member()?),
            }
        }

        Ok(Some(ClassDecl {
            decorators,
            exported,
            is_abstract,
            name: name.to_string(),
            heritage: (!heritage.is_empty()).then(|| heritage.to_string()),
            members,
        }))
    }

    fn class_member(&mut self) -> Result<ClassMember, SyntaxError> {
        let start = self.cursor;
        if let Some(property) = self.attempt(Self::property_decl) {
            return Ok(ClassMember::Property(property));
        }

        self.decorators();
        self.scan(Scan::Statement)?;
        if self.cursor == start {
            return Err(self.error_here(format!("unexpected `{}` in class body", self.text())));
        }

        let text = self.slice(start, self.cursor);
        trace!(text, "verbatim class member");
        Ok(ClassMember::Other(text.to_string()))
    }

    fn property_decl(&mut self) -> Option<PropertyDecl> {
        let decorators = self.decorators();

        let mut modifiers = vec![];
        while self.kind() == Some(Kind::Ident)
            && PROPERTY_MODIFIERS.contains(&self.text())
            && matches!(
                self.kind_nth(1),
                Some(Kind::Ident | Kind::DoubleQuoteText | Kind::SingleQuoteText | Kind::Number)
            )
        {
            modifiers.push(self.bump().to_string());
        }

        let name = match self.kind()? {
            Kind::Ident | Kind::DoubleQuoteText | Kind::SingleQuoteText | Kind::Number => {
                self.bump().to_string()
            }
            _ => return None,
        };

        let token = if self.eat(Kind::Question) {
            PropertyToken::Question
        } else if self.eat(Kind::Bang) {
            PropertyToken::Exclamation
        } else {
            PropertyToken::None
        };

        let ty = if self.eat(Kind::Colon) {
            Some(self.scan_text(Scan::Type)?)
        } else {
            None
        };
        let initializer = if self.eat(Kind::Equals) {
            Some(self.scan_text(Scan::Expression)?)
        } else {
            None
        };

        match self.peek() {
            Some(token) if token.kind == Kind::Semicolon => {
                self.cursor += 1;
            }
            Some(token) if token.kind == Kind::CurlyClose || token.newline_before => {}
            Some(token) if token.kind.is_comment() => {}
            None => {}
            Some(_) => return None,
        }
        let trailing_comment = match self.peek() {
            Some(token) if token.kind.is_comment() && !token.newline_before => {
                Some(self.bump().to_string())
            }
            _ => None,
        };

        Some(PropertyDecl {
            decorators,
            modifiers,
            name,
            token,
            ty,
            initializer,
            trailing_comment,
        })
    }

    fn enum_decl(&mut self, exported: bool, is_const: bool) -> Option<EnumDecl> {
        self.cursor += 1;
        let name = self.ident()?.to_string();
        if !self.eat(Kind::CurlyOpen) {
            return None;
        }

        let mut entries = vec![];
        loop {
            match self.kind()? {
                Kind::CurlyClose => {
                    self.cursor += 1;
                    break;
                }
                kind if kind.is_comment() => {
                    entries.push(EnumEntry::Comment(self.bump().to_string()));
                }
                Kind::Ident | Kind::DoubleQuoteText | Kind::SingleQuoteText => {
                    let name = self.bump().to_string();
                    let initializer = if self.eat(Kind::Equals) {
                        Some(self.scan_text(Scan::EnumInitializer)?)
                    } else {
                        None
                    };
                    if !self.eat(Kind::Comma)
                        && self.kind() != Some(Kind::CurlyClose)
                        && !self.at_comment()
                    {
                        return None;
                    }
                    entries.push(EnumEntry::Member(EnumMember { name, initializer }));
                }
                _ => return None,
            }
        }

        Some(EnumDecl {
            exported,
            is_const,
            name,
            entries,
        })
    }

    fn decorators(&mut self) -> Vec<Decorator> {
        let mut decorators = vec![];
        while self.kind() == Some(Kind::At) {
            match self.attempt(Self::decorator) {
                Some(decorator) => decorators.push(decorator),
                None => break,
            }
        }
        decorators
    }

    fn decorator(&mut self) -> Option<Decorator> {
        self.cursor += 1;
        let start = self.cursor;
        self.ident()?;
        while self.kind() == Some(Kind::Dot) && self.kind_nth(1) == Some(Kind::Ident) {
            self.cursor += 2;
        }
        let name = self.slice(start, self.cursor).to_string();

        let arguments = match self.peek() {
            Some(token) if token.kind == Kind::ParenOpen && !token.newline_before => {
                self.cursor += 1;
                Some(self.arguments()?)
            }
            _ => None,
        };

        Some(Decorator { name, arguments })
    }

    /// Call arguments after `(`, split at top level commas.
    fn arguments(&mut self) -> Option<Vec<String>> {
        let mut arguments = vec![];
        loop {
            if self.eat(Kind::ParenClose) {
                return Some(arguments);
            }

            let start = self.cursor;
            let mut depth = 0usize;
            loop {
                match self.kind()? {
                    Kind::ParenOpen | Kind::CurlyOpen | Kind::SquareOpen => depth += 1,
                    Kind::ParenClose | Kind::CurlyClose | Kind::SquareClose if depth == 0 => break,
                    Kind::ParenClose | Kind::CurlyClose | Kind::SquareClose => depth -= 1,
                    Kind::Comma if depth == 0 => break,
                    _ => {}
                }
                self.cursor += 1;
            }
            if self.cursor > start {
                arguments.push(self.slice(start, self.cursor).to_string());
            }

            if !self.eat(Kind::Comma) {
                return self.eat(Kind::ParenClose).then_some(arguments);
            }
        }
    }

    fn scan_text(&mut self, mode: Scan) -> Option<String> {
        let range = self.scan(mode).ok()?;
        if range.is_empty() {
            return None;
        }
        Some(self.slice(range.start, range.end).to_string())
    }

    /// Consume tokens verbatim until `mode` ends, returning the consumed token range.
    fn scan(&mut self, mode: Scan) -> Result<Range<usize>, SyntaxError> {
        let start = self.cursor;
        let mut stack: Vec<Kind> = vec![];
        let mut last_significant: Option<Kind> = None;

        while let Some(token) = self.tokens.get(self.cursor) {
            let kind = token.kind;

            if stack.is_empty() {
                if let Some(prev) = last_significant {
                    if token.newline_before && !continues_line(prev, kind) {
                        break;
                    }
                }
                match kind {
                    Kind::Semicolon => {
                        if mode == Scan::Statement {
                            self.cursor += 1;
                        }
                        break;
                    }
                    Kind::Equals if mode == Scan::Type => break,
                    Kind::Comma if mode == Scan::EnumInitializer => break,
                    Kind::LineComment | Kind::BlockComment if mode != Scan::Statement => break,
                    _ => {}
                }
            }

            match kind {
                Kind::ParenOpen | Kind::CurlyOpen | Kind::SquareOpen => stack.push(kind),
                Kind::Lt if mode == Scan::Type => stack.push(kind),
                Kind::ParenClose | Kind::CurlyClose | Kind::SquareClose | Kind::Gt
                    if kind != Kind::Gt || mode == Scan::Type =>
                {
                    let opener = match kind {
                        Kind::ParenClose => Kind::ParenOpen,
                        Kind::CurlyClose => Kind::CurlyOpen,
                        Kind::SquareClose => Kind::SquareOpen,
                        _ => Kind::Lt,
                    };
                    match stack.last() {
                        // closes an enclosing construct
                        None => break,
                        Some(open) if *open == opener => {
                            stack.pop();
                        }
                        Some(_) => return Err(self.error_here("mismatched bracket")),
                    }
                }
                _ => {}
            }

            if !kind.is_comment() {
                last_significant = Some(kind);
            }
            self.cursor += 1;
        }

        if !stack.is_empty() {
            return Err(self.error_here("unclosed bracket"));
        }

        Ok(start..self.cursor)
    }

    fn attempt<T>(&mut self, parse: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let start = self.cursor;
        let result = parse(self);
        if result.is_none() {
            self.cursor = start;
        }
        result
    }

    fn at_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn at_comment(&self) -> bool {
        self.kind().is_some_and(Kind::is_comment)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    fn kind(&self) -> Option<Kind> {
        self.kind_nth(0)
    }

    fn kind_nth(&self, n: usize) -> Option<Kind> {
        self.tokens.get(self.cursor + n).map(|token| token.kind)
    }

    fn text(&self) -> &'a str {
        self.text_nth(0)
    }

    fn text_nth(&self, n: usize) -> &'a str {
        let source = self.source;
        self.tokens
            .get(self.cursor + n)
            .map(|token| &source[token.span.clone()])
            .unwrap_or("")
    }

    fn ident_nth(&self, n: usize) -> Option<&'a str> {
        (self.kind_nth(n) == Some(Kind::Ident)).then(|| self.text_nth(n))
    }

    fn keyword_nth(&self, n: usize, keyword: &str) -> bool {
        self.ident_nth(n) == Some(keyword)
    }

    fn operator_nth(&self, n: usize, operator: &str) -> bool {
        self.kind_nth(n) == Some(Kind::Operator) && self.text_nth(n) == operator
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.keyword_nth(0, keyword)
    }

    /// Consume the current token and return its text.
    fn bump(&mut self) -> &'a str {
        let text = self.text();
        self.cursor += 1;
        text
    }

    fn eat(&mut self, kind: Kind) -> bool {
        if self.kind() == Some(kind) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        (self.kind() == Some(Kind::Ident)).then(|| self.bump())
    }

    /// Source text from token `from` up to, not including, token `to`.
    fn slice(&self, from: usize, to: usize) -> &'a str {
        if from >= to {
            return "";
        }
        let source = self.source;
        &source[self.tokens[from].span.start..self.tokens[to - 1].span.end]
    }

    fn error_here(&self, msg: impl Into<String>) -> SyntaxError {
        let span = self
            .peek()
            .map(|token| token.span.clone())
            .unwrap_or(self.source.len()..self.source.len());
        SyntaxError::new(msg, span)
    }
}

/// Whether a line break between `prev` and `next` continues the current statement.
fn continues_line(prev: Kind, next: Kind) -> bool {
    matches!(
        prev,
        Kind::Operator
            | Kind::Equals
            | Kind::FatArrow
            | Kind::Comma
            | Kind::Colon
            | Kind::Dot
            | Kind::Question
            | Kind::Lt
            | Kind::Spread
            | Kind::At
    ) || matches!(
        next,
        Kind::Operator
            | Kind::Dot
            | Kind::FatArrow
            | Kind::Equals
            | Kind::Question
            | Kind::Colon
            | Kind::Gt
            | Kind::CurlyOpen
    )
}
