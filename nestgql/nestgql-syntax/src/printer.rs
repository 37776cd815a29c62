use std::fmt::Write;

use crate::ast::{
    ClassDecl, ClassMember, Decorator, EnumDecl, EnumEntry, ImportDecl, Item, PropertyDecl,
    PropertyToken, SourceFile,
};

const INDENT: &str = "    ";

/// Print a declaration tree in canonical layout.
///
/// Printing is deterministic and only depends on the tree, so a file printed by this
/// function parses back into the same tree and prints identically.
pub fn print_source(file: &SourceFile) -> String {
    let mut printer = Printer::default();
    let mut prev: Option<&Item> = None;

    for item in &file.items {
        if let Some(prev) = prev {
            let tight = matches!(prev, Item::Comment(_))
                || matches!((prev, item), (Item::Import(_), Item::Import(_)));
            if !tight {
                printer.out.push('\n');
            }
        }
        printer.item(item);
        prev = Some(item);
    }

    printer.out
}

pub fn print_decorator(decorator: &Decorator) -> String {
    match &decorator.arguments {
        Some(arguments) => format!("@{}({})", decorator.name, arguments.join(", ")),
        None => format!("@{}", decorator.name),
    }
}

pub fn print_import(import: &ImportDecl) -> String {
    let mut clauses = vec![];
    if let Some(default) = &import.default {
        clauses.push(default.clone());
    }
    if let Some(namespace) = &import.namespace {
        clauses.push(format!("* as {namespace}"));
    }
    if !import.named.is_empty() || clauses.is_empty() {
        let specifiers: Vec<String> = import
            .named
            .iter()
            .map(|specifier| match &specifier.alias {
                Some(alias) => format!("{} as {alias}", specifier.name),
                None => specifier.name.clone(),
            })
            .collect();
        if specifiers.is_empty() {
            clauses.push("{}".to_string());
        } else {
            clauses.push(format!("{{ {} }}", specifiers.join(", ")));
        }
    }

    format!(
        "import {}{} from '{}';",
        if import.type_only { "type " } else { "" },
        clauses.join(", "),
        import.module
    )
}

#[derive(Default)]
struct Printer {
    out: String,
}

impl Printer {
    fn item(&mut self, item: &Item) {
        match item {
            Item::Import(import) => {
                let text = print_import(import);
                self.line(0, &text);
            }
            Item::Class(class) => self.class(class),
            Item::Enum(enum_decl) => self.enum_decl(enum_decl),
            Item::Other(other) => self.line(0, &other.text),
            Item::Comment(comment) => self.line(0, comment),
        }
    }

    fn class(&mut self, class: &ClassDecl) {
        for decorator in &class.decorators {
            self.line(0, &print_decorator(decorator));
        }

        let mut header = String::new();
        if class.exported {
            header.push_str("export ");
        }
        if class.is_abstract {
            header.push_str("abstract ");
        }
        let _ = write!(header, "class {}", class.name);
        match &class.heritage {
            Some(heritage) if heritage.starts_with('<') => header.push_str(heritage),
            Some(heritage) => {
                let _ = write!(header, " {heritage}");
            }
            None => {}
        }

        if class.members.is_empty() {
            header.push_str(" {}");
            self.line(0, &header);
            return;
        }

        header.push_str(" {");
        self.line(0, &header);

        let mut prev: Option<&ClassMember> = None;
        for member in &class.members {
            if prev.is_some_and(|prev| !matches!(prev, ClassMember::Comment(_))) {
                self.out.push('\n');
            }
            match member {
                ClassMember::Property(property) => self.property(property),
                ClassMember::Other(text) | ClassMember::Comment(text) => self.line(1, text),
            }
            prev = Some(member);
        }

        self.line(0, "}");
    }

    fn property(&mut self, property: &PropertyDecl) {
        for decorator in &property.decorators {
            self.line(1, &print_decorator(decorator));
        }

        let mut text = String::new();
        for modifier in &property.modifiers {
            text.push_str(modifier);
            text.push(' ');
        }
        text.push_str(&property.name);
        match property.token {
            PropertyToken::None => {}
            PropertyToken::Question => text.push('?'),
            PropertyToken::Exclamation => text.push('!'),
        }
        if let Some(ty) = &property.ty {
            let _ = write!(text, ": {ty}");
        }
        if let Some(initializer) = &property.initializer {
            let _ = write!(text, " = {initializer}");
        }
        text.push(';');
        if let Some(comment) = &property.trailing_comment {
            let _ = write!(text, " {comment}");
        }

        self.line(1, &text);
    }

    fn enum_decl(&mut self, enum_decl: &EnumDecl) {
        let mut header = String::new();
        if enum_decl.exported {
            header.push_str("export ");
        }
        if enum_decl.is_const {
            header.push_str("const ");
        }
        let _ = write!(header, "enum {}", enum_decl.name);

        if enum_decl.entries.is_empty() {
            header.push_str(" {}");
            self.line(0, &header);
            return;
        }

        header.push_str(" {");
        self.line(0, &header);
        for entry in &enum_decl.entries {
            match entry {
                EnumEntry::Member(member) => match &member.initializer {
                    Some(initializer) => {
                        self.line(1, &format!("{} = {initializer},", member.name));
                    }
                    None => self.line(1, &format!("{},", member.name)),
                },
                EnumEntry::Comment(comment) => self.line(1, comment),
            }
        }
        self.line(0, "}");
    }

    /// Write `text` at `level`. Continuation lines of multi-line text are kept as they are.
    fn line(&mut self, level: usize, text: &str) {
        for _ in 0..level {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }
}
