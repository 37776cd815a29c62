//! The declaration tree of one TypeScript source file.
//!
//! Only the parts the generator reads or rewrites are modelled structurally. Everything
//! else is kept as verbatim text so that hand-written code survives a parse/print cycle.

#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct SourceFile {
    pub items: Vec<Item>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Item {
    Import(ImportDecl),
    Class(ClassDecl),
    Enum(EnumDecl),
    Other(OtherItem),
    Comment(String),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ImportDecl {
    pub type_only: bool,
    pub default: Option<String>,
    pub namespace: Option<String>,
    pub named: Vec<ImportSpecifier>,
    pub module: String,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ImportSpecifier {
    pub name: String,
    pub alias: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ClassDecl {
    pub decorators: Vec<Decorator>,
    pub exported: bool,
    pub is_abstract: bool,
    pub name: String,
    /// `extends`/`implements` clauses and type parameters, verbatim.
    pub heritage: Option<String>,
    pub members: Vec<ClassMember>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ClassMember {
    Property(PropertyDecl),
    /// Methods, accessors, constructors and index signatures, verbatim.
    Other(String),
    Comment(String),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PropertyDecl {
    pub decorators: Vec<Decorator>,
    pub modifiers: Vec<String>,
    pub name: String,
    pub token: PropertyToken,
    pub ty: Option<String>,
    pub initializer: Option<String>,
    /// A comment on the same line, after the declaration.
    pub trailing_comment: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PropertyToken {
    None,
    /// `name?: T`
    Question,
    /// `name!: T`
    Exclamation,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Decorator {
    pub name: String,
    /// `None` for a bare `@Name`, otherwise the verbatim argument texts.
    pub arguments: Option<Vec<String>>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EnumDecl {
    pub exported: bool,
    pub is_const: bool,
    pub name: String,
    pub entries: Vec<EnumEntry>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum EnumEntry {
    Member(EnumMember),
    Comment(String),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EnumMember {
    pub name: String,
    pub initializer: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OtherItem {
    pub kind: OtherKind,
    pub name: Option<String>,
    pub text: String,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OtherKind {
    Interface,
    TypeAlias,
    Function,
    Variable,
    Statement,
}

impl SourceFile {
    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.items.iter().find_map(|item| match item {
            Item::Class(class) if class.name == name => Some(class),
            _ => None,
        })
    }

    pub fn enum_decl(&self, name: &str) -> Option<&EnumDecl> {
        self.items.iter().find_map(|item| match item {
            Item::Enum(enum_decl) if enum_decl.name == name => Some(enum_decl),
            _ => None,
        })
    }

    /// Index of the top-level item declaring `name`, if any.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.declared_name() == Some(name))
    }

    /// Names declared by top level items of this file.
    pub fn declared_names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(Item::declared_name)
    }

    /// Local names bound by import declarations.
    pub fn imported_names(&self) -> impl Iterator<Item = &str> {
        self.imports().flat_map(ImportDecl::local_names)
    }

    pub fn imports(&self) -> impl Iterator<Item = &ImportDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Import(import) => Some(import),
            _ => None,
        })
    }
}

impl Item {
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            Self::Class(class) => Some(&class.name),
            Self::Enum(enum_decl) => Some(&enum_decl.name),
            Self::Other(other) => other.name.as_deref(),
            Self::Import(_) | Self::Comment(_) => None,
        }
    }

    /// A short description of the kind of declaration, for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Import(_) => "import",
            Self::Class(_) => "class",
            Self::Enum(_) => "enum",
            Self::Other(other) => match other.kind {
                OtherKind::Interface => "interface",
                OtherKind::TypeAlias => "type alias",
                OtherKind::Function => "function",
                OtherKind::Variable => "variable",
                OtherKind::Statement => "statement",
            },
            Self::Comment(_) => "comment",
        }
    }
}

impl ImportDecl {
    pub fn named(names: impl IntoIterator<Item = String>, module: impl Into<String>) -> Self {
        Self {
            type_only: false,
            default: None,
            namespace: None,
            named: names
                .into_iter()
                .map(|name| ImportSpecifier { name, alias: None })
                .collect(),
            module: module.into(),
        }
    }

    pub fn is_relative(&self) -> bool {
        self.module.starts_with('.')
    }

    /// Plain named imports that can take more specifiers.
    pub fn is_extendable(&self) -> bool {
        !self.type_only && self.namespace.is_none()
    }

    pub fn local_names(&self) -> impl Iterator<Item = &str> {
        self.default
            .as_deref()
            .into_iter()
            .chain(self.namespace.as_deref())
            .chain(self.named.iter().map(ImportSpecifier::local_name))
    }
}

impl ImportSpecifier {
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl ClassDecl {
    pub fn property(&self, name: &str) -> Option<&PropertyDecl> {
        self.properties().find(|property| property.name == name)
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut PropertyDecl> {
        self.members.iter_mut().find_map(|member| match member {
            ClassMember::Property(property) if property.name == name => Some(property),
            _ => None,
        })
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyDecl> {
        self.members.iter().filter_map(|member| match member {
            ClassMember::Property(property) => Some(property),
            _ => None,
        })
    }

    pub fn decorator(&self, name: &str) -> Option<&Decorator> {
        self.decorators.iter().find(|decorator| decorator.name == name)
    }
}

impl PropertyDecl {
    pub fn decorator(&self, name: &str) -> Option<&Decorator> {
        self.decorators.iter().find(|decorator| decorator.name == name)
    }
}

impl Decorator {
    pub fn new(name: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Some(arguments),
        }
    }

    pub fn argument(&self, index: usize) -> Option<&str> {
        self.arguments.as_ref()?.get(index).map(String::as_str)
    }
}

impl EnumDecl {
    pub fn members(&self) -> impl Iterator<Item = &EnumMember> {
        self.entries.iter().filter_map(|entry| match entry {
            EnumEntry::Member(member) => Some(member),
            EnumEntry::Comment(_) => None,
        })
    }

    pub fn member_mut(&mut self, name: &str) -> Option<&mut EnumMember> {
        self.entries.iter_mut().find_map(|entry| match entry {
            EnumEntry::Member(member) if member.name == name => Some(member),
            _ => None,
        })
    }
}
