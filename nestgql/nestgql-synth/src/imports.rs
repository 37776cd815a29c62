use fnv::FnvHashSet;
use indexmap::IndexMap;
use nestgql_syntax::ast::{ImportDecl, ImportSpecifier, Item, SourceFile};
use tracing::trace;

use crate::naming::TargetPath;

pub const NESTJS_GRAPHQL: &str = "@nestjs/graphql";
pub const CLASS_TRANSFORMER: &str = "class-transformer";

/// Where an imported symbol comes from.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ImportOrigin {
    Package(String),
    /// Another generated target.
    Target(TargetPath),
}

impl ImportOrigin {
    pub fn nestjs() -> Self {
        Self::Package(NESTJS_GRAPHQL.to_string())
    }

    pub fn module_specifier(&self, from: &TargetPath) -> String {
        match self {
            Self::Package(package) => package.clone(),
            Self::Target(path) => path.module_specifier_from(from),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ImportEntry {
    pub symbol: String,
    pub origin: ImportOrigin,
}

/// Deduplicated imports of one output file.
///
/// A symbol is recorded at most once, and never when the file itself declares it or
/// already imports it.
pub struct ImportRegistry {
    file: TargetPath,
    local: FnvHashSet<String>,
    imported: FnvHashSet<String>,
    entries: IndexMap<String, ImportEntry>,
}

impl ImportRegistry {
    /// A registry for a fresh declaration named `declaration` in the file at `file`.
    pub fn for_declaration(declaration: &str, file: &TargetPath) -> Self {
        let mut registry = Self {
            file: file.clone(),
            local: Default::default(),
            imported: Default::default(),
            entries: Default::default(),
        };
        registry.declare(declaration);
        registry
    }

    /// A registry seeded with the declared and imported names of an existing file.
    pub fn for_file(source: &SourceFile, file: &TargetPath) -> Self {
        Self {
            file: file.clone(),
            local: source.declared_names().map(str::to_string).collect(),
            imported: source.imported_names().map(str::to_string).collect(),
            entries: Default::default(),
        }
    }

    pub fn declare(&mut self, symbol: &str) {
        self.local.insert(symbol.to_string());
    }

    pub fn is_locally_declared(&self, symbol: &str) -> bool {
        self.local.contains(symbol)
    }

    pub fn require(&mut self, symbol: &str, origin: &ImportOrigin) {
        if self.local.contains(symbol)
            || self.imported.contains(symbol)
            || self.entries.contains_key(symbol)
        {
            return;
        }
        if matches!(origin, ImportOrigin::Target(path) if *path == self.file) {
            return;
        }

        trace!(symbol, ?origin, "import");
        self.entries.insert(
            symbol.to_string(),
            ImportEntry {
                symbol: symbol.to_string(),
                origin: origin.clone(),
            },
        );
    }

    /// The missing imports, in first-use order.
    pub fn into_entries(self) -> Vec<ImportEntry> {
        self.entries.into_values().collect()
    }
}

/// Insert `entries` into `source` as import declarations of the file at `file`.
///
/// Symbols join a plain named import of the same module when there is one. New import
/// declarations go to their sorted position: packages first, then relative modules.
pub fn insert_imports(source: &mut SourceFile, file: &TargetPath, entries: Vec<ImportEntry>) {
    let mut by_module: IndexMap<String, Vec<String>> = IndexMap::new();
    for entry in entries {
        by_module
            .entry(entry.origin.module_specifier(file))
            .or_default()
            .push(entry.symbol);
    }

    for (module, symbols) in by_module {
        let existing = source.items.iter_mut().find_map(|item| match item {
            Item::Import(import) if import.module == module && import.is_extendable() => {
                Some(import)
            }
            _ => None,
        });

        match existing {
            Some(import) => {
                import.named.extend(
                    symbols
                        .into_iter()
                        .map(|name| ImportSpecifier { name, alias: None }),
                );
            }
            None => {
                let import = ImportDecl::named(symbols, module);
                let index = insert_position(source, &import);
                source.items.insert(index, Item::Import(import));
            }
        }
    }
}

fn insert_position(source: &SourceFile, new: &ImportDecl) -> usize {
    let key = (new.is_relative(), new.module.as_str());
    let mut last_import = None;

    for (index, item) in source.items.iter().enumerate() {
        if let Item::Import(import) = item {
            if (import.is_relative(), import.module.as_str()) > key {
                return index;
            }
            last_import = Some(index);
        }
    }

    match last_import {
        Some(index) => index + 1,
        None => source
            .items
            .iter()
            .position(|item| !matches!(item, Item::Comment(_)))
            .unwrap_or(source.items.len()),
    }
}
