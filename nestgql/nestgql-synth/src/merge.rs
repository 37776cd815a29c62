//! Merging generated declarations into existing declaration trees.
//!
//! Only generated regions change: the `@Field` and `@Type` decorators of generated
//! properties, their `?`/`!` token and type annotation, the class decorator description,
//! enum member initializers and the `registerEnumType` call. Everything else in the file
//! is kept, including properties the generator never produced.

use itertools::Itertools;
use nestgql_syntax::{
    ast::{
        ClassDecl, ClassMember, Decorator, EnumDecl, EnumEntry, EnumMember, Item, OtherItem,
        OtherKind, PropertyDecl, PropertyToken, SourceFile,
    },
    options::ObjectLiteral,
};
use tracing::trace;

use crate::{
    catalog::{ClassKind, DeclarationKind},
    error::SynthError,
    imports::{ImportRegistry, insert_imports},
    metadata::{self, DeclaredMetadata},
    synthesizer::{GeneratedDeclaration, GeneratedEnumMember, GeneratedProperty},
};

/// Merge `generated` into `existing`, returning the new tree.
///
/// Merging the same declaration into its own output is a no-op.
pub fn merge(
    existing: &SourceFile,
    generated: &GeneratedDeclaration,
) -> Result<SourceFile, SynthError> {
    let name = generated.name();
    let mut source = existing.clone();

    match source.position_of(name) {
        Some(index) => {
            let item = &mut source.items[index];
            match (item, generated.kind) {
                (Item::Class(class), DeclarationKind::Class(class_kind)) => {
                    if let Some(existing_kind) = graphql_class_kind(class) {
                        if existing_kind != class_kind {
                            return Err(conflict(
                                generated,
                                DeclarationKind::Class(existing_kind).describe(),
                            ));
                        }
                    }
                    trace!(name, "merge into class");
                    merge_class(class, class_kind, generated);
                }
                (Item::Enum(enum_decl), DeclarationKind::Enum) => {
                    trace!(name, "merge into enum");
                    merge_enum(enum_decl, &generated.enum_members);
                }
                (item, _) => {
                    return Err(conflict(generated, item.describe().to_string()));
                }
            }
        }
        None => {
            trace!(name, "new declaration");
            let item = match generated.kind {
                DeclarationKind::Class(class_kind) => {
                    let mut class = ClassDecl {
                        decorators: vec![],
                        exported: true,
                        is_abstract: false,
                        name: name.to_string(),
                        heritage: None,
                        members: vec![],
                    };
                    merge_class(&mut class, class_kind, generated);
                    Item::Class(class)
                }
                DeclarationKind::Enum => {
                    let mut enum_decl = EnumDecl {
                        exported: true,
                        is_const: false,
                        name: name.to_string(),
                        entries: vec![],
                    };
                    merge_enum(&mut enum_decl, &generated.enum_members);
                    Item::Enum(enum_decl)
                }
            };
            source.items.push(item);
        }
    }

    if generated.kind == DeclarationKind::Enum {
        if let Some(metadata) = &generated.entity_metadata {
            register_enum_type(&mut source, name, metadata, &generated.enum_members);
        }
    }

    let mut imports = ImportRegistry::for_file(existing, &generated.target.path);
    imports.declare(name);
    for entry in &generated.imports {
        imports.require(&entry.symbol, &entry.origin);
    }
    insert_imports(&mut source, &generated.target.path, imports.into_entries());

    Ok(source)
}

fn conflict(generated: &GeneratedDeclaration, existing: String) -> SynthError {
    SynthError::DuplicateDeclarationConflict {
        name: generated.name().to_string(),
        existing,
        generated: generated.kind.describe(),
    }
}

fn graphql_class_kind(class: &ClassDecl) -> Option<ClassKind> {
    ClassKind::ALL
        .into_iter()
        .find(|kind| class.decorator(kind.decorator()).is_some())
}

fn merge_class(class: &mut ClassDecl, class_kind: ClassKind, generated: &GeneratedDeclaration) {
    let decorator_name = class_kind.decorator();
    if class.decorator(decorator_name).is_none() {
        class.decorators.push(Decorator::new(decorator_name, vec![]));
    }
    if let Some(metadata) = &generated.entity_metadata {
        if let Some(decorator) = class
            .decorators
            .iter_mut()
            .find(|decorator| decorator.name == decorator_name)
        {
            set_class_options(decorator, metadata);
        }
    }

    let class_name = class.name.clone();
    for property in &generated.properties {
        match class.property_mut(&property.name) {
            Some(existing) => {
                trace!(class = %class_name, property = %property.name, "update property");
                update_property(existing, property);
            }
            None => {
                trace!(class = %class_name, property = %property.name, "append property");
                let mut new = PropertyDecl {
                    decorators: vec![],
                    modifiers: vec![],
                    name: property.name.clone(),
                    token: PropertyToken::None,
                    ty: None,
                    initializer: None,
                    trailing_comment: None,
                };
                update_property(&mut new, property);
                class.members.push(ClassMember::Property(new));
            }
        }
    }
}

/// Rewrite `description` in the options argument of a class-level decorator.
///
/// The options object is the first argument, or the second when the first is an explicit
/// type name.
fn set_class_options(decorator: &mut Decorator, metadata: &DeclaredMetadata) {
    let arguments = decorator.arguments.get_or_insert_with(Vec::new);
    let options_index = match arguments.first() {
        None => None,
        Some(first) if ObjectLiteral::parse(first).is_some() => Some(0),
        Some(_) => Some(1),
    };

    match options_index {
        None => arguments.push(metadata.entity_options().to_string()),
        Some(index) => match arguments.get_mut(index) {
            Some(text) => {
                if let Some(mut options) = ObjectLiteral::parse(text) {
                    options.set("description", metadata.description_text());
                    *text = options.to_string();
                }
            }
            None => arguments.push(metadata.entity_options().to_string()),
        },
    }
}

fn update_property(property: &mut PropertyDecl, generated: &GeneratedProperty) {
    property.token = if generated.facets.optional {
        PropertyToken::Question
    } else {
        PropertyToken::Exclamation
    };
    property.ty = Some(generated.declared_type.clone());

    let metadata = &generated.facets.metadata;
    let type_fn = format!("() => {}", metadata.exposure_type);

    match property
        .decorators
        .iter()
        .position(|decorator| decorator.name == "Field")
    {
        Some(index) => {
            let decorator = &mut property.decorators[index];
            let arguments = decorator.arguments.get_or_insert_with(Vec::new);
            // `@Field({ ... })` has no type function
            let options_index = match arguments.first() {
                Some(first) if ObjectLiteral::parse(first).is_some() => 0,
                _ => 1,
            };
            let options = arguments
                .get(options_index)
                .and_then(|text| ObjectLiteral::parse(text))
                .map(|mut options| {
                    options.set("nullable", metadata.nullable.to_string());
                    options.set("description", metadata.description_text());
                    match &metadata.default_value {
                        Some(value) => options.set("defaultValue", metadata::literal_text(value)),
                        None => {
                            options.remove("defaultValue");
                        }
                    }
                    options
                })
                .unwrap_or_else(|| metadata.field_options());

            let rest = arguments.iter().skip(options_index + 1).cloned().collect_vec();
            *arguments = [type_fn, options.to_string()].into_iter().chain(rest).collect();
        }
        None => {
            property.decorators.insert(
                0,
                Decorator::new("Field", vec![type_fn, metadata.field_options().to_string()]),
            );
        }
    }

    if let Some(transform) = &generated.transform {
        let existing = property
            .decorators
            .iter_mut()
            .find(|decorator| decorator.name == "Type");
        match existing {
            Some(decorator) => decorator.arguments = Some(vec![transform.clone()]),
            None => {
                let field_index = property
                    .decorators
                    .iter()
                    .position(|decorator| decorator.name == "Field")
                    .map(|index| index + 1)
                    .unwrap_or(0);
                property
                    .decorators
                    .insert(field_index, Decorator::new("Type", vec![transform.clone()]));
            }
        }
    }
}

fn merge_enum(enum_decl: &mut EnumDecl, members: &[GeneratedEnumMember]) {
    for member in members {
        let initializer = metadata::quote(&member.name);
        match enum_decl.member_mut(&member.name) {
            Some(existing) => existing.initializer = Some(initializer),
            None => enum_decl.entries.push(EnumEntry::Member(EnumMember {
                name: member.name.clone(),
                initializer: Some(initializer),
            })),
        }
    }
}

/// Replace the `registerEnumType` call of `name`, or add one after the enum.
fn register_enum_type(
    source: &mut SourceFile,
    name: &str,
    metadata: &DeclaredMetadata,
    members: &[GeneratedEnumMember],
) {
    let mut options = ObjectLiteral::default();
    options.set("name", metadata::quote(name));
    options.set("description", metadata.description_text());

    let mut values_map = ObjectLiteral::default();
    for member in members {
        if let Some(description) = &member.description {
            let mut value = ObjectLiteral::default();
            value.set("description", metadata::quote(description));
            values_map.set(&member.name, value.to_string());
        }
    }
    if !values_map.is_empty() {
        options.set("valuesMap", values_map.to_string());
    }

    let statement = Item::Other(OtherItem {
        kind: OtherKind::Statement,
        name: None,
        text: format!("registerEnumType({name}, {options});"),
    });

    let existing = source.items.iter().position(|item| {
        matches!(item, Item::Other(other)
            if other.kind == OtherKind::Statement && registers_enum(&other.text, name))
    });

    match existing {
        Some(index) => source.items[index] = statement,
        None => {
            let index = source
                .position_of(name)
                .map(|index| index + 1)
                .unwrap_or(source.items.len());
            source.items.insert(index, statement);
        }
    }
}

/// Whether `statement` is a `registerEnumType` call whose first argument is `name`.
fn registers_enum(statement: &str, name: &str) -> bool {
    let Some(arguments) = statement
        .strip_prefix("registerEnumType")
        .and_then(|rest| rest.trim_start().strip_prefix('('))
    else {
        return false;
    };
    arguments
        .trim_start()
        .strip_prefix(name)
        .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_' || c == '$'))
}
