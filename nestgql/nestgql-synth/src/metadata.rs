//! Canonical decorator metadata of fields and entities.
//!
//! Everything here is a pure function of the schema descriptors, so regenerating from an
//! unchanged schema yields identical metadata.

use nestgql_schema::{EntityDescriptor, EnumDescriptor, FieldDescriptor, Literal};
use nestgql_syntax::options::ObjectLiteral;

use crate::{catalog::Presence, type_map::TypeRecord};

/// Metadata carried by a `@Field` or class-level decorator.
#[derive(Clone, PartialEq, Debug)]
pub struct DeclaredMetadata {
    /// Text of the exposure type, e.g. `Int` or `[Post]`.
    pub exposure_type: String,
    pub nullable: bool,
    /// `None` prints as `description: undefined`.
    pub description: Option<String>,
    pub default_value: Option<Literal>,
}

/// The two separately computed facets of one property.
#[derive(Clone, PartialEq, Debug)]
pub struct FieldFacets {
    /// Exposure-level metadata.
    pub metadata: DeclaredMetadata,
    /// Declaration-level optionality: `name?: T` rather than `name!: T`.
    pub optional: bool,
}

impl DeclaredMetadata {
    /// Options of a `@Field` decorator: `{ nullable, description[, defaultValue] }`.
    pub fn field_options(&self) -> ObjectLiteral {
        let mut options = ObjectLiteral::default();
        options.set("nullable", self.nullable.to_string());
        options.set("description", self.description_text());
        if let Some(default_value) = &self.default_value {
            options.set("defaultValue", literal_text(default_value));
        }
        options
    }

    /// Options of a class-level decorator: `{ description }`.
    pub fn entity_options(&self) -> ObjectLiteral {
        let mut options = ObjectLiteral::default();
        options.set("description", self.description_text());
        options
    }

    pub fn description_text(&self) -> String {
        match &self.description {
            Some(description) => quote(description),
            None => "undefined".to_string(),
        }
    }
}

impl FieldFacets {
    pub fn with_presence(mut self, presence: Presence) -> Self {
        match presence {
            Presence::Schema => {}
            Presence::Relaxed => {
                self.metadata.nullable = true;
                self.metadata.default_value = None;
                self.optional = true;
            }
            Presence::Required => {
                self.metadata.nullable = false;
                self.optional = false;
            }
            Presence::Omittable => {
                self.metadata.nullable = false;
                self.optional = true;
            }
        }
        self
    }
}

pub fn normalize_field(field: &FieldDescriptor, record: &TypeRecord) -> FieldFacets {
    FieldFacets {
        metadata: DeclaredMetadata {
            exposure_type: record.exposure_text(),
            nullable: !field.is_required,
            description: description(field.documentation.as_deref()),
            default_value: field.literal_default().cloned(),
        },
        optional: !field.is_required || field.has_default_value || field.is_updated_at,
    }
}

/// Facets of a property with no schema field behind it. Nullable and optional until a
/// presence says otherwise.
pub fn synthetic_facets(record: &TypeRecord, documentation: Option<&str>) -> FieldFacets {
    FieldFacets {
        metadata: DeclaredMetadata {
            exposure_type: record.exposure_text(),
            nullable: true,
            description: description(documentation),
            default_value: None,
        },
        optional: true,
    }
}

pub fn normalize_entity(entity: &EntityDescriptor) -> DeclaredMetadata {
    DeclaredMetadata {
        exposure_type: entity.name.clone(),
        nullable: false,
        description: description(entity.documentation.as_deref()),
        default_value: None,
    }
}

pub fn normalize_enum(enum_desc: &EnumDescriptor) -> DeclaredMetadata {
    DeclaredMetadata {
        exposure_type: enum_desc.name.clone(),
        nullable: false,
        description: description(enum_desc.documentation.as_deref()),
        default_value: None,
    }
}

/// Trimmed documentation, `None` when absent or blank.
pub fn description(documentation: Option<&str>) -> Option<String> {
    documentation
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

pub fn literal_text(literal: &Literal) -> String {
    match literal {
        Literal::Bool(value) => value.to_string(),
        Literal::Int(value) => value.to_string(),
        Literal::Float(value) => serde_json::Number::from_f64(*value)
            .map(|number| number.to_string())
            .unwrap_or_else(|| "undefined".to_string()),
        Literal::String(value) => quote(value),
    }
}

/// A double-quoted string literal.
pub fn quote(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}
