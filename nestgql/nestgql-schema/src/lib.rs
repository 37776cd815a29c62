#![forbid(unsafe_code)]

//! The normalized schema snapshot handed over by the schema introspector.
//!
//! Everything here is a read-only description of the data model. The shapes follow
//! Prisma's DMMF closely enough that a DMMF `datamodel` document (plus the `outputTypes`
//! of its schema) deserializes directly.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
mod tests;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid schema snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate model `{0}`")]
    DuplicateModel(String),
}

/// A complete snapshot of one schema, produced once per generation run.
#[derive(Clone, Default, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Datamodel {
    #[serde(default)]
    pub models: Vec<EntityDescriptor>,
    #[serde(default)]
    pub enums: Vec<EnumDescriptor>,
    /// Special output types (`Query`, `Mutation`) processed after all other artifacts.
    #[serde(default)]
    pub output_types: Vec<OutputTypeDescriptor>,
}

impl Datamodel {
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let datamodel: Self = serde_json::from_str(json)?;
        datamodel.check_unique_models()?;
        Ok(datamodel)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, SchemaError> {
        let datamodel: Self = serde_json::from_value(value)?;
        datamodel.check_unique_models()?;
        Ok(datamodel)
    }

    pub fn entity(&self, name: &str) -> Option<&EntityDescriptor> {
        self.models.iter().find(|model| model.name == name)
    }

    pub fn enum_by_name(&self, name: &str) -> Option<&EnumDescriptor> {
        self.enums.iter().find(|enum_desc| enum_desc.name == name)
    }

    /// The field on `target` that pairs with the relation field `field` of `entity`.
    ///
    /// Pairs share the relation name and point at each other. For a self relation the
    /// field itself is never its own opposite.
    pub fn opposite_relation_field<'d>(
        &'d self,
        entity: &EntityDescriptor,
        field: &FieldDescriptor,
    ) -> Option<&'d FieldDescriptor> {
        let target = self.entity(field.relation_target()?)?;
        target.relation_fields().find(|candidate| {
            candidate.relation_target() == Some(entity.name.as_str())
                && candidate.relation_name == field.relation_name
                && !(field.is_self_relation(&entity.name) && candidate.name == field.name)
        })
    }

    fn check_unique_models(&self) -> Result<(), SchemaError> {
        for (index, model) in self.models.iter().enumerate() {
            if self.models[..index].iter().any(|prev| prev.name == model.name) {
                return Err(SchemaError::DuplicateModel(model.name.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EntityDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub documentation: Option<String>,
}

impl EntityDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Scalar and enum fields, in declaration order.
    pub fn scalar_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|field| !field.is_relation())
    }

    pub fn relation_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|field| field.is_relation())
    }

    pub fn has_list_relations(&self) -> bool {
        self.relation_fields().any(|field| field.is_list)
    }

    pub fn has_numeric_fields(&self) -> bool {
        self.scalar_fields()
            .any(|field| !field.is_list && field.scalar_kind().is_some_and(ScalarKind::is_numeric))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Scalar,
    Enum,
    Object,
    Unsupported,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    /// Scalar name, enum name or related entity name depending on `kind`.
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub is_list: bool,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_id: bool,
    #[serde(default)]
    pub is_unique: bool,
    /// Foreign key scalars backing a relation.
    #[serde(default)]
    pub is_read_only: bool,
    #[serde(default)]
    pub is_updated_at: bool,
    #[serde(default)]
    pub has_default_value: bool,
    #[serde(default)]
    pub default: Option<DefaultValue>,
    #[serde(default)]
    pub relation_name: Option<String>,
    #[serde(default)]
    pub documentation: Option<String>,
}

impl FieldDescriptor {
    pub fn is_relation(&self) -> bool {
        self.kind == FieldKind::Object
    }

    pub fn relation_target(&self) -> Option<&str> {
        match self.kind {
            FieldKind::Object => Some(&self.type_name),
            _ => None,
        }
    }

    pub fn is_self_relation(&self, entity_name: &str) -> bool {
        self.relation_target() == Some(entity_name)
    }

    /// `None` for enums, relations and unrecognized scalar names.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self.kind {
            FieldKind::Scalar => self.type_name.parse().ok(),
            _ => None,
        }
    }

    pub fn literal_default(&self) -> Option<&Literal> {
        match &self.default {
            Some(DefaultValue::Literal(literal)) if self.has_default_value => Some(literal),
            _ => None,
        }
    }

    /// Identity values the database produces on its own.
    pub fn is_auto_generated(&self) -> bool {
        matches!(
            &self.default,
            Some(DefaultValue::Function(function))
                if function.name == "autoincrement" || function.name == "dbgenerated"
        )
    }

    /// Writable through the checked create/update inputs.
    pub fn is_writable(&self) -> bool {
        !self.is_read_only && !self.is_auto_generated()
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(untagged)]
pub enum DefaultValue {
    Literal(Literal),
    List(Vec<Literal>),
    Function(DefaultFunction),
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct DefaultFunction {
    pub name: String,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

/// The built-in scalar kinds of the data model.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum ScalarKind {
    String,
    Boolean,
    Int,
    Float,
    DateTime,
    Bytes,
    BigInt,
    Decimal,
    Json,
}

impl ScalarKind {
    pub const ALL: [Self; 9] = [
        Self::String,
        Self::Boolean,
        Self::Int,
        Self::Float,
        Self::DateTime,
        Self::Bytes,
        Self::BigInt,
        Self::Decimal,
        Self::Json,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Boolean => "Boolean",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::DateTime => "DateTime",
            Self::Bytes => "Bytes",
            Self::BigInt => "BigInt",
            Self::Decimal => "Decimal",
            Self::Json => "Json",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::BigInt | Self::Decimal)
    }

    /// Supports `lt`/`lte`/`gt`/`gte` filtering and min/max aggregation.
    pub fn is_ordered(self) -> bool {
        self.is_numeric() || matches!(self, Self::String | Self::DateTime)
    }
}

impl Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or(())
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EnumDescriptor {
    pub name: String,
    pub values: Vec<EnumValueDescriptor>,
    #[serde(default)]
    pub documentation: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EnumValueDescriptor {
    pub name: String,
    #[serde(default)]
    pub documentation: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OutputTypeDescriptor {
    pub name: String,
    pub fields: Vec<OutputFieldDescriptor>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OutputFieldDescriptor {
    pub name: String,
    pub output_type: TypeReference,
    #[serde(default)]
    pub args: Vec<ArgDescriptor>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ArgDescriptor {
    pub name: String,
    pub input_type: TypeReference,
    #[serde(default)]
    pub is_required: bool,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TypeReference {
    /// An artifact name, an entity name, an enum name or a scalar name.
    #[serde(rename = "type")]
    pub name: String,
    #[serde(default)]
    pub is_list: bool,
}
