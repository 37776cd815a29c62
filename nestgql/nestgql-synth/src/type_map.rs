use nestgql_schema::{FieldDescriptor, FieldKind, ScalarKind};

use crate::{
    config::GeneratorConfig,
    error::SynthError,
    imports::ImportOrigin,
    registry::NameRegistry,
};

/// What a property's type refers to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TypeTarget<'a> {
    Scalar(ScalarKind),
    /// An identity field of an entity type, exposed as `ID`.
    Identity(ScalarKind),
    Enum(&'a str),
    /// The entity type of a relation target.
    Entity(&'a str),
    /// Any other registered declaration.
    Artifact(&'a str),
    /// An aggregate selection flag.
    Flag,
}

/// Declared and exposure types of a property, with their origins.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TypeRecord {
    pub declared_type: String,
    pub declared_origin: Option<ImportOrigin>,
    pub exposure_type: String,
    pub exposure_origin: Option<ImportOrigin>,
    pub is_list: bool,
}

impl TypeRecord {
    fn new(declared_type: &str, exposure_type: &str, exposure_origin: Option<ImportOrigin>) -> Self {
        Self {
            declared_type: declared_type.to_string(),
            declared_origin: None,
            exposure_type: exposure_type.to_string(),
            exposure_origin,
            is_list: false,
        }
    }

    fn named(name: &str, origin: ImportOrigin) -> Self {
        Self {
            declared_type: name.to_string(),
            declared_origin: Some(origin.clone()),
            exposure_type: name.to_string(),
            exposure_origin: Some(origin),
            is_list: false,
        }
    }

    /// The property type annotation.
    pub fn declared_text(&self) -> String {
        if self.is_list {
            format!("Array<{}>", self.declared_type)
        } else {
            self.declared_type.clone()
        }
    }

    /// The body of the `@Field` type function.
    pub fn exposure_text(&self) -> String {
        if self.is_list {
            format!("[{}]", self.exposure_type)
        } else {
            self.exposure_type.clone()
        }
    }
}

pub fn scalar_record(kind: ScalarKind, config: &GeneratorConfig) -> TypeRecord {
    match kind {
        ScalarKind::String => TypeRecord::new("string", "String", None),
        ScalarKind::Boolean => TypeRecord::new("boolean", "Boolean", None),
        ScalarKind::Int => TypeRecord::new("number", "Int", Some(ImportOrigin::nestjs())),
        ScalarKind::Float => TypeRecord::new("number", "Float", Some(ImportOrigin::nestjs())),
        ScalarKind::DateTime => TypeRecord::new("Date | string", "String", None),
        ScalarKind::Bytes => TypeRecord::new("Buffer", "String", None),
        ScalarKind::BigInt => TypeRecord::new("bigint | number", "String", None),
        ScalarKind::Decimal => TypeRecord::new("string", "String", None),
        ScalarKind::Json => TypeRecord::new(
            "any",
            "GraphQLJSON",
            Some(ImportOrigin::Package(config.json_scalar_module.clone())),
        ),
    }
}

/// The type target of a schema field. `identity` applies to the entity type only.
pub fn field_target(field: &FieldDescriptor, identity: bool) -> Result<TypeTarget<'_>, SynthError> {
    match field.kind {
        FieldKind::Scalar => {
            let kind = field.scalar_kind().ok_or_else(|| unsupported(field))?;
            Ok(if identity && field.is_id {
                TypeTarget::Identity(kind)
            } else {
                TypeTarget::Scalar(kind)
            })
        }
        FieldKind::Enum => Ok(TypeTarget::Enum(&field.type_name)),
        FieldKind::Object => Ok(TypeTarget::Entity(&field.type_name)),
        FieldKind::Unsupported => Err(unsupported(field)),
    }
}

pub fn unsupported(field: &FieldDescriptor) -> SynthError {
    SynthError::UnsupportedScalarKind {
        field: field.name.clone(),
        kind: field.type_name.clone(),
    }
}

pub fn resolve(
    target: TypeTarget,
    is_list: bool,
    registry: &NameRegistry,
    config: &GeneratorConfig,
) -> Result<TypeRecord, SynthError> {
    let mut record = match target {
        TypeTarget::Scalar(kind) => scalar_record(kind, config),
        TypeTarget::Identity(kind) => TypeRecord {
            exposure_type: "ID".to_string(),
            exposure_origin: Some(ImportOrigin::nestjs()),
            ..scalar_record(kind, config)
        },
        TypeTarget::Flag => TypeRecord::new("true", "Boolean", None),
        TypeTarget::Entity(name) => {
            let artifact = registry
                .lookup(name)
                .ok_or_else(|| SynthError::UnresolvedRelationTarget(name.to_string()))?;
            TypeRecord::named(name, ImportOrigin::Target(artifact.target.clone()))
        }
        TypeTarget::Enum(name) | TypeTarget::Artifact(name) => {
            let artifact = registry
                .lookup(name)
                .ok_or_else(|| SynthError::UnresolvedTypeReference(name.to_string()))?;
            TypeRecord::named(name, ImportOrigin::Target(artifact.target.clone()))
        }
    };
    record.is_list = is_list;
    Ok(record)
}
