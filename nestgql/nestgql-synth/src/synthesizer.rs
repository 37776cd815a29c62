use nestgql_schema::{Datamodel, FieldDescriptor};
use tracing::trace;

use crate::{
    catalog::{self, ArtifactKind, ArtifactRequest, ClassKind, DeclarationKind, Presence, PropertyShape},
    config::GeneratorConfig,
    error::SynthError,
    imports::{CLASS_TRANSFORMER, ImportEntry, ImportOrigin, ImportRegistry},
    metadata::{self, DeclaredMetadata, FieldFacets},
    naming::TargetPath,
    registry::NameRegistry,
    type_map::{self, TypeRecord, TypeTarget},
};

/// Read-only state shared by every synthesis of a run.
#[derive(Clone, Copy)]
pub struct SynthContext<'a> {
    pub datamodel: &'a Datamodel,
    pub registry: &'a NameRegistry,
    pub config: &'a GeneratorConfig,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TargetId {
    pub path: TargetPath,
    pub name: String,
}

#[derive(Clone, PartialEq, Debug)]
pub struct GeneratedProperty {
    pub name: String,
    /// Property type annotation, e.g. `Array<Post>`.
    pub declared_type: String,
    pub facets: FieldFacets,
    /// Argument of the class-transformer `@Type` decorator, for nested inputs.
    pub transform: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GeneratedEnumMember {
    pub name: String,
    pub description: Option<String>,
}

/// One synthesized declaration, ready to be merged into its target file.
#[derive(Clone, PartialEq, Debug)]
pub struct GeneratedDeclaration {
    pub target: TargetId,
    pub kind: DeclarationKind,
    /// Declaration-level metadata. `None` leaves an existing description alone.
    pub entity_metadata: Option<DeclaredMetadata>,
    pub properties: Vec<GeneratedProperty>,
    pub enum_members: Vec<GeneratedEnumMember>,
    pub imports: Vec<ImportEntry>,
}

impl GeneratedDeclaration {
    pub fn name(&self) -> &str {
        &self.target.name
    }

    pub fn property(&self, name: &str) -> Option<&GeneratedProperty> {
        self.properties.iter().find(|property| property.name == name)
    }
}

/// Synthesize the declaration of one artifact.
pub fn synthesize(
    ctx: SynthContext,
    request: &ArtifactRequest,
) -> Result<GeneratedDeclaration, SynthError> {
    let name = request.name();
    let path = match ctx.registry.lookup(&name) {
        Some(artifact) => artifact.target.clone(),
        None => request.target(ctx.config),
    };
    let target = TargetId { path, name };
    let plan = catalog::plan(ctx.datamodel, request)?;

    match request.kind.declaration_kind() {
        DeclarationKind::Enum => {
            let entity_metadata = match request.kind {
                ArtifactKind::Enum => ctx
                    .datamodel
                    .enum_by_name(&request.subject)
                    .map(metadata::normalize_enum),
                _ => Some(undocumented(&target.name)),
            };

            let mut imports = ImportRegistry::for_declaration(&target.name, &target.path);
            imports.require("registerEnumType", &ImportOrigin::nestjs());

            Ok(GeneratedDeclaration {
                kind: DeclarationKind::Enum,
                entity_metadata,
                properties: vec![],
                enum_members: plan
                    .enum_members
                    .into_iter()
                    .map(|member| GeneratedEnumMember {
                        name: member.name.to_string(),
                        description: metadata::description(member.documentation),
                    })
                    .collect(),
                imports: imports.into_entries(),
                target,
            })
        }
        DeclarationKind::Class(class_kind) => {
            let entity_metadata = match request.kind {
                ArtifactKind::Model => ctx
                    .datamodel
                    .entity(&request.subject)
                    .map(metadata::normalize_entity),
                _ => Some(undocumented(&target.name)),
            };

            let mut builder = ClassBuilder::new(ctx, class_kind, target);
            for property in plan.properties {
                match property.shape {
                    PropertyShape::Field { field, identity } => {
                        let type_target = type_map::field_target(field, identity)?;
                        builder.property(
                            &property.name,
                            type_target,
                            field.is_list,
                            Some(field),
                            property.presence,
                            property.documentation,
                        )?;
                    }
                    PropertyShape::Reference { name, is_list } => {
                        builder.property(
                            &property.name,
                            TypeTarget::Artifact(&name),
                            is_list,
                            None,
                            property.presence,
                            property.documentation,
                        )?;
                    }
                    PropertyShape::Scalar { kind, is_list } => {
                        builder.property(
                            &property.name,
                            TypeTarget::Scalar(kind),
                            is_list,
                            None,
                            property.presence,
                            property.documentation,
                        )?;
                    }
                    PropertyShape::Flag => {
                        builder.property(
                            &property.name,
                            TypeTarget::Flag,
                            false,
                            None,
                            property.presence,
                            property.documentation,
                        )?;
                    }
                }
            }

            Ok(builder.finish(entity_metadata))
        }
    }
}

fn undocumented(name: &str) -> DeclaredMetadata {
    DeclaredMetadata {
        exposure_type: name.to_string(),
        nullable: false,
        description: None,
        default_value: None,
    }
}

/// Collects the properties and imports of one generated class.
pub(crate) struct ClassBuilder<'a> {
    ctx: SynthContext<'a>,
    class_kind: ClassKind,
    target: TargetId,
    imports: ImportRegistry,
    properties: Vec<GeneratedProperty>,
}

impl<'a> ClassBuilder<'a> {
    pub fn new(ctx: SynthContext<'a>, class_kind: ClassKind, target: TargetId) -> Self {
        let mut imports = ImportRegistry::for_declaration(&target.name, &target.path);
        imports.require("Field", &ImportOrigin::nestjs());
        imports.require(class_kind.decorator(), &ImportOrigin::nestjs());

        Self {
            ctx,
            class_kind,
            target,
            imports,
            properties: vec![],
        }
    }

    pub fn property(
        &mut self,
        name: &str,
        type_target: TypeTarget,
        is_list: bool,
        field: Option<&FieldDescriptor>,
        presence: Presence,
        documentation: Option<&str>,
    ) -> Result<(), SynthError> {
        let record = type_map::resolve(type_target, is_list, self.ctx.registry, self.ctx.config)?;
        let facets = match field {
            Some(field) => metadata::normalize_field(field, &record),
            None => metadata::synthetic_facets(&record, documentation),
        }
        .with_presence(presence);

        self.require_types(&record);

        let transform = self.transform(type_target, &record);
        if transform.is_some() {
            self.imports
                .require("Type", &ImportOrigin::Package(CLASS_TRANSFORMER.to_string()));
        }

        trace!(declaration = %self.target.name, property = name, ty = %record.declared_text(), "property");
        self.properties.push(GeneratedProperty {
            name: name.to_string(),
            declared_type: record.declared_text(),
            facets,
            transform,
        });
        Ok(())
    }

    pub fn finish(self, entity_metadata: Option<DeclaredMetadata>) -> GeneratedDeclaration {
        GeneratedDeclaration {
            target: self.target,
            kind: DeclarationKind::Class(self.class_kind),
            entity_metadata,
            properties: self.properties,
            enum_members: vec![],
            imports: self.imports.into_entries(),
        }
    }

    fn require_types(&mut self, record: &TypeRecord) {
        if let Some(origin) = &record.exposure_origin {
            self.imports.require(&record.exposure_type, origin);
        }
        if let Some(origin) = &record.declared_origin {
            self.imports.require(&record.declared_type, origin);
        }
    }

    /// Nested input objects of input and args classes need a runtime type for
    /// class-transformer.
    fn transform(&self, type_target: TypeTarget, record: &TypeRecord) -> Option<String> {
        if !self.ctx.config.emit_class_transformer || self.class_kind == ClassKind::ObjectType {
            return None;
        }
        let TypeTarget::Artifact(name) = type_target else {
            return None;
        };
        let artifact = self.ctx.registry.lookup(name)?;
        (artifact.kind == DeclarationKind::Class(ClassKind::InputType))
            .then(|| format!("() => {}", record.declared_type))
    }
}
