//! The static rule table of artifacts derived from a schema.
//!
//! [catalog] lists every artifact of a schema, [plan] lays out the properties of one.
//! Both are pure functions of the datamodel.

use nestgql_schema::{Datamodel, EntityDescriptor, FieldDescriptor, FieldKind, ScalarKind};

use crate::{
    config::GeneratorConfig,
    error::SynthError,
    naming::{self, FileType, TargetPath},
    type_map,
};

/// Synthesis phases, in execution order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Phase {
    Model,
    Input,
    Args,
    Enum,
    /// Argument bundles of the special `Query`/`Mutation` output types.
    OutputTypes,
}

impl Phase {
    pub const ALL: [Self; 5] = [
        Self::Model,
        Self::Input,
        Self::Args,
        Self::Enum,
        Self::OutputTypes,
    ];
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ClassKind {
    ObjectType,
    InputType,
    ArgsType,
}

impl ClassKind {
    pub const ALL: [Self; 3] = [Self::ObjectType, Self::InputType, Self::ArgsType];

    /// Name of the class-level decorator.
    pub fn decorator(self) -> &'static str {
        match self {
            Self::ObjectType => "ObjectType",
            Self::InputType => "InputType",
            Self::ArgsType => "ArgsType",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DeclarationKind {
    Class(ClassKind),
    Enum,
}

impl DeclarationKind {
    pub fn describe(self) -> String {
        match self {
            Self::Class(class_kind) => format!("@{} class", class_kind.decorator()),
            Self::Enum => "enum".to_string(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ArtifactKind {
    Model,

    WhereInput,
    WhereUniqueInput,
    OrderByWithRelationInput,
    OrderByWithAggregationInput,
    OrderByRelationAggregateInput,
    ScalarWhereWithAggregatesInput,
    ListRelationFilter,
    RelationFilter,
    CreateInput,
    UncheckedCreateInput,
    CreateManyInput,
    UpdateInput,
    UncheckedUpdateInput,
    UpdateManyMutationInput,
    CountAggregateInput,
    MinAggregateInput,
    MaxAggregateInput,
    SumAggregateInput,
    AvgAggregateInput,

    CreateWithout,
    CreateOrConnectWithout,
    UpdateWithout,
    UpsertWithWhereUniqueWithout,
    UpdateWithWhereUniqueWithout,
    UpsertWithout,
    CreateNestedManyWithout,
    CreateNestedOneWithout,
    UpdateManyWithoutNested,
    UpdateOneWithoutNested,
    UpdateOneRequiredWithoutNested,

    FindUniqueArgs,
    FindFirstArgs,
    FindManyArgs,
    CreateOneArgs,
    CreateManyArgs,
    UpdateOneArgs,
    UpdateManyArgs,
    UpsertOneArgs,
    DeleteOneArgs,
    DeleteManyArgs,
    AggregateArgs,
    GroupByArgs,

    CountAggregate,
    MinAggregate,
    MaxAggregate,
    SumAggregate,
    AvgAggregate,
    Aggregate,
    GroupBy,
    Count,

    ScalarFieldEnum,

    /// Filter of one scalar kind, shared by all entities.
    ScalarFilter,
    /// Filter of one schema enum.
    EnumFilter,
    /// A schema enum.
    Enum,
    SortOrder,
}

use ArtifactKind as K;

const BASE_INPUTS: &[ArtifactKind] = &[
    K::WhereInput,
    K::WhereUniqueInput,
    K::OrderByWithRelationInput,
    K::OrderByWithAggregationInput,
    K::OrderByRelationAggregateInput,
    K::ScalarWhereWithAggregatesInput,
    K::ListRelationFilter,
    K::RelationFilter,
    K::CreateInput,
    K::UncheckedCreateInput,
    K::CreateManyInput,
    K::UpdateInput,
    K::UncheckedUpdateInput,
    K::UpdateManyMutationInput,
    K::CountAggregateInput,
    K::MinAggregateInput,
    K::MaxAggregateInput,
];

const NUMERIC_INPUTS: &[ArtifactKind] = &[K::SumAggregateInput, K::AvgAggregateInput];

const ARGS: &[ArtifactKind] = &[
    K::FindUniqueArgs,
    K::FindFirstArgs,
    K::FindManyArgs,
    K::CreateOneArgs,
    K::CreateManyArgs,
    K::UpdateOneArgs,
    K::UpdateManyArgs,
    K::UpsertOneArgs,
    K::DeleteOneArgs,
    K::DeleteManyArgs,
    K::AggregateArgs,
    K::GroupByArgs,
];

/// Relation-scoped variants of a field whose opposite field is a list.
pub const TO_MANY_FAMILY: &[ArtifactKind] = &[
    K::CreateWithout,
    K::CreateOrConnectWithout,
    K::UpdateWithout,
    K::UpsertWithWhereUniqueWithout,
    K::UpdateWithWhereUniqueWithout,
    K::CreateNestedManyWithout,
    K::UpdateManyWithoutNested,
];

/// Relation-scoped variants of a field whose opposite field is required and singular.
pub const TO_ONE_REQUIRED_FAMILY: &[ArtifactKind] = &[
    K::CreateWithout,
    K::CreateOrConnectWithout,
    K::UpdateWithout,
    K::UpsertWithout,
    K::CreateNestedOneWithout,
    K::UpdateOneRequiredWithoutNested,
];

/// Relation-scoped variants of a field whose opposite field is optional, or missing.
pub const TO_ONE_FAMILY: &[ArtifactKind] = &[
    K::CreateWithout,
    K::CreateOrConnectWithout,
    K::UpdateWithout,
    K::UpsertWithout,
    K::CreateNestedOneWithout,
    K::UpdateOneWithoutNested,
];

impl ArtifactKind {
    pub fn phase(self) -> Phase {
        match self.file_type() {
            FileType::Model => Phase::Model,
            FileType::Input => Phase::Input,
            FileType::Args | FileType::Output => Phase::Args,
            FileType::Enum => Phase::Enum,
        }
    }

    pub fn file_type(self) -> FileType {
        match self {
            K::Model => FileType::Model,
            K::FindUniqueArgs
            | K::FindFirstArgs
            | K::FindManyArgs
            | K::CreateOneArgs
            | K::CreateManyArgs
            | K::UpdateOneArgs
            | K::UpdateManyArgs
            | K::UpsertOneArgs
            | K::DeleteOneArgs
            | K::DeleteManyArgs
            | K::AggregateArgs
            | K::GroupByArgs => FileType::Args,
            K::CountAggregate
            | K::MinAggregate
            | K::MaxAggregate
            | K::SumAggregate
            | K::AvgAggregate
            | K::Aggregate
            | K::GroupBy
            | K::Count => FileType::Output,
            K::ScalarFieldEnum | K::Enum | K::SortOrder => FileType::Enum,
            _ => FileType::Input,
        }
    }

    pub fn declaration_kind(self) -> DeclarationKind {
        match self.file_type() {
            FileType::Model | FileType::Output => DeclarationKind::Class(ClassKind::ObjectType),
            FileType::Input => DeclarationKind::Class(ClassKind::InputType),
            FileType::Args => DeclarationKind::Class(ClassKind::ArgsType),
            FileType::Enum => DeclarationKind::Enum,
        }
    }

    /// Whether the artifact excludes one relation field of its entity.
    pub fn is_relation_scoped(self) -> bool {
        TO_MANY_FAMILY.contains(&self)
            || TO_ONE_REQUIRED_FAMILY.contains(&self)
            || TO_ONE_FAMILY.contains(&self)
    }

    /// Whether the artifact lives in the shared folder instead of an entity folder.
    pub fn is_shared(self) -> bool {
        matches!(self, K::ScalarFilter | K::EnumFilter | K::Enum | K::SortOrder)
    }
}

/// The declaration name of an artifact kind applied to `subject`.
///
/// `without` names the excluded relation field of relation-scoped kinds and is ignored
/// by all others.
pub fn declaration_name(kind: ArtifactKind, subject: &str, without: Option<&str>) -> String {
    let m = subject;
    let w = without.map(naming::pascal).unwrap_or_default();
    match kind {
        K::Model | K::Enum => m.to_string(),
        K::WhereInput => format!("{m}WhereInput"),
        K::WhereUniqueInput => format!("{m}WhereUniqueInput"),
        K::OrderByWithRelationInput => format!("{m}OrderByWithRelationInput"),
        K::OrderByWithAggregationInput => format!("{m}OrderByWithAggregationInput"),
        K::OrderByRelationAggregateInput => format!("{m}OrderByRelationAggregateInput"),
        K::ScalarWhereWithAggregatesInput => format!("{m}ScalarWhereWithAggregatesInput"),
        K::ListRelationFilter => format!("{m}ListRelationFilter"),
        K::RelationFilter => format!("{m}RelationFilter"),
        K::CreateInput => format!("{m}CreateInput"),
        K::UncheckedCreateInput => format!("{m}UncheckedCreateInput"),
        K::CreateManyInput => format!("{m}CreateManyInput"),
        K::UpdateInput => format!("{m}UpdateInput"),
        K::UncheckedUpdateInput => format!("{m}UncheckedUpdateInput"),
        K::UpdateManyMutationInput => format!("{m}UpdateManyMutationInput"),
        K::CountAggregateInput => format!("{m}CountAggregateInput"),
        K::MinAggregateInput => format!("{m}MinAggregateInput"),
        K::MaxAggregateInput => format!("{m}MaxAggregateInput"),
        K::SumAggregateInput => format!("{m}SumAggregateInput"),
        K::AvgAggregateInput => format!("{m}AvgAggregateInput"),
        K::CreateWithout => format!("{m}CreateWithout{w}Input"),
        K::CreateOrConnectWithout => format!("{m}CreateOrConnectWithout{w}Input"),
        K::UpdateWithout => format!("{m}UpdateWithout{w}Input"),
        K::UpsertWithWhereUniqueWithout => format!("{m}UpsertWithWhereUniqueWithout{w}Input"),
        K::UpdateWithWhereUniqueWithout => format!("{m}UpdateWithWhereUniqueWithout{w}Input"),
        K::UpsertWithout => format!("{m}UpsertWithout{w}Input"),
        K::CreateNestedManyWithout => format!("{m}CreateNestedManyWithout{w}Input"),
        K::CreateNestedOneWithout => format!("{m}CreateNestedOneWithout{w}Input"),
        K::UpdateManyWithoutNested => format!("{m}UpdateManyWithout{w}NestedInput"),
        K::UpdateOneWithoutNested => format!("{m}UpdateOneWithout{w}NestedInput"),
        K::UpdateOneRequiredWithoutNested => format!("{m}UpdateOneRequiredWithout{w}NestedInput"),
        K::FindUniqueArgs => format!("FindUnique{m}Args"),
        K::FindFirstArgs => format!("FindFirst{m}Args"),
        K::FindManyArgs => format!("FindMany{m}Args"),
        K::CreateOneArgs => format!("CreateOne{m}Args"),
        K::CreateManyArgs => format!("CreateMany{m}Args"),
        K::UpdateOneArgs => format!("UpdateOne{m}Args"),
        K::UpdateManyArgs => format!("UpdateMany{m}Args"),
        K::UpsertOneArgs => format!("UpsertOne{m}Args"),
        K::DeleteOneArgs => format!("DeleteOne{m}Args"),
        K::DeleteManyArgs => format!("DeleteMany{m}Args"),
        K::AggregateArgs => format!("{m}AggregateArgs"),
        K::GroupByArgs => format!("GroupBy{m}Args"),
        K::CountAggregate => format!("{m}CountAggregate"),
        K::MinAggregate => format!("{m}MinAggregate"),
        K::MaxAggregate => format!("{m}MaxAggregate"),
        K::SumAggregate => format!("{m}SumAggregate"),
        K::AvgAggregate => format!("{m}AvgAggregate"),
        K::Aggregate => format!("Aggregate{m}"),
        K::GroupBy => format!("{m}GroupBy"),
        K::Count => format!("{m}Count"),
        K::ScalarFieldEnum => format!("{m}ScalarFieldEnum"),
        K::ScalarFilter => format!("{m}Filter"),
        K::EnumFilter => format!("Enum{m}Filter"),
        K::SortOrder => "SortOrder".to_string(),
    }
}

/// One artifact to synthesize: an artifact kind applied to an entity, enum or scalar.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ArtifactRequest {
    /// The entity, enum or scalar kind the artifact derives from.
    pub subject: String,
    pub kind: ArtifactKind,
    /// The relation field excluded by a relation-scoped variant.
    pub without: Option<String>,
}

impl ArtifactRequest {
    pub fn new(subject: impl Into<String>, kind: ArtifactKind) -> Self {
        Self {
            subject: subject.into(),
            kind,
            without: None,
        }
    }

    pub fn without(subject: impl Into<String>, kind: ArtifactKind, field: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            kind,
            without: Some(field.into()),
        }
    }

    pub fn name(&self) -> String {
        declaration_name(self.kind, &self.subject, self.without.as_deref())
    }

    /// The entity whose folder holds the artifact.
    pub fn owner(&self) -> Option<&str> {
        if self.kind.is_shared() {
            None
        } else {
            Some(&self.subject)
        }
    }

    pub fn target(&self, config: &GeneratorConfig) -> TargetPath {
        naming::target_path(config, self.owner(), &self.name(), self.kind.file_type())
    }
}

/// The relation-scoped variants that a relation field of `entity` yields.
pub fn relation_family(
    datamodel: &Datamodel,
    entity: &EntityDescriptor,
    field: &FieldDescriptor,
) -> &'static [ArtifactKind] {
    match datamodel.opposite_relation_field(entity, field) {
        Some(opposite) if opposite.is_list => TO_MANY_FAMILY,
        Some(opposite) if opposite.is_required => TO_ONE_REQUIRED_FAMILY,
        _ => TO_ONE_FAMILY,
    }
}

/// Every artifact the schema derives, entity by entity, then the shared ones.
pub fn catalog(datamodel: &Datamodel) -> Vec<ArtifactRequest> {
    let mut requests = vec![];

    for entity in &datamodel.models {
        let name = &entity.name;
        let numeric = entity.has_numeric_fields();

        requests.push(ArtifactRequest::new(name, K::Model));

        for kind in BASE_INPUTS {
            requests.push(ArtifactRequest::new(name, *kind));
        }
        if numeric {
            for kind in NUMERIC_INPUTS {
                requests.push(ArtifactRequest::new(name, *kind));
            }
        }
        for field in entity.relation_fields() {
            for kind in relation_family(datamodel, entity, field) {
                requests.push(ArtifactRequest::without(name, *kind, &field.name));
            }
        }

        for kind in ARGS {
            requests.push(ArtifactRequest::new(name, *kind));
        }

        let mut outputs = vec![K::CountAggregate, K::MinAggregate, K::MaxAggregate];
        if numeric {
            outputs.extend([K::SumAggregate, K::AvgAggregate]);
        }
        outputs.extend([K::Aggregate, K::GroupBy]);
        if entity.has_list_relations() {
            outputs.push(K::Count);
        }
        for kind in outputs {
            requests.push(ArtifactRequest::new(name, kind));
        }

        requests.push(ArtifactRequest::new(name, K::ScalarFieldEnum));
    }

    let filterable = || {
        datamodel
            .models
            .iter()
            .flat_map(|entity| entity.scalar_fields())
            .filter(|field| !field.is_list)
    };
    for kind in ScalarKind::ALL {
        if filterable().any(|field| field.scalar_kind() == Some(kind)) {
            requests.push(ArtifactRequest::new(kind.name(), K::ScalarFilter));
        }
    }
    for enum_desc in &datamodel.enums {
        if filterable().any(|field| field.kind == FieldKind::Enum && field.type_name == enum_desc.name) {
            requests.push(ArtifactRequest::new(&enum_desc.name, K::EnumFilter));
        }
    }
    for enum_desc in &datamodel.enums {
        requests.push(ArtifactRequest::new(&enum_desc.name, K::Enum));
    }
    requests.push(ArtifactRequest::new("SortOrder", K::SortOrder));

    requests
}

/// How the requiredness facets of a property are decided.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Presence {
    /// From the schema field.
    Schema,
    /// Filter and patch shapes: nullable, optional, no default.
    Relaxed,
    Required,
    /// Never null, but may be left out.
    Omittable,
}

#[derive(Clone, PartialEq, Debug)]
pub enum PropertyShape<'d> {
    /// The schema field itself, through the type mapping table.
    Field {
        field: &'d FieldDescriptor,
        identity: bool,
    },
    /// A registered declaration by name.
    Reference { name: String, is_list: bool },
    Scalar { kind: ScalarKind, is_list: bool },
    Flag,
}

#[derive(Clone, PartialEq, Debug)]
pub struct PropertyPlan<'d> {
    pub name: String,
    pub shape: PropertyShape<'d>,
    pub presence: Presence,
    pub documentation: Option<&'d str>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EnumMemberPlan<'d> {
    pub name: &'d str,
    pub documentation: Option<&'d str>,
}

/// The body layout of one artifact.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct ArtifactPlan<'d> {
    pub properties: Vec<PropertyPlan<'d>>,
    pub enum_members: Vec<EnumMemberPlan<'d>>,
}

/// Lay out the body of one artifact.
///
/// Names of referenced artifacts are computed here. Relation references fail when the
/// target entity is missing, and relation-scoped references fail when the relation has
/// no opposite field to name the scope by.
pub fn plan<'d>(
    datamodel: &'d Datamodel,
    request: &ArtifactRequest,
) -> Result<ArtifactPlan<'d>, SynthError> {
    match request.kind {
        K::ScalarFilter => return scalar_filter_plan(request),
        K::EnumFilter => return Ok(enum_filter_plan(request)),
        K::Enum => {
            let enum_desc = datamodel
                .enum_by_name(&request.subject)
                .ok_or_else(|| SynthError::UnresolvedTypeReference(request.subject.clone()))?;
            return Ok(ArtifactPlan {
                properties: vec![],
                enum_members: enum_desc
                    .values
                    .iter()
                    .map(|value| EnumMemberPlan {
                        name: &value.name,
                        documentation: value.documentation.as_deref(),
                    })
                    .collect(),
            });
        }
        K::SortOrder => {
            return Ok(ArtifactPlan {
                properties: vec![],
                enum_members: ["asc", "desc"]
                    .into_iter()
                    .map(|name| EnumMemberPlan {
                        name,
                        documentation: None,
                    })
                    .collect(),
            });
        }
        _ => {}
    }

    let entity = datamodel
        .entity(&request.subject)
        .ok_or_else(|| SynthError::UnresolvedTypeReference(request.subject.clone()))?;

    let mut planner = Planner {
        datamodel,
        entity,
        request,
        plan: ArtifactPlan::default(),
    };
    planner.build()?;
    Ok(planner.plan)
}

struct Planner<'d, 'r> {
    datamodel: &'d Datamodel,
    entity: &'d EntityDescriptor,
    request: &'r ArtifactRequest,
    plan: ArtifactPlan<'d>,
}

impl<'d> Planner<'d, '_> {
    fn build(&mut self) -> Result<(), SynthError> {
        use Presence::*;

        match self.request.kind {
            K::Model => {
                let entity = self.entity;
                for field in &entity.fields {
                    self.push(
                        &field.name,
                        PropertyShape::Field {
                            field,
                            identity: true,
                        },
                        Schema,
                        field.documentation.as_deref(),
                    );
                }
                if entity.has_list_relations() {
                    self.own("_count", K::Count, false, Omittable);
                }
            }
            K::WhereInput | K::ScalarWhereWithAggregatesInput => {
                for op in ["AND", "OR", "NOT"] {
                    self.own(op, self.request.kind, true, Relaxed);
                }
                for field in self.filterable() {
                    let filter = filter_name(field)?;
                    self.reference(&field.name, filter, false, Relaxed, field);
                }
                if self.request.kind == K::WhereInput {
                    for field in self.relations() {
                        let kind = if field.is_list {
                            K::ListRelationFilter
                        } else {
                            K::RelationFilter
                        };
                        let name = self.related(field, kind, false)?;
                        self.reference(&field.name, name, false, Relaxed, field);
                    }
                }
            }
            K::WhereUniqueInput => {
                for field in self.scalars().filter(|field| field.is_id || field.is_unique) {
                    self.field(field, Relaxed);
                }
            }
            K::OrderByWithRelationInput => {
                for field in self.filterable() {
                    self.reference(&field.name, "SortOrder".into(), false, Relaxed, field);
                }
                for field in self.relations() {
                    let kind = if field.is_list {
                        K::OrderByRelationAggregateInput
                    } else {
                        K::OrderByWithRelationInput
                    };
                    let name = self.related(field, kind, false)?;
                    self.reference(&field.name, name, false, Relaxed, field);
                }
            }
            K::OrderByWithAggregationInput => {
                for field in self.filterable() {
                    self.reference(&field.name, "SortOrder".into(), false, Relaxed, field);
                }
            }
            K::OrderByRelationAggregateInput => {
                self.push(
                    "_count",
                    PropertyShape::Reference {
                        name: "SortOrder".into(),
                        is_list: false,
                    },
                    Relaxed,
                    None,
                );
            }
            K::ListRelationFilter => {
                for op in ["every", "some", "none"] {
                    self.own(op, K::WhereInput, false, Relaxed);
                }
            }
            K::RelationFilter => {
                for op in ["is", "isNot"] {
                    self.own(op, K::WhereInput, false, Relaxed);
                }
            }
            K::CreateInput | K::CreateWithout => {
                for field in self.scalars().filter(|field| field.is_writable()) {
                    self.field(field, Schema);
                }
                for field in self.relations() {
                    let kind = if field.is_list {
                        K::CreateNestedManyWithout
                    } else {
                        K::CreateNestedOneWithout
                    };
                    let name = self.related(field, kind, true)?;
                    let presence = if !field.is_list && field.is_required {
                        Required
                    } else {
                        Relaxed
                    };
                    self.reference(&field.name, name, false, presence, field);
                }
            }
            K::UncheckedCreateInput | K::CreateManyInput => {
                for field in self.scalars() {
                    self.field(field, Schema);
                }
            }
            K::UpdateInput | K::UpdateWithout => {
                for field in self.scalars().filter(|field| field.is_writable()) {
                    self.field(field, Relaxed);
                }
                for field in self.relations() {
                    let kind = if field.is_list {
                        K::UpdateManyWithoutNested
                    } else if field.is_required {
                        K::UpdateOneRequiredWithoutNested
                    } else {
                        K::UpdateOneWithoutNested
                    };
                    let name = self.related(field, kind, true)?;
                    self.reference(&field.name, name, false, Relaxed, field);
                }
            }
            K::UncheckedUpdateInput => {
                for field in self.scalars() {
                    self.field(field, Relaxed);
                }
            }
            K::UpdateManyMutationInput => {
                for field in self.scalars().filter(|field| field.is_writable()) {
                    self.field(field, Relaxed);
                }
            }
            K::CountAggregateInput => {
                self.push("_all", PropertyShape::Flag, Relaxed, None);
                for field in self.scalars() {
                    self.flag(field);
                }
            }
            K::MinAggregateInput | K::MaxAggregateInput => {
                for field in self.comparable() {
                    self.flag(field);
                }
            }
            K::SumAggregateInput | K::AvgAggregateInput => {
                for field in self.numeric() {
                    self.flag(field);
                }
            }
            K::CreateOrConnectWithout => {
                self.own("where", K::WhereUniqueInput, false, Required);
                self.scoped("create", K::CreateWithout, false, Required);
            }
            K::UpsertWithWhereUniqueWithout => {
                self.own("where", K::WhereUniqueInput, false, Required);
                self.scoped("update", K::UpdateWithout, false, Required);
                self.scoped("create", K::CreateWithout, false, Required);
            }
            K::UpdateWithWhereUniqueWithout => {
                self.own("where", K::WhereUniqueInput, false, Required);
                self.scoped("data", K::UpdateWithout, false, Required);
            }
            K::UpsertWithout => {
                self.scoped("update", K::UpdateWithout, false, Required);
                self.scoped("create", K::CreateWithout, false, Required);
            }
            K::CreateNestedManyWithout | K::CreateNestedOneWithout => {
                let is_list = self.request.kind == K::CreateNestedManyWithout;
                self.scoped("create", K::CreateWithout, is_list, Relaxed);
                self.scoped("connectOrCreate", K::CreateOrConnectWithout, is_list, Relaxed);
                self.own("connect", K::WhereUniqueInput, is_list, Relaxed);
            }
            K::UpdateManyWithoutNested => {
                self.scoped("create", K::CreateWithout, true, Relaxed);
                self.scoped("connectOrCreate", K::CreateOrConnectWithout, true, Relaxed);
                self.scoped("upsert", K::UpsertWithWhereUniqueWithout, true, Relaxed);
                for op in ["set", "disconnect", "delete", "connect"] {
                    self.own(op, K::WhereUniqueInput, true, Relaxed);
                }
                self.scoped("update", K::UpdateWithWhereUniqueWithout, true, Relaxed);
            }
            K::UpdateOneWithoutNested | K::UpdateOneRequiredWithoutNested => {
                self.scoped("create", K::CreateWithout, false, Relaxed);
                self.scoped("connectOrCreate", K::CreateOrConnectWithout, false, Relaxed);
                self.scoped("upsert", K::UpsertWithout, false, Relaxed);
                if self.request.kind == K::UpdateOneWithoutNested {
                    self.scalar("disconnect", ScalarKind::Boolean, Relaxed);
                    self.scalar("delete", ScalarKind::Boolean, Relaxed);
                }
                self.own("connect", K::WhereUniqueInput, false, Relaxed);
                self.scoped("update", K::UpdateWithout, false, Relaxed);
            }
            K::FindUniqueArgs | K::DeleteOneArgs => {
                self.own("where", K::WhereUniqueInput, false, Required);
            }
            K::FindFirstArgs | K::FindManyArgs => {
                self.own("where", K::WhereInput, false, Relaxed);
                self.own("orderBy", K::OrderByWithRelationInput, true, Relaxed);
                self.own("cursor", K::WhereUniqueInput, false, Relaxed);
                self.scalar("take", ScalarKind::Int, Relaxed);
                self.scalar("skip", ScalarKind::Int, Relaxed);
                self.own("distinct", K::ScalarFieldEnum, true, Relaxed);
            }
            K::CreateOneArgs => {
                self.own("data", K::CreateInput, false, Required);
            }
            K::CreateManyArgs => {
                self.own("data", K::CreateManyInput, true, Required);
                self.scalar("skipDuplicates", ScalarKind::Boolean, Relaxed);
            }
            K::UpdateOneArgs => {
                self.own("data", K::UpdateInput, false, Required);
                self.own("where", K::WhereUniqueInput, false, Required);
            }
            K::UpdateManyArgs => {
                self.own("data", K::UpdateManyMutationInput, false, Required);
                self.own("where", K::WhereInput, false, Relaxed);
            }
            K::UpsertOneArgs => {
                self.own("where", K::WhereUniqueInput, false, Required);
                self.own("create", K::CreateInput, false, Required);
                self.own("update", K::UpdateInput, false, Required);
            }
            K::DeleteManyArgs => {
                self.own("where", K::WhereInput, false, Relaxed);
            }
            K::AggregateArgs => {
                self.own("where", K::WhereInput, false, Relaxed);
                self.own("orderBy", K::OrderByWithRelationInput, true, Relaxed);
                self.own("cursor", K::WhereUniqueInput, false, Relaxed);
                self.scalar("take", ScalarKind::Int, Relaxed);
                self.scalar("skip", ScalarKind::Int, Relaxed);
                self.aggregate_selections(AGGREGATE_INPUTS);
            }
            K::GroupByArgs => {
                self.own("where", K::WhereInput, false, Relaxed);
                self.own("orderBy", K::OrderByWithAggregationInput, true, Relaxed);
                self.own("by", K::ScalarFieldEnum, true, Required);
                self.own("having", K::ScalarWhereWithAggregatesInput, false, Relaxed);
                self.scalar("take", ScalarKind::Int, Relaxed);
                self.scalar("skip", ScalarKind::Int, Relaxed);
                self.aggregate_selections(AGGREGATE_INPUTS);
            }
            K::CountAggregate => {
                for field in self.scalars() {
                    self.counter(&field.name, field.documentation.as_deref());
                }
                self.counter("_all", None);
            }
            K::MinAggregate | K::MaxAggregate => {
                for field in self.comparable() {
                    self.field(field, Relaxed);
                }
            }
            K::SumAggregate => {
                for field in self.numeric() {
                    self.field(field, Relaxed);
                }
            }
            K::AvgAggregate => {
                for field in self.numeric() {
                    let kind = match field.scalar_kind() {
                        Some(ScalarKind::Decimal) => ScalarKind::Decimal,
                        _ => ScalarKind::Float,
                    };
                    self.push(
                        &field.name,
                        PropertyShape::Scalar {
                            kind,
                            is_list: false,
                        },
                        Relaxed,
                        field.documentation.as_deref(),
                    );
                }
            }
            K::Aggregate => {
                self.aggregate_selections(AGGREGATE_OUTPUTS);
            }
            K::GroupBy => {
                for field in self.scalars() {
                    self.field(field, Schema);
                }
                self.aggregate_selections(AGGREGATE_OUTPUTS);
            }
            K::Count => {
                for field in self.relations().filter(|field| field.is_list) {
                    self.counter(&field.name, field.documentation.as_deref());
                }
            }
            K::ScalarFieldEnum => {
                let members = self
                    .scalars()
                    .map(|field| EnumMemberPlan {
                        name: &field.name,
                        documentation: None,
                    })
                    .collect();
                self.plan.enum_members = members;
            }
            K::ScalarFilter | K::EnumFilter | K::Enum | K::SortOrder => {}
        }

        Ok(())
    }

    fn scalars(&self) -> impl Iterator<Item = &'d FieldDescriptor> + use<'d> {
        self.entity.scalar_fields()
    }

    /// Scalars that take a filter or a sort order.
    fn filterable(&self) -> impl Iterator<Item = &'d FieldDescriptor> + use<'d> {
        self.scalars().filter(|field| !field.is_list)
    }

    /// Scalars that take part in min/max aggregation.
    fn comparable(&self) -> impl Iterator<Item = &'d FieldDescriptor> + use<'d> {
        self.filterable()
            .filter(|field| field.scalar_kind() != Some(ScalarKind::Json))
    }

    fn numeric(&self) -> impl Iterator<Item = &'d FieldDescriptor> + use<'d> {
        self.filterable()
            .filter(|field| field.scalar_kind().is_some_and(ScalarKind::is_numeric))
    }

    /// Relation fields, minus the one excluded by the request.
    fn relations(&self) -> impl Iterator<Item = &'d FieldDescriptor> + use<'d> {
        let without = self.request.without.clone();
        self.entity
            .relation_fields()
            .filter(move |field| Some(&field.name) != without.as_ref())
    }

    /// The name of an artifact of a relation target.
    ///
    /// Scoped artifacts exclude the field opposite to `field`.
    fn related(
        &self,
        field: &FieldDescriptor,
        kind: ArtifactKind,
        scoped: bool,
    ) -> Result<String, SynthError> {
        let target_name = field.relation_target().unwrap_or(&field.type_name);
        let target = self
            .datamodel
            .entity(target_name)
            .ok_or_else(|| SynthError::UnresolvedRelationTarget(target_name.to_string()))?;

        let without = if scoped {
            let opposite = self
                .datamodel
                .opposite_relation_field(self.entity, field)
                .ok_or_else(|| SynthError::UnpairedRelation {
                    entity: self.entity.name.clone(),
                    field: field.name.clone(),
                    target: target.name.clone(),
                })?;
            Some(opposite.name.as_str())
        } else {
            None
        };

        Ok(declaration_name(kind, &target.name, without))
    }

    fn aggregate_selections(&mut self, kinds: &[(&str, ArtifactKind)]) {
        let numeric = self.entity.has_numeric_fields();
        for (name, kind) in kinds {
            if !numeric && (NUMERIC_INPUTS.contains(kind) || NUMERIC_OUTPUTS.contains(kind)) {
                continue;
            }
            self.own(name, *kind, false, Presence::Relaxed);
        }
    }

    fn push(
        &mut self,
        name: &str,
        shape: PropertyShape<'d>,
        presence: Presence,
        documentation: Option<&'d str>,
    ) {
        self.plan.properties.push(PropertyPlan {
            name: name.to_string(),
            shape,
            presence,
            documentation,
        });
    }

    fn field(&mut self, field: &'d FieldDescriptor, presence: Presence) {
        self.push(
            &field.name,
            PropertyShape::Field {
                field,
                identity: false,
            },
            presence,
            field.documentation.as_deref(),
        );
    }

    fn flag(&mut self, field: &'d FieldDescriptor) {
        self.push(
            &field.name,
            PropertyShape::Flag,
            Presence::Relaxed,
            field.documentation.as_deref(),
        );
    }

    fn counter(&mut self, name: &str, documentation: Option<&'d str>) {
        self.push(
            name,
            PropertyShape::Scalar {
                kind: ScalarKind::Int,
                is_list: false,
            },
            Presence::Required,
            documentation,
        );
    }

    fn scalar(&mut self, name: &str, kind: ScalarKind, presence: Presence) {
        self.push(
            name,
            PropertyShape::Scalar {
                kind,
                is_list: false,
            },
            presence,
            None,
        );
    }

    fn reference(
        &mut self,
        name: &str,
        target: String,
        is_list: bool,
        presence: Presence,
        field: &'d FieldDescriptor,
    ) {
        self.push(
            name,
            PropertyShape::Reference {
                name: target,
                is_list,
            },
            presence,
            field.documentation.as_deref(),
        );
    }

    /// A property referencing another artifact of the same entity.
    fn own(&mut self, name: &str, kind: ArtifactKind, is_list: bool, presence: Presence) {
        let target = declaration_name(kind, &self.entity.name, None);
        self.push(
            name,
            PropertyShape::Reference {
                name: target,
                is_list,
            },
            presence,
            None,
        );
    }

    /// A property referencing another artifact of the same entity and relation scope.
    fn scoped(&mut self, name: &str, kind: ArtifactKind, is_list: bool, presence: Presence) {
        let target = declaration_name(kind, &self.entity.name, self.request.without.as_deref());
        self.push(
            name,
            PropertyShape::Reference {
                name: target,
                is_list,
            },
            presence,
            None,
        );
    }
}

const AGGREGATE_INPUTS: &[(&str, ArtifactKind)] = &[
    ("_count", K::CountAggregateInput),
    ("_min", K::MinAggregateInput),
    ("_max", K::MaxAggregateInput),
    ("_sum", K::SumAggregateInput),
    ("_avg", K::AvgAggregateInput),
];

const AGGREGATE_OUTPUTS: &[(&str, ArtifactKind)] = &[
    ("_count", K::CountAggregate),
    ("_min", K::MinAggregate),
    ("_max", K::MaxAggregate),
    ("_sum", K::SumAggregate),
    ("_avg", K::AvgAggregate),
];

const NUMERIC_OUTPUTS: &[ArtifactKind] = &[K::SumAggregate, K::AvgAggregate];

/// The filter artifact of a scalar or enum field.
fn filter_name(field: &FieldDescriptor) -> Result<String, SynthError> {
    match field.kind {
        FieldKind::Enum => Ok(declaration_name(K::EnumFilter, &field.type_name, None)),
        _ => {
            let kind = field
                .scalar_kind()
                .ok_or_else(|| type_map::unsupported(field))?;
            Ok(declaration_name(K::ScalarFilter, kind.name(), None))
        }
    }
}

fn scalar_filter_plan(request: &ArtifactRequest) -> Result<ArtifactPlan<'static>, SynthError> {
    let kind: ScalarKind =
        request
            .subject
            .parse()
            .map_err(|_| SynthError::UnsupportedScalarKind {
                field: request.name(),
                kind: request.subject.clone(),
            })?;

    let value = |name: &str, is_list: bool| PropertyPlan {
        name: name.to_string(),
        shape: PropertyShape::Scalar { kind, is_list },
        presence: Presence::Relaxed,
        documentation: None,
    };

    let mut properties = vec![value("equals", false)];
    if !matches!(kind, ScalarKind::Boolean | ScalarKind::Json) {
        properties.extend([value("in", true), value("notIn", true)]);
    }
    if kind.is_ordered() {
        properties.extend(["lt", "lte", "gt", "gte"].map(|name| value(name, false)));
    }
    if kind == ScalarKind::String {
        properties.extend(["contains", "startsWith", "endsWith"].map(|name| value(name, false)));
    }
    properties.push(PropertyPlan {
        name: "not".to_string(),
        shape: PropertyShape::Reference {
            name: request.name(),
            is_list: false,
        },
        presence: Presence::Relaxed,
        documentation: None,
    });

    Ok(ArtifactPlan {
        properties,
        enum_members: vec![],
    })
}

fn enum_filter_plan(request: &ArtifactRequest) -> ArtifactPlan<'static> {
    let value = |name: &str, is_list: bool, target: String| PropertyPlan {
        name: name.to_string(),
        shape: PropertyShape::Reference {
            name: target,
            is_list,
        },
        presence: Presence::Relaxed,
        documentation: None,
    };

    ArtifactPlan {
        properties: vec![
            value("equals", false, request.subject.clone()),
            value("in", true, request.subject.clone()),
            value("notIn", true, request.subject.clone()),
            value("not", false, request.name()),
        ],
        enum_members: vec![],
    }
}
