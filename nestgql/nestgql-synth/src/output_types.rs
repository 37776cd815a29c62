//! Argument bundles of the special `Query` and `Mutation` output types.

use nestgql_schema::{ArgDescriptor, Datamodel, OutputFieldDescriptor, ScalarKind};

use crate::{
    catalog::{ClassKind, Presence},
    config::GeneratorConfig,
    error::SynthError,
    naming::{self, FileType, TargetPath},
    synthesizer::{ClassBuilder, GeneratedDeclaration, SynthContext, TargetId},
    type_map::TypeTarget,
};

pub const SPECIAL_OUTPUT_TYPES: [&str; 2] = ["Query", "Mutation"];

/// The `@ArgsType` of one root field with arguments.
#[derive(Clone, Debug)]
pub struct OutputArgsRequest<'d> {
    pub output_type: &'d str,
    pub field: &'d OutputFieldDescriptor,
}

impl OutputArgsRequest<'_> {
    pub fn name(&self) -> String {
        format!("{}Args", naming::pascal(&self.field.name))
    }

    /// Target of a bundle the catalog does not already own, in the folder of the entity
    /// the field returns.
    pub fn target(&self, datamodel: &Datamodel, config: &GeneratorConfig) -> TargetPath {
        let owner = datamodel
            .entity(&self.field.output_type.name)
            .map(|entity| entity.name.as_str());
        naming::target_path(config, owner, &self.name(), FileType::Args)
    }
}

/// Every root field with arguments, in snapshot order.
pub fn output_args(datamodel: &Datamodel) -> Vec<OutputArgsRequest<'_>> {
    datamodel
        .output_types
        .iter()
        .filter(|output_type| SPECIAL_OUTPUT_TYPES.contains(&output_type.name.as_str()))
        .flat_map(|output_type| {
            output_type
                .fields
                .iter()
                .filter(|field| !field.args.is_empty())
                .map(|field| OutputArgsRequest {
                    output_type: &output_type.name,
                    field,
                })
        })
        .collect()
}

/// Synthesize the argument bundle into the target registered for its name.
pub fn synthesize_output_args(
    ctx: SynthContext,
    request: &OutputArgsRequest,
) -> Result<GeneratedDeclaration, SynthError> {
    let name = request.name();
    let artifact = ctx
        .registry
        .lookup(&name)
        .ok_or_else(|| SynthError::UnresolvedTypeReference(name.clone()))?;

    let target = TargetId {
        path: artifact.target.clone(),
        name,
    };
    let mut builder = ClassBuilder::new(ctx, ClassKind::ArgsType, target);
    for arg in &request.field.args {
        builder.property(
            &arg.name,
            arg_target(arg),
            arg.input_type.is_list,
            None,
            arg_presence(arg),
            None,
        )?;
    }

    Ok(builder.finish(None))
}

fn arg_target(arg: &ArgDescriptor) -> TypeTarget<'_> {
    match arg.input_type.name.parse::<ScalarKind>() {
        Ok(kind) => TypeTarget::Scalar(kind),
        Err(()) => TypeTarget::Artifact(&arg.input_type.name),
    }
}

fn arg_presence(arg: &ArgDescriptor) -> Presence {
    if arg.is_required {
        Presence::Required
    } else {
        Presence::Relaxed
    }
}
