use std::fmt::Display;

use fnv::FnvHashMap;
use indexmap::IndexMap;
use nestgql_schema::Datamodel;
use nestgql_syntax::{SyntaxError, ast::SourceFile, parse_source, print_source};
use tracing::{debug, debug_span, warn};

use crate::{
    catalog::{self, ArtifactRequest, ClassKind, DeclarationKind, Phase},
    config::GeneratorConfig,
    error::SynthError,
    merge::merge,
    naming::TargetPath,
    output_types::{self, OutputArgsRequest},
    registry::NameRegistry,
    synthesizer::{GeneratedDeclaration, SynthContext, synthesize},
};

/// Access to the current content of generation targets.
pub trait ExistingSources {
    /// The parsed target, or `None` when it does not exist yet.
    fn load(&mut self, path: &TargetPath) -> Result<Option<SourceFile>, SyntaxError>;
}

/// Every target starts out empty.
pub struct NoExistingSources;

impl ExistingSources for NoExistingSources {
    fn load(&mut self, _: &TargetPath) -> Result<Option<SourceFile>, SyntaxError> {
        Ok(None)
    }
}

/// Source texts by target path.
impl ExistingSources for IndexMap<TargetPath, String> {
    fn load(&mut self, path: &TargetPath) -> Result<Option<SourceFile>, SyntaxError> {
        self.get(path).map(|text| parse_source(text)).transpose()
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct GenerationFailure {
    /// Declaration name of the failed artifact.
    pub artifact: String,
    pub target: Option<TargetPath>,
    pub error: SynthError,
}

impl Display for GenerationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{} ({target}): {}", self.artifact, self.error),
            None => write!(f, "{}: {}", self.artifact, self.error),
        }
    }
}

/// State shared between phases, visible to phase listeners.
pub struct GenerationContext<'d> {
    pub datamodel: &'d Datamodel,
    pub config: &'d GeneratorConfig,
    pub registry: NameRegistry,
    /// Targets merged so far, in order of first merge.
    pub files: IndexMap<TargetPath, SourceFile>,
    pub failures: Vec<GenerationFailure>,
}

pub struct GenerationOutput {
    pub registry: NameRegistry,
    pub files: IndexMap<TargetPath, SourceFile>,
    pub failures: Vec<GenerationFailure>,
}

impl GenerationOutput {
    /// Every target printed in canonical layout.
    pub fn render(&self) -> IndexMap<TargetPath, String> {
        self.files
            .iter()
            .map(|(path, source)| (path.clone(), print_source(source)))
            .collect()
    }
}

type PhaseListener<'d> = Box<dyn FnMut(Phase, &GenerationContext<'d>) + 'd>;

/// Drives the synthesis of every artifact of one schema.
///
/// Every artifact name is registered before any body is synthesized. Bodies are then
/// synthesized phase by phase, and listeners run after each phase.
pub struct Orchestrator<'d> {
    datamodel: &'d Datamodel,
    config: &'d GeneratorConfig,
    listeners: Vec<PhaseListener<'d>>,
}

/// An artifact that passed registration.
enum Planned<'d> {
    Catalog(ArtifactRequest),
    OutputArgs(OutputArgsRequest<'d>),
}

impl Planned<'_> {
    fn name(&self) -> String {
        match self {
            Self::Catalog(request) => request.name(),
            Self::OutputArgs(request) => request.name(),
        }
    }

    fn phase(&self) -> Phase {
        match self {
            Self::Catalog(request) => request.kind.phase(),
            Self::OutputArgs(_) => Phase::OutputTypes,
        }
    }
}

impl<'d> Orchestrator<'d> {
    pub fn new(datamodel: &'d Datamodel, config: &'d GeneratorConfig) -> Self {
        Self {
            datamodel,
            config,
            listeners: vec![],
        }
    }

    pub fn on_phase(mut self, listener: impl FnMut(Phase, &GenerationContext<'d>) + 'd) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Register every artifact name with its target.
    pub fn register(&self) -> (NameRegistry, Vec<GenerationFailure>) {
        let (registry, _, failures) = self.register_planned();
        (registry, failures)
    }

    fn register_planned(&self) -> (NameRegistry, Vec<Planned<'d>>, Vec<GenerationFailure>) {
        let _entered = debug_span!("register").entered();

        let mut registry = NameRegistry::default();
        let mut planned = vec![];
        let mut failures = vec![];

        for request in catalog::catalog(self.datamodel) {
            let name = request.name();
            let target = request.target(self.config);
            match registry.register(&name, target.clone(), request.kind.declaration_kind()) {
                Ok(()) => planned.push(Planned::Catalog(request)),
                Err(error) => failures.push(failure(name, Some(target), error)),
            }
        }

        let args_kind = DeclarationKind::Class(ClassKind::ArgsType);
        for request in output_types::output_args(self.datamodel) {
            let name = request.name();
            let result = match registry.lookup(&name) {
                Some(artifact) if artifact.kind == args_kind => Ok(()),
                Some(artifact) => Err(SynthError::DuplicateDeclarationConflict {
                    name: name.clone(),
                    existing: format!("{} in {}", artifact.kind.describe(), artifact.target),
                    generated: args_kind.describe(),
                }),
                None => {
                    registry.register(&name, request.target(self.datamodel, self.config), args_kind)
                }
            };
            match result {
                Ok(()) => planned.push(Planned::OutputArgs(request)),
                Err(error) => failures.push(failure(name, None, error)),
            }
        }

        debug!(count = registry.len(), "registered");
        (registry, planned, failures)
    }

    pub fn run(&mut self, sources: &mut dyn ExistingSources) -> GenerationOutput {
        let (registry, planned, failures) = self.register_planned();

        let mut context = GenerationContext {
            datamodel: self.datamodel,
            config: self.config,
            registry,
            files: IndexMap::default(),
            failures,
        };
        let mut existing: FnvHashMap<TargetPath, Result<SourceFile, SyntaxError>> =
            FnvHashMap::default();

        for phase in Phase::ALL {
            let _entered = debug_span!("phase", ?phase).entered();

            for artifact in planned.iter().filter(|artifact| artifact.phase() == phase) {
                let name = artifact.name();
                debug!(artifact = %name, "synthesize");

                let ctx = SynthContext {
                    datamodel: self.datamodel,
                    registry: &context.registry,
                    config: self.config,
                };
                let result = match artifact {
                    Planned::Catalog(request) => synthesize(ctx, request),
                    Planned::OutputArgs(request) => {
                        output_types::synthesize_output_args(ctx, request)
                    }
                }
                .and_then(|generated| {
                    merge_into_target(&mut context.files, &mut existing, &mut *sources, &generated)
                });

                if let Err(error) = result {
                    let target = context.registry.lookup(&name).map(|a| a.target.clone());
                    let failure = failure(name, target, error);
                    warn!("{failure}");
                    context.failures.push(failure);
                }
            }

            for listener in &mut self.listeners {
                listener(phase, &context);
            }
        }

        GenerationOutput {
            registry: context.registry,
            files: context.files,
            failures: context.failures,
        }
    }
}

fn failure(artifact: String, target: Option<TargetPath>, error: SynthError) -> GenerationFailure {
    GenerationFailure {
        artifact,
        target,
        error,
    }
}

/// Merge into the current state of the target, loading it on first use.
///
/// The target only enters `files` when the merge succeeds.
fn merge_into_target(
    files: &mut IndexMap<TargetPath, SourceFile>,
    existing: &mut FnvHashMap<TargetPath, Result<SourceFile, SyntaxError>>,
    sources: &mut dyn ExistingSources,
    generated: &GeneratedDeclaration,
) -> Result<(), SynthError> {
    let path = &generated.target.path;

    let merged = match files.get(path) {
        Some(current) => merge(current, generated)?,
        None => {
            let base = existing.entry(path.clone()).or_insert_with(|| {
                debug!(%path, "load existing");
                sources.load(path).map(Option::unwrap_or_default)
            });
            match base {
                Ok(source) => merge(source, generated)?,
                Err(error) => {
                    return Err(SynthError::ExistingSource {
                        path: path.clone(),
                        error: error.clone(),
                    });
                }
            }
        }
    };

    files.insert(path.clone(), merged);
    Ok(())
}
