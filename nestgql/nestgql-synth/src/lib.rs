#![forbid(unsafe_code)]

//! Synthesis of NestJS GraphQL declarations from a schema snapshot.
//!
//! The [orchestrator::Orchestrator] registers every artifact of the [catalog], then
//! synthesizes and merges their bodies phase by phase.

pub mod catalog;
pub mod config;
pub mod error;
pub mod imports;
pub mod merge;
pub mod metadata;
pub mod naming;
pub mod orchestrator;
pub mod output_types;
pub mod registry;
pub mod synthesizer;
pub mod type_map;

pub use config::GeneratorConfig;
pub use error::SynthError;
pub use merge::merge;
pub use orchestrator::{
    ExistingSources, GenerationContext, GenerationFailure, GenerationOutput, NoExistingSources,
    Orchestrator,
};
pub use synthesizer::{GeneratedDeclaration, SynthContext, synthesize};
