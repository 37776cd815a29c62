use nestgql_syntax::SyntaxError;
use thiserror::Error;

use crate::naming::TargetPath;

/// A failure scoped to the synthesis of one artifact.
#[derive(Clone, PartialEq, Debug, Error)]
pub enum SynthError {
    #[error("field `{field}` has unsupported scalar kind `{kind}`")]
    UnsupportedScalarKind { field: String, kind: String },
    #[error("`{name}` is already declared as {existing}, cannot merge {generated}")]
    DuplicateDeclarationConflict {
        name: String,
        existing: String,
        generated: String,
    },
    #[error("relation target `{0}` is not an entity of the schema")]
    UnresolvedRelationTarget(String),
    #[error("type `{0}` does not name a registered declaration")]
    UnresolvedTypeReference(String),
    #[error("relation field `{entity}.{field}` has no opposite field on `{target}`")]
    UnpairedRelation {
        entity: String,
        field: String,
        target: String,
    },
    #[error("existing source {path} could not be parsed: {error}")]
    ExistingSource { path: TargetPath, error: SyntaxError },
}
