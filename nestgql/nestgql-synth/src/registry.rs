use indexmap::IndexMap;
use tracing::trace;

use crate::{catalog::DeclarationKind, error::SynthError, naming::TargetPath};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RegisteredArtifact {
    pub target: TargetPath,
    pub kind: DeclarationKind,
}

/// Every declaration name of a generation run and the file it is emitted to.
///
/// Filled completely before any declaration body is synthesized, so forward and cyclic
/// references resolve regardless of synthesis order.
#[derive(Default, Debug)]
pub struct NameRegistry {
    artifacts: IndexMap<String, RegisteredArtifact>,
}

impl NameRegistry {
    pub fn register(
        &mut self,
        name: &str,
        target: TargetPath,
        kind: DeclarationKind,
    ) -> Result<(), SynthError> {
        if let Some(existing) = self.artifacts.get(name) {
            return Err(SynthError::DuplicateDeclarationConflict {
                name: name.to_string(),
                existing: format!("{} in {}", existing.kind.describe(), existing.target),
                generated: format!("{} in {}", kind.describe(), target),
            });
        }

        trace!(name, %target, "register");
        self.artifacts
            .insert(name.to_string(), RegisteredArtifact { target, kind });
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&RegisteredArtifact> {
        self.artifacts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.artifacts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegisteredArtifact)> {
        self.artifacts
            .iter()
            .map(|(name, artifact)| (name.as_str(), artifact))
    }
}
