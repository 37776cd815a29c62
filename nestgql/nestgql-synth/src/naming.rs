use std::fmt::Display;

use heck::{ToKebabCase, ToUpperCamelCase};
use itertools::Itertools;
use serde::Serialize;

use crate::config::GeneratorConfig;

/// An output file path, relative to the output directory, `/`-separated.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Debug)]
pub struct TargetPath(String);

impl TargetPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The module specifier that imports `self` from a file at `from`.
    pub fn module_specifier_from(&self, from: &TargetPath) -> String {
        let from_dirs: Vec<&str> = from.dirs().collect();
        let to_dirs: Vec<&str> = self.dirs().collect();
        let common = from_dirs
            .iter()
            .zip(&to_dirs)
            .take_while(|(a, b)| a == b)
            .count();

        let ups = from_dirs.len() - common;
        let mut specifier = if ups == 0 {
            "./".to_string()
        } else {
            "../".repeat(ups)
        };
        for dir in &to_dirs[common..] {
            specifier.push_str(dir);
            specifier.push('/');
        }
        specifier.push_str(self.stem());
        specifier
    }

    fn dirs(&self) -> impl Iterator<Item = &str> {
        let mut segments: Vec<&str> = self.0.split('/').collect();
        segments.pop();
        segments.into_iter().filter(|segment| !segment.is_empty() && *segment != ".")
    }

    /// File name without its `.ts` extension.
    fn stem(&self) -> &str {
        let file = self.0.rsplit('/').next().unwrap_or(&self.0);
        file.strip_suffix(".ts").unwrap_or(file)
    }
}

impl Display for TargetPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The `{type}` segment of a target path.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FileType {
    Model,
    Input,
    Args,
    Output,
    Enum,
}

impl FileType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Input => "input",
            Self::Args => "args",
            Self::Output => "output",
            Self::Enum => "enum",
        }
    }

    /// Declaration name suffix left out of file names.
    fn name_suffix(self) -> Option<&'static str> {
        match self {
            Self::Input => Some("Input"),
            Self::Args => Some("Args"),
            Self::Enum => Some("Enum"),
            Self::Model | Self::Output => None,
        }
    }
}

pub fn pascal(name: &str) -> String {
    name.to_upper_camel_case()
}

pub fn kebab(name: &str) -> String {
    name.to_kebab_case()
}

/// Render the configured file pattern for a declaration.
///
/// `owner` is the entity whose folder holds the declaration, `None` for the shared folder.
pub fn target_path(
    config: &GeneratorConfig,
    owner: Option<&str>,
    declaration: &str,
    file_type: FileType,
) -> TargetPath {
    let folder = match owner {
        Some(owner) => kebab(owner),
        None => config.shared_folder.clone(),
    };
    let stem = file_type
        .name_suffix()
        .and_then(|suffix| declaration.strip_suffix(suffix))
        .filter(|stem| !stem.is_empty())
        .unwrap_or(declaration);

    let rendered = config
        .output_file_pattern
        .replace("{model}", &folder)
        .replace("{name}", &kebab(stem))
        .replace("{type}", file_type.as_str());

    TargetPath(
        rendered
            .split('/')
            .filter(|segment| !segment.is_empty())
            .join("/"),
    )
}
