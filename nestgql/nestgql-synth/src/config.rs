use serde::{Deserialize, Serialize};

pub const DEFAULT_OUTPUT_FILE_PATTERN: &str = "{model}/{name}.{type}.ts";

/// Generator settings. Every field has a default, so `{}` is a valid configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    /// Target path template with `{model}`, `{name}` and `{type}` placeholders.
    pub output_file_pattern: String,
    /// Folder of artifacts not owned by one entity.
    pub shared_folder: String,
    /// Emit `@Type(() => X)` from class-transformer on nested input properties.
    pub emit_class_transformer: bool,
    pub json_scalar_module: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_file_pattern: DEFAULT_OUTPUT_FILE_PATTERN.to_string(),
            shared_folder: "prisma".to_string(),
            emit_class_transformer: true,
            json_scalar_module: "graphql-type-json".to_string(),
        }
    }
}
