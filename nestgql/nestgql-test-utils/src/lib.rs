#![forbid(unsafe_code)]

use indexmap::IndexMap;
use nestgql_schema::Datamodel;
use nestgql_syntax::{parse_source, print_source};
use nestgql_synth::{
    GeneratedDeclaration, GenerationOutput, GeneratorConfig, NoExistingSources, Orchestrator,
    SynthError, merge, naming::TargetPath,
};
use tracing::info;

pub mod fixtures;

/// Workaround for `pretty_assertions::assert_eq` arguments appearing
/// in a (slightly?) unnatural order. The _expected_ expression ideally comes first,
/// in order to show the most sensible colored diff.
#[macro_export]
macro_rules! expect_eq {
    (expected = $expected:expr, actual = $actual:expr $(,)?) => {
        pretty_assertions::assert_eq!($expected, $actual);
    };
    (actual = $actual:expr, expected = $expected:expr $(,)?) => {
        pretty_assertions::assert_eq!($expected, $actual);
    };
}

#[macro_export]
macro_rules! assert_error_msg {
    ($e:expr, $msg:expr) => {
        match $e {
            Ok(v) => panic!("Expected error, was Ok({v:?})"),
            Err(e) => pretty_assertions::assert_eq!($msg, format!("{e}").trim()),
        }
    };
}

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A finished generation run over a test schema.
pub struct GeneratedTest {
    pub datamodel: Datamodel,
    pub output: GenerationOutput,
    pub texts: IndexMap<TargetPath, String>,
}

impl GeneratedTest {
    /// The rendered text of one target.
    #[track_caller]
    pub fn text(&self, path: &str) -> &str {
        match self.texts.get(&TargetPath::new(path)) {
            Some(text) => text,
            None => panic!(
                "target `{path}` was not generated, targets are: {:#?}",
                self.texts.keys().map(TargetPath::as_str).collect::<Vec<_>>()
            ),
        }
    }

    pub fn has_target(&self, path: &str) -> bool {
        self.texts.contains_key(&TargetPath::new(path))
    }

    #[track_caller]
    pub fn assert_no_failures(&self) -> &Self {
        let failures: Vec<String> = self
            .output
            .failures
            .iter()
            .map(ToString::to_string)
            .collect();
        pretty_assertions::assert_eq!(Vec::<String>::new(), failures);
        self
    }

    /// Failed artifact names with their error.
    pub fn failures(&self) -> Vec<(&str, &SynthError)> {
        self.output
            .failures
            .iter()
            .map(|failure| (failure.artifact.as_str(), &failure.error))
            .collect()
    }
}

pub trait TestGenerate: Sized {
    /// Generate every target from scratch with the default config.
    #[track_caller]
    fn generate(self) -> GeneratedTest {
        self.generate_with(&GeneratorConfig::default(), IndexMap::default())
    }

    /// Generate against existing target texts.
    #[track_caller]
    fn generate_with(
        self,
        config: &GeneratorConfig,
        existing: IndexMap<TargetPath, String>,
    ) -> GeneratedTest;
}

impl TestGenerate for Datamodel {
    fn generate_with(
        self,
        config: &GeneratorConfig,
        mut existing: IndexMap<TargetPath, String>,
    ) -> GeneratedTest {
        init_test_tracing();

        let output = if existing.is_empty() {
            Orchestrator::new(&self, config).run(&mut NoExistingSources)
        } else {
            Orchestrator::new(&self, config).run(&mut existing)
        };
        let texts = output.render();
        info!(
            files = texts.len(),
            failures = output.failures.len(),
            "generated test schema"
        );

        GeneratedTest {
            datamodel: self,
            output,
            texts,
        }
    }
}

impl TestGenerate for serde_json::Value {
    fn generate_with(
        self,
        config: &GeneratorConfig,
        existing: IndexMap<TargetPath, String>,
    ) -> GeneratedTest {
        datamodel(self).generate_with(config, existing)
    }
}

/// A datamodel from inline JSON.
#[track_caller]
pub fn datamodel(json: serde_json::Value) -> Datamodel {
    match Datamodel::from_json_value(json) {
        Ok(datamodel) => datamodel,
        Err(error) => panic!("invalid test schema: {error}"),
    }
}

/// Merge a generated declaration into source text and print the result.
#[track_caller]
pub fn merge_text(existing: &str, generated: &GeneratedDeclaration) -> Result<String, SynthError> {
    let source = match parse_source(existing) {
        Ok(source) => source,
        Err(error) => panic!("invalid test source: {error}"),
    };
    merge(&source, generated).map(|merged| print_source(&merged))
}
