use std::{fs, path::Path};

use assert_matches::assert_matches;
use indoc::indoc;
use nestgql_test_utils::fixtures;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use test_log::test;

use crate::{Catalog, Check, Command, Generate, Input, NestgqlError, purge, run_command};

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(schema: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("schema.json"), schema).unwrap();
        Self { dir }
    }

    fn input(&self) -> Input {
        Input {
            schema: self.dir.path().join("schema.json"),
            config: None,
        }
    }

    fn out(&self) -> std::path::PathBuf {
        self.dir.path().join("out")
    }

    fn generate(&self, purge: bool) -> Result<(), NestgqlError> {
        run_command(Command::Generate(Generate {
            input: self.input(),
            output: self.out(),
            purge,
        }))
    }

    fn check(&self) -> Result<(), NestgqlError> {
        run_command(Command::Check(Check {
            input: self.input(),
            output: self.out(),
        }))
    }

    fn read(&self, path: &str) -> String {
        fs::read_to_string(self.out().join(path)).unwrap()
    }

    fn write(&self, path: &str, text: &str) {
        let file = self.out().join(path);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, text).unwrap();
    }
}

#[test]
fn generate_then_check() {
    let workspace = Workspace::new(fixtures::BLOG);

    assert_matches!(workspace.check(), Err(NestgqlError::OutOfDate(n)) if n > 0);
    workspace.generate(false).unwrap();
    workspace.check().unwrap();

    assert!(workspace.read("user/user.model.ts").contains("export class User {"));
    assert!(workspace.read("prisma/role.enum.ts").contains("registerEnumType(Role,"));
}

#[test]
fn generate_merges_into_existing_files() {
    let workspace = Workspace::new(fixtures::BLOG);
    workspace.generate(false).unwrap();

    let edited = workspace
        .read("tag/tag.model.ts")
        .replace("export class Tag {\n", "export class Tag {\n    // kept\n    color?: string;\n\n");
    workspace.write("tag/tag.model.ts", &edited);
    assert_matches!(workspace.check(), Ok(()));

    workspace.generate(false).unwrap();
    assert_eq!(edited, workspace.read("tag/tag.model.ts"));
}

#[test]
fn check_reports_stale_targets() {
    let workspace = Workspace::new(fixtures::BLOG);
    workspace.generate(false).unwrap();

    let stale = workspace
        .read("user/user.model.ts")
        .replace("description: \"Shown on the profile page\"", "description: undefined");
    workspace.write("user/user.model.ts", &stale);
    fs::remove_file(workspace.out().join("prisma/sort-order.enum.ts")).unwrap();

    assert_matches!(workspace.check(), Err(NestgqlError::OutOfDate(2)));
}

#[test]
fn purge_discards_existing_files() {
    let workspace = Workspace::new(fixtures::BLOG);
    workspace.write("tag/tag.model.ts", "export interface Tag {}\n");
    workspace.write("legacy/old.input.ts", "export class Old {}\n");
    workspace.write("README.md", "# generated\n");

    assert_matches!(workspace.generate(false), Err(NestgqlError::GenerationFailed(1)));
    workspace.generate(true).unwrap();

    assert!(!workspace.out().join("legacy/old.input.ts").exists());
    assert!(workspace.out().join("README.md").exists());
    assert!(workspace.read("tag/tag.model.ts").contains("@ObjectType"));
}

#[test]
fn purge_of_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(purge(&dir.path().join("nothing")).unwrap(), 0);
}

#[test]
fn failed_artifacts_do_not_stop_other_targets() {
    let workspace = Workspace::new(indoc! {r#"
        {
            "models": [{
                "name": "Place",
                "fields": [
                    { "name": "id", "kind": "scalar", "type": "Int", "isRequired": true, "isId": true },
                    { "name": "area", "kind": "unsupported", "type": "geometry" }
                ]
            }]
        }
    "#});

    assert_matches!(workspace.generate(false), Err(NestgqlError::GenerationFailed(n)) if n > 0);
    assert!(!workspace.out().join("place/place.model.ts").exists());
    assert!(workspace.out().join("place/find-many-place.args.ts").exists());
}

#[test]
fn config_file() {
    let workspace = Workspace::new(fixtures::BLOG);
    let config = workspace.dir.path().join("config.json");
    fs::write(&config, r#"{ "sharedFolder": "common", "emitClassTransformer": false }"#).unwrap();

    run_command(Command::Generate(Generate {
        input: Input {
            config: Some(config),
            ..workspace.input()
        },
        output: workspace.out(),
        purge: false,
    }))
    .unwrap();

    let where_input = workspace.read("user/user-where.input.ts");
    assert!(where_input.contains("from '../common/string-filter.input';"));
    assert!(!where_input.contains("class-transformer"));
}

#[test]
fn invalid_config_file() {
    let workspace = Workspace::new(fixtures::BLOG);
    let config = workspace.dir.path().join("config.json");
    fs::write(&config, r#"{ "sharedFolder": 3 }"#).unwrap();

    let result = run_command(Command::Catalog(Catalog {
        input: Input {
            config: Some(config),
            ..workspace.input()
        },
    }));
    assert_matches!(result, Err(NestgqlError::Config { .. }));
}

#[test]
fn invalid_schema() {
    let workspace = Workspace::new(r#"{ "models": [{ "name": "A" }] }"#);
    assert_matches!(workspace.generate(false), Err(NestgqlError::Schema(_)));
    assert!(!Path::new(&workspace.out()).exists());
}

#[test]
fn catalog_lists_without_writing() {
    let workspace = Workspace::new(fixtures::DUMMY);
    run_command(Command::Catalog(Catalog {
        input: workspace.input(),
    }))
    .unwrap();
    assert!(!workspace.out().exists());
}
