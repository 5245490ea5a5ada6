//! Project loading: build configuration, file discovery and import following.

mod common;

use common::Fixture;
use errcontract_analysis::project::{ImportTarget, Project};
use errcontract_core::errors::error_code;
use errcontract_core::{ContractConfig, ErrorCode};

fn load(fixture: &Fixture) -> Project {
    Project::load(fixture.root(), &ContractConfig::default()).unwrap()
}

fn relative_paths(fixture: &Fixture, project: &Project) -> Vec<String> {
    let backend = fixture.backend().canonicalize().unwrap();
    project
        .files()
        .map(|(_, f)| f.path.strip_prefix(&backend).unwrap().display().to_string())
        .collect()
}

#[test]
fn test_files_are_loaded_in_sorted_order() {
    let fixture = Fixture::new();
    fixture.write("src/z.ts", "export const z = 1;\n");
    fixture.write("src/a/b.tsx", "export const b = 1;\n");
    fixture.write("src/notes.md", "# not source\n");
    fixture.write("src/node_modules/dep/index.ts", "export const dep = 1;\n");

    let project = load(&fixture);
    assert_eq!(
        relative_paths(&fixture, &project),
        vec![
            "src/a/b.tsx",
            "src/server/api/endpoint-base.ts",
            "src/server/api/error.ts",
            "src/z.ts",
        ]
    );
    assert!(project.strict_null_checks());
}

#[test]
fn test_exclude_and_extends() {
    let fixture = Fixture::new();
    fixture.write(
        "tsconfig.base.json",
        r#"{
  /* shared options */
  "compilerOptions": { "strictNullChecks": false, "baseUrl": "." },
  "exclude": ["src/generated"]
}"#,
    );
    fixture.write(
        "tsconfig.json",
        r#"{ "extends": "./tsconfig.base", "include": ["src"] }"#,
    );
    fixture.write("src/generated/api.ts", "export const generated = 1;\n");
    fixture.write("src/kept.ts", "export const kept = 1;\n");

    let project = load(&fixture);
    let paths = relative_paths(&fixture, &project);
    assert!(paths.contains(&"src/kept.ts".to_string()));
    assert!(!paths.iter().any(|p| p.starts_with("src/generated")));
    assert!(!project.strict_null_checks());
}

#[test]
fn test_imports_outside_include_are_followed() {
    let fixture = Fixture::new();
    fixture.write(
        "tsconfig.json",
        r#"{ "compilerOptions": { "strict": true }, "files": ["src/server/api/endpoints/one.ts"] }"#,
    );
    fixture.write(
        "src/server/api/endpoints/one.ts",
        "import { Endpoint } from '../endpoint-base.js';\nimport { helper } from '../../lib/helper';\nexport default class extends Endpoint<{}, {}> {}\n",
    );
    fixture.write("src/server/lib/helper/index.ts", "export const helper = 1;\n");
    fixture.write("src/server/lib/unused.ts", "export const unused = 1;\n");

    let project = load(&fixture);
    let paths = relative_paths(&fixture, &project);
    assert_eq!(
        paths,
        vec![
            "src/server/api/endpoint-base.ts",
            "src/server/api/endpoints/one.ts",
            "src/server/lib/helper/index.ts",
        ]
    );

    let one = project
        .file_id(&fixture.backend().canonicalize().unwrap().join("src/server/api/endpoints/one.ts"))
        .unwrap();
    assert!(matches!(
        project.import_target(one, "../endpoint-base.js"),
        ImportTarget::File(_)
    ));
    assert_eq!(project.import_target(one, "lodash"), ImportTarget::Unresolved);
}

#[test]
fn test_follow_imports_can_be_disabled() {
    let fixture = Fixture::new();
    fixture.write(
        "tsconfig.json",
        r#"{ "files": ["src/server/api/endpoints/one.ts"] }"#,
    );
    fixture.write(
        "src/server/api/endpoints/one.ts",
        "import { Endpoint } from '../endpoint-base.js';\nexport default class extends Endpoint<{}, {}> {}\n",
    );
    let mut config = ContractConfig::default();
    config.project.follow_imports = Some(false);
    let project = Project::load(fixture.root(), &config).unwrap();
    assert_eq!(project.len(), 1);
}

#[test]
fn test_missing_build_configuration_is_fatal() {
    let fixture = Fixture::new();
    std::fs::remove_file(fixture.backend().join("tsconfig.json")).unwrap();
    let err = fixture.run().unwrap_err();
    assert_eq!(err.error_code(), error_code::PROJECT_LOAD_ERROR);
}

#[test]
fn test_invalid_build_configuration_is_fatal() {
    let fixture = Fixture::new();
    fixture.write("tsconfig.json", "{ \"include\": [ }");
    let err = fixture.run().unwrap_err();
    assert_eq!(err.error_code(), error_code::TSCONFIG_ERROR);
}

#[test]
fn test_extends_cycle_is_fatal() {
    let fixture = Fixture::new();
    fixture.write("tsconfig.json", r#"{ "extends": "./other.json" }"#);
    fixture.write("other.json", r#"{ "extends": "./tsconfig.json" }"#);
    let err = fixture.run().unwrap_err();
    assert_eq!(err.error_code(), error_code::TSCONFIG_ERROR);
}

#[test]
fn test_no_source_files_is_fatal() {
    let fixture = Fixture::new();
    fixture.write("tsconfig.json", r#"{ "include": ["nothing/**/*"] }"#);
    let err = fixture.run().unwrap_err();
    assert_eq!(err.error_code(), error_code::PROJECT_LOAD_ERROR);
}

#[test]
fn test_missing_root_is_fatal() {
    let err = Project::load(
        std::path::Path::new("/definitely/not/a/project/root"),
        &ContractConfig::default(),
    )
    .err()
    .unwrap();
    assert_eq!(err.error_code(), error_code::PROJECT_LOAD_ERROR);
}

#[test]
fn test_syntax_errors_are_tolerated() {
    let fixture = Fixture::new();
    let path = fixture.endpoint("broken/syntax", "      throw new Error('still found');");
    let mut source = std::fs::read_to_string(&path).unwrap();
    source.push_str("\n}\n");
    std::fs::write(&path, source).unwrap();

    let project = load(&fixture);
    let broken = project
        .files()
        .find(|(_, f)| f.path.ends_with("broken/syntax.ts"))
        .map(|(_, f)| f)
        .unwrap();
    assert!(broken.parse_errors > 0);

    let report = fixture.run().unwrap();
    assert_eq!(report.diagnostics.len(), 1);
}
