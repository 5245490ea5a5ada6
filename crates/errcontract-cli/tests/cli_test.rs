//! Exit status and output streams of the `errcontract` binary.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const TSCONFIG: &str = r#"{ "compilerOptions": { "strict": true }, "include": ["src/**/*"] }"#;

const ENDPOINT_BASE: &str = r#"
export abstract class Endpoint<T, Ps> {
  constructor(meta: T, paramDef: Ps, cb: (params: Ps) => Promise<unknown>) {}
}
"#;

const ENDPOINT: &str = r#"import { Endpoint } from '../endpoint-base.js';
import { ApiError } from '../error.js';

export const meta = {
  errors: {
    noSuchNote: { message: 'No such note.', code: 'NO_SUCH_NOTE', id: 'N' },
  },
} as const;

export default class extends Endpoint<typeof meta, {}> {
  constructor() {
    super(meta, {}, async () => {
      throw new ApiError(meta.errors.noSuchNote);
    });
  }
}
"#;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join("packages/backend").join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn project(endpoint: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "tsconfig.json", TSCONFIG);
    write(dir.path(), "src/server/api/endpoint-base.ts", ENDPOINT_BASE);
    write(
        dir.path(),
        "src/server/api/error.ts",
        "export class ApiError extends Error {}\n",
    );
    write(dir.path(), "src/server/api/endpoints/notes.ts", endpoint);
    dir
}

fn errcontract(root: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_errcontract"))
        .arg("--root")
        .arg(root)
        .args(extra)
        .env_remove("ERRCONTRACT_LOG")
        .env_remove("ERRCONTRACT_FORMAT")
        .env_remove("ERRCONTRACT_SCOPE")
        .env_remove("ERRCONTRACT_ERROR_CLASS")
        .env_remove("ERRCONTRACT_TSCONFIG")
        .env_remove("ERRCONTRACT_ENDPOINT_BASE")
        .output()
        .unwrap()
}

#[test]
fn test_clean_project_exits_zero() {
    let dir = project(ENDPOINT);
    let output = errcontract(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_violations_exit_one_on_stderr() {
    let dir = project(&ENDPOINT.replace("new ApiError(meta.errors.noSuchNote)", "new Error('x')"));
    let output = errcontract(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(
        stderr.contains("notes.ts:13 : instance of Error is thrown instead of ApiError"),
        "{stderr}"
    );
    assert!(output.stdout.is_empty());
}

#[test]
fn test_json_goes_to_stdout() {
    let dir = project(&ENDPOINT.replace("new ApiError(meta.errors.noSuchNote)", "new ApiError()"));
    let output = errcontract(dir.path(), &["--format", "json"]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("\"kind\": \"missing_argument\""), "{stdout}");
    assert!(stdout.contains("\"total\": 1"), "{stdout}");
}

#[test]
fn test_error_class_flag() {
    let dir = project(ENDPOINT);
    let output = errcontract(dir.path(), &["--error-class", "HttpError"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_fatal_errors_exit_two() {
    let dir = project("export class Broken extends Unknown {}\n");
    let output = errcontract(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("[AMBIGUOUS_BASE_SYMBOL]"), "{stderr}");

    let missing = errcontract(dir.path(), &["--tsconfig", "nope/tsconfig.json"]);
    assert_eq!(missing.status.code(), Some(2));

    let bad_scope = errcontract(dir.path(), &["--scope", "module"]);
    assert_eq!(bad_scope.status.code(), Some(2));
}
