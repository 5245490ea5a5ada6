//! Throwaway backend projects for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use errcontract_analysis::reporters::create_reporter;
use errcontract_analysis::{run, AnalysisReport};
use errcontract_core::config::ReportFormat;
use errcontract_core::errors::AnalysisError;
use errcontract_core::ContractConfig;
use tempfile::TempDir;

pub const TSCONFIG: &str = r#"{
  // backend build
  "compilerOptions": {
    "strict": true,
    "baseUrl": ".",
    "paths": { "@/*": ["src/*"] },
  },
  "include": ["src/**/*"],
}
"#;

pub const ENDPOINT_BASE: &str = r#"
export type IEndpointMeta = {
  readonly requireCredential?: boolean;
  readonly errors?: {
    readonly [key: string]: {
      readonly message: string;
      readonly code: string;
      readonly id: string;
    };
  };
};

export abstract class Endpoint<T extends IEndpointMeta, Ps> {
  public exec: (params: Ps) => Promise<unknown>;

  constructor(meta: T, paramDef: Ps, cb: (params: Ps) => Promise<unknown>) {
    this.exec = cb;
  }
}
"#;

pub const API_ERROR: &str = r#"
export class ApiError extends Error {
  public id: string;

  constructor(err?: { message: string; code: string; id: string }, info?: unknown) {
    super(err?.message ?? 'Internal error');
    this.id = err?.id ?? 'unknown';
  }
}
"#;

/// Meta block with ids `A` and `B`, for endpoints under `endpoints/<dir>/`.
pub const META_AB: &str = r#"
export const meta = {
  requireCredential: false,
  errors: {
    noSuchUser: { message: 'No such user.', code: 'NO_SUCH_USER', id: 'A' },
    suspended: { message: 'Suspended.', code: 'SUSPENDED', id: 'B' },
  },
} as const;

export const paramDef = { type: 'object', properties: {} } as const;
"#;

pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    /// Backend with build configuration, endpoint base and `ApiError`.
    pub fn new() -> Self {
        let fixture = Self {
            dir: TempDir::new().unwrap(),
        };
        fixture.write("tsconfig.json", TSCONFIG);
        fixture.write("src/server/api/endpoint-base.ts", ENDPOINT_BASE);
        fixture.write("src/server/api/error.ts", API_ERROR);
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn backend(&self) -> PathBuf {
        self.dir.path().join("packages/backend")
    }

    /// Write `content` at `rel`, relative to the backend package.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.backend().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Endpoint module at `src/server/api/endpoints/<name>.ts` (one level
    /// deep, e.g. `users/show`) with the `A`/`B` meta and `body` as the
    /// handler body.
    pub fn endpoint(&self, name: &str, body: &str) -> PathBuf {
        let source = format!(
            "import {{ Endpoint }} from '../../endpoint-base.js';\n\
             import {{ ApiError }} from '../../error.js';\n\
             {META_AB}\n\
             export default class extends Endpoint<typeof meta, typeof paramDef> {{\n\
             \x20 constructor() {{\n\
             \x20   super(meta, paramDef, async (ps) => {{\n\
             {body}\n\
             \x20   }});\n\
             \x20 }}\n\
             }}\n"
        );
        self.write(&format!("src/server/api/endpoints/{name}.ts"), &source)
    }

    pub fn run(&self) -> Result<AnalysisReport, AnalysisError> {
        self.run_with(ContractConfig::default())
    }

    pub fn run_with(&self, config: ContractConfig) -> Result<AnalysisReport, AnalysisError> {
        run(self.root(), config)
    }

    /// Console output of a successful run.
    pub fn console(&self) -> String {
        let report = self.run().unwrap();
        create_reporter(ReportFormat::Console)
            .generate(&report)
            .unwrap()
    }
}

/// 1-based line of the first line of `path` containing `needle`.
pub fn line_of(path: &Path, needle: &str) -> u32 {
    let text = std::fs::read_to_string(path).unwrap();
    text.lines()
        .position(|l| l.contains(needle))
        .map(|i| i as u32 + 1)
        .unwrap_or_else(|| panic!("`{needle}` not found in {}", path.display()))
}
