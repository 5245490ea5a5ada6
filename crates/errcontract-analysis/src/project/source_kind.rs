//! Source kind detection from file names.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Kinds of files that take part in a TypeScript program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// `.ts`, `.mts`, `.cts`
    TypeScript,
    /// `.tsx`
    Tsx,
    /// `.d.ts`, `.d.mts`, `.d.cts`
    Declaration,
}

impl SourceKind {
    /// Detect the kind from a path. Declaration files are recognized by
    /// their double extension.
    pub fn from_path(path: &Path) -> Option<SourceKind> {
        let name = path.file_name()?.to_str()?;
        if [".d.ts", ".d.mts", ".d.cts"]
            .iter()
            .any(|suffix| name.ends_with(suffix))
        {
            return Some(SourceKind::Declaration);
        }
        Self::from_extension(path.extension().and_then(|e| e.to_str()))
    }

    pub fn from_extension(ext: Option<&str>) -> Option<SourceKind> {
        match ext? {
            "ts" | "mts" | "cts" => Some(SourceKind::TypeScript),
            "tsx" => Some(SourceKind::Tsx),
            _ => None,
        }
    }

    /// Extensions tried, in order, when resolving an extensionless module
    /// specifier.
    pub fn resolution_extensions() -> &'static [&'static str] {
        &["ts", "tsx", "d.ts"]
    }

    pub fn is_declaration(&self) -> bool {
        matches!(self, SourceKind::Declaration)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::TypeScript => "TypeScript",
            SourceKind::Tsx => "TSX",
            SourceKind::Declaration => "declaration",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
