//! Module specifier resolution.

use std::path::{Component, Path, PathBuf};

use super::source_kind::SourceKind;
use super::tsconfig::CompilerOptions;

/// Where an import specifier leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleTarget {
    /// A source file on disk.
    File(PathBuf),
    /// A bare package specifier that is not mapped into the project.
    External,
    /// A relative or mapped specifier whose file does not exist.
    Missing,
}

/// Resolves specifiers the way the compiler's bundler-style resolution does
/// for project sources: relative paths, `paths` aliases, then `baseUrl`.
#[derive(Debug, Clone, Default)]
pub struct ModuleResolver {
    base_url: Option<PathBuf>,
    paths_base: Option<PathBuf>,
    /// `(prefix, suffix, targets)` for each `paths` entry; patterns without a
    /// wildcard have an empty suffix and match exactly.
    mappings: Vec<PathMapping>,
}

#[derive(Debug, Clone)]
struct PathMapping {
    prefix: String,
    suffix: String,
    wildcard: bool,
    targets: Vec<String>,
}

impl PathMapping {
    /// The text captured by `*`, when `specifier` matches.
    fn capture<'s>(&self, specifier: &'s str) -> Option<&'s str> {
        if !self.wildcard {
            return (specifier == self.prefix).then_some("");
        }
        if specifier.len() < self.prefix.len() + self.suffix.len() {
            return None;
        }
        specifier
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.suffix.as_str())
    }
}

impl ModuleResolver {
    pub fn new(options: &CompilerOptions) -> Self {
        let mut mappings: Vec<PathMapping> = options
            .paths
            .iter()
            .map(|(pattern, targets)| match pattern.split_once('*') {
                Some((prefix, suffix)) => PathMapping {
                    prefix: prefix.to_string(),
                    suffix: suffix.to_string(),
                    wildcard: true,
                    targets: targets.clone(),
                },
                None => PathMapping {
                    prefix: pattern.clone(),
                    suffix: String::new(),
                    wildcard: false,
                    targets: targets.clone(),
                },
            })
            .collect();
        // Exact patterns first, then the longest prefix wins.
        mappings.sort_by(|a, b| {
            a.wildcard
                .cmp(&b.wildcard)
                .then(b.prefix.len().cmp(&a.prefix.len()))
        });
        Self {
            base_url: options.base_url.clone(),
            paths_base: options.paths_base.clone(),
            mappings,
        }
    }

    pub fn is_relative(specifier: &str) -> bool {
        specifier == "."
            || specifier == ".."
            || specifier.starts_with("./")
            || specifier.starts_with("../")
            || specifier.starts_with('/')
    }

    /// Resolve `specifier` imported from `from_file`.
    pub fn resolve(&self, specifier: &str, from_file: &Path) -> ModuleTarget {
        if Self::is_relative(specifier) {
            let dir = from_file.parent().unwrap_or(Path::new(""));
            return match resolve_candidate(&dir.join(specifier)) {
                Some(path) => ModuleTarget::File(path),
                None => ModuleTarget::Missing,
            };
        }

        if let Some(paths_base) = &self.paths_base {
            for mapping in &self.mappings {
                let Some(captured) = mapping.capture(specifier) else {
                    continue;
                };
                for target in &mapping.targets {
                    let substituted = target.replacen('*', captured, 1);
                    if let Some(path) = resolve_candidate(&paths_base.join(substituted)) {
                        return ModuleTarget::File(path);
                    }
                }
                // The first matching pattern decides.
                return ModuleTarget::Missing;
            }
        }

        if let Some(base_url) = &self.base_url {
            if let Some(path) = resolve_candidate(&base_url.join(specifier)) {
                return ModuleTarget::File(path);
            }
        }

        ModuleTarget::External
    }
}

/// Try `candidate` as a file (with extension substitution), then as a
/// directory with an index file.
fn resolve_candidate(candidate: &Path) -> Option<PathBuf> {
    let candidate = normalize_path(candidate);

    if candidate.is_file() && SourceKind::from_path(&candidate).is_some() {
        return Some(candidate);
    }

    // Emitted-extension specifiers point at their sources.
    let substitutions: &[&str] = match candidate.extension().and_then(|e| e.to_str()) {
        Some("js") | Some("jsx") => &["ts", "tsx", "d.ts"],
        Some("mjs") => &["mts", "d.mts"],
        Some("cjs") => &["cts", "d.cts"],
        _ => &[],
    };
    for ext in substitutions {
        let path = candidate.with_extension(ext);
        if path.is_file() {
            return Some(path);
        }
    }

    for ext in SourceKind::resolution_extensions() {
        let mut with_ext = candidate.clone().into_os_string();
        with_ext.push(".");
        with_ext.push(ext);
        let path = PathBuf::from(with_ext);
        if path.is_file() {
            return Some(path);
        }
    }

    if candidate.is_dir() {
        for ext in SourceKind::resolution_extensions() {
            let index = candidate.join(format!("index.{ext}"));
            if index.is_file() {
                return Some(index);
            }
        }
    }
    None
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. Symlinks are not consulted.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize_path(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_relative_resolution_with_js_extension() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("lib")).unwrap();
        fs::write(src.join("a.ts"), "").unwrap();
        fs::write(src.join("b.ts"), "").unwrap();
        fs::write(src.join("lib/index.ts"), "").unwrap();

        let resolver = ModuleResolver::default();
        let from = src.join("a.ts");
        assert_eq!(resolver.resolve("./b.js", &from), ModuleTarget::File(src.join("b.ts")));
        assert_eq!(resolver.resolve("./b", &from), ModuleTarget::File(src.join("b.ts")));
        assert_eq!(
            resolver.resolve("./lib", &from),
            ModuleTarget::File(src.join("lib/index.ts"))
        );
        assert_eq!(resolver.resolve("./nope.js", &from), ModuleTarget::Missing);
        assert_eq!(resolver.resolve("typeorm", &from), ModuleTarget::External);
    }

    #[test]
    fn test_paths_mapping() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/misc")).unwrap();
        fs::write(dir.path().join("src/misc/id.ts"), "").unwrap();

        let mut paths = BTreeMap::new();
        paths.insert("@/*".to_string(), vec!["src/*".to_string()]);
        let options = CompilerOptions {
            paths,
            paths_base: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let resolver = ModuleResolver::new(&options);
        let from = dir.path().join("src/x.ts");
        assert_eq!(
            resolver.resolve("@/misc/id.js", &from),
            ModuleTarget::File(dir.path().join("src/misc/id.ts"))
        );
        assert_eq!(resolver.resolve("@/misc/none.js", &from), ModuleTarget::Missing);
        assert_eq!(resolver.resolve("lodash", &from), ModuleTarget::External);
    }
}
