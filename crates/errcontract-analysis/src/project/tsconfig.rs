//! Build configuration loading: `tsconfig.json` with comments, `extends`
//! chains, file selection and the compiler options the checker reads.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use errcontract_core::errors::ProjectError;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use walkdir::WalkDir;

use super::resolve::normalize_path;
use super::source_kind::SourceKind;

/// Directories never entered while expanding include patterns.
const SKIPPED_DIRS: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawTsConfig {
    extends: Option<Extends>,
    compiler_options: Option<RawCompilerOptions>,
    files: Option<Vec<String>>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Extends {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawCompilerOptions {
    base_url: Option<String>,
    paths: Option<BTreeMap<String, Vec<String>>>,
    strict: Option<bool>,
    strict_null_checks: Option<bool>,
}

/// A list of patterns together with the directory they are relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternList {
    pub base: PathBuf,
    pub patterns: Vec<String>,
}

/// Compiler options after `extends` resolution. Paths are absolute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    pub base_url: Option<PathBuf>,
    pub paths: BTreeMap<String, Vec<String>>,
    /// Directory `paths` targets are relative to: `baseUrl` when set,
    /// otherwise the directory of the config that declared `paths`.
    pub paths_base: Option<PathBuf>,
    pub strict: Option<bool>,
    pub strict_null_checks: Option<bool>,
}

impl CompilerOptions {
    /// `strictNullChecks`, falling back to `strict`, default off.
    pub fn effective_strict_null_checks(&self) -> bool {
        self.strict_null_checks.or(self.strict).unwrap_or(false)
    }
}

/// A fully resolved build configuration.
#[derive(Debug, Clone)]
pub struct TsConfig {
    pub path: PathBuf,
    pub files: Option<PatternList>,
    pub include: Option<PatternList>,
    pub exclude: Option<PatternList>,
    pub compiler_options: CompilerOptions,
}

impl TsConfig {
    /// Load `path` and every configuration it extends.
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        let path = normalize_path(path);
        if !path.is_file() {
            return Err(ProjectError::TsConfigNotFound { path });
        }
        let mut chain = Vec::new();
        Self::load_layer(&path, &mut chain)
    }

    fn load_layer(path: &Path, chain: &mut Vec<PathBuf>) -> Result<Self, ProjectError> {
        if chain.iter().any(|p| p == path) {
            return Err(ProjectError::TsConfigCycle {
                path: path.to_path_buf(),
            });
        }
        chain.push(path.to_path_buf());

        let content = std::fs::read_to_string(path).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawTsConfig =
            serde_json::from_str(&strip_jsonc(&content)).map_err(|e| ProjectError::TsConfigInvalid {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        let mut config = TsConfig {
            path: path.to_path_buf(),
            files: None,
            include: None,
            exclude: None,
            compiler_options: CompilerOptions::default(),
        };

        let parents = match raw.extends {
            None => Vec::new(),
            Some(Extends::One(one)) => vec![one],
            Some(Extends::Many(many)) => many,
        };
        for parent in parents {
            let parent_path = resolve_extends(&dir, &parent).ok_or_else(|| {
                ProjectError::TsConfigNotFound {
                    path: dir.join(&parent),
                }
            })?;
            let base = Self::load_layer(&parent_path, chain)?;
            config.inherit(base);
        }
        chain.pop();

        let list = |patterns: Vec<String>| PatternList {
            base: dir.clone(),
            patterns,
        };
        if let Some(files) = raw.files {
            config.files = Some(list(files));
        }
        if let Some(include) = raw.include {
            config.include = Some(list(include));
        }
        if let Some(exclude) = raw.exclude {
            config.exclude = Some(list(exclude));
        }

        if let Some(options) = raw.compiler_options {
            let opts = &mut config.compiler_options;
            if let Some(base_url) = options.base_url {
                let base_url = normalize_path(&dir.join(base_url));
                opts.paths_base = Some(base_url.clone());
                opts.base_url = Some(base_url);
            }
            if let Some(paths) = options.paths {
                opts.paths = paths;
                if opts.base_url.is_none() {
                    opts.paths_base = Some(dir.clone());
                }
            }
            if options.strict.is_some() {
                opts.strict = options.strict;
            }
            if options.strict_null_checks.is_some() {
                opts.strict_null_checks = options.strict_null_checks;
            }
        }

        tracing::debug!(path = %path.display(), "loaded build configuration");
        Ok(config)
    }

    /// Take every setting from `base` (later `extends` entries override
    /// earlier ones; the extending file overrides them all afterwards).
    fn inherit(&mut self, base: TsConfig) {
        if base.files.is_some() {
            self.files = base.files;
        }
        if base.include.is_some() {
            self.include = base.include;
        }
        if base.exclude.is_some() {
            self.exclude = base.exclude;
        }
        let opts = &mut self.compiler_options;
        let other = base.compiler_options;
        if other.base_url.is_some() {
            opts.base_url = other.base_url;
        }
        if !other.paths.is_empty() {
            opts.paths = other.paths;
        }
        if other.paths_base.is_some() {
            opts.paths_base = other.paths_base;
        }
        if other.strict.is_some() {
            opts.strict = other.strict;
        }
        if other.strict_null_checks.is_some() {
            opts.strict_null_checks = other.strict_null_checks;
        }
    }

    pub fn dir(&self) -> PathBuf {
        self.path.parent().map(Path::to_path_buf).unwrap_or_default()
    }

    /// The program's root files, sorted and deduplicated.
    ///
    /// Without `files` and `include`, everything under the config directory
    /// is included.
    pub fn root_files(&self) -> Result<Vec<PathBuf>, ProjectError> {
        let mut out = Vec::new();

        if let Some(files) = &self.files {
            for file in &files.patterns {
                let path = normalize_path(&files.base.join(file));
                if path.is_file() {
                    out.push(path);
                } else {
                    tracing::warn!(path = %path.display(), "file listed in build configuration does not exist");
                }
            }
        }

        let include = match (&self.include, &self.files) {
            (Some(include), _) => Some(include.clone()),
            (None, None) => Some(PatternList {
                base: self.dir(),
                patterns: vec!["**/*".to_string()],
            }),
            (None, Some(_)) => None,
        };

        if let Some(include) = include {
            let excludes = self.exclude_matchers()?;
            for pattern in &include.patterns {
                let (walk_root, glob) = split_pattern(&include.base, pattern, true);
                let matcher = build_globset(std::slice::from_ref(&glob))?;
                if !walk_root.exists() {
                    continue;
                }
                let walker = WalkDir::new(&walk_root)
                    .follow_links(true)
                    .into_iter()
                    .filter_entry(|entry| {
                        entry.depth() == 0
                            || !entry.file_type().is_dir()
                            || !SKIPPED_DIRS
                                .iter()
                                .any(|skip| entry.file_name() == *skip)
                    });
                for entry in walker {
                    let entry = entry.map_err(|e| ProjectError::Io {
                        path: e.path().map(Path::to_path_buf).unwrap_or_else(|| walk_root.clone()),
                        source: e
                            .into_io_error()
                            .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
                    })?;
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    let path = entry.path();
                    if SourceKind::from_path(path).is_none() {
                        continue;
                    }
                    let Ok(relative) = path.strip_prefix(&walk_root) else {
                        continue;
                    };
                    if !matcher.is_match(relative) {
                        continue;
                    }
                    if excludes.iter().any(|(root, set)| {
                        path.strip_prefix(root)
                            .map(|rel| set.is_match(rel))
                            .unwrap_or(false)
                    }) {
                        continue;
                    }
                    out.push(normalize_path(path));
                }
            }
        }

        out.sort();
        out.dedup();
        Ok(out)
    }

    fn exclude_matchers(&self) -> Result<Vec<(PathBuf, GlobSet)>, ProjectError> {
        let Some(exclude) = &self.exclude else {
            return Ok(Vec::new());
        };
        exclude
            .patterns
            .iter()
            .map(|pattern| {
                let (root, glob) = split_pattern(&exclude.base, pattern, false);
                // An excluded directory excludes everything beneath it.
                let set = build_globset(&[glob.clone(), format!("{glob}/**")])?;
                Ok((root, set))
            })
            .collect()
    }
}

/// Split a pattern into the literal directory to walk and the glob that
/// remains, relative to that directory. Include patterns naming a directory
/// (last segment without wildcard or extension) match everything below it.
fn split_pattern(base: &Path, pattern: &str, is_include: bool) -> (PathBuf, String) {
    let pattern = pattern.trim_start_matches("./").trim_end_matches('/');
    let segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let first_glob = segments
        .iter()
        .position(|s| s.contains(['*', '?', '[', '{']))
        .unwrap_or(segments.len());

    let mut root = base.to_path_buf();
    for segment in &segments[..first_glob] {
        root.push(segment);
    }
    let root = normalize_path(&root);

    if first_glob == segments.len() {
        // Literal path: a file matches itself, a directory its contents.
        if is_include && root.is_file() {
            let name = segments.last().copied().unwrap_or_default().to_string();
            let parent = root.parent().map(Path::to_path_buf).unwrap_or_default();
            return (parent, name);
        }
        if is_include {
            return (root, "**/*".to_string());
        }
        return match root.parent() {
            Some(parent) => (
                parent.to_path_buf(),
                segments.last().copied().unwrap_or_default().to_string(),
            ),
            None => (root, "**".to_string()),
        };
    }

    let mut glob = segments[first_glob..].join("/");
    let last = segments.last().copied().unwrap_or_default();
    if is_include && !last.contains('.') && !last.contains('*') {
        glob.push_str("/**/*");
    }
    (root, glob)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, ProjectError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| ProjectError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ProjectError::InvalidPattern {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}

/// Locate the configuration named by an `extends` entry.
fn resolve_extends(dir: &Path, spec: &str) -> Option<PathBuf> {
    let with_json = |p: PathBuf| -> Option<PathBuf> {
        if p.is_file() {
            return Some(normalize_path(&p));
        }
        let mut json = p.clone().into_os_string();
        json.push(".json");
        let json = PathBuf::from(json);
        if json.is_file() {
            return Some(normalize_path(&json));
        }
        let nested = p.join("tsconfig.json");
        nested.is_file().then(|| normalize_path(&nested))
    };

    if spec.starts_with("./") || spec.starts_with("../") || Path::new(spec).is_absolute() {
        return with_json(dir.join(spec));
    }

    // Package-provided configuration: search node_modules upwards.
    let mut current = Some(dir);
    while let Some(d) = current {
        if let Some(found) = with_json(d.join("node_modules").join(spec)) {
            return Some(found);
        }
        current = d.parent();
    }
    None
}

/// Strip comments and trailing commas so JSON-with-comments parses as JSON.
pub fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }
    remove_trailing_commas(&out)
}

fn remove_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some(next) = chars.get(i + 1) {
                    out.push(*next);
                    i += 1;
                }
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
            out.push(c);
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if !matches!(next, Some('}') | Some(']')) {
                out.push(c);
            }
        } else {
            out.push(c);
        }
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_jsonc() {
        let input = r#"{
  // line comment
  "a": "http://x", /* block */
  "b": [1, 2,],
}"#;
        let value: serde_json::Value = serde_json::from_str(&strip_jsonc(input)).unwrap();
        assert_eq!(value["a"], "http://x");
        assert_eq!(value["b"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_strict_null_checks_fallback() {
        let mut opts = CompilerOptions::default();
        assert!(!opts.effective_strict_null_checks());
        opts.strict = Some(true);
        assert!(opts.effective_strict_null_checks());
        opts.strict_null_checks = Some(false);
        assert!(!opts.effective_strict_null_checks());
    }

    #[test]
    fn test_split_pattern() {
        let base = Path::new("/p");
        assert_eq!(
            split_pattern(base, "src/**/*.ts", true),
            (PathBuf::from("/p/src"), "**/*.ts".to_string())
        );
        assert_eq!(
            split_pattern(base, "./src", true),
            (PathBuf::from("/p/src"), "**/*".to_string())
        );
        assert_eq!(
            split_pattern(base, "../shared/*", true),
            (PathBuf::from("/shared"), "*".to_string())
        );
        assert_eq!(
            split_pattern(base, "src/test", false),
            (PathBuf::from("/p/src"), "test".to_string())
        );
    }
}
