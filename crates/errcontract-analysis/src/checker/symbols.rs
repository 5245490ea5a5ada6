//! Name resolution across modules.
//!
//! Names are resolved in one of two declaration spaces: values (classes,
//! variables, functions) and types (classes, interfaces, type aliases).
//! Imports, `export { a as b }` aliases and re-exports are followed until a
//! declaration is reached.

use errcontract_core::types::collections::{FxHashSet, SmallVec2};

use crate::project::{FileId, ImportTarget, Project};
use crate::syntax::ast::{ExportDecl, Expr, ImportBinding, Item};

/// A top-level declaration: file plus item index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclRef {
    pub file: FileId,
    pub item: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Space {
    Value,
    Type,
}

/// What a name resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Decl(DeclRef),
    /// A namespace import or `export * as ns`.
    Module(FileId),
    /// Imported from a package outside the project; its declarations are
    /// not visible.
    External,
    /// A built-in global constructor such as `Error`.
    Global(String),
}

/// Value-space globals provided by the standard library declarations.
const GLOBAL_VALUES: &[&str] = &[
    "AbortController",
    "AggregateError",
    "Array",
    "ArrayBuffer",
    "BigInt",
    "Boolean",
    "Buffer",
    "DataView",
    "Date",
    "Error",
    "EvalError",
    "Event",
    "EventTarget",
    "Float32Array",
    "Float64Array",
    "Function",
    "Int16Array",
    "Int32Array",
    "Int8Array",
    "Map",
    "Number",
    "Object",
    "Promise",
    "Proxy",
    "RangeError",
    "ReadableStream",
    "ReferenceError",
    "RegExp",
    "Set",
    "String",
    "Symbol",
    "SyntaxError",
    "TextDecoder",
    "TextEncoder",
    "TransformStream",
    "TypeError",
    "URIError",
    "URL",
    "URLSearchParams",
    "Uint16Array",
    "Uint32Array",
    "Uint8Array",
    "Uint8ClampedArray",
    "WeakMap",
    "WeakRef",
    "WeakSet",
    "WritableStream",
];

type Visited = FxHashSet<(FileId, String, Space)>;

/// Resolution results; almost always zero or one symbol.
pub type Symbols = SmallVec2<Symbol>;

/// Resolver over a loaded program.
#[derive(Clone, Copy)]
pub struct Resolver<'p> {
    project: &'p Project,
}

impl<'p> Resolver<'p> {
    pub fn new(project: &'p Project) -> Self {
        Self { project }
    }

    /// Resolve `name` as written at module scope of `file`.
    pub fn resolve_local(&self, file: FileId, name: &str, space: Space) -> Symbols {
        let mut visited = Visited::default();
        let mut found = self.local(file, name, space, &mut visited);
        if found.is_empty() {
            found = self.global(file, name, space);
        }
        found
    }

    /// Resolve the export `name` of module `file`.
    pub fn resolve_export(&self, file: FileId, name: &str, space: Space) -> Symbols {
        let mut visited = Visited::default();
        self.export(file, name, space, &mut visited)
    }

    /// Resolve a dotted name such as `ns.Thing`: every segment but the last
    /// must lead to a module.
    pub fn resolve_qualified(&self, file: FileId, path: &[String], space: Space) -> Symbols {
        match path {
            [] => Symbols::new(),
            [single] => self.resolve_local(file, single, space),
            [first, rest @ ..] => {
                let mut current = self.resolve_local(file, first, Space::Value);
                for (i, segment) in rest.iter().enumerate() {
                    let segment_space = if i + 1 == rest.len() { space } else { Space::Value };
                    let modules: Vec<FileId> = current
                        .iter()
                        .filter_map(|s| match s {
                            Symbol::Module(id) => Some(*id),
                            _ => None,
                        })
                        .collect();
                    current = modules
                        .into_iter()
                        .flat_map(|m| self.resolve_export(m, segment, segment_space))
                        .collect();
                }
                current
            }
        }
    }

    /// Value declarations of `name` as seen from `file`: the candidates the
    /// endpoint classifier counts. External symbols contribute nothing.
    pub fn value_definitions(&self, file: FileId, name: &str) -> Symbols {
        self.resolve_local(file, name, Space::Value)
            .into_iter()
            .filter(|s| !matches!(s, Symbol::External))
            .collect()
    }

    pub fn item(&self, decl: DeclRef) -> Option<&'p Item> {
        self.project.file(decl.file).items.get(decl.item)
    }

    fn local(&self, file: FileId, name: &str, space: Space, visited: &mut Visited) -> Symbols {
        let source = self.project.file(file);
        let mut out = Symbols::new();
        let mut seen_function = false;

        for (i, item) in source.items.iter().enumerate() {
            match item {
                Item::Import(import) => {
                    for binding in import.bindings.iter().filter(|b| b.local() == name) {
                        let target = self.project.import_target(file, &import.source);
                        let ImportTarget::File(target) = target else {
                            if target == ImportTarget::External {
                                out.push(Symbol::External);
                            }
                            continue;
                        };
                        match binding {
                            ImportBinding::Default { .. } => {
                                out.extend(self.export(target, "default", space, visited))
                            }
                            ImportBinding::Named { imported, .. } => {
                                out.extend(self.export(target, imported, space, visited))
                            }
                            ImportBinding::Namespace { .. } => out.push(Symbol::Module(target)),
                        }
                    }
                }
                Item::Function(f) if f.name == name && space == Space::Value => {
                    // Overload signatures and the implementation are one symbol.
                    if !seen_function {
                        seen_function = true;
                        out.push(Symbol::Decl(DeclRef { file, item: i }));
                    }
                }
                other if declares(other, name, space) => {
                    out.push(Symbol::Decl(DeclRef { file, item: i }))
                }
                _ => {}
            }
        }
        out.sort();
        out.dedup();
        out
    }

    fn export(&self, file: FileId, name: &str, space: Space, visited: &mut Visited) -> Symbols {
        if !visited.insert((file, name.to_string(), space)) {
            return Symbols::new();
        }
        let source = self.project.file(file);
        let mut out = Symbols::new();
        let mut seen_function = false;

        for (i, item) in source.items.iter().enumerate() {
            match item {
                Item::Export(ExportDecl::Named { specifiers, source: from }) => {
                    for spec in specifiers.iter().filter(|s| s.exported == name) {
                        match from {
                            Some(from) => match self.project.import_target(file, from) {
                                ImportTarget::File(target) => {
                                    out.extend(self.export(target, &spec.local, space, visited))
                                }
                                ImportTarget::External => out.push(Symbol::External),
                                ImportTarget::Unresolved => {}
                            },
                            None => out.extend(self.local(file, &spec.local, space, visited)),
                        }
                    }
                }
                Item::Export(ExportDecl::DefaultExpr { expr }) if name == "default" => {
                    if let Expr::Ident(local) = expr {
                        out.extend(self.local(file, local, space, visited));
                    }
                }
                Item::Export(ExportDecl::All {
                    source: from,
                    alias: Some(alias),
                }) if alias == name => match self.project.import_target(file, from) {
                    ImportTarget::File(target) => out.push(Symbol::Module(target)),
                    ImportTarget::External => out.push(Symbol::External),
                    ImportTarget::Unresolved => {}
                },
                other if exported_as(other, name) && in_space(other, space) => {
                    let is_function = matches!(other, Item::Function(_));
                    if !(is_function && seen_function) {
                        seen_function |= is_function;
                        out.push(Symbol::Decl(DeclRef { file, item: i }));
                    }
                }
                _ => {}
            }
        }

        if out.is_empty() && name != "default" {
            for item in &source.items {
                if let Item::Export(ExportDecl::All { source: from, alias: None }) = item {
                    if let ImportTarget::File(target) = self.project.import_target(file, from) {
                        out.extend(self.export(target, name, space, visited));
                    }
                }
            }
        }

        out.sort();
        out.dedup();
        out
    }

    /// Declarations in global scripts, then standard library globals.
    fn global(&self, from: FileId, name: &str, space: Space) -> Symbols {
        let mut out: Symbols = self
            .project
            .global_scripts()
            .filter(|(id, _)| *id != from)
            .flat_map(move |(id, file)| {
                file.items
                    .iter()
                    .enumerate()
                    .filter(move |(_, item)| declares(item, name, space))
                    .map(move |(i, _)| Symbol::Decl(DeclRef { file: id, item: i }))
            })
            .collect();
        if out.is_empty() && space == Space::Value && GLOBAL_VALUES.contains(&name) {
            out.push(Symbol::Global(name.to_string()));
        }
        out
    }
}

/// Local name of a declaration item, if it has one.
pub fn declared_name(item: &Item) -> Option<&str> {
    match item {
        Item::Class(c) => c.name.as_deref(),
        Item::Variable(v) => Some(&v.name),
        Item::Function(f) => Some(&f.name),
        Item::TypeAlias(t) => Some(&t.name),
        Item::Interface(i) => Some(&i.name),
        Item::Import(_) | Item::Export(_) => None,
    }
}

fn in_space(item: &Item, space: Space) -> bool {
    match item {
        Item::Class(_) => true,
        Item::Variable(_) | Item::Function(_) => space == Space::Value,
        Item::TypeAlias(_) | Item::Interface(_) => space == Space::Type,
        Item::Import(_) | Item::Export(_) => false,
    }
}

fn declares(item: &Item, name: &str, space: Space) -> bool {
    in_space(item, space) && declared_name(item) == Some(name)
}

fn exported_as(item: &Item, name: &str) -> bool {
    let modifiers = match item {
        Item::Class(c) => c.modifiers,
        Item::Variable(v) => v.modifiers,
        Item::Function(f) => f.modifiers,
        Item::TypeAlias(t) => t.modifiers,
        Item::Interface(i) => i.modifiers,
        Item::Import(_) | Item::Export(_) => return false,
    };
    if modifiers.default_export {
        name == "default"
    } else {
        modifiers.exported && declared_name(item) == Some(name)
    }
}
