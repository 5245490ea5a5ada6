//! Permitted error identifiers from an endpoint's metadata descriptor.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::checker::{Type, TypeChecker};
use crate::contract::classifier::EndpointDecl;

/// Sorted, deduplicated set of permitted error identifiers. Empty means no
/// identifier is permitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorIdSet {
    ids: BTreeSet<String>,
}

impl ErrorIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Identifiers present in both sets.
    pub fn intersection(&self, other: &ErrorIdSet) -> ErrorIdSet {
        self.ids.intersection(&other.ids).cloned().collect()
    }

    /// The union of the identifiers as string literal types; `never` for the
    /// empty set, so nothing but `never` is assignable to it.
    pub fn permitted_union(&self) -> Type {
        Type::union(self.ids.iter().map(Type::string_literal))
    }
}

impl FromIterator<String> for ErrorIdSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Read `errors` from the descriptor and collect the string literal `id` of
/// each of its members. Members whose `id` is not a single string literal
/// contribute nothing. A missing descriptor or `errors` member yields the
/// empty set.
pub fn resolve_error_ids(checker: &TypeChecker, endpoint: &EndpointDecl) -> ErrorIdSet {
    let Some(descriptor) = &endpoint.descriptor else {
        tracing::debug!(endpoint = %endpoint.name, "no metadata descriptor");
        return ErrorIdSet::new();
    };
    let meta = checker.type_from_node(endpoint.file, descriptor);
    let Some(errors) = checker.property_of(&meta, "errors") else {
        tracing::debug!(endpoint = %endpoint.name, "metadata declares no errors");
        return ErrorIdSet::new();
    };

    let ids: ErrorIdSet = checker
        .properties_of(&errors.non_nullable())
        .into_iter()
        .filter_map(|(_, member)| checker.property_of(&member, "id"))
        .filter_map(|id| id.as_string_literal().map(str::to_owned))
        .collect();

    tracing::debug!(endpoint = %endpoint.name, union_count = ids.len(), "permitted error ids resolved");
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> ErrorIdSet {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_duplicates_collapse_and_sort() {
        let ids = set(&["b", "a", "b"]);
        assert_eq!(ids.len(), 2);
        assert_eq!(ids.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_set_synthesizes_never() {
        assert_eq!(ErrorIdSet::new().permitted_union(), Type::Never);
    }

    #[test]
    fn test_union_of_literals() {
        assert_eq!(
            set(&["x", "y"]).permitted_union(),
            Type::union([Type::string_literal("x"), Type::string_literal("y")])
        );
        assert_eq!(set(&["x"]).permitted_union(), Type::string_literal("x"));
    }

    #[test]
    fn test_intersection() {
        let both = set(&["a", "b", "c"]).intersection(&set(&["b", "c", "d"]));
        assert_eq!(both, set(&["b", "c"]));
        assert!(set(&["a"]).intersection(&set(&["b"])).is_empty());
    }
}
