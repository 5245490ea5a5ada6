//! Property lookup on evaluated types.

use super::types::{merge_objects, ObjectType, Type};

/// Declared property `name` of `ty`, the way the compiler's `getProperty`
/// answers it: index signatures do not count, `any` has no properties, a
/// union property must exist on every member.
///
/// Optional properties include `undefined` when `strict` is set.
pub fn property_of(ty: &Type, name: &str, strict: bool) -> Option<Type> {
    match ty {
        Type::Object(object) => object.properties.get(name).map(|prop| {
            if prop.optional && strict {
                Type::union([prop.ty.clone(), Type::Undefined])
            } else {
                prop.ty.clone()
            }
        }),
        Type::Union(members) => {
            let found: Option<Vec<Type>> = members
                .iter()
                .map(|member| property_of(member, name, strict))
                .collect();
            found.map(Type::union)
        }
        Type::Intersection(members) => {
            let found: Vec<Type> = members
                .iter()
                .filter_map(|member| property_of(member, name, strict))
                .collect();
            if found.is_empty() {
                None
            } else {
                Some(Type::intersection(found))
            }
        }
        Type::Array { .. } | Type::String | Type::StringLiteral(_) if name == "length" => {
            Some(Type::Number)
        }
        Type::Tuple { elements, .. } => {
            if name == "length" {
                return Some(Type::NumberLiteral(elements.len().to_string()));
            }
            name.parse::<usize>()
                .ok()
                .and_then(|i| elements.get(i).cloned())
        }
        _ => None,
    }
}

/// Property access as an expression sees it: declared properties first,
/// then string index signatures and array elements. Unknown accesses
/// evaluate to `any`.
pub fn access_property(ty: &Type, name: &str, strict: bool) -> Type {
    if let Some(found) = property_of(ty, name, strict) {
        return found;
    }
    match ty {
        Type::Object(object) => object
            .index
            .as_deref()
            .cloned()
            .unwrap_or(Type::Any),
        Type::Array { element, .. } if name.parse::<usize>().is_ok() => (**element).clone(),
        Type::Union(members) => {
            Type::union(members.iter().map(|m| access_property(m, name, strict)))
        }
        _ => Type::Any,
    }
}

/// Every declared property of `ty` with its type.
pub fn properties_of(ty: &Type, strict: bool) -> Vec<(String, Type)> {
    match ty {
        Type::Object(object) => object
            .properties
            .keys()
            .filter_map(|name| property_of(ty, name, strict).map(|t| (name.clone(), t)))
            .collect(),
        Type::Intersection(members) => {
            let objects: Vec<_> = members
                .iter()
                .filter_map(|m| match m {
                    Type::Object(o) => Some(o.clone()),
                    _ => None,
                })
                .collect();
            let merged = merge_objects(&objects).into_type();
            properties_of(&merged, strict)
        }
        Type::Union(members) => {
            let Some(first) = members.first() else {
                return Vec::new();
            };
            properties_of(first, strict)
                .into_iter()
                .filter_map(|(name, _)| property_of(ty, &name, strict).map(|t| (name, t)))
                .collect()
        }
        Type::Tuple { elements, .. } => elements
            .iter()
            .enumerate()
            .map(|(i, t)| (i.to_string(), t.clone()))
            .collect(),
        _ => Vec::new(),
    }
}

/// Apply `f` to every object constituent of `ty`, distributing over unions
/// and intersections.
pub fn map_objects(ty: &Type, f: &impl Fn(&ObjectType) -> ObjectType) -> Type {
    match ty {
        Type::Object(object) => f(object).into_type(),
        Type::Union(members) => Type::union(members.iter().map(|m| map_objects(m, f))),
        Type::Intersection(members) => {
            Type::intersection(members.iter().map(|m| map_objects(m, f)))
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::types::Property;

    fn obj(props: &[(&str, Type, bool)]) -> Type {
        Type::object(props.iter().map(|(n, t, optional)| {
            (
                n.to_string(),
                Property {
                    ty: t.clone(),
                    optional: *optional,
                    readonly: false,
                },
            )
        }))
    }

    #[test]
    fn test_optional_property_adds_undefined_when_strict() {
        let t = obj(&[("id", Type::string_literal("a"), true)]);
        assert_eq!(
            property_of(&t, "id", true),
            Some(Type::union([Type::string_literal("a"), Type::Undefined]))
        );
        assert_eq!(property_of(&t, "id", false), Some(Type::string_literal("a")));
    }

    #[test]
    fn test_union_property_requires_every_member() {
        let a = obj(&[("id", Type::string_literal("a"), false)]);
        let b = obj(&[("id", Type::string_literal("b"), false)]);
        let c = obj(&[("other", Type::String, false)]);
        assert_eq!(
            property_of(&Type::union([a.clone(), b]), "id", true),
            Some(Type::union([Type::string_literal("a"), Type::string_literal("b")]))
        );
        assert_eq!(property_of(&Type::union([a, c]), "id", true), None);
    }

    #[test]
    fn test_any_and_index_signatures_have_no_declared_properties() {
        assert_eq!(property_of(&Type::Any, "id", true), None);
        let record = ObjectType {
            properties: Default::default(),
            index: Some(Box::new(Type::Number)),
        }
        .into_type();
        assert_eq!(property_of(&record, "x", true), None);
        assert_eq!(access_property(&record, "x", true), Type::Number);
        assert_eq!(access_property(&Type::Any, "x", true), Type::Any);
    }

    #[test]
    fn test_tuple_and_string_members() {
        let tuple = Type::Tuple {
            elements: vec![Type::String, Type::Number],
            readonly: true,
        };
        assert_eq!(property_of(&tuple, "1", true), Some(Type::Number));
        assert_eq!(property_of(&tuple, "length", true), Some(Type::NumberLiteral("2".into())));
        assert_eq!(property_of(&Type::String, "length", true), Some(Type::Number));
        assert_eq!(property_of(&Type::String, "id", true), None);
    }
}
