//! Standard library generic types the evaluator understands by name.

use std::collections::BTreeMap;

use super::assignability::is_assignable;
use super::properties::map_objects;
use super::types::{ObjectType, Property, Type};

/// Instantiate the built-in generic `name` with `args`. `None` when the
/// name is not a known built-in.
pub fn instantiate(name: &str, args: &[Type], strict: bool) -> Option<Type> {
    let arg = |i: usize| args.get(i).cloned().unwrap_or(Type::Any);
    Some(match name {
        "Array" => Type::Array {
            element: Box::new(arg(0)),
            readonly: false,
        },
        "ReadonlyArray" => Type::Array {
            element: Box::new(arg(0)),
            readonly: true,
        },
        "Record" => record(&arg(0), arg(1)),
        "Partial" => map_objects(&arg(0), &|o| with_flags(o, Some(true), None)),
        "Required" => map_objects(&arg(0), &|o| with_flags(o, Some(false), None)),
        "Readonly" => match arg(0) {
            t @ (Type::Array { .. } | Type::Tuple { .. }) => t.into_readonly(),
            t => map_objects(&t, &|o| with_flags(o, None, Some(true))),
        },
        "Pick" => {
            let keys = literal_keys(&arg(1));
            map_objects(&arg(0), &|o| filter_props(o, |name| keys.iter().any(|k| k == name)))
        }
        "Omit" => {
            let keys = literal_keys(&arg(1));
            map_objects(&arg(0), &|o| filter_props(o, |name| !keys.iter().any(|k| k == name)))
        }
        "NonNullable" => arg(0).non_nullable(),
        "Exclude" => {
            let excluded = arg(1);
            Type::union(
                arg(0)
                    .members()
                    .iter()
                    .filter(|m| !is_assignable(m, &excluded, strict))
                    .cloned(),
            )
        }
        "Extract" => {
            let extracted = arg(1);
            Type::union(
                arg(0)
                    .members()
                    .iter()
                    .filter(|m| is_assignable(m, &extracted, strict))
                    .cloned(),
            )
        }
        _ => return None,
    })
}

fn record(keys: &Type, value: Type) -> Type {
    let mut properties = BTreeMap::new();
    let mut index = None;
    for key in keys.members() {
        match key {
            Type::StringLiteral(k) | Type::NumberLiteral(k) => {
                properties.insert(k.clone(), Property::required(value.clone()));
            }
            Type::String | Type::Number | Type::Symbol | Type::Any => {
                index = Some(Box::new(value.clone()));
            }
            _ => {}
        }
    }
    ObjectType { properties, index }.into_type()
}

fn literal_keys(keys: &Type) -> Vec<String> {
    keys.members()
        .iter()
        .filter_map(|k| match k {
            Type::StringLiteral(s) | Type::NumberLiteral(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

fn with_flags(object: &ObjectType, optional: Option<bool>, readonly: Option<bool>) -> ObjectType {
    let mut out = object.clone();
    for prop in out.properties.values_mut() {
        if let Some(optional) = optional {
            prop.optional = optional;
        }
        if let Some(readonly) = readonly {
            prop.readonly = readonly;
        }
    }
    out
}

fn filter_props(object: &ObjectType, keep: impl Fn(&str) -> bool) -> ObjectType {
    ObjectType {
        properties: object
            .properties
            .iter()
            .filter(|(name, _)| keep(name))
            .map(|(name, prop)| (name.clone(), prop.clone()))
            .collect(),
        index: object.index.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Type {
        Type::string_literal(s)
    }

    #[test]
    fn test_record_with_literal_keys() {
        let t = instantiate("Record", &[Type::union([lit("a"), lit("b")]), Type::Number], true)
            .unwrap();
        let Type::Object(o) = t else { panic!("expected object") };
        assert_eq!(o.properties.len(), 2);
        assert!(o.index.is_none());
    }

    #[test]
    fn test_record_with_string_keys_is_index_signature() {
        let t = instantiate("Record", &[Type::String, Type::Number], true).unwrap();
        let Type::Object(o) = t else { panic!("expected object") };
        assert!(o.properties.is_empty());
        assert_eq!(o.index.as_deref(), Some(&Type::Number));
    }

    #[test]
    fn test_pick_omit_partial() {
        let base = Type::object([
            ("id".to_string(), Property::required(lit("x"))),
            ("message".to_string(), Property::required(Type::String)),
        ]);
        let picked = instantiate("Pick", &[base.clone(), lit("id")], true).unwrap();
        assert_eq!(picked, Type::object([("id".to_string(), Property::required(lit("x")))]));
        let omitted = instantiate("Omit", &[base.clone(), lit("id")], true).unwrap();
        assert_eq!(
            omitted,
            Type::object([("message".to_string(), Property::required(Type::String))])
        );
        let Type::Object(partial) = instantiate("Partial", &[base], true).unwrap() else {
            panic!("expected object");
        };
        assert!(partial.properties.values().all(|p| p.optional));
    }

    #[test]
    fn test_exclude_extract() {
        let all = Type::union([lit("a"), lit("b"), Type::Number]);
        assert_eq!(
            instantiate("Exclude", &[all.clone(), Type::Number], true),
            Some(Type::union([lit("a"), lit("b")]))
        );
        assert_eq!(instantiate("Extract", &[all, Type::String], true), Some(Type::union([lit("a"), lit("b")])));
        assert_eq!(instantiate("Promise", &[], true), None);
    }
}
