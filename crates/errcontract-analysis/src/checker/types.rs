//! Semantic types produced by the evaluator.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A TypeScript type, restricted to the forms the contract check needs.
///
/// Unions and intersections are kept normalized: build them through
/// [`Type::union`] and [`Type::intersection`], never by hand.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Type {
    Any,
    Unknown,
    Never,
    Void,
    Undefined,
    Null,
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    /// The `object` keyword.
    NonPrimitive,
    StringLiteral(String),
    /// Canonical decimal text.
    NumberLiteral(String),
    BooleanLiteral(bool),
    Object(Arc<ObjectType>),
    Array { element: Box<Type>, readonly: bool },
    Tuple { elements: Vec<Type>, readonly: bool },
    Union(Vec<Type>),
    Intersection(Vec<Type>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectType {
    pub properties: BTreeMap<String, Property>,
    /// String index signature value type.
    pub index: Option<Box<Type>>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Property {
    pub ty: Type,
    pub optional: bool,
    pub readonly: bool,
}

impl Property {
    pub fn required(ty: Type) -> Self {
        Self {
            ty,
            optional: false,
            readonly: false,
        }
    }
}

impl ObjectType {
    pub fn into_type(self) -> Type {
        Type::Object(Arc::new(self))
    }
}

impl Type {
    pub fn string_literal(value: impl Into<String>) -> Type {
        Type::StringLiteral(value.into())
    }

    pub fn object(properties: impl IntoIterator<Item = (String, Property)>) -> Type {
        ObjectType {
            properties: properties.into_iter().collect(),
            index: None,
        }
        .into_type()
    }

    /// Normalized union of `members`.
    ///
    /// Nested unions are flattened, `never` members dropped, `any` and
    /// `unknown` absorb everything, `true | false` becomes `boolean`, and a
    /// literal is dropped when its primitive is present. The empty union is
    /// `never`.
    pub fn union(members: impl IntoIterator<Item = Type>) -> Type {
        let mut flat = Vec::new();
        for member in members {
            match member {
                Type::Union(inner) => flat.extend(inner),
                Type::Never => {}
                other => flat.push(other),
            }
        }
        if flat.contains(&Type::Any) {
            return Type::Any;
        }
        if flat.contains(&Type::Unknown) {
            return Type::Unknown;
        }
        if flat.contains(&Type::BooleanLiteral(true)) && flat.contains(&Type::BooleanLiteral(false))
        {
            flat.retain(|t| !matches!(t, Type::BooleanLiteral(_)));
            flat.push(Type::Boolean);
        }
        let has_string = flat.contains(&Type::String);
        let has_number = flat.contains(&Type::Number);
        let has_boolean = flat.contains(&Type::Boolean);
        flat.retain(|t| match t {
            Type::StringLiteral(_) => !has_string,
            Type::NumberLiteral(_) => !has_number,
            Type::BooleanLiteral(_) => !has_boolean,
            _ => true,
        });
        flat.sort();
        flat.dedup();
        match flat.len() {
            0 => Type::Never,
            1 => flat.pop().unwrap_or(Type::Never),
            _ => Type::Union(flat),
        }
    }

    /// Normalized intersection of `members`.
    ///
    /// Distributes over unions, collapses disjoint primitives to `never`, and
    /// merges object members into a single object type.
    pub fn intersection(members: impl IntoIterator<Item = Type>) -> Type {
        let mut flat = Vec::new();
        for member in members {
            match member {
                Type::Intersection(inner) => flat.extend(inner),
                Type::Unknown => {}
                other => flat.push(other),
            }
        }
        if flat.contains(&Type::Never) {
            return Type::Never;
        }
        if flat.contains(&Type::Any) {
            return Type::Any;
        }

        if let Some(pos) = flat.iter().position(|t| matches!(t, Type::Union(_))) {
            let Type::Union(options) = flat.remove(pos) else {
                return Type::Never;
            };
            const MAX_DISTRIBUTION: usize = 64;
            if options.len() <= MAX_DISTRIBUTION {
                return Type::union(options.into_iter().map(|option| {
                    let mut parts = flat.clone();
                    parts.push(option);
                    Type::intersection(parts)
                }));
            }
            flat.push(Type::Union(options));
        }

        flat.sort();
        flat.dedup();

        // Primitive and literal members must agree.
        let mut primitive: Option<Type> = None;
        for t in flat.iter().filter(|t| t.is_primitive_like()) {
            primitive = match primitive {
                None => Some(t.clone()),
                Some(current) => match meet_primitive(&current, t) {
                    Some(met) => Some(met),
                    None => return Type::Never,
                },
            };
        }

        let objects: Vec<Arc<ObjectType>> = flat
            .iter()
            .filter_map(|t| match t {
                Type::Object(o) => Some(o.clone()),
                _ => None,
            })
            .collect();
        let mut rest: Vec<Type> = flat
            .into_iter()
            .filter(|t| !t.is_primitive_like() && !matches!(t, Type::Object(_)))
            .collect();

        if let Some(primitive) = primitive {
            if objects.is_empty() && rest.is_empty() {
                return primitive;
            }
            rest.push(primitive);
        }
        match objects.len() {
            0 => {}
            1 => rest.push(Type::Object(objects[0].clone())),
            _ => rest.push(merge_objects(&objects).into_type()),
        }
        rest.sort();
        match rest.len() {
            0 => Type::Unknown,
            1 => rest.pop().unwrap_or(Type::Unknown),
            _ => Type::Intersection(rest),
        }
    }

    fn is_primitive_like(&self) -> bool {
        matches!(
            self,
            Type::Void
                | Type::Undefined
                | Type::Null
                | Type::String
                | Type::Number
                | Type::Boolean
                | Type::BigInt
                | Type::Symbol
                | Type::StringLiteral(_)
                | Type::NumberLiteral(_)
                | Type::BooleanLiteral(_)
        )
    }

    pub fn as_string_literal(&self) -> Option<&str> {
        match self {
            Type::StringLiteral(value) => Some(value),
            _ => None,
        }
    }

    /// Members of a union, or the type itself.
    pub fn members(&self) -> &[Type] {
        match self {
            Type::Union(members) => members,
            other => std::slice::from_ref(other),
        }
    }

    /// Literal widening: `"a"` becomes `string`, `1` becomes `number`.
    pub fn widen(&self) -> Type {
        match self {
            Type::StringLiteral(_) => Type::String,
            Type::NumberLiteral(_) => Type::Number,
            Type::BooleanLiteral(_) => Type::Boolean,
            Type::Union(members) => Type::union(members.iter().map(Type::widen)),
            other => other.clone(),
        }
    }

    /// Remove `null` and `undefined` from the type.
    pub fn non_nullable(&self) -> Type {
        match self {
            Type::Null | Type::Undefined => Type::Never,
            Type::Union(members) => Type::union(
                members
                    .iter()
                    .filter(|t| !matches!(t, Type::Null | Type::Undefined))
                    .cloned(),
            ),
            other => other.clone(),
        }
    }

    /// The members that can be falsy at run time, narrowed to their falsy
    /// values: what `a && b` yields from `a`.
    pub fn falsy(&self) -> Type {
        Type::union(self.members().iter().filter_map(|member| match member {
            Type::Null | Type::Undefined | Type::Void => Some(member.clone()),
            Type::BooleanLiteral(false) | Type::Boolean => Some(Type::BooleanLiteral(false)),
            Type::String => Some(Type::string_literal("")),
            Type::StringLiteral(value) if value.is_empty() => Some(member.clone()),
            Type::Number => Some(Type::NumberLiteral("0".to_string())),
            Type::NumberLiteral(value) if value == "0" => Some(member.clone()),
            Type::Any | Type::Unknown | Type::BigInt => Some(member.clone()),
            _ => None,
        }))
    }

    /// Drop the members that are always falsy: what `a || b` keeps of `a`.
    pub fn truthy(&self) -> Type {
        Type::union(self.members().iter().filter_map(|member| match member {
            Type::Null | Type::Undefined | Type::Void | Type::BooleanLiteral(false) => None,
            Type::Boolean => Some(Type::BooleanLiteral(true)),
            Type::StringLiteral(value) if value.is_empty() => None,
            Type::NumberLiteral(value) if value == "0" => None,
            other => Some(other.clone()),
        }))
    }

    /// Mark arrays and tuples `readonly`; other types are unchanged.
    pub fn into_readonly(self) -> Type {
        match self {
            Type::Array { element, .. } => Type::Array {
                element,
                readonly: true,
            },
            Type::Tuple { elements, .. } => Type::Tuple {
                elements,
                readonly: true,
            },
            other => other,
        }
    }
}

fn meet_primitive(a: &Type, b: &Type) -> Option<Type> {
    if a == b {
        return Some(a.clone());
    }
    match (a, b) {
        (Type::StringLiteral(_), Type::String) | (Type::NumberLiteral(_), Type::Number) => {
            Some(a.clone())
        }
        (Type::String, Type::StringLiteral(_)) | (Type::Number, Type::NumberLiteral(_)) => {
            Some(b.clone())
        }
        (Type::BooleanLiteral(_), Type::Boolean) => Some(a.clone()),
        (Type::Boolean, Type::BooleanLiteral(_)) => Some(b.clone()),
        _ => None,
    }
}

/// Property-wise merge used for intersections of object types.
pub(crate) fn merge_objects(objects: &[Arc<ObjectType>]) -> ObjectType {
    let mut merged = ObjectType::default();
    for object in objects {
        for (name, prop) in &object.properties {
            match merged.properties.get_mut(name) {
                Some(existing) => {
                    existing.ty = Type::intersection([existing.ty.clone(), prop.ty.clone()]);
                    existing.optional &= prop.optional;
                    existing.readonly |= prop.readonly;
                }
                None => {
                    merged.properties.insert(name.clone(), prop.clone());
                }
            }
        }
        if let Some(index) = &object.index {
            merged.index = Some(Box::new(match merged.index.take() {
                Some(existing) => Type::intersection([*existing, (**index).clone()]),
                None => (**index).clone(),
            }));
        }
    }
    merged
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => f.write_str("any"),
            Type::Unknown => f.write_str("unknown"),
            Type::Never => f.write_str("never"),
            Type::Void => f.write_str("void"),
            Type::Undefined => f.write_str("undefined"),
            Type::Null => f.write_str("null"),
            Type::String => f.write_str("string"),
            Type::Number => f.write_str("number"),
            Type::Boolean => f.write_str("boolean"),
            Type::BigInt => f.write_str("bigint"),
            Type::Symbol => f.write_str("symbol"),
            Type::NonPrimitive => f.write_str("object"),
            Type::StringLiteral(value) => write!(f, "{value:?}"),
            Type::NumberLiteral(value) => f.write_str(value),
            Type::BooleanLiteral(value) => write!(f, "{value}"),
            Type::Object(object) => {
                f.write_str("{ ")?;
                for (name, prop) in &object.properties {
                    if prop.readonly {
                        f.write_str("readonly ")?;
                    }
                    let optional = if prop.optional { "?" } else { "" };
                    write!(f, "{name}{optional}: {}; ", prop.ty)?;
                }
                if let Some(index) = &object.index {
                    write!(f, "[key: string]: {index}; ")?;
                }
                f.write_str("}")
            }
            Type::Array { element, readonly } => {
                if *readonly {
                    f.write_str("readonly ")?;
                }
                if matches!(**element, Type::Union(_) | Type::Intersection(_)) {
                    write!(f, "({element})[]")
                } else {
                    write!(f, "{element}[]")
                }
            }
            Type::Tuple { elements, readonly } => {
                if *readonly {
                    f.write_str("readonly ")?;
                }
                f.write_str("[")?;
                write_joined(f, elements, ", ")?;
                f.write_str("]")
            }
            Type::Union(members) => write_joined(f, members, " | "),
            Type::Intersection(members) => write_joined(f, members, " & "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, types: &[Type], sep: &str) -> fmt::Result {
    for (i, t) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{t}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Type {
        Type::string_literal(s)
    }

    #[test]
    fn test_truthy_and_falsy_parts() {
        let object = Type::object([("id".to_string(), Property::required(lit("A")))]);
        let maybe = Type::union([object.clone(), Type::Undefined, lit("")]);
        assert_eq!(maybe.truthy(), object);
        assert_eq!(maybe.falsy(), Type::union([Type::Undefined, lit("")]));
        assert_eq!(Type::Boolean.truthy(), Type::BooleanLiteral(true));
        assert_eq!(Type::String.falsy(), lit(""));
        assert_eq!(object.falsy(), Type::Never);
    }

    #[test]
    fn test_union_normalization() {
        assert_eq!(Type::union([]), Type::Never);
        assert_eq!(Type::union([lit("a")]), lit("a"));
        assert_eq!(Type::union([lit("b"), lit("a"), lit("b")]), Type::Union(vec![lit("a"), lit("b")]));
        assert_eq!(Type::union([lit("a"), Type::String]), Type::String);
        assert_eq!(Type::union([lit("a"), Type::Any]), Type::Any);
        assert_eq!(Type::union([lit("a"), Type::Never]), lit("a"));
        assert_eq!(
            Type::union([Type::BooleanLiteral(true), Type::BooleanLiteral(false)]),
            Type::Boolean
        );
        assert_eq!(
            Type::union([Type::union([lit("a"), lit("b")]), lit("c")]),
            Type::Union(vec![lit("a"), lit("b"), lit("c")])
        );
    }

    #[test]
    fn test_intersection_normalization() {
        assert_eq!(Type::intersection([lit("a"), Type::String]), lit("a"));
        assert_eq!(Type::intersection([lit("a"), lit("b")]), Type::Never);
        assert_eq!(Type::intersection([Type::String, Type::Number]), Type::Never);
        assert_eq!(
            Type::intersection([Type::union([lit("a"), lit("b")]), lit("a")]),
            lit("a")
        );
        let merged = Type::intersection([
            Type::object([("a".to_string(), Property::required(Type::String))]),
            Type::object([("b".to_string(), Property::required(Type::Number))]),
        ]);
        let Type::Object(object) = merged else {
            panic!("expected merged object");
        };
        assert_eq!(object.properties.len(), 2);
    }

    #[test]
    fn test_widen_and_non_nullable() {
        assert_eq!(lit("a").widen(), Type::String);
        assert_eq!(Type::union([lit("a"), Type::NumberLiteral("1".into())]).widen(),
            Type::Union(vec![Type::String, Type::Number]));
        assert_eq!(Type::union([lit("a"), Type::Undefined, Type::Null]).non_nullable(), lit("a"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::union([lit("b"), lit("a")]).to_string(), r#""a" | "b""#);
        assert_eq!(
            Type::object([("id".to_string(), Property::required(lit("x")))]).to_string(),
            r#"{ id: "x"; }"#
        );
    }
}
