//! The assignability relation.

use super::properties::property_of;
use super::types::{ObjectType, Type};

/// Relation depth after which two types are assumed related, so recursive
/// structures terminate.
const MAX_DEPTH: usize = 32;

/// Whether a value of type `source` may be assigned to `target`.
///
/// `strict` mirrors `strictNullChecks`: when off, `null` and `undefined` are
/// assignable to everything.
pub fn is_assignable(source: &Type, target: &Type, strict: bool) -> bool {
    Relation { strict }.related(source, target, 0)
}

struct Relation {
    strict: bool,
}

impl Relation {
    fn related(&self, source: &Type, target: &Type, depth: usize) -> bool {
        if depth > MAX_DEPTH || source == target {
            return true;
        }
        let depth = depth + 1;

        match (source, target) {
            (Type::Never, _) => return true,
            (Type::Any, Type::Never) => return false,
            (Type::Any, _) | (_, Type::Any) | (_, Type::Unknown) => return true,
            (Type::Union(members), _) => {
                return members.iter().all(|m| self.related(m, target, depth));
            }
            (_, Type::Intersection(members)) => {
                return members.iter().all(|m| self.related(source, m, depth));
            }
            (_, Type::Union(members)) => {
                return members.iter().any(|m| self.related(source, m, depth));
            }
            (Type::Intersection(members), _) => {
                return members.iter().any(|m| self.related(m, target, depth));
            }
            _ => {}
        }

        match source {
            Type::Undefined => {
                return !self.strict || matches!(target, Type::Void | Type::Undefined);
            }
            Type::Null => return !self.strict || matches!(target, Type::Null),
            Type::Unknown | Type::Void => return false,
            _ => {}
        }

        match (source, target) {
            (Type::StringLiteral(_), Type::String)
            | (Type::NumberLiteral(_), Type::Number)
            | (Type::BooleanLiteral(_), Type::Boolean) => true,
            (Type::Object(_) | Type::Array { .. } | Type::Tuple { .. }, Type::NonPrimitive) => {
                true
            }
            (
                Type::Array {
                    element: s,
                    readonly: s_ro,
                },
                Type::Array {
                    element: t,
                    readonly: t_ro,
                },
            ) => (!s_ro || *t_ro) && self.related(s, t, depth),
            (
                Type::Tuple {
                    elements,
                    readonly: s_ro,
                },
                Type::Array {
                    element,
                    readonly: t_ro,
                },
            ) => (!s_ro || *t_ro) && elements.iter().all(|e| self.related(e, element, depth)),
            (
                Type::Tuple {
                    elements: s,
                    readonly: s_ro,
                },
                Type::Tuple {
                    elements: t,
                    readonly: t_ro,
                },
            ) => {
                (!s_ro || *t_ro)
                    && s.len() == t.len()
                    && s.iter().zip(t).all(|(a, b)| self.related(a, b, depth))
            }
            (_, Type::Object(target)) => self.structural(source, target, depth),
            _ => false,
        }
    }

    /// Structural check of `source` against an object type.
    fn structural(&self, source: &Type, target: &ObjectType, depth: usize) -> bool {
        let source_object = match source {
            Type::Object(object) => Some(object.as_ref()),
            Type::Array { .. }
            | Type::Tuple { .. }
            | Type::String
            | Type::StringLiteral(_)
            | Type::Number
            | Type::NumberLiteral(_)
            | Type::Boolean
            | Type::BooleanLiteral(_)
            | Type::BigInt
            | Type::Symbol
            | Type::NonPrimitive => None,
            _ => return false,
        };

        for (name, prop) in &target.properties {
            let source_prop = match source_object {
                Some(object) => object.properties.get(name).map(|p| (p.ty.clone(), p.optional)),
                None => property_of(source, name, self.strict).map(|t| (t, false)),
            };
            match source_prop {
                Some((ty, optional)) => {
                    if optional && !prop.optional {
                        return false;
                    }
                    let target_ty = if prop.optional && self.strict {
                        Type::union([prop.ty.clone(), Type::Undefined])
                    } else {
                        prop.ty.clone()
                    };
                    if !self.related(&ty, &target_ty, depth) {
                        return false;
                    }
                }
                None if prop.optional => {}
                None => return false,
            }
        }

        if let (Some(index), Some(object)) = (&target.index, source_object) {
            let props_ok = object
                .properties
                .values()
                .all(|p| self.related(&p.ty, index, depth));
            let index_ok = object
                .index
                .as_deref()
                .map_or(true, |s| self.related(s, index, depth));
            return props_ok && index_ok;
        }
        true
    }
}
