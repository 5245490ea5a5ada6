//! Type evaluation over real source files.

mod common;

use common::Fixture;
use errcontract_analysis::checker::{Property, Type, TypeChecker};
use errcontract_analysis::project::{FileId, Project};
use errcontract_core::ContractConfig;

const TYPES: &str = r#"
import * as shared from './shared';
import { Status as ImportedStatus } from './shared';

export type Id = 'a' | 'b';
type Box<T, U = string> = { value: T; label: U };
type Boxed = Box<Id>;

interface Named {
  name: string;
}

interface Person extends Named {
  readonly age?: number;
}

export class Model {
  id: Id;
  tags: string[];
}

export class Derived extends Model {
  extra: boolean;
}

type Picked = Pick<Person, 'name'>;
type Keys = Exclude<'x' | 'y' | 'z', 'y'>;
type Lookup = Person['name'];
type Element = readonly Id[];
type Mixed = readonly string[] | number[];
type Namespaced = shared.Status;
type Aliased = ImportedStatus;
type Recursive = { next: Recursive };

const literal = 'fixed';
let widened = 'loose';
const frozen = { kind: 'k', list: [1, 2] } as const;
const loose = { kind: 'k', list: [1, 2] };
const annotated: Id = 'a';
const viaNamespace = shared.defaultStatus;
const model = new Model();
function make(): Person {
  return { name: 'n' };
}
const made = make();
const picked = frozen.list[0];
let kept = frozen.kind;
const either = widened ? frozen : undefined;
const fallback = either ?? loose;
"#;

const SHARED: &str = r#"
export type Status = 'on' | 'off';
export const defaultStatus = 'on';
"#;

fn setup() -> (Fixture, TypeChecker, FileId) {
    let fixture = Fixture::new();
    let path = fixture.write("src/types.ts", TYPES);
    fixture.write("src/shared.ts", SHARED);
    let project = Project::load(fixture.root(), &ContractConfig::default()).unwrap();
    let file = project.file_id(&path.canonicalize().unwrap()).unwrap();
    (fixture, TypeChecker::new(project), file)
}

fn lit(s: &str) -> Type {
    Type::string_literal(s)
}

fn id() -> Type {
    Type::union([lit("a"), lit("b")])
}

#[test]
fn test_aliases_and_generic_defaults() {
    let (_fixture, checker, file) = setup();
    assert_eq!(checker.named_type(file, "Id"), id());
    assert_eq!(
        checker.named_type(file, "Boxed"),
        Type::object([
            ("label".to_string(), Property::required(Type::String)),
            ("value".to_string(), Property::required(id())),
        ])
    );
}

#[test]
fn test_interfaces_with_extends() {
    let (_fixture, checker, file) = setup();
    let person = checker.named_type(file, "Person");
    assert_eq!(checker.property_of(&person, "name"), Some(Type::String));
    assert_eq!(
        checker.property_of(&person, "age"),
        Some(Type::union([Type::Number, Type::Undefined]))
    );
    assert_eq!(checker.property_of(&person, "missing"), None);
}

#[test]
fn test_class_instance_types_include_base_members() {
    let (_fixture, checker, file) = setup();
    let derived = checker.named_type(file, "Derived");
    assert_eq!(checker.property_of(&derived, "id"), Some(id()));
    assert_eq!(checker.property_of(&derived, "extra"), Some(Type::Boolean));
    assert_eq!(
        checker.property_of(&derived, "tags"),
        Some(Type::Array {
            element: Box::new(Type::String),
            readonly: false
        })
    );
    let model = checker.value_type_of(file, "model");
    assert_eq!(checker.property_of(&model, "id"), Some(id()));
}

#[test]
fn test_utility_and_indexed_types() {
    let (_fixture, checker, file) = setup();
    assert_eq!(
        checker.named_type(file, "Picked"),
        Type::object([("name".to_string(), Property::required(Type::String))])
    );
    assert_eq!(
        checker.named_type(file, "Keys"),
        Type::union([lit("x"), lit("z")])
    );
    assert_eq!(checker.named_type(file, "Lookup"), Type::String);
    assert_eq!(
        checker.named_type(file, "Element"),
        Type::Array {
            element: Box::new(id()),
            readonly: true
        }
    );
}

#[test]
fn test_readonly_applies_to_leading_union_member() {
    let (_fixture, checker, file) = setup();
    assert_eq!(
        checker.named_type(file, "Mixed"),
        Type::union([
            Type::Array {
                element: Box::new(Type::String),
                readonly: true
            },
            Type::Array {
                element: Box::new(Type::Number),
                readonly: false
            },
        ])
    );
}

#[test]
fn test_conditional_and_nullish_expressions() {
    let (_fixture, checker, file) = setup();
    let either = checker.value_type_of(file, "either");
    assert_eq!(
        checker.property_of(&either.non_nullable(), "kind"),
        Some(lit("k"))
    );
    let fallback = checker.value_type_of(file, "fallback");
    assert_eq!(checker.property_of(&fallback, "kind"), Some(Type::String));
    assert!(checker.property_of(&fallback, "list").is_some());
}

#[test]
fn test_mutable_binding_keeps_declared_literal() {
    let (_fixture, checker, file) = setup();
    assert_eq!(checker.value_type_of(file, "kept"), lit("k"));
}

#[test]
fn test_types_across_modules() {
    let (_fixture, checker, file) = setup();
    let status = Type::union([lit("on"), lit("off")]);
    assert_eq!(checker.named_type(file, "Namespaced"), status);
    assert_eq!(checker.named_type(file, "Aliased"), status);
    assert_eq!(checker.value_type_of(file, "viaNamespace"), lit("on"));
}

#[test]
fn test_recursive_alias_terminates() {
    let (_fixture, checker, file) = setup();
    let recursive = checker.named_type(file, "Recursive");
    assert!(checker.property_of(&recursive, "next").is_some());
}

#[test]
fn test_literal_widening() {
    let (_fixture, checker, file) = setup();
    assert_eq!(checker.value_type_of(file, "literal"), lit("fixed"));
    assert_eq!(checker.value_type_of(file, "widened"), Type::String);
    assert_eq!(checker.value_type_of(file, "annotated"), id());

    let frozen = checker.value_type_of(file, "frozen");
    assert_eq!(checker.property_of(&frozen, "kind"), Some(lit("k")));
    assert_eq!(
        checker.property_of(&frozen, "list"),
        Some(Type::Tuple {
            elements: vec![
                Type::NumberLiteral("1".to_string()),
                Type::NumberLiteral("2".to_string())
            ],
            readonly: true
        })
    );
    assert_eq!(
        checker.value_type_of(file, "picked"),
        Type::NumberLiteral("1".to_string())
    );

    let loose = checker.value_type_of(file, "loose");
    assert_eq!(checker.property_of(&loose, "kind"), Some(Type::String));
    assert_eq!(
        checker.property_of(&loose, "list"),
        Some(Type::Array {
            element: Box::new(Type::Number),
            readonly: false
        })
    );
}

#[test]
fn test_call_uses_declared_return_type() {
    let (_fixture, checker, file) = setup();
    let made = checker.value_type_of(file, "made");
    assert_eq!(checker.property_of(&made, "name"), Some(Type::String));
}

#[test]
fn test_unknown_names_are_any() {
    let (_fixture, checker, file) = setup();
    assert_eq!(checker.value_type_of(file, "nowhere"), Type::Any);
    assert_eq!(checker.named_type(file, "Nowhere"), Type::Any);
}
