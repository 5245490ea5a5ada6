//! Property tests for union synthesis and assignability.

use errcontract_analysis::checker::assignability::is_assignable;
use errcontract_analysis::checker::Type;
use errcontract_analysis::contract::ErrorIdSet;
use proptest::prelude::*;

fn id_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

proptest! {
    #[test]
    fn declared_ids_are_assignable(ids in prop::collection::vec(id_strategy(), 1..8)) {
        let set: ErrorIdSet = ids.iter().cloned().collect();
        let union = set.permitted_union();
        for id in &ids {
            prop_assert!(is_assignable(&Type::string_literal(id.clone()), &union, true));
        }
    }

    #[test]
    fn undeclared_id_is_rejected(
        ids in prop::collection::vec(id_strategy(), 0..8),
        candidate in "[A-Z]{1,6}",
    ) {
        let set: ErrorIdSet = ids.into_iter().collect();
        let union = set.permitted_union();
        prop_assert!(!is_assignable(&Type::string_literal(candidate), &union, true));
        prop_assert!(!is_assignable(&Type::String, &union, true));
    }

    #[test]
    fn union_is_order_independent(ids in prop::collection::vec(id_strategy(), 0..8)) {
        let forward = Type::union(ids.iter().cloned().map(Type::string_literal));
        let backward = Type::union(ids.iter().rev().cloned().map(Type::string_literal));
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn subset_union_is_assignable_to_superset(ids in prop::collection::vec(id_strategy(), 1..8), cut in 0usize..8) {
        let cut = cut.min(ids.len());
        let all: ErrorIdSet = ids.iter().cloned().collect();
        let some: ErrorIdSet = ids[..cut].iter().cloned().collect();
        prop_assert!(is_assignable(&some.permitted_union(), &all.permitted_union(), true));
    }

    #[test]
    fn never_and_any_edges(ids in prop::collection::vec(id_strategy(), 0..4)) {
        let union = ids.into_iter().collect::<ErrorIdSet>().permitted_union();
        prop_assert!(is_assignable(&Type::Never, &union, true));
        prop_assert!(is_assignable(&union, &Type::Unknown, true));
        if union != Type::Never {
            prop_assert!(is_assignable(&Type::Any, &union, true));
        }
    }
}
