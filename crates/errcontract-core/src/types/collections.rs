//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;
pub use std::collections::{BTreeMap, BTreeSet};

/// SmallVec for type arguments and heritage clauses (usually <2).
pub type SmallVec2<T> = SmallVec<[T; 2]>;
