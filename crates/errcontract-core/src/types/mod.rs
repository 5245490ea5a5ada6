//! Shared collection types.

pub mod collections;
