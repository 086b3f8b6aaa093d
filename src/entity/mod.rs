//! Entity/table mapping metadata.
//!
//! # Responsibility
//! - Define the static column descriptor contract every mapped entity
//!   declares (`Entity`, `ColumnDef`).
//! - Resolve descriptor ordinal markings into the column order used by all
//!   generated SQL and staging grids.
//!
//! # Invariants
//! - Descriptors are compile-time constants; no runtime introspection.
//! - Every column that participates in persistence must carry exactly one
//!   ordinal marking, enforced by `ColumnOrder::resolve`.

pub mod column;
pub mod order;
