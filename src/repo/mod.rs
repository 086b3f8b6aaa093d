//! Repository layer: public data-access contract and SQLite implementation.
//!
//! # Responsibility
//! - Expose the read-all / filtered-read / bulk-insert / upsert contract per
//!   entity type.
//! - Keep generated-SQL and staging details inside the persistence boundary.
//!
//! # Invariants
//! - Every operation resolves a fresh connection from configuration; no
//!   connection is reused across calls.
//! - The upsert path is one transaction: staging, load, merge and drop all
//!   commit or roll back together.

pub mod table_repo;
