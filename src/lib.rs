//! Generic staged-merge repository layer over SQLite.
//! This crate is the single source of truth for entity/table mapping rules.

pub mod config;
pub mod db;
pub mod entity;
pub mod grid;
pub mod logging;
pub mod repo;
pub mod sql;

pub use config::{ConfigError, ConnectionStrings, FileConfig, MapConfig};
pub use entity::column::{ColumnDef, ColumnKind, Entity, EntityKey, ValueError};
pub use entity::order::{ColumnOrder, ColumnOrderError};
pub use grid::{DataGrid, GridColumn, GridError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use repo::table_repo::{
    MergeOutcome, Predicate, RepoError, RepoResult, Repository, SqliteRepository,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
