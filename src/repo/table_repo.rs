//! Generic table repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Materialize result rows into entities via the resolved column order.
//! - Stream staging grids into destination tables (bulk load).
//! - Orchestrate the staged set-based upsert.
//!
//! # Invariants
//! - Column order is re-resolved on every operation; no per-type cache.
//! - Filtered reads narrow in memory, predicate by predicate (logical AND).
//! - Two concurrent upserts against the same table are not safe: the
//!   staging-table name is deterministic per target table.

use crate::config::{ConfigError, ConnectionStrings};
use crate::db::{open_connection, DbError};
use crate::entity::column::Entity;
use crate::entity::order::{ColumnOrder, ColumnOrderError};
use crate::grid::{DataGrid, GridError};
use crate::sql::{self, SqlError};
use log::{error, info};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// In-memory filter applied by `get_filtered`.
pub type Predicate<'a, E> = &'a dyn Fn(&E) -> bool;

/// Repository error for persistence and query operations.
///
/// Configuration and descriptor problems are fatal per call; database errors
/// carry the driver error unchanged.
#[derive(Debug)]
pub enum RepoError {
    Config(ConfigError),
    Order(ColumnOrderError),
    Grid(GridError),
    Sql(SqlError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Order(err) => write!(f, "{err}"),
            Self::Grid(err) => write!(f, "{err}"),
            Self::Sql(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Order(err) => Some(err),
            Self::Grid(err) => Some(err),
            Self::Sql(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ConfigError> for RepoError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<ColumnOrderError> for RepoError {
    fn from(value: ColumnOrderError) -> Self {
        Self::Order(value)
    }
}

impl From<GridError> for RepoError {
    fn from(value: GridError) -> Self {
        Self::Grid(value)
    }
}

impl From<SqlError> for RepoError {
    fn from(value: SqlError) -> Self {
        Self::Sql(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Row counts reported by one upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Matched rows rewritten because at least one non-key column differed.
    pub updated: usize,
    /// Unmatched staging rows inserted in full.
    pub inserted: usize,
}

/// Public data-access contract, one target table per entity type.
pub trait Repository<E: Entity> {
    /// Reads the whole target table.
    fn get_all(&self) -> RepoResult<Vec<E>>;
    /// Reads the whole table, then narrows it predicate by predicate.
    fn get_filtered(&self, predicates: &[Predicate<'_, E>]) -> RepoResult<Vec<E>>;
    /// Bulk-loads entities into the target table or an override destination.
    fn bulk_insert(&self, entities: &[E], destination: Option<&str>) -> RepoResult<usize>;
    /// Staged set-based upsert: update on row difference, insert on absence.
    fn insert_or_update(&self, entities: &[E]) -> RepoResult<MergeOutcome>;
}

/// SQLite-backed generic repository.
///
/// The connection key names the entry in the configuration provider; every
/// operation resolves it and opens a fresh connection.
pub struct SqliteRepository<'cfg, E> {
    config: &'cfg dyn ConnectionStrings,
    connection_key: &'static str,
    _entity: PhantomData<E>,
}

impl<'cfg, E: Entity> SqliteRepository<'cfg, E> {
    pub fn new(config: &'cfg dyn ConnectionStrings, connection_key: &'static str) -> Self {
        Self {
            config,
            connection_key,
            _entity: PhantomData,
        }
    }

    fn open(&self) -> RepoResult<Connection> {
        let connection_string = self
            .config
            .connection_string(self.connection_key)
            .ok_or_else(|| ConfigError::MissingConnectionString {
                key: self.connection_key.to_string(),
            })?;
        Ok(open_connection(&connection_string)?)
    }
}

impl<E: Entity> Repository<E> for SqliteRepository<'_, E> {
    fn get_all(&self) -> RepoResult<Vec<E>> {
        let order = ColumnOrder::<E>::resolve()?;
        let conn = self.open()?;

        let select = sql::select_columns(E::TABLE, &order.names())?;
        let mut stmt = conn.prepare(&select)?;
        let mut rows = stmt.query([])?;

        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            entities.push(materialize_row(&order, row)?);
        }

        Ok(entities)
    }

    fn get_filtered(&self, predicates: &[Predicate<'_, E>]) -> RepoResult<Vec<E>> {
        let mut entities = self.get_all()?;
        for predicate in predicates {
            entities.retain(|entity| predicate(entity));
        }
        Ok(entities)
    }

    fn bulk_insert(&self, entities: &[E], destination: Option<&str>) -> RepoResult<usize> {
        let started_at = Instant::now();
        let destination = destination.unwrap_or(E::TABLE);

        let order = ColumnOrder::<E>::resolve()?;
        let grid = DataGrid::from_entities(entities, &order)?;

        let mut conn = self.open()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let loaded = load_grid(&tx, &grid, destination)?;
        tx.commit()?;

        info!(
            "event=bulk_insert module=repo status=ok table={destination} rows={loaded} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(loaded)
    }

    fn insert_or_update(&self, entities: &[E]) -> RepoResult<MergeOutcome> {
        let started_at = Instant::now();

        let order = ColumnOrder::<E>::resolve()?;
        let grid = DataGrid::from_entities(entities, &order)?;
        let staging = sql::staging_table_name(E::TABLE)?;

        let mut conn = self.open()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Dropping the transaction on the error path rolls everything back,
        // staging table included.
        let outcome = match run_merge::<E>(&tx, &grid, &order, &staging) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(
                    "event=insert_or_update module=repo status=error table={} duration_ms={} error={err}",
                    E::TABLE,
                    started_at.elapsed().as_millis()
                );
                return Err(err);
            }
        };
        tx.commit()?;

        info!(
            "event=insert_or_update module=repo status=ok table={} updated={} inserted={} duration_ms={}",
            E::TABLE,
            outcome.updated,
            outcome.inserted,
            started_at.elapsed().as_millis()
        );
        Ok(outcome)
    }
}

/// Materializes one positional result row into an entity.
///
/// Columns arrive in resolved order, so result position `i` is the `i`-th
/// resolved column. NULL keeps the field's type default; non-NULL values are
/// assigned through the descriptor accessor without further coercion.
fn materialize_row<E: Entity>(order: &ColumnOrder<E>, row: &Row<'_>) -> RepoResult<E> {
    let mut entity = E::default();
    for (position, column) in order.columns().enumerate() {
        let value: Value = row.get(position)?;
        if matches!(value, Value::Null) {
            continue;
        }
        (column.set)(&mut entity, value).map_err(|err| {
            RepoError::InvalidData(format!("column `{}`: {err}", column.name))
        })?;
    }
    Ok(entity)
}

/// Streams a staging grid into `destination` on the given connection.
///
/// One prepared insert naming the grid columns, executed per row; any
/// failure aborts the whole load.
fn load_grid(conn: &Connection, grid: &DataGrid, destination: &str) -> RepoResult<usize> {
    if grid.is_empty() {
        return Ok(0);
    }

    let insert = sql::insert_row(destination, &grid.column_names())?;
    let mut stmt = conn.prepare(&insert)?;

    let mut loaded = 0;
    for row in grid.rows() {
        stmt.execute(params_from_iter(row.iter()))?;
        loaded += 1;
    }
    Ok(loaded)
}

/// Upsert protocol body, executed inside the caller's transaction:
/// create staging, load, merge update, merge insert, drop staging.
fn run_merge<E: Entity>(
    tx: &Transaction<'_>,
    grid: &DataGrid,
    order: &ColumnOrder<E>,
    staging: &str,
) -> RepoResult<MergeOutcome> {
    tx.execute_batch(&sql::create_staging_table(E::TABLE, staging)?)?;
    load_grid(tx, grid, staging)?;

    let names = order.names();
    let non_key: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| *name != E::KEY_COLUMN)
        .collect();

    let updated = if non_key.is_empty() {
        // Key-only entities have nothing to rewrite on match.
        0
    } else {
        tx.execute(
            &sql::merge_update(E::TABLE, staging, E::KEY_COLUMN, &non_key)?,
            [],
        )?
    };
    let inserted = tx.execute(
        &sql::merge_insert(E::TABLE, staging, E::KEY_COLUMN, &names)?,
        [],
    )?;

    tx.execute_batch(&sql::drop_table(staging)?)?;
    Ok(MergeOutcome { updated, inserted })
}
