//! Generated-SQL builders for reads, staging and the set-based merge.
//!
//! # Responsibility
//! - Produce every SQL statement this layer generates, in one place.
//! - Validate identifiers before interpolating them into statement text.
//!
//! # Invariants
//! - No table or column name reaches statement text without passing the
//!   identifier check; bind parameters carry all values.
//! - The staging table name is deterministic per target table.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// SQL generation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlError {
    /// An identifier failed the allow-list check.
    InvalidIdentifier(String),
}

impl Display for SqlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier(name) => {
                write!(f, "invalid SQL identifier `{name}`")
            }
        }
    }
}

impl Error for SqlError {}

/// Checks one identifier against the allow-list pattern.
pub fn ensure_identifier(name: &str) -> Result<(), SqlError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(SqlError::InvalidIdentifier(name.to_string()))
    }
}

fn ensure_identifiers(names: &[&str]) -> Result<(), SqlError> {
    for name in names {
        ensure_identifier(name)?;
    }
    Ok(())
}

/// Deterministic staging-table name for one target table.
pub fn staging_table_name(table: &str) -> Result<String, SqlError> {
    ensure_identifier(table)?;
    Ok(format!("__Temp_Table_{table}_Source"))
}

/// `SELECT <columns> FROM <table>`, columns in resolved order.
pub fn select_columns(table: &str, columns: &[&str]) -> Result<String, SqlError> {
    ensure_identifier(table)?;
    ensure_identifiers(columns)?;
    Ok(format!("SELECT {} FROM {table}", columns.join(", ")))
}

/// Single-row insert with positional placeholders, mapping each grid column
/// to the identically named destination column.
pub fn insert_row(table: &str, columns: &[&str]) -> Result<String, SqlError> {
    ensure_identifier(table)?;
    ensure_identifiers(columns)?;
    let placeholders: Vec<String> = (1..=columns.len()).map(|n| format!("?{n}")).collect();
    Ok(format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    ))
}

/// Creates a zero-row staging table shaped like the target.
pub fn create_staging_table(target: &str, staging: &str) -> Result<String, SqlError> {
    ensure_identifier(target)?;
    ensure_identifier(staging)?;
    Ok(format!(
        "CREATE TABLE {staging} AS SELECT * FROM {target} LIMIT 0"
    ))
}

/// Merge update step: rewrite non-key columns of every matched row whose
/// contents differ from staging in at least one non-key column.
///
/// `IS NOT` keeps the difference condition NULL-safe, so value/NULL
/// transitions fire an update.
pub fn merge_update(
    target: &str,
    staging: &str,
    key: &str,
    non_key_columns: &[&str],
) -> Result<String, SqlError> {
    ensure_identifier(target)?;
    ensure_identifier(staging)?;
    ensure_identifier(key)?;
    ensure_identifiers(non_key_columns)?;

    let assignments: Vec<String> = non_key_columns
        .iter()
        .map(|column| format!("{column} = source.{column}"))
        .collect();
    let differences: Vec<String> = non_key_columns
        .iter()
        .map(|column| format!("target.{column} IS NOT source.{column}"))
        .collect();

    Ok(format!(
        "UPDATE {target} AS target SET {} FROM {staging} AS source \
         WHERE target.{key} = source.{key} AND ({})",
        assignments.join(", "),
        differences.join(" OR ")
    ))
}

/// Merge insert step: copy every staging row whose key is absent from the
/// target, full row including the key.
pub fn merge_insert(
    target: &str,
    staging: &str,
    key: &str,
    columns: &[&str],
) -> Result<String, SqlError> {
    ensure_identifier(target)?;
    ensure_identifier(staging)?;
    ensure_identifier(key)?;
    ensure_identifiers(columns)?;

    let sourced: Vec<String> = columns
        .iter()
        .map(|column| format!("source.{column}"))
        .collect();

    Ok(format!(
        "INSERT INTO {target} ({}) SELECT {} FROM {staging} AS source \
         WHERE NOT EXISTS (SELECT 1 FROM {target} AS target WHERE target.{key} = source.{key})",
        columns.join(", "),
        sourced.join(", ")
    ))
}

/// `DROP TABLE <table>`.
pub fn drop_table(table: &str) -> Result<String, SqlError> {
    ensure_identifier(table)?;
    Ok(format!("DROP TABLE {table}"))
}
