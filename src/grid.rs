//! In-memory staging grid for bulk loading.
//!
//! # Responsibility
//! - Hold one typed column per ordered field and one value row per entity,
//!   ready to stream into a destination table.
//!
//! # Invariants
//! - Column shape comes from the static descriptors, so an empty entity
//!   collection still yields a fully shaped grid.
//! - Every stored value matches its column's storage class or is NULL.

use crate::entity::column::{ColumnKind, Entity};
use crate::entity::order::ColumnOrder;
use rusqlite::types::{Type, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Build error for staging grids.
#[derive(Debug)]
pub enum GridError {
    /// An entity produced a value outside its column's storage class.
    TypeMismatch {
        column: &'static str,
        expected: ColumnKind,
        found: Type,
    },
}

impl Display for GridError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeMismatch {
                column,
                expected,
                found,
            } => write!(
                f,
                "column `{column}` expects {expected} values, entity produced {found}"
            ),
        }
    }
}

impl Error for GridError {}

/// One typed grid column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridColumn {
    pub name: &'static str,
    pub kind: ColumnKind,
}

/// Columnar staging structure: the bulk-load payload for one entity slice.
#[derive(Debug)]
pub struct DataGrid {
    columns: Vec<GridColumn>,
    rows: Vec<Vec<Value>>,
}

impl DataGrid {
    /// Builds a grid from entities using the resolved column order.
    ///
    /// Values are copied positionally; `None` fields arrive here as
    /// `Value::Null` and map to the SQL NULL marker unchanged.
    ///
    /// # Errors
    /// - `TypeMismatch` when a `get` accessor yields a value outside the
    ///   declared storage class.
    pub fn from_entities<E: Entity>(
        entities: &[E],
        order: &ColumnOrder<E>,
    ) -> Result<Self, GridError> {
        let columns: Vec<GridColumn> = order
            .columns()
            .map(|column| GridColumn {
                name: column.name,
                kind: column.kind,
            })
            .collect();

        let mut rows = Vec::with_capacity(entities.len());
        for entity in entities {
            let mut row = Vec::with_capacity(columns.len());
            for column in order.columns() {
                let value = (column.get)(entity);
                if !column.kind.admits(&value) {
                    return Err(GridError::TypeMismatch {
                        column: column.name,
                        expected: column.kind,
                        found: value.data_type(),
                    });
                }
                row.push(value);
            }
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[GridColumn] {
        &self.columns
    }

    /// Column names in grid order.
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.name).collect()
    }

    /// Iterates value rows in insertion order.
    pub fn rows(&self) -> impl Iterator<Item = &[Value]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
