//! Column-order resolution from descriptor ordinal markings.
//!
//! # Responsibility
//! - Turn an entity's descriptor slice into the ascending column order used
//!   by generated SQL and staging grids.
//! - Reject entities whose descriptors are incompletely marked.
//!
//! # Invariants
//! - Resolution is recomputed per call; there is no cross-call cache.
//! - Ordinals need not be contiguous. Duplicate ordinals resolve in an
//!   unspecified relative order.

use crate::entity::column::{ColumnDef, ColumnKind, Entity, EntityKey};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Configuration error raised while resolving column order.
///
/// These are programmer errors in the entity declaration, deliberately
/// fatal: there is no sensible runtime recovery from a half-mapped entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOrderError {
    /// A descriptor was declared without an ordinal marking.
    MissingOrderMarking { field: &'static str },
    /// The declared key column has no descriptor.
    KeyColumnUnlisted { column: &'static str },
    /// The key column's storage class contradicts the entity's key type.
    KeyKindMismatch {
        column: &'static str,
        key_kind: ColumnKind,
        declared: ColumnKind,
    },
}

impl Display for ColumnOrderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingOrderMarking { field } => {
                write!(f, "no order marking declared for column `{field}`")
            }
            Self::KeyColumnUnlisted { column } => {
                write!(f, "key column `{column}` has no descriptor")
            }
            Self::KeyKindMismatch {
                column,
                key_kind,
                declared,
            } => write!(
                f,
                "key column `{column}` is declared {declared} but the key type stores {key_kind}"
            ),
        }
    }
}

impl Error for ColumnOrderError {}

/// Resolved ascending column order for one entity type.
pub struct ColumnOrder<E: 'static> {
    entries: Vec<(u32, &'static ColumnDef<E>)>,
}

impl<E: 'static> Debug for ColumnOrder<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Descriptors carry fn pointers; render ordinal/name pairs only.
        f.debug_struct("ColumnOrder")
            .field("entries", &self.entries().collect::<Vec<_>>())
            .finish()
    }
}

impl<E: Entity> ColumnOrder<E> {
    /// Resolves the descriptor ordinal markings into ascending order.
    ///
    /// # Errors
    /// - `MissingOrderMarking` when any descriptor lacks an ordinal,
    ///   naming the offending column.
    /// - `KeyColumnUnlisted` when `E::KEY_COLUMN` is absent from the
    ///   descriptors.
    /// - `KeyKindMismatch` when the key descriptor's storage class
    ///   contradicts `E::Key`.
    pub fn resolve() -> Result<Self, ColumnOrderError> {
        let mut entries = Vec::with_capacity(E::COLUMNS.len());

        for column in E::COLUMNS {
            match column.ordinal {
                Some(ordinal) => entries.push((ordinal, column)),
                None => {
                    return Err(ColumnOrderError::MissingOrderMarking { field: column.name });
                }
            }
        }

        let key = entries
            .iter()
            .map(|(_, col)| *col)
            .find(|col| col.name == E::KEY_COLUMN)
            .ok_or(ColumnOrderError::KeyColumnUnlisted {
                column: E::KEY_COLUMN,
            })?;
        if key.kind != E::Key::kind() {
            return Err(ColumnOrderError::KeyKindMismatch {
                column: E::KEY_COLUMN,
                key_kind: E::Key::kind(),
                declared: key.kind,
            });
        }

        entries.sort_by_key(|(ordinal, _)| *ordinal);
        Ok(Self { entries })
    }
}

impl<E: 'static> ColumnOrder<E> {
    /// Iterates descriptors in resolved order.
    pub fn columns(&self) -> impl Iterator<Item = &'static ColumnDef<E>> + '_ {
        self.entries.iter().map(|(_, column)| *column)
    }

    /// Iterates `(ordinal, column name)` pairs in resolved order.
    pub fn entries(&self) -> impl Iterator<Item = (u32, &'static str)> + '_ {
        self.entries
            .iter()
            .map(|(ordinal, column)| (*ordinal, column.name))
    }

    /// Column names in resolved order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(_, column)| column.name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
