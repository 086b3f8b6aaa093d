//! Static column descriptors for mapped entities.
//!
//! # Responsibility
//! - Describe each persisted field: column name, ordinal marking, storage
//!   class and plain-function accessors.
//! - Bound the supported primary-key shapes to a small closed set.
//!
//! # Invariants
//! - `ColumnDef` accessors are non-capturing `fn` pointers so descriptor
//!   slices stay `'static` constants.
//! - A `set` accessor never coerces across storage classes; mismatches are
//!   reported, not repaired.

use rusqlite::types::{Type, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Storage class of one mapped column.
///
/// Mirrors the SQLite storage classes; used to type staging-grid columns and
/// to reject values of the wrong shape before they reach the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
    Blob,
}

impl ColumnKind {
    /// Returns whether `value` belongs to this storage class.
    ///
    /// `Value::Null` matches every kind: NULL is the column-independent
    /// absence marker, not a storage class of its own.
    pub fn admits(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (Self::Integer, Value::Integer(_))
                | (Self::Real, Value::Real(_))
                | (Self::Text, Value::Text(_))
                | (Self::Blob, Value::Blob(_))
        )
    }
}

impl Display for ColumnKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Integer => "Integer",
            Self::Real => "Real",
            Self::Text => "Text",
            Self::Blob => "Blob",
        };
        write!(f, "{name}")
    }
}

/// Assignment failure reported by a `set` accessor.
#[derive(Debug)]
pub enum ValueError {
    /// The driver value belongs to the wrong storage class.
    TypeMismatch { expected: ColumnKind, found: Type },
    /// The value has the right storage class but cannot be represented in
    /// the field (for example, key text that is not a valid UUID).
    Malformed { detail: String },
}

impl ValueError {
    pub fn mismatch(expected: ColumnKind, found: &Value) -> Self {
        Self::TypeMismatch {
            expected,
            found: found.data_type(),
        }
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed {
            detail: detail.into(),
        }
    }
}

impl Display for ValueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected {expected} value, found {found}")
            }
            Self::Malformed { detail } => write!(f, "malformed value: {detail}"),
        }
    }
}

impl Error for ValueError {}

/// Static descriptor for one persisted field of an entity.
///
/// The `ordinal` is the column-order marking: it fixes the column position in
/// generated SQL and staging grids. `None` means the field was declared
/// without a marking, which `ColumnOrder::resolve` treats as a programmer
/// error.
pub struct ColumnDef<E> {
    /// Column name in the target table.
    pub name: &'static str,
    /// Ordinal marking. Need not be contiguous across columns.
    pub ordinal: Option<u32>,
    /// Storage class of the column.
    pub kind: ColumnKind,
    /// Reads the field from an entity as a driver value.
    pub get: fn(&E) -> Value,
    /// Writes a non-NULL driver value back into the field.
    pub set: fn(&mut E, Value) -> Result<(), ValueError>,
}

/// Contract implemented by every table-mapped record type.
///
/// `Default` supplies the type defaults substituted for NULL columns during
/// materialization; descriptors in `COLUMNS` carry everything else. The
/// `'static` bound lets descriptor slices live as constants.
pub trait Entity: Default + Clone + 'static {
    /// Primary-key type, restricted to the supported key shapes.
    type Key: EntityKey;

    /// Target table name.
    const TABLE: &'static str;
    /// Column name of the primary key. Must appear in `COLUMNS`.
    const KEY_COLUMN: &'static str;
    /// Static descriptors for every persisted field.
    const COLUMNS: &'static [ColumnDef<Self>];

    /// Returns the primary-key value of this instance.
    fn key(&self) -> Self::Key;
}

/// Closed set of supported primary-key shapes.
///
/// Kept deliberately small: integer keys, string keys and UUID keys cover
/// the repository variants this layer replaces. The declared storage class
/// is checked against the key column's descriptor during order resolution.
pub trait EntityKey: Clone + PartialEq {
    /// Storage class keys of this shape occupy.
    fn kind() -> ColumnKind;
}

impl EntityKey for i64 {
    fn kind() -> ColumnKind {
        ColumnKind::Integer
    }
}

impl EntityKey for String {
    fn kind() -> ColumnKind {
        ColumnKind::Text
    }
}

impl EntityKey for Uuid {
    fn kind() -> ColumnKind {
        ColumnKind::Text
    }
}
