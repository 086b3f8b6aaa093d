//! SQLite connection bootstrap.
//!
//! # Responsibility
//! - Open and configure SQLite connections from resolved connection strings.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a busy timeout set.
//! - This layer owns no schema: it never creates or migrates application
//!   tables outside the upsert staging lifecycle.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;

pub use open::open_connection;

pub type DbResult<T> = Result<T, DbError>;

/// Database transport error, propagated to callers unchanged.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
