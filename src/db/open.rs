//! Connection opening from resolved connection strings.
//!
//! # Responsibility
//! - Map a connection string to a file or in-memory SQLite connection.
//! - Configure connection pragmas required by repository behavior.
//!
//! # Invariants
//! - Connections are opened per repository call and dropped with it; any
//!   pooling is the driver's concern, not this layer's.

use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::time::{Duration, Instant};

const IN_MEMORY: &str = ":memory:";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a connection for the given connection string.
///
/// `:memory:` opens a fresh in-memory database; anything else is treated as
/// a database file path.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_connection(connection_string: &str) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = if connection_string == IN_MEMORY {
        "memory"
    } else {
        "file"
    };
    info!("event=db_open module=db status=start mode={mode}");

    let opened = if connection_string == IN_MEMORY {
        Connection::open_in_memory()
    } else {
        Connection::open(connection_string)
    };

    let conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match configure_connection(&conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_configure_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn configure_connection(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(())
}
