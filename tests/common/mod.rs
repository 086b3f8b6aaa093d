//! Shared fixtures: mapped entity types and a disposable on-disk database.
//!
//! Repositories open a fresh connection per operation, so test databases
//! must be durable between calls; a tempdir-backed file database covers
//! that.

#![allow(dead_code)]

use rowstage::{ColumnDef, ColumnKind, Entity, MapConfig, ValueError};
use rusqlite::types::Value;
use rusqlite::Connection;
use tempfile::TempDir;
use uuid::Uuid;

pub const CONNECTION_KEY: &str = "main";

/// Integer-keyed fixture entity mapped to the `People` table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub age: Option<i64>,
    pub email: Option<String>,
}

impl Entity for Person {
    type Key = i64;

    const TABLE: &'static str = "People";
    const KEY_COLUMN: &'static str = "Id";
    const COLUMNS: &'static [ColumnDef<Self>] = &[
        ColumnDef {
            name: "Id",
            ordinal: Some(0),
            kind: ColumnKind::Integer,
            get: |person| Value::Integer(person.id),
            set: |person, value| match value {
                Value::Integer(id) => {
                    person.id = id;
                    Ok(())
                }
                other => Err(ValueError::mismatch(ColumnKind::Integer, &other)),
            },
        },
        ColumnDef {
            name: "Name",
            ordinal: Some(1),
            kind: ColumnKind::Text,
            get: |person| Value::Text(person.name.clone()),
            set: |person, value| match value {
                Value::Text(name) => {
                    person.name = name;
                    Ok(())
                }
                other => Err(ValueError::mismatch(ColumnKind::Text, &other)),
            },
        },
        ColumnDef {
            name: "Age",
            ordinal: Some(2),
            kind: ColumnKind::Integer,
            get: |person| match person.age {
                Some(age) => Value::Integer(age),
                None => Value::Null,
            },
            set: |person, value| match value {
                Value::Integer(age) => {
                    person.age = Some(age);
                    Ok(())
                }
                other => Err(ValueError::mismatch(ColumnKind::Integer, &other)),
            },
        },
        ColumnDef {
            name: "Email",
            ordinal: Some(3),
            kind: ColumnKind::Text,
            get: |person| match &person.email {
                Some(email) => Value::Text(email.clone()),
                None => Value::Null,
            },
            set: |person, value| match value {
                Value::Text(email) => {
                    person.email = Some(email);
                    Ok(())
                }
                other => Err(ValueError::mismatch(ColumnKind::Text, &other)),
            },
        },
    ];

    fn key(&self) -> i64 {
        self.id
    }
}

impl Person {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            age: None,
            email: None,
        }
    }

    pub fn with_age(mut self, age: i64) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }
}

pub const PEOPLE_TABLE_SQL: &str = "CREATE TABLE People (
    Id INTEGER PRIMARY KEY,
    Name TEXT,
    Age INTEGER,
    Email TEXT
);";

/// UUID-keyed fixture entity mapped to the `Gadgets` table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gadget {
    pub id: Uuid,
    pub label: String,
}

impl Entity for Gadget {
    type Key = Uuid;

    const TABLE: &'static str = "Gadgets";
    const KEY_COLUMN: &'static str = "Id";
    const COLUMNS: &'static [ColumnDef<Self>] = &[
        ColumnDef {
            name: "Id",
            ordinal: Some(0),
            kind: ColumnKind::Text,
            get: |gadget| Value::Text(gadget.id.to_string()),
            set: |gadget, value| match value {
                Value::Text(text) => {
                    gadget.id = Uuid::parse_str(&text)
                        .map_err(|_| ValueError::malformed(format!("not a UUID: `{text}`")))?;
                    Ok(())
                }
                other => Err(ValueError::mismatch(ColumnKind::Text, &other)),
            },
        },
        ColumnDef {
            name: "Label",
            ordinal: Some(1),
            kind: ColumnKind::Text,
            get: |gadget| Value::Text(gadget.label.clone()),
            set: |gadget, value| match value {
                Value::Text(label) => {
                    gadget.label = label;
                    Ok(())
                }
                other => Err(ValueError::mismatch(ColumnKind::Text, &other)),
            },
        },
    ];

    fn key(&self) -> Uuid {
        self.id
    }
}

pub const GADGETS_TABLE_SQL: &str = "CREATE TABLE Gadgets (
    Id TEXT PRIMARY KEY,
    Label TEXT
);";

/// String-keyed fixture entity mapped to the `Settings` table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Setting {
    pub name: String,
    pub value: Option<String>,
}

impl Entity for Setting {
    type Key = String;

    const TABLE: &'static str = "Settings";
    const KEY_COLUMN: &'static str = "Name";
    const COLUMNS: &'static [ColumnDef<Self>] = &[
        ColumnDef {
            name: "Name",
            ordinal: Some(0),
            kind: ColumnKind::Text,
            get: |setting| Value::Text(setting.name.clone()),
            set: |setting, value| match value {
                Value::Text(name) => {
                    setting.name = name;
                    Ok(())
                }
                other => Err(ValueError::mismatch(ColumnKind::Text, &other)),
            },
        },
        ColumnDef {
            name: "Value",
            ordinal: Some(1),
            kind: ColumnKind::Text,
            get: |setting| match &setting.value {
                Some(value) => Value::Text(value.clone()),
                None => Value::Null,
            },
            set: |setting, value| match value {
                Value::Text(text) => {
                    setting.value = Some(text);
                    Ok(())
                }
                other => Err(ValueError::mismatch(ColumnKind::Text, &other)),
            },
        },
    ];

    fn key(&self) -> String {
        self.name.clone()
    }
}

pub const SETTINGS_TABLE_SQL: &str = "CREATE TABLE Settings (
    Name TEXT PRIMARY KEY,
    Value TEXT
);";

/// Tempdir-backed database plus a config provider pointing at it.
pub struct TestDb {
    pub config: MapConfig,
    pub path: String,
    _dir: TempDir,
}

impl TestDb {
    /// Creates a file database, applies `schema_sql` and registers the path
    /// under `CONNECTION_KEY`.
    pub fn new(schema_sql: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir
            .path()
            .join("test.db")
            .to_str()
            .unwrap()
            .to_string();

        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(schema_sql).unwrap();
        drop(conn);

        let config = MapConfig::new().with(CONNECTION_KEY, path.clone());
        Self {
            config,
            path,
            _dir: dir,
        }
    }

    /// Direct connection for test-side inspection, bypassing the repository.
    pub fn connect(&self) -> Connection {
        Connection::open(&self.path).unwrap()
    }

    /// Returns whether a table exists in the database.
    pub fn table_exists(&self, table: &str) -> bool {
        let conn = self.connect();
        let exists: i64 = conn
            .query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
                );",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        exists == 1
    }

    /// Counts rows in a table through a direct connection.
    pub fn count_rows(&self, table: &str) -> i64 {
        let conn = self.connect();
        conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
            row.get(0)
        })
        .unwrap()
    }
}
