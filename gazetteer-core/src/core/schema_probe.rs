//! Live-schema capability probing.
//!
//! The three hierarchy tables have accumulated optional columns over several
//! incremental migrations, and a deployed database may be at any migration
//! level. Before composing a read or write, callers ask [`SchemaProbe`] which
//! columns actually exist and restrict the statement to that set — an absent
//! column is never referenced.
//!
//! [`RowFields`] is the write-side companion: a column/value list that only
//! accepts optional columns the probe reported as present.

use crate::Kind;
use log::warn;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::collections::HashSet;

/// Columns that may or may not exist depending on the migration level.
pub const OPTIONAL_COLUMNS: &[&str] = &["code", "description", "modified_by", "modified_at"];

/// Reports which columns currently exist on a hierarchy table.
pub struct SchemaProbe;

impl SchemaProbe {
    /// Returns the set of column names present on `kind`'s table.
    ///
    /// If the introspection pragma fails or reports nothing, the probe falls
    /// back to the kind's baseline column set (id, name, active, parent key)
    /// rather than failing the caller: optional columns simply count as
    /// absent for this cycle.
    pub fn columns(conn: &Connection, kind: Kind) -> HashSet<String> {
        // Table names come from the closed Kind set, never from input.
        let sql = format!("SELECT name FROM pragma_table_info('{}')", kind.table());
        let probed = conn.prepare(&sql).and_then(|mut stmt| {
            stmt.query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<HashSet<String>>>()
        });

        match probed {
            Ok(cols) if !cols.is_empty() => cols,
            Ok(_) | Err(_) => {
                warn!(
                    "schema probe unavailable for '{}'; treating optional columns as absent",
                    kind.table()
                );
                Self::baseline(kind)
            }
        }
    }

    /// The columns every migration level is guaranteed to have.
    fn baseline(kind: Kind) -> HashSet<String> {
        let mut cols: HashSet<String> =
            ["id", "name", "active"].iter().map(|s| s.to_string()).collect();
        if let Some(parent) = kind.parent_column() {
            cols.insert(parent.to_string());
        }
        cols
    }
}

/// Column/value pairs for an INSERT or UPDATE, restricted to probed columns.
#[derive(Debug, Default)]
pub struct RowFields {
    columns: Vec<&'static str>,
    values: Vec<Value>,
}

impl RowFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column unconditionally. Use for baseline columns only.
    pub fn set(&mut self, column: &'static str, value: impl Into<Value>) {
        self.columns.push(column);
        self.values.push(value.into());
    }

    /// Adds `column` only when `present` (a probe result) contains it.
    pub fn set_if_present(
        &mut self,
        present: &HashSet<String>,
        column: &'static str,
        value: impl Into<Value>,
    ) {
        if present.contains(column) {
            self.set(column, value);
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    /// Bind parameters in column order.
    pub fn params(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.values.iter().map(|v| v as &dyn rusqlite::ToSql).collect()
    }
}
