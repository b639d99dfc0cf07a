//! Row-level CRUD primitives over the three hierarchy tables.
//!
//! Every operation is an associated function taking `&Connection`, so the
//! same primitive works standalone or inside an ambient transaction opened by
//! the registry (`Transaction` derefs to `Connection`). Reads build their
//! SELECT projection from a [`SchemaProbe`] result: optional columns the live
//! schema lacks are projected as literal NULLs and never referenced by name.

use crate::{Kind, LocationNode, Result, RowFields, SchemaProbe};
use rusqlite::{params, Connection};
use std::collections::HashSet;

pub struct LocationStore;

/// Fixed-position projection over a probed column set. Absent optional
/// columns become NULL literals so row mapping stays positional.
fn projection(kind: Kind, cols: &HashSet<String>) -> String {
    let opt = |name: &'static str| if cols.contains(name) { name } else { "NULL" };
    format!(
        "id, name, {}, {}, {}, active, {}, {}",
        opt("code"),
        opt("description"),
        kind.parent_column().unwrap_or("NULL"),
        opt("modified_by"),
        opt("modified_at"),
    )
}

fn map_node(row: &rusqlite::Row) -> rusqlite::Result<LocationNode> {
    Ok(LocationNode {
        id: row.get(0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        description: row.get(3)?,
        parent_id: row.get(4)?,
        active: row.get::<_, i64>(5)? != 0,
        modified_by: row.get(6)?,
        modified_at: row.get(7)?,
    })
}

impl LocationStore {
    /// Fetches an active row by id.
    pub fn find_active_by_id(conn: &Connection, kind: Kind, id: i64) -> Result<Option<LocationNode>> {
        let cols = SchemaProbe::columns(conn, kind);
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1 AND active = 1",
            projection(kind, &cols),
            kind.table(),
        );
        match conn.query_row(&sql, params![id], map_node) {
            Ok(node) => Ok(Some(node)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Case-insensitive active-name lookup, scoped to `parent_id` for kinds
    /// that have a parent. `exclude_id` skips the node being renamed.
    pub fn find_active_by_name(
        conn: &Connection,
        kind: Kind,
        name: &str,
        parent_id: Option<i64>,
        exclude_id: Option<i64>,
    ) -> Result<Option<LocationNode>> {
        let cols = SchemaProbe::columns(conn, kind);
        let mut sql = format!(
            "SELECT {} FROM {} WHERE active = 1 AND name = ? COLLATE NOCASE",
            projection(kind, &cols),
            kind.table(),
        );
        let mut binds: Vec<&dyn rusqlite::ToSql> = vec![&name];

        if let (Some(column), Some(pid)) = (kind.parent_column(), parent_id.as_ref()) {
            sql.push_str(&format!(" AND {column} = ?"));
            binds.push(pid);
        }
        if let Some(ex) = exclude_id.as_ref() {
            sql.push_str(" AND id != ?");
            binds.push(ex);
        }

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(binds.as_slice(), map_node)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// All active rows of `kind`, ordered by name ascending (case-insensitive).
    /// With `parent_id` the listing is restricted to that parent's children.
    pub fn list_active(
        conn: &Connection,
        kind: Kind,
        parent_id: Option<i64>,
    ) -> Result<Vec<LocationNode>> {
        let cols = SchemaProbe::columns(conn, kind);
        let mut sql = format!(
            "SELECT {} FROM {} WHERE active = 1",
            projection(kind, &cols),
            kind.table(),
        );
        let mut binds: Vec<&dyn rusqlite::ToSql> = Vec::new();

        if let (Some(column), Some(pid)) = (kind.parent_column(), parent_id.as_ref()) {
            sql.push_str(&format!(" AND {column} = ?"));
            binds.push(pid);
        }
        sql.push_str(" ORDER BY name COLLATE NOCASE ASC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(binds.as_slice(), map_node)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// IDs of active rows of `kind` under `parent_id`; lighter than
    /// [`Self::list_active`] when only identity is needed.
    pub fn ids_active(conn: &Connection, kind: Kind, parent_id: Option<i64>) -> Result<Vec<i64>> {
        let mut sql = format!("SELECT id FROM {} WHERE active = 1", kind.table());
        let mut binds: Vec<&dyn rusqlite::ToSql> = Vec::new();

        if let (Some(column), Some(pid)) = (kind.parent_column(), parent_id.as_ref()) {
            sql.push_str(&format!(" AND {column} = ?"));
            binds.push(pid);
        }
        sql.push_str(" ORDER BY id");

        let mut stmt = conn.prepare(&sql)?;
        let ids = stmt
            .query_map(binds.as_slice(), |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    /// Count of active rows of `kind`, optionally scoped to a parent.
    pub fn count_active(conn: &Connection, kind: Kind, parent_id: Option<i64>) -> Result<i64> {
        let mut sql = format!("SELECT COUNT(*) FROM {} WHERE active = 1", kind.table());
        let mut binds: Vec<&dyn rusqlite::ToSql> = Vec::new();

        if let (Some(column), Some(pid)) = (kind.parent_column(), parent_id.as_ref()) {
            sql.push_str(&format!(" AND {column} = ?"));
            binds.push(pid);
        }

        let count = conn.query_row(&sql, binds.as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    /// Inserts a row from probed fields; returns the new surrogate id.
    pub fn insert(conn: &Connection, kind: Kind, fields: &RowFields) -> Result<i64> {
        let placeholders = (1..=fields.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            kind.table(),
            fields.columns().join(", "),
            placeholders,
        );
        conn.execute(&sql, fields.params().as_slice())?;
        Ok(conn.last_insert_rowid())
    }

    /// Applies probed fields to one row; returns the affected-row count.
    pub fn update(conn: &Connection, kind: Kind, id: i64, fields: &RowFields) -> Result<usize> {
        let assignments = fields
            .columns()
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{col} = ?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            kind.table(),
            assignments,
            fields.len() + 1,
        );
        let mut binds = fields.params();
        binds.push(&id);
        let affected = conn.execute(&sql, binds.as_slice())?;
        Ok(affected)
    }

    /// Physically removes one row; returns the affected-row count.
    pub fn delete_row(conn: &Connection, kind: Kind, id: i64) -> Result<usize> {
        let affected = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", kind.table()),
            params![id],
        )?;
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Storage;

    fn insert_region(conn: &Connection, name: &str) -> i64 {
        let cols = SchemaProbe::columns(conn, Kind::Region);
        let mut fields = RowFields::new();
        fields.set("name", name.to_string());
        fields.set("active", true);
        fields.set_if_present(&cols, "description", "test".to_string());
        LocationStore::insert(conn, Kind::Region, &fields).unwrap()
    }

    #[test]
    fn test_insert_and_find_roundtrip() {
        let storage = Storage::in_memory().unwrap();
        let id = insert_region(storage.connection(), "NCR");

        let node = LocationStore::find_active_by_id(storage.connection(), Kind::Region, id)
            .unwrap()
            .unwrap();
        assert_eq!(node.name, "NCR");
        assert_eq!(node.description.as_deref(), Some("test"));
        assert!(node.active);
        assert!(node.parent_id.is_none());
    }

    #[test]
    fn test_find_by_name_is_case_insensitive() {
        let storage = Storage::in_memory().unwrap();
        insert_region(storage.connection(), "NCR");

        let hit =
            LocationStore::find_active_by_name(storage.connection(), Kind::Region, "ncr", None, None)
                .unwrap();
        assert!(hit.is_some());
    }

    #[test]
    fn test_find_by_name_respects_parent_scope() {
        let storage = Storage::in_memory().unwrap();
        let conn = storage.connection();
        let r1 = insert_region(conn, "Region One");
        let r2 = insert_region(conn, "Region Two");

        let mut fields = RowFields::new();
        fields.set("name", "Manila".to_string());
        fields.set("active", true);
        fields.set("region_id", r1);
        LocationStore::insert(conn, Kind::City, &fields).unwrap();

        let same_scope =
            LocationStore::find_active_by_name(conn, Kind::City, "manila", Some(r1), None).unwrap();
        let other_scope =
            LocationStore::find_active_by_name(conn, Kind::City, "manila", Some(r2), None).unwrap();
        assert!(same_scope.is_some());
        assert!(other_scope.is_none());
    }

    #[test]
    fn test_find_by_name_excludes_given_id() {
        let storage = Storage::in_memory().unwrap();
        let id = insert_region(storage.connection(), "NCR");

        let hit = LocationStore::find_active_by_name(
            storage.connection(),
            Kind::Region,
            "NCR",
            None,
            Some(id),
        )
        .unwrap();
        assert!(hit.is_none());
    }

    #[test]
    fn test_list_active_orders_by_name() {
        let storage = Storage::in_memory().unwrap();
        let conn = storage.connection();
        insert_region(conn, "Visayas");
        insert_region(conn, "luzon");
        insert_region(conn, "Mindanao");

        let names: Vec<String> = LocationStore::list_active(conn, Kind::Region, None)
            .unwrap()
            .into_iter()
            .map(|n| n.name)
            .collect();
        assert_eq!(names, vec!["luzon", "Mindanao", "Visayas"]);
    }

    #[test]
    fn test_inactive_rows_are_invisible() {
        let storage = Storage::in_memory().unwrap();
        let conn = storage.connection();
        let id = insert_region(conn, "NCR");

        let mut fields = RowFields::new();
        fields.set("active", false);
        LocationStore::update(conn, Kind::Region, id, &fields).unwrap();

        assert!(LocationStore::find_active_by_id(conn, Kind::Region, id)
            .unwrap()
            .is_none());
        assert!(LocationStore::list_active(conn, Kind::Region, None)
            .unwrap()
            .is_empty());
        assert_eq!(LocationStore::count_active(conn, Kind::Region, None).unwrap(), 0);
    }

    #[test]
    fn test_delete_row_affects_one() {
        let storage = Storage::in_memory().unwrap();
        let conn = storage.connection();
        let id = insert_region(conn, "NCR");

        assert_eq!(LocationStore::delete_row(conn, Kind::Region, id).unwrap(), 1);
        assert_eq!(LocationStore::delete_row(conn, Kind::Region, id).unwrap(), 0);
    }

    #[test]
    fn test_reads_work_without_optional_columns() {
        let storage = Storage::in_memory().unwrap();
        let conn = storage.connection();
        conn.execute_batch(
            "DROP TABLE regions;
             CREATE TABLE regions (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 name TEXT NOT NULL,
                 active INTEGER NOT NULL DEFAULT 1
             );",
        )
        .unwrap();

        let cols = SchemaProbe::columns(conn, Kind::Region);
        let mut fields = RowFields::new();
        fields.set("name", "NCR".to_string());
        fields.set("active", true);
        fields.set_if_present(&cols, "code", "RNCR-1".to_string());
        let id = LocationStore::insert(conn, Kind::Region, &fields).unwrap();

        let node = LocationStore::find_active_by_id(conn, Kind::Region, id)
            .unwrap()
            .unwrap();
        assert_eq!(node.name, "NCR");
        assert!(node.code.is_none());
        assert!(node.modified_at.is_none());
    }
}
