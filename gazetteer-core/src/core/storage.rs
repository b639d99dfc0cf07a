use crate::Result;
use rusqlite::Connection;
use std::path::Path;

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Validate database structure
        let table_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type='table'
             AND name IN ('regions', 'cities', 'barangays')",
            [],
            |row| row.get(0),
        )?;

        if table_count != 3 {
            return Err(crate::GazetteerError::InvalidDatabase(
                "missing one or more location tables".to_string(),
            ));
        }

        // No column migration here: databases from older migration levels may
        // lack optional columns, and reads/writes adapt through SchemaProbe
        // instead of altering the live table.
        Ok(Self { conn })
    }

    /// In-memory database with the full canonical schema.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}
