use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::error::{EcdError, Result};
use crate::store::{Document, Store};

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| EcdError::io(dir, e))?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS posts (
            id          TEXT PRIMARY KEY,
            payload     TEXT NOT NULL,
            imported_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS sidebar (
            id          INTEGER PRIMARY KEY,
            text        TEXT NOT NULL,
            imported_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Extracted collections, one JSON document per row
        CREATE TABLE IF NOT EXISTS collections (
            collection  TEXT NOT NULL,
            key         TEXT NOT NULL,
            position    INTEGER NOT NULL,
            payload     TEXT NOT NULL,
            written_at  TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (collection, key)
        );
        CREATE INDEX IF NOT EXISTS idx_collections_name ON collections(collection);
        ",
    )?;
    Ok(())
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = connect(path)?;
        init_schema(&conn)?;
        Ok(SqliteStore { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(SqliteStore { conn })
    }

    pub fn post_count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Document counts per stored collection.
    pub fn collection_counts(&self) -> Result<Vec<(String, usize)>> {
        let mut stmt = self.conn.prepare(
            "SELECT collection, COUNT(*) FROM collections GROUP BY collection ORDER BY collection",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl Store for SqliteStore {
    fn load_post_records(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, payload FROM posts ORDER BY CAST(id AS INTEGER), id",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn load_sidebar(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT text FROM sidebar ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn put_post_record(&mut self, id: &str, payload: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO posts (id, payload) VALUES (?1, ?2)",
            params![id, payload],
        )?;
        Ok(())
    }

    fn put_sidebar(&mut self, text: &str) -> Result<()> {
        self.conn
            .execute("INSERT INTO sidebar (text) VALUES (?1)", params![text])?;
        Ok(())
    }

    fn write_collection(&mut self, name: &str, docs: Vec<Document>) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM collections WHERE collection = ?1", params![name])?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO collections (collection, key, position, payload)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (pos, (key, value)) in docs.iter().enumerate() {
                let payload = serde_json::to_string(value)?;
                count += stmt.execute(params![name, key, pos as i64, payload])?;
            }
        }
        tx.commit()?;
        Ok(count)
    }

    fn read_collection(&self, name: &str) -> Result<Vec<Document>> {
        let mut stmt = self.conn.prepare(
            "SELECT key, payload FROM collections WHERE collection = ?1 ORDER BY position",
        )?;
        let rows = stmt
            .query_map(params![name], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if rows.is_empty() {
            return Err(EcdError::MissingCollection(name.to_string()));
        }
        rows.into_iter()
            .map(|(k, p)| -> Result<Document> { Ok((k, serde_json::from_str(&p)?)) })
            .collect()
    }

    fn read_document(&self, name: &str, key: &str) -> Result<Option<Value>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM collections WHERE collection = ?1 AND key = ?2",
                params![name, key],
                |row| row.get(0),
            )
            .optional()?;
        payload
            .map(|p| serde_json::from_str(&p).map_err(EcdError::from))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roundtrips_posts_and_sidebar() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.put_post_record("12", r#"{"id":12}"#).unwrap();
        store.put_post_record("3", r#"{"id":3}"#).unwrap();
        store.put_post_record("3", r#"{"id":3,"title":"again"}"#).unwrap();
        store.put_sidebar("first").unwrap();
        store.put_sidebar("second").unwrap();

        let posts = store.load_post_records().unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].0, "3");
        assert!(posts[0].1.contains("again"));
        assert_eq!(store.load_sidebar().unwrap(), vec!["first", "second"]);
        assert_eq!(store.post_count().unwrap(), 2);
    }

    #[test]
    fn write_collection_replaces_previous_run() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let first = vec![
            ("50".to_string(), json!({"event_number": 50})),
            ("7".to_string(), json!({"event_number": 7})),
        ];
        assert_eq!(store.write_collection("events", first).unwrap(), 2);
        let second = vec![("8".to_string(), json!({"event_number": 8}))];
        store.write_collection("events", second).unwrap();

        let docs = store.read_collection("events").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].0, "8");
        assert_eq!(store.read_document("events", "50").unwrap(), None);
        assert_eq!(
            store.read_document("events", "8").unwrap(),
            Some(json!({"event_number": 8}))
        );
        assert_eq!(store.collection_counts().unwrap(), vec![("events".to_string(), 1)]);
    }

    #[test]
    fn missing_collection_is_an_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(
            store.read_collection("summary"),
            Err(EcdError::MissingCollection(_))
        ));
    }
}
