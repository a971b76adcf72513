//! Durable cache persistence.
//!
//! The in-memory cache writes back through a [`CacheStore`]; failures here
//! are non-fatal and callers log and carry on without persistence.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use chrono::Local;
use rusqlite::{params, Connection};

use crate::config::Scope;

/// Durable key-value backing for the translation cache.
pub trait CacheStore: Send + Sync {
    /// All persisted (source text, translation) pairs for one scope.
    fn load_scope(&self, scope: &Scope) -> Result<Vec<(String, String)>>;
    /// Persist the scope's entries. Existing rows for the same text are
    /// replaced; rows of other scopes are untouched.
    fn save_scope(&self, scope: &Scope, entries: &[(String, String)]) -> Result<()>;
}

/// SQLite-backed store, one row per translated text.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the store at the default location under the config directory.
    pub fn open_default() -> Result<Self> {
        let dir = dirs::config_dir().unwrap_or_default().join("subflow");
        std::fs::create_dir_all(&dir)?;
        Self::open(dir.join("cache.db"))
    }

    pub fn open(path: PathBuf) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS translations (
                provider TEXT NOT NULL,
                source_lang TEXT NOT NULL,
                target_lang TEXT NOT NULL,
                source_text TEXT NOT NULL,
                translated TEXT NOT NULL,
                saved_at TEXT NOT NULL,
                PRIMARY KEY (provider, source_lang, target_lang, source_text)
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl CacheStore for SqliteStore {
    fn load_scope(&self, scope: &Scope) -> Result<Vec<(String, String)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT source_text, translated FROM translations
             WHERE provider = ?1 AND source_lang = ?2 AND target_lang = ?3",
        )?;
        let rows = stmt.query_map(
            params![
                scope.provider.as_str(),
                scope.source_lang,
                scope.target_lang
            ],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn save_scope(&self, scope: &Scope, entries: &[(String, String)]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let saved_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        for (text, translated) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO translations
                 (provider, source_lang, target_lang, source_text, translated, saved_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    scope.provider.as_str(),
                    scope.source_lang,
                    scope.target_lang,
                    text,
                    translated,
                    saved_at
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    scopes: Mutex<HashMap<Scope, HashMap<String, String>>>,
}

impl MemoryStore {
    /// Pre-seed one scope, as if an earlier session had flushed it.
    pub fn seed(&self, scope: &Scope, entries: Vec<(String, String)>) {
        let mut scopes = self.scopes.lock().unwrap();
        scopes
            .entry(scope.clone())
            .or_default()
            .extend(entries);
    }
}

impl CacheStore for MemoryStore {
    fn load_scope(&self, scope: &Scope) -> Result<Vec<(String, String)>> {
        let scopes = self.scopes.lock().unwrap();
        Ok(scopes
            .get(scope)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    fn save_scope(&self, scope: &Scope, entries: &[(String, String)]) -> Result<()> {
        let mut scopes = self.scopes.lock().unwrap();
        scopes
            .entry(scope.clone())
            .or_default()
            .extend(entries.iter().cloned());
        Ok(())
    }
}
