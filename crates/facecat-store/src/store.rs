use crate::schema::{DELETE_BY_NAME, INSERT, SCHEMA, SELECT_ALL};
use facecat_core::{decode_embedding, encode_embedding, CodecError, Embedding, KnownFace, KnownFaces};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to create database directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot encode embedding: {0}")]
    Encode(CodecError),
    #[error("corrupt encoding in row {id}: {source}")]
    Corrupt { id: i64, source: CodecError },
}

/// Owns the database connection and the cache that mirrors it.
pub struct FaceStore {
    conn: Connection,
    cache: KnownFaces,
}

impl FaceStore {
    /// Open (creating if needed) the catalog at `path` and load it.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        tracing::info!(path = %path.display(), "opened face catalog");
        Self::init(conn)
    }

    /// Open a private in-memory catalog.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        let mut store = Self {
            conn,
            cache: KnownFaces::default(),
        };
        store.load_all()?;
        Ok(store)
    }

    /// Re-read every row and replace the cache.
    ///
    /// On error the previous cache stays in place.
    pub fn load_all(&mut self) -> Result<&KnownFaces, StoreError> {
        let mut stmt = self.conn.prepare(SELECT_ALL)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Vec<u8>>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut faces = Vec::with_capacity(rows.len());
        for (id, name, blob, created_at) in rows {
            let embedding = decode_embedding(&blob).map_err(|source| StoreError::Corrupt { id, source })?;
            faces.push(KnownFace {
                id,
                name,
                embedding,
                created_at,
            });
        }

        self.cache = KnownFaces::new(faces);
        tracing::debug!(faces = self.cache.len(), "face cache reloaded");
        Ok(&self.cache)
    }

    /// Persist a named embedding and reload. Returns the new row id.
    pub fn insert(&mut self, name: &str, embedding: &Embedding) -> Result<i64, StoreError> {
        let name = validate_name(name)?;
        let blob = encode_embedding(embedding).map_err(StoreError::Encode)?;
        let created_at = chrono::Utc::now().to_rfc3339();

        self.conn.execute(INSERT, params![name, blob, created_at])?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, name, dims = embedding.len(), "face added");

        self.load_all()?;
        Ok(id)
    }

    /// Remove every row stored under exactly `name` and reload.
    ///
    /// Returns the number of rows removed; an unknown name removes nothing.
    pub fn delete(&mut self, name: &str) -> Result<usize, StoreError> {
        let removed = self.conn.execute(DELETE_BY_NAME, params![name])?;
        tracing::info!(name, removed, "faces deleted");
        self.load_all()?;
        Ok(removed)
    }

    /// Current cache contents.
    pub fn known(&self) -> &KnownFaces {
        &self.cache
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Close the connection, surfacing any error SQLite reports on close.
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, e)| StoreError::Sqlite(e))
    }
}

/// Trim `name` and reject it when nothing is left.
pub fn validate_name(name: &str) -> Result<&str, StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(StoreError::EmptyName)
    } else {
        Ok(trimmed)
    }
}
