//! SQLite backend with vector search via the `sqlite-vec` extension.
//!
//! Chunks live in a plain `chunks` table; embeddings live beside them in
//! `chunk_vectors` as `vec_f32` blobs. Similarity search ranks by
//! `vec_distance_cosine` and maps distance to a `[0, 1]` similarity.

use std::mem::transmute;
use std::os::raw::c_char;
use std::path::Path;
use std::sync::Once;

use async_trait::async_trait;
use tokio_rusqlite::{Connection, ffi};

use super::{ScoredChunk, StoredChunk, VectorStore};
use crate::types::StoreError;

#[derive(Clone)]
pub struct SqliteVectorStore {
    conn: Connection,
}

impl SqliteVectorStore {
    /// Opens (or creates) the store at `path`, registering the sqlite-vec
    /// extension and creating the schema on first use.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        register_sqlite_vec()?;
        let conn = Connection::open(path)
            .await
            .map_err(|err| StoreError::Read(err.to_string()))?;
        Self::prepare(conn).await
    }

    /// Opens a transient in-memory store, mainly for tests.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        register_sqlite_vec()?;
        let conn = Connection::open(":memory:")
            .await
            .map_err(|err| StoreError::Read(err.to_string()))?;
        Self::prepare(conn).await
    }

    async fn prepare(conn: Connection) -> Result<Self, StoreError> {
        conn.call(|conn| {
            // Fails here, before any schema work, if the extension did not load.
            conn.query_row("select vec_version()", [], |row| row.get::<_, String>(0))
                ?;
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS chunks (
                     id TEXT PRIMARY KEY,
                     text TEXT NOT NULL,
                     source_offset INTEGER NOT NULL,
                     metadata TEXT NOT NULL
                 );
                 CREATE TABLE IF NOT EXISTS chunk_vectors (
                     id TEXT PRIMARY KEY,
                     embedding BLOB NOT NULL
                 );",
            )
            ?;
            Ok(())
        })
        .await
        .map_err(|err: tokio_rusqlite::Error| StoreError::Write(err.to_string()))?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn upsert(&self, chunks: Vec<StoredChunk>) -> Result<(), StoreError> {
        if chunks.is_empty() {
            return Ok(());
        }
        // Serialize outside the connection closure so a malformed vector
        // (e.g. NaN) fails the write instead of storing a placeholder.
        let mut rows = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let metadata = serde_json::to_string(&chunk.metadata)
                .map_err(|err| StoreError::Write(err.to_string()))?;
            let embedding = serde_json::to_string(&chunk.embedding)
                .map_err(|err| StoreError::Write(err.to_string()))?;
            rows.push((chunk.id, chunk.text, chunk.source_offset as i64, metadata, embedding));
        }
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for (id, text, source_offset, metadata, embedding) in &rows {
                    tx.execute(
                        "INSERT OR REPLACE INTO chunks (id, text, source_offset, metadata)
                         VALUES (?1, ?2, ?3, ?4)",
                        (id, text, source_offset, metadata),
                    )
                    ?;
                    tx.execute(
                        "INSERT OR REPLACE INTO chunk_vectors (id, embedding)
                         VALUES (?1, vec_f32(?2))",
                        (id, embedding),
                    )
                    ?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(|err: tokio_rusqlite::Error| StoreError::Write(err.to_string()))
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>, StoreError> {
        let embedding_json = serde_json::to_string(embedding)
            .map_err(|err| StoreError::Read(err.to_string()))?;
        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT c.id, c.text,
                                vec_distance_cosine(v.embedding, vec_f32(?1)) AS distance
                         FROM chunks c
                         JOIN chunk_vectors v ON v.id = c.id
                         ORDER BY distance ASC
                         LIMIT {top_k}"
                    ))
                    ?;

                let rows = stmt
                    .query_map([&embedding_json], |row| {
                        let id: String = row.get(0)?;
                        let text: String = row.get(1)?;
                        let distance: f64 = row.get(2)?;
                        // vec_distance_cosine returns 1 - cos; recover the
                        // similarity and clamp to the [0, 1] contract.
                        let score = (1.0f32 - distance as f32).clamp(0.0, 1.0);
                        Ok(ScoredChunk { id, text, score })
                    })
                    ?;

                let mut hits = Vec::new();
                for row in rows {
                    hits.push(row?);
                }
                Ok(hits)
            })
            .await
            .map_err(|err: tokio_rusqlite::Error| StoreError::Read(err.to_string()))
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("DELETE FROM chunk_vectors; DELETE FROM chunks;")
                    ?;
                Ok(())
            })
            .await
            .map_err(|err: tokio_rusqlite::Error| StoreError::Write(err.to_string()))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.conn
            .call(|conn| {
                let count: i64 = conn
                    .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
                    ?;
                Ok(count as usize)
            })
            .await
            .map_err(|err: tokio_rusqlite::Error| StoreError::Read(err.to_string()))
    }
}

fn register_sqlite_vec() -> Result<(), StoreError> {
    use std::sync::Mutex;

    static INIT: Once = Once::new();
    static INIT_RESULT: Mutex<Option<Result<(), String>>> = Mutex::new(None);

    INIT.call_once(|| {
        let result = unsafe {
            type SqliteExtensionInit = unsafe extern "C" fn(
                *mut ffi::sqlite3,
                *mut *mut c_char,
                *const ffi::sqlite3_api_routines,
            ) -> i32;

            let init: unsafe extern "C" fn() = sqlite_vec::sqlite3_vec_init;
            let init_fn: SqliteExtensionInit =
                transmute::<unsafe extern "C" fn(), SqliteExtensionInit>(init);
            let rc = ffi::sqlite3_auto_extension(Some(init_fn));
            if rc != 0 {
                Err(format!(
                    "failed to register sqlite-vec extension (code {rc})"
                ))
            } else {
                Ok(())
            }
        };
        *INIT_RESULT.lock().expect("init result mutex poisoned") = Some(result);
    });

    INIT_RESULT
        .lock()
        .expect("init result mutex poisoned")
        .clone()
        .expect("init was called but result not set")
        .map_err(StoreError::Write)
}
