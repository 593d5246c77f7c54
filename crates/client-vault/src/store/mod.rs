//! Client persistence on SQLite with transparent field encryption.
//!
//! [`ClientStore`] is the only place plaintext and ciphertext meet. Every
//! write seals `full_name` and `background` through the
//! [`FieldCipher`](crate::crypto::FieldCipher) before the statement runs, and
//! every read opens them again while materializing the [`Client`]. Callers
//! above this module never see ciphertext.
//!
//! # Invariants
//!
//! - Row ids come from SQLite `AUTOINCREMENT` and are never reused.
//! - List order is `id` ascending.
//! - Every mutation takes the SQLite write lock with its first statement, so
//!   concurrent writers queue on `busy_timeout` instead of failing a lock
//!   upgrade. Update is one transaction; delete is one `DELETE ... RETURNING`.
//! - Store errors are returned unchanged; nothing here retries.

pub mod row;
pub mod schema;

pub use row::{ClientRow, NewClientRow};
pub use schema::ensure_schema;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::crypto::{CipherError, FieldCipher};
use crate::domain::{Client, ClientPatch, NewClient};

const SELECT_BY_ID: &str = "SELECT id, uuid, full_name_encrypted, background_encrypted, age, \
     gender, custom_gender, created_at, updated_at FROM clients WHERE id = ?";

const SELECT_BY_UUID: &str = "SELECT id, uuid, full_name_encrypted, background_encrypted, age, \
     gender, custom_gender, created_at, updated_at FROM clients WHERE uuid = ?";

const SELECT_PAGE: &str = "SELECT id, uuid, full_name_encrypted, background_encrypted, age, \
     gender, custom_gender, created_at, updated_at FROM clients ORDER BY id ASC LIMIT ? OFFSET ?";

const INSERT: &str = "INSERT INTO clients (uuid, full_name_encrypted, background_encrypted, age, \
     gender, custom_gender, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)";

const UPDATE: &str = "UPDATE clients SET full_name_encrypted = ?, background_encrypted = ?, \
     age = ?, gender = ?, custom_gender = ?, updated_at = ? WHERE id = ?";

/// How long a writer waits for another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// No-op write that takes the write lock and reports whether the row exists.
const CLAIM: &str = "UPDATE clients SET updated_at = updated_at WHERE id = ?";

const DELETE_RETURNING: &str = "DELETE FROM clients WHERE id = ? RETURNING id, uuid, \
     full_name_encrypted, background_encrypted, age, gender, custom_gender, created_at, updated_at";

const COUNT: &str = "SELECT COUNT(*) FROM clients";

/// Errors produced by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No client matches the identifier.
    #[error("{0} not found")]
    NotFound(String),

    /// A sensitive attribute could not be encrypted; nothing was written.
    #[error("failed to encrypt sensitive attribute: {0}")]
    Encryption(#[from] CipherError),

    /// A plaintext column holds a value the domain cannot represent.
    #[error("stored client {id} is malformed: {reason}")]
    MalformedRow { id: i64, reason: String },

    /// The database rejected or failed the operation.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Open a connection pool, creating the database file if needed.
///
/// # Errors
///
/// Returns the database error if the URL is invalid or the connection fails.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    info!(max_connections, "database pool ready");
    Ok(pool)
}

/// Client repository over a SQLite pool.
///
/// Cheap to clone: both the pool and the cipher are reference-counted.
#[derive(Clone)]
pub struct ClientStore {
    pool: SqlitePool,
    cipher: Arc<dyn FieldCipher>,
}

impl ClientStore {
    pub fn new(pool: SqlitePool, cipher: Arc<dyn FieldCipher>) -> Self {
        Self { pool, cipher }
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a new client and return it with its assigned identifiers.
    ///
    /// # Errors
    ///
    /// [`StoreError::Encryption`] if sealing fails, [`StoreError::Database`]
    /// if the insert fails.
    pub async fn create(&self, client: NewClient) -> Result<Client, StoreError> {
        let new_row = NewClientRow::seal(client, self.cipher.as_ref(), Utc::now())?;

        let id = sqlx::query(INSERT)
            .bind(new_row.uuid.to_string())
            .bind(&new_row.full_name_encrypted)
            .bind(&new_row.background_encrypted)
            .bind(new_row.age)
            .bind(new_row.gender)
            .bind(&new_row.custom_gender)
            .bind(new_row.created_at)
            .bind(new_row.created_at)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        debug!(client_id = id, "client created");
        new_row.with_id(id).open(self.cipher.as_ref())
    }

    /// Look up a client by primary id.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no row matches.
    pub async fn get(&self, id: i64) -> Result<Client, StoreError> {
        let row = sqlx::query_as::<_, ClientRow>(SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found_id(id))?;
        row.open(self.cipher.as_ref())
    }

    /// Look up a client by its UUID.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no row matches.
    pub async fn get_by_uuid(&self, uuid: Uuid) -> Result<Client, StoreError> {
        let row = sqlx::query_as::<_, ClientRow>(SELECT_BY_UUID)
            .bind(uuid.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("client {uuid}")))?;
        row.open(self.cipher.as_ref())
    }

    /// Up to `limit` clients starting at `offset`, ordered by id.
    ///
    /// Each row is opened on its own; an undecryptable attribute only marks
    /// that attribute as unreadable.
    pub async fn list(&self, offset: u32, limit: u32) -> Result<Vec<Client>, StoreError> {
        let rows = sqlx::query_as::<_, ClientRow>(SELECT_PAGE)
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| row.open(self.cipher.as_ref()))
            .collect()
    }

    /// Apply a partial update and return the updated client.
    ///
    /// An empty patch changes nothing, including `updated_at`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no row matches; the transaction is rolled
    /// back on any error.
    pub async fn update(&self, id: i64, patch: ClientPatch) -> Result<Client, StoreError> {
        if patch.is_empty() {
            debug!(client_id = id, "empty patch; nothing to update");
            return self.get(id).await;
        }

        let mut tx = self.pool.begin().await?;
        // Write before read: a deferred transaction that reads first cannot
        // wait for the write lock later.
        let claimed = sqlx::query(CLAIM)
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if claimed == 0 {
            return Err(not_found_id(id));
        }

        let mut row = sqlx::query_as::<_, ClientRow>(SELECT_BY_ID)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        row.apply(patch, self.cipher.as_ref(), Utc::now())?;

        sqlx::query(UPDATE)
            .bind(&row.full_name_encrypted)
            .bind(&row.background_encrypted)
            .bind(row.age)
            .bind(&row.gender)
            .bind(&row.custom_gender)
            .bind(row.updated_at)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(client_id = id, "client updated");
        row.open(self.cipher.as_ref())
    }

    /// Permanently delete a client, returning it as it was just before.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no row matches.
    pub async fn delete(&self, id: i64) -> Result<Client, StoreError> {
        let row = sqlx::query_as::<_, ClientRow>(DELETE_RETURNING)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found_id(id))?;

        debug!(client_id = id, "client deleted");
        row.open(self.cipher.as_ref())
    }

    /// Total number of clients.
    pub async fn count(&self) -> Result<u64, StoreError> {
        let n: i64 = sqlx::query_scalar(COUNT).fetch_one(&self.pool).await?;
        Ok(u64::try_from(n).unwrap_or_default())
    }

    /// Round-trip a trivial query to check the database is reachable.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn not_found_id(id: i64) -> StoreError {
    StoreError::NotFound(format!("client {id}"))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::PathBuf;
    use std::sync::Arc;

    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
    use uuid::Uuid;

    use super::{connect, ensure_schema, ClientStore};
    use crate::crypto::cipher::KEY_LEN;
    use crate::crypto::{AesFieldCipher, FieldCipher, FieldKey};

    /// A fresh, schema-initialised in-memory database.
    ///
    /// Limited to one connection: every SQLite `:memory:` connection is its
    /// own database.
    pub async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        ensure_schema(&pool).await.unwrap();
        pool
    }

    pub fn test_cipher() -> Arc<dyn FieldCipher> {
        Arc::new(AesFieldCipher::new(
            FieldKey::from_bytes(&[0x5A; KEY_LEN]).unwrap(),
        ))
    }

    pub async fn memory_store() -> ClientStore {
        ClientStore::new(memory_pool().await, test_cipher())
    }

    /// A database file in the temp dir behind a multi-connection pool, so
    /// writers contend for the SQLite lock the way they do in production.
    /// The file is removed on drop.
    pub struct TempDb {
        path: PathBuf,
    }

    impl TempDb {
        pub async fn open(max_connections: u32) -> (Self, SqlitePool) {
            let path = std::env::temp_dir().join(format!("client-vault-{}.db", Uuid::new_v4()));
            let pool = connect(&format!("sqlite://{}", path.display()), max_connections)
                .await
                .unwrap();
            ensure_schema(&pool).await.unwrap();
            (Self { path }, pool)
        }
    }

    impl Drop for TempDb {
        fn drop(&mut self) {
            for suffix in ["", "-wal", "-shm", "-journal"] {
                let mut file = self.path.clone().into_os_string();
                file.push(suffix);
                let _ = std::fs::remove_file(file);
            }
        }
    }
}
