//! Table definition for the `clients` table.
//!
//! Created on startup when missing. There is no migration machinery; a
//! changed layout needs a manual migration.

use sqlx::SqlitePool;
use tracing::debug;

const CREATE_CLIENTS: &str = r#"
CREATE TABLE IF NOT EXISTS clients (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid                 TEXT    NOT NULL UNIQUE,
    full_name_encrypted  TEXT    NOT NULL,
    background_encrypted TEXT,
    age                  INTEGER NOT NULL,
    gender               TEXT    NOT NULL,
    custom_gender        TEXT,
    created_at           TEXT    NOT NULL,
    updated_at           TEXT    NOT NULL
)
"#;

/// Create the `clients` table if it does not exist yet.
///
/// # Errors
///
/// Returns the database error if the statement fails.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_CLIENTS).execute(pool).await?;
    debug!("clients table ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::memory_pool;

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let pool = memory_pool().await;
        ensure_schema(&pool).await.unwrap();
        ensure_schema(&pool).await.unwrap();
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn uuid_column_is_unique() {
        let pool = memory_pool().await;
        let insert = "INSERT INTO clients (uuid, full_name_encrypted, age, gender, created_at, updated_at) \
                      VALUES ('dup', 'x', 1, 'male', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')";
        sqlx::query(insert).execute(&pool).await.unwrap();
        assert!(sqlx::query(insert).execute(&pool).await.is_err());
    }
}
