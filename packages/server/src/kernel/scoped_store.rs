//! Scoped key/value store backends.
//!
//! `MemoryScopedStore` keeps entries in process memory (local development and
//! tests). `PostgresScopedStore` persists them in the `scoped_entries` table so
//! several server instances can share OTP records and drafts.

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::PgPool;

use super::{BaseScopedStore, StoreScope};

// =============================================================================
// In-memory backend
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryScopedStore {
    entries: DashMap<(StoreScope, String), String>,
}

impl MemoryScopedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held in `scope`
    pub fn len(&self, scope: StoreScope) -> usize {
        self.entries.iter().filter(|e| e.key().0 == scope).count()
    }

    pub fn is_empty(&self, scope: StoreScope) -> bool {
        self.len(scope) == 0
    }
}

#[async_trait]
impl BaseScopedStore for MemoryScopedStore {
    async fn get(&self, scope: StoreScope, key: &str) -> Result<Option<String>> {
        Ok(self
            .entries
            .get(&(scope, key.to_string()))
            .map(|entry| entry.value().clone()))
    }

    async fn set(&self, scope: StoreScope, key: &str, value: String) -> Result<()> {
        self.entries.insert((scope, key.to_string()), value);
        Ok(())
    }

    async fn delete(&self, scope: StoreScope, key: &str) -> Result<()> {
        self.entries.remove(&(scope, key.to_string()));
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

// =============================================================================
// Postgres backend
// =============================================================================

#[derive(Debug, Clone)]
pub struct PostgresScopedStore {
    pool: PgPool,
}

impl PostgresScopedStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseScopedStore for PostgresScopedStore {
    async fn get(&self, scope: StoreScope, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value FROM scoped_entries WHERE scope = $1 AND key = $2",
        )
        .bind(scope.as_str())
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn set(&self, scope: StoreScope, key: &str, value: String) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO scoped_entries (scope, key, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (scope, key)
            DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(scope.as_str())
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, scope: StoreScope, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM scoped_entries WHERE scope = $1 AND key = $2")
            .bind(scope.as_str())
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
