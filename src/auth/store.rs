//! Account existence lookups.
//!
//! The resolver performs exactly one read per request: does an account with this
//! id exist with one of the allowed kinds? A missing id and a disallowed kind are
//! the same answer (`false`).

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Connection, PgPool, Row};
use std::collections::HashMap;
use tracing::Instrument;

use super::policy::AccountKind;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Whether an account with `id` exists and its kind is one of `kinds`.
    async fn exists(&self, id: &str, kinds: &[AccountKind]) -> Result<bool>;

    /// Connectivity check for health reporting.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn exists(&self, id: &str, kinds: &[AccountKind]) -> Result<bool> {
        let query = r"
            SELECT EXISTS (
                SELECT 1
                FROM accounts
                WHERE id = $1 AND kind = ANY($2)
            ) AS found
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let kinds: Vec<&'static str> = kinds.iter().map(|kind| kind.as_str()).collect();
        let row = sqlx::query(query)
            .bind(id)
            .bind(kinds)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup account")?;
        Ok(row.get::<bool, _>("found"))
    }

    async fn ping(&self) -> Result<()> {
        let acquire_span = tracing::info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .context("failed to acquire database connection")?;
        let ping_span =
            tracing::info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .context("failed to ping database")
    }
}

/// Fixed account set, for embedding and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryAccountStore {
    accounts: HashMap<String, AccountKind>,
}

impl MemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_account(mut self, id: impl Into<String>, kind: AccountKind) -> Self {
        self.accounts.insert(id.into(), kind);
        self
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn exists(&self, id: &str, kinds: &[AccountKind]) -> Result<bool> {
        Ok(self
            .accounts
            .get(id)
            .is_some_and(|kind| kinds.contains(kind)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_filters_by_kind() {
        let store = MemoryAccountStore::new()
            .with_account("u1", AccountKind::User)
            .with_account("s1", AccountKind::Supplier);

        let admin_kinds = [AccountKind::Admin, AccountKind::Supplier];
        assert!(store.exists("s1", &admin_kinds).await.unwrap());
        assert!(!store.exists("u1", &admin_kinds).await.unwrap());
        assert!(store.exists("u1", &AccountKind::ALL).await.unwrap());
        assert!(!store.exists("missing", &AccountKind::ALL).await.unwrap());
        assert!(store.ping().await.is_ok());
    }
}
