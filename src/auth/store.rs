use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use thiserror::Error;

use super::context::Principal;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential lookup failed: {0}")]
    Database(#[from] sqlx::Error),
}

/// Resolves a token subject to the account behind it.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_principal_by_subject(&self, subject: &str)
        -> Result<Option<Principal>, StoreError>;
}

/// Reads principals from the `users` table.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: i64,
    email: String,
    password_hash: String,
    name: String,
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_principal_by_subject(
        &self,
        subject: &str,
    ) -> Result<Option<Principal>, StoreError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, email, password_hash, name FROM users WHERE email = $1",
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Principal::new(r.id, r.email, r.password_hash, r.name)))
    }
}

/// A fixed set of principals held in memory, keyed by subject.
///
/// Built up front and never mutated once shared.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    principals: HashMap<String, Principal>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principals.insert(principal.subject.clone(), principal);
        self
    }
}

impl FromIterator<Principal> for MemoryCredentialStore {
    fn from_iter<I: IntoIterator<Item = Principal>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |store, p| store.with_principal(p))
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_principal_by_subject(
        &self,
        subject: &str,
    ) -> Result<Option<Principal>, StoreError> {
        Ok(self.principals.get(subject).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_memory_store_lookup() {
        let store: MemoryCredentialStore = vec![
            Principal::new(1, "a@example.com", "h1", "A"),
            Principal::new(2, "b@example.com", "h2", "B"),
        ]
        .into_iter()
        .collect();

        let found = store.find_principal_by_subject("b@example.com").await.unwrap();
        assert_eq!(found.map(|p| p.id), Some(2));

        let missing = store.find_principal_by_subject("c@example.com").await.unwrap();
        assert!(missing.is_none());
    }
}
