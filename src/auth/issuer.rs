use actix_web::web;
use chrono::Duration;
use std::sync::Arc;
use thiserror::Error;

use super::password::{PasswordError, PasswordHasher};
use super::store::CredentialStore;
use super::token::{IssuedToken, TokenCodec};

/// Verified against when the identifier has no account, so both failure paths pay
/// for one hash comparison.
const PLACEHOLDER_PASSWORD: &str = "placeholder-password-for-unknown-accounts";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown account and wrong password are deliberately the same value.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("authentication unavailable: {0}")]
    Internal(String),
}

/// Exchanges an email and password for a signed bearer token.
pub struct TokenIssuer {
    codec: TokenCodec,
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    ttl: Duration,
    placeholder_hash: String,
}

impl TokenIssuer {
    /// Hashes the placeholder password once with `hasher`, so construction costs
    /// one hash at the configured work factor.
    pub fn new(
        codec: TokenCodec,
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
        ttl: Duration,
    ) -> Result<Self, PasswordError> {
        let placeholder_hash = hasher.hash(PLACEHOLDER_PASSWORD)?;
        Ok(Self {
            codec,
            store,
            hasher,
            ttl,
            placeholder_hash,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<IssuedToken, AuthError> {
        let principal = self
            .store
            .find_principal_by_subject(identifier)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let stored_hash = principal
            .as_ref()
            .map_or_else(|| self.placeholder_hash.clone(), |p| p.password_hash.clone());
        let matches = self.verify_off_thread(password, stored_hash).await?;

        let principal = match principal {
            Some(principal) if matches => principal,
            _ => return Err(AuthError::InvalidCredentials),
        };

        log::debug!("issuing token for principal {}", principal.id);
        self.codec
            .issue(&principal.subject, self.ttl)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    async fn verify_off_thread(&self, password: &str, hash: String) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        web::block(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::context::Principal;
    use crate::auth::password::BcryptHasher;
    use crate::auth::store::MemoryCredentialStore;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SECRET: &[u8] = b"issuer-test-secret";

    /// Counts `verify` calls on top of a cheap bcrypt hasher.
    struct CountingHasher {
        inner: BcryptHasher,
        verifications: AtomicUsize,
    }

    impl CountingHasher {
        fn new() -> Self {
            Self {
                inner: BcryptHasher::new(4),
                verifications: AtomicUsize::new(0),
            }
        }

        fn verifications(&self) -> usize {
            self.verifications.load(Ordering::SeqCst)
        }
    }

    impl PasswordHasher for CountingHasher {
        fn hash(&self, password: &str) -> Result<String, PasswordError> {
            self.inner.hash(password)
        }

        fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
            self.verifications.fetch_add(1, Ordering::SeqCst);
            self.inner.verify(password, hash)
        }
    }

    fn issuer_with(hasher: Arc<CountingHasher>) -> TokenIssuer {
        let hash = hasher.hash("correct horse").unwrap();
        let store =
            MemoryCredentialStore::new().with_principal(Principal::new(1, "known@x.com", hash, "Known"));

        TokenIssuer::new(
            TokenCodec::new(SECRET),
            Arc::new(store),
            hasher,
            Duration::minutes(30),
        )
        .unwrap()
    }

    fn issuer() -> TokenIssuer {
        issuer_with(Arc::new(CountingHasher::new()))
    }

    #[actix_rt::test]
    async fn test_valid_credentials_issue_a_verifiable_token() {
        let issued = issuer()
            .authenticate("known@x.com", "correct horse")
            .await
            .unwrap();

        assert_eq!(issued.subject, "known@x.com");
        assert_eq!(issued.expires_at - issued.issued_at, Duration::minutes(30));

        let claims = TokenCodec::new(SECRET).decode_and_verify(&issued.token).unwrap();
        assert_eq!(claims.sub, "known@x.com");
    }

    #[actix_rt::test]
    async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
        let issuer = issuer();
        let unknown = issuer.authenticate("unknown@x.com", "any").await.unwrap_err();
        let wrong = issuer.authenticate("known@x.com", "wrongpass").await.unwrap_err();

        assert_eq!(unknown, AuthError::InvalidCredentials);
        assert_eq!(unknown, wrong);
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[actix_rt::test]
    async fn test_unknown_user_still_pays_for_a_hash_comparison() {
        let hasher = Arc::new(CountingHasher::new());
        let issuer = issuer_with(Arc::clone(&hasher));

        issuer.authenticate("unknown@x.com", "any").await.unwrap_err();
        assert_eq!(hasher.verifications(), 1);

        issuer.authenticate("known@x.com", "wrongpass").await.unwrap_err();
        assert_eq!(hasher.verifications(), 2);
    }

    #[actix_rt::test]
    async fn test_placeholder_password_does_not_log_in_unknown_users() {
        let err = issuer()
            .authenticate("unknown@x.com", PLACEHOLDER_PASSWORD)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }
}
