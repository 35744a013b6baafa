//! Per-request authentication, independent of the web framework.
//!
//! [`RequestAuthenticator::intercept`] walks one request from `Unauthenticated`
//! to either an authenticated [`SecurityContext`] or a [`FilterFault`]. The
//! actix-web glue in `middleware.rs` only moves headers in and responses out.

use std::sync::Arc;
use thiserror::Error;

use super::context::SecurityContext;
use super::routes::{Access, RouteTable};
use super::store::{CredentialStore, StoreError};
use super::token::TokenCodec;

const BEARER_PREFIX: &str = "Bearer ";

/// Unexpected failure while authenticating; aborts the request with a bare 401.
#[derive(Debug, Error)]
pub enum FilterFault {
    #[error("token subject has no matching account")]
    UnknownSubject,
    #[error(transparent)]
    CredentialStore(#[from] StoreError),
}

#[derive(Debug)]
pub enum Outcome {
    /// Public path: forwarded untouched, no context established.
    Bypassed,
    /// Protected path; the context may still be unauthenticated.
    Proceed(SecurityContext),
    Rejected(FilterFault),
}

/// Returns the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub struct RequestAuthenticator {
    codec: TokenCodec,
    store: Arc<dyn CredentialStore>,
    routes: RouteTable,
}

impl RequestAuthenticator {
    pub fn new(codec: TokenCodec, store: Arc<dyn CredentialStore>, routes: RouteTable) -> Self {
        Self {
            codec,
            store,
            routes,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub async fn intercept(&self, path: &str, authorization: Option<&str>) -> Outcome {
        // Public routes win over any credential the request carries.
        if self.routes.classify(path) == Access::Public {
            log::debug!("public route {}, skipping authentication", path);
            return Outcome::Bypassed;
        }

        let Some(token) = bearer_token(authorization) else {
            return Outcome::Proceed(SecurityContext::Unauthenticated);
        };

        let claims = match self.codec.decode_and_verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                log::warn!("rejected bearer token on {}: {}", path, e);
                return Outcome::Proceed(SecurityContext::Unauthenticated);
            }
        };

        match self.store.find_principal_by_subject(&claims.sub).await {
            Ok(Some(principal)) => {
                log::debug!("authenticated principal {} on {}", principal.id, path);
                Outcome::Proceed(SecurityContext::authenticated(principal))
            }
            Ok(None) => Outcome::Rejected(FilterFault::UnknownSubject),
            Err(e) => Outcome::Rejected(FilterFault::CredentialStore(e)),
        }
    }
}
