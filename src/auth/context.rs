//! Request-scoped authentication state.
//!
//! A [`SecurityContext`] is built by the request authenticator and stored in the
//! request's own extensions, so it lives and dies with that request. Nothing here is
//! global or thread-local.

use serde::Serialize;
use std::collections::BTreeSet;

/// The single authority granted to every authenticated request.
pub const ROLE_USER: &str = "ROLE_USER";

/// Snapshot of an account as resolved from the credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: i64,
    /// Email address; also the token subject.
    pub subject: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub roles: BTreeSet<String>,
}

impl Principal {
    /// Builds a principal holding the default `ROLE_USER` role.
    pub fn new(
        id: i64,
        subject: impl Into<String>,
        password_hash: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            subject: subject.into(),
            password_hash: password_hash.into(),
            display_name: display_name.into(),
            roles: BTreeSet::from([ROLE_USER.to_string()]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SecurityContext {
    #[default]
    Unauthenticated,
    Authenticated {
        principal: Principal,
        authorities: Vec<String>,
    },
}

impl SecurityContext {
    pub fn authenticated(principal: Principal) -> Self {
        SecurityContext::Authenticated {
            principal,
            authorities: vec![ROLE_USER.to_string()],
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SecurityContext::Authenticated { .. })
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            SecurityContext::Authenticated { principal, .. } => Some(principal),
            SecurityContext::Unauthenticated => None,
        }
    }

    pub fn authorities(&self) -> &[String] {
        match self {
            SecurityContext::Authenticated { authorities, .. } => authorities,
            SecurityContext::Unauthenticated => &[],
        }
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities().iter().any(|a| a == authority)
    }
}
