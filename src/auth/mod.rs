pub mod authenticator;
pub mod context;
pub mod extractors;
pub mod issuer;
pub mod middleware;
pub mod password;
pub mod routes;
pub mod store;
pub mod token;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub use authenticator::{bearer_token, FilterFault, Outcome, RequestAuthenticator};
pub use context::{Principal, SecurityContext, ROLE_USER};
pub use extractors::CurrentPrincipal;
pub use issuer::{AuthError, TokenIssuer};
pub use middleware::AuthMiddleware;
pub use password::{BcryptHasher, PasswordError, PasswordHasher};
pub use routes::{Access, RouteTable};
pub use store::{CredentialStore, MemoryCredentialStore, PgCredentialStore, StoreError};
pub use token::{Claims, IssuedToken, TokenCodec, TokenError};

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Account email; also the token subject.
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    /// Display name shown to other users.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Must be at least 6 characters long.
    #[validate(length(min = 6, max = 72))]
    pub password: String,
}

/// Response structure after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The signed bearer token.
    pub token: String,
    /// Always `"Bearer"`.
    pub token_type: String,
    pub subject: String,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for AuthResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            token_type: "Bearer".to_string(),
            subject: issued.subject,
            expires_at: issued.expires_at,
        }
    }
}
