use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The only algorithm this codec issues or accepts.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the principal's email.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch). The token is valid strictly before it.
    pub exp: i64,
}

/// A freshly signed token together with the values it was built from.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    /// Compact JWS serialization, as sent in `Authorization: Bearer <token>`.
    pub token: String,
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Reasons a token string is refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("unsupported token format")]
    UnsupportedFormat,
    #[error("failed to encode token: {0}")]
    Encoding(String),
}

/// Signs and verifies HS256 bearer tokens with a symmetric key.
///
/// Keys are derived once from the secret and shared read-only afterwards.
/// Verification never consults a clock of its own when called through
/// [`TokenCodec::decode_and_verify_at`], which keeps it a pure function of
/// token, key and instant.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        // Expiry is checked against the caller's instant with no leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issues a token for `subject` valid for `ttl` from now.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, ttl, Utc::now())
    }

    /// Issues a token as if the current instant were `now`. A negative `ttl`
    /// yields a token that is already expired.
    pub fn issue_at(
        &self,
        subject: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Encoding("expiry out of range".into()))?;

        let claims = Claims {
            sub: subject.to_owned(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(IssuedToken {
            token,
            subject: claims.sub,
            issued_at: timestamp(claims.iat),
            expires_at: timestamp(claims.exp),
        })
    }

    /// Verifies `token` against the current instant.
    pub fn decode_and_verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_and_verify_at(token, Utc::now())
    }

    /// Verifies signature, algorithm and structure, then requires `now < exp`.
    pub fn decode_and_verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| classify_jwt_error(token, e.kind()))?;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &TOKEN_ALGORITHM)
            .finish_non_exhaustive()
    }
}

fn classify_jwt_error(token: &str, kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            TokenError::UnsupportedFormat
        }
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ if names_foreign_algorithm(token) => TokenError::UnsupportedFormat,
        _ => TokenError::Malformed,
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// `jsonwebtoken` cannot parse headers naming `none` or an algorithm it does not
/// know, so the header is read here to tell those apart from garbage.
fn names_foreign_algorithm(token: &str) -> bool {
    let Some(encoded) = token.split('.').next() else {
        return false;
    };
    URL_SAFE_NO_PAD
        .decode(encoded)
        .ok()
        .and_then(|bytes| serde_json::from_slice::<RawHeader>(&bytes).ok())
        .map_or(false, |header| header.alg != "HS256")
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}
