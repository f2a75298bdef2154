//! HS256 JWT implementation of `TokenService`.
//!
//! Tokens carry only `{sub, exp}`. Nothing is stored server-side, so a token
//! stays valid until its expiry instant; there is no early revocation.

use chrono::{Duration, Utc};
use domains::{TokenError, TokenService};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Principal id as a decimal string
    pub sub: String,
    /// Expiry, unix epoch seconds
    pub exp: i64,
}

#[derive(Clone)]
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl JwtTokenService {
    pub fn new(secret: &SecretString, default_ttl: Duration) -> Self {
        let secret = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(ALGORITHM);
        // Expiry must be strictly in the future; the default 60s grace is off.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            default_ttl,
        }
    }
}

impl TokenService for JwtTokenService {
    fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn issue(&self, principal_id: i64, ttl: Duration) -> Result<String, TokenError> {
        let claims = Claims {
            sub: principal_id.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        };
        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<i64, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        // jsonwebtoken accepts exp == now; we do not.
        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Invalid("token expired".into()));
        }

        claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Invalid("subject is not a principal id".into()))
    }
}
