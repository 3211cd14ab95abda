//! JWT issuing and validation for API sessions.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::principal::Principal;
use crate::config::AuthConfig;
use crate::domain::UserId;
use crate::errors::{Error, Result};

/// JWT claims carried by every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account id.
    pub sub: String,
    pub email: String,
    pub roles: Vec<String>,
    /// Issued at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiration, seconds since the Unix epoch.
    pub exp: i64,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_minutes: i64,
}

impl JwtService {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            ttl_minutes: config.jwt_ttl_minutes,
        }
    }

    pub fn issue(&self, principal: &Principal) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: principal.user_id.as_str().to_string(),
            email: principal.email.clone(),
            roles: principal.authorities.clone(),
            iat: now,
            exp: now + self.ttl_minutes * 60,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| Error::internal(format!("Failed to sign session token: {}", err)))
    }

    /// Validate signature and expiry, returning the embedded principal.
    pub fn verify(&self, token: &str) -> Result<Principal> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| Error::invalid_credentials("<token>"))?;

        Ok(Principal {
            user_id: UserId::from_string(data.claims.sub),
            email: data.claims.email,
            authorities: data.claims.roles,
        })
    }
}
