use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::app::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub email: String,
    pub exp: usize,
}

/// HS256 keys derived from the configured secret.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /** Signs a token identifying `email`, valid for the configured lifetime */
    pub fn issue(&self, email: &str) -> Result<String, AppError> {
        let claims = Claims {
            email: email.to_string(),
            exp: (Utc::now().timestamp() as u64 + self.ttl_secs) as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|err| {
            log::error!("unable to sign token: {}", err);
            AppError::InternalServerError
        })
    }

    /// Checks signature and expiry, returning the claims on success.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let decoded = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(decoded.claims)
    }
}
