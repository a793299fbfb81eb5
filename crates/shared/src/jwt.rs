//! Access tokens for Foodfight sessions.
//!
//! Deployments sign with an RS256 key pair from configuration. Every token
//! names `foodfight` as issuer and tokens from any other issuer are rejected.
//! [`JwtConfig::from_secret`] builds an HS256 signer for tests.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Value of the `iss` claim.
pub const TOKEN_ISSUER: &str = "foodfight";

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl Claims {
    /// The authenticated user. A subject that is not a UUID makes the token invalid.
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::Invalid)
    }
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    pub access_token_expiry_secs: i64,
    /// Tolerated clock skew.
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("algorithm", &self.algorithm)
            .field("access_token_expiry_secs", &self.access_token_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .finish_non_exhaustive()
    }
}

impl JwtConfig {
    pub fn from_rsa_pem(
        private_key_pem: &str,
        public_key_pem: &str,
        access_token_expiry_secs: i64,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("private key: {}", e)))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("public key: {}", e)))?;

        Ok(Self {
            encoding_key,
            decoding_key,
            algorithm: Algorithm::RS256,
            access_token_expiry_secs,
            leeway_secs,
        })
    }

    /// HS256 with a shared secret, for tests.
    pub fn from_secret(secret: &str, access_token_expiry_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
            access_token_expiry_secs,
            leeway_secs: 0,
        }
    }

    /// Signs a session token for `user_id` valid from `now`.
    pub fn issue(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<AccessToken, JwtError> {
        let expires_at = now + Duration::seconds(self.access_token_expiry_secs);
        let claims = Claims {
            sub: user_id.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Signing(e.to_string()))?;

        Ok(AccessToken {
            token,
            jti: claims.jti,
            expires_at,
        })
    }

    /// Checks signature, issuer and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = self.leeway_secs;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> JwtConfig {
        JwtConfig::from_secret("supper-club-test-secret", 900)
    }

    #[test]
    fn test_issue_then_verify() {
        let jwt = signer();
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let issued = jwt.issue(user_id, now).unwrap();
        let claims = jwt.verify(&issued.token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.exp - claims.iat, 900);
        assert_eq!(issued.expires_at.timestamp(), claims.exp);
    }

    #[test]
    fn test_expired_token() {
        let jwt = signer();
        let issued = jwt
            .issue(Uuid::new_v4(), Utc::now() - Duration::hours(1))
            .unwrap();

        assert!(matches!(jwt.verify(&issued.token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let issued = JwtConfig::from_secret("someone-else", 900)
            .issue(Uuid::new_v4(), Utc::now())
            .unwrap();

        assert!(matches!(signer().verify(&issued.token), Err(JwtError::Invalid)));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let jwt = signer();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iss: "elsewhere".to_string(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
            jti: "x".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"supper-club-test-secret"),
        )
        .unwrap();

        assert!(matches!(jwt.verify(&token), Err(JwtError::Invalid)));
    }

    #[test]
    fn test_non_uuid_subject() {
        let claims = Claims {
            sub: "eve".to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: 0,
            exp: 0,
            jti: String::new(),
        };
        assert!(matches!(claims.user_id(), Err(JwtError::Invalid)));
    }

    #[test]
    fn test_garbage_and_bad_keys() {
        assert!(matches!(signer().verify("not_a_jwt"), Err(JwtError::Invalid)));
        assert!(matches!(
            JwtConfig::from_rsa_pem("nope", "nope", 3600, 30),
            Err(JwtError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_each_token_gets_its_own_jti() {
        let jwt = signer();
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        assert_ne!(
            jwt.issue(user_id, now).unwrap().jti,
            jwt.issue(user_id, now).unwrap().jti
        );
    }
}
