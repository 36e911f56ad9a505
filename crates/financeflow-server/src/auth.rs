//! JWT access and refresh tokens
//!
//! Access tokens are short-lived and carry the user's profile. Refresh tokens
//! carry only the user id plus a `jti`; the `jti` must also be present in the
//! database for the token to be accepted, which makes refresh tokens
//! revocable and single-use.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use financeflow_core::models::UserProfile;

/// Access token lifetime
pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 15;

/// Refresh token lifetime
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Signing secrets for the two token kinds
#[derive(Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    pub user_id: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// A freshly minted refresh token and the row the store needs to track it
pub struct IssuedRefreshToken {
    pub token: String,
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

impl JwtConfig {
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
        }
    }

    pub fn issue_access_token(
        &self,
        user: &UserProfile,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = AccessClaims {
            user_id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(ACCESS_TOKEN_TTL_MINUTES)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.access_secret.as_bytes()),
        )
    }

    pub fn issue_refresh_token(
        &self,
        user_id: &str,
    ) -> Result<IssuedRefreshToken, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let expires_at = now + Duration::days(REFRESH_TOKEN_TTL_DAYS);
        let claims = RefreshClaims {
            user_id: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.refresh_secret.as_bytes()),
        )?;

        Ok(IssuedRefreshToken {
            token,
            token_id: claims.jti,
            expires_at,
        })
    }

    /// Check signature and expiry of an access token
    pub fn verify_access_token(
        &self,
        token: &str,
    ) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
        decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.access_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
    }

    /// Check signature and expiry of a refresh token
    ///
    /// This does not consult the revocation table; callers must also check
    /// the `jti` against the store.
    pub fn verify_refresh_token(
        &self,
        token: &str,
    ) -> Result<RefreshClaims, jsonwebtoken::errors::Error> {
        decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(self.refresh_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
    }
}
