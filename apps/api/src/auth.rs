//! Bearer token verification.
//!
//! Tokens are issued elsewhere; this module only verifies HS256 signatures
//! and expiry and turns the claims into an [`Identity`]. The tenant a
//! request works on always comes from the token, never from the body.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id), recorded as the actor of every write
    pub sub: String,

    pub tenant_id: String,

    pub role: Role,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Cashier,
}

impl Role {
    /// Catalog edits and manual stock adjustments.
    pub fn can_manage_inventory(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    /// Tenant-wide sale defaults (tax).
    pub fn can_manage_settings(self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Verifies tokens signed with the shared secret.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        JwtVerifier {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Validate and decode a token.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let data: TokenData<Claims> = decode(token, &self.key, &self.validation)
            .map_err(|e| ApiError::Unauthorized(format!("Invalid token: {e}")))?;

        let claims = data.claims;
        if claims.sub.trim().is_empty() || claims.tenant_id.trim().is_empty() {
            return Err(ApiError::Unauthorized(
                "Token has no subject or tenant".to_string(),
            ));
        }
        Ok(claims)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` value.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The verified caller of a request.
#[derive(Debug, Clone)]
pub struct Identity {
    pub tenant_id: String,
    pub actor_id: String,
    pub role: Role,
}

impl Identity {
    pub fn require_inventory_manager(&self) -> Result<(), ApiError> {
        self.require(
            self.role.can_manage_inventory(),
            "Only admins and managers can perform this action",
        )
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        self.require(
            self.role.can_manage_settings(),
            "Only admins can perform this action",
        )
    }

    fn require(&self, allowed: bool, message: &str) -> Result<(), ApiError> {
        if allowed {
            return Ok(());
        }
        warn!(
            tenant_id = %self.tenant_id,
            actor_id = %self.actor_id,
            role = ?self.role,
            "Role not permitted"
        );
        Err(ApiError::Forbidden(message.to_string()))
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity {
            tenant_id: claims.tenant_id,
            actor_id: claims.sub,
            role: claims.role,
        }
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(extract_bearer_token)
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

        let claims = state.jwt.verify(token)?;
        Ok(claims.into())
    }
}
