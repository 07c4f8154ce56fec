//! JWT gate for the application router.
//!
//! When enabled, every request must carry `Authorization: Bearer <token>`
//! with an HS256 token signed by the configured secret. Anything else is
//! answered with 403.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Claims carried by API tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub username: String,
    /// Expiry, Unix epoch seconds. Checked only when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// Verifies bearer tokens against a shared secret.
#[derive(Clone)]
pub struct JwtAuth {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAuth {
    pub fn hs256(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.key, &self.validation).map(|data| data.claims)
    }
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Axum middleware rejecting requests without a valid bearer token.
pub async fn require_jwt(State(auth): State<Arc<JwtAuth>>, req: Request, next: Next) -> Response {
    let verified = match bearer_token(&req) {
        Some(token) => auth.verify(token).map_err(|err| err.to_string()),
        None => Err("missing bearer token".to_owned()),
    };

    match verified {
        Ok(claims) => {
            debug!(username = %claims.username, "request authenticated");
            next.run(req).await
        }
        Err(reason) => {
            warn!(%reason, path = %req.uri().path(), "request rejected by jwt gate");
            (StatusCode::FORBIDDEN, "Forbidden").into_response()
        }
    }
}
