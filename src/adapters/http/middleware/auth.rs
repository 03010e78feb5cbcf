//! Authentication middleware and extractors for axum.
//!
//! Requests carry a Bearer JWT signed with a shared HS256 secret. The
//! middleware validates the token and injects [`AuthUser`] into request
//! extensions; handlers opt in to enforcement with the [`RequireAuth`]
//! extractor. A request without a token passes through unauthenticated so
//! public routes keep working.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapters::http::ErrorEnvelope;
use crate::domain::foundation::UserId;
use crate::ports::UserRole;

/// Authenticated principal attached to the request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub role: UserRole,
}

/// JWT claims carried by access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    /// "customer" or "agent".
    pub role: String,
    /// Expiry, seconds since the epoch.
    pub exp: usize,
}

/// Errors that can occur validating a token.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,
}

/// Validates HS256 access tokens against the shared secret.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Validates a token and returns the principal it names.
    pub fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;

        let id = data
            .claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::InvalidToken)?;
        let role = match data.claims.role.as_str() {
            "customer" => UserRole::Customer,
            "agent" => UserRole::Agent,
            _ => return Err(AuthError::InvalidToken),
        };

        Ok(AuthUser { id, role })
    }
}

/// Auth middleware state.
pub type AuthState = Arc<TokenVerifier>;

/// Middleware that validates Bearer tokens.
///
/// A valid token injects [`AuthUser`] into extensions; an invalid one is a
/// 401 up front. A missing token passes through so handlers decide via
/// [`RequireAuth`].
pub async fn auth_middleware(
    State(verifier): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match token {
        Some(token) => match verifier.verify(token) {
            Ok(user) => {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
            Err(e) => {
                let message = match e {
                    AuthError::TokenExpired => "Token expired",
                    AuthError::InvalidToken => "Invalid token",
                };
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorEnvelope::failure(message)),
                )
                    .into_response()
            }
        },
        None => next.run(request).await,
    }
}

/// Extractor that requires an authenticated user.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthUser);

impl<S> axum::extract::FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<AuthUser>()
                .cloned()
                .map(RequireAuth)
                .ok_or(AuthRejection::Unauthenticated)
        })
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let AuthRejection::Unauthenticated = self;
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorEnvelope::failure("Authentication required")),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn issue(sub: &str, role: &str, exp_offset: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            role: role.to_string(),
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_yields_the_principal() {
        let verifier = TokenVerifier::new(SECRET);
        let id = UserId::new();
        let token = issue(&id.to_string(), "agent", 3600);

        let user = verifier.verify(&token).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, UserRole::Agent);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let verifier = TokenVerifier::new(SECRET);
        let token = issue(&UserId::new().to_string(), "customer", -3600);
        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let verifier = TokenVerifier::new("other-secret");
        let token = issue(&UserId::new().to_string(), "customer", 3600);
        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let verifier = TokenVerifier::new(SECRET);
        let token = issue(&UserId::new().to_string(), "admin", 3600);
        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn malformed_subject_is_rejected() {
        let verifier = TokenVerifier::new(SECRET);
        let token = issue("not-a-uuid", "customer", 3600);
        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn require_auth_extracts_user_from_extensions() {
        use axum::extract::FromRequestParts;
        use axum::http::Request;

        let mut request: Request<()> = Request::builder().uri("/test").body(()).unwrap();
        request.extensions_mut().insert(AuthUser {
            id: UserId::new(),
            role: UserRole::Customer,
        });
        let (mut parts, _body) = request.into_parts();

        let result = RequireAuth::from_request_parts(&mut parts, &()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn require_auth_fails_without_user() {
        use axum::extract::FromRequestParts;
        use axum::http::Request;

        let request: Request<()> = Request::builder().uri("/test").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();

        let result = RequireAuth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthRejection::Unauthenticated)));
    }

    #[test]
    fn auth_rejection_returns_401() {
        let response = AuthRejection::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
