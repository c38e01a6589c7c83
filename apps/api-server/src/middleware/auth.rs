//! Authentication middleware and extractors.
//!
//! Bearer tokens are accepted from the `token` query parameter (the wire
//! contract the web client uses) or from the `Authorization` header. The
//! token is validated against the injected `TokenService`; no ambient
//! credential storage is consulted.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header};
use std::future::{Ready, ready};
use std::sync::Arc;

use gflab_core::domain::Viewer;
use gflab_core::ports::{AuthError, ROLE_ADMIN, TokenClaims, TokenService};

/// Authenticated user identity extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub email: String,
    pub roles: Vec<String>,
}

impl Identity {
    /// Check if the user has a specific role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Elevated trust level required for notice administration.
    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    /// The viewer this identity stands for, for viewer-relative reads.
    pub fn viewer(&self) -> Viewer {
        Viewer {
            user_id: self.user_id,
            email: self.email.clone(),
        }
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            roles: claims.roles,
        }
    }
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match &self.0 {
            AuthError::TokenExpired => actix_web::http::StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken(_) => actix_web::http::StatusCode::UNAUTHORIZED,
            AuthError::MissingAuth => actix_web::http::StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions => actix_web::http::StatusCode::FORBIDDEN,
            _ => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        use gflab_shared::ErrorResponse;

        let error = match &self.0 {
            AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your authentication token has expired. Please login again."),
            AuthError::InvalidToken(msg) => {
                ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::MissingAuth => ErrorResponse::new(401, "Authentication Required")
                .with_detail("Provide a token query parameter or a Bearer token."),
            AuthError::InsufficientPermissions => ErrorResponse::forbidden(),
            _ => ErrorResponse::internal_error(),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

/// The raw token carried by a request, if any.
fn bearer_token(req: &HttpRequest) -> Result<Option<String>, AuthError> {
    // Query parameter first - the web client passes `?token=`.
    let from_query = req
        .query_string()
        .split('&')
        .find_map(|pair| pair.strip_prefix("token="))
        .filter(|token| !token.is_empty());
    if let Some(token) = from_query {
        return Ok(Some(token.to_string()));
    }

    let Some(header_value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let auth_str = header_value
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;
    match auth_str.strip_prefix("Bearer ") {
        Some(token) => Ok(Some(token.to_string())),
        None => Err(AuthError::InvalidToken(
            "Expected Bearer token".to_string(),
        )),
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // Get token service from app data
        let token_service = match req.app_data::<actix_web::web::Data<Arc<dyn TokenService>>>() {
            Some(service) => service,
            None => {
                tracing::error!("TokenService not found in app data");
                return ready(Err(AuthenticationError(AuthError::InvalidToken(
                    "Server configuration error".to_string(),
                ))));
            }
        };

        let token = match bearer_token(req) {
            Ok(Some(token)) => token,
            Ok(None) => return ready(Err(AuthenticationError(AuthError::MissingAuth))),
            Err(e) => return ready(Err(AuthenticationError(e))),
        };

        match token_service.validate_token(&token) {
            Ok(claims) => ready(Ok(Identity::from(claims))),
            Err(e) => ready(Err(AuthenticationError(e))),
        }
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        match Identity::from_request(req, payload).into_inner() {
            Ok(identity) => ready(Ok(OptionalIdentity(Some(identity)))),
            Err(_) => ready(Ok(OptionalIdentity(None))),
        }
    }
}
