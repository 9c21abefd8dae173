/// Authentication Routes
///
/// Thin HTTP adapters over `AuthService`. Sign-in and sign-up take a JSON
/// body; refresh and sign-out take the token from the Authorization header.

use actix_web::error::JsonPayloadError;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::auth::{AuthService, Identity};
use crate::error::{AuthError, ValidationError};
use crate::middleware::bearer_token;

/// Sign-in and sign-up request
#[derive(Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

/// Answer unreadable JSON bodies with the regular error envelope.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(path = %req.path(), error = %err, "Rejected request body");
    AuthError::Validation(ValidationError::InvalidFormat("request body".to_string())).into()
}

/// POST /api/auth/signin
///
/// # Errors
/// - 401: Invalid credentials (unknown username or wrong password alike)
/// - 503: Credential store unavailable
pub async fn sign_in(
    form: web::Json<AuthRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AuthError> {
    let result = auth.sign_in(&form.username, &form.password).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// POST /api/auth/signup
///
/// # Errors
/// - 400: Malformed username or password
/// - 409: Username already registered
/// - 503: Store unavailable
pub async fn sign_up(
    form: web::Json<AuthRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AuthError> {
    let result = auth.sign_up(&form.username, &form.password).await?;
    Ok(HttpResponse::Created().json(result))
}

/// POST /api/auth/refresh
///
/// Requires `Authorization: Bearer <refresh_token>`. Returns a new token
/// pair.
pub async fn refresh(
    req: HttpRequest,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AuthError> {
    let token = bearer_token(req.headers())?;
    let result = auth.refresh(&token).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// POST /api/auth/signout
///
/// Requires `Authorization: Bearer <access_token>`. The token is not
/// revoked.
pub async fn sign_out(
    req: HttpRequest,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AuthError> {
    let token = bearer_token(req.headers())?;
    auth.sign_out(&token).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/me
///
/// Identity is injected by `JwtMiddleware`.
pub async fn current_user(identity: web::ReqData<Identity>) -> HttpResponse {
    HttpResponse::Ok().json(identity.into_inner())
}
