//! Two-step request authentication.
//!
//! `deserialize_user` attaches an [`AuthUser`] to the request when a valid
//! access token is present and lets everything else through.
//! `authentication_required` then rejects requests that carry no identity.
//! Routes that only need soft authentication use the first step alone.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use super::claims::{AuthUser, TokenKind};
use crate::{error::AppError, state::AppState};

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

fn access_token(headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = CookieJar::from_headers(headers).get(ACCESS_TOKEN_COOKIE) {
        return Some(cookie.value().to_string());
    }
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(str::to_string)
}

pub async fn deserialize_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = access_token(req.headers()) {
        match state.jwt.validate(&token, TokenKind::Access) {
            Ok(claims) => {
                req.extensions_mut().insert(AuthUser::from(claims));
            }
            Err(e) => debug!(error = %e, "ignoring unusable access token"),
        }
    }
    next.run(req).await
}

pub async fn authentication_required(req: Request, next: Next) -> Result<Response, AppError> {
    if req.extensions().get::<AuthUser>().is_none() {
        return Err(AppError::Auth("authentication required".into()));
    }
    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Auth("authentication required".into()))
    }
}
