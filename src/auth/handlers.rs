use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{SignInRequest, SignUpRequest, UserAuthResponse},
        jwt::TokenPair,
        middleware::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE},
        services,
    },
    error::AppError,
    response::ApiResponse,
    state::AppState,
};

const ACCESS_COOKIE_PATH: &str = "/";
const REFRESH_COOKIE_PATH: &str = "/api/refresh";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/signin", post(sign_in))
        .route("/refresh", post(refresh))
        .route("/signout", post(sign_out))
}

// No Secure flag: the cookies are also sent over plain HTTP.
fn token_cookie(name: &'static str, value: String, path: &'static str) -> Cookie<'static> {
    Cookie::build((name, value))
        .path(path)
        .http_only(true)
        .build()
}

fn expired_cookie(name: &'static str, path: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path(path)
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .build()
}

fn with_tokens(jar: CookieJar, tokens: TokenPair) -> CookieJar {
    jar.add(token_cookie(
        ACCESS_TOKEN_COOKIE,
        tokens.access_token,
        ACCESS_COOKIE_PATH,
    ))
    .add(token_cookie(
        REFRESH_TOKEN_COOKIE,
        tokens.refresh_token,
        REFRESH_COOKIE_PATH,
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<(CookieJar, ApiResponse<UserAuthResponse>), AppError> {
    let Json(req) = payload?;
    let session = services::sign_up(&state, req).await?;
    Ok((
        with_tokens(jar, session.tokens),
        ApiResponse::ok(session.user),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<(CookieJar, ApiResponse<UserAuthResponse>), AppError> {
    let Json(req) = payload?;
    let session = services::sign_in(&state, req).await?;
    Ok((
        with_tokens(jar, session.tokens),
        ApiResponse::ok(session.user),
    ))
}

#[instrument(skip(state, jar))]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<()>), AppError> {
    let Some(cookie) = jar.get(REFRESH_TOKEN_COOKIE) else {
        warn!("refresh without refresh token cookie");
        return Err(AppError::Auth("refresh token missing".into()));
    };
    let (token, _) = services::refresh_access_token(&state, cookie.value())?;
    let jar = jar.add(token_cookie(ACCESS_TOKEN_COOKIE, token, ACCESS_COOKIE_PATH));
    Ok((jar, ApiResponse::empty(StatusCode::OK)))
}

/// Clears both cookies. Tokens already handed out stay valid until they expire.
#[instrument(skip(jar))]
pub async fn sign_out(jar: CookieJar) -> (CookieJar, ApiResponse<()>) {
    info!("signing out");
    let jar = jar
        .add(expired_cookie(ACCESS_TOKEN_COOKIE, ACCESS_COOKIE_PATH))
        .add(expired_cookie(REFRESH_TOKEN_COOKIE, REFRESH_COOKIE_PATH));
    (jar, ApiResponse::empty(StatusCode::OK))
}
