//! Sign-up, sign-in and access-token refresh.
//!
//! Each call touches the user store at most once; token minting is pure CPU
//! work. Refresh tokens never rotate and nothing is revoked, so a token stays
//! usable until its `exp` regardless of sign-out.

use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        claims::{Claims, TokenKind},
        dto::{SignInRequest, SignUpRequest, UserAuthResponse},
        jwt::TokenPair,
        password::{hash_password, verify_password},
    },
    error::{AppError, ErrorDetail, RepoError},
    state::AppState,
};

pub const INVALID_CREDENTIALS: &str = "incorrect username or password";
pub const USERNAME_TAKEN: &str =
    "this username is already in use. please use a different username or try logging in";

/// A signed-in user and the tokens minted for them.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: UserAuthResponse,
    pub tokens: TokenPair,
}

fn validation_error(details: Vec<ErrorDetail>) -> AppError {
    AppError::validation("validation error", details)
}

#[instrument(skip(st, req), fields(username = %req.username))]
pub async fn sign_up(st: &AppState, req: SignUpRequest) -> Result<AuthSession, AppError> {
    let username = req.username.trim();

    let mut details = Vec::new();
    if username.is_empty() {
        details.push(ErrorDetail::required("username"));
    }
    if req.password.is_empty() {
        details.push(ErrorDetail::required("password"));
    }
    if req.password_confirmation != req.password {
        details.push(ErrorDetail::new(
            "passwordConfirmation",
            "",
            "passwordConfirmation must match password",
        ));
    }
    if !details.is_empty() {
        warn!(?details, "sign-up rejected");
        return Err(validation_error(details));
    }

    let hash = hash_password(&req.password)?;
    let user = match st.users.create(username, &hash).await {
        Ok(u) => u,
        Err(RepoError::Duplicate) => {
            warn!("username already registered");
            return Err(AppError::Conflict(USERNAME_TAKEN.into()));
        }
        Err(e) => return Err(e.into()),
    };

    let tokens = st.jwt.issue_pair(user.id, &user.username)?;
    info!(
        user_id = user.id,
        access_jti = %tokens.access.jti,
        refresh_jti = %tokens.refresh.jti,
        refresh_exp = tokens.refresh.exp,
        "user signed up"
    );
    Ok(AuthSession {
        user: UserAuthResponse {
            user_id: user.id,
            username: user.username,
        },
        tokens,
    })
}

#[instrument(skip(st, req), fields(username = %req.username))]
pub async fn sign_in(st: &AppState, req: SignInRequest) -> Result<AuthSession, AppError> {
    let username = req.username.trim();

    let mut details = Vec::new();
    if username.is_empty() {
        details.push(ErrorDetail::required("username"));
    }
    if req.password.is_empty() {
        details.push(ErrorDetail::required("password"));
    }
    if !details.is_empty() {
        return Err(validation_error(details));
    }

    let Some(user) = st.users.find_by_username(username).await? else {
        warn!("sign-in for unknown username");
        return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
    };

    let ok = verify_password(&req.password, &user.password).map_err(|e| {
        error!(error = %e, user_id = user.id, "stored password hash unreadable");
        AppError::Internal(e)
    })?;
    if !ok {
        warn!(user_id = user.id, "sign-in with wrong password");
        return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
    }

    let tokens = st.jwt.issue_pair(user.id, &user.username)?;
    info!(
        user_id = user.id,
        access_jti = %tokens.access.jti,
        refresh_jti = %tokens.refresh.jti,
        refresh_exp = tokens.refresh.exp,
        "user signed in"
    );
    Ok(AuthSession {
        user: UserAuthResponse {
            user_id: user.id,
            username: user.username,
        },
        tokens,
    })
}

/// Validates a refresh token and mints a new access token. The refresh token
/// itself is left as is.
#[instrument(skip_all)]
pub fn refresh_access_token(
    st: &AppState,
    refresh_token: &str,
) -> Result<(String, Claims), AppError> {
    let refresh = st
        .jwt
        .validate(refresh_token, TokenKind::Refresh)
        .map_err(|e| {
            warn!(error = %e, "refresh token rejected");
            AppError::Auth("refresh token invalid".into())
        })?;

    let (token, claims) = st.jwt.issue_access(refresh.sub, &refresh.username)?;
    info!(user_id = claims.sub, "access token refreshed");
    Ok((token, claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fakes;
    use time::OffsetDateTime;

    fn sign_up_req(username: &str, password: &str, confirmation: &str) -> SignUpRequest {
        SignUpRequest {
            username: username.into(),
            password: password.into(),
            password_confirmation: confirmation.into(),
        }
    }

    fn sign_in_req(username: &str, password: &str) -> SignInRequest {
        SignInRequest {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn sign_up_issues_tokens_for_the_new_user() {
        let st = AppState::fake();
        let session = sign_up(&st, sign_up_req("alice", "pw-123", "pw-123"))
            .await
            .expect("sign up");

        let claims = st
            .jwt
            .validate(&session.tokens.access_token, TokenKind::Access)
            .expect("access token validates");
        assert_eq!(claims.sub, session.user.user_id);
        assert_eq!(claims.username, "alice");

        let now = OffsetDateTime::now_utc().unix_timestamp();
        let ahead = claims.exp - now;
        assert!((14 * 60..=15 * 60).contains(&ahead), "exp {ahead}s ahead");
    }

    #[tokio::test]
    async fn sign_up_stores_a_hash_not_the_password() {
        let st = AppState::fake();
        sign_up(&st, sign_up_req("bob", "plain", "plain")).await.unwrap();
        let stored = st.users.find_by_username("bob").await.unwrap().unwrap();
        assert_ne!(stored.password, "plain");
        assert!(verify_password("plain", &stored.password).unwrap());
    }

    #[tokio::test]
    async fn duplicate_username_conflicts_without_second_insert() {
        let (st, users) = fakes::build();
        sign_up(&st, sign_up_req("carol", "a", "a")).await.unwrap();

        let err = sign_up(&st, sign_up_req("carol", "b", "b")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(users.count(), 1);
    }

    #[tokio::test]
    async fn sign_up_validates_fields() {
        let (st, users) = fakes::build();
        let err = sign_up(&st, sign_up_req("  ", "", "x")).await.unwrap_err();
        let AppError::Validation { details, .. } = err else {
            panic!("expected validation error");
        };
        let paths: Vec<_> = details.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, ["username", "password", "passwordConfirmation"]);
        assert_eq!(users.count(), 0);
    }

    #[tokio::test]
    async fn sign_in_round_trip() {
        let st = AppState::fake();
        let created = sign_up(&st, sign_up_req("dave", "s3cret", "s3cret")).await.unwrap();

        let session = sign_in(&st, sign_in_req("dave", "s3cret")).await.unwrap();
        assert_eq!(session.user, created.user);
        let refresh = st
            .jwt
            .validate(&session.tokens.refresh_token, TokenKind::Refresh)
            .unwrap();
        assert_eq!(refresh.sub, created.user.user_id);
        assert_eq!(refresh.username, "dave");
    }

    #[tokio::test]
    async fn sign_in_failures_are_indistinguishable() {
        let st = AppState::fake();
        sign_up(&st, sign_up_req("erin", "right", "right")).await.unwrap();

        let wrong_pw = sign_in(&st, sign_in_req("erin", "wrong")).await.unwrap_err();
        let unknown = sign_in(&st, sign_in_req("nobody", "right")).await.unwrap_err();
        assert!(matches!(wrong_pw, AppError::Auth(_)));
        assert!(matches!(unknown, AppError::Auth(_)));
        assert_eq!(wrong_pw.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn sign_in_requires_fields() {
        let st = AppState::fake();
        let err = sign_in(&st, sign_in_req("", "")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref details, .. } if details.len() == 2));
    }

    #[tokio::test]
    async fn refresh_mints_new_access_token_only() {
        let st = AppState::fake();
        let session = sign_up(&st, sign_up_req("frank", "pw", "pw")).await.unwrap();

        let (token, claims) = refresh_access_token(&st, &session.tokens.refresh_token).unwrap();
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.sub, session.user.user_id);
        assert_eq!(claims.username, "frank");
        assert_ne!(claims.jti, session.tokens.access.jti);
        assert!(st.jwt.validate(&token, TokenKind::Access).is_ok());
        // the refresh token keeps working
        assert!(refresh_access_token(&st, &session.tokens.refresh_token).is_ok());
    }

    #[tokio::test]
    async fn refresh_rejects_expired_or_access_tokens() {
        let st = AppState::fake();
        let session = sign_up(&st, sign_up_req("gina", "pw", "pw")).await.unwrap();

        let mut expired = session.tokens.refresh.clone();
        expired.iat -= 400 * 3600;
        expired.exp = OffsetDateTime::now_utc().unix_timestamp() - 1;
        let expired_token = st.jwt.sign_claims(&expired).unwrap();

        let err = refresh_access_token(&st, &expired_token).unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));

        let err = refresh_access_token(&st, &session.tokens.access_token).unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }
}
