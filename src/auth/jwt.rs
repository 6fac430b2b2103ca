use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{distributions::Alphanumeric, Rng};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::{Claims, TokenKind};
use crate::config::JwtConfig;

const TOKEN_ID_LEN: usize = 10;

/// HS256 signing and verification keys plus token lifetimes.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    access_ttl: TimeDuration,
    refresh_ttl: TimeDuration,
}

/// Both signed tokens together with the claims they carry.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access: Claims,
    pub refresh: Claims,
}

fn token_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_ID_LEN)
        .map(char::from)
        .collect()
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: TimeDuration::minutes(cfg.access_ttl_minutes),
            refresh_ttl: TimeDuration::hours(cfg.refresh_ttl_hours),
        }
    }

    fn claims_for(&self, user_id: i64, username: &str, kind: TokenKind) -> Claims {
        let now = OffsetDateTime::now_utc();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        Claims {
            jti: token_id(),
            sub: user_id,
            username: username.to_string(),
            iat: now.unix_timestamp(),
            exp: (now + ttl).unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
        }
    }

    pub(crate) fn sign_claims(&self, claims: &Claims) -> anyhow::Result<String> {
        let token = encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?;
        debug!(user_id = claims.sub, kind = ?claims.kind, "jwt signed");
        Ok(token)
    }

    /// Mints a fresh access token only; used by refresh.
    pub fn issue_access(&self, user_id: i64, username: &str) -> anyhow::Result<(String, Claims)> {
        let claims = self.claims_for(user_id, username, TokenKind::Access);
        let token = self.sign_claims(&claims)?;
        Ok((token, claims))
    }

    pub fn issue_pair(&self, user_id: i64, username: &str) -> anyhow::Result<TokenPair> {
        let (access_token, access) = self.issue_access(user_id, username)?;
        let refresh = self.claims_for(user_id, username, TokenKind::Refresh);
        let refresh_token = self.sign_claims(&refresh)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
            access,
            refresh,
        })
    }

    /// Checks signature, expiry, issuer, audience and token kind.
    pub fn validate(&self, token: &str, expected: TokenKind) -> anyhow::Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        if data.claims.kind != expected {
            anyhow::bail!("expected {expected:?} token, got {:?}", data.claims.kind);
        }
        debug!(user_id = data.claims.sub, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }
}
