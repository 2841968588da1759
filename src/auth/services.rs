//! Operator credentials: argon2 password hashes, the JWT pair and the
//! bearer-token extractor that guards every non-auth route.

use argon2::{
    password_hash::{self, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use time::{Duration, OffsetDateTime};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::{
    auth::claims::{Claims, TokenKind},
    config::JwtConfig,
    error::AppError,
    state::AppState,
};

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
                .expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

/// Argon2id PHC string for an operator password.
pub fn hash_password(plain: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "password hashing failed");
            AppError::Internal(anyhow::anyhow!("password hashing failed: {e}"))
        })
}

/// `Ok(false)` for a wrong password. A stored hash that does not parse is an
/// internal error, never a failed login.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored password hash is unreadable");
        AppError::Internal(anyhow::anyhow!("stored password hash is unreadable: {e}"))
    })?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(anyhow::anyhow!("password check failed: {e}"))),
    }
}

/// HS256 keys plus the issuer, audience and lifetimes every toystore token carries.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl From<&JwtConfig> for JwtKeys {
    fn from(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::minutes(cfg.ttl_minutes.max(1)),
            refresh_ttl: Duration::minutes(cfg.refresh_ttl_minutes.max(1)),
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from(&state.config.jwt)
    }
}

impl JwtKeys {
    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Signs a `kind` token for `operator` as if issued at `now`.
    pub fn issue(
        &self,
        operator: Uuid,
        kind: TokenKind,
        now: OffsetDateTime,
    ) -> Result<String, AppError> {
        let claims = Claims::new(operator, kind, now, self.ttl(kind), &self.issuer, &self.audience);
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("jwt signing failed: {e}")))?;
        debug!(operator = %operator, kind = kind.as_str(), exp = claims.exp, "jwt issued");
        Ok(token)
    }

    pub fn sign_access(&self, operator: Uuid) -> Result<String, AppError> {
        self.issue(operator, TokenKind::Access, OffsetDateTime::now_utc())
    }

    pub fn sign_refresh(&self, operator: Uuid) -> Result<String, AppError> {
        self.issue(operator, TokenKind::Refresh, OffsetDateTime::now_utc())
    }

    /// Checks signature, expiry, issuer and audience, then that the token is
    /// the `expected` half of the pair. Every failure is a 401.
    pub fn decode(&self, token: &str, expected: TokenKind) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| {
                warn!(error = %e, kind = expected.as_str(), "jwt rejected");
                AppError::unauthorized(match expected {
                    TokenKind::Access => "Invalid or expired token",
                    TokenKind::Refresh => "Invalid or expired refresh token",
                })
            })?
            .claims;

        if claims.kind != expected {
            warn!(operator = %claims.sub, got = claims.kind.as_str(), "wrong token kind");
            return Err(AppError::unauthorized(match expected {
                TokenKind::Access => "Access token required",
                TokenKind::Refresh => "Refresh token required",
            }));
        }
        Ok(claims)
    }
}

/// Token from `Authorization: Bearer <token>`; the scheme is case-insensitive.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid Authorization header"))?;
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AppError::unauthorized("Invalid Authorization header")),
    }
}

/// Authenticated operator id, taken from a valid access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = JwtKeys::from_ref(state).decode(token, TokenKind::Access)?;
        Ok(AuthUser(claims.sub))
    }
}




#[cfg(test)]
mod extractor_tests {
    use super::*;
    use axum::http::Request;

    async fn extract(state: &AppState, authorization: Option<String>) -> Result<AuthUser, AppError> {
        let mut req = Request::builder().uri("/clientes");
        if let Some(value) = authorization {
            req = req.header(AUTHORIZATION, value);
        }
        let (mut parts, ()) = req.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, state).await
    }

    fn message(err: AppError) -> String {
        assert_eq!(err.kind(), "unauthorized");
        err.to_string()
    }

    #[tokio::test]
    async fn access_token_yields_operator_for_any_scheme_case() {
        let state = AppState::fake();
        let operator = Uuid::new_v4();
        let token = JwtKeys::from_ref(&state).sign_access(operator).unwrap();
        for scheme in ["Bearer", "bearer", "BEARER"] {
            let AuthUser(id) = extract(&state, Some(format!("{scheme} {token}"))).await.unwrap();
            assert_eq!(id, operator);
        }
    }

    #[tokio::test]
    async fn missing_or_foreign_scheme_is_rejected() {
        let state = AppState::fake();
        let err = extract(&state, None).await.unwrap_err();
        assert_eq!(message(err), "Missing Authorization header");
        for value in ["Basic YWRtaW46YWRtaW4=", "Bearer", "Bearer   "] {
            let err = extract(&state, Some(value.into())).await.unwrap_err();
            assert_eq!(message(err), "Invalid Authorization header");
        }
    }

    #[tokio::test]
    async fn expired_access_token_is_rejected() {
        let state = AppState::fake();
        let issued = OffsetDateTime::now_utc() - Duration::hours(2);
        let token = JwtKeys::from_ref(&state)
            .issue(Uuid::new_v4(), TokenKind::Access, issued)
            .unwrap();
        let err = extract(&state, Some(format!("Bearer {token}"))).await.unwrap_err();
        assert_eq!(message(err), "Invalid or expired token");
    }

    #[tokio::test]
    async fn refresh_token_cannot_authenticate_requests() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign_refresh(Uuid::new_v4()).unwrap();
        let err = extract(&state, Some(format!("Bearer {token}"))).await.unwrap_err();
        assert_eq!(message(err), "Access token required");
    }

    #[tokio::test]
    async fn token_from_another_deployment_is_rejected() {
        let state = AppState::fake();
        let other = JwtKeys::from(&JwtConfig {
            secret: "outra-loja".into(),
            issuer: state.config.jwt.issuer.clone(),
            audience: state.config.jwt.audience.clone(),
            ttl_minutes: 15,
            refresh_ttl_minutes: 60,
        });
        let token = other.sign_access(Uuid::new_v4()).unwrap();
        let err = extract(&state, Some(format!("Bearer {token}"))).await.unwrap_err();
        assert_eq!(message(err), "Invalid or expired token");
    }

    #[tokio::test]
    async fn refresh_decode_returns_operator_and_rejects_access_tokens() {
        let keys = JwtKeys::from_ref(&AppState::fake());
        let operator = Uuid::new_v4();

        let refresh = keys.sign_refresh(operator).unwrap();
        let claims = keys.decode(&refresh, TokenKind::Refresh).unwrap();
        assert_eq!(claims.sub, operator);
        assert_eq!(claims.exp - claims.iat, keys.refresh_ttl.whole_seconds());

        let access = keys.sign_access(operator).unwrap();
        let err = keys.decode(&access, TokenKind::Refresh).unwrap_err();
        assert_eq!(message(err), "Refresh token required");
    }
}
