use std::time::Duration;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};

use crate::auth::claims::Claims;
use crate::config::JwtConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Token rejection reasons. All of them map to 401, but the client-facing
/// message distinguishes a missing header from a malformed one and an expired
/// token from a forged one.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("authorization header is missing")]
    MissingHeader,
    #[error("invalid authorization header format")]
    MalformedHeader,
    #[error("token has expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

/// Signing and verification keys derived once from the process-wide secret.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            ttl: Duration::from_secs((ttl_minutes as u64) * 60),
        }
    }
}

impl JwtKeys {
    /// Issue a token bound to a user id and email, expiring after the
    /// configured ttl (one hour by default).
    pub fn sign(&self, user_id: i64, email: &str) -> Result<String, ApiError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: user_id,
            email: email.to_string(),
            exp: exp.unix_timestamp(),
        };
        let token =
            encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(ApiError::Signing)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    /// Validate signature, algorithm and expiry, returning the typed claims.
    /// Only HS256 is accepted; expiry is checked with zero leeway.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;
        debug!(user_id = data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

/// Pull the raw token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(parts: &Parts) -> Result<&str, TokenError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(TokenError::MissingHeader)?;
    let value = header.to_str().map_err(|_| TokenError::MalformedHeader)?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or(TokenError::MalformedHeader)?;
    if token.is_empty() {
        return Err(TokenError::MalformedHeader);
    }
    Ok(token)
}

/// Extracts and validates the bearer token, rejecting the request before the
/// handler body runs. Carries the verified claims.
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let token = bearer_token(parts)?;
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "token rejected");
            e
        })?;
        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: "expense-tracker".into(),
            ttl: Duration::from_secs(3600),
        }
    }

    fn encode_raw(keys: &JwtKeys, claims: &Claims, alg: Algorithm) -> String {
        encode(&Header::new(alg), claims, &keys.encoding).expect("encode")
    }

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/expenses");
        if let Some(v) = value {
            builder = builder.header(axum::http::header::AUTHORIZATION, v);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let keys = make_keys("dev-secret");
        let token = keys.sign(42, "a@example.com").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.iss, "expense-tracker");
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let keys = make_keys("dev-secret");
        let other = make_keys("other-secret");
        let token = keys.sign(1, "a@example.com").expect("sign");
        assert_eq!(other.verify(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = make_keys("dev-secret");
        assert_eq!(
            keys.verify("not.a.token").unwrap_err(),
            TokenError::Invalid
        );
    }

    #[test]
    fn verify_rejects_non_hs256_algorithm() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            iss: "expense-tracker".into(),
            sub: 1,
            email: "a@example.com".into(),
            exp: now + 3600,
        };
        let token = encode_raw(&keys, &claims, Algorithm::HS384);
        assert_eq!(keys.verify(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn verify_accepts_token_before_expiry_and_rejects_after() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp();

        // 59 minutes into a 1-hour lifetime: one minute of validity left.
        let fresh = Claims {
            iss: "expense-tracker".into(),
            sub: 7,
            email: "a@example.com".into(),
            exp: now + 60,
        };
        let token = encode_raw(&keys, &fresh, Algorithm::HS256);
        assert!(keys.verify(&token).is_ok());

        // 61 minutes in: one minute past expiry.
        let stale = Claims {
            exp: now - 60,
            ..fresh
        };
        let token = encode_raw(&keys, &stale, Algorithm::HS256);
        assert_eq!(keys.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn verify_rejects_wrong_issuer() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            iss: "someone-else".into(),
            sub: 1,
            email: "a@example.com".into(),
            exp: now + 3600,
        };
        let token = encode_raw(&keys, &claims, Algorithm::HS256);
        assert_eq!(keys.verify(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn bearer_token_requires_exact_scheme() {
        let parts = parts_with_header(None);
        assert_eq!(
            bearer_token(&parts).unwrap_err(),
            TokenError::MissingHeader
        );

        let parts = parts_with_header(Some("Basic abc"));
        assert_eq!(
            bearer_token(&parts).unwrap_err(),
            TokenError::MalformedHeader
        );

        let parts = parts_with_header(Some("Bearer "));
        assert_eq!(
            bearer_token(&parts).unwrap_err(),
            TokenError::MalformedHeader
        );

        let parts = parts_with_header(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).unwrap(), "abc.def.ghi");
    }
}
