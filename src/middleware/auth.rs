use crate::error::{Error, Result};
use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

/// Rejects import requests without a valid HS256 bearer token and exposes
/// the caller's [`Claims`] to the handlers.
pub async fn require_bearer_auth(mut req: Request, next: Next) -> Result<Response> {
    let config = crate::config::get_config();
    let claims = decode_claims(bearer_token(req.headers())?, &config.jwt_secret)?;
    tracing::debug!(user = %claims.sub, role = ?claims.role, "Bearer token accepted");
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::Unauthorized("missing bearer token".to_string()))?
        .to_str()
        .map_err(|_| Error::Unauthorized("malformed authorization header".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::Unauthorized("authorization must use the Bearer scheme".to_string()))
}

pub fn decode_claims(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            Error::Unauthorized("invalid or expired token".to_string())
        })
}

/// Fails unless the caller's role is one of `allowed` (case-insensitive).
/// An empty `allowed` list admits nobody.
pub fn require_role<S: AsRef<str>>(claims: &Claims, allowed: &[S]) -> Result<()> {
    let role = claims.role.as_deref().unwrap_or_default();
    if !role.is_empty() && allowed.iter().any(|r| r.as_ref().eq_ignore_ascii_case(role)) {
        return Ok(());
    }
    Err(Error::Forbidden(format!(
        "role '{}' may not import questions",
        role
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Option<&str>) -> Claims {
        Claims {
            sub: "tester".to_string(),
            exp: 0,
            role: role.map(str::to_string),
        }
    }

    fn signed(secret: &str, offset: chrono::Duration) -> String {
        let exp = (chrono::Utc::now() + offset).timestamp() as usize;
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &Claims {
                sub: "tester".to_string(),
                exp,
                role: Some("teacher".to_string()),
            },
            &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn bearer_token_requires_the_bearer_scheme() {
        let mut headers = HeaderMap::new();
        assert!(matches!(bearer_token(&headers), Err(Error::Unauthorized(_))));

        headers.insert(AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(matches!(bearer_token(&headers), Err(Error::Unauthorized(_))));

        headers.insert(AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn tokens_must_be_signed_with_the_secret_and_unexpired() {
        let token = signed("secret", chrono::Duration::hours(1));
        let claims = decode_claims(&token, "secret").unwrap();
        assert_eq!(claims.role.as_deref(), Some("teacher"));

        assert!(matches!(decode_claims(&token, "other"), Err(Error::Unauthorized(_))));
        let expired = signed("secret", -chrono::Duration::hours(1));
        assert!(matches!(decode_claims(&expired, "secret"), Err(Error::Unauthorized(_))));
    }

    #[test]
    fn allowed_roles_match_case_insensitively() {
        assert!(require_role(&claims(Some("Teacher")), &["admin", "teacher"]).is_ok());
    }

    #[test]
    fn other_or_missing_roles_are_forbidden() {
        assert!(matches!(
            require_role(&claims(Some("student")), &["admin", "teacher"]),
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            require_role(&claims(None), &["admin"]),
            Err(Error::Forbidden(_))
        ));
        assert!(require_role::<&str>(&claims(Some("admin")), &[]).is_err());
    }
}
