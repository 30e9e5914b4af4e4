use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;

#[derive(Debug, Clone, Default)]
pub struct BearerSecret(pub Option<String>);

// A missing secret wins over anything the caller sent.
pub fn authorize(secret: Option<&str>, presented: Option<&str>) -> Result<(), AppError> {
    let Some(secret) = secret else {
        return Err(AppError::ConfigurationMissing(
            "Server missing BLOG_INSPECTOR_TOKEN".to_owned(),
        ));
    };

    match presented {
        Some(token) if token == secret => Ok(()),
        _ => Err(AppError::AuthenticationFailed),
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[derive(Debug, Clone, Copy)]
pub struct BearerAuth;

impl<S> FromRequestParts<S> for BearerAuth
where
    BearerSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let secret = BearerSecret::from_ref(state);
        authorize(secret.0.as_deref(), bearer_token(parts))?;
        Ok(BearerAuth)
    }
}
