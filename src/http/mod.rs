pub mod blog_inspector;
pub mod docgen;

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

pub const MANIFEST_ROUTE: &str = "/.well-known/mcp/manifest.json";

#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| {
                AppError::ValidationFailed(format!(
                    "Invalid request body: {}",
                    rejection.body_text()
                ))
            })?;
        Ok(Self(value))
    }
}

async fn health() -> &'static str {
    "ok"
}
