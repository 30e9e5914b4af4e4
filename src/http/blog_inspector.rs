use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{FromRef, State},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{MANIFEST_ROUTE, ValidatedJson, health};
use crate::{
    auth::{BearerAuth, BearerSecret},
    error::AppError,
    model::{CompletionParams, ModelProvider, ModelRequest},
    prompt::blog_prompt,
    types::{BlogPayload, InspectReply, Manifest},
};

#[derive(Clone)]
pub struct BlogInspectorState {
    pub secret: BearerSecret,
    pub model: Option<Arc<dyn ModelProvider>>,
}

impl FromRef<BlogInspectorState> for BearerSecret {
    fn from_ref(state: &BlogInspectorState) -> Self {
        state.secret.clone()
    }
}

pub fn router(state: BlogInspectorState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/inspect", post(inspect))
        .route(MANIFEST_ROUTE, get(manifest))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn manifest_document() -> Manifest {
    Manifest {
        name: "Bacon Blog Inspector".to_owned(),
        description: "Analyzes blog posts using OpenAI GPT-4 and returns suggestions.".to_owned(),
        endpoints: vec!["/inspect".to_owned()],
    }
}

async fn manifest() -> Json<Manifest> {
    Json(manifest_document())
}

async fn inspect(
    State(state): State<BlogInspectorState>,
    _auth: BearerAuth,
    ValidatedJson(payload): ValidatedJson<BlogPayload>,
) -> Result<Json<InspectReply>, AppError> {
    let model = state
        .model
        .as_ref()
        .ok_or_else(|| AppError::ConfigurationMissing("Missing OPENAI_API_KEY".to_owned()))?;

    info!(title = %payload.title, content_len = payload.content.len(), "inspecting blog post");

    let analysis = model
        .complete(ModelRequest::new(
            blog_prompt(&payload),
            CompletionParams::summary(),
        ))
        .await
        .map_err(AppError::upstream)?;

    Ok(Json(InspectReply { analysis }))
}
