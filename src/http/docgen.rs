use std::{path::PathBuf, sync::Arc};

use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{MANIFEST_ROUTE, ValidatedJson, health};
use crate::{
    docgen::{self, SourceMaterializer},
    error::AppError,
    model::ModelProvider,
    python,
    types::{CodePayload, GenerateDocReply},
};

#[derive(Clone)]
pub struct DocgenState {
    pub model: Option<Arc<dyn ModelProvider>>,
    pub materializer: Arc<dyn SourceMaterializer>,
    pub docs_dir: PathBuf,
    pub manifest_path: PathBuf,
}

pub fn router(state: DocgenState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/mcp/generate-doc", post(generate_doc))
        .route(MANIFEST_ROUTE, get(manifest))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn generate_doc(
    State(state): State<DocgenState>,
    payload: Result<ValidatedJson<CodePayload>, AppError>,
) -> Result<Json<GenerateDocReply>, AppError> {
    let model = state.model.as_ref().ok_or_else(|| {
        AppError::ConfigurationMissing("Missing OPENAI_API_KEY in environment.".to_owned())
    })?;
    let ValidatedJson(payload) = payload?;

    let declarations = python::parse_declarations(&payload.code)?;
    info!(declarations = declarations.len(), "generating documentation");

    let docs = docgen::generate_docs(model.as_ref(), &payload.code, declarations)
        .await
        .map_err(AppError::upstream)?;

    let markdown = docgen::render_markdown(&docs);
    docgen::materialize(
        state.materializer.as_ref(),
        &state.docs_dir,
        &markdown,
        payload.filepath.as_deref(),
        &payload.code,
        &docs,
    )
    .await;

    Ok(Json(GenerateDocReply {
        status: "success".to_owned(),
        docstrings: docgen::docstring_map(&docs),
        markdown,
    }))
}

async fn manifest(State(state): State<DocgenState>) -> Result<impl IntoResponse, AppError> {
    let body = tokio::fs::read(&state.manifest_path).await.map_err(|error| {
        AppError::NotFound(format!(
            "Manifest {} unavailable: {error}",
            state.manifest_path.display()
        ))
    })?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}
