use std::sync::Arc;

use bacon_mcp::{
    config::{self, AppConfig},
    docgen::FsMaterializer,
    http::docgen::{self, DocgenState},
    model,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    config::init_tracing();

    let config = AppConfig::from_env(DEFAULT_PORT)?;

    if !config.manifest_path.is_file() {
        warn!(
            path = %config.manifest_path.display(),
            "manifest file not found; manifest route will answer 404"
        );
    }

    let app = docgen::router(DocgenState {
        model: model::build_model_provider(&config),
        materializer: Arc::new(FsMaterializer),
        docs_dir: config.docs_dir.clone(),
        manifest_path: config.manifest_path.clone(),
    });
    let listener = TcpListener::bind(config.http_bind).await?;
    info!("DocGen agent listening on {}", config.http_bind);

    axum::serve(listener, app).await?;
    Ok(())
}
