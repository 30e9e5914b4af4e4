use bacon_mcp::{
    auth::BearerSecret,
    config::{self, AppConfig},
    http::blog_inspector::{self, BlogInspectorState},
    model,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

const DEFAULT_PORT: u16 = 8081;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    config::init_tracing();

    let config = AppConfig::from_env(DEFAULT_PORT)?;

    if config.blog_inspector_token.is_none() {
        warn!("BLOG_INSPECTOR_TOKEN is not set; /inspect will answer 500");
    }

    let app = blog_inspector::router(BlogInspectorState {
        secret: BearerSecret(config.blog_inspector_token.clone()),
        model: model::build_model_provider(&config),
    });
    let listener = TcpListener::bind(config.http_bind).await?;
    info!("Blog inspector listening on {}", config.http_bind);

    axum::serve(listener, app).await?;
    Ok(())
}
