use std::{env, net::SocketAddr, path::PathBuf};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_bind: SocketAddr,
    pub blog_inspector_token: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub docs_dir: PathBuf,
    pub manifest_path: PathBuf,
}

impl AppConfig {
    pub fn from_env(default_port: u16) -> anyhow::Result<Self> {
        let port = env::var("PORT").unwrap_or_else(|_| default_port.to_string());
        let http_bind = env::var("HTTP_BIND").unwrap_or_else(|_| format!("0.0.0.0:{port}"));
        let http_bind = http_bind.parse()?;

        Ok(Self {
            http_bind,
            blog_inspector_token: env_non_empty("BLOG_INSPECTOR_TOKEN"),
            openai_api_key: env_non_empty("OPENAI_API_KEY"),
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_owned()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_owned()),
            docs_dir: env::var("DOCS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("docs")),
            manifest_path: env::var("MANIFEST_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("manifest.json")),
        })
    }
}

// Blank values count as unset.
fn env_non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();
}
