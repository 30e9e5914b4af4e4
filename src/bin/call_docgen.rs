// Usage: call-docgen [payload.json] [url]

use std::env;

use anyhow::Context;
use bacon_mcp::types::CodePayload;

const DEFAULT_PAYLOAD: &str = "demos/test_payload.json";
const DEFAULT_URL: &str = "http://localhost:8080/mcp/generate-doc";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = env::args().skip(1);
    let payload_path = args.next().unwrap_or_else(|| DEFAULT_PAYLOAD.to_owned());
    let url = args
        .next()
        .or_else(|| env::var("DOCGEN_URL").ok())
        .unwrap_or_else(|| DEFAULT_URL.to_owned());

    let raw = tokio::fs::read_to_string(&payload_path)
        .await
        .with_context(|| format!("reading {payload_path}"))?;
    let payload: CodePayload =
        serde_json::from_str(&raw).with_context(|| format!("parsing {payload_path}"))?;

    let body = reqwest::Client::new()
        .post(&url)
        .json(&payload)
        .send()
        .await
        .with_context(|| format!("posting to {url}"))?
        .text()
        .await?;

    println!("{body}");
    Ok(())
}
