use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
    model::{CompletionParams, ModelProvider, ModelRequest},
    prompt::{docstring_prompt, placeholder_doc},
    python::{self, Declaration},
    types::DocumentationMap,
};

pub const GENERATED_DOCS_FILE: &str = "generated_docs.md";

#[async_trait]
pub trait SourceMaterializer: Send + Sync {
    async fn is_file(&self, path: &Path) -> bool;
    async fn write(&self, path: &Path, content: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FsMaterializer;

#[async_trait]
impl SourceMaterializer for FsMaterializer {
    async fn is_file(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false)
    }

    async fn write(&self, path: &Path, content: &str) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryMaterializer {
    files: Arc<RwLock<BTreeMap<PathBuf, String>>>,
}

impl MemoryMaterializer {
    pub fn with_file(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            files: Arc::new(RwLock::new(BTreeMap::from([(path.into(), content.into())]))),
        }
    }

    pub async fn read(&self, path: &Path) -> Option<String> {
        self.files.read().await.get(path).cloned()
    }

    pub async fn paths(&self) -> Vec<PathBuf> {
        self.files.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl SourceMaterializer for MemoryMaterializer {
    async fn is_file(&self, path: &Path) -> bool {
        self.files.read().await.contains_key(path)
    }

    async fn write(&self, path: &Path, content: &str) -> anyhow::Result<()> {
        self.files
            .write()
            .await
            .insert(path.to_path_buf(), content.to_owned());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedDoc {
    pub declaration: Declaration,
    pub doc: String,
}

/// Asks the model for one docstring per declaration, in order. The first
/// failed call aborts the whole run.
pub async fn generate_docs(
    model: &dyn ModelProvider,
    code: &str,
    declarations: Vec<Declaration>,
) -> anyhow::Result<Vec<GeneratedDoc>> {
    let mut generated = Vec::with_capacity(declarations.len());

    for declaration in declarations {
        let doc = match declaration.source(code) {
            Some(source) => {
                let prompt = docstring_prompt(declaration.kind.label(), source);
                model
                    .complete(ModelRequest::new(prompt, CompletionParams::docstring()))
                    .await?
            }
            None => {
                debug!(name = %declaration.name, "no source slice; using placeholder");
                placeholder_doc(&declaration.name)
            }
        };

        generated.push(GeneratedDoc { declaration, doc });
    }

    Ok(generated)
}

/// A repeated name keeps its first position and takes the latest text.
pub fn docstring_map(docs: &[GeneratedDoc]) -> DocumentationMap {
    let mut map = DocumentationMap::new();
    for entry in docs {
        map.insert(
            entry.declaration.name.clone(),
            Value::String(entry.doc.clone()),
        );
    }
    map
}

pub fn render_markdown(docs: &[GeneratedDoc]) -> String {
    docs.iter()
        .map(|entry| format!("### {}\n\n{}\n", entry.declaration.name, entry.doc))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn rewrite_source(code: &str, docs: &[GeneratedDoc]) -> String {
    python::insert_docstrings(
        code,
        docs.iter()
            .map(|entry| (&entry.declaration, entry.doc.as_str())),
    )
}

/// Persists the markdown and, when `filepath` names an existing file, the
/// rewritten source. Failures are logged and otherwise ignored.
pub async fn materialize(
    materializer: &dyn SourceMaterializer,
    docs_dir: &Path,
    markdown: &str,
    filepath: Option<&str>,
    code: &str,
    docs: &[GeneratedDoc],
) {
    let docs_path = docs_dir.join(GENERATED_DOCS_FILE);
    match materializer.write(&docs_path, markdown).await {
        Ok(()) => info!(path = %docs_path.display(), "wrote generated docs"),
        Err(error) => warn!(?error, path = %docs_path.display(), "failed to write generated docs"),
    }

    let Some(filepath) = filepath.filter(|path| !path.is_empty()) else {
        return;
    };
    let target = Path::new(filepath);
    if !materializer.is_file(target).await {
        debug!(path = %target.display(), "filepath is not an existing file; skipping rewrite");
        return;
    }

    let rewritten = rewrite_source(code, docs);
    match materializer.write(target, &rewritten).await {
        Ok(()) => info!(path = %target.display(), "rewrote source with docstrings"),
        Err(error) => warn!(?error, path = %target.display(), "failed to rewrite source"),
    }
}
