use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use seoscope_core::{Analyzer, AnalyzerConfig};
use tracing_subscriber::EnvFilter;

mod routes;

use routes::{AppState, router};

const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Server settings read from `SEOSCOPE_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
struct ServerConfig {
    bind: String,
    reference: Option<PathBuf>,
    model_dir: Option<PathBuf>,
    vectorizer: Option<PathBuf>,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            bind: non_empty("SEOSCOPE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            reference: non_empty("SEOSCOPE_REFERENCE").map(PathBuf::from),
            model_dir: non_empty("SEOSCOPE_MODEL_DIR").map(PathBuf::from),
            vectorizer: non_empty("SEOSCOPE_VECTORIZER").map(PathBuf::from),
        }
    }

    fn analyzer_config(&self) -> AnalyzerConfig {
        let mut builder = AnalyzerConfig::builder();
        if let Some(dir) = &self.model_dir {
            builder = builder.model_dir(dir);
        }
        if let Some(path) = &self.reference {
            builder = builder.reference_path(path);
        }
        if let Some(path) = &self.vectorizer {
            builder = builder.vectorizer_path(path);
        }
        builder.build()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig::from_env();
    let analyzer = Analyzer::new(config.analyzer_config()).context("Failed to load analysis artifacts")?;

    tracing::info!(
        trained = analyzer.classifier().is_trained(),
        reference = %analyzer.config().reference_path.display(),
        "analyzer loaded"
    );

    let app = router(AppState { analyzer: Arc::new(analyzer) });

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    tracing::info!(bind = %config.bind, "seoscope server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
