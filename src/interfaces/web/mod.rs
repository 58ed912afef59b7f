pub(crate) mod auth;
pub(crate) mod error;
pub(crate) mod extract;
mod handlers;
pub(crate) mod router;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::core::store::Database;
use crate::core::suggest::SuggestionPipeline;

pub struct ApiServer {
    db: Arc<Database>,
    pipeline: Option<Arc<SuggestionPipeline>>,
    api_host: String,
    api_port: u16,
}

pub struct ApiServerConfig {
    pub db: Arc<Database>,
    pub pipeline: Option<Arc<SuggestionPipeline>>,
    pub api_host: String,
    pub api_port: u16,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) db: Arc<Database>,
    pub(crate) pipeline: Option<Arc<SuggestionPipeline>>,
    pub(crate) api_port: u16,
}

impl ApiServer {
    pub fn new(config: ApiServerConfig) -> Self {
        Self {
            db: config.db,
            pipeline: config.pipeline,
            api_host: config.api_host,
            api_port: config.api_port,
        }
    }

    /// Bind and serve until the process receives Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.api_host, self.api_port);
        let state = AppState {
            db: self.db,
            pipeline: self.pipeline,
            api_port: self.api_port,
        };
        let app = router::build_api_router(state);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("binding API server to {addr}"))?;
        info!("API Server running at http://{addr}");
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("API Server shutting down...");
            })
            .await?;
        Ok(())
    }
}
