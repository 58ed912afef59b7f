use anyhow::Result;
use std::sync::Arc;

use super::parse_api_server_flags;
use crate::core::config::AppConfig;
use crate::core::store::Database;
use crate::core::suggest::SuggestionPipeline;
use crate::core::terminal::{self, print_link, print_status, print_warn};
use crate::interfaces::web::{ApiServer, ApiServerConfig};

pub async fn run_serve(args: &[String], config: AppConfig) -> Result<()> {
    let (api_host, api_port) =
        parse_api_server_flags(args, 2, config.server.host.clone(), config.server.port);

    let db = Arc::new(Database::open(config.database_path()).await?);
    let api_key = config.suggestions.api_key(|k| std::env::var(k).ok());
    let pipeline = SuggestionPipeline::from_config(&config.suggestions, db.clone(), api_key)?
        .map(Arc::new);

    terminal::print_banner();
    print_status("Database", &db.path().display().to_string());
    match &pipeline {
        Some(_) => print_status(
            "Suggestions",
            &format!(
                "{} via {}",
                config.suggestions.model, config.suggestions.base_url
            ),
        ),
        None => print_warn(&format!(
            "Suggestions disabled: set {} to enable /next-tasks",
            config.suggestions.api_key_env
        )),
    }
    print_link("API", &format!("http://{}:{}/api", api_host, api_port));

    ApiServer::new(ApiServerConfig {
        db,
        pipeline,
        api_host,
        api_port,
    })
    .run()
    .await
}
