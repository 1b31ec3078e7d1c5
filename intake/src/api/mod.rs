use crate::api::state::ApiState;
use crate::config::AppConfig;
use crate::storage::ConfigStore;

pub mod config;
pub mod controllers;
pub mod endpoint;
pub mod error;
pub mod models;
pub mod state;

pub async fn http_service(config: AppConfig) -> anyhow::Result<()> {
    let config_store = ConfigStore::new(&config.storage);

    tracing::info!(
        listen_addr = %config.api.listen_addr,
        storage_dir = %config_store.dir().display(),
        "API server starting..."
    );

    let state = ApiState::builder()
        .with_config(config.api)
        .with_config_store(config_store)
        .build();

    let endpoint = state.bind_endpoint().await?;

    tokio::task::spawn(async move {
        if let Err(e) = endpoint.serve().await {
            tracing::error!("API server failed: {e:?}");
        }
        tracing::info!("API server stopped");
    });

    Ok(())
}
