use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;

use crate::api::config::ApiConfig;
use crate::api::endpoint::ApiEndpoint;
use crate::storage::ConfigStore;

pub struct ApiStateBuilder<MandatoryFields = ConfigStore> {
    config: ApiConfig,
    mandatory_fields: MandatoryFields,
}

impl ApiStateBuilder {
    pub fn build(self) -> ApiState {
        ApiState {
            inner: Arc::new(Inner {
                config: self.config,
                config_store: self.mandatory_fields,
            }),
        }
    }
}

impl ApiStateBuilder<()> {
    pub fn with_config_store(self, config_store: ConfigStore) -> ApiStateBuilder<ConfigStore> {
        ApiStateBuilder {
            config: self.config,
            mandatory_fields: config_store,
        }
    }
}

impl<T> ApiStateBuilder<T> {
    pub fn with_config(self, config: ApiConfig) -> ApiStateBuilder<T> {
        ApiStateBuilder { config, ..self }
    }
}

/// Shared, read-only state of the HTTP service.
#[derive(Clone)]
#[repr(transparent)]
pub struct ApiState {
    inner: Arc<Inner>,
}

impl ApiState {
    pub fn builder() -> ApiStateBuilder<()> {
        ApiStateBuilder {
            config: ApiConfig::default(),
            mandatory_fields: (),
        }
    }

    pub async fn bind_socket(&self) -> std::io::Result<TcpListener> {
        TcpListener::bind(self.config().listen_addr).await
    }

    pub async fn bind_endpoint(&self) -> Result<ApiEndpoint> {
        ApiEndpoint::builder().bind(self.clone()).await
    }

    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.inner.config_store
    }
}

struct Inner {
    config: ApiConfig,
    config_store: ConfigStore,
}
