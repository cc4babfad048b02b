//! API server.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::ApiError;
use crate::http::routes::create_router;
use crate::state::ApiState;

/// Listen address of the API server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl ApiConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

/// The HTTP control server.
pub struct ApiServer {
    config: ApiConfig,
    state: Arc<ApiState>,
}

impl ApiServer {
    pub fn new(config: ApiConfig, state: Arc<ApiState>) -> Self {
        Self { config, state }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Serve until `shutdown` is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), ApiError> {
        let addr: SocketAddr = self
            .addr()
            .parse()
            .map_err(|_| ApiError::InvalidAddress(self.addr()))?;
        let listener = TcpListener::bind(addr).await.map_err(|source| ApiError::Bind {
            addr: self.addr(),
            source,
        })?;

        info!("API server listening on {}", addr);
        axum::serve(listener, create_router(self.state.clone()))
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(ApiError::Serve)?;

        info!("API server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sniper_orchestrator::OrchestratorHandle;
    use tokio::sync::watch;

    fn server(config: ApiConfig) -> ApiServer {
        let (handle, _rx) = OrchestratorHandle::channel();
        let (_tx, updates) = watch::channel(None);
        ApiServer::new(config, Arc::new(ApiState::new(handle, updates)))
    }

    #[test]
    fn test_api_config_default() {
        let config = ApiConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8787);
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(server(ApiConfig::new("0.0.0.0", 3000)).addr(), "0.0.0.0:3000");
    }

    #[tokio::test]
    async fn test_invalid_address_rejected() {
        let err = server(ApiConfig::new("not a host", 80))
            .run(CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn test_shutdown_stops_server() {
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        server(ApiConfig::new("127.0.0.1", 0))
            .run(shutdown)
            .await
            .unwrap();
    }
}
