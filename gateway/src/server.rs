//! Gateway server implementation
//!
//! Main entry point for running the Quick Bite Gateway.

use std::sync::Arc;

use quickbite_core::{CoreError, TableOps};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tokio::net::TcpListener;

use crate::bootstrap;
use crate::config::GatewayConfig;
use crate::error::{from_core, ApiError, GatewayError};
use crate::nlq::GeminiClient;
use crate::router::create_router;

/// Shared state for the gateway
pub struct GatewayState {
    pub ops: TableOps,
    pub pool: MySqlPool,
    pub sql_generator: Option<GeminiClient>,
    pub config: GatewayConfig,
}

impl GatewayState {
    /// Map a core error for the wire, honoring the error-detail policy.
    pub fn api_error(&self, err: CoreError) -> ApiError {
        from_core(err, self.config.expose_errors)
    }

    pub fn store_error(&self, err: sqlx::Error) -> ApiError {
        self.api_error(CoreError::Store(err))
    }
}

/// The Quick Bite Gateway server
pub struct Gateway {
    config: GatewayConfig,
    state: Option<Arc<GatewayState>>,
}

impl Gateway {
    /// Create a new gateway with the given configuration
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create a gateway builder
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::default()
    }

    /// Initialize the gateway (connect the pool, bootstrap the schema)
    pub async fn init(&mut self) -> Result<(), GatewayError> {
        tracing::info!("Initializing Quick Bite Gateway...");

        tracing::info!("Creating connection pool (max {})", self.config.max_connections);
        let pool = MySqlPoolOptions::new()
            .max_connections(self.config.max_connections)
            .connect(&self.config.database_url)
            .await
            .map_err(|e| GatewayError::Database(e.to_string()))?;

        if self.config.bootstrap {
            bootstrap::initialize(&pool)
                .await
                .map_err(|e| GatewayError::Database(e.to_string()))?;
        }

        let sql_generator = self
            .config
            .gemini_api_key
            .as_ref()
            .map(|key| GeminiClient::new(key, &self.config.gemini_model));
        if sql_generator.is_none() {
            tracing::info!("No model API key configured; natural-language queries disabled");
        }

        self.state = Some(Arc::new(GatewayState {
            ops: TableOps::new(pool.clone()),
            pool,
            sql_generator,
            config: self.config.clone(),
        }));

        tracing::info!("Gateway initialized");
        Ok(())
    }

    /// Start serving requests
    ///
    /// # Errors
    /// Returns error if server fails to start
    pub async fn serve(&self) -> Result<(), GatewayError> {
        let state = self.state.as_ref().ok_or_else(|| {
            GatewayError::Config("Gateway not initialized. Call init() first.".to_string())
        })?;

        let router = create_router(Arc::clone(state));

        let addr = &self.config.bind_address;
        tracing::info!("🚀 Quick Bite Gateway starting on {}", addr);
        tracing::info!("   GET  /api/get-data      - Fetch a table");
        tracing::info!("   GET  /api/search-data   - Search a table");
        tracing::info!("   POST /api/signup        - Register a customer");
        tracing::info!("   POST /api/login         - Admin login");
        tracing::info!("   GET  /health            - Health check");

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Config(format!("Failed to bind to {}: {}", addr, e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| GatewayError::Internal(e.into()))?;

        Ok(())
    }
}

/// Builder for the Gateway
#[derive(Debug, Default)]
pub struct GatewayBuilder {
    config: GatewayConfig,
}

impl GatewayBuilder {
    /// Set the database URL
    pub fn database(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = url.into();
        self
    }

    /// Set the bind address
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.config.bind_address = addr.into();
        self
    }

    /// Set the token signing secret
    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.jwt_secret = secret.into();
        self
    }

    /// Set the pool capacity
    pub fn max_connections(mut self, max: u32) -> Self {
        self.config.max_connections = max;
        self
    }

    /// Serve static UI files from a directory
    pub fn static_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.static_dir = Some(dir.into());
        self
    }

    /// Enable natural-language queries via the generative model API
    pub fn gemini(mut self, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        self.config.gemini_api_key = Some(api_key.into());
        self.config.gemini_model = model.into();
        self
    }

    /// Include store error details in 500 bodies
    pub fn expose_errors(mut self, expose: bool) -> Self {
        self.config.expose_errors = expose;
        self
    }

    /// Recreate and reseed the schema at startup
    pub fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.config.bootstrap = bootstrap;
        self
    }

    /// Build the gateway
    pub fn build(self) -> Gateway {
        Gateway::new(self.config)
    }

    /// Build and initialize the gateway
    ///
    /// # Errors
    /// Returns error if initialization fails
    pub async fn build_and_init(self) -> Result<Gateway, GatewayError> {
        let mut gateway = self.build();
        gateway.init().await?;
        Ok(gateway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_threads_config_through() {
        let gateway = Gateway::builder()
            .database("mysql://db/food")
            .bind("127.0.0.1:0")
            .jwt_secret("s")
            .max_connections(3)
            .bootstrap(true)
            .build();
        assert_eq!(gateway.config.database_url, "mysql://db/food");
        assert_eq!(gateway.config.max_connections, 3);
        assert!(gateway.config.bootstrap);
        assert!(gateway.state.is_none());
    }
}
