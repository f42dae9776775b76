//! Gateway configuration

/// Main gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// MySQL connection URL
    pub database_url: String,

    /// Server bind address
    pub bind_address: String,

    /// HS256 signing secret for session tokens
    pub jwt_secret: String,

    /// Connection pool capacity
    pub max_connections: u32,

    /// Directory of static UI files to serve (optional)
    pub static_dir: Option<String>,

    /// Generative model API key; natural-language queries are disabled
    /// without it
    pub gemini_api_key: Option<String>,

    /// Generative model name
    pub gemini_model: String,

    /// Include store error details in 500 bodies (non-production)
    pub expose_errors: bool,

    /// Recreate and reseed the schema at startup
    pub bootstrap: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            database_url: "mysql://root@localhost/food_delivery_service".to_string(),
            bind_address: "0.0.0.0:3001".to_string(),
            jwt_secret: "quick-bite-secret-key-2024".to_string(),
            max_connections: 10,
            static_dir: None,
            gemini_api_key: None,
            gemini_model: "gemini-1.5-pro".to_string(),
            expose_errors: false,
            bootstrap: false,
        }
    }
}

impl GatewayConfig {
    /// Create a new configuration builder
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }
}

/// Builder for GatewayConfig
#[derive(Debug, Default)]
pub struct GatewayConfigBuilder {
    config: GatewayConfig,
}

impl GatewayConfigBuilder {
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

    /// Build the configuration
    pub fn build(self) -> GatewayConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = GatewayConfig::builder()
            .database("mysql://db/food")
            .bind("127.0.0.1:9000")
            .jwt_secret("s3cret")
            .max_connections(5)
            .expose_errors(true)
            .build();

        assert_eq!(config.database_url, "mysql://db/food");
        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.max_connections, 5);
        assert!(config.expose_errors);
        assert!(!config.bootstrap);
        assert!(config.gemini_api_key.is_none());
    }
}
