//! Run the Quick Bite Gateway.
//!
//! ```bash
//! DATABASE_URL=mysql://root@localhost/food_delivery_service quickbite-gateway --bootstrap
//! ```

use clap::Parser;
use quickbite_gateway::Gateway;

#[derive(Debug, Parser)]
#[command(name = "quickbite-gateway", about = "REST API for the Quick Bite food delivery service")]
struct Args {
    /// MySQL connection URL
    #[arg(long, env = "DATABASE_URL", default_value = "mysql://root@localhost/food_delivery_service")]
    database_url: String,

    /// Address to listen on
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0:3001")]
    bind_address: String,

    /// HS256 signing secret for session tokens
    #[arg(long, env = "JWT_SECRET", default_value = "quick-bite-secret-key-2024", hide_env_values = true)]
    jwt_secret: String,

    /// Connection pool capacity
    #[arg(long, env = "MAX_CONNECTIONS", default_value_t = 10)]
    max_connections: u32,

    /// Directory of static UI files to serve
    #[arg(long, env = "STATIC_DIR")]
    static_dir: Option<String>,

    /// Generative model API key (natural-language queries stay disabled
    /// without it)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Generative model name
    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-1.5-pro")]
    gemini_model: String,

    /// Drop, recreate, and reseed the schema at startup
    #[arg(long, env = "BOOTSTRAP_DB")]
    bootstrap: bool,

    /// Include store error details in 500 bodies (development only)
    #[arg(long, env = "EXPOSE_ERRORS")]
    expose_errors: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quickbite_gateway=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let args = Args::parse();

    tracing::info!("Starting Quick Bite Gateway...");
    tracing::info!("  Database: {}", args.database_url);
    tracing::info!("  Bind: {}", args.bind_address);
    if let Some(ref dir) = args.static_dir {
        tracing::info!("  Static files: {}", dir);
    }

    let mut builder = Gateway::builder()
        .database(&args.database_url)
        .bind(&args.bind_address)
        .jwt_secret(&args.jwt_secret)
        .max_connections(args.max_connections)
        .bootstrap(args.bootstrap)
        .expose_errors(args.expose_errors);

    if let Some(ref dir) = args.static_dir {
        builder = builder.static_dir(dir);
    }
    if let Some(ref key) = args.gemini_api_key {
        builder = builder.gemini(key, &args.gemini_model);
    }

    let gateway = builder.build_and_init().await?;

    gateway.serve().await?;

    Ok(())
}
