//! # Quick Bite Gateway
//!
//! Authenticated REST API for the food-delivery management database.
//!
//! ## Architecture
//!
//! ```text
//! Client → JWT gate → handlers → quickbite-core (registry/builders) → MySQL
//!                              → Gemini API (natural-language → SELECT)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use quickbite_gateway::Gateway;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let gateway = Gateway::builder()
//!         .database("mysql://root@localhost/food_delivery_service")
//!         .bind("0.0.0.0:3001")
//!         .jwt_secret(std::env::var("JWT_SECRET")?)
//!         .build_and_init()
//!         .await?;
//!
//!     gateway.serve().await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handler;
pub mod nlq;
pub mod router;
pub mod server;

pub use config::GatewayConfig;
pub use error::{ApiError, GatewayError};
pub use server::{Gateway, GatewayState};
