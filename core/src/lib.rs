//! # Quick Bite Core
//!
//! Generic table operations over the fixed food-delivery schema.
//!
//! ## Architecture
//!
//! ```text
//! logical name → Schema Registry → Query Builder / Cascade / Search → MySQL
//! ```
//!
//! The [`registry`] holds the static manifest of all eight tables
//! (identifiers, key strategy, column types, insert order, cascade
//! steps). [`TableOps`] executes the generic operations against an
//! injected [`sqlx::MySqlPool`]; all SQL identifiers come from the
//! manifest and all caller values travel through bind parameters.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use quickbite_core::TableOps;
//!
//! let pool = sqlx::MySqlPool::connect("mysql://localhost/food_delivery_service").await?;
//! let ops = TableOps::new(pool);
//!
//! let rows = ops.fetch_all("customers").await?;
//! let hits = ops.search("customers", "gmail").await?;
//! ```

pub mod cascade;
pub mod error;
pub mod query;
pub mod registry;
pub mod row;
pub mod search;

pub use error::{CoreError, CoreResult};
pub use query::TableOps;
pub use registry::{resolve, ColumnKind, KeyStrategy, TableSpec, TABLES};
pub use row::row_to_json;
