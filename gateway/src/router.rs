//! HTTP router.
//!
//! Every table operation — reads and mutations alike — sits behind the
//! auth gate. Account endpoints and the health check stay public, and
//! the static UI is served as the fallback when a directory is
//! configured.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::auth::require_auth;
use crate::handler::{
    add_data, admin_signup, check_auth, delete_data, generate_query, get_data, get_record,
    health_check, login, logout, search_data, signup, update_data,
};
use crate::server::GatewayState;

/// Create the main router for the gateway
pub fn create_router(state: Arc<GatewayState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Tracing layer for request logging
    let trace = TraceLayer::new_for_http();

    let protected = Router::new()
        .route("/api/get-data", get(get_data))
        .route("/api/search-data", get(search_data))
        .route("/api/get-record", get(get_record))
        .route("/api/update-data", post(update_data))
        .route("/api/delete-data", post(delete_data))
        .route("/api/add-data", post(add_data))
        .route("/api/generate-query", post(generate_query))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_auth,
        ));

    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/api/login", post(login))
        .route("/api/signup", post(signup))
        .route("/api/admin/login", post(login))
        .route("/api/admin/signup", post(admin_signup))
        .route("/api/logout", post(logout))
        .route("/api/check-auth", get(check_auth))
        .merge(protected);

    if let Some(ref dir) = state.config.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router.layer(trace).layer(cors).with_state(state)
}
