//! HTTP request handlers.
//!
//! The table-generic endpoints delegate to the core crate; account and
//! auth endpoints talk to the store directly. Every failure path maps
//! into the structured [`ApiError`] body.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sqlx::Row;

use crate::auth::{
    bearer_token, hash_password, is_valid_email, issue_token, validate_password, validate_token,
    verify_password, JwtClaims,
};
use crate::error::ApiError;
use crate::server::GatewayState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub pool_active: usize,
    pub pool_idle: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: i64,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AddDataResponse {
    pub success: bool,
    pub id: i64,
}

/// Natural-language query response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub original_query: String,
    pub sql_query: String,
    pub results: Vec<Value>,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct GetDataParams {
    pub table: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub table: Option<String>,
    pub term: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordParams {
    pub table: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub table: Option<String>,
    pub id: Option<Value>,
    pub data: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub table: Option<String>,
    pub id: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub table: Option<String>,
    pub data: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "phoneNo")]
    pub phone_no: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminSignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateQueryRequest {
    pub prompt: Option<String>,
}

/// Record ids arrive as JSON numbers or strings depending on the client.
fn parse_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_duplicate_entry(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub async fn health_check(State(state): State<Arc<GatewayState>>) -> Json<HealthResponse> {
    let size = state.pool.size() as usize;
    let idle = state.pool.num_idle();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        pool_active: size.saturating_sub(idle),
        pool_idle: idle,
    })
}

// ---------------------------------------------------------------------------
// Generic table operations
// ---------------------------------------------------------------------------

pub async fn get_data(
    State(state): State<Arc<GatewayState>>,
    Query(params): Query<GetDataParams>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let table = params
        .table
        .ok_or_else(|| ApiError::invalid_input("Table name is required"))?;

    let rows = state
        .ops
        .fetch_all(&table)
        .await
        .map_err(|e| state.api_error(e))?;
    tracing::info!(table = %table, rows = rows.len(), "fetched table data");
    Ok(Json(rows))
}

pub async fn search_data(
    State(state): State<Arc<GatewayState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let (table, term) = match (params.table, params.term) {
        (Some(table), Some(term)) => (table, term),
        _ => {
            return Err(ApiError::invalid_input(
                "Table name and search term are required",
            ))
        }
    };

    let rows = state
        .ops
        .search(&table, &term)
        .await
        .map_err(|e| state.api_error(e))?;
    Ok(Json(rows))
}

pub async fn get_record(
    State(state): State<Arc<GatewayState>>,
    Query(params): Query<RecordParams>,
) -> Result<Json<Value>, ApiError> {
    let (table, id) = match (params.table, params.id) {
        (Some(table), Some(id)) => (table, id),
        _ => {
            return Err(ApiError::invalid_input(
                "Table name and record ID are required",
            ))
        }
    };
    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| ApiError::invalid_input("Invalid record ID"))?;

    let row = state
        .ops
        .fetch_one(&table, id)
        .await
        .map_err(|e| state.api_error(e))?;
    Ok(Json(row))
}

pub async fn update_data(
    State(state): State<Arc<GatewayState>>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let (table, id, data) = match (req.table, req.id, req.data) {
        (Some(table), Some(id), Some(data)) => (table, id, data),
        _ => {
            return Err(ApiError::invalid_input(
                "Table name, record ID, and data are required",
            ))
        }
    };
    let id = parse_id(&id).ok_or_else(|| ApiError::invalid_input("Invalid record ID"))?;

    state
        .ops
        .update(&table, id, &data)
        .await
        .map_err(|e| state.api_error(e))?;
    Ok(Json(SuccessResponse {
        success: true,
        message: "Record updated successfully".to_string(),
    }))
}

pub async fn delete_data(
    State(state): State<Arc<GatewayState>>,
    Json(req): Json<DeleteRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let (table, id) = match (req.table, req.id) {
        (Some(table), Some(id)) => (table, id),
        _ => {
            return Err(ApiError::invalid_input(
                "Table name and record ID are required",
            ))
        }
    };
    let id = parse_id(&id).ok_or_else(|| ApiError::invalid_input("Invalid record ID"))?;

    state
        .ops
        .delete(&table, id)
        .await
        .map_err(|e| state.api_error(e))?;
    Ok(Json(SuccessResponse {
        success: true,
        message: "Record deleted successfully".to_string(),
    }))
}

pub async fn add_data(
    State(state): State<Arc<GatewayState>>,
    Json(req): Json<AddRequest>,
) -> Result<Json<AddDataResponse>, ApiError> {
    let (table, data) = match (req.table, req.data) {
        (Some(table), Some(data)) => (table, data),
        _ => return Err(ApiError::invalid_input("Table and data are required")),
    };

    let id = state
        .ops
        .insert(&table, &data)
        .await
        .map_err(|e| state.api_error(e))?;
    Ok(Json(AddDataResponse { success: true, id }))
}

// ---------------------------------------------------------------------------
// Accounts & sessions
// ---------------------------------------------------------------------------

/// Admin credential check; serves both /api/login and /api/admin/login.
pub async fn login(
    State(state): State<Arc<GatewayState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (email, password) = match (req.email, req.password) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(ApiError::invalid_input("Email and password are required")),
    };

    let row = sqlx::query("SELECT AdminID, Name, PasswordHash FROM AdminUsers WHERE Email = ?")
        .bind(&email)
        .fetch_optional(&state.pool)
        .await
        .map_err(|e| state.store_error(e))?;

    // Unknown email and wrong password answer identically.
    let Some(row) = row else {
        return Err(ApiError::unauthorized("Invalid credentials"));
    };
    let hash: String = row.try_get("PasswordHash").map_err(|e| state.store_error(e))?;
    if !verify_password(&password, &hash) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let id: i64 = row.try_get("AdminID").map_err(|e| state.store_error(e))?;
    let name: String = row.try_get("Name").map_err(|e| state.store_error(e))?;
    let token = issue_token(&state.config.jwt_secret, id, &email, "admin")
        .map_err(|e| ApiError::internal(format!("token signing failed: {e}")))?;

    tracing::info!(admin = id, "admin logged in");
    Ok(Json(AuthResponse {
        token,
        user_id: id,
        user_name: name,
        message: Some("Login successful".to_string()),
    }))
}

pub async fn signup(
    State(state): State<Arc<GatewayState>>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (email, name, password, phone_no, address) =
        match (req.email, req.name, req.password, req.phone_no, req.address) {
            (Some(e), Some(n), Some(p), Some(ph), Some(a)) => (e, n, p, ph, a),
            _ => return Err(ApiError::invalid_input("All fields are required")),
        };

    if !is_valid_email(&email) {
        return Err(ApiError::invalid_input("Invalid email format"));
    }
    let violations = validate_password(&password);
    if !violations.is_empty() {
        return Err(
            ApiError::invalid_input("Password validation failed").with_details(json!(violations))
        );
    }

    let existing = sqlx::query("SELECT CustomerID FROM Customers WHERE Email = ?")
        .bind(&email)
        .fetch_optional(&state.pool)
        .await
        .map_err(|e| state.store_error(e))?;
    if existing.is_some() {
        return Err(ApiError::invalid_input("Email already registered"));
    }

    let hashed = hash_password(&password)
        .map_err(|e| ApiError::internal(format!("password hashing failed: {e}")))?;

    // Customer ids are application-assigned; same MAX+1 race as the
    // generic insert path.
    let mut conn = state.pool.acquire().await.map_err(|e| state.store_error(e))?;
    let max: Option<i64> = sqlx::query_scalar("SELECT MAX(CustomerID) FROM Customers")
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| state.store_error(e))?;
    let id = max.unwrap_or(0) + 1;

    let result = sqlx::query(
        "INSERT INTO Customers (CustomerID, Name, Email, PhoneNo, Address, PasswordHash) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&name)
    .bind(&email)
    .bind(&phone_no)
    .bind(&address)
    .bind(&hashed)
    .execute(&mut *conn)
    .await;

    if let Err(e) = result {
        if is_duplicate_entry(&e) {
            return Err(ApiError::invalid_input("Email already registered"));
        }
        return Err(state.store_error(e));
    }

    let token = issue_token(&state.config.jwt_secret, id, &email, "customer")
        .map_err(|e| ApiError::internal(format!("token signing failed: {e}")))?;

    tracing::info!(customer = id, "customer registered");
    Ok(Json(AuthResponse {
        token,
        user_id: id,
        user_name: name,
        message: Some("Registration successful".to_string()),
    }))
}

pub async fn admin_signup(
    State(state): State<Arc<GatewayState>>,
    Json(req): Json<AdminSignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (email, password, name) = match (req.email, req.password, req.name) {
        (Some(e), Some(p), Some(n)) => (e, p, n),
        _ => return Err(ApiError::invalid_input("All fields are required")),
    };

    if !is_valid_email(&email) {
        return Err(ApiError::invalid_input("Invalid email format"));
    }
    let violations = validate_password(&password);
    if !violations.is_empty() {
        return Err(
            ApiError::invalid_input("Password validation failed").with_details(json!(violations))
        );
    }

    let existing = sqlx::query("SELECT AdminID FROM AdminUsers WHERE Email = ?")
        .bind(&email)
        .fetch_optional(&state.pool)
        .await
        .map_err(|e| state.store_error(e))?;
    if existing.is_some() {
        return Err(ApiError::invalid_input("Email already registered"));
    }

    let hashed = hash_password(&password)
        .map_err(|e| ApiError::internal(format!("password hashing failed: {e}")))?;

    let mut conn = state.pool.acquire().await.map_err(|e| state.store_error(e))?;
    let max: Option<i64> = sqlx::query_scalar("SELECT MAX(AdminID) FROM AdminUsers")
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| state.store_error(e))?;
    let id = max.unwrap_or(0) + 1;

    let result = sqlx::query(
        "INSERT INTO AdminUsers (AdminID, Name, Email, PasswordHash) VALUES (?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&name)
    .bind(&email)
    .bind(&hashed)
    .execute(&mut *conn)
    .await;

    if let Err(e) = result {
        if is_duplicate_entry(&e) {
            return Err(ApiError::invalid_input("Email already registered"));
        }
        return Err(state.store_error(e));
    }

    let token = issue_token(&state.config.jwt_secret, id, &email, "admin")
        .map_err(|e| ApiError::internal(format!("token signing failed: {e}")))?;

    tracing::info!(admin = id, "admin registered");
    Ok(Json(AuthResponse {
        token,
        user_id: id,
        user_name: name,
        message: Some("Admin registration successful".to_string()),
    }))
}

/// Token scheme is stateless; logout is an acknowledgement.
pub async fn logout() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        success: true,
        message: "Logged out successfully".to_string(),
    })
}

/// Inspects the bearer token itself so it can answer
/// `{authenticated: false}` instead of the generic 401 body.
pub async fn check_auth(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
) -> Response {
    fn denied() -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "authenticated": false })),
        )
            .into_response()
    }

    let Some(token) = bearer_token(&headers) else {
        return denied();
    };
    let Ok(claims) = validate_token(&state.config.jwt_secret, token) else {
        return denied();
    };

    let row = sqlx::query("SELECT CustomerID, Name, Email FROM Customers WHERE CustomerID = ?")
        .bind(claims.id)
        .fetch_optional(&state.pool)
        .await;

    match row {
        Ok(Some(row)) => {
            let id: i64 = row.try_get("CustomerID").unwrap_or(claims.id);
            let name: String = row.try_get("Name").unwrap_or_default();
            let email: String = row.try_get("Email").unwrap_or_default();
            Json(json!({
                "authenticated": true,
                "userId": id,
                "userName": name,
                "email": email,
            }))
            .into_response()
        }
        Ok(None) => denied(),
        Err(e) => {
            tracing::error!("auth check failed: {e}");
            denied()
        }
    }
}

// ---------------------------------------------------------------------------
// Natural-language queries
// ---------------------------------------------------------------------------

pub async fn generate_query(
    State(state): State<Arc<GatewayState>>,
    Extension(claims): Extension<JwtClaims>,
    Json(req): Json<GenerateQueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Some(generator) = &state.sql_generator else {
        return Err(ApiError::internal(
            "Natural language queries are not configured",
        ));
    };

    let prompt = req
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::invalid_input("Empty query"))?;

    tracing::info!(user = claims.id, prompt = %prompt, "natural-language query");

    let sql = generator.generate_sql(&prompt).await.map_err(|e| {
        tracing::warn!("SQL generation failed: {e}");
        ApiError::internal("Query execution failed").with_details(e.to_string())
    })?;

    let rows = sqlx::query(&sql)
        .fetch_all(&state.pool)
        .await
        .map_err(|e| {
            tracing::error!("generated query failed: {e}");
            let base = ApiError::internal("Query execution failed");
            if state.config.expose_errors {
                base.with_details(e.to_string())
            } else {
                base
            }
        })?;

    let results: Vec<Value> = rows.iter().map(quickbite_core::row_to_json).collect();
    Ok(Json(QueryResponse {
        original_query: prompt,
        sql_query: sql,
        results,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_parse_from_numbers_and_strings() {
        assert_eq!(parse_id(&json!(7)), Some(7));
        assert_eq!(parse_id(&json!("7")), Some(7));
        assert_eq!(parse_id(&json!(" 12 ")), Some(12));
        assert_eq!(parse_id(&json!(3.5)), None);
        assert_eq!(parse_id(&json!(null)), None);
        assert_eq!(parse_id(&json!({"id": 1})), None);
    }
}
