//! Generic query builder.
//!
//! [`TableOps`] executes the four registry-driven operations (fetch-all,
//! fetch-one, insert, update) against an injected connection pool. SQL
//! text is produced by pure builder functions over [`TableSpec`] so the
//! construction is testable without a store; every identifier in that
//! text comes from the static registry, never from the request. Caller
//! values only ever travel through bind parameters.

use serde_json::{Map, Value};
use sqlx::mysql::{MySqlArguments, MySqlPool};
use sqlx::query::Query;
use sqlx::MySql;

use crate::error::{CoreError, CoreResult};
use crate::registry::{self, InsertSource, KeyStrategy, TableSpec};
use crate::row::row_to_json;

/// Generic table operations over one shared pool.
///
/// The pool is handed in at construction; connections are borrowed per
/// operation and returned on every exit path by RAII.
#[derive(Clone)]
pub struct TableOps {
    pool: MySqlPool,
}

impl TableOps {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Fetch every row of a table.
    pub async fn fetch_all(&self, table: &str) -> CoreResult<Vec<Value>> {
        let spec = registry::resolve(table)?;
        let sql = select_all_sql(spec);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        tracing::debug!(table = spec.physical, rows = rows.len(), "fetched table");
        Ok(rows.iter().map(row_to_json).collect())
    }

    /// Fetch one row by primary key.
    pub async fn fetch_one(&self, table: &str, id: i64) -> CoreResult<Value> {
        let spec = registry::resolve(table)?;
        let sql = select_one_sql(spec);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| row_to_json(&r)).ok_or(CoreError::NotFound)
    }

    /// Insert a row from a caller-supplied field map, in the table's
    /// fixed column order. Returns the assigned or generated id.
    pub async fn insert(&self, table: &str, fields: &Map<String, Value>) -> CoreResult<i64> {
        let spec = registry::resolve(table)?;
        let sql = insert_sql(spec);

        // Explicit-key tables compute MAX+1 on the same connection as
        // the insert. Two concurrent inserts can compute the same value;
        // the loser fails the uniqueness constraint. Known limitation.
        let mut conn = self.pool.acquire().await?;
        let explicit_id = match spec.key {
            KeyStrategy::Explicit => {
                let max: Option<i64> = sqlx::query_scalar(&max_key_sql(spec))
                    .fetch_one(&mut *conn)
                    .await?;
                Some(max.unwrap_or(0) + 1)
            }
            KeyStrategy::AutoIncrement => None,
        };

        let mut query = sqlx::query(&sql);
        if let Some(id) = explicit_id {
            query = query.bind(id);
        }
        for ins in spec.insert {
            if ins.source == InsertSource::Field {
                let value = fields.get(ins.column).ok_or_else(|| {
                    CoreError::InvalidInput(format!("missing field: {}", ins.column))
                })?;
                query = bind_value(query, ins.column, value)?;
            }
        }

        let result = query.execute(&mut *conn).await?;
        let id = explicit_id.unwrap_or_else(|| result.last_insert_id() as i64);
        tracing::debug!(table = spec.physical, id, "inserted row");
        Ok(id)
    }

    /// Update a row by primary key from a caller-supplied field map.
    ///
    /// Field names are joined against the registry's declared column set
    /// for the table; unknown keys and empty maps are rejected before
    /// any store round-trip.
    pub async fn update(
        &self,
        table: &str,
        id: i64,
        fields: &Map<String, Value>,
    ) -> CoreResult<()> {
        let spec = registry::resolve(table)?;
        let sql = update_sql(spec, fields)?;

        let mut query = sqlx::query(&sql);
        for (name, value) in fields {
            query = bind_value(query, name, value)?;
        }
        query = query.bind(id);

        let result = query.execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound);
        }
        tracing::debug!(table = spec.physical, id, "updated row");
        Ok(())
    }
}

/// `SELECT *` over the physical table.
pub fn select_all_sql(spec: &TableSpec) -> String {
    format!("SELECT * FROM {}", spec.physical)
}

/// Parameterized primary-key equality select.
pub fn select_one_sql(spec: &TableSpec) -> String {
    format!(
        "SELECT * FROM {} WHERE {} = ?",
        spec.physical, spec.primary_key
    )
}

/// Current key high-water mark for explicit-key tables.
pub fn max_key_sql(spec: &TableSpec) -> String {
    format!("SELECT MAX({}) FROM {}", spec.primary_key, spec.physical)
}

/// Parameterized insert in the table's fixed column order.
/// `CurrentTimestamp` columns emit `NOW()` instead of a placeholder.
pub fn insert_sql(spec: &TableSpec) -> String {
    let mut columns = Vec::with_capacity(spec.insert.len() + 1);
    let mut placeholders = Vec::with_capacity(spec.insert.len() + 1);
    if spec.key == KeyStrategy::Explicit {
        columns.push(spec.primary_key);
        placeholders.push("?");
    }
    for ins in spec.insert {
        columns.push(ins.column);
        placeholders.push(match ins.source {
            InsertSource::Field => "?",
            InsertSource::CurrentTimestamp => "NOW()",
        });
    }
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        spec.physical,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Parameterized update from the field map's key set. Keys must all be
/// declared columns of the table; an empty map is invalid SQL and is
/// rejected up front.
pub fn update_sql(spec: &TableSpec, fields: &Map<String, Value>) -> CoreResult<String> {
    if fields.is_empty() {
        return Err(CoreError::InvalidInput("no fields to update".to_string()));
    }
    for key in fields.keys() {
        if spec.column(key).is_none() {
            return Err(CoreError::InvalidInput(format!(
                "unknown column for {}: {}",
                spec.logical, key
            )));
        }
    }
    let sets: Vec<String> = fields.keys().map(|k| format!("{k} = ?")).collect();
    Ok(format!(
        "UPDATE {} SET {} WHERE {} = ?",
        spec.physical,
        sets.join(", "),
        spec.primary_key
    ))
}

/// Bind one JSON scalar as a query parameter.
pub(crate) fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    column: &str,
    value: &Value,
) -> CoreResult<Query<'q, MySql, MySqlArguments>> {
    let query = match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                query.bind(v)
            } else if let Some(v) = n.as_u64() {
                query.bind(v)
            } else if let Some(v) = n.as_f64() {
                query.bind(v)
            } else {
                return Err(CoreError::InvalidInput(format!(
                    "unrepresentable number for {column}"
                )));
            }
        }
        Value::String(s) => query.bind(s.clone()),
        Value::Array(_) | Value::Object(_) => {
            return Err(CoreError::InvalidInput(format!(
                "field {column} must be a scalar"
            )));
        }
    };
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn spec(logical: &str) -> &'static TableSpec {
        registry::resolve(logical).unwrap()
    }

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn select_sql_uses_registry_identifiers() {
        assert_eq!(select_all_sql(spec("customers")), "SELECT * FROM Customers");
        assert_eq!(
            select_one_sql(spec("delivery_staff")),
            "SELECT * FROM DeliveryStaff WHERE StaffID = ?"
        );
    }

    #[test]
    fn insert_sql_prepends_explicit_key() {
        assert_eq!(
            insert_sql(spec("customers")),
            "INSERT INTO Customers (CustomerID, Name, Email, PhoneNo, Address) \
             VALUES (?, ?, ?, ?, ?)"
        );
    }

    #[test]
    fn insert_sql_emits_now_for_timestamp_columns() {
        assert_eq!(
            insert_sql(spec("orders")),
            "INSERT INTO Orders (CustomerID, ResturantID, OrderDate, TotalAmount, Status) \
             VALUES (?, ?, NOW(), ?, ?)"
        );
        assert_eq!(
            insert_sql(spec("payments")),
            "INSERT INTO Payments (OrderID, TotalAmount, PaymentDate, PaymentMethod, PaymentStatus) \
             VALUES (?, ?, NOW(), ?, ?)"
        );
    }

    #[test]
    fn update_sql_builds_set_clause_from_known_columns() {
        let map = fields(json!({"Email": "new@gmail.com", "Name": "New"}));
        // serde_json maps iterate in key order; the bind loop uses the
        // same iteration, so clause order and bind order always agree.
        assert_eq!(
            update_sql(spec("customers"), &map).unwrap(),
            "UPDATE Customers SET Email = ?, Name = ? WHERE CustomerID = ?"
        );
    }

    #[test]
    fn update_sql_rejects_empty_field_map() {
        let map = fields(json!({}));
        match update_sql(spec("customers"), &map) {
            Err(CoreError::InvalidInput(msg)) => assert!(msg.contains("no fields")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn update_sql_rejects_unknown_columns() {
        let map = fields(json!({"Name": "x", "Email = 'y' WHERE 1=1; --": "z"}));
        assert!(matches!(
            update_sql(spec("customers"), &map),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn max_key_sql_targets_the_primary_key() {
        assert_eq!(
            max_key_sql(spec("customers")),
            "SELECT MAX(CustomerID) FROM Customers"
        );
    }
}
