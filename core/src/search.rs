//! Dynamic search planning.
//!
//! A search term is matched against every column of the target table,
//! with the predicate chosen per column from the registry's type
//! manifest: text columns pattern-match the term, numeric columns
//! exact-match it when it parses as a number, timestamp columns are
//! skipped. Candidates OR-combine into a single unordered scan.

use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::query::TableOps;
use crate::registry::{self, ColumnKind, TableSpec};
use crate::row::row_to_json;

/// One candidate predicate with its bind value.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column LIKE ?` with the term wrapped in wildcards.
    Like {
        column: &'static str,
        pattern: String,
    },
    /// `column = ?` with the parsed numeric term.
    Equals { column: &'static str, value: f64 },
}

/// A planned search: the SQL text plus its bind values in order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    pub sql: String,
    pub predicates: Vec<Predicate>,
}

/// Plan the predicate set for one table and term.
pub fn plan(spec: &TableSpec, term: &str) -> CoreResult<SearchPlan> {
    let numeric_term: Option<f64> = term.trim().parse().ok();

    let mut predicates = Vec::new();
    for col in spec.columns {
        match col.kind {
            ColumnKind::Text => predicates.push(Predicate::Like {
                column: col.name,
                pattern: format!("%{term}%"),
            }),
            ColumnKind::Numeric => {
                if let Some(value) = numeric_term {
                    predicates.push(Predicate::Equals {
                        column: col.name,
                        value,
                    });
                }
            }
            ColumnKind::Timestamp => {}
        }
    }

    if predicates.is_empty() {
        return Err(CoreError::NoSearchableColumns);
    }

    let clauses: Vec<String> = predicates
        .iter()
        .map(|p| match p {
            Predicate::Like { column, .. } => format!("{column} LIKE ?"),
            Predicate::Equals { column, .. } => format!("{column} = ?"),
        })
        .collect();

    Ok(SearchPlan {
        sql: format!(
            "SELECT * FROM {} WHERE {}",
            spec.physical,
            clauses.join(" OR ")
        ),
        predicates,
    })
}

impl TableOps {
    /// Search a table for rows matching the term in any column.
    ///
    /// Restricted to the registry's allow-list; other tables get the
    /// same invalid-table answer as names outside the registry. Result
    /// order is whatever the store returns for an unordered OR-scan.
    pub async fn search(&self, table: &str, term: &str) -> CoreResult<Vec<Value>> {
        let spec = registry::resolve(table)?;
        if !spec.searchable {
            return Err(CoreError::UnknownTable(table.to_string()));
        }

        let plan = plan(spec, term)?;
        let mut query = sqlx::query(&plan.sql);
        for predicate in &plan.predicates {
            query = match predicate {
                Predicate::Like { pattern, .. } => query.bind(pattern.clone()),
                Predicate::Equals { value, .. } => query.bind(*value),
            };
        }

        let rows = query.fetch_all(self.pool()).await?;
        tracing::debug!(table = spec.physical, term, hits = rows.len(), "search");
        Ok(rows.iter().map(row_to_json).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spec(logical: &str) -> &'static TableSpec {
        registry::resolve(logical).unwrap()
    }

    #[test]
    fn text_term_plans_like_predicates_only() {
        let plan = plan(spec("customers"), "gmail").unwrap();
        assert_eq!(
            plan.sql,
            "SELECT * FROM Customers WHERE Name LIKE ? OR Email LIKE ? \
             OR PhoneNo LIKE ? OR Address LIKE ?"
        );
        assert!(plan
            .predicates
            .iter()
            .all(|p| matches!(p, Predicate::Like { pattern, .. } if pattern == "%gmail%")));
    }

    #[test]
    fn numeric_term_plans_equality_and_like_combined() {
        let plan = plan(spec("orders"), "500").unwrap();
        // Column order: OrderID, CustomerID, ResturantID numeric;
        // OrderDate skipped; TotalAmount numeric; Status text.
        assert_eq!(
            plan.sql,
            "SELECT * FROM Orders WHERE OrderID = ? OR CustomerID = ? \
             OR ResturantID = ? OR TotalAmount = ? OR Status LIKE ?"
        );
        let equals = plan
            .predicates
            .iter()
            .filter(|p| matches!(p, Predicate::Equals { value, .. } if *value == 500.0))
            .count();
        assert_eq!(equals, 4);
    }

    #[test]
    fn timestamp_columns_are_never_searched() {
        let plan = plan(spec("orders"), "2023").unwrap();
        assert!(!plan.sql.contains("OrderDate"));
    }

    #[test]
    fn numeric_only_table_with_text_term_has_no_predicates() {
        // OrderDetails is all-numeric; a non-numeric term leaves nothing
        // to match on.
        match plan(spec("order_details"), "abc") {
            Err(CoreError::NoSearchableColumns) => {}
            other => panic!("expected NoSearchableColumns, got {other:?}"),
        }
    }

    #[test]
    fn decimal_terms_parse_for_numeric_columns() {
        let plan = plan(spec("menu_items"), "250.00").unwrap();
        assert!(plan
            .predicates
            .iter()
            .any(|p| matches!(p, Predicate::Equals { column: "Price", value } if *value == 250.0)));
    }
}
