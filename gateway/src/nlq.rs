//! Natural-language-to-SQL collaborator.
//!
//! The gateway treats text-to-SQL as an opaque external function: one
//! HTTP call to the generative model API with a schema-primed prompt,
//! one SELECT statement back. Replies are fence-stripped and anything
//! that is not a single SELECT is refused before it can reach the
//! store. No retries.

use serde::Deserialize;
use thiserror::Error;

/// Errors from the text-to-SQL collaborator.
#[derive(Debug, Error)]
pub enum NlqError {
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model returned no text")]
    EmptyReply,

    #[error("only SELECT queries are allowed for security reasons")]
    NotSelect,
}

/// Schema description and few-shot examples sent ahead of every query.
const SCHEMA_PROMPT: &str = r#"You are an expert SQL translator for a food delivery service database. Convert the following natural language query into a valid MySQL SQL statement.

Database schema:
- Customers(CustomerID, Name, Email, PhoneNo, Address)
- Orders(OrderID, CustomerID, ResturantID, OrderDate, TotalAmount, Status)
- OrderDetails(OrderDetailID, OrderID, MenuItemID, Quantity, Price)
- MenuItems(MenuItemID, ResturantID, Name, Description, Price)
- Resturants(ResturantID, Name, PhoneNo, CuisineType, Address)
- Payments(PaymentID, OrderID, TotalAmount, PaymentDate, PaymentMethod, PaymentStatus)
- DeliveryStaff(StaffID, Name, PhoneNo, Availability)
- Deliveries(DeliveryID, OrderID, StaffID, DeliveryTime, DeliveryStatus)

Table Relationships:
- Orders.CustomerID -> Customers.CustomerID
- Orders.ResturantID -> Resturants.ResturantID
- OrderDetails.OrderID -> Orders.OrderID
- OrderDetails.MenuItemID -> MenuItems.MenuItemID
- Payments.OrderID -> Orders.OrderID
- Deliveries.OrderID -> Orders.OrderID
- Deliveries.StaffID -> DeliveryStaff.StaffID

Examples:
- "show all customers" -> "SELECT * FROM Customers"
- "customers with order id 2" -> "SELECT c.* FROM Customers c JOIN Orders o ON c.CustomerID = o.CustomerID WHERE o.OrderID = 2"
- "payment id of all customers" -> "SELECT c.CustomerID, c.Name, p.PaymentID, p.PaymentStatus FROM Customers c JOIN Orders o ON c.CustomerID = o.CustomerID JOIN Payments p ON o.OrderID = p.OrderID"
- "total orders by customer" -> "SELECT c.Name, COUNT(o.OrderID) as TotalOrders FROM Customers c LEFT JOIN Orders o ON c.CustomerID = o.CustomerID GROUP BY c.CustomerID, c.Name"

Important rules:
1. Always use proper table names and column names
2. Use appropriate SQL functions and operators
3. Include proper JOIN conditions when needed
4. Use table aliases for better readability
5. For customer queries, always use the Customers table
6. For payment queries, always join with the Payments table through Orders
7. For order queries, always join with the Orders table"#;

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: String,
}

/// Client for the generateContent REST API.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Translate a natural-language prompt into one SELECT statement.
    pub async fn generate_sql(&self, prompt: &str) -> Result<String, NlqError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let body = serde_json::json!({
            "contents": [{
                "parts": [{
                    "text": format!(
                        "{SCHEMA_PROMPT}\n\nQuery: {prompt}\n\nRespond ONLY with the SQL query, \
                         nothing else. The query should be valid MySQL syntax."
                    )
                }]
            }]
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let reply: GenerateContentResponse = response.json().await?;
        let text = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or(NlqError::EmptyReply)?;

        let sql = strip_code_fences(&text).to_string();
        ensure_select_only(&sql)?;
        tracing::debug!(model = %self.model, sql = %sql, "generated SQL");
        Ok(sql)
    }
}

/// Models often wrap SQL in markdown fences; unwrap before validating.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("sql").unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}

/// Refuse anything that is not a single SELECT.
pub fn ensure_select_only(sql: &str) -> Result<(), NlqError> {
    let lowered = sql.trim_start().to_lowercase();
    if lowered.starts_with("select") && !sql.trim_end_matches(';').contains(';') {
        Ok(())
    } else {
        Err(NlqError::NotSelect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_sql_passes_through() {
        assert_eq!(
            strip_code_fences("SELECT * FROM Customers"),
            "SELECT * FROM Customers"
        );
    }

    #[test]
    fn fenced_sql_is_unwrapped() {
        assert_eq!(
            strip_code_fences("```sql\nSELECT * FROM Customers\n```"),
            "SELECT * FROM Customers"
        );
        assert_eq!(
            strip_code_fences("```\nSELECT 1\n```"),
            "SELECT 1"
        );
    }

    #[test]
    fn only_select_statements_are_accepted() {
        assert!(ensure_select_only("SELECT * FROM Customers").is_ok());
        assert!(ensure_select_only("select Name from Customers;").is_ok());
        assert!(ensure_select_only("DROP TABLE Customers").is_err());
        assert!(ensure_select_only("UPDATE Customers SET Name = 'x'").is_err());
        // Stacked statements are refused even when the first is a SELECT.
        assert!(ensure_select_only("SELECT 1; DROP TABLE Customers").is_err());
    }
}
