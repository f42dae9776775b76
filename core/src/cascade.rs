//! Cascade-delete orchestration.
//!
//! Deleting a row must also remove every dependent row that would
//! otherwise violate a foreign-key constraint. The dependency order is
//! data — each [`TableSpec`] carries its ordered [`CascadeStep`] list —
//! and execution is a fold over that list inside one transaction.

use crate::error::{CoreError, CoreResult};
use crate::query::TableOps;
use crate::registry::{self, CascadeStep, TableSpec};

impl TableOps {
    /// Delete a row and its dependents, atomically.
    ///
    /// Zero rows affected on the final primary delete rolls the whole
    /// transaction back and reports `NotFound`, restoring any dependent
    /// rows the earlier steps removed. Mid-sequence store errors
    /// propagate after the transaction unwinds (rollback on drop).
    /// Returns the primary delete count, 0 or 1 by key uniqueness.
    pub async fn delete(&self, table: &str, id: i64) -> CoreResult<u64> {
        let spec = registry::resolve(table)?;
        let mut tx = self.pool().begin().await?;

        for step in spec.cascade {
            let sql = step_sql(step);
            let affected = sqlx::query(&sql)
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            tracing::debug!(table = spec.physical, step = %step_table(step), affected, "cascade step");
        }

        let affected = sqlx::query(&target_sql(spec))
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if affected == 0 {
            tx.rollback().await?;
            return Err(CoreError::NotFound);
        }

        tx.commit().await?;
        tracing::info!(table = spec.physical, id, "deleted row with dependents");
        Ok(affected)
    }
}

fn step_table(step: &CascadeStep) -> &'static str {
    match step {
        CascadeStep::Direct { table, .. } | CascadeStep::Joined { table, .. } => table,
    }
}

/// SQL for one cascade step, keyed on the target row's id.
pub fn step_sql(step: &CascadeStep) -> String {
    match *step {
        CascadeStep::Direct { table, fk } => {
            format!("DELETE FROM {table} WHERE {fk} = ?")
        }
        CascadeStep::Joined {
            table,
            via,
            link,
            fk,
        } => format!(
            "DELETE t FROM {table} t INNER JOIN {via} v ON t.{link} = v.{link} WHERE v.{fk} = ?"
        ),
    }
}

/// SQL for the final primary-key delete.
pub fn target_sql(spec: &TableSpec) -> String {
    format!(
        "DELETE FROM {} WHERE {} = ?",
        spec.physical, spec.primary_key
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn direct_step_deletes_by_foreign_key() {
        let step = CascadeStep::Direct {
            table: "Orders",
            fk: "CustomerID",
        };
        assert_eq!(step_sql(&step), "DELETE FROM Orders WHERE CustomerID = ?");
    }

    #[test]
    fn joined_step_deletes_through_the_middle_table() {
        let step = CascadeStep::Joined {
            table: "OrderDetails",
            via: "Orders",
            link: "OrderID",
            fk: "CustomerID",
        };
        assert_eq!(
            step_sql(&step),
            "DELETE t FROM OrderDetails t INNER JOIN Orders v \
             ON t.OrderID = v.OrderID WHERE v.CustomerID = ?"
        );
    }

    #[test]
    fn target_delete_uses_the_primary_key() {
        let spec = registry::resolve("menu_items").unwrap();
        assert_eq!(
            target_sql(spec),
            "DELETE FROM MenuItems WHERE MenuItemID = ?"
        );
    }

    // The full statement sequence for an order mirrors the FK graph:
    // details, deliveries, payments, then the order row itself.
    #[test]
    fn order_delete_sequence_covers_all_dependents() {
        let spec = registry::resolve("orders").unwrap();
        let mut statements: Vec<String> = spec.cascade.iter().map(step_sql).collect();
        statements.push(target_sql(spec));
        assert_eq!(
            statements,
            [
                "DELETE FROM OrderDetails WHERE OrderID = ?",
                "DELETE FROM Deliveries WHERE OrderID = ?",
                "DELETE FROM Payments WHERE OrderID = ?",
                "DELETE FROM Orders WHERE OrderID = ?",
            ]
        );
    }
}
