//! Schema bootstrap.
//!
//! The relational schema is an external fixture: when enabled, the
//! gateway drops, recreates, and reseeds the whole database at startup,
//! statement by statement, from the embedded SQL files. The core crate
//! never touches schema migration.

use sqlx::MySqlPool;

const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");
const SEED_SQL: &str = include_str!("../sql/seed.sql");

/// Recreate the schema and load the sample data.
pub async fn initialize(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    tracing::info!("bootstrapping database schema");
    run_script(pool, SCHEMA_SQL).await?;
    run_script(pool, SEED_SQL).await?;
    tracing::info!("database bootstrap complete");
    Ok(())
}

async fn run_script(pool: &MySqlPool, script: &str) -> Result<(), sqlx::Error> {
    for statement in statements(script) {
        sqlx::query(&statement).execute(pool).await?;
    }
    Ok(())
}

/// Split a script into executable statements, dropping comment-only
/// lines and empty fragments.
pub fn statements(script: &str) -> Vec<String> {
    script
        .split(';')
        .map(|chunk| {
            chunk
                .lines()
                .filter(|line| !line.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_defines_every_table() {
        let script = statements(SCHEMA_SQL);
        for table in [
            "AdminUsers",
            "Customers",
            "Resturants",
            "MenuItems",
            "Orders",
            "OrderDetails",
            "DeliveryStaff",
            "Deliveries",
            "Payments",
        ] {
            assert!(
                script
                    .iter()
                    .any(|s| s.starts_with(&format!("CREATE TABLE {table} "))
                        || s.starts_with(&format!("CREATE TABLE {table}\n"))
                        || s.contains(&format!("CREATE TABLE {table} ("))),
                "no CREATE TABLE for {table}"
            );
            assert!(
                script.iter().any(|s| s == &format!("DROP TABLE IF EXISTS {table}")),
                "no DROP for {table}"
            );
        }
    }

    #[test]
    fn drops_run_before_creates_in_fk_order() {
        let script = statements(SCHEMA_SQL);
        let first_create = script
            .iter()
            .position(|s| s.starts_with("CREATE TABLE"))
            .unwrap();
        assert!(script[..first_create]
            .iter()
            .all(|s| s.starts_with("DROP TABLE IF EXISTS")));

        // Dependents drop before the tables they reference.
        let pos = |name: &str| {
            script
                .iter()
                .position(|s| s == &format!("DROP TABLE IF EXISTS {name}"))
                .unwrap()
        };
        assert!(pos("Payments") < pos("Orders"));
        assert!(pos("Deliveries") < pos("DeliveryStaff"));
        assert!(pos("OrderDetails") < pos("Orders"));
        assert!(pos("Orders") < pos("Customers"));
        assert!(pos("MenuItems") < pos("Resturants"));
    }

    #[test]
    fn comments_never_become_statements() {
        let script = statements("-- leading comment\nSELECT 1;\n-- trailing comment\n");
        assert_eq!(script, ["SELECT 1"]);
    }

    #[test]
    fn seed_covers_all_eight_tables() {
        let script = statements(SEED_SQL);
        assert_eq!(script.len(), 8);
        assert!(script.iter().all(|s| s.starts_with("INSERT INTO ")));
    }
}
