//! Statement-generation coverage across the whole registry.

use quickbite_core::cascade::{step_sql, target_sql};
use quickbite_core::query::{insert_sql, select_all_sql, select_one_sql};
use quickbite_core::registry::TABLES;
use quickbite_core::{resolve, CoreError};

#[test]
fn every_table_generates_well_formed_selects() {
    for spec in TABLES {
        let all = select_all_sql(spec);
        assert_eq!(all, format!("SELECT * FROM {}", spec.physical));

        let one = select_one_sql(spec);
        assert!(one.starts_with(&format!("SELECT * FROM {} WHERE ", spec.physical)));
        assert!(one.ends_with("= ?"));
        assert!(one.contains(spec.primary_key));
    }
}

#[test]
fn every_insert_has_one_placeholder_per_bound_column() {
    for spec in TABLES {
        let sql = insert_sql(spec);
        let placeholders = sql.matches('?').count();
        let bound = spec
            .insert
            .iter()
            .filter(|c| c.source == quickbite_core::registry::InsertSource::Field)
            .count()
            + usize::from(spec.key == quickbite_core::KeyStrategy::Explicit);
        assert_eq!(placeholders, bound, "{}: {sql}", spec.logical);
    }
}

#[test]
fn every_cascade_statement_binds_exactly_one_id() {
    for spec in TABLES {
        for step in spec.cascade {
            assert_eq!(step_sql(step).matches('?').count(), 1, "{}", spec.logical);
        }
        assert_eq!(target_sql(spec).matches('?').count(), 1);
    }
}

#[test]
fn unknown_tables_fail_before_any_statement_is_built() {
    for name in ["users", "Customers;", "food"] {
        assert!(matches!(resolve(name), Err(CoreError::UnknownTable(_))));
    }
}
