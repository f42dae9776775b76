//! Schema registry: the static manifest of every table the generic
//! endpoints may touch.
//!
//! Logical (client-facing) names, physical identifiers, primary keys,
//! column types, insert order, and cascade-delete steps all live here as
//! data. Resolution through [`resolve`] is the only path from request
//! text to a SQL identifier, which is what keeps the dynamically built
//! queries injection-free.
//!
//! The manifest mirrors the foreign-key graph by hand; if the schema
//! changes, the cascade lists must change with it.

use crate::error::{CoreError, CoreResult};

/// How a table's primary key is assigned on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrategy {
    /// The application computes `MAX(pk) + 1` on the insert connection.
    /// Not globally synchronized: concurrent inserts can collide and one
    /// will fail the uniqueness constraint.
    Explicit,
    /// The store assigns the key (AUTO_INCREMENT).
    AutoIncrement,
}

/// Type class of a column, as declared in the schema.
///
/// Drives the search planner's predicate choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// CHAR/VARCHAR/TEXT: pattern-match candidate.
    Text,
    /// INT/DECIMAL: exact-match candidate for numeric terms.
    Numeric,
    /// TIMESTAMP: never searched.
    Timestamp,
}

/// A single column of a table.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

/// Where the value for one insert column comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertSource {
    /// Taken from the caller-supplied field map, by column name.
    Field,
    /// The store's `NOW()` at insert time.
    CurrentTimestamp,
}

/// One column of a table's fixed insert order. The primary key is not
/// listed; it is prepended for [`KeyStrategy::Explicit`] tables.
#[derive(Debug, Clone, Copy)]
pub struct InsertColumn {
    pub column: &'static str,
    pub source: InsertSource,
}

/// One step of a table's cascade-delete sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStep {
    /// `DELETE FROM table WHERE fk = ?`
    Direct {
        table: &'static str,
        fk: &'static str,
    },
    /// `DELETE t FROM table t INNER JOIN via v ON t.link = v.link
    /// WHERE v.fk = ?` — dependents reachable only through a middle
    /// table (OrderDetails through Orders for a customer).
    Joined {
        table: &'static str,
        via: &'static str,
        link: &'static str,
        fk: &'static str,
    },
}

/// Everything the generic operations need to know about one table.
#[derive(Debug)]
pub struct TableSpec {
    /// Lowercase name clients send. `resturants` is misspelled in the
    /// shipped schema and therefore in the wire contract; both stay.
    pub logical: &'static str,
    /// Actual schema identifier.
    pub physical: &'static str,
    /// Primary-key column.
    pub primary_key: &'static str,
    pub key: KeyStrategy,
    /// Every column, primary key included, in declaration order.
    pub columns: &'static [ColumnSpec],
    /// Fixed per-table insert order (primary key excluded).
    pub insert: &'static [InsertColumn],
    /// Dependent-table cleanup, in foreign-key dependency order.
    pub cascade: &'static [CascadeStep],
    /// Whether the table is on the search allow-list.
    pub searchable: bool,
}

impl TableSpec {
    /// Look up a declared column by exact name.
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }
}

const fn text(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        kind: ColumnKind::Text,
    }
}

const fn numeric(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        kind: ColumnKind::Numeric,
    }
}

const fn timestamp(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        kind: ColumnKind::Timestamp,
    }
}

const fn field(column: &'static str) -> InsertColumn {
    InsertColumn {
        column,
        source: InsertSource::Field,
    }
}

const fn now(column: &'static str) -> InsertColumn {
    InsertColumn {
        column,
        source: InsertSource::CurrentTimestamp,
    }
}

/// The eight tables of the food-delivery schema.
pub static TABLES: &[TableSpec] = &[
    TableSpec {
        logical: "customers",
        physical: "Customers",
        primary_key: "CustomerID",
        key: KeyStrategy::Explicit,
        columns: &[
            numeric("CustomerID"),
            text("Name"),
            text("Email"),
            text("PhoneNo"),
            text("Address"),
        ],
        insert: &[
            field("Name"),
            field("Email"),
            field("PhoneNo"),
            field("Address"),
        ],
        cascade: &[
            CascadeStep::Joined {
                table: "OrderDetails",
                via: "Orders",
                link: "OrderID",
                fk: "CustomerID",
            },
            CascadeStep::Direct {
                table: "Orders",
                fk: "CustomerID",
            },
        ],
        searchable: true,
    },
    TableSpec {
        logical: "resturants",
        physical: "Resturants",
        primary_key: "ResturantID",
        key: KeyStrategy::AutoIncrement,
        columns: &[
            numeric("ResturantID"),
            text("Name"),
            text("PhoneNo"),
            text("CuisineType"),
            text("Address"),
        ],
        insert: &[
            field("Name"),
            field("PhoneNo"),
            field("CuisineType"),
            field("Address"),
        ],
        cascade: &[
            CascadeStep::Direct {
                table: "MenuItems",
                fk: "ResturantID",
            },
            CascadeStep::Direct {
                table: "Orders",
                fk: "ResturantID",
            },
        ],
        searchable: true,
    },
    TableSpec {
        logical: "menu_items",
        physical: "MenuItems",
        primary_key: "MenuItemID",
        key: KeyStrategy::AutoIncrement,
        columns: &[
            numeric("MenuItemID"),
            numeric("ResturantID"),
            text("Name"),
            text("Description"),
            numeric("Price"),
        ],
        insert: &[
            field("ResturantID"),
            field("Name"),
            field("Description"),
            field("Price"),
        ],
        cascade: &[CascadeStep::Direct {
            table: "OrderDetails",
            fk: "MenuItemID",
        }],
        searchable: true,
    },
    TableSpec {
        logical: "orders",
        physical: "Orders",
        primary_key: "OrderID",
        key: KeyStrategy::AutoIncrement,
        columns: &[
            numeric("OrderID"),
            numeric("CustomerID"),
            numeric("ResturantID"),
            timestamp("OrderDate"),
            numeric("TotalAmount"),
            text("Status"),
        ],
        insert: &[
            field("CustomerID"),
            field("ResturantID"),
            now("OrderDate"),
            field("TotalAmount"),
            field("Status"),
        ],
        cascade: &[
            CascadeStep::Direct {
                table: "OrderDetails",
                fk: "OrderID",
            },
            CascadeStep::Direct {
                table: "Deliveries",
                fk: "OrderID",
            },
            CascadeStep::Direct {
                table: "Payments",
                fk: "OrderID",
            },
        ],
        searchable: true,
    },
    TableSpec {
        logical: "order_details",
        physical: "OrderDetails",
        primary_key: "OrderDetailID",
        key: KeyStrategy::AutoIncrement,
        columns: &[
            numeric("OrderDetailID"),
            numeric("OrderID"),
            numeric("MenuItemID"),
            numeric("Quantity"),
            numeric("Price"),
        ],
        insert: &[
            field("OrderID"),
            field("MenuItemID"),
            field("Quantity"),
            field("Price"),
        ],
        cascade: &[],
        searchable: false,
    },
    TableSpec {
        logical: "delivery_staff",
        physical: "DeliveryStaff",
        primary_key: "StaffID",
        key: KeyStrategy::AutoIncrement,
        columns: &[
            numeric("StaffID"),
            text("Name"),
            text("PhoneNo"),
            text("Availability"),
        ],
        insert: &[field("Name"), field("PhoneNo"), field("Availability")],
        cascade: &[CascadeStep::Direct {
            table: "Deliveries",
            fk: "StaffID",
        }],
        searchable: false,
    },
    TableSpec {
        logical: "deliveries",
        physical: "Deliveries",
        primary_key: "DeliveryID",
        key: KeyStrategy::AutoIncrement,
        columns: &[
            numeric("DeliveryID"),
            numeric("OrderID"),
            numeric("StaffID"),
            timestamp("DeliveryTime"),
            text("DeliveryStatus"),
        ],
        insert: &[
            field("OrderID"),
            field("StaffID"),
            now("DeliveryTime"),
            field("DeliveryStatus"),
        ],
        cascade: &[],
        searchable: false,
    },
    TableSpec {
        logical: "payments",
        physical: "Payments",
        primary_key: "PaymentID",
        key: KeyStrategy::AutoIncrement,
        columns: &[
            numeric("PaymentID"),
            numeric("OrderID"),
            numeric("TotalAmount"),
            timestamp("PaymentDate"),
            text("PaymentMethod"),
            text("PaymentStatus"),
        ],
        insert: &[
            field("OrderID"),
            field("TotalAmount"),
            now("PaymentDate"),
            field("PaymentMethod"),
            field("PaymentStatus"),
        ],
        cascade: &[],
        searchable: false,
    },
];

/// Resolve a logical table name, case-insensitively.
pub fn resolve(logical: &str) -> CoreResult<&'static TableSpec> {
    TABLES
        .iter()
        .find(|t| t.logical.eq_ignore_ascii_case(logical))
        .ok_or_else(|| CoreError::UnknownTable(logical.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_physical(physical: &str) -> Option<&'static TableSpec> {
        TABLES.iter().find(|t| t.physical == physical)
    }

    #[test]
    fn resolve_is_case_insensitive() {
        assert_eq!(resolve("customers").unwrap().physical, "Customers");
        assert_eq!(resolve("CUSTOMERS").unwrap().physical, "Customers");
        assert_eq!(resolve("Menu_Items").unwrap().physical, "MenuItems");
    }

    #[test]
    fn resolve_rejects_unknown_names() {
        for name in ["admin_users", "customers;--", "Orders ", ""] {
            match resolve(name) {
                Err(CoreError::UnknownTable(n)) => assert_eq!(n, name),
                other => panic!("expected UnknownTable, got {:?}", other.map(|t| t.logical)),
            }
        }
    }

    #[test]
    fn primary_keys_are_declared_columns() {
        for spec in TABLES {
            assert!(
                spec.column(spec.primary_key).is_some(),
                "{}: primary key {} missing from columns",
                spec.logical,
                spec.primary_key
            );
        }
    }

    #[test]
    fn insert_columns_are_declared_columns() {
        for spec in TABLES {
            for ins in spec.insert {
                assert!(
                    spec.column(ins.column).is_some(),
                    "{}: insert column {} missing from columns",
                    spec.logical,
                    ins.column
                );
                assert_ne!(ins.column, spec.primary_key);
            }
        }
    }

    // The cascade lists are a hand-maintained mirror of the FK graph;
    // check that every step points at real tables and real columns.
    #[test]
    fn cascade_steps_reference_declared_tables_and_columns() {
        for spec in TABLES {
            for step in spec.cascade {
                match *step {
                    CascadeStep::Direct { table, fk } => {
                        let dep = by_physical(table)
                            .unwrap_or_else(|| panic!("{}: unknown table {}", spec.logical, table));
                        assert!(dep.column(fk).is_some(), "{}: {} has no column {}", spec.logical, table, fk);
                    }
                    CascadeStep::Joined { table, via, link, fk } => {
                        let dep = by_physical(table)
                            .unwrap_or_else(|| panic!("{}: unknown table {}", spec.logical, table));
                        let mid = by_physical(via)
                            .unwrap_or_else(|| panic!("{}: unknown table {}", spec.logical, via));
                        assert!(dep.column(link).is_some());
                        assert!(mid.column(link).is_some());
                        assert!(mid.column(fk).is_some());
                    }
                }
            }
        }
    }

    #[test]
    fn customer_cascade_clears_order_details_before_orders() {
        let spec = resolve("customers").unwrap();
        assert_eq!(
            spec.cascade,
            &[
                CascadeStep::Joined {
                    table: "OrderDetails",
                    via: "Orders",
                    link: "OrderID",
                    fk: "CustomerID",
                },
                CascadeStep::Direct {
                    table: "Orders",
                    fk: "CustomerID",
                },
            ]
        );
    }

    #[test]
    fn leaf_tables_have_no_cascade_steps() {
        for name in ["order_details", "deliveries", "payments"] {
            assert!(resolve(name).unwrap().cascade.is_empty(), "{name}");
        }
    }

    #[test]
    fn search_allow_list_matches_contract() {
        let allowed: Vec<&str> = TABLES.iter().filter(|t| t.searchable).map(|t| t.logical).collect();
        assert_eq!(allowed, ["customers", "resturants", "menu_items", "orders"]);
    }

    // Explicit keys are assigned via MAX+1 on the insert connection.
    // Two concurrent inserts can compute the same value and one fails
    // the uniqueness constraint; that is the documented behavior, not a
    // bug in the caller.
    #[test]
    fn only_customers_uses_explicit_keys() {
        for spec in TABLES {
            let expected = if spec.logical == "customers" {
                KeyStrategy::Explicit
            } else {
                KeyStrategy::AutoIncrement
            };
            assert_eq!(spec.key, expected, "{}", spec.logical);
        }
    }
}
