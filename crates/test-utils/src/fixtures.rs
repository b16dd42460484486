// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test fixtures: sample databases and SQL queries

use sqldist_catalog::Schema;
use sqldist_driver::{Driver, SqlDriver, SqliteConnection};

/// Sample SQL for testing
pub struct SqlFixtures;

impl SqlFixtures {
    // ===== Databases =====

    /// Customers, their orders and order items
    pub const fn shop_database() -> &'static str {
        "CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT NOT NULL, city TEXT);
         CREATE TABLE orders (
             id INTEGER PRIMARY KEY,
             customer_id INTEGER NOT NULL,
             total REAL NOT NULL,
             status TEXT
         );
         CREATE TABLE items (id INTEGER PRIMARY KEY, order_id INTEGER NOT NULL, sku TEXT, qty INTEGER);

         INSERT INTO customers VALUES (1, 'alice', 'paris'), (2, 'bob', 'berlin'), (3, 'carol', NULL);
         INSERT INTO orders VALUES
             (10, 1, 25.0, 'shipped'),
             (11, 1, 90.5, 'pending'),
             (12, 2, 12.0, 'cancelled');
         INSERT INTO items VALUES
             (100, 10, 'apple', 3),
             (101, 10, 'pear', 1),
             (102, 11, 'plum', 12);"
    }

    // ===== Queries =====

    /// Satisfied by order 11
    pub const fn satisfied_select() -> &'static str {
        "SELECT * FROM orders WHERE total > 50"
    }

    /// Closest order total is 90.5
    pub const fn unsatisfied_select() -> &'static str {
        "SELECT * FROM orders WHERE total = 100"
    }

    /// Inner join whose filter no pair satisfies
    pub const fn unsatisfied_join() -> &'static str {
        "SELECT c.name FROM customers c JOIN orders o ON o.customer_id = c.id WHERE o.total > 95"
    }

    /// Correlated EXISTS that no customer satisfies
    pub const fn unsatisfied_exists() -> &'static str {
        "SELECT c.name FROM customers c
         WHERE EXISTS (SELECT 1 FROM orders o WHERE o.customer_id = c.id AND o.total > 100)"
    }

    /// Uncorrelated IN over a subquery
    pub const fn in_subquery() -> &'static str {
        "SELECT * FROM customers WHERE id IN (SELECT customer_id FROM orders WHERE status = 'cancelled')"
    }
}

/// Schema of [`SqlFixtures::shop_database`]
pub fn shop_schema() -> Schema {
    Schema::from_table_columns(vec![
        ("customers", vec!["id", "name", "city"]),
        ("orders", vec!["id", "customer_id", "total", "status"]),
        ("items", vec!["id", "order_id", "sku", "qty"]),
    ])
}

/// In-memory SQLite driver after running `setup`
///
/// # Panics
///
/// Panics if the database cannot be created or `setup` fails.
pub fn sqlite_driver(setup: &str) -> SqlDriver<SqliteConnection> {
    let connection = SqliteConnection::open_in_memory().expect("open in-memory database");
    let mut driver = SqlDriver::new(connection);
    driver.execute(setup).expect("run setup statements");
    driver
}

/// In-memory SQLite driver holding [`SqlFixtures::shop_database`]
pub fn shop_driver() -> SqlDriver<SqliteConnection> {
    sqlite_driver(SqlFixtures::shop_database())
}

/// In-memory SQLite driver with a table `t(a INTEGER)` holding `values`
pub fn single_column_driver(values: &[i64]) -> SqlDriver<SqliteConnection> {
    let mut setup = String::from("CREATE TABLE t (a INTEGER);");
    for value in values {
        setup.push_str(&format!("INSERT INTO t VALUES ({value});"));
    }
    sqlite_driver(&setup)
}
