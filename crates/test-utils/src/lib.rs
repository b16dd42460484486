// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for sqldist
//!
//! This crate provides common testing components including:
//! - A mock driver answering canned queries
//! - Seeded SQLite databases and sample schemas
//! - IR and distance assertions

pub mod assertions;
pub mod fixtures;
pub mod mock_driver;

// Re-exports for convenience
pub use assertions::{SqlAssertions, assert_close};
pub use fixtures::{SqlFixtures, shop_driver, shop_schema, single_column_driver, sqlite_driver};
pub use mock_driver::MockDriver;
