//! Testing utilities for migration scripts.
//!
//! `MockDatabase` stands in for a MySQL server so gate behavior can be
//! exercised without a live connection.

mod mock;

pub use mock::MockDatabase;
