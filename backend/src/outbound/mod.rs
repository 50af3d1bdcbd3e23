//! Outbound adapters implementing domain ports.
//!
//! Adapters are thin translators between domain types and SQLite rows. They
//! contain no business logic.

pub mod persistence;
