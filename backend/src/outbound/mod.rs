//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed user repository using Diesel ORM.
//! - **memory**: process-local user repository for development and tests.
//! - **avatars**: filesystem avatar storage confined with `cap-std`.
//! - **password**: Argon2id password hashing.
//!
//! Adapters translate between domain types and infrastructure
//! representations and hold no business logic.

pub mod avatars;
pub mod memory;
pub mod password;
pub mod persistence;
