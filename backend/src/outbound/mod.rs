//! Outbound adapters implementing domain ports for local infrastructure.
//!
//! - **storage**: the key-value store as one JSON file per key, written
//!   atomically through `cap-std`.
//! - **hashing**: Argon2id password hashing.
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod hashing;
pub mod storage;
