//! Port for one-way password hashing.
//!
//! Accounts only ever store the encoded output of a [`PasswordHasher`];
//! logins verify against it. Hashing is CPU-bound and synchronous.

use crate::domain::{Password, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum HashingError {
        /// The adapter could not produce a hash.
        Hash {
            /// Adapter error text.
            message: String,
        } => "password hashing failed: {message}",
        /// A stored hash could not be parsed.
        MalformedHash {
            /// Parser error text.
            message: String,
        } => "stored password hash is malformed: {message}",
    }
}

/// Hash and verify passwords.
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted, encoded hash of `password`.
    fn hash(&self, password: &Password) -> Result<PasswordHash, HashingError>;

    /// Check `password` against a previously produced `hash`.
    ///
    /// A mismatch is `Ok(false)`; `Err` is reserved for unusable hashes.
    fn verify(&self, password: &Password, hash: &PasswordHash) -> Result<bool, HashingError>;
}

/// Reversible stand-in hasher for fast tests.
///
/// Encodes as `fixture$<password>`; never use outside tests.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePasswordHasher;

#[cfg(any(test, feature = "test-support"))]
impl FixturePasswordHasher {
    const PREFIX: &'static str = "fixture$";
}

#[cfg(any(test, feature = "test-support"))]
impl PasswordHasher for FixturePasswordHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, HashingError> {
        Ok(PasswordHash::from_encoded(format!(
            "{}{}",
            Self::PREFIX,
            password.expose()
        )))
    }

    fn verify(&self, password: &Password, hash: &PasswordHash) -> Result<bool, HashingError> {
        let stored = hash
            .as_str()
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| HashingError::malformed_hash("missing fixture prefix"))?;
        Ok(stored == password.expose())
    }
}
