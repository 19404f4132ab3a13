//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod key_value_store;
mod password_hasher;

pub use key_value_store::{KeyValueStore, MemoryKeyValueStore, StoreError, StoreKey};
#[cfg(any(test, feature = "test-support"))]
pub use password_hasher::FixturePasswordHasher;
pub use password_hasher::{HashingError, PasswordHasher};
