//! File-backed key-value storage.

mod atomic_io;
mod cap_std_store;

pub use cap_std_store::CapStdKeyValueStore;
