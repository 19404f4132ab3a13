//! Shared test doubles for unit and integration tests.

use std::sync::{Arc, Mutex};

use camino::Utf8Path;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use tempfile::TempDir;

use crate::domain::ports::{FixturePasswordHasher, KeyValueStore, MemoryKeyValueStore};
use crate::domain::{Desk, DeskPorts, HydrationReport};
use crate::outbound::storage::CapStdKeyValueStore;

/// Instant every fixture clock starts at.
pub fn fixture_time() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single() {
        Some(time) => time,
        None => panic!("valid fixture timestamp"),
    }
}

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward.
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Default for MutableClock {
    fn default() -> Self {
        Self::new(fixture_time())
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Ports wired to in-memory doubles, returned alongside handles to them.
pub struct FixturePorts {
    /// Store handle shared with the desk.
    pub store: Arc<MemoryKeyValueStore>,
    /// Clock handle shared with the desk.
    pub clock: Arc<MutableClock>,
}

impl FixturePorts {
    /// Fresh empty store and a clock at [`fixture_time`].
    pub fn new() -> Self {
        Self::with_store(MemoryKeyValueStore::new())
    }

    /// Use a pre-populated store.
    pub fn with_store(store: MemoryKeyValueStore) -> Self {
        Self {
            store: Arc::new(store),
            clock: Arc::new(MutableClock::default()),
        }
    }

    /// Desk ports backed by these doubles and the fixture hasher.
    pub fn desk_ports(&self) -> DeskPorts {
        let store: Arc<dyn KeyValueStore> = self.store.clone();
        DeskPorts {
            store,
            hasher: Arc::new(FixturePasswordHasher),
            clock: self.clock.clone(),
        }
    }

    /// Open a desk over these doubles.
    pub async fn open(&self) -> (Desk, HydrationReport) {
        match Desk::open(self.desk_ports()).await {
            Ok(opened) => opened,
            Err(err) => panic!("fixture desk failed to open: {err}"),
        }
    }
}

impl Default for FixturePorts {
    fn default() -> Self {
        Self::new()
    }
}

/// Scratch data directory for exercising the on-disk store.
///
/// The directory and every document in it are removed on drop.
pub struct TempDataDir {
    dir: TempDir,
    clock: Arc<MutableClock>,
}

impl TempDataDir {
    /// Create an empty data directory.
    pub fn new() -> Self {
        match tempfile::tempdir() {
            Ok(dir) => Self {
                dir,
                clock: Arc::new(MutableClock::default()),
            },
            Err(err) => panic!("temporary data directory: {err}"),
        }
    }

    /// Path of the data directory.
    pub fn path(&self) -> &Utf8Path {
        match Utf8Path::from_path(self.dir.path()) {
            Some(path) => path,
            None => panic!("temporary directory path is not UTF-8"),
        }
    }

    /// Clock shared by every desk opened over this directory.
    pub fn clock(&self) -> Arc<MutableClock> {
        Arc::clone(&self.clock)
    }

    /// A fresh store handle over the directory, as a restarted process would
    /// open it.
    pub fn store(&self) -> CapStdKeyValueStore {
        match CapStdKeyValueStore::open(self.path()) {
            Ok(store) => store,
            Err(err) => panic!("open data directory: {err}"),
        }
    }

    /// Open a desk over the directory with the fixture hasher.
    pub async fn open(&self) -> (Desk, HydrationReport) {
        let ports = DeskPorts {
            store: Arc::new(self.store()),
            hasher: Arc::new(FixturePasswordHasher),
            clock: self.clock(),
        };
        match Desk::open(ports).await {
            Ok(opened) => opened,
            Err(err) => panic!("desk over data directory failed to open: {err}"),
        }
    }

    /// Overwrite the document for `file` with raw bytes.
    pub fn write_raw(&self, file: &str, contents: &str) {
        if let Err(err) = std::fs::write(self.dir.path().join(file), contents) {
            panic!("write {file}: {err}");
        }
    }

    /// Raw contents of `file`, if it exists.
    pub fn read_raw(&self, file: &str) -> Option<String> {
        std::fs::read_to_string(self.dir.path().join(file)).ok()
    }
}

impl Default for TempDataDir {
    fn default() -> Self {
        Self::new()
    }
}
