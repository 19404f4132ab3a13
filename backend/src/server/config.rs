//! Desk settings loaded via OrthoConfig, and the server configuration built
//! from them.

use std::net::{Ipv4Addr, SocketAddr};

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "./desk-data";

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT))
}

/// Process settings, read from `DESK_*` environment variables, the command
/// line, or a configuration file.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DESK")]
pub struct DeskSettings {
    /// Socket address the HTTP API listens on.
    pub bind_addr: Option<SocketAddr>,
    /// Directory holding one JSON document per store key.
    pub data_dir: Option<String>,
    /// Keep every document in memory; nothing survives a restart.
    #[ortho_config(default = false)]
    pub ephemeral: bool,
}

impl DeskSettings {
    /// Return the configured bind address, falling back to `127.0.0.1:8080`.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or_else(default_bind_addr)
    }

    /// Return the configured data directory, falling back to `./desk-data`.
    #[must_use]
    pub fn data_dir(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(self.data_dir.as_deref().unwrap_or(DEFAULT_DATA_DIR))
    }
}

/// Where the desk keeps its documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageMode {
    /// File-per-key documents under a data directory.
    Directory(Utf8PathBuf),
    /// In-memory documents, lost on exit.
    Ephemeral,
}

/// Builder-style configuration for creating the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) storage: StorageMode,
}

impl ServerConfig {
    /// Construct a server configuration storing documents under `data_dir`.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, data_dir: Utf8PathBuf) -> Self {
        Self {
            bind_addr,
            storage: StorageMode::Directory(data_dir),
        }
    }

    /// Keep documents in memory instead of on disk.
    #[must_use]
    pub fn ephemeral(mut self) -> Self {
        self.storage = StorageMode::Ephemeral;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Return the selected storage mode.
    #[must_use]
    pub fn storage(&self) -> &StorageMode {
        &self.storage
    }
}

impl From<&DeskSettings> for ServerConfig {
    fn from(settings: &DeskSettings) -> Self {
        let config = Self::new(settings.bind_addr(), settings.data_dir());
        if settings.ephemeral {
            config.ephemeral()
        } else {
            config
        }
    }
}
