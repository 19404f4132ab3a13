//! Shared HTTP adapter state.
//!
//! Handlers accept [`HttpState`] via `actix_web::web::Data`. The desk is the
//! single owner of application state; the mutex serialises every request
//! against it so each operation observes the previous one's effects.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::domain::Desk;

/// Dependency bundle for HTTP handlers.
///
/// Cloning shares the same desk, so every worker sees one state.
#[derive(Clone)]
pub struct HttpState {
    desk: Arc<Mutex<Desk>>,
}

impl HttpState {
    /// Wrap an opened desk.
    pub fn new(desk: Desk) -> Self {
        Self {
            desk: Arc::new(Mutex::new(desk)),
        }
    }

    /// Lock the desk for the duration of one operation.
    pub async fn desk(&self) -> MutexGuard<'_, Desk> {
        self.desk.lock().await
    }
}
