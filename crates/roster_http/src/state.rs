//! Shared request state: one store connection behind a mutex.

use crate::error::ApiError;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Wraps a connection returned by `roster_core::db::open_db*`.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs one unit of work with exclusive access to the store.
    ///
    /// The lock is released before this returns, so handlers never hold it
    /// across an `.await`.
    pub fn with_conn<T>(
        &self,
        work: impl FnOnce(&mut Connection) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| ApiError::Internal("store lock poisoned".to_string()))?;
        work(&mut *conn)
    }
}
