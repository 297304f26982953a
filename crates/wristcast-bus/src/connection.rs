//! Connection manager owning the process's single shared bus session.
//!
//! Each process holds at most one session; connect attempts are
//! serialized behind a mutex and bounded by a timeout. A timed-out
//! connect surfaces as [`BusError::ConnectTimeout`], which callers log
//! and abort; the next periodic cycle tries again.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use zenoh::Session;

use crate::session::open_session;

/// Bounded wait for establishing the bus connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum BusError {
    #[error("Zenoh error: {0}")]
    Zenoh(#[from] zenoh::Error),

    #[error("bus connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("bus config error: {0}")]
    Config(String),
}

pub struct ConnectionManager {
    endpoint: Option<String>,
    session: Mutex<Option<Arc<Session>>>,
}

impl ConnectionManager {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint,
            session: Mutex::new(None),
        }
    }

    /// The current session, if one is established. Never connects.
    pub async fn current(&self) -> Option<Arc<Session>> {
        self.session.lock().await.clone()
    }

    /// Establish (or reuse) the session, waiting at most `timeout`.
    pub async fn connect(&self, timeout: Duration) -> Result<Arc<Session>, BusError> {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.as_ref() {
            return Ok(session.clone());
        }
        let session = tokio::time::timeout(timeout, open_session(&self.endpoint))
            .await
            .map_err(|_| BusError::ConnectTimeout(timeout))??;
        *guard = Some(session.clone());
        Ok(session)
    }

    /// Run `f` against an established session, connecting first if
    /// needed under the bounded wait.
    pub async fn with_connection<T, F, Fut>(&self, timeout: Duration, f: F) -> Result<T, BusError>
    where
        F: FnOnce(Arc<Session>) -> Fut,
        Fut: Future<Output = Result<T, BusError>>,
    {
        let session = self.connect(timeout).await?;
        f(session).await
    }

    /// Drop our handle on the session. The session itself closes once
    /// every task holding a clone has let go.
    pub async fn disconnect(&self) {
        if self.session.lock().await.take().is_some() {
            log::debug!("Bus session released");
        }
    }
}
