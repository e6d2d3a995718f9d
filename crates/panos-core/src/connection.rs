// ── Connection lifecycle ──
//
// One session per process, created on first use. A failed connect leaves
// the cell empty so the next caller retries; a session that later goes
// bad is never replaced, and its failures surface as `Remote` errors.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::DeviceTarget;
use crate::device::{Connector, DeviceSession, XmlApiConnector};
use crate::error::CoreError;

/// Owns the shared device session. Cheap to share behind an `Arc`.
pub struct ConnectionManager {
    target: DeviceTarget,
    connector: Arc<dyn Connector>,
    session: OnceCell<Arc<dyn DeviceSession>>,
}

impl ConnectionManager {
    pub fn new(target: DeviceTarget, connector: Arc<dyn Connector>) -> Self {
        Self {
            target,
            connector,
            session: OnceCell::new(),
        }
    }

    /// A manager that connects over the XML API.
    pub fn xml_api(target: DeviceTarget) -> Self {
        Self::new(target, Arc::new(XmlApiConnector))
    }

    pub fn target(&self) -> &DeviceTarget {
        &self.target
    }

    /// Whether a session has been established.
    pub fn is_connected(&self) -> bool {
        self.session.initialized()
    }

    /// The shared session, connecting on the first call.
    ///
    /// Concurrent first callers wait on a single connect attempt. Every
    /// caller after a success receives the same session.
    pub async fn get_connection(&self) -> Result<Arc<dyn DeviceSession>, CoreError> {
        let session = self
            .session
            .get_or_try_init(|| async {
                if !self.target.is_complete() {
                    return Err(CoreError::Connection {
                        target: self.target.address().to_owned(),
                        reason: "firewall address and API key must both be set".into(),
                    });
                }

                debug!(host = self.target.address(), "connecting to firewall");
                match self.connector.connect(&self.target).await {
                    Ok(session) => {
                        info!(host = self.target.address(), "connected to firewall");
                        Ok(session)
                    }
                    Err(e) => {
                        warn!(host = self.target.address(), error = %e, "connection failed");
                        Err(e)
                    }
                }
            })
            .await?;
        Ok(Arc::clone(session))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fake::FakeDevice;
    use secrecy::SecretString;
    use url::Url;

    fn target(key: &str) -> DeviceTarget {
        DeviceTarget::new(
            Url::parse("https://192.0.2.1").unwrap(),
            SecretString::from(key.to_string()),
        )
    }

    #[tokio::test]
    async fn same_session_is_reused() {
        let device = FakeDevice::new();
        let manager = ConnectionManager::new(target("k"), Arc::new(device.clone()));

        let a = manager.get_connection().await.unwrap();
        let b = manager.get_connection().await.unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(device.connect_count(), 1);
    }

    #[tokio::test]
    async fn failed_connect_can_be_retried() {
        let device = FakeDevice::new();
        device.fail_next_connects(1);
        let manager = ConnectionManager::new(target("k"), Arc::new(device.clone()));

        let first = manager.get_connection().await;
        assert!(matches!(first, Err(CoreError::Connection { .. })));
        assert!(!manager.is_connected());

        manager.get_connection().await.unwrap();
        assert!(manager.is_connected());
        assert_eq!(device.connect_count(), 2);
    }

    #[tokio::test]
    async fn empty_credential_never_reaches_the_device() {
        let device = FakeDevice::new();
        let manager = ConnectionManager::new(target(""), Arc::new(device.clone()));

        let err = manager.get_connection().await.err().unwrap();
        assert!(err.to_string().contains("192.0.2.1"));
        assert_eq!(device.connect_count(), 0);
    }

    #[tokio::test]
    async fn concurrent_first_calls_connect_once() {
        let device = FakeDevice::new();
        let manager = Arc::new(ConnectionManager::new(
            target("k"),
            Arc::new(device.clone()),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let m = Arc::clone(&manager);
                tokio::spawn(async move { m.get_connection().await.map(|_| ()) })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert_eq!(device.connect_count(), 1);
    }
}
