//! Callback server lifecycle.
//!
//! The async callback for https pages must terminate on a TLS listener whose
//! certificate the target device trusts. The listener primitive and the
//! trust store are seams supplied by the embedding driver; this module owns
//! the session-scoped lifecycle: start the listener on the synchronous
//! callback endpoint, publish the negotiated https endpoint on the session,
//! install trust for the session's device, and tear everything down at
//! session end without leaving a pending caller hanging.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Mutex as TokioMutex;

use crate::error::{Error, Result};
use crate::rendezvous::PendingResponse;
use crate::session::SessionState;

/// Running listener returned by [`AsyncCallbackListener::start`].
#[async_trait]
pub trait ListenerHandle: Send {
    async fn close(self: Box<Self>) -> Result<()>;
}

/// What a started listener hands back: the handle, the certificate it
/// serves, and the externally negotiated https port.
pub struct ListenerParts {
    pub handle: Box<dyn ListenerHandle>,
    pub certificate_pem: String,
    pub https_port: u16,
}

/// TLS-capable listener primitive.
#[async_trait]
pub trait AsyncCallbackListener: Send + Sync {
    async fn start(&self, port: u16, address: &str) -> Result<ListenerParts>;
}

/// Device trust-store operations. Both are fallible and expected to be
/// idempotent on a best-effort basis.
#[async_trait]
pub trait TrustStore: Send + Sync {
    async fn install(&self, certificate_pem: &str, device_id: &str) -> Result<()>;
    async fn uninstall(&self, certificate_pem: &str, device_id: &str) -> Result<()>;
}

#[derive(Clone)]
struct InstalledCert {
    certificate_pem: String,
    device_id: String,
}

/// Session-scoped lifecycle for the https async response listener.
pub struct CallbackServer {
    session: Arc<SessionState>,
    pending: Arc<PendingResponse>,
    trust: Arc<dyn TrustStore>,
    active: TokioMutex<Option<Box<dyn ListenerHandle>>>,
    // Survives stop() so repeated stops keep attempting cert cleanup.
    installed: Mutex<Option<InstalledCert>>,
}

impl CallbackServer {
    pub fn new(
        session: Arc<SessionState>,
        pending: Arc<PendingResponse>,
        trust: Arc<dyn TrustStore>,
    ) -> Self {
        Self {
            session,
            pending,
            trust,
            active: TokioMutex::new(None),
            installed: Mutex::new(None),
        }
    }

    /// Starts the TLS listener and installs its certificate on the device.
    ///
    /// The listener binds to the same address/port the synchronous callback
    /// path resolves to; the https callback address is pinned to localhost
    /// because the https response is always received locally, even when the
    /// synchronous callback host gets rewritten for a real device. A trust
    /// install failure propagates: without it the callback path is
    /// unusable and callers must know immediately.
    pub async fn start(&self, listener: &dyn AsyncCallbackListener) -> Result<()> {
        let config = self.session.config();
        let address = config.effective_callback_address().to_owned();
        let port = config.effective_callback_port();

        tracing::debug!(
            target = "relay.server",
            address,
            port,
            "starting https server for async responses"
        );
        let parts = listener.start(port, &address).await?;

        self.session.set_https_callback("localhost", parts.https_port);

        // Record handle and certificate before the trust attempt so stop()
        // can clean up even when the install fails partway.
        *self.active.lock().await = Some(parts.handle);

        let device_id = config
            .device_id()
            .ok_or_else(|| {
                Error::TrustInstall("no device identifier configured for trust install".into())
            })?
            .to_owned();
        *self.installed.lock() = Some(InstalledCert {
            certificate_pem: parts.certificate_pem.clone(),
            device_id: device_id.clone(),
        });

        self.trust.install(&parts.certificate_pem, &device_id).await?;
        tracing::debug!(
            target = "relay.server",
            https_port = parts.https_port,
            device_id,
            "async response server ready, certificate trusted"
        );
        Ok(())
    }

    /// Stops the listener and removes the installed certificate.
    ///
    /// Both sub-steps run regardless of the other's outcome, and a stop
    /// without a prior start still attempts cert removal. A pending async
    /// response is failed rather than left to hang.
    pub async fn stop(&self) -> Result<()> {
        tracing::debug!(target = "relay.server", "stopping https server for async responses");

        if self.pending.fail(Error::ServerClosed) {
            tracing::warn!(
                target = "relay.server",
                "callback server stopped while an async response was pending"
            );
        }

        let listener_result = match self.active.lock().await.take() {
            Some(handle) => handle.close().await,
            None => Ok(()),
        };

        let installed = self.installed.lock().clone();
        let trust_result = match installed {
            Some(cert) => {
                self.trust
                    .uninstall(&cert.certificate_pem, &cert.device_id)
                    .await
            }
            None => match self.session.config().device_id() {
                Some(device_id) => self.trust.uninstall("", device_id).await,
                None => Ok(()),
            },
        };

        match (listener_result, trust_result) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(listener), Ok(())) => Err(Error::ServerStop(format!(
                "listener close failed: {listener}"
            ))),
            (Ok(()), Err(trust)) => Err(Error::ServerStop(format!(
                "certificate uninstall failed: {trust}"
            ))),
            (Err(listener), Err(trust)) => Err(Error::ServerStop(format!(
                "listener close failed: {listener}; certificate uninstall failed: {trust}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ExecutionContext, SessionConfig};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    struct FakeHandle {
        closed: Arc<AtomicUsize>,
        fail_close: bool,
    }

    #[async_trait]
    impl ListenerHandle for FakeHandle {
        async fn close(self: Box<Self>) -> Result<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            if self.fail_close {
                return Err(Error::Transport("close refused".into()));
            }
            Ok(())
        }
    }

    struct FakeListener {
        closed: Arc<AtomicUsize>,
        fail_close: bool,
    }

    #[async_trait]
    impl AsyncCallbackListener for FakeListener {
        async fn start(&self, _port: u16, _address: &str) -> Result<ListenerParts> {
            Ok(ListenerParts {
                handle: Box::new(FakeHandle {
                    closed: Arc::clone(&self.closed),
                    fail_close: self.fail_close,
                }),
                certificate_pem: "-----BEGIN CERTIFICATE-----\nfake\n-----END CERTIFICATE-----"
                    .into(),
                https_port: 9200,
            })
        }
    }

    #[derive(Default)]
    struct FakeTrust {
        installs: Mutex<Vec<(String, String)>>,
        uninstalls: Mutex<Vec<(String, String)>>,
        fail_install: AtomicBool,
        fail_uninstall: AtomicBool,
    }

    #[async_trait]
    impl TrustStore for FakeTrust {
        async fn install(&self, certificate_pem: &str, device_id: &str) -> Result<()> {
            self.installs
                .lock()
                .push((certificate_pem.to_owned(), device_id.to_owned()));
            if self.fail_install.load(Ordering::SeqCst) {
                return Err(Error::TrustInstall("device refused profile".into()));
            }
            Ok(())
        }

        async fn uninstall(&self, certificate_pem: &str, device_id: &str) -> Result<()> {
            self.uninstalls
                .lock()
                .push((certificate_pem.to_owned(), device_id.to_owned()));
            if self.fail_uninstall.load(Ordering::SeqCst) {
                return Err(Error::TrustInstall("device refused removal".into()));
            }
            Ok(())
        }
    }

    fn session(sim_udid: Option<&str>) -> Arc<SessionState> {
        Arc::new(SessionState::new(
            SessionConfig {
                session_id: "sess-1".into(),
                address: "10.0.0.5".into(),
                port: 4723,
                callback_address: None,
                callback_port: None,
                udid: Some("device-udid".into()),
                sim_udid: sim_udid.map(str::to_owned),
                real_device: false,
            },
            ExecutionContext::Web,
        ))
    }

    fn server(
        session: Arc<SessionState>,
        trust: Arc<FakeTrust>,
    ) -> (CallbackServer, Arc<PendingResponse>) {
        let pending = Arc::new(PendingResponse::new());
        let server = CallbackServer::new(session, Arc::clone(&pending), trust);
        (server, pending)
    }

    #[tokio::test]
    async fn start_publishes_https_endpoint_and_installs_trust() {
        let session = session(Some("sim-udid"));
        let trust = Arc::new(FakeTrust::default());
        let (server, _pending) = server(Arc::clone(&session), Arc::clone(&trust));
        let listener = FakeListener {
            closed: Arc::new(AtomicUsize::new(0)),
            fail_close: false,
        };

        server.start(&listener).await.unwrap();

        // https callback is pinned to localhost regardless of bind address.
        assert_eq!(session.https_callback(), Some(("localhost".into(), 9200)));

        let installs = trust.installs.lock();
        assert_eq!(installs.len(), 1);
        assert_eq!(installs[0].1, "sim-udid");
    }

    #[tokio::test]
    async fn trust_install_failure_propagates() {
        let session = session(None);
        let trust = Arc::new(FakeTrust::default());
        trust.fail_install.store(true, Ordering::SeqCst);
        let (server, _pending) = server(Arc::clone(&session), Arc::clone(&trust));
        let listener = FakeListener {
            closed: Arc::new(AtomicUsize::new(0)),
            fail_close: false,
        };

        let err = server.start(&listener).await.unwrap_err();
        assert!(matches!(err, Error::TrustInstall(_)));

        // The https endpoint was still published and the handle recorded, so
        // stop() can clean up the partial start.
        assert!(session.https_callback().is_some());
        server.stop().await.unwrap();
        assert_eq!(trust.uninstalls.lock().len(), 1);
    }

    #[tokio::test]
    async fn stop_closes_listener_and_uninstalls() {
        let session = session(Some("sim-udid"));
        let trust = Arc::new(FakeTrust::default());
        let closed = Arc::new(AtomicUsize::new(0));
        let (server, _pending) = server(session, Arc::clone(&trust));
        let listener = FakeListener {
            closed: Arc::clone(&closed),
            fail_close: false,
        };

        server.start(&listener).await.unwrap();
        server.stop().await.unwrap();

        assert_eq!(closed.load(Ordering::SeqCst), 1);
        let uninstalls = trust.uninstalls.lock();
        assert_eq!(uninstalls.len(), 1);
        assert_eq!(uninstalls[0].1, "sim-udid");
    }

    #[tokio::test]
    async fn second_stop_skips_listener_but_still_uninstalls() {
        let session = session(Some("sim-udid"));
        let trust = Arc::new(FakeTrust::default());
        let closed = Arc::new(AtomicUsize::new(0));
        let (server, _pending) = server(session, Arc::clone(&trust));
        let listener = FakeListener {
            closed: Arc::clone(&closed),
            fail_close: false,
        };

        server.start(&listener).await.unwrap();
        server.stop().await.unwrap();
        server.stop().await.unwrap();

        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert_eq!(trust.uninstalls.lock().len(), 2);
    }

    #[tokio::test]
    async fn stop_without_start_still_attempts_cert_removal() {
        let session = session(None);
        let trust = Arc::new(FakeTrust::default());
        let (server, _pending) = server(session, Arc::clone(&trust));

        server.stop().await.unwrap();

        let uninstalls = trust.uninstalls.lock();
        assert_eq!(uninstalls.len(), 1);
        assert_eq!(uninstalls[0].1, "device-udid");
    }

    #[tokio::test]
    async fn failed_listener_close_does_not_skip_uninstall() {
        let session = session(Some("sim-udid"));
        let trust = Arc::new(FakeTrust::default());
        let (server, _pending) = server(session, Arc::clone(&trust));
        let listener = FakeListener {
            closed: Arc::new(AtomicUsize::new(0)),
            fail_close: true,
        };

        server.start(&listener).await.unwrap();
        let err = server.stop().await.unwrap_err();

        assert!(matches!(err, Error::ServerStop(_)));
        assert_eq!(trust.uninstalls.lock().len(), 1);
    }

    #[tokio::test]
    async fn stop_fails_a_pending_response() {
        let session = session(Some("sim-udid"));
        let trust = Arc::new(FakeTrust::default());
        let (server, pending) = server(session, trust);
        let listener = FakeListener {
            closed: Arc::new(AtomicUsize::new(0)),
            fail_close: false,
        };

        server.start(&listener).await.unwrap();
        let waiter = pending.register("sess-1", Duration::from_secs(5));
        server.stop().await.unwrap();

        assert!(matches!(waiter.wait().await, Err(Error::ServerClosed)));
    }
}
