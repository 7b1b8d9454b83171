//! Session configuration and state.
//!
//! [`SessionConfig`] is the immutable configuration handed in by the owning
//! driver. [`SessionState`] wraps it together with the few fields that are
//! legitimately mutable during a session: the execution context, the async
//! wait budget, and the https callback endpoint written by the callback
//! server lifecycle.

use parking_lot::Mutex;

/// Where scripts currently execute for this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionContext {
    /// In-page javascript via the atom transport.
    Web,
    /// Native UI automation channel.
    Native,
}

/// Fully owned, immutable session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session identifier used in the callback path and for correlating
    /// inbound responses.
    pub session_id: String,
    /// Address the driver's own server listens on.
    pub address: String,
    /// Port the driver's own server listens on.
    pub port: u16,
    /// Operator-configured callback address override.
    pub callback_address: Option<String>,
    /// Operator-configured callback port override.
    pub callback_port: Option<u16>,
    /// Configured device identifier.
    pub udid: Option<String>,
    /// Simulator identifier; preferred over `udid` for trust installation.
    pub sim_udid: Option<String>,
    /// Whether the target is a physical device rather than a
    /// simulator/emulator sharing the host's loopback.
    pub real_device: bool,
}

impl SessionConfig {
    /// Address the synchronous callback path uses: the configured override,
    /// else the driver's own address.
    pub fn effective_callback_address(&self) -> &str {
        self.callback_address.as_deref().unwrap_or(&self.address)
    }

    /// Port the synchronous callback path uses: the configured override,
    /// else the driver's own port.
    pub fn effective_callback_port(&self) -> u16 {
        self.callback_port.unwrap_or(self.port)
    }

    /// Device identifier for trust-store operations: simulator UDID if
    /// present, else the configured device UDID.
    pub fn device_id(&self) -> Option<&str> {
        self.sim_udid.as_deref().or(self.udid.as_deref())
    }
}

#[derive(Debug)]
struct MutableState {
    context: ExecutionContext,
    async_wait_ms: Option<u64>,
    https_callback_address: Option<String>,
    https_callback_port: Option<u16>,
}

/// Session configuration plus its documented mutable fields.
#[derive(Debug)]
pub struct SessionState {
    config: SessionConfig,
    inner: Mutex<MutableState>,
}

impl SessionState {
    pub fn new(config: SessionConfig, context: ExecutionContext) -> Self {
        Self {
            config,
            inner: Mutex::new(MutableState {
                context,
                async_wait_ms: None,
                https_callback_address: None,
                https_callback_port: None,
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    pub fn context(&self) -> ExecutionContext {
        self.inner.lock().context
    }

    pub fn is_web_context(&self) -> bool {
        self.context() == ExecutionContext::Web
    }

    pub fn set_context(&self, context: ExecutionContext) {
        self.inner.lock().context = context;
    }

    /// Async wait budget in milliseconds, defaulting to zero when unset.
    pub fn async_wait_ms(&self) -> u64 {
        self.inner.lock().async_wait_ms.unwrap_or(0)
    }

    /// Sets the maximum time the remote transport should wait for an async
    /// script before giving up.
    pub fn set_async_script_timeout(&self, ms: u64) {
        self.inner.lock().async_wait_ms = Some(ms);
    }

    /// The https callback endpoint, once the callback server has started.
    pub fn https_callback(&self) -> Option<(String, u16)> {
        let inner = self.inner.lock();
        match (&inner.https_callback_address, inner.https_callback_port) {
            (Some(address), Some(port)) => Some((address.clone(), port)),
            _ => None,
        }
    }

    /// Written only by the callback server lifecycle.
    pub fn set_https_callback(&self, address: &str, port: u16) {
        let mut inner = self.inner.lock();
        inner.https_callback_address = Some(address.to_owned());
        inner.https_callback_port = Some(port);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SessionConfig {
        SessionConfig {
            session_id: "sess-1".into(),
            address: "10.0.0.5".into(),
            port: 4723,
            callback_address: None,
            callback_port: None,
            udid: Some("real-udid".into()),
            sim_udid: None,
            real_device: false,
        }
    }

    #[test]
    fn callback_endpoint_falls_back_to_server_address() {
        let cfg = config();
        assert_eq!(cfg.effective_callback_address(), "10.0.0.5");
        assert_eq!(cfg.effective_callback_port(), 4723);

        let mut custom = config();
        custom.callback_address = Some("callbacks.example".into());
        custom.callback_port = Some(9100);
        assert_eq!(custom.effective_callback_address(), "callbacks.example");
        assert_eq!(custom.effective_callback_port(), 9100);
    }

    #[test]
    fn device_id_prefers_simulator() {
        let mut cfg = config();
        cfg.sim_udid = Some("sim-udid".into());
        assert_eq!(cfg.device_id(), Some("sim-udid"));
        cfg.sim_udid = None;
        assert_eq!(cfg.device_id(), Some("real-udid"));
    }

    #[test]
    fn wait_budget_defaults_to_zero() {
        let state = SessionState::new(config(), ExecutionContext::Web);
        assert_eq!(state.async_wait_ms(), 0);
        state.set_async_script_timeout(5_000);
        assert_eq!(state.async_wait_ms(), 5_000);
    }

    #[test]
    fn https_callback_requires_both_fields() {
        let state = SessionState::new(config(), ExecutionContext::Web);
        assert!(state.https_callback().is_none());
        state.set_https_callback("localhost", 9200);
        assert_eq!(state.https_callback(), Some(("localhost".into(), 9200)));
    }
}
