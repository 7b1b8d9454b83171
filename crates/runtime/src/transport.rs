//! Seam traits for the remote execution transports.
//!
//! The embedding driver supplies these. The runtime never talks to a page
//! or a native automation channel directly; it only needs the contracts
//! below.

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::Result;

/// In-page atom execution.
#[async_trait]
pub trait AtomTransport: Send + Sync {
    /// Runs an atom synchronously and returns its result.
    async fn execute_atom(&self, atom: &str, args: Value) -> Result<Value>;

    /// Submits an atom whose result will arrive later at `response_url`.
    ///
    /// Returns once the remote transport acknowledges receipt of the
    /// request; the script result itself is delivered out-of-band.
    async fn execute_atom_async(&self, atom: &str, args: Value, response_url: &Url) -> Result<()>;
}

/// Native UI-automation command channel.
#[async_trait]
pub trait NativeTransport: Send + Sync {
    async fn send_command(&self, script: &str) -> Result<Value>;
}

/// Best-effort access to the current page URL.
///
/// Failures here are expected (no page, navigation in flight) and callers
/// treat them as "keep the defaults", never as fatal.
#[async_trait]
pub trait PageUrlSource: Send + Sync {
    async fn current_url(&self) -> Result<String>;
}
