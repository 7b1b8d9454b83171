//! Runtime for out-of-band async script execution.
//!
//! This crate owns everything between "a script was submitted" and "its
//! result came back on a different code path": the session configuration and
//! its few documented mutable fields, the single-slot rendezvous that
//! correlates the inbound callback with the original caller, the resolver
//! that computes a callback URL the remote context can actually reach, and
//! the lifecycle of the TLS-capable callback listener plus device trust
//! installation.
//!
//! The transports themselves (in-page atoms, native automation channel, the
//! low-level listener, the trust store) are seam traits implemented by the
//! embedding driver.

pub mod error;
pub mod rendezvous;
pub mod resolver;
pub mod server;
pub mod session;
pub mod transport;

pub use error::{Error, Result};
pub use rendezvous::{PendingResponse, ResponseWaiter};
pub use resolver::{local_outbound_ip, resolve_callback_url};
pub use server::{AsyncCallbackListener, CallbackServer, ListenerHandle, ListenerParts, TrustStore};
pub use session::{ExecutionContext, SessionConfig, SessionState};
pub use transport::{AtomTransport, NativeTransport, PageUrlSource};
