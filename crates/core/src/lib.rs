//! relay: out-of-band async script execution for automation sessions.
//!
//! A driver submits a script to a remote execution context that cannot
//! return its result synchronously; the result arrives later as an HTTP
//! callback to a short-lived local server. This crate is the driver-facing
//! surface: dispatching `execute`/`executeAsync` to the right transport,
//! correlating the inbound callback with the original caller, and the axum
//! route that receives the callback.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use relay::{AsyncSubmission, ScriptExecutor};
//! use serde_json::json;
//!
//! # async fn demo(executor: Arc<ScriptExecutor>) -> relay::Result<()> {
//! let submission = executor
//!     .execute_async("done(document.title)", json!([]), None)
//!     .await?;
//! if let AsyncSubmission::Pending(waiter) = submission {
//!     let title = waiter.wait().await?;
//!     println!("{title}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod driver;
pub mod http;
pub mod mobile;

pub use driver::{AsyncSubmission, ScriptExecutor};
pub use http::{AppState, create_router, serve};
pub use mobile::MobileHandler;

pub use relay_protocol::{
    AsyncResponse, AsyncScriptOutcome, ELEMENT_KEY, ScriptFailure, W3C_ELEMENT_KEY, WireErrorKind,
    normalize_args_for_atoms,
};
pub use relay_runtime::{
    AsyncCallbackListener, AtomTransport, CallbackServer, Error, ExecutionContext, ListenerHandle,
    ListenerParts, NativeTransport, PageUrlSource, PendingResponse, ResponseWaiter, Result,
    SessionConfig, SessionState, TrustStore,
};
