//! Script execution dispatch and async orchestration.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};

use relay_protocol::{AsyncResponse, normalize_args_for_atoms};
use relay_runtime::{
    AtomTransport, CallbackServer, Error, NativeTransport, PageUrlSource, PendingResponse,
    ResponseWaiter, Result, SessionState, TrustStore, resolve_callback_url,
};

use crate::mobile::{MobileHandler, mobile_opts, strip_mobile_marker};

/// Extra time granted for the callback to travel back after the remote
/// transport's own wait budget has elapsed.
const ASYNC_RESPONSE_GRACE: Duration = Duration::from_secs(30);

/// Outcome of an `execute_async` submission.
#[derive(Debug)]
pub enum AsyncSubmission {
    /// Native context: the native transport answered in-band.
    Immediate(Value),
    /// Web context: the result arrives later through the inbound callback;
    /// await it on the waiter.
    Pending(ResponseWaiter),
}

/// Driver-facing execution surface for one session.
///
/// Owns the single-slot rendezvous and dispatches scripts to the in-page
/// atom transport, the native automation channel, or the mobile-command
/// handler.
pub struct ScriptExecutor {
    session: Arc<SessionState>,
    pending: Arc<PendingResponse>,
    atoms: Arc<dyn AtomTransport>,
    native: Arc<dyn NativeTransport>,
    page: Arc<dyn PageUrlSource>,
    mobile: Arc<dyn MobileHandler>,
}

impl ScriptExecutor {
    pub fn new(
        session: Arc<SessionState>,
        atoms: Arc<dyn AtomTransport>,
        native: Arc<dyn NativeTransport>,
        page: Arc<dyn PageUrlSource>,
        mobile: Arc<dyn MobileHandler>,
    ) -> Self {
        Self {
            session,
            pending: Arc::new(PendingResponse::new()),
            atoms,
            native,
            page,
            mobile,
        }
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    pub fn pending(&self) -> &Arc<PendingResponse> {
        &self.pending
    }

    /// Builds the callback-server lifecycle sharing this executor's session
    /// and rendezvous, so stopping the server fails a pending script
    /// instead of leaving it to hang.
    pub fn callback_server(&self, trust: Arc<dyn TrustStore>) -> CallbackServer {
        CallbackServer::new(Arc::clone(&self.session), Arc::clone(&self.pending), trust)
    }

    /// Synchronous script execution.
    ///
    /// `mobile:`-marked scripts dispatch to the mobile-command handler with
    /// the first args element. Web context runs the script through the
    /// in-page atom with element references normalized; native context
    /// forwards the raw script and ignores args. Transport errors propagate
    /// unchanged.
    pub async fn execute(&self, script: &str, args: Value) -> Result<Value> {
        if let Some(command) = strip_mobile_marker(script) {
            return self.execute_mobile(command, mobile_opts(args)).await;
        }

        if self.session.is_web_context() {
            let args = normalize_args_for_atoms(args);
            self.atoms
                .execute_atom("execute_script", json!([script, args]))
                .await
        } else {
            self.native.send_command(script).await
        }
    }

    /// Asynchronous script execution.
    ///
    /// In a native context the script goes straight to the native transport
    /// and its in-band answer is returned; no rendezvous is involved. In a
    /// web context the callback URL is resolved, the rendezvous slot is
    /// armed *before* submission (a fast callback must not race
    /// registration), and the atom is submitted with the wait budget and
    /// callback URL. The returned waiter settles when the callback arrives,
    /// bounded by the wait budget plus a delivery grace.
    pub async fn execute_async(
        &self,
        script: &str,
        args: Value,
        session_id: Option<&str>,
    ) -> Result<AsyncSubmission> {
        if !self.session.is_web_context() {
            let value = self.native.send_command(script).await?;
            return Ok(AsyncSubmission::Immediate(value));
        }

        let response_url =
            resolve_callback_url(&self.session, self.page.as_ref(), session_id).await?;
        let session_id = session_id.unwrap_or_else(|| self.session.session_id()).to_owned();
        let args = normalize_args_for_atoms(args);
        let wait_ms = self.session.async_wait_ms();
        let timeout = Duration::from_millis(wait_ms) + ASYNC_RESPONSE_GRACE;

        let waiter = self.pending.register(&session_id, timeout);

        tracing::debug!(
            target = "relay.driver",
            session_id,
            url = %response_url,
            wait_ms,
            "submitting async script"
        );
        let submission = self
            .atoms
            .execute_atom_async(
                "execute_async_script",
                json!([script, args, wait_ms]),
                &response_url,
            )
            .await;
        if let Err(err) = submission {
            // Dropping the waiter clears the slot it registered.
            drop(waiter);
            return Err(err);
        }

        Ok(AsyncSubmission::Pending(waiter))
    }

    /// Delivers an inbound async response for this session.
    ///
    /// A delivery with no pending script, or one whose session id does not
    /// match the pending registration, is logged and discarded.
    pub fn receive_async_response(&self, status: Option<u64>, value: Value) {
        let session_id = self.session.session_id().to_owned();
        self.deliver_async_response(&session_id, AsyncResponse::new(status, value));
    }

    /// Delivers an inbound async response addressed to `session_id`.
    pub fn deliver_async_response(&self, session_id: &str, response: AsyncResponse) {
        tracing::debug!(
            target = "relay.driver",
            session_id,
            status = ?response.status,
            "received async response"
        );
        self.pending.settle(session_id, response.classify());
    }

    /// Exact-match dispatch over the supported mobile commands.
    pub async fn execute_mobile(&self, command: &str, opts: Value) -> Result<Value> {
        match command {
            "scroll" => {
                self.mobile.scroll(opts).await?;
                Ok(Value::Null)
            }
            "viewportScreenshot" => self.mobile.viewport_screenshot().await,
            other => Err(Error::UnknownCommand(format!(
                "'{other}' is not supported, only scroll and viewportScreenshot remain"
            ))),
        }
    }
}
