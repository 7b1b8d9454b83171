//! Shared test doubles for the executor's transport seams.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use url::Url;

use relay::{
    AtomTransport, Error, ExecutionContext, MobileHandler, NativeTransport, PageUrlSource, Result,
    ScriptExecutor, SessionConfig, SessionState,
};

#[derive(Default)]
pub struct FakeAtoms {
    pub sync_calls: Mutex<Vec<(String, Value)>>,
    pub async_calls: Mutex<Vec<(String, Value, String)>>,
    pub fail_async: AtomicBool,
}

#[async_trait]
impl AtomTransport for FakeAtoms {
    async fn execute_atom(&self, atom: &str, args: Value) -> Result<Value> {
        self.sync_calls.lock().push((atom.to_owned(), args));
        Ok(json!("atom-ok"))
    }

    async fn execute_atom_async(&self, atom: &str, args: Value, response_url: &Url) -> Result<()> {
        self.async_calls
            .lock()
            .push((atom.to_owned(), args, response_url.to_string()));
        if self.fail_async.load(Ordering::SeqCst) {
            return Err(Error::Transport("submission refused".into()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeNative {
    pub commands: Mutex<Vec<String>>,
}

#[async_trait]
impl NativeTransport for FakeNative {
    async fn send_command(&self, script: &str) -> Result<Value> {
        self.commands.lock().push(script.to_owned());
        Ok(json!("native-ok"))
    }
}

pub struct FakePage(pub Option<String>);

#[async_trait]
impl PageUrlSource for FakePage {
    async fn current_url(&self) -> Result<String> {
        self.0
            .clone()
            .ok_or_else(|| Error::Transport("no page".into()))
    }
}

#[derive(Default)]
pub struct FakeMobile {
    pub scrolls: Mutex<Vec<Value>>,
}

#[async_trait]
impl MobileHandler for FakeMobile {
    async fn scroll(&self, opts: Value) -> Result<()> {
        self.scrolls.lock().push(opts);
        Ok(())
    }

    async fn viewport_screenshot(&self) -> Result<Value> {
        Ok(json!("screenshot-bytes"))
    }
}

pub struct Harness {
    pub executor: Arc<ScriptExecutor>,
    pub atoms: Arc<FakeAtoms>,
    pub native: Arc<FakeNative>,
    pub mobile: Arc<FakeMobile>,
    pub session: Arc<SessionState>,
}

pub fn harness(context: ExecutionContext) -> Harness {
    let session = Arc::new(SessionState::new(
        SessionConfig {
            session_id: "sess-1".into(),
            address: "127.0.0.1".into(),
            port: 4723,
            callback_address: None,
            callback_port: None,
            udid: Some("device-udid".into()),
            sim_udid: None,
            real_device: false,
        },
        context,
    ));
    let atoms = Arc::new(FakeAtoms::default());
    let native = Arc::new(FakeNative::default());
    let mobile = Arc::new(FakeMobile::default());
    let page = Arc::new(FakePage(Some("http://example.com/".into())));

    let executor = Arc::new(ScriptExecutor::new(
        Arc::clone(&session),
        Arc::clone(&atoms) as Arc<dyn AtomTransport>,
        Arc::clone(&native) as Arc<dyn NativeTransport>,
        page,
        Arc::clone(&mobile) as Arc<dyn MobileHandler>,
    ));

    Harness {
        executor,
        atoms,
        native,
        mobile,
        session,
    }
}
