//! `mobile:` command parsing and dispatch seam.

use async_trait::async_trait;
use serde_json::Value;

use relay_runtime::Result;

/// Marker prefixing scripts that are really mobile commands.
pub const MOBILE_MARKER: &str = "mobile:";

/// Returns the command name when `script` carries the mobile marker.
///
/// The marker is case-sensitive; surrounding whitespace is tolerated and
/// stripped from the command.
pub fn strip_mobile_marker(script: &str) -> Option<&str> {
    script.trim_start().strip_prefix(MOBILE_MARKER).map(str::trim)
}

/// Mobile-command options: the first element when args is a sequence, the
/// args value itself otherwise.
pub fn mobile_opts(args: Value) -> Value {
    match args {
        Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
        other => other,
    }
}

/// Handler for the supported mobile commands.
#[async_trait]
pub trait MobileHandler: Send + Sync {
    async fn scroll(&self, opts: Value) -> Result<()>;
    async fn viewport_screenshot(&self) -> Result<Value>;
}
