//! Inbound async response body and its classification.
//!
//! The remote execution context delivers the eventual script result as a
//! `(status, value)` pair. Which error convention applies is inferred from
//! the shape: a present non-zero `status` is a legacy failure, an absent
//! `status` with a string `value.error` is a W3C failure, anything else is
//! a successful result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error_codes::WireErrorKind;

/// Decoded body of an inbound async response callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsyncResponse {
    /// Legacy numeric status; absent for W3C-convention bodies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u64>,
    /// Script result on success, or the error payload on failure.
    #[serde(default)]
    pub value: Value,
}

/// A remote script failure, already mapped into the shared taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptFailure {
    pub kind: WireErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stacktrace: Option<String>,
}

/// Classified outcome of an async script delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum AsyncScriptOutcome {
    Success(Value),
    Failure(ScriptFailure),
}

impl AsyncResponse {
    pub fn new(status: Option<u64>, value: Value) -> Self {
        Self { status, value }
    }

    /// Classifies the response per the dual-convention contract.
    ///
    /// Branch order matters: the legacy status check wins when a status is
    /// present, and the W3C branch only fires when it is absent.
    pub fn classify(&self) -> AsyncScriptOutcome {
        if let Some(status) = self.status {
            if status != 0 {
                return AsyncScriptOutcome::Failure(ScriptFailure {
                    kind: WireErrorKind::from_legacy_code(status),
                    message: field_str(&self.value, "message").unwrap_or_default(),
                    stacktrace: None,
                });
            }
            return AsyncScriptOutcome::Success(self.value.clone());
        }

        if let Some(error) = field_str(&self.value, "error") {
            return AsyncScriptOutcome::Failure(ScriptFailure {
                kind: WireErrorKind::from_w3c_code(&error),
                message: field_str(&self.value, "message").unwrap_or(error),
                stacktrace: field_str(&self.value, "stacktrace"),
            });
        }

        AsyncScriptOutcome::Success(self.value.clone())
    }
}

fn field_str(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_owned)
}
