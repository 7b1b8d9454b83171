//! Wire types for the out-of-band async script response protocol.
//!
//! Everything here is pure data: the two coexisting error-code conventions
//! (legacy numeric statuses and W3C string codes), the inbound response body,
//! and the element-reference rewriting applied to script arguments before
//! they are handed to the in-page atom transport. No I/O, no session state.

pub mod async_response;
pub mod element;
pub mod error_codes;

pub use async_response::{AsyncResponse, AsyncScriptOutcome, ScriptFailure};
pub use element::{ELEMENT_KEY, W3C_ELEMENT_KEY, normalize_args_for_atoms};
pub use error_codes::WireErrorKind;
