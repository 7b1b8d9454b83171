//! The two wire error-code conventions and their shared taxonomy.
//!
//! Remote script failures arrive encoded one of two ways: a legacy numeric
//! status code, or a W3C string error code. Both tables below are fixed by
//! the wire protocol being emulated; unknown inputs fall through to
//! [`WireErrorKind::UnknownError`] rather than failing the lookup.

use serde::{Deserialize, Serialize};

/// Shared error taxonomy produced by both wire conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WireErrorKind {
    NoSuchDriver,
    NoSuchElement,
    NoSuchFrame,
    UnknownCommand,
    StaleElementReference,
    ElementNotVisible,
    InvalidElementState,
    UnknownError,
    ElementIsNotSelectable,
    ElementClickIntercepted,
    ElementNotInteractable,
    InsecureCertificate,
    InvalidArgument,
    JavaScriptError,
    XPathLookupError,
    Timeout,
    NoSuchWindow,
    InvalidCookieDomain,
    UnableToSetCookie,
    UnexpectedAlertOpen,
    NoAlertOpen,
    NoSuchCookie,
    ScriptTimeout,
    InvalidElementCoordinates,
    ImeNotAvailable,
    ImeEngineActivationFailed,
    InvalidSelector,
    InvalidSessionId,
    SessionNotCreated,
    MoveTargetOutOfBounds,
    UnableToCaptureScreen,
    UnknownMethod,
    UnsupportedOperation,
}

impl WireErrorKind {
    /// Maps a legacy numeric status code to its taxonomy kind.
    ///
    /// Status `0` is success and never reaches this table; callers check
    /// that before mapping.
    pub fn from_legacy_code(code: u64) -> Self {
        match code {
            6 => Self::NoSuchDriver,
            7 => Self::NoSuchElement,
            8 => Self::NoSuchFrame,
            9 => Self::UnknownCommand,
            10 => Self::StaleElementReference,
            11 => Self::ElementNotVisible,
            12 => Self::InvalidElementState,
            13 => Self::UnknownError,
            15 => Self::ElementIsNotSelectable,
            17 => Self::JavaScriptError,
            19 => Self::XPathLookupError,
            21 => Self::Timeout,
            23 => Self::NoSuchWindow,
            24 => Self::InvalidCookieDomain,
            25 => Self::UnableToSetCookie,
            26 => Self::UnexpectedAlertOpen,
            27 => Self::NoAlertOpen,
            28 => Self::ScriptTimeout,
            29 => Self::InvalidElementCoordinates,
            30 => Self::ImeNotAvailable,
            31 => Self::ImeEngineActivationFailed,
            32 => Self::InvalidSelector,
            33 => Self::SessionNotCreated,
            34 => Self::MoveTargetOutOfBounds,
            _ => Self::UnknownError,
        }
    }

    /// Maps a W3C string error code to its taxonomy kind.
    pub fn from_w3c_code(code: &str) -> Self {
        match code {
            "element click intercepted" => Self::ElementClickIntercepted,
            "element not interactable" => Self::ElementNotInteractable,
            "element not selectable" => Self::ElementIsNotSelectable,
            "element not visible" => Self::ElementNotVisible,
            "insecure certificate" => Self::InsecureCertificate,
            "invalid argument" => Self::InvalidArgument,
            "invalid cookie domain" => Self::InvalidCookieDomain,
            "invalid coordinates" => Self::InvalidElementCoordinates,
            "invalid element state" => Self::InvalidElementState,
            "invalid selector" => Self::InvalidSelector,
            "invalid session id" => Self::InvalidSessionId,
            "javascript error" => Self::JavaScriptError,
            "move target out of bounds" => Self::MoveTargetOutOfBounds,
            "no such alert" => Self::NoAlertOpen,
            "no such cookie" => Self::NoSuchCookie,
            "no such driver" => Self::NoSuchDriver,
            "no such element" => Self::NoSuchElement,
            "no such frame" => Self::NoSuchFrame,
            "no such window" => Self::NoSuchWindow,
            "script timeout" => Self::ScriptTimeout,
            "session not created" => Self::SessionNotCreated,
            "stale element reference" => Self::StaleElementReference,
            "timeout" => Self::Timeout,
            "unable to capture screen" => Self::UnableToCaptureScreen,
            "unable to set cookie" => Self::UnableToSetCookie,
            "unexpected alert open" => Self::UnexpectedAlertOpen,
            "unknown command" => Self::UnknownCommand,
            "unknown error" => Self::UnknownError,
            "unknown method" => Self::UnknownMethod,
            "unsupported operation" => Self::UnsupportedOperation,
            _ => Self::UnknownError,
        }
    }

    /// Stable human-readable name used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSuchDriver => "no such driver",
            Self::NoSuchElement => "no such element",
            Self::NoSuchFrame => "no such frame",
            Self::UnknownCommand => "unknown command",
            Self::StaleElementReference => "stale element reference",
            Self::ElementNotVisible => "element not visible",
            Self::InvalidElementState => "invalid element state",
            Self::UnknownError => "unknown error",
            Self::ElementIsNotSelectable => "element not selectable",
            Self::ElementClickIntercepted => "element click intercepted",
            Self::ElementNotInteractable => "element not interactable",
            Self::InsecureCertificate => "insecure certificate",
            Self::InvalidArgument => "invalid argument",
            Self::JavaScriptError => "javascript error",
            Self::XPathLookupError => "xpath lookup error",
            Self::Timeout => "timeout",
            Self::NoSuchWindow => "no such window",
            Self::InvalidCookieDomain => "invalid cookie domain",
            Self::UnableToSetCookie => "unable to set cookie",
            Self::UnexpectedAlertOpen => "unexpected alert open",
            Self::NoAlertOpen => "no such alert",
            Self::NoSuchCookie => "no such cookie",
            Self::ScriptTimeout => "script timeout",
            Self::InvalidElementCoordinates => "invalid coordinates",
            Self::ImeNotAvailable => "ime not available",
            Self::ImeEngineActivationFailed => "ime engine activation failed",
            Self::InvalidSelector => "invalid selector",
            Self::InvalidSessionId => "invalid session id",
            Self::SessionNotCreated => "session not created",
            Self::MoveTargetOutOfBounds => "move target out of bounds",
            Self::UnableToCaptureScreen => "unable to capture screen",
            Self::UnknownMethod => "unknown method",
            Self::UnsupportedOperation => "unsupported operation",
        }
    }
}

impl std::fmt::Display for WireErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
