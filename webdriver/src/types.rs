//! WebDriver wire types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value as Json, json};
use tzweb::Locator;

use crate::error::WireError;

/// Key under which the protocol serialises a web element reference.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Enter key in the protocol's key encoding.
pub const ENTER: char = '\u{E007}';

/// Every response body is wrapped in `{"value": ...}`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub value: T,
}

/// Error object returned with a non-2xx status.
#[derive(Debug, Deserialize)]
pub struct ErrorValue {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

/// Reply to `POST /session`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub session_id: String,
    #[serde(default)]
    pub capabilities: Json,
}

/// Opaque handle to an element on the page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf")]
    pub id: String,
}

impl ElementRef {
    /// The element as a script argument.
    pub fn as_arg(&self) -> Json {
        json!({ ELEMENT_KEY: self.id })
    }
}

/// Body of the find-element commands.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FindRequest {
    pub using: &'static str,
    pub value: String,
}

impl FindRequest {
    pub fn new(locator: &Locator) -> Self {
        match locator {
            Locator::Id(id) => FindRequest {
                using: "css selector",
                value: format!("[id=\"{}\"]", id.replace('\\', "\\\\").replace('"', "\\\"")),
            },
            Locator::XPath(expr) => FindRequest {
                using: "xpath",
                value: expr.clone(),
            },
        }
    }

    /// Relative XPath search under another element.
    pub fn xpath(expr: impl Into<String>) -> Self {
        FindRequest {
            using: "xpath",
            value: expr.into(),
        }
    }
}

/// Body of `POST /session/{id}/execute/sync`.
#[derive(Debug, Serialize)]
pub struct ScriptRequest<'a> {
    pub script: &'a str,
    pub args: Vec<Json>,
}

/// Body of `POST /session/{id}/window/rect`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowRect {
    pub width: u32,
    pub height: u32,
}

/// Decode a driver reply from its HTTP status and body.
pub fn parse_response<T: DeserializeOwned>(success: bool, body: &str) -> Result<T, WireError> {
    if !success {
        return match serde_json::from_str::<Envelope<ErrorValue>>(body) {
            Ok(env) => Err(WireError::Protocol {
                error: env.value.error,
                message: env.value.message,
            }),
            Err(_) => Err(WireError::Decode(format!("unexpected error body: {body}"))),
        };
    }
    serde_json::from_str::<Envelope<T>>(body)
        .map(|env| env.value)
        .map_err(|e| WireError::Decode(e.to_string()))
}
