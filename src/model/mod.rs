use data_encoding::BASE64;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod error;

/// Inbound check request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestPayload {
    pub url: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// base64 encoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// jq query, a `true` output triggers the notification
    pub query: String,
    #[serde(default)]
    pub notification_message: String,
}

/// Decoded upstream response body.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchData {
    Structured(Value),
    Raw(Vec<u8>),
}

impl FetchData {
    /// Value the query runs against. Raw bodies are exposed as a string.
    pub fn query_input(&self) -> Value {
        match self {
            FetchData::Structured(v) => v.clone(),
            FetchData::Raw(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    /// Indented JSON used as the notification attachment. Raw bodies become a
    /// base64 string.
    pub fn to_pretty_json(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            FetchData::Structured(v) => serde_json::to_vec_pretty(v),
            FetchData::Raw(bytes) => serde_json::to_vec_pretty(&BASE64.encode(bytes)),
        }
    }
}

/// Result of running a query to completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    /// last value produced before the sequence ended or short-circuited
    pub last: Option<Value>,
    pub verdict: bool,
}

impl std::fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.last {
            Some(v) => write!(f, "QueryResult: {v}"),
            None => write!(f, "QueryResult: <none>"),
        }
    }
}
