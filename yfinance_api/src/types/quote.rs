//! Wire types for the `/v7/finance/quote` snapshot endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuoteResponse {
    #[serde(rename = "quoteResponse")]
    pub quote_response: QuoteResult,
}

/// Snapshot results are kept as raw JSON objects: the field set varies by
/// instrument type and is passed through to callers untouched.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuoteResult {
    #[serde(default)]
    pub result: Vec<Map<String, Value>>,
    #[serde(default)]
    pub error: Option<Value>,
}
