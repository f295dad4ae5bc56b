//! Request cache keys.
//!
//! A key is the upper-cased method, the URL, and a canonical serialization of
//! the request parameters. Object keys are sorted recursively so parameter
//! order never changes the key.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// Identity of a cacheable request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    method: String,
    url: String,
    params: String,
}

impl RequestKey {
    pub fn new(method: &str, url: &str, params: Option<&Value>) -> Self {
        Self {
            method: method.trim().to_ascii_uppercase(),
            url: url.to_string(),
            params: params.map(canonical_params).unwrap_or_default(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn params(&self) -> &str {
        &self.params
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{} {}", self.method, self.url)
        } else {
            write!(f, "{} {} {}", self.method, self.url, self.params)
        }
    }
}

/// Serialize params with object keys in sorted order. `null` and `{}` both
/// mean "no params".
pub fn canonical_params(params: &Value) -> String {
    match params {
        Value::Null => String::new(),
        Value::Object(map) if map.is_empty() => String::new(),
        other => canonicalize(other).to_string(),
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, canonicalize(v))).collect();
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k.clone(), v))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
