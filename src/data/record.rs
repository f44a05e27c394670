//! Normalized route records and their per-route entries.
//!
//! A [`RouteUrlEntry`] arrives as a flat JSON object such as
//! `{"url": "GET /", "totalResponseTime": 650, "200": 3}`. On the way in the
//! keys are sorted into typed buckets: integer keys are status-code counts,
//! response-type keys (`success`, `clientError`, ...) are pre-aggregated
//! counts, and anything unrecognised is kept verbatim in `extra`. Serializing
//! writes the same flat shape back out.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::status::ResponseType;

const URL_KEY: &str = "url";
const TOTAL_RESPONSE_TIME_KEY: &str = "totalResponseTime";
const RESPONSE_TIME_KEY: &str = "responseTime";

/// Request counts and timing for one route within one record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct RouteUrlEntry {
    /// Route identifier, e.g. `"GET /users"`.
    pub url: String,
    /// Sum of response times across every request on this route.
    pub total_response_time: f64,
    /// Request count per status code.
    pub status_codes: BTreeMap<u16, u64>,
    /// Request count per response type.
    ///
    /// Empty on fresh input; filled in by [`build_cache`](super::derive::build_cache).
    pub response_types: BTreeMap<ResponseType, u64>,
    /// Average response time, once derived.
    ///
    /// `Some(non-finite)` means the route saw no requests in this scope.
    pub response_time: Option<f64>,
    /// Other per-route keys, carried through untouched.
    pub extra: Map<String, Value>,
}

impl RouteUrlEntry {
    /// Create an empty entry for a route.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Builder-style helper to add requests for a status code.
    pub fn with_status(mut self, code: u16, count: u64) -> Self {
        *self.status_codes.entry(code).or_insert(0) += count;
        self
    }

    /// Builder-style helper to set the total response time.
    pub fn with_total_response_time(mut self, total: f64) -> Self {
        self.total_response_time = total;
        self
    }

    /// Requests on this entry, counted from its status-code fields only.
    pub fn status_requests(&self) -> u64 {
        self.status_codes.values().sum()
    }

    /// Requests on this entry, counted from its response-type fields only.
    pub fn response_type_requests(&self) -> u64 {
        self.response_types.values().sum()
    }
}

/// Read a count, treating anything that isn't a non-negative number as zero.
fn count_value(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        _ => 0,
    }
}

impl From<Map<String, Value>> for RouteUrlEntry {
    fn from(fields: Map<String, Value>) -> Self {
        let mut entry = RouteUrlEntry::default();

        for (key, value) in fields {
            match key.as_str() {
                URL_KEY => {
                    entry.url = match value {
                        Value::String(s) => s,
                        Value::Null => String::new(),
                        other => other.to_string(),
                    }
                }
                TOTAL_RESPONSE_TIME_KEY => entry.total_response_time = value.as_f64().unwrap_or(0.0),
                RESPONSE_TIME_KEY => entry.response_time = value.as_f64(),
                _ => {
                    if let Ok(code) = key.parse::<u16>() {
                        *entry.status_codes.entry(code).or_insert(0) += count_value(&value);
                    } else if let Some(kind) = ResponseType::from_key(&key) {
                        *entry.response_types.entry(kind).or_insert(0) += count_value(&value);
                    } else {
                        entry.extra.insert(key, value);
                    }
                }
            }
        }

        entry
    }
}

impl Serialize for RouteUrlEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(URL_KEY, &self.url)?;
        map.serialize_entry(TOTAL_RESPONSE_TIME_KEY, &self.total_response_time)?;
        for (code, count) in &self.status_codes {
            map.serialize_entry(&code.to_string(), count)?;
        }
        for (kind, count) in &self.response_types {
            map.serialize_entry(kind.key(), count)?;
        }
        // serde_json writes non-finite floats as null, i.e. "no data"
        if let Some(response_time) = self.response_time {
            map.serialize_entry(RESPONSE_TIME_KEY, &response_time)?;
        }
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// One instance's per-route counts at one snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    pub instance: String,
    pub created_at: DateTime<Utc>,
    pub urls: Vec<RouteUrlEntry>,
    /// Instances folded into this row by the instance merger, in fold order.
    #[serde(rename = "mergedInstance", skip_serializing_if = "Vec::is_empty")]
    pub merged_instances: Vec<String>,
    /// Record-level request count per response type (derived).
    #[serde(flatten)]
    pub response_types: BTreeMap<ResponseType, u64>,
    /// Record-level average response time (derived).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
}

impl RouteRecord {
    pub fn new(instance: impl Into<String>, created_at: DateTime<Utc>, urls: Vec<RouteUrlEntry>) -> Self {
        Self {
            instance: instance.into(),
            created_at,
            urls,
            merged_instances: Vec::new(),
            response_types: BTreeMap::new(),
            response_time: None,
        }
    }

    /// Look up the entry for a route.
    pub fn entry(&self, url: &str) -> Option<&RouteUrlEntry> {
        self.urls.iter().find(|e| e.url == url)
    }
}
