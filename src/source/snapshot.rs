//! Shared types for request-log snapshots.
//!
//! These types match the JSON produced by the log collector. A bulk load is
//! an array of [`Arrival`]s; a real-time event is a single
//! [`InstanceBucket`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::RouteUrlEntry;

/// One delivered unit of snapshot data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrival {
    /// Per-instance slices of this arrival.
    #[serde(default)]
    pub instances: Vec<InstanceBucket>,

    /// When the snapshot was taken. Defaults to the time of receipt.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Arrival {
    pub fn new(instances: Vec<InstanceBucket>, created_at: DateTime<Utc>) -> Self {
        Self {
            instances,
            created_at,
        }
    }
}

/// The per-service-instance slice of an arrival.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceBucket {
    /// Name of the service instance.
    #[serde(default)]
    pub instance: String,

    /// Per-route counters for requests served by the instance.
    #[serde(default)]
    pub routers: Vec<RouteUrlEntry>,

    /// Per-route counters for cloud API calls made by the instance.
    #[serde(default)]
    pub cloud_api: Vec<RouteUrlEntry>,
}

impl InstanceBucket {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            ..Self::default()
        }
    }

    /// True when the bucket carries neither router nor cloud API data.
    pub fn is_empty(&self) -> bool {
        self.routers.is_empty() && self.cloud_api.is_empty()
    }
}

/// How a source delivers data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestMode {
    /// A single batch of historical arrivals.
    Bulk,
    /// An unbounded stream of single-instance events.
    Realtime,
}

/// What a [`DataSource`](super::DataSource) hands back from `poll`.
#[derive(Debug, Clone)]
pub enum Delivery {
    /// A bulk batch of arrivals.
    Batch(Vec<Arrival>),
    /// One real-time event, stamped on ingestion.
    Event(InstanceBucket),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_arrival() {
        let json = r#"{
            "createdAt": "2024-03-01T10:00:00Z",
            "instances": [
                {
                    "instance": "web-1",
                    "routers": [
                        { "url": "GET /", "totalResponseTime": 650, "200": 3 }
                    ],
                    "cloudApi": [
                        { "url": "POST /1.1/classes/Todo", "totalResponseTime": 40, "201": 2 }
                    ]
                }
            ]
        }"#;

        let arrival: Arrival = serde_json::from_str(json).unwrap();
        assert_eq!(arrival.created_at.to_rfc3339(), "2024-03-01T10:00:00+00:00");
        assert_eq!(arrival.instances.len(), 1);

        let bucket = &arrival.instances[0];
        assert_eq!(bucket.instance, "web-1");
        assert_eq!(bucket.routers[0].status_codes.get(&200), Some(&3));
        assert_eq!(bucket.cloud_api[0].url, "POST /1.1/classes/Todo");
    }

    #[test]
    fn test_deserialize_bucket_with_missing_fields() {
        let bucket: InstanceBucket = serde_json::from_str(r#"{"instance": "web-2"}"#).unwrap();
        assert_eq!(bucket.instance, "web-2");
        assert!(bucket.is_empty());
    }

    #[test]
    fn test_missing_created_at_defaults_to_now() {
        let before = Utc::now();
        let arrival: Arrival = serde_json::from_str(r#"{"instances": []}"#).unwrap();
        assert!(arrival.created_at >= before);
    }
}
