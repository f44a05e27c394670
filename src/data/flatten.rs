//! Flattening of arrivals into per-instance route records.

use super::counters::Counters;
use super::record::RouteRecord;
use crate::source::Arrival;

/// Records produced from one or more arrivals, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct Flattened {
    pub routers: Vec<RouteRecord>,
    pub cloud_api: Vec<RouteRecord>,
}

/// Flatten arrivals into one router record and one cloud API record per
/// instance bucket, feeding `counters` along the way.
///
/// Counters are fed from router entries before any view filter runs, so they
/// always reflect everything ingested. Cloud API entries are not counted.
pub fn flatten(arrivals: &[Arrival], counters: &mut Counters) -> Flattened {
    let mut flattened = Flattened::default();

    for arrival in arrivals {
        for bucket in &arrival.instances {
            for entry in &bucket.routers {
                let requests = entry.status_requests();

                counters.instances.increment(&bucket.instance, requests);
                counters.routes.increment(&entry.url, requests);
                for (code, count) in &entry.status_codes {
                    counters.status_codes.increment(&code.to_string(), *count);
                }
            }

            flattened.routers.push(RouteRecord::new(
                bucket.instance.clone(),
                arrival.created_at,
                bucket.routers.clone(),
            ));
            flattened.cloud_api.push(RouteRecord::new(
                bucket.instance.clone(),
                arrival.created_at,
                bucket.cloud_api.clone(),
            ));
        }
    }

    flattened
}
