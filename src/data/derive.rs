//! Derived per-entry and per-record statistics.

use super::record::RouteRecord;
use super::status::{classify, ResponseType};

/// Fill in response-type totals and average response times, in place.
///
/// For each entry, response-type counts already present (for example from
/// pre-aggregated input) are carried into the totals as-is, then every status
/// code is classified and added. Averages are plain divisions: a scope with
/// no requests gets a non-finite `response_time` rather than zero.
///
/// The pass accumulates into entry-level response-type counts, so it should
/// run once per fresh copy of the records.
pub fn build_cache(records: &mut [RouteRecord]) {
    for record in records.iter_mut() {
        let mut record_requests: u64 = 0;
        let mut record_total_response_time = 0.0;

        record.response_types = ResponseType::ALL.into_iter().map(|t| (t, 0)).collect();

        for entry in &mut record.urls {
            for kind in ResponseType::ALL {
                entry.response_types.entry(kind).or_insert(0);
            }

            // Carried counts are read before status codes are folded in.
            let mut entry_requests: u64 = 0;
            for (kind, count) in &entry.response_types {
                *record.response_types.entry(*kind).or_insert(0) += count;
                entry_requests += count;
            }

            for (code, count) in &entry.status_codes {
                let kind = classify(*code);
                *entry.response_types.entry(kind).or_insert(0) += count;
                *record.response_types.entry(kind).or_insert(0) += count;
                entry_requests += count;
            }

            entry.response_time = Some(entry.total_response_time / entry_requests as f64);
            record_total_response_time += entry.total_response_time;
            record_requests += entry_requests;
        }

        record.response_time = Some(record_total_response_time / record_requests as f64);
    }
}
