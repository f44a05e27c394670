//! Folding of consecutive records from different instances into one row.
//!
//! The merger walks records in arrival order and keeps the last output row
//! open. A record is folded into the open row when it comes from another
//! instance and that instance has not already been folded into the row;
//! otherwise it opens a new row. Records from one snapshot time usually sit
//! next to each other, so this yields roughly one row per time bucket.
//!
//! The decision depends only on the open row, not on timestamps.

use super::record::{RouteRecord, RouteUrlEntry};

/// Fold consecutive records from distinct instances into shared rows.
pub fn merge_instances(records: Vec<RouteRecord>) -> Vec<RouteRecord> {
    records.into_iter().fold(Vec::new(), |mut merged: Vec<RouteRecord>, record| {
        let open = merged.last_mut().filter(|open: &&mut RouteRecord| {
            open.instance != record.instance && !open.merged_instances.contains(&record.instance)
        });

        if let Some(open) = open {
            merge_urls(&mut open.urls, record.urls);
            open.merged_instances.push(record.instance);
        } else {
            merged.push(record);
        }
        merged
    })
}

/// Merge route entries into `target`, matching by route.
///
/// Matched entries have their counts and response times summed; unmatched
/// entries are appended.
pub fn merge_urls(target: &mut Vec<RouteUrlEntry>, incoming: Vec<RouteUrlEntry>) {
    for entry in incoming {
        match target.iter_mut().find(|t| t.url == entry.url) {
            Some(existing) => absorb(existing, entry),
            None => target.push(entry),
        }
    }
}

fn absorb(target: &mut RouteUrlEntry, entry: RouteUrlEntry) {
    target.total_response_time += entry.total_response_time;
    for (code, count) in entry.status_codes {
        *target.status_codes.entry(code).or_insert(0) += count;
    }
    for (kind, count) in entry.response_types {
        *target.response_types.entry(kind).or_insert(0) += count;
    }
    for (key, value) in entry.extra {
        target.extra.entry(key).or_insert(value);
    }
}
