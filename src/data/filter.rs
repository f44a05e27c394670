//! View filters over normalized route records.
//!
//! Each filter works along one axis (route, instance, status code) and never
//! drops a record: rows that don't match keep their instance and timestamp
//! with an emptied `urls` list, so charts can show "no data" for that row.
//! `None`, `""` and `"*"` all mean "no filtering".

use serde::{Deserialize, Serialize};

use super::record::RouteRecord;

/// Returns the filter value, or `None` if it is a wildcard.
fn active(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !matches!(*v, "" | "*"))
}

/// Keep only the entry for `route` in each record.
pub fn filter_by_route(mut records: Vec<RouteRecord>, route: Option<&str>) -> Vec<RouteRecord> {
    let Some(route) = active(route) else {
        return records;
    };

    for record in &mut records {
        let urls = std::mem::take(&mut record.urls);
        record.urls = urls.into_iter().filter(|e| e.url == route).take(1).collect();
    }
    records
}

/// Empty the entries of every record not from `instance`.
pub fn filter_by_instance(mut records: Vec<RouteRecord>, instance: Option<&str>) -> Vec<RouteRecord> {
    let Some(instance) = active(instance) else {
        return records;
    };

    for record in records.iter_mut().filter(|r| r.instance != instance) {
        record.urls.clear();
    }
    records
}

/// Keep only the `code` status count in every entry.
///
/// Response-type counts and other fields are left alone. A code that isn't a
/// number matches no status field.
pub fn filter_by_status_code(mut records: Vec<RouteRecord>, code: Option<&str>) -> Vec<RouteRecord> {
    let Some(code) = active(code) else {
        return records;
    };
    let code = code.parse::<u16>().ok();

    for entry in records.iter_mut().flat_map(|r| r.urls.iter_mut()) {
        entry.status_codes.retain(|c, _| Some(*c) == code);
    }
    records
}

/// The current view selection, with wildcards normalized to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub route: Option<String>,
    pub instance: Option<String>,
    pub status_code: Option<String>,
}

impl Selection {
    pub fn new(route: Option<&str>, instance: Option<&str>, status_code: Option<&str>) -> Self {
        Self {
            route: active(route).map(str::to_string),
            instance: active(instance).map(str::to_string),
            status_code: active(status_code).map(str::to_string),
        }
    }

    /// True when no filter is active.
    pub fn is_wildcard(&self) -> bool {
        self.route.is_none() && self.instance.is_none() && self.status_code.is_none()
    }

    pub fn set_route(&mut self, route: Option<&str>) {
        self.route = active(route).map(str::to_string);
    }

    pub fn set_instance(&mut self, instance: Option<&str>) {
        self.instance = active(instance).map(str::to_string);
    }

    pub fn set_status_code(&mut self, status_code: Option<&str>) {
        self.status_code = active(status_code).map(str::to_string);
    }

    /// Run the route, instance and status-code filters in turn.
    pub fn apply(&self, records: Vec<RouteRecord>) -> Vec<RouteRecord> {
        let records = filter_by_route(records, self.route.as_deref());
        let records = filter_by_instance(records, self.instance.as_deref());
        filter_by_status_code(records, self.status_code.as_deref())
    }
}
