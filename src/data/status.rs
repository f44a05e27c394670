//! Response-type classification for HTTP status codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification bucket for a status code.
///
/// Variants are declared in display order, which is also the `Ord` order
/// used when response types key a `BTreeMap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseType {
    /// 1xx
    Informational,
    /// 2xx
    Success,
    /// 3xx
    Redirect,
    /// 4xx
    ClientError,
    /// 5xx
    ServerError,
    /// Anything outside the HTTP status classes.
    Other,
}

impl ResponseType {
    /// Every response type, in display order.
    pub const ALL: [ResponseType; 6] = [
        ResponseType::Informational,
        ResponseType::Success,
        ResponseType::Redirect,
        ResponseType::ClientError,
        ResponseType::ServerError,
        ResponseType::Other,
    ];

    /// The key used for this response type in JSON entries.
    pub fn key(&self) -> &'static str {
        match self {
            ResponseType::Informational => "informational",
            ResponseType::Success => "success",
            ResponseType::Redirect => "redirect",
            ResponseType::ClientError => "clientError",
            ResponseType::ServerError => "serverError",
            ResponseType::Other => "other",
        }
    }

    /// Look up a response type by its JSON key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Map a status code to its response type.
///
/// Total over every `u16`: codes outside 100..=599 land in
/// [`ResponseType::Other`].
pub fn classify(code: u16) -> ResponseType {
    match code {
        100..=199 => ResponseType::Informational,
        200..=299 => ResponseType::Success,
        300..=399 => ResponseType::Redirect,
        400..=499 => ResponseType::ClientError,
        500..=599 => ResponseType::ServerError,
        _ => ResponseType::Other,
    }
}
