use std::{num::ParseFloatError, str::Utf8Error};

use thiserror::Error;

/// Malformed field value or event payload.
///
/// The delivery is dropped, the error logged, and ingestion continues.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload on `{topic}` is not valid UTF-8")]
    NotUtf8 {
        topic: String,

        #[source]
        source: Utf8Error,
    },

    #[error("`{payload}` on `{topic}` is not a number")]
    NotNumber {
        topic: String,
        payload: String,

        #[source]
        source: ParseFloatError,
    },

    #[error("`{payload}` on `{topic}` is not a finite number")]
    NotFinite { topic: String, payload: String },

    #[error("`{payload}` on `{topic}` is not a known status")]
    UnknownStatus { topic: String, payload: String },

    #[error("malformed power-cut payload")]
    PowerCut(#[from] serde_json::Error),

    #[error("power-cut duration of {0} ms is out of range")]
    DurationOutOfRange(u64),
}

/// The durable store is unreachable or rejected the write.
///
/// Nothing retries: the caller logs it and moves on.
#[derive(Debug, Error)]
#[error("failed to write into the store: {0:#}")]
pub struct StoreWriteError(pub anyhow::Error);

/// The history query failed.
///
/// Readers fall back to the local cache and flag the result as degraded.
#[derive(Debug, Error)]
#[error("failed to read from the store: {0:#}")]
pub struct StoreReadError(pub anyhow::Error);
