// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// The measurement of a single API test execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    #[serde(default)]
    pub method: String,

    #[serde(default)]
    pub api: String,

    pub group: String,

    pub name: String,

    #[serde(with = "time::serde::rfc3339")]
    pub begin_time: OffsetDateTime,

    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,

    #[serde(default)]
    pub error: Option<String>,
}

impl ReportRecord {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        begin_time: OffsetDateTime,
        end_time: OffsetDateTime,
    ) -> Self {
        ReportRecord {
            method: String::new(),
            api: String::new(),
            group: group.into(),
            name: name.into(),
            begin_time,
            end_time,
            error: None,
        }
    }

    /// Elapsed time of the execution. Negative if the timestamps are swapped;
    /// nothing here checks for that.
    pub fn duration(&self) -> Duration {
        self.end_time - self.begin_time
    }

    /// Elapsed time truncated toward zero to whole milliseconds.
    pub fn duration_millis(&self) -> i128 {
        self.duration().whole_milliseconds()
    }
}

/// Per-API summary across many records. Reporters that cannot aggregate
/// never produce one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportResult {
    pub name: String,
    pub api: String,
    pub count: usize,
    pub average: std::time::Duration,
    pub max: std::time::Duration,
    pub min: std::time::Duration,
    pub qps: usize,
    pub error: usize,
    pub last_error_message: String,
}
