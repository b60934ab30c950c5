// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Operations a [`TestReporter`](crate::reporter::TestReporter) may or may not offer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    PutRecord,
    ListRecords,
    ExportResults,
}

#[derive(Debug, thiserror::Error)]
pub enum ReporterError {
    #[error("reporter has been shut down")]
    Closed,
}

/// Why a single metric did not reach the Pushgateway.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("building metric: {0}")]
    Metric(#[source] prometheus::Error),
    #[error("pushing to gateway: {0}")]
    Gateway(#[source] prometheus::Error),
    #[error("delivery task: {0}")]
    Worker(String),
}

impl PushError {
    pub fn is_metric(&self) -> bool {
        matches!(self, PushError::Metric(_))
    }
}
