// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use tokio::sync::oneshot;

use crate::error::{Capability, PushError, ReporterError};
use crate::record::{ReportRecord, ReportResult};

/// A backend that test results are dispatched to.
///
/// Backends that cannot list or export return empty results there; ask
/// [`supports`](Self::supports) to tell "nothing recorded" from "not offered".
#[async_trait::async_trait]
pub trait TestReporter: Send + Sync {
    /// Hand one finished measurement to the backend.
    ///
    /// Delivery problems are not an `Err` here; they show up in the returned
    /// [`Delivery`].
    async fn put_record(&self, record: &ReportRecord) -> Result<Delivery, ReporterError>;

    fn get_all_records(&self) -> Result<Vec<ReportRecord>, ReporterError>;

    fn export_all_report_results(&self) -> Result<Vec<ReportResult>, ReporterError>;

    fn supports(&self, capability: Capability) -> bool;
}

/// Outcome of a [`TestReporter::put_record`] call.
#[derive(Debug)]
pub enum Delivery {
    /// The delivery already finished before `put_record` returned.
    Completed(Result<(), PushError>),
    /// The delivery is still running. Dropping this does not cancel it.
    Pending(oneshot::Receiver<Result<(), PushError>>),
}

impl Delivery {
    pub fn is_completed(&self) -> bool {
        matches!(self, Delivery::Completed(_))
    }

    /// Wait for the delivery to finish and return how it went.
    pub async fn outcome(self) -> Result<(), PushError> {
        match self {
            Delivery::Completed(outcome) => outcome,
            Delivery::Pending(rx) => rx.await.unwrap_or_else(|_| {
                Err(PushError::Worker(
                    "delivery ended without reporting an outcome".to_owned(),
                ))
            }),
        }
    }
}
