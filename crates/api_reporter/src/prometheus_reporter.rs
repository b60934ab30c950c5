// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporter that turns each test record into a response time gauge and
//! pushes it to a Prometheus Pushgateway.
//!
//! Every push runs on its own task. Submissions go through a bounded queue
//! to a dispatcher, which keeps at most `max_in_flight` pushes running at
//! once. In synchronous mode `put_record` waits for its push to finish; in
//! non-blocking mode it returns as soon as the record is queued.

use std::sync::{Arc, Mutex};

use prometheus::proto::MetricFamily;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument, Span};

use crate::config::ReporterConfig;
use crate::error::{Capability, PushError, ReporterError};
use crate::pushgateway::{metric_name, response_time_gauge, PushTarget, Pushgateway, JOB_NAME};
use crate::record::{ReportRecord, ReportResult};
use crate::reporter::{Delivery, TestReporter};

struct PushJob {
    metric: String,
    families: Vec<MetricFamily>,
    done: oneshot::Sender<Result<(), PushError>>,
    // submitter's span
    span: Span,
}

pub struct PrometheusReporter {
    remote: String,
    synchronous: bool,
    // None once shut down
    queue: Mutex<Option<mpsc::Sender<PushJob>>>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl PrometheusReporter {
    /// Reporter pushing to the Pushgateway named in `config`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: &ReporterConfig) -> Self {
        let target = Arc::new(Pushgateway::new(config.pushgateway_url.clone()));
        Self::with_target(config, target)
    }

    /// Reporter delivering through `target` instead of a real Pushgateway.
    /// `config.pushgateway_url` is only kept for diagnostics.
    pub fn with_target(config: &ReporterConfig, target: Arc<dyn PushTarget>) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.clamp(1, Semaphore::MAX_PERMITS));
        let max_in_flight = config
            .max_in_flight
            .clamp(1, Semaphore::MAX_PERMITS.min(u32::MAX as usize));
        let dispatcher = tokio::spawn(dispatch(rx, target, max_in_flight as u32));

        PrometheusReporter {
            remote: config.pushgateway_url.clone(),
            synchronous: config.synchronous,
            queue: Mutex::new(Some(tx)),
            dispatcher: Mutex::new(Some(dispatcher)),
        }
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn is_synchronous(&self) -> bool {
        self.synchronous
    }

    /// Stop accepting records and wait for every queued or running push to finish.
    pub async fn shutdown(&self) {
        drop(self.queue.lock().unwrap().take());
        let dispatcher = self.dispatcher.lock().unwrap().take();
        if let Some(dispatcher) = dispatcher {
            if let Err(err) = dispatcher.await {
                warn!("Pushgateway dispatcher ended abnormally: {err}");
            }
            info!("Drained pending pushes to {}", self.remote);
        }
    }
}

#[async_trait::async_trait]
impl TestReporter for PrometheusReporter {
    async fn put_record(&self, record: &ReportRecord) -> Result<Delivery, ReporterError> {
        let queue = self
            .queue
            .lock()
            .unwrap()
            .clone()
            .ok_or(ReporterError::Closed)?;

        let families = match response_time_gauge(record) {
            Ok(families) => families,
            Err(err) => {
                report_failure(&err);
                return Ok(Delivery::Completed(Err(err)));
            }
        };

        let (done, outcome) = oneshot::channel();
        let job = PushJob {
            metric: metric_name(record),
            families,
            done,
            span: Span::current(),
        };
        queue.send(job).await.map_err(|_| ReporterError::Closed)?;

        let delivery = Delivery::Pending(outcome);
        if self.synchronous {
            Ok(Delivery::Completed(delivery.outcome().await))
        } else {
            Ok(delivery)
        }
    }

    // records are not kept; see `supports`
    fn get_all_records(&self) -> Result<Vec<ReportRecord>, ReporterError> {
        Ok(Vec::new())
    }

    fn export_all_report_results(&self) -> Result<Vec<ReportResult>, ReporterError> {
        Ok(Vec::new())
    }

    fn supports(&self, capability: Capability) -> bool {
        capability == Capability::PutRecord
    }
}

async fn dispatch(
    mut queue: mpsc::Receiver<PushJob>,
    target: Arc<dyn PushTarget>,
    max_in_flight: u32,
) {
    let slots = Arc::new(Semaphore::new(max_in_flight as usize));
    while let Some(job) = queue.recv().await {
        let Ok(slot) = slots.clone().acquire_owned().await else {
            break;
        };
        let target = target.clone();
        let PushJob {
            metric,
            families,
            done,
            span,
        } = job;
        tokio::spawn(
            async move {
                let outcome = deliver(target.as_ref(), &metric, families).await;
                // the submitter may have stopped listening
                let _ = done.send(outcome);
                drop(slot);
            }
            .instrument(span),
        );
    }
    // every slot free means every spawned push has finished
    let _ = slots.acquire_many(max_in_flight).await;
}

async fn deliver(
    target: &dyn PushTarget,
    metric: &str,
    families: Vec<MetricFamily>,
) -> Result<(), PushError> {
    debug!(metric, "pushing response time");
    let outcome = target.push(JOB_NAME, families).await;
    if let Err(err) = &outcome {
        report_failure(err);
    }
    outcome
}

fn report_failure(err: &PushError) {
    warn!("Could not push completion time to Pushgateway: {err}");
}
