// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use prometheus::core::Collector;
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, Opts};

use crate::error::PushError;
use crate::record::ReportRecord;

pub static JOB_NAME: &str = "api-testing";
pub static METRIC_NAMESPACE: &str = "api_testing";
static RESPONSE_TIME_PREFIX: &str = "response_time";
static RESPONSE_TIME_HELP: &str = "The response time in milliseconds of the API.";

/// `response_time_<group>_<name>`, taken verbatim from the record.
pub fn metric_name(record: &ReportRecord) -> String {
    format!("{RESPONSE_TIME_PREFIX}_{}_{}", record.group, record.name)
}

/// Build the response time gauge for `record`.
///
/// Fails if the group or name puts the metric name outside the Prometheus
/// naming grammar.
pub fn response_time_gauge(record: &ReportRecord) -> Result<Vec<MetricFamily>, PushError> {
    let opts = Opts::new(metric_name(record), RESPONSE_TIME_HELP).namespace(METRIC_NAMESPACE);
    let gauge = Gauge::with_opts(opts).map_err(PushError::Metric)?;
    gauge.set(record.duration_millis() as f64);
    Ok(gauge.collect())
}

/// Somewhere metric families can be pushed to under a job label.
#[async_trait::async_trait]
pub trait PushTarget: Send + Sync + 'static {
    async fn push(&self, job: &str, families: Vec<MetricFamily>) -> Result<(), PushError>;
}

/// A Prometheus Pushgateway reached over HTTP.
#[derive(Clone, Debug)]
pub struct Pushgateway {
    address: String,
}

impl Pushgateway {
    /// `address` may be a full URL or a bare `host:port`, which is treated as http.
    pub fn new(address: impl Into<String>) -> Self {
        Pushgateway {
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

#[async_trait::async_trait]
impl PushTarget for Pushgateway {
    async fn push(&self, job: &str, families: Vec<MetricFamily>) -> Result<(), PushError> {
        let address = self.address.clone();
        let job = job.to_owned();
        // push_metrics uses a blocking HTTP client, which must stay off the runtime threads
        tokio::task::spawn_blocking(move || {
            prometheus::push_metrics(
                &job,
                HashMap::<String, String>::new(),
                &address,
                families,
                None,
            )
        })
        .await
        .map_err(|e| PushError::Worker(e.to_string()))?
        .map_err(PushError::Gateway)
    }
}
