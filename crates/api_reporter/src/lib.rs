// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod config;
pub mod error;
pub mod prometheus_reporter;
pub mod pushgateway;
pub mod record;
pub mod reporter;

pub use config::{load_config, ReporterConfig};
pub use error::{Capability, PushError, ReporterError};
pub use prometheus_reporter::PrometheusReporter;
pub use pushgateway::{PushTarget, Pushgateway};
pub use record::{ReportRecord, ReportResult};
pub use reporter::{Delivery, TestReporter};
