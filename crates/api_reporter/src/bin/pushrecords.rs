// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use api_reporter::{load_config, PrometheusReporter, ReportRecord, ReporterConfig, TestReporter};

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Push API test response times from a JSON file of records to a Prometheus Pushgateway."
)]
struct Opts {
    #[arg(long, env = "CONFIG", help = "Path to a JSON reporter config.")]
    config: Option<PathBuf>,

    #[arg(
        long,
        env = "PUSHGATEWAY_URL",
        value_name = "ADDR",
        help = "Pushgateway address, overrides the config file."
    )]
    remote: Option<String>,

    #[arg(long, help = "Wait for each push before submitting the next record.")]
    sync: bool,

    #[arg(value_name = "RECORDS", help = "JSON array of test records.")]
    records: PathBuf,
}

/// Filter from `RUST_LOG` directives, INFO when none are given.
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives)
}

fn reporter_config(opts: &Opts) -> anyhow::Result<ReporterConfig> {
    let config = match &opts.config {
        Some(path) => load_config(path)?,
        None => ReporterConfig::default(),
    };
    Ok(config.with_overrides(opts.remote.clone(), opts.sync))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&directives))
        .init();

    let opts = Opts::parse();
    let config = reporter_config(&opts)?;

    let contents = std::fs::read_to_string(&opts.records)
        .with_context(|| format!("Could not read {}", opts.records.display()))?;
    let records: Vec<ReportRecord> =
        serde_json::from_str(&contents).context("Could not parse records")?;

    info!(
        "Pushing {} records to {}",
        records.len(),
        config.pushgateway_url
    );

    let reporter = PrometheusReporter::new(&config);
    let mut deliveries = Vec::with_capacity(records.len());
    for record in &records {
        deliveries.push(reporter.put_record(record).await?);
    }
    reporter.shutdown().await;

    let mut failed = 0;
    for delivery in deliveries {
        if delivery.outcome().await.is_err() {
            failed += 1;
        }
    }
    info!("Pushed {} of {} records", records.len() - failed, records.len());

    Ok(())
}
