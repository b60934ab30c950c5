// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

fn get_default_pushgateway() -> String {
    String::from("localhost:9091")
}

fn get_default_queue_capacity() -> usize {
    64
}

fn get_default_max_in_flight() -> usize {
    8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterConfig {
    #[serde(default = "get_default_pushgateway")]
    pub pushgateway_url: String,

    /// Wait for each push to finish before returning from `put_record`.
    #[serde(default)]
    pub synchronous: bool,

    /// Submissions that can wait for a free delivery slot before `put_record` blocks.
    #[serde(default = "get_default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default = "get_default_max_in_flight")]
    pub max_in_flight: usize,
}

impl ReporterConfig {
    pub fn new(pushgateway_url: impl Into<String>, synchronous: bool) -> Self {
        ReporterConfig {
            pushgateway_url: pushgateway_url.into(),
            synchronous,
            ..Default::default()
        }
    }

    /// Apply command-line choices on top of a loaded config. `--sync` can
    /// only turn synchronous mode on.
    pub fn with_overrides(mut self, remote: Option<String>, synchronous: bool) -> Self {
        if let Some(remote) = remote {
            self.pushgateway_url = remote;
        }
        self.synchronous |= synchronous;
        self
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        ReporterConfig {
            pushgateway_url: get_default_pushgateway(),
            synchronous: false,
            queue_capacity: get_default_queue_capacity(),
            max_in_flight: get_default_max_in_flight(),
        }
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<ReporterConfig> {
    let mut file = File::open(path)
        .with_context(|| format!("{} does not exist or could not be opened", path.display()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .context("Could not read JSON file")?;

    let config: ReporterConfig =
        serde_json::from_str(&contents).context("Could not parse JSON file")?;

    if config.pushgateway_url.is_empty() {
        return Err(anyhow!("pushgateway_url must not be empty"));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_object_uses_defaults() {
        let file = write_config("{}");
        assert_eq!(load_config(file.path()).unwrap(), ReporterConfig::default());
    }

    #[test]
    fn fields_override_defaults() {
        let file = write_config(
            r#"{"pushgateway_url": "http://gateway:9091", "synchronous": true, "max_in_flight": 2}"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.pushgateway_url, "http://gateway:9091");
        assert!(config.synchronous);
        assert_eq!(config.max_in_flight, 2);
        assert_eq!(config.queue_capacity, 64);
    }

    #[test]
    fn overrides_replace_remote_and_enable_sync() {
        let config = ReporterConfig::new("localhost:9091", false)
            .with_overrides(Some("gateway:9091".to_owned()), true);
        assert_eq!(config.pushgateway_url, "gateway:9091");
        assert!(config.synchronous);
    }

    #[test]
    fn missing_overrides_keep_the_config() {
        let config = ReporterConfig::new("gateway:9091", true).with_overrides(None, false);
        assert_eq!(config, ReporterConfig::new("gateway:9091", true));
    }

    #[test]
    fn empty_url_is_rejected() {
        let file = write_config(r#"{"pushgateway_url": ""}"#);
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("nope.json")).is_err());
    }
}
