/*
 *     Copyright 2025 The Vigil Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use serde::Deserialize;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};
use validator::Validate;
use vigil_core::{
    error::{ErrorType, OrErr},
    Result,
};

/// NAME is the name of vgmon.
pub const NAME: &str = "vgmon";

/// Returns the default config path for vgmon.
#[inline]
pub fn default_vgmon_config_path() -> PathBuf {
    crate::default_config_dir().join("vgmon.yaml")
}

/// Returns the default log directory for vgmon.
#[inline]
pub fn default_vgmon_log_dir() -> PathBuf {
    crate::default_log_dir().join(NAME)
}

/// Returns the default cpu usage threshold above which an alert is raised.
#[inline]
pub fn default_monitor_threshold() -> f64 {
    80.0
}

/// Returns the default sampling interval between two cycles.
#[inline]
pub fn default_monitor_interval() -> Duration {
    Duration::from_secs(2)
}

/// Returns the default delay after a failed sampling cycle. It is
/// deliberately longer than the sampling interval so a persistent
/// failure cannot spin the loop at full rate.
#[inline]
pub fn default_monitor_error_backoff() -> Duration {
    Duration::from_secs(5)
}

/// Monitor is the monitor configuration for vgmon.
///
/// The threshold and the interval are not validated against each other.
/// A zero interval is accepted and simply yields an unpaced loop.
#[derive(Debug, Clone, Validate, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Monitor {
    /// Threshold is the cpu usage percentage above which an alert is raised.
    #[serde(default = "default_monitor_threshold")]
    pub threshold: f64,

    /// Interval is the sampling cadence.
    #[serde(default = "default_monitor_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// Error backoff is the fixed delay after a failed sampling cycle,
    /// independent of the interval.
    #[serde(default = "default_monitor_error_backoff", with = "humantime_serde")]
    pub error_backoff: Duration,
}

/// Monitor implements Default.
impl Default for Monitor {
    fn default() -> Self {
        Monitor {
            threshold: default_monitor_threshold(),
            interval: default_monitor_interval(),
            error_backoff: default_monitor_error_backoff(),
        }
    }
}

/// Config is the configuration for vgmon.
#[derive(Debug, Clone, Default, Validate, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Monitor is the monitor configuration for vgmon.
    #[validate]
    pub monitor: Monitor,
}

/// Config implements the config operation of vgmon.
impl Config {
    /// Load the configuration from file. A missing file is not an error,
    /// the built-in defaults apply so vgmon runs without any setup.
    #[instrument(skip_all)]
    pub async fn load(path: &PathBuf) -> Result<Config> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    "config file {} not found, using default configuration",
                    path.display()
                );
                return Ok(Config::default());
            }
            Err(err) => return Err(err.into()),
        };

        let config: Config = serde_yaml::from_str(&content).or_err(ErrorType::ConfigError)?;

        // Validate configuration.
        config.validate().or_err(ErrorType::ValidationError)?;
        Ok(config)
    }
}
