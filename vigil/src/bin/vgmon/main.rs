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

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, Level};
use vigil::monitor::{CpuSource, Monitor};
use vigil::shutdown;
use vigil::tracing::init_tracing;
use vigil_config::vgmon;

#[derive(Debug, Parser)]
#[command(
    name = vgmon::NAME,
    author,
    version,
    about = "vgmon is a server health monitor",
    long_about = "A server health monitor that periodically samples the cpu usage of the host, \
    prints a status line for every sample and raises an alert when the usage exceeds the configured \
    threshold. A failed sample is reported and retried after a fixed backoff delay."
)]
struct Args {
    #[arg(
        short = 'c',
        long = "config",
        default_value_os_t = vgmon::default_vgmon_config_path(),
        help = "Specify config file to use")
    ]
    config: PathBuf,

    #[arg(
        long = "threshold",
        help = "Specify the cpu usage percentage above which an alert is raised, overriding the config file"
    )]
    threshold: Option<f64>,

    #[arg(
        long = "interval",
        value_parser = humantime::parse_duration,
        help = "Specify the sampling interval, overriding the config file"
    )]
    interval: Option<Duration>,

    #[arg(
        long = "error-backoff",
        value_parser = humantime::parse_duration,
        help = "Specify the delay before resuming after a failed sample, overriding the config file"
    )]
    error_backoff: Option<Duration>,

    #[arg(
        short = 'l',
        long,
        default_value = "info",
        help = "Specify the logging level [trace, debug, info, warn, error]"
    )]
    log_level: Level,

    #[arg(
        long,
        default_value_os_t = vgmon::default_vgmon_log_dir(),
        help = "Specify the log directory"
    )]
    log_dir: PathBuf,

    #[arg(
        long,
        default_value_t = 24,
        help = "Specify the max number of log files"
    )]
    log_max_files: usize,

    #[arg(
        long = "verbose",
        default_value_t = false,
        help = "Specify whether to print log"
    )]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Parse command line arguments.
    let args = Args::parse();

    // Load config.
    let mut config = vgmon::Config::load(&args.config).await?;

    // Override config with command line arguments.
    if let Some(threshold) = args.threshold {
        config.monitor.threshold = threshold;
    }

    if let Some(interval) = args.interval {
        config.monitor.interval = interval;
    }

    if let Some(error_backoff) = args.error_backoff {
        config.monitor.error_backoff = error_backoff;
    }

    let config = Arc::new(config);

    // Initialize tracing.
    let _guards = init_tracing(
        vgmon::NAME,
        &args.log_dir,
        args.log_level,
        args.log_max_files,
        args.verbose,
    );

    // Initialize channel for graceful shutdown.
    let shutdown = shutdown::Shutdown::default();
    let (shutdown_complete_tx, mut shutdown_complete_rx) = mpsc::unbounded_channel();

    // Initialize monitor.
    let monitor = Monitor::new(
        config.clone(),
        Arc::new(CpuSource::default()),
        shutdown.clone(),
        shutdown_complete_tx.clone(),
    );

    // Log vgmon started pid.
    info!("vgmon started at pid {}", std::process::id());

    // Wait for the monitor to exit or shutdown signal.
    tokio::select! {
        _ = tokio::spawn(async move { monitor.run().await }) => {
            info!("monitor exited");
        },

        _ = shutdown::shutdown_signal() => {},
    }

    // Trigger shutdown signal to other servers.
    shutdown.trigger();

    // Drop shutdown_complete_rx to wait for the other server to exit.
    drop(shutdown_complete_tx);

    // Wait for the other server to exit.
    let _ = shutdown_complete_rx.recv().await;

    Ok(())
}
