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

use crate::shutdown;
use std::io::Write;
use std::sync::Arc;
use termion::{color, style};
use tokio::sync::mpsc;
use tracing::{error, info, instrument};
use vigil_config::vgmon::Config;
use vigil_core::{Error, Result};
use vigil_util::sysinfo::cpu::CPU;

/// MetricSource is the source of the monitored metric.
pub trait MetricSource: Send + Sync {
    /// sample returns the current value of the metric in percent. The value
    /// is reported as read, it is not clamped to [0, 100].
    fn sample(&self) -> Result<f64>;
}

/// CpuSource samples the global cpu usage of the host.
#[derive(Default)]
pub struct CpuSource {
    /// cpu is the sampler of the host cpu.
    cpu: CPU,
}

/// CpuSource implements the MetricSource trait.
impl MetricSource for CpuSource {
    /// sample returns the current global cpu usage in percent.
    fn sample(&self) -> Result<f64> {
        let stats = self.cpu.get_stats()?;
        Ok(stats.used_percent)
    }
}

/// CycleReport is the outcome of a single sampling cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    /// usage is the sampled value in percent.
    pub usage: f64,

    /// alerted is true if the sampled value exceeded the alert threshold.
    pub alerted: bool,
}

/// State is the state of the monitoring loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Normal waits the sampling interval before the next cycle.
    Normal,

    /// Backoff waits the error backoff delay before the next cycle.
    Backoff,
}

/// Monitor is the cpu usage monitor.
pub struct Monitor {
    /// config is the configuration of the monitor.
    config: Arc<Config>,

    /// source is the source of the monitored metric.
    source: Arc<dyn MetricSource>,

    /// shutdown is used to shutdown the monitor.
    shutdown: shutdown::Shutdown,

    /// _shutdown_complete is used to notify that the monitor shutdown is complete.
    _shutdown_complete: mpsc::UnboundedSender<()>,
}

/// Monitor implements the cpu usage monitor.
impl Monitor {
    /// new creates a new Monitor.
    pub fn new(
        config: Arc<Config>,
        source: Arc<dyn MetricSource>,
        shutdown: shutdown::Shutdown,
        shutdown_complete_tx: mpsc::UnboundedSender<()>,
    ) -> Self {
        Self {
            config,
            source,
            shutdown,
            _shutdown_complete: shutdown_complete_tx,
        }
    }

    /// run starts the monitoring loop on standard output.
    pub async fn run(&self) {
        let mut stdout = std::io::stdout();
        self.serve(&mut stdout).await;
    }

    /// serve runs the monitoring loop until a shutdown signal is received.
    /// A failed cycle does not terminate the loop, it is reported and the
    /// loop resumes after the error backoff delay instead of the interval.
    async fn serve<W: Write + Send>(&self, out: &mut W) {
        // Clone the shutdown channel.
        let mut shutdown = self.shutdown.clone();

        if let Err(err) = self.write_banner(out) {
            error!("write banner failed: {}", err);
            return;
        }

        info!(
            "monitor started with threshold {}% and interval {}",
            self.config.monitor.threshold,
            humantime::format_duration(self.config.monitor.interval)
        );

        loop {
            let state = match self.cycle(out) {
                Ok(report) => {
                    if report.alerted {
                        info!(
                            "cpu usage {:.1}% exceeded threshold {:.1}%",
                            report.usage, self.config.monitor.threshold
                        );
                    }

                    State::Normal
                }
                Err(err) => {
                    error!("sampling failed: {}", err);
                    if let Err(err) = self.write_sampling_error(out, &err) {
                        error!("write sampling error failed: {}", err);
                    }

                    State::Backoff
                }
            };

            let delay = match state {
                State::Normal => self.config.monitor.interval,
                State::Backoff => self.config.monitor.error_backoff,
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.recv() => {
                    // Monitor shutting down with signals.
                    if let Err(err) = self.write_interrupted(out) {
                        error!("write interrupted failed: {}", err);
                    }

                    info!("monitor shutting down");
                    return;
                }
            }
        }
    }

    /// cycle runs a single sampling cycle. It writes the status line and, if
    /// the sampled value strictly exceeds the alert threshold, the alert
    /// block. Equality does not alert.
    #[instrument(skip_all)]
    fn cycle<W: Write>(&self, out: &mut W) -> Result<CycleReport> {
        let usage = self.source.sample()?;
        writeln!(out, "Current CPU Usage: {:.1}%", usage)?;

        let alerted = usage > self.config.monitor.threshold;
        if alerted {
            self.write_alert(out, usage)?;
        }

        out.flush()?;
        Ok(CycleReport { usage, alerted })
    }

    /// write_banner writes the startup banner.
    fn write_banner<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "--- Server Health Monitor ---")?;
        writeln!(
            out,
            "Monitoring CPU usage every {}...",
            humantime::format_duration(self.config.monitor.interval)
        )?;
        writeln!(
            out,
            "Alert Threshold: {:.1}%",
            self.config.monitor.threshold
        )?;
        writeln!(out, "Press Ctrl+C to interrupt and stop the monitoring.")?;
        writeln!(out, "{}", "-".repeat(40))?;
        out.flush()?;
        Ok(())
    }

    /// write_alert writes the alert block for a value exceeding the threshold.
    fn write_alert<W: Write>(&self, out: &mut W, usage: f64) -> Result<()> {
        writeln!(
            out,
            "{}{}{}****************************************{}",
            color::Fg(color::Black),
            style::Italic,
            style::Bold,
            style::Reset
        )?;

        writeln!(
            out,
            "{}{}{}ALERT! CPU usage exceeds threshold: {:.1}%{}",
            color::Fg(color::Red),
            style::Italic,
            style::Bold,
            usage,
            style::Reset
        )?;

        writeln!(
            out,
            "{}{}{}****************************************{}",
            color::Fg(color::Black),
            style::Italic,
            style::Bold,
            style::Reset
        )?;

        Ok(())
    }

    /// write_sampling_error writes the error line for a failed cycle.
    fn write_sampling_error<W: Write>(&self, out: &mut W, err: &Error) -> Result<()> {
        writeln!(out, "[ERROR] Sampling failed: {}", err)?;
        out.flush()?;
        Ok(())
    }

    /// write_interrupted writes the graceful exit message.
    fn write_interrupted<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "Monitoring interrupted by user. Exiting...")?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    /// ScriptedSource replays a fixed sequence of samples and records when
    /// each sample was taken. Once the script is exhausted it returns 0.0.
    struct ScriptedSource {
        samples: Mutex<VecDeque<Result<f64>>>,
        calls: Mutex<Vec<Instant>>,
    }

    impl ScriptedSource {
        fn new(samples: Vec<Result<f64>>) -> Self {
            Self {
                samples: Mutex::new(samples.into_iter().collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl MetricSource for ScriptedSource {
        fn sample(&self) -> Result<f64> {
            self.calls.lock().unwrap().push(Instant::now());
            self.samples
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(0.0))
        }
    }

    fn make_monitor(
        threshold: f64,
        interval: Duration,
        error_backoff: Duration,
        source: Arc<ScriptedSource>,
    ) -> Monitor {
        let config = Config {
            monitor: vigil_config::vgmon::Monitor {
                threshold,
                interval,
                error_backoff,
            },
        };

        let shutdown = shutdown::Shutdown::new();
        let (shutdown_complete_tx, _shutdown_complete_rx) = mpsc::unbounded_channel();
        Monitor::new(Arc::new(config), source, shutdown, shutdown_complete_tx)
    }

    #[test]
    fn test_cycle_reports_status_without_alert() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(10.0)]));
        let monitor = make_monitor(
            80.0,
            Duration::from_secs(2),
            Duration::from_secs(5),
            source,
        );

        let mut out = Vec::new();
        let report = monitor.cycle(&mut out).unwrap();
        assert_eq!(report.usage, 10.0);
        assert!(!report.alerted);

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("Current CPU Usage: 10.0%\n"));
        assert!(!output.contains("ALERT!"));
    }

    #[test]
    fn test_cycle_alerts_above_threshold() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(85.5)]));
        let monitor = make_monitor(
            80.0,
            Duration::from_secs(2),
            Duration::from_secs(5),
            source,
        );

        let mut out = Vec::new();
        let report = monitor.cycle(&mut out).unwrap();
        assert!(report.alerted);

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("Current CPU Usage: 85.5%\n"));
        assert!(output.contains("ALERT! CPU usage exceeds threshold: 85.5%"));
    }

    #[test]
    fn test_cycle_does_not_alert_at_threshold() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(80.0)]));
        let monitor = make_monitor(
            80.0,
            Duration::from_secs(2),
            Duration::from_secs(5),
            source,
        );

        let mut out = Vec::new();
        let report = monitor.cycle(&mut out).unwrap();
        assert!(!report.alerted);

        let output = String::from_utf8(out).unwrap();
        assert!(!output.contains("ALERT!"));
    }

    #[test]
    fn test_cycle_alerts_only_above_threshold() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(10.0),
            Ok(85.5),
            Ok(80.0),
            Ok(80.1),
        ]));
        let monitor = make_monitor(
            80.0,
            Duration::from_secs(2),
            Duration::from_secs(5),
            source,
        );

        let mut out = Vec::new();
        let mut alerted = Vec::new();
        for _ in 0..4 {
            alerted.push(monitor.cycle(&mut out).unwrap().alerted);
        }
        assert_eq!(alerted, vec![false, true, false, true]);

        let output = String::from_utf8(out).unwrap();
        assert_eq!(
            output
                .lines()
                .filter(|line| line.starts_with("Current CPU Usage:"))
                .count(),
            4
        );
        assert_eq!(output.matches("ALERT!").count(), 2);
        assert!(output.contains("ALERT! CPU usage exceeds threshold: 85.5%"));
        assert!(output.contains("ALERT! CPU usage exceeds threshold: 80.1%"));
        assert!(!output.contains("ALERT! CPU usage exceeds threshold: 80.0%"));
    }

    #[test]
    fn test_cycle_propagates_sampling_error() {
        let source = Arc::new(ScriptedSource::new(vec![Err(Error::CpuUnavailable)]));
        let monitor = make_monitor(
            80.0,
            Duration::from_secs(2),
            Duration::from_secs(5),
            source,
        );

        let mut out = Vec::new();
        let result = monitor.cycle(&mut out);
        assert!(result.is_err());

        // No status line is written for a failed cycle.
        assert!(out.is_empty());
    }

    #[test]
    fn test_write_sampling_error_format() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let monitor = make_monitor(
            80.0,
            Duration::from_secs(2),
            Duration::from_secs(5),
            source,
        );

        let mut out = Vec::new();
        monitor
            .write_sampling_error(&mut out, &Error::CpuUnavailable)
            .unwrap();

        let output = String::from_utf8(out).unwrap();
        assert_eq!(output, "[ERROR] Sampling failed: cpu usage unavailable\n");
    }

    #[test]
    fn test_write_banner_format() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let monitor = make_monitor(
            80.0,
            Duration::from_secs(2),
            Duration::from_secs(5),
            source,
        );

        let mut out = Vec::new();
        monitor.write_banner(&mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "--- Server Health Monitor ---");
        assert_eq!(lines[1], "Monitoring CPU usage every 2s...");
        assert_eq!(lines[2], "Alert Threshold: 80.0%");
        assert_eq!(lines[3], "Press Ctrl+C to interrupt and stop the monitoring.");
        assert_eq!(lines[4], "-".repeat(40));
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(10.0)]));
        let monitor = make_monitor(
            80.0,
            Duration::from_millis(10),
            Duration::from_millis(10),
            source.clone(),
        );

        let trigger = monitor.shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.trigger();
        });

        let mut out = Vec::new();
        monitor.serve(&mut out).await;

        let output = String::from_utf8(out).unwrap();
        assert!(!source.calls().is_empty());
        assert!(output.ends_with("Monitoring interrupted by user. Exiting...\n"));
    }

    #[tokio::test]
    async fn test_serve_resumes_after_sampling_error() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(42.0),
            Err(Error::CpuUnavailable),
            Ok(55.5),
        ]));
        let monitor = make_monitor(
            80.0,
            Duration::from_millis(10),
            Duration::from_millis(20),
            source.clone(),
        );

        let trigger = monitor.shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.trigger();
        });

        let mut out = Vec::new();
        monitor.serve(&mut out).await;

        let output = String::from_utf8(out).unwrap();
        let first = output.find("Current CPU Usage: 42.0%").unwrap();
        let error = output
            .find("[ERROR] Sampling failed: cpu usage unavailable")
            .unwrap();
        let resumed = output.find("Current CPU Usage: 55.5%").unwrap();
        assert!(first < error);
        assert!(error < resumed);
    }

    #[tokio::test]
    async fn test_serve_waits_error_backoff_after_failure() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(10.0),
            Err(Error::CpuUnavailable),
            Ok(10.0),
        ]));
        let monitor = make_monitor(
            80.0,
            Duration::from_millis(10),
            Duration::from_millis(500),
            source.clone(),
        );

        let trigger = monitor.shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(800)).await;
            trigger.trigger();
        });

        let mut out = Vec::new();
        monitor.serve(&mut out).await;

        let calls = source.calls();
        assert!(calls.len() >= 3);

        // The failed second cycle delays the third sample by the error
        // backoff, while the first gap only spans the sampling interval.
        let normal_gap = calls[1] - calls[0];
        let backoff_gap = calls[2] - calls[1];
        assert!(normal_gap < Duration::from_millis(250));
        assert!(backoff_gap >= Duration::from_millis(400));
    }
}
