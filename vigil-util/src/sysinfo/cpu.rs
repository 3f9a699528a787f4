/*
 *     Copyright 2026 The Vigil Authors
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

use std::sync::Mutex;
use sysinfo::{CpuRefreshKind, RefreshKind, System};
use vigil_core::{Error, Result};

/// Represents system-wide CPU statistics.
#[derive(Debug, Clone, Default)]
pub struct CPUStats {
    /// Number of physical CPU cores available on the system.
    pub physical_core_count: u32,

    /// Number of logical CPU cores (including hyperthreads) available on the system.
    pub logical_core_count: u32,

    /// Overall CPU usage percentage across all cores. The value is reported
    /// as the kernel computed it and is not clamped here.
    pub used_percent: f64,
}

/// CPU represents a cpu interface with its information.
#[derive(Debug)]
pub struct CPU {
    /// Reusable system handle. Usage percentages are computed from the
    /// delta between two refreshes, so the handle must live across calls.
    sys: Mutex<System>,
}

/// Implementation of CPU monitoring functionality.
impl CPU {
    /// Creates a new CPU instance and primes the usage counters so the
    /// first reading taken after an interval is meaningful.
    pub fn new() -> Self {
        let mut sys = System::new_with_specifics(
            RefreshKind::new().with_cpu(CpuRefreshKind::new().with_cpu_usage()),
        );
        sys.refresh_cpu_usage();

        Self {
            sys: Mutex::new(sys),
        }
    }

    /// Retrieves system-wide CPU statistics.
    ///
    /// The usage percentage is an instantaneous reading covering the time
    /// since the previous call, a single non-blocking refresh.
    ///
    /// # Returns
    /// CPUStats containing core counts and global CPU usage percentage.
    pub fn get_stats(&self) -> Result<CPUStats> {
        let mut sys = self
            .sys
            .lock()
            .map_err(|_| Error::Unknown("cpu sampler lock poisoned".to_string()))?;
        sys.refresh_cpu_usage();

        if sys.cpus().is_empty() {
            return Err(Error::CpuUnavailable);
        }

        Ok(CPUStats {
            physical_core_count: num_cpus::get_physical() as u32,
            logical_core_count: num_cpus::get() as u32,
            used_percent: sys.global_cpu_usage() as f64,
        })
    }
}

/// CPU implements Default.
impl Default for CPU {
    fn default() -> Self {
        Self::new()
    }
}
