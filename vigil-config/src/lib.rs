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

use std::path::PathBuf;

pub mod vgbackup;
pub mod vgconf;
pub mod vgmon;
pub mod vgpasswd;

/// SERVICE_NAME is the name of the service.
pub const SERVICE_NAME: &str = "vigil";

/// NAME is the name of the package.
pub const NAME: &str = "toolkit";

/// CARGO_PKG_VERSION is the version of the cargo package.
pub const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// default_config_dir is the default config directory for the toolkit.
pub fn default_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    return PathBuf::from("/etc/vigil/");

    #[cfg(target_os = "macos")]
    return home::home_dir().unwrap().join(".vigil").join("config");
}

/// default_log_dir is the default log directory for the toolkit.
pub fn default_log_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    return PathBuf::from("/var/log/vigil/");

    #[cfg(target_os = "macos")]
    return home::home_dir().unwrap().join(".vigil").join("logs");
}
