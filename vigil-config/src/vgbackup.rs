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

/// NAME is the name of vgbackup.
pub const NAME: &str = "vgbackup";

/// default_vgbackup_log_dir is the default log directory for vgbackup.
#[inline]
pub fn default_vgbackup_log_dir() -> PathBuf {
    crate::default_log_dir().join(NAME)
}
