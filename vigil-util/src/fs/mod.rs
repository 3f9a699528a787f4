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

use chrono::Local;
use std::path::{Path, PathBuf};

/// unique_destination_path returns the path for copying file_name into dir
/// without clobbering an existing file. When the name is taken, a timestamp
/// is inserted between the file stem and the extension.
pub fn unique_destination_path(dir: &Path, file_name: &str) -> PathBuf {
    let destination = dir.join(file_name);
    if !destination.exists() {
        return destination;
    }

    let timestamp = Local::now().format("_%Y%m%d_%H%M%S");
    let path = Path::new(file_name);
    let renamed = match (path.file_stem(), path.extension()) {
        (Some(stem), Some(extension)) => format!(
            "{}{}.{}",
            stem.to_string_lossy(),
            timestamp,
            extension.to_string_lossy()
        ),
        _ => format!("{}{}", file_name, timestamp),
    };

    dir.join(renamed)
}
