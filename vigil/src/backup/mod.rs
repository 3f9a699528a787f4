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

use bytesize::ByteSize;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, instrument};
use vigil_core::{Error, Result};
use vigil_util::fs::unique_destination_path;

/// BackupSummary is the result of a completed backup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackupSummary {
    /// copied is the number of files copied.
    pub copied: usize,

    /// total_bytes is the total size of the copied files.
    pub total_bytes: u64,
}

/// Backup copies the files of a source directory into a destination directory.
pub struct Backup {
    /// source is the directory to copy files from.
    source: PathBuf,

    /// destination is the directory to copy files into.
    destination: PathBuf,
}

/// Backup implements the backup operation.
impl Backup {
    /// new creates a new Backup.
    pub fn new(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// run copies every file directly under the source directory into the
    /// destination directory. Subdirectories are skipped and name conflicts
    /// in the destination are resolved with a timestamp suffix. The first
    /// copy error aborts the run.
    #[instrument(skip_all)]
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<BackupSummary> {
        writeln!(out, "{}", "-".repeat(50))?;
        writeln!(out, "Starting Backup Operation...")?;
        writeln!(out, "Source: {}", self.source.display())?;
        writeln!(out, "Destination: {}", self.destination.display())?;
        writeln!(out, "{}", "-".repeat(50))?;

        if !self.source.is_dir() {
            return Err(Error::NotDirectory(self.source.display().to_string()));
        }

        if !self.destination.is_dir() {
            tokio::fs::create_dir_all(&self.destination).await?;
            writeln!(
                out,
                "Created destination directory: '{}'",
                self.destination.display()
            )?;
        }

        // Collect the regular files of the source directory. Sorting keeps
        // the copy order stable across runs.
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.source).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();

        let mut summary = BackupSummary::default();
        for path in files {
            let Some(file_name) = path.file_name().map(|name| name.to_string_lossy().to_string())
            else {
                continue;
            };

            let destination = unique_destination_path(&self.destination, &file_name);
            let destination_name = destination
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| file_name.clone());
            if destination_name != file_name {
                writeln!(
                    out,
                    "    [INFO] Conflict detected. Renaming to: {}",
                    destination_name
                )?;
            }

            let copied = tokio::fs::copy(&path, &destination).await?;
            writeln!(out, "  --> Copied: {}", file_name)?;

            summary.copied += 1;
            summary.total_bytes += copied;
        }

        writeln!(out, "{}", "-".repeat(50))?;
        writeln!(
            out,
            "Backup complete! Total files copied: {} ({})",
            summary.copied,
            ByteSize(summary.total_bytes)
        )?;
        writeln!(out, "{}", "-".repeat(50))?;
        out.flush()?;

        info!(
            "backup completed: {} files copied from {} to {}",
            summary.copied,
            self.source.display(),
            self.destination.display()
        );
        Ok(summary)
    }
}
