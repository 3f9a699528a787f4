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

use clap::Parser;
use std::path::PathBuf;
use termion::{color, style};
use tracing::{error, Level};
use vigil::backup::Backup;
use vigil::tracing::init_tracing;
use vigil_config::vgbackup;
use vigil_core::Result;

#[derive(Debug, Parser)]
#[command(
    name = vgbackup::NAME,
    author,
    version,
    about = "vgbackup is a flat directory backup tool",
    long_about = "A backup tool that copies the regular files of a source directory into a \
    destination directory, creating the destination when missing and renaming copies with a \
    timestamp suffix instead of overwriting existing files."
)]
struct Args {
    #[arg(help = "Specify the source directory to back up")]
    source: PathBuf,

    #[arg(help = "Specify the destination directory for the copies")]
    destination: PathBuf,

    #[arg(
        short = 'l',
        long,
        default_value = "info",
        help = "Specify the logging level [trace, debug, info, warn, error]"
    )]
    log_level: Level,

    #[arg(
        long,
        default_value_os_t = vgbackup::default_vgbackup_log_dir(),
        help = "Specify the log directory"
    )]
    log_dir: PathBuf,

    #[arg(
        long,
        default_value_t = 6,
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
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments.
    let args = Args::parse();

    // Initialize tracing.
    let _guards = init_tracing(
        vgbackup::NAME,
        &args.log_dir,
        args.log_level,
        args.log_max_files,
        args.verbose,
    );

    // Run vgbackup command.
    if let Err(err) = run(args).await {
        eprintln!(
            "{}{}{}Backup Failed!{}",
            color::Fg(color::Red),
            style::Italic,
            style::Bold,
            style::Reset
        );

        eprintln!(
            "{}{}{}{}{}",
            color::Fg(color::Black),
            style::Italic,
            style::Bold,
            "*".repeat(40),
            style::Reset
        );

        eprintln!(
            "{}{}{}Message:{} {}",
            color::Fg(color::Red),
            style::Italic,
            style::Bold,
            style::Reset,
            err,
        );

        eprintln!(
            "{}{}{}{}{}",
            color::Fg(color::Black),
            style::Italic,
            style::Bold,
            "*".repeat(40),
            style::Reset
        );

        std::process::exit(1);
    }

    Ok(())
}

// run runs the vgbackup command.
async fn run(args: Args) -> Result<()> {
    let backup = Backup::new(args.source, args.destination);
    backup
        .run(&mut std::io::stdout())
        .await
        .map_err(|err| {
            error!("backup failed: {}", err);
            err
        })?;

    Ok(())
}
