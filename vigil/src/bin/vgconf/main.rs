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
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, Level};
use vigil::confstore::document::DocumentClient;
use vigil::confstore::ConfStore;
use vigil::shutdown;
use vigil::tracing::init_tracing;
use vigil_config::vgconf;

#[derive(Debug, Parser)]
#[command(
    name = vgconf::NAME,
    author,
    version,
    about = "vgconf is a configuration extraction service",
    long_about = "A configuration extraction service that parses a local ini file into a \
    section map and stores it as a document in a couchdb compatible database. The extracted \
    data is served over http, with or without a reachable database."
)]
struct Args {
    #[arg(
        short = 'c',
        long = "config",
        default_value_os_t = vgconf::default_vgconf_config_path(),
        help = "Specify config file to use")
    ]
    config: PathBuf,

    #[arg(
        short = 'l',
        long,
        default_value = "info",
        help = "Specify the logging level [trace, debug, info, warn, error]"
    )]
    log_level: Level,

    #[arg(
        long,
        default_value_os_t = vgconf::default_vgconf_log_dir(),
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
    let config = vgconf::Config::load(&args.config).await?;
    let config = Arc::new(config);

    // Initialize tracing.
    let _guards = init_tracing(
        vgconf::NAME,
        &args.log_dir,
        args.log_level,
        args.log_max_files,
        args.verbose,
    );

    // Initialize document store client. The service stays up without a
    // database and only serves extracted data.
    let client = match config.database.endpoint.clone() {
        Some(endpoint) => {
            let client = Arc::new(DocumentClient::new(
                endpoint,
                config.database.name.clone(),
                config.database.timeout,
            )?);

            match client.ensure_database().await {
                Ok(()) => {
                    info!("connected to database {}", config.database.name);
                    Some(client)
                }
                Err(err) => {
                    error!("initialize database failed, running offline: {}", err);
                    None
                }
            }
        }
        None => {
            info!("no database endpoint configured, running offline");
            None
        }
    };

    // Initialize channel for graceful shutdown.
    let shutdown = shutdown::Shutdown::default();
    let (shutdown_complete_tx, mut shutdown_complete_rx) = mpsc::unbounded_channel();

    // Initialize configuration server.
    let confstore = ConfStore::new(
        config.clone(),
        SocketAddr::new(config.server.ip.unwrap(), config.server.port),
        client,
        shutdown.clone(),
        shutdown_complete_tx.clone(),
    );

    // Log vgconf started pid.
    info!("vgconf started at pid {}", std::process::id());

    // Wait for the configuration server to exit or shutdown signal.
    tokio::select! {
        _ = tokio::spawn(async move { confstore.run().await }) => {
            info!("configuration server exited");
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
