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

use crate::shutdown;
use serde::Serialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, instrument};
use vigil_config::vgconf::Config;
use warp::{http::StatusCode, Filter, Rejection, Reply};

pub mod document;
pub mod ini;

use crate::confstore::document::DocumentClient;

/// Envelope is the response body of the configuration service.
#[derive(Debug, Serialize)]
struct Envelope {
    /// status indicates whether the request succeeded.
    status: &'static str,

    /// message describes the outcome of the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,

    /// data is the extracted configuration, if available.
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// Envelope implements the response body constructors.
impl Envelope {
    /// success returns a success envelope with a message and the extracted data.
    fn success(message: impl ToString, data: Value) -> Self {
        Self {
            status: "success",
            message: Some(message.to_string()),
            data: Some(data),
        }
    }

    /// data returns a success envelope carrying only the extracted data.
    fn data(data: Value) -> Self {
        Self {
            status: "success",
            message: None,
            data: Some(data),
        }
    }

    /// error returns an error envelope with a message.
    fn error(message: impl ToString) -> Self {
        Self {
            status: "error",
            message: Some(message.to_string()),
            data: None,
        }
    }
}

/// ConfStore is the configuration extraction server.
#[derive(Debug)]
pub struct ConfStore {
    /// config is the configuration of the server.
    config: Arc<Config>,

    /// addr is the address the server listens on.
    addr: SocketAddr,

    /// client is the document store client. When it is None the server runs
    /// with the database offline and only serves extracted data.
    client: Option<Arc<DocumentClient>>,

    /// shutdown is used to shutdown the server.
    shutdown: shutdown::Shutdown,

    /// _shutdown_complete is used to notify that the server shutdown is complete.
    _shutdown_complete: mpsc::UnboundedSender<()>,
}

/// ConfStore implements the configuration extraction server.
impl ConfStore {
    /// new creates a new ConfStore.
    pub fn new(
        config: Arc<Config>,
        addr: SocketAddr,
        client: Option<Arc<DocumentClient>>,
        shutdown: shutdown::Shutdown,
        shutdown_complete_tx: mpsc::UnboundedSender<()>,
    ) -> Self {
        Self {
            config,
            addr,
            client,
            shutdown,
            _shutdown_complete: shutdown_complete_tx,
        }
    }

    /// run starts the configuration server.
    pub async fn run(&self) {
        // Clone the shutdown channel.
        let mut shutdown = self.shutdown.clone();

        // Create the routes.
        let routes = Self::routes(self.config.clone(), self.client.clone());

        // Start the configuration server and wait for it to finish.
        info!("configuration server listening on {}", self.addr);
        tokio::select! {
            _ = warp::serve(routes).run(self.addr) => {
                // Configuration server ended.
                info!("configuration server ended");
            }
            _ = shutdown.recv() => {
                // Configuration server shutting down with signals.
                info!("configuration server shutting down");
            }
        }
    }

    /// routes returns the routes of the configuration server.
    fn routes(
        config: Arc<Config>,
        client: Option<Arc<DocumentClient>>,
    ) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
        let parse_config = config.clone();
        let parse_client = client.clone();
        let parse_and_save_route = warp::path!("parse-and-save")
            .and(warp::post())
            .and(warp::path::end())
            .and(warp::any().map(move || parse_config.clone()))
            .and(warp::any().map(move || parse_client.clone()))
            .and_then(Self::parse_and_save_handler);

        let get_config_route = warp::path!("get-config")
            .and(warp::get())
            .and(warp::path::end())
            .and(warp::any().map(move || config.clone()))
            .and(warp::any().map(move || client.clone()))
            .and_then(Self::get_config_handler);

        let health_route = warp::path!("healthy")
            .and(warp::get())
            .and(warp::path::end())
            .and_then(Self::health_handler);

        parse_and_save_route.or(get_config_route).or(health_route)
    }

    /// parse_and_save_handler extracts the configured source file and stores
    /// the result in the database. Without a database the extracted data is
    /// still returned.
    #[instrument(skip_all)]
    async fn parse_and_save_handler(
        config: Arc<Config>,
        client: Option<Arc<DocumentClient>>,
    ) -> Result<impl Reply, Rejection> {
        let sections = match ini::parse_file(config.source.as_path()) {
            Ok(sections) => sections,
            Err(err) => {
                error!("parse configuration file failed: {}", err);
                return Ok(warp::reply::with_status(
                    warp::reply::json(&Envelope::error(format!(
                        "Failed to parse configuration file. Check if '{}' exists.",
                        config.source.display()
                    ))),
                    StatusCode::INTERNAL_SERVER_ERROR,
                ));
            }
        };

        let data = json!(sections);
        let Some(client) = client else {
            return Ok(warp::reply::with_status(
                warp::reply::json(&Envelope::success(
                    "Configuration parsed successfully but database is offline.",
                    data,
                )),
                StatusCode::OK,
            ));
        };

        match client
            .put(&config.database.document_id, json!({"config": data.clone()}))
            .await
        {
            Ok(()) => Ok(warp::reply::with_status(
                warp::reply::json(&Envelope::success(
                    "Configuration parsed and saved to database.",
                    data,
                )),
                StatusCode::OK,
            )),
            Err(err) => {
                error!("save configuration failed: {}", err);
                Ok(warp::reply::with_status(
                    warp::reply::json(&Envelope::error(
                        "Configuration parsed but failed to save to database.",
                    )),
                    StatusCode::INTERNAL_SERVER_ERROR,
                ))
            }
        }
    }

    /// get_config_handler fetches the stored configuration from the database.
    #[instrument(skip_all)]
    async fn get_config_handler(
        config: Arc<Config>,
        client: Option<Arc<DocumentClient>>,
    ) -> Result<impl Reply, Rejection> {
        let Some(client) = client else {
            return Ok(warp::reply::with_status(
                warp::reply::json(&Envelope::error(
                    "Database not initialized. Cannot fetch data.",
                )),
                StatusCode::INTERNAL_SERVER_ERROR,
            ));
        };

        match client.get(&config.database.document_id).await {
            Ok(Some(mut document)) => {
                let data = document
                    .get_mut("config")
                    .map(Value::take)
                    .unwrap_or_else(|| json!({}));
                Ok(warp::reply::with_status(
                    warp::reply::json(&Envelope::data(data)),
                    StatusCode::OK,
                ))
            }
            Ok(None) => Ok(warp::reply::with_status(
                warp::reply::json(&Envelope::error(
                    "Configuration data not found in database. Run POST first.",
                )),
                StatusCode::NOT_FOUND,
            )),
            Err(err) => Ok(warp::reply::with_status(
                warp::reply::json(&Envelope::error(format!(
                    "An error occurred fetching data: {}",
                    err
                ))),
                StatusCode::INTERNAL_SERVER_ERROR,
            )),
        }
    }

    /// health_handler handles the health check request.
    #[instrument(skip_all)]
    async fn health_handler() -> Result<impl Reply, Rejection> {
        Ok(warp::reply())
    }
}
