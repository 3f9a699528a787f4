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

use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;
use vigil_core::{
    error::{ErrorType, ExternalError},
    Result,
};

/// DocumentClient is the client of a couchdb compatible document store.
#[derive(Debug, Clone)]
pub struct DocumentClient {
    /// client is the http client of the document store.
    client: reqwest::Client,

    /// endpoint is the base url of the document store.
    endpoint: Url,

    /// database is the name of the database.
    database: String,
}

/// DocumentClient implements the document store operations.
impl DocumentClient {
    /// new creates a new DocumentClient.
    pub fn new(endpoint: Url, database: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            database,
        })
    }

    /// database_url returns the url of the database.
    fn database_url(&self) -> String {
        format!(
            "{}/{}",
            self.endpoint.as_str().trim_end_matches('/'),
            self.database
        )
    }

    /// document_url returns the url of a document in the database.
    fn document_url(&self, id: &str) -> String {
        format!("{}/{}", self.database_url(), id)
    }

    /// ensure_database creates the database if it does not exist yet.
    #[instrument(skip_all)]
    pub async fn ensure_database(&self) -> Result<()> {
        let url = self.database_url();
        let response = self.client.put(&url).send().await?;
        match response.status() {
            StatusCode::CREATED | StatusCode::ACCEPTED => {
                info!("created database {}", self.database);
                Ok(())
            }
            // 412 means the database already exists.
            StatusCode::PRECONDITION_FAILED => Ok(()),
            status => Err(ExternalError::new(ErrorType::StorageError)
                .with_context(format!(
                    "create database {} failed: {}",
                    self.database, status
                ))
                .into()),
        }
    }

    /// get fetches a document by id, returning None if it does not exist.
    #[instrument(skip_all)]
    pub async fn get(&self, id: &str) -> Result<Option<Value>> {
        let url = self.document_url(id);
        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(ExternalError::new(ErrorType::StorageError)
                .with_context(format!("get document {} failed: {}", id, status))
                .into()),
        }
    }

    /// put stores a document by id, updating it in place if it already exists.
    #[instrument(skip_all)]
    pub async fn put(&self, id: &str, mut document: Value) -> Result<()> {
        // Carry over the current revision to update the document in place.
        if let Some(current) = self.get(id).await? {
            if let Some(rev) = current.get("_rev") {
                if let Some(fields) = document.as_object_mut() {
                    fields.insert("_rev".to_string(), rev.clone());
                }
            }
        }

        let url = self.document_url(id);
        let response = self.client.put(&url).json(&document).send().await?;
        match response.status() {
            StatusCode::CREATED | StatusCode::ACCEPTED => Ok(()),
            status => Err(ExternalError::new(ErrorType::StorageError)
                .with_context(format!("put document {} failed: {}", id, status))
                .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, ResponseTemplate,
    };

    fn make_client(server: &wiremock::MockServer) -> DocumentClient {
        DocumentClient::new(
            Url::parse(&server.uri()).unwrap(),
            "configuration_management".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_ensure_database_creates_database() {
        let server = wiremock::MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/configuration_management"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let client = make_client(&server);
        assert!(client.ensure_database().await.is_ok());
    }

    #[tokio::test]
    async fn test_ensure_database_accepts_existing_database() {
        let server = wiremock::MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/configuration_management"))
            .respond_with(ResponseTemplate::new(412))
            .mount(&server)
            .await;

        let client = make_client(&server);
        assert!(client.ensure_database().await.is_ok());
    }

    #[tokio::test]
    async fn test_ensure_database_fails_on_server_error() {
        let server = wiremock::MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/configuration_management"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = make_client(&server);
        assert!(client.ensure_database().await.is_err());
    }

    #[tokio::test]
    async fn test_get_returns_document() {
        let server = wiremock::MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/configuration_management/extracted_config_data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_id": "extracted_config_data",
                "_rev": "1-abc",
                "config": {"database": {"host": "localhost"}}
            })))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let document = client.get("extracted_config_data").await.unwrap().unwrap();
        assert_eq!(document["config"]["database"]["host"], "localhost");
    }

    #[tokio::test]
    async fn test_get_returns_none_when_absent() {
        let server = wiremock::MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/configuration_management/extracted_config_data"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = make_client(&server);
        assert!(client
            .get("extracted_config_data")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_put_creates_document() {
        let server = wiremock::MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/configuration_management/extracted_config_data"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/configuration_management/extracted_config_data"))
            .and(body_json(json!({"config": {"app": {"debug": "True"}}})))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let document = json!({"config": {"app": {"debug": "True"}}});
        assert!(client.put("extracted_config_data", document).await.is_ok());
    }

    #[tokio::test]
    async fn test_put_carries_revision_of_existing_document() {
        let server = wiremock::MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/configuration_management/extracted_config_data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_id": "extracted_config_data",
                "_rev": "3-def",
                "config": {}
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/configuration_management/extracted_config_data"))
            .and(body_json(
                json!({"_rev": "3-def", "config": {"app": {"debug": "True"}}}),
            ))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let document = json!({"config": {"app": {"debug": "True"}}});
        assert!(client.put("extracted_config_data", document).await.is_ok());
    }

    #[tokio::test]
    async fn test_put_fails_on_conflict() {
        let server = wiremock::MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/configuration_management/extracted_config_data"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/configuration_management/extracted_config_data"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let document = json!({"config": {}});
        assert!(client.put("extracted_config_data", document).await.is_err());
    }
}
