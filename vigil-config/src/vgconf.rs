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

use serde::Deserialize;
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;
use validator::Validate;
use vigil_core::{
    error::{ErrorType, OrErr},
    Result,
};

/// NAME is the name of vgconf.
pub const NAME: &str = "vgconf";

/// Returns the default config path for vgconf.
#[inline]
pub fn default_vgconf_config_path() -> PathBuf {
    crate::default_config_dir().join("vgconf.yaml")
}

/// Returns the default log directory for vgconf.
#[inline]
pub fn default_vgconf_log_dir() -> PathBuf {
    crate::default_log_dir().join(NAME)
}

/// Returns the default port of the vgconf server.
#[inline]
fn default_vgconf_server_port() -> u16 {
    3306
}

/// Returns the default path of the INI file to extract. Relative to the
/// working directory, matching the deployment layout this service ships in.
#[inline]
fn default_vgconf_source_path() -> PathBuf {
    PathBuf::from("app_config.ini")
}

/// Returns the default database name holding the extracted configuration.
#[inline]
fn default_database_name() -> String {
    "configuration_management".to_string()
}

/// Returns the default id of the document holding the extracted configuration.
#[inline]
fn default_database_document_id() -> String {
    "extracted_config_data".to_string()
}

/// Returns the default request timeout for the document database.
#[inline]
fn default_database_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Server is the server configuration for vgconf.
#[derive(Debug, Clone, Validate, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Server {
    /// IP is the listen ip of the vgconf server.
    pub ip: Option<IpAddr>,

    /// Port is the port to the vgconf server.
    #[serde(default = "default_vgconf_server_port")]
    pub port: u16,
}

/// Server implements Default.
impl Default for Server {
    fn default() -> Self {
        Server {
            ip: None,
            port: default_vgconf_server_port(),
        }
    }
}

/// Database is the document database configuration for vgconf.
///
/// When no endpoint is configured the service runs with the database
/// disabled and only serves parsed data.
#[derive(Debug, Clone, Validate, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Database {
    /// Endpoint is the base url of the document database.
    pub endpoint: Option<Url>,

    /// Name is the database holding the configuration document.
    #[serde(default = "default_database_name")]
    #[validate(length(min = 1))]
    pub name: String,

    /// Document id is the id of the configuration document.
    #[serde(default = "default_database_document_id")]
    #[validate(length(min = 1))]
    pub document_id: String,

    /// Timeout is the request timeout for the document database.
    #[serde(default = "default_database_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

/// Database implements Default.
impl Default for Database {
    fn default() -> Self {
        Database {
            endpoint: None,
            name: default_database_name(),
            document_id: default_database_document_id(),
            timeout: default_database_timeout(),
        }
    }
}

/// Config is the configuration for vgconf.
#[derive(Debug, Clone, Validate, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Server is the server configuration for vgconf.
    #[validate]
    pub server: Server,

    /// Source is the path of the INI file to extract.
    #[serde(default = "default_vgconf_source_path")]
    pub source: PathBuf,

    /// Database is the document database configuration for vgconf.
    #[validate]
    pub database: Database,
}

/// Config implements Default.
impl Default for Config {
    fn default() -> Self {
        Config {
            server: Server::default(),
            source: default_vgconf_source_path(),
            database: Database::default(),
        }
    }
}

/// Config implements the config operation of vgconf.
impl Config {
    /// Load the configuration from file. A missing file is not an error,
    /// the built-in defaults apply.
    #[instrument(skip_all)]
    pub async fn load(path: &PathBuf) -> Result<Config> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    "config file {} not found, using default configuration",
                    path.display()
                );
                let mut config = Config::default();
                config.convert();
                return Ok(config);
            }
            Err(err) => return Err(err.into()),
        };

        let mut config: Config = serde_yaml::from_str(&content).or_err(ErrorType::ConfigError)?;

        // Convert configuration.
        config.convert();

        // Validate configuration.
        config.validate().or_err(ErrorType::ValidationError)?;
        Ok(config)
    }

    /// Convert converts the configuration.
    #[instrument(skip_all)]
    fn convert(&mut self) {
        // Convert server listen ip.
        if self.server.ip.is_none() {
            self.server.ip = Some(Ipv4Addr::UNSPECIFIED.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn deserialize_server_correctly() {
        let json_data = r#"
        {
            "ip": "127.0.0.1",
            "port": 8080
        }"#;

        let server: Server = serde_json::from_str(json_data).unwrap();
        assert_eq!(server.ip, Some("127.0.0.1".parse::<IpAddr>().unwrap()));
        assert_eq!(server.port, 8080);
    }

    #[test]
    fn deserialize_database_correctly() {
        let json_data = r#"
        {
            "endpoint": "http://127.0.0.1:5984/",
            "name": "custom_management",
            "documentId": "custom_doc",
            "timeout": "10s"
        }"#;

        let database: Database = serde_json::from_str(json_data).unwrap();
        assert_eq!(
            database.endpoint,
            Some(Url::parse("http://127.0.0.1:5984/").unwrap())
        );
        assert_eq!(database.name, "custom_management");
        assert_eq!(database.document_id, "custom_doc");
        assert_eq!(database.timeout, Duration::from_secs(10));
    }

    #[test]
    fn database_default_is_offline() {
        let database = Database::default();
        assert!(database.endpoint.is_none());
        assert_eq!(database.name, "configuration_management");
        assert_eq!(database.document_id, "extracted_config_data");
        assert_eq!(database.timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn load_config_correctly() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            b"
server:
  port: 4080
source: /etc/myapp/app_config.ini
database:
  endpoint: http://couchdb.internal:5984/
",
        )
        .await
        .unwrap();

        let config = Config::load(&file.path().to_path_buf()).await.unwrap();
        assert_eq!(config.server.ip, Some(IpAddr::from(Ipv4Addr::UNSPECIFIED)));
        assert_eq!(config.server.port, 4080);
        assert_eq!(config.source, PathBuf::from("/etc/myapp/app_config.ini"));
        assert_eq!(
            config.database.endpoint,
            Some(Url::parse("http://couchdb.internal:5984/").unwrap())
        );
    }

    #[tokio::test]
    async fn load_missing_config_falls_back_to_default() {
        let config = Config::load(&PathBuf::from("/nonexistent/vgconf.yaml"))
            .await
            .unwrap();
        assert_eq!(config.server.port, 3306);
        assert_eq!(config.server.ip, Some(IpAddr::from(Ipv4Addr::UNSPECIFIED)));
        assert!(config.database.endpoint.is_none());
    }
}
