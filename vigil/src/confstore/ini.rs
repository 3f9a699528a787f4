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

use ini::Ini;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::instrument;
use vigil_core::{
    error::{ErrorType, ExternalError, OrErr},
    Result,
};

/// SectionMap is the extracted configuration, keyed by section name and
/// property name. Keys and values are kept as written in the file.
pub type SectionMap = BTreeMap<String, BTreeMap<String, String>>;

/// parse_file parses an ini configuration file into a section map. A missing
/// or invalid file is an error, and so is a file without any section since an
/// empty extraction carries no configuration.
#[instrument(skip_all)]
pub fn parse_file(path: &Path) -> Result<SectionMap> {
    let ini = Ini::load_from_file(path).or_err(ErrorType::ParseError)?;

    let mut sections = SectionMap::new();
    for (name, properties) in ini.iter() {
        // Properties outside of any section are ignored.
        let Some(name) = name else {
            continue;
        };

        let section = sections.entry(name.to_string()).or_default();
        for (key, value) in properties.iter() {
            section.insert(key.to_string(), value.to_string());
        }
    }

    if sections.is_empty() {
        return Err(ExternalError::new(ErrorType::ParseError)
            .with_context(format!("no sections in {}", path.display()))
            .into());
    }

    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;
    use tokio::fs;

    #[tokio::test]
    async fn test_parse_file_extracts_sections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app_config.ini");
        fs::write(
            &path,
            b"[database]
host = localhost
Port = 5432

[app_settings]
debug_mode = True
",
        )
        .await
        .unwrap();

        let sections = parse_file(&path).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections["database"]["host"], "localhost");
        assert_eq!(sections["app_settings"]["debug_mode"], "True");

        // Key case is preserved as written.
        assert_eq!(sections["database"]["Port"], "5432");
    }

    #[tokio::test]
    async fn test_parse_file_ignores_properties_outside_sections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app_config.ini");
        fs::write(
            &path,
            b"orphan = value

[database]
host = localhost
",
        )
        .await
        .unwrap();

        let sections = parse_file(&path).unwrap();
        assert_eq!(sections.len(), 1);
        assert!(sections.contains_key("database"));
    }

    #[test]
    fn test_parse_file_fails_on_missing_file() {
        let result = parse_file(&PathBuf::from("/nonexistent/app_config.ini"));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_parse_file_fails_without_sections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app_config.ini");
        fs::write(&path, b"").await.unwrap();

        let result = parse_file(&path);
        assert!(result.is_err());
    }
}
