use crate::domain::ports::ContentSource;
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use url::Url;

/// Fetches site files relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base: Url,
}

impl HttpSource {
    pub fn new(base: &str) -> Result<Self> {
        // Url::join drops the last segment unless the base ends in a slash
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };
        let base = Url::parse(&normalized).map_err(|e| SiteError::InvalidConfigValueError {
            field: "content.base".to_string(),
            value: base.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    fn resolve(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| SiteError::InvalidConfigValueError {
                field: "content path".to_string(),
                value: path.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    async fn fetch_json(&self, path: &str) -> Result<serde_json::Value> {
        let url = self.resolve(path)?;
        tracing::debug!("Fetching content from: {}", url);

        let response = self.client.get(url.clone()).send().await?;
        tracing::debug!("Content response status: {}", response.status());

        if !response.status().is_success() {
            return Err(SiteError::ContentStatusError {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }

    fn describe(&self) -> String {
        self.base.to_string()
    }
}

/// Reads site files from a local directory laid out like the web root.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ContentSource for DirSource {
    async fn fetch_json(&self, path: &str) -> Result<serde_json::Value> {
        let full_path = self.root.join(path.trim_start_matches('/'));
        tracing::debug!("Reading content from: {}", full_path.display());

        let data = tokio::fs::read(&full_path).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn http_source_joins_relative_paths() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/site/data/news.json");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([]));
        });

        let source = HttpSource::new(&server.url("/site")).unwrap();
        let value = source.fetch_json("data/news.json").await.unwrap();

        mock.assert();
        assert_eq!(value, serde_json::json!([]));
    }

    #[tokio::test]
    async fn http_source_reports_bad_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/data/programs.json");
            then.status(404);
        });

        let source = HttpSource::new(&server.base_url()).unwrap();
        let err = source.fetch_json("data/programs.json").await.unwrap_err();
        assert!(matches!(err, SiteError::ContentStatusError { status: 404, .. }));
    }

    #[tokio::test]
    async fn dir_source_reads_json_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("translations")).unwrap();
        std::fs::write(
            dir.path().join("translations/en.json"),
            r#"{"nav.home": "Home"}"#,
        )
        .unwrap();

        let source = DirSource::new(dir.path());
        let value = source.fetch_json("translations/en.json").await.unwrap();
        assert_eq!(value["nav.home"], "Home");

        assert!(source.fetch_json("translations/ru.json").await.is_err());
    }
}
