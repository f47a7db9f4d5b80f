//! npm Registry adapter
//!
//! Fetches package metadata from the npm registry.
//! API endpoint: https://registry.npmjs.org/{package}

use crate::error::RegistryError;
use crate::registry::{HttpClient, PackageMetadata, Registry};
use async_trait::async_trait;
use tracing::debug;

/// npm registry base URL
pub const NPM_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// npm Registry adapter
pub struct NpmRegistry {
    client: HttpClient,
    base_url: String,
}

impl NpmRegistry {
    /// Create an adapter for the public npm registry
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, NPM_REGISTRY_URL)
    }

    /// Create an adapter for a registry mirror or a test server
    pub fn with_base_url(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Encode package name for URL (scoped packages keep the `@`, the slash
    /// becomes `%2F`)
    fn encode_package_name(package: &str) -> String {
        if package.starts_with('@') {
            package.replace('/', "%2F")
        } else {
            package.to_string()
        }
    }

    /// Build the URL for a package
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}", self.base_url, Self::encode_package_name(package))
    }
}

#[async_trait]
impl Registry for NpmRegistry {
    fn registry_name(&self) -> &'static str {
        "npm"
    }

    async fn fetch_metadata(&self, package: &str) -> Result<PackageMetadata, RegistryError> {
        let url = self.build_url(package);
        let metadata: PackageMetadata = self
            .client
            .get_json(&url, package, self.registry_name())
            .await?;

        debug!(
            package,
            versions = metadata.versions.len(),
            "fetched registry metadata"
        );
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(base_url: &str) -> NpmRegistry {
        NpmRegistry::with_base_url(HttpClient::new().unwrap(), base_url)
    }

    #[test]
    fn test_npm_registry_name() {
        let registry = NpmRegistry::new(HttpClient::new().unwrap());
        assert_eq!(registry.registry_name(), "npm");
    }

    #[test]
    fn test_build_url() {
        let registry = NpmRegistry::new(HttpClient::new().unwrap());
        assert_eq!(
            registry.build_url("react"),
            "https://registry.npmjs.org/react"
        );
    }

    #[test]
    fn test_build_url_scoped_package() {
        let registry = NpmRegistry::new(HttpClient::new().unwrap());
        assert_eq!(
            registry.build_url("@types/react"),
            "https://registry.npmjs.org/@types%2Freact"
        );
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let registry = adapter("https://npm.example.com/");
        assert_eq!(registry.build_url("react"), "https://npm.example.com/react");
    }

    #[tokio::test]
    async fn test_fetch_metadata() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/react-dom")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "name": "react-dom",
                    "versions": {
                        "18.2.0": {"peerDependencies": {"react": "^18.2.0"}},
                        "19.1.0": {"peerDependencies": {"react": "^19.1.0"}}
                    },
                    "time": {"19.1.0": "2025-03-28T19:59:42.053Z"}
                }"#,
            )
            .create_async()
            .await;

        let metadata = adapter(&server.url())
            .fetch_metadata("react-dom")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(metadata.versions.len(), 2);
        assert_eq!(
            metadata.descriptor("18.2.0").unwrap().peer_range("react"),
            Some("^18.2.0")
        );
        assert!(metadata.released_at("19.1.0").is_some());
    }

    #[tokio::test]
    async fn test_fetch_metadata_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/does-not-exist")
            .with_status(404)
            .with_body(r#"{"error":"Not found"}"#)
            .create_async()
            .await;

        let err = adapter(&server.url())
            .fetch_metadata("does-not-exist")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::PackageNotFound { .. }));
    }

    #[tokio::test]
    async fn test_fetch_metadata_non_json_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/react")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let err = adapter(&server.url())
            .fetch_metadata("react")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidResponse { .. }));
        assert!(err.to_string().contains("'react'"));
    }
}
