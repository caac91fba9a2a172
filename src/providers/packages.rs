use log::info;
use serde::{Deserialize, Serialize};
use url::Url;

use super::encode;
use crate::error::{BuildStatsError, Result};
use crate::transport::Transport;

pub const NUGET_BASE_URL: &str = "https://api-v3search-0.nuget.org";
pub const MYGET_BASE_URL: &str = "https://www.myget.org";

/// Latest published version and download count of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    pub downloads: u64,
}

#[derive(Debug, Deserialize)]
struct NuGetSearchResponse {
    data: Vec<NuGetPackage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NuGetPackage {
    id: String,
    version: String,
    total_downloads: u64,
}

#[derive(Debug, Deserialize)]
struct MyGetFeedResponse {
    d: Vec<MyGetPackage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MyGetPackage {
    id: String,
    version: String,
    download_count: u64,
}

/// Looks up packages on the NuGet search service.
pub struct NuGetClient<T> {
    transport: T,
    base_url: String,
}

impl<T: Transport> NuGetClient<T> {
    pub fn new(transport: T, base_url: &str) -> Result<Self> {
        Ok(Self {
            transport,
            base_url: validate_base_url("NuGet", base_url)?,
        })
    }

    /// Returns the top search hit for `package`. Prerelease versions are
    /// only considered when `include_prereleases` is set.
    pub async fn get_package_info(
        &self,
        package: &str,
        include_prereleases: bool,
    ) -> Result<PackageInfo> {
        let url = format!(
            "{}/query?q={}&skip=0&take=1&prerelease={include_prereleases}",
            self.base_url,
            encode(package)
        );
        info!("Looking up NuGet package {package}");

        let body = self
            .transport
            .get(&url)
            .await
            .ok_or_else(|| BuildStatsError::PackageNotFound(package.to_string()))?;

        let response: NuGetSearchResponse =
            serde_json::from_str(&body).map_err(|source| BuildStatsError::Parse {
                provider: "NuGet",
                source,
            })?;

        response
            .data
            .into_iter()
            .next()
            .map(|p| PackageInfo {
                name: p.id,
                version: p.version,
                downloads: p.total_downloads,
            })
            .ok_or_else(|| BuildStatsError::PackageNotFound(package.to_string()))
    }
}

/// Looks up packages in a MyGet feed.
pub struct MyGetClient<T> {
    transport: T,
    base_url: String,
}

impl<T: Transport> MyGetClient<T> {
    pub fn new(transport: T, base_url: &str) -> Result<Self> {
        Ok(Self {
            transport,
            base_url: validate_base_url("MyGet", base_url)?,
        })
    }

    /// Returns the most recently published version of `package` in `feed`.
    pub async fn get_package_info(&self, feed: &str, package: &str) -> Result<PackageInfo> {
        let filter = encode(&format!("Id eq '{package}'"));
        let url = format!(
            "{}/F/{feed}/api/v2/Packages()?$filter={filter}&$orderby=Published%20desc&$top=10",
            self.base_url
        );
        info!("Looking up MyGet package {package} in feed {feed}");

        let body = self
            .transport
            .get(&url)
            .await
            .ok_or_else(|| BuildStatsError::PackageNotFound(package.to_string()))?;

        let response: MyGetFeedResponse =
            serde_json::from_str(&body).map_err(|source| BuildStatsError::Parse {
                provider: "MyGet",
                source,
            })?;

        response
            .d
            .into_iter()
            .next()
            .map(|p| PackageInfo {
                name: p.id,
                version: p.version,
                downloads: p.download_count,
            })
            .ok_or_else(|| BuildStatsError::PackageNotFound(package.to_string()))
    }
}

fn validate_base_url(service: &str, base_url: &str) -> Result<String> {
    Url::parse(base_url).map_err(|e| {
        BuildStatsError::Config(format!("Invalid {service} base URL {base_url:?}: {e}"))
    })?;
    Ok(base_url.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpTransport;
    use mockito::Matcher;

    #[tokio::test]
    async fn fetches_nuget_package() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/query")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "Newtonsoft.Json".into()),
                Matcher::UrlEncoded("take".into(), "1".into()),
                Matcher::UrlEncoded("prerelease".into(), "false".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"totalHits": 1, "data": [
                    {"id": "Newtonsoft.Json", "version": "9.0.1", "totalDownloads": 67451234, "tags": ["json"]}
                ]}"#,
            )
            .create_async()
            .await;

        let client = NuGetClient::new(HttpTransport::new(None).unwrap(), &server.url()).unwrap();
        let info = client
            .get_package_info("Newtonsoft.Json", false)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            info,
            PackageInfo {
                name: "Newtonsoft.Json".to_string(),
                version: "9.0.1".to_string(),
                downloads: 67_451_234,
            }
        );
    }

    #[tokio::test]
    async fn asks_nuget_for_prereleases_when_requested() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/query")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "Giraffe".into()),
                Matcher::UrlEncoded("prerelease".into(), "true".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"totalHits": 1, "data": [
                    {"id": "Giraffe", "version": "1.0.0-alpha3", "totalDownloads": 4500}
                ]}"#,
            )
            .create_async()
            .await;

        let client = NuGetClient::new(HttpTransport::new(None).unwrap(), &server.url()).unwrap();
        let info = client.get_package_info("Giraffe", true).await.unwrap();

        mock.assert_async().await;
        assert_eq!(info.version, "1.0.0-alpha3");
    }

    #[tokio::test]
    async fn empty_nuget_result_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/query")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"totalHits": 0, "data": []}"#)
            .create_async()
            .await;

        let client = NuGetClient::new(HttpTransport::new(None).unwrap(), &server.url()).unwrap();
        let err = client
            .get_package_info("does-not-exist", false)
            .await
            .unwrap_err();

        assert!(matches!(err, BuildStatsError::PackageNotFound(ref name) if name == "does-not-exist"));
    }

    #[tokio::test]
    async fn fetches_myget_package() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/F/lambda-feed/api/v2/Packages()")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("$filter".into(), "Id eq 'Lambda.Core'".into()),
                Matcher::UrlEncoded("$top".into(), "10".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"d": [
                    {"Id": "Lambda.Core", "Version": "2.1.0-beta", "DownloadCount": 312},
                    {"Id": "Lambda.Core", "Version": "2.0.0", "DownloadCount": 300}
                ]}"#,
            )
            .create_async()
            .await;

        let client = MyGetClient::new(HttpTransport::new(None).unwrap(), &server.url()).unwrap();
        let info = client
            .get_package_info("lambda-feed", "Lambda.Core")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(info.name, "Lambda.Core");
        assert_eq!(info.version, "2.1.0-beta");
        assert_eq!(info.downloads, 312);
    }

    #[tokio::test]
    async fn failed_myget_request_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/F/private/api/v2/Packages()")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let client = MyGetClient::new(HttpTransport::new(None).unwrap(), &server.url()).unwrap();
        let result = client.get_package_info("private", "Secret.Package").await;

        assert!(matches!(result, Err(BuildStatsError::PackageNotFound(_))));
    }

    #[test]
    fn rejects_invalid_base_url() {
        let result = NuGetClient::new(HttpTransport::new(None).unwrap(), "not a url");
        assert!(matches!(result, Err(BuildStatsError::Config(_))));
    }
}
