use anyhow::Context;
use climate_types::{AlertsResponse, RegionImpact, StatusResponse};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const HTTP_IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a request that reached the API.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Fetched<T> {
    Ok(T),
    Status(u16),
}

#[derive(Debug, Clone)]
pub(crate) struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub(crate) fn new(base_url: &str) -> anyhow::Result<Self> {
        let base =
            Url::parse(base_url).with_context(|| format!("invalid api url {base_url}"))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("api url {base_url} cannot be used as a base");
        }
        let http = Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(HTTP_IO_TIMEOUT)
            .build()
            .context("failed to build http client")?;
        Ok(Self { http, base })
    }

    pub(crate) fn base_url(&self) -> &str {
        self.base.as_str()
    }

    pub(crate) async fn status(&self) -> anyhow::Result<Fetched<StatusResponse>> {
        self.get_json(self.endpoint(&["status"])).await
    }

    pub(crate) async fn predictions(&self, region: &str) -> anyhow::Result<Fetched<RegionImpact>> {
        self.get_json(self.endpoint(&["predictions", region])).await
    }

    pub(crate) async fn alerts(&self) -> anyhow::Result<Fetched<AlertsResponse>> {
        self.get_json(self.endpoint(&["alerts"])).await
    }

    /// Appends percent-encoded path segments to the base url.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> anyhow::Result<Fetched<T>> {
        let response = self
            .http
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "api returned error status");
            return Ok(Fetched::Status(status.as_u16()));
        }
        let body = response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode response from {url}"))?;
        tracing::debug!(url = %url, status = status.as_u16(), "api request served");
        Ok(Fetched::Ok(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_segment_is_percent_encoded() {
        let client = ApiClient::new("http://127.0.0.1:8000").expect("client");
        assert_eq!(
            client.endpoint(&["predictions", "Austin, TX"]).as_str(),
            "http://127.0.0.1:8000/predictions/Austin,%20TX"
        );
        assert_eq!(
            client.endpoint(&["predictions", "a/b"]).as_str(),
            "http://127.0.0.1:8000/predictions/a%2Fb"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let client = ApiClient::new("http://localhost:8000/climate/").expect("client");
        assert_eq!(
            client.endpoint(&["status"]).as_str(),
            "http://localhost:8000/climate/status"
        );
    }

    #[test]
    fn rejects_invalid_urls() {
        assert!(ApiClient::new("not a url").is_err());
        assert!(ApiClient::new("mailto:ops@example.com").is_err());
    }
}
