use anyhow::{Context, bail};
use pkg_types::api::ErrorResponse;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Thin JSON client over the seekr REST API.
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(server: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base: server.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base, path);
        debug!("{} {}", method, url);
        self.http.request(method, url)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let resp = send(self.request(Method::GET, path)).await?;
        Ok(resp.json().await?)
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        let resp = send(self.request(Method::POST, path).json(body)).await?;
        Ok(resp.json().await?)
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        let resp = send(self.request(Method::PUT, path).json(body)).await?;
        Ok(resp.json().await?)
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<()> {
        send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}

async fn send(req: RequestBuilder) -> anyhow::Result<Response> {
    let resp = req.send().await.context("failed to reach seekr-server")?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = match resp.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_string(),
    };
    if status == StatusCode::NOT_FOUND {
        bail!("not found: {}", message);
    }
    bail!("server returned {}: {}", status, message)
}
