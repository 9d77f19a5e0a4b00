//! Request/response calls to the backend's HTTP API (outside the push socket).

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::{ControlError, Result};
use crate::types::{CacheTtlReply, ScanResult, ServerInfo, StartScanReply};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct ControlClient {
    http: reqwest::Client,
    base: Url,
}

impl ControlClient {
    pub fn new(base: Url) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, base })
    }

    // GET /api/info
    pub async fn server_info(&self) -> Result<ServerInfo> {
        let req = self.http.get(self.endpoint("api/info")?);
        self.send(req).await
    }

    // POST /api/ncdu/scan
    pub async fn start_scan(&self, path: &str) -> Result<StartScanReply> {
        let req = self
            .http
            .post(self.endpoint("api/ncdu/scan")?)
            .json(&json!({ "path": path }));
        self.send(req).await
    }

    // DELETE /api/ncdu/scan
    pub async fn cancel_scan(&self) -> Result<()> {
        let req = self.http.delete(self.endpoint("api/ncdu/scan")?);
        let _: serde_json::Value = self.send(req).await?;
        Ok(())
    }

    // GET /api/ncdu/status
    pub async fn scan_status(&self) -> Result<ScanResult> {
        let req = self.http.get(self.endpoint("api/ncdu/status")?);
        self.send(req).await
    }

    // GET /api/ncdu/cache
    pub async fn cache_ttl(&self) -> Result<CacheTtlReply> {
        let req = self.http.get(self.endpoint("api/ncdu/cache")?);
        self.send(req).await
    }

    // PUT /api/ncdu/cache
    pub async fn set_cache_ttl(&self, secs: u64) -> Result<CacheTtlReply> {
        let req = self
            .http
            .put(self.endpoint("api/ncdu/cache")?)
            .json(&json!({ "cache_ttl_sec": secs }));
        self.send(req).await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T> {
        let resp = req.send().await?;
        let status = resp.status();
        debug!(status = status.as_u16(), url = %resp.url(), "control reply");
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ControlError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json::<T>().await?)
    }
}
