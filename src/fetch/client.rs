use async_trait::async_trait;
use reqwest::{Method, Request, Response};

/// Transport used for the NDOV index and export downloads.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;

    /// Issues a GET and fails on non-2xx statuses.
    async fn get(&self, url: &str) -> anyhow::Result<Response> {
        let req = Request::new(Method::GET, url.parse()?);
        Ok(self.execute(req).await?.error_for_status()?)
    }
}
