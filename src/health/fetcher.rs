//! HTTP响应拉取器实现
//!
//! 对单个端点发起一次GET请求并读取完整响应体

use crate::error::{FetchError, VitalsError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// 一次成功拉取得到的响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBody {
    /// HTTP状态码
    pub status_code: u16,
    /// 响应体文本
    pub body: String,
}

/// 拉取器trait，定义单个端点的拉取接口
#[async_trait]
pub trait BodyFetcher: Send + Sync {
    /// 拉取端点响应体
    ///
    /// # 参数
    /// * `url` - 端点URL
    ///
    /// # 返回
    /// * `Result<FetchedBody, FetchError>` - 响应或传输错误
    async fn fetch(&self, url: &str) -> Result<FetchedBody, FetchError>;
}

/// 基于 reqwest 的HTTP拉取器
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    /// HTTP客户端
    client: Client,
    /// 请求超时时间
    timeout: Duration,
}

impl HttpFetcher {
    /// 创建新的HTTP拉取器
    ///
    /// # 参数
    /// * `timeout` - 单个请求的超时时间
    ///
    /// # 返回
    /// * `Result<Self, VitalsError>` - 拉取器实例
    pub fn new(timeout: Duration) -> Result<Self, VitalsError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()
            .map_err(|e| FetchError::Request(format!("创建HTTP客户端失败: {e}")))?;

        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl BodyFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedBody, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            debug!(url, error = %e, "could not send request");
            FetchError::from_reqwest(&e, self.timeout)
        })?;

        let status_code = response.status().as_u16();

        let body = response.text().await.map_err(|e| {
            debug!(url, error = %e, "could not read response body");
            if e.is_timeout() {
                FetchError::Timeout(self.timeout)
            } else {
                FetchError::Body(e.to_string())
            }
        })?;

        Ok(FetchedBody { status_code, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_http_fetcher_creation() {
        let fetcher = HttpFetcher::new(Duration::from_secs(10));
        assert!(fetcher.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_returns_body_and_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/health")
            .with_status(200)
            .with_body("status: ok")
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let fetched = fetcher
            .fetch(&format!("{}/health", server.url()))
            .await
            .unwrap();

        assert_eq!(fetched.status_code, 200);
        assert_eq!(fetched.body, "status: ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_still_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/down")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let fetched = fetcher
            .fetch(&format!("{}/down", server.url()))
            .await
            .unwrap();

        assert_eq!(fetched.status_code, 503);
        assert_eq!(fetched.body, "maintenance");
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let fetcher = HttpFetcher::new(Duration::from_secs(2)).unwrap();

        // 端口1上通常没有服务监听
        let result = fetcher.fetch("http://127.0.0.1:1/").await;

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            FetchError::Connect(_) | FetchError::Request(_) | FetchError::Timeout(_)
        ));
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let fetcher = HttpFetcher::new(Duration::from_secs(2)).unwrap();
        let result = fetcher.fetch("not a url").await;
        assert!(matches!(result, Err(FetchError::Request(_))));
    }
}
