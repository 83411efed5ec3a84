//! Client HTTP cho endpoint `/api/actions-list`, dùng chung cho native và wasm32.

use tracing::debug;

use crate::poll::FetchActions;
use crate::{parse_actions_str, ActivityEvent, FeedConfig, FeedError};

#[derive(Debug, Clone)]
pub struct ActionsClient {
    url: String,
    http: reqwest::Client,
}

impl ActionsClient {
    pub fn new(config: &FeedConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    pub fn with_http_client(config: &FeedConfig, http: reqwest::Client) -> Self {
        Self {
            url: config.actions_url(),
            http,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Một lần GET; mọi lỗi mạng, mã HTTP lỗi hay body hỏng đều trả về `FeedError`.
    pub async fn fetch(&self) -> Result<Vec<ActivityEvent>, FeedError> {
        let request_error = |source| FeedError::Request {
            url: self.url.clone(),
            source,
        };

        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(request_error)?;
        let events = parse_actions_str(&body)?;
        debug!(event = "feed.client.fetched", url = %self.url, count = events.len());
        Ok(events)
    }
}

impl FetchActions for ActionsClient {
    async fn fetch_actions(&self) -> Result<Vec<ActivityEvent>, FeedError> {
        self.fetch().await
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tạo được runtime")
            .block_on(future)
    }

    #[test]
    fn relative_base_fails_as_request_error() {
        let client = ActionsClient::new(&FeedConfig::with_api_base(""));
        assert_eq!(client.url(), "/api/actions-list");

        let err = block_on(client.fetch()).expect_err("URL tương đối không hợp lệ");
        assert!(matches!(err, FeedError::Request { .. }));
    }

    #[test]
    fn unreachable_backend_fails_as_request_error() {
        let client = ActionsClient::new(&FeedConfig::with_api_base("http://127.0.0.1:1"));

        let err = block_on(client.fetch()).expect_err("không có server ở cổng 1");
        assert!(matches!(err, FeedError::Request { ref url, .. } if url == "http://127.0.0.1:1/api/actions-list"));
    }
}
