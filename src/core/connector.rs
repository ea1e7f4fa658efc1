use crate::core::request::{build_url, HttpMethod, RequestConfig};
use crate::domain::ports::{AmbientHost, SocketProvider, Transport, TransportResponse};
use crate::utils::error::{ApiError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::{PoisonError, RwLock};

/// POST / PATCH 的成功結果：204 時是原始文字，其餘為解析後的 JSON
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiBody<D> {
    Parsed(D),
    Raw(String),
}

impl<D> ApiBody<D> {
    pub fn parsed(self) -> Option<D> {
        match self {
            ApiBody::Parsed(value) => Some(value),
            ApiBody::Raw(_) => None,
        }
    }
}

/// HTTP API 連線器
///
/// 每個請求方法都在「呼叫當下」就組好 URL（以及 body），之後才回傳 future，
/// 因此 `set_host` 只會影響之後發出的請求。
pub struct ApiConnector<T: Transport, A: AmbientHost> {
    transport: T,
    ambient: A,
    host: RwLock<String>,
}

impl<T: Transport, A: AmbientHost> ApiConnector<T, A> {
    pub fn new(transport: T, ambient: A) -> Self {
        let host = ambient.current_host();
        Self {
            transport,
            ambient,
            host: RwLock::new(host),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 空字串或 None 代表回到環境預設的 host
    pub fn set_host(&self, host: Option<&str>) {
        let next = match host {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => self.ambient.current_host(),
        };
        tracing::debug!("Switching API host to: {}", next);
        *self.host.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    pub fn host(&self) -> String {
        self.host
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn url(&self, path: &str, prefix: Option<&str>) -> String {
        let host = self.host.read().unwrap_or_else(PoisonError::into_inner);
        build_url(&host, path, prefix)
    }

    /// 預設 GET，method 可由 `options` 覆寫；回應解析成 JSON
    pub fn fetch_api<D>(
        &self,
        path: &str,
        options: RequestConfig,
        prefix: Option<&str>,
    ) -> impl Future<Output = Result<D>> + Send + '_
    where
        D: DeserializeOwned + Send,
    {
        let url = self.url(path, prefix);
        let config = options.with_forced(None, false);
        async move {
            let response = self.dispatch(&url, config).await?;
            parse_json(response).await
        }
    }

    /// `body` 為 None 時送出 `{}`
    pub fn post_api<B, D>(
        &self,
        path: &str,
        body: Option<&B>,
        options: RequestConfig,
        prefix: Option<&str>,
    ) -> impl Future<Output = Result<ApiBody<D>>> + Send + '_
    where
        B: Serialize + ?Sized,
        D: DeserializeOwned + Send,
    {
        self.send_json(HttpMethod::Post, path, body, options, prefix)
    }

    pub fn patch_api<B, D>(
        &self,
        path: &str,
        body: Option<&B>,
        options: RequestConfig,
        prefix: Option<&str>,
    ) -> impl Future<Output = Result<ApiBody<D>>> + Send + '_
    where
        B: Serialize + ?Sized,
        D: DeserializeOwned + Send,
    {
        self.send_json(HttpMethod::Patch, path, body, options, prefix)
    }

    pub fn delete_api<D>(
        &self,
        path: &str,
        options: RequestConfig,
        prefix: Option<&str>,
    ) -> impl Future<Output = Result<D>> + Send + '_
    where
        D: DeserializeOwned + Send,
    {
        let url = self.url(path, prefix);
        let config = options.with_forced(Some(HttpMethod::Delete), true);
        async move {
            let response = self.dispatch(&url, config).await?;
            parse_json(response).await
        }
    }

    pub fn get_api(
        &self,
        path: &str,
        options: RequestConfig,
        prefix: Option<&str>,
    ) -> impl Future<Output = Result<String>> + Send + '_ {
        let url = self.url(path, prefix);
        let config = options.with_forced(Some(HttpMethod::Get), false);
        async move {
            let response = self.dispatch(&url, config).await?;
            Ok(response.text().await?)
        }
    }

    /// 注意回傳值是反的：狀態「不是」2xx 時為 true，2xx 時為 false。
    /// 非 2xx 不算錯誤，只有傳輸失敗才會回傳 Err
    pub fn head_api(
        &self,
        path: &str,
        options: RequestConfig,
        prefix: Option<&str>,
    ) -> impl Future<Output = Result<bool>> + Send + '_ {
        let url = self.url(path, prefix);
        let config = options.with_forced(Some(HttpMethod::Head), false);
        async move {
            let response = self.send(&url, config).await?;
            Ok(!response.ok())
        }
    }

    pub fn download_api(
        &self,
        path: &str,
        options: RequestConfig,
        prefix: Option<&str>,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send + '_ {
        let url = self.url(path, prefix);
        let config = options.with_forced(Some(HttpMethod::Get), false);
        async move {
            let response = self.dispatch(&url, config).await?;
            Ok(response.bytes().await?)
        }
    }

    /// 用目前的 host 建立連線後，同步交給 `messager`
    pub fn open_socket_connection<I, F, R>(&self, io: &I, messager: F) -> R
    where
        I: SocketProvider,
        F: FnOnce(I::Connection) -> R,
    {
        let connection = io.connect(&self.host());
        messager(connection)
    }

    fn send_json<B, D>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        options: RequestConfig,
        prefix: Option<&str>,
    ) -> impl Future<Output = Result<ApiBody<D>>> + Send + '_
    where
        B: Serialize + ?Sized,
        D: DeserializeOwned + Send,
    {
        let url = self.url(path, prefix);
        // 序列化失敗既不是 HTTP 也不是 bad JSON，歸到 Network
        let payload = match body {
            Some(body) => serde_json::to_string(body).map_err(|e| ApiError::network(e.to_string())),
            None => Ok("{}".to_string()),
        };
        let mut config = options.with_forced(Some(method), true);
        async move {
            config.body = Some(payload?);
            let response = self.dispatch(&url, config).await?;
            if response.status() == 204 {
                return Ok(ApiBody::Raw(response.text().await?));
            }
            parse_json(response).await.map(ApiBody::Parsed)
        }
    }

    async fn send(&self, url: &str, config: RequestConfig) -> Result<T::Response> {
        tracing::debug!("Making API request: {} {}", config.effective_method(), url);
        let response = self.transport.request(url, config).await?;
        tracing::debug!("API response status: {}", response.status());
        Ok(response)
    }

    /// 狀態檢查在讀取 body 之前
    async fn dispatch(&self, url: &str, config: RequestConfig) -> Result<T::Response> {
        let response = self.send(url, config).await?;
        if !response.ok() {
            return Err(ApiError::Http {
                status: response.status(),
                status_text: response.status_text().to_string(),
            });
        }
        Ok(response)
    }
}

async fn parse_json<R, D>(response: R) -> Result<D>
where
    R: TransportResponse,
    D: DeserializeOwned,
{
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|_| ApiError::BadJson)
}
