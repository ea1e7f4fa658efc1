use crate::core::request::{Credentials, HttpMethod, RequestConfig};
use crate::domain::ports::{Transport, TransportResponse};
use crate::utils::error::{ConfigError, TransportError};
use async_trait::async_trait;
use hyper::ext::ReasonPhrase;
use hyper::http::Extensions;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, COOKIE};
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;
use url::Url;

/// 建立 reqwest Client 時套用的全域設定
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportSettings {
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
    pub headers: Vec<(String, String)>,
}

/// 以 reqwest 實作的傳輸層。scheme-relative URL 會以 `scheme` 補齊
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    scheme: String,
}

impl ReqwestTransport {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self::with_client(Client::new(), scheme)
    }

    pub fn with_client(client: Client, scheme: impl Into<String>) -> Self {
        Self {
            client,
            scheme: scheme.into(),
        }
    }

    pub fn from_settings(
        scheme: impl Into<String>,
        settings: &TransportSettings,
    ) -> std::result::Result<Self, ConfigError> {
        let mut builder = Client::builder();

        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(user_agent) = &settings.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        if !settings.headers.is_empty() {
            let mut defaults = HeaderMap::new();
            for (name, value) in &settings.headers {
                let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                    ConfigError::InvalidValue {
                        field: "transport.headers".to_string(),
                        value: name.clone(),
                        reason: e.to_string(),
                    }
                })?;
                let header_value =
                    HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidValue {
                        field: format!("transport.headers.{}", name),
                        value: value.clone(),
                        reason: e.to_string(),
                    })?;
                defaults.insert(header_name, header_value);
            }
            builder = builder.default_headers(defaults);
        }

        Ok(Self::with_client(builder.build()?, scheme))
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// `//host/path` 轉成 `{scheme}://host/path`，已是絕對 URL 則原樣解析
    pub fn resolve(&self, url: &str) -> std::result::Result<Url, TransportError> {
        let absolute = if url.starts_with("//") {
            format!("{}:{}", self.scheme, url)
        } else {
            url.to_string()
        };

        Url::parse(&absolute)
            .map_err(|e| TransportError::new(format!("Invalid request URL '{}': {}", absolute, e)))
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Options => Method::OPTIONS,
    }
}

/// 伺服器回傳的 reason phrase 與標準不同時，hyper 會放在 extensions 裡
fn status_text(extensions: &Extensions, status: StatusCode) -> String {
    match extensions.get::<ReasonPhrase>() {
        Some(reason) => String::from_utf8_lossy(reason.as_bytes()).into_owned(),
        None => status.canonical_reason().unwrap_or_default().to_string(),
    }
}

fn is_credential_header(name: &str) -> bool {
    name.eq_ignore_ascii_case(COOKIE.as_str()) || name.eq_ignore_ascii_case(AUTHORIZATION.as_str())
}

#[async_trait]
impl Transport for ReqwestTransport {
    type Response = ReqwestResponse;

    async fn request(
        &self,
        url: &str,
        config: RequestConfig,
    ) -> std::result::Result<ReqwestResponse, TransportError> {
        let url = self.resolve(url)?;
        let mut request = self.client.request(to_method(config.effective_method()), url);

        // Omit 模式不帶任何憑證標頭
        let omit_credentials = config.credentials == Some(Credentials::Omit);
        for (key, value) in &config.headers {
            if omit_credentials && is_credential_header(key) {
                continue;
            }
            request = request.header(key, value);
        }

        if let Some(body) = config.body {
            request = request.body(body);
        }

        if let Some(timeout) = config.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        Ok(ReqwestResponse::new(response))
    }
}

pub struct ReqwestResponse {
    status: u16,
    status_text: String,
    inner: reqwest::Response,
}

impl ReqwestResponse {
    fn new(inner: reqwest::Response) -> Self {
        let status = inner.status();
        let status_text = status_text(inner.extensions(), status);
        Self {
            status: status.as_u16(),
            status_text,
            inner,
        }
    }
}

#[async_trait]
impl TransportResponse for ReqwestResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn status_text(&self) -> &str {
        &self.status_text
    }

    async fn text(self) -> std::result::Result<String, TransportError> {
        Ok(self.inner.text().await?)
    }

    async fn bytes(self) -> std::result::Result<Vec<u8>, TransportError> {
        Ok(self.inner.bytes().await?.to_vec())
    }
}
