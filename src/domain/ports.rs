use crate::core::request::RequestConfig;
use crate::utils::error::TransportError;
use async_trait::async_trait;

/// 類 fetch 的傳輸層：一次呼叫對應一次 HTTP 來回
#[async_trait]
pub trait Transport: Send + Sync {
    type Response: TransportResponse;

    /// `url` 是 scheme-relative 形式（`//host/...`），由實作決定如何解析
    async fn request(
        &self,
        url: &str,
        config: RequestConfig,
    ) -> std::result::Result<Self::Response, TransportError>;
}

#[async_trait]
pub trait TransportResponse: Send + Sized {
    fn status(&self) -> u16;
    fn status_text(&self) -> &str;

    fn ok(&self) -> bool {
        (200..300).contains(&self.status())
    }

    async fn text(self) -> std::result::Result<String, TransportError>;
    async fn bytes(self) -> std::result::Result<Vec<u8>, TransportError>;
}

/// 提供「目前所在 host」的外部來源，只在建構與重設 host 時使用
pub trait AmbientHost: Send + Sync {
    fn current_host(&self) -> String;
}

impl<F> AmbientHost for F
where
    F: Fn() -> String + Send + Sync,
{
    fn current_host(&self) -> String {
        self()
    }
}

/// Socket 協作者，協定本身不在本 crate 範圍
pub trait SocketProvider {
    type Connection;

    fn connect(&self, host: &str) -> Self::Connection;
}
