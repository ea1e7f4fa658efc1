use thiserror::Error;

/// 連線器對呼叫端回報的錯誤，只有三種
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 傳輸層失敗（連線被拒、DNS、讀取 body 失敗等）
    #[error("Network error: {message}")]
    Network { message: String },

    /// 有收到回應，但狀態碼不在 200-299
    #[error("HTTP {status}: {status_text}")]
    Http { status: u16, status_text: String },

    /// 狀態成功但 body 無法解析成預期的 JSON
    #[error("fetchApi: bad JSON")]
    BadJson,
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        ApiError::Network {
            message: message.into(),
        }
    }

    /// HTTP 錯誤的狀態碼，其他種類回傳 None
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }
}

/// Transport 實作回報的失敗，連線器一律轉成 `ApiError::Network`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        ApiError::Network { message: e.message }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {message}")]
    Parse { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("HTTP client build failed: {0}")]
    Client(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;
