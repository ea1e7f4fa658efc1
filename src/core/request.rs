use std::fmt;
use std::time::Duration;

pub const DEFAULT_PREFIX: &str = "api";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
    Head,
    Put,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Put => "PUT",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 對應 fetch 的 credentials 模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials {
    Omit,
    SameOrigin,
    Include,
}

/// 呼叫端可覆寫的請求設定。連線器固定的欄位（method、credentials、
/// Content-Type）會蓋掉這裡同名的值
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestConfig {
    pub method: Option<HttpMethod>,
    pub headers: Vec<(String, String)>,
    pub credentials: Option<Credentials>,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// 標頭名稱不分大小寫，已存在就取代
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn effective_method(&self) -> HttpMethod {
        self.method.unwrap_or(HttpMethod::Get)
    }

    /// 套用連線器固定的欄位
    pub(crate) fn with_forced(mut self, method: Option<HttpMethod>, json: bool) -> Self {
        if let Some(method) = method {
            self.method = Some(method);
        }
        if json {
            self.set_header(CONTENT_TYPE, APPLICATION_JSON);
        }
        self.credentials = Some(Credentials::Include);
        self
    }
}

/// `//{host}/{prefix}/{path}`；prefix 為空時省略該段。path 不做任何跳脫
pub fn build_url(host: &str, path: &str, prefix: Option<&str>) -> String {
    let prefix = prefix.unwrap_or(DEFAULT_PREFIX);
    if prefix.is_empty() {
        format!("//{}/{}", host, path)
    } else {
        format!("//{}/{}/{}", host, prefix, path)
    }
}
