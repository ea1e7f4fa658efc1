use crate::domain::ports::AmbientHost;

/// 固定不變的預設 host，通常來自設定檔
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticHost {
    host: String,
}

impl StaticHost {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

impl AmbientHost for StaticHost {
    fn current_host(&self) -> String {
        self.host.clone()
    }
}
