use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 分頁回應的外殼。連線器不建立也不驗證，只描述端點應回傳的形狀
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub total: u64,
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
}

/// 大多數資源共用的基本欄位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
