use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::error::FetchError;

/// RNLI API 返回的单条出动记录
///
/// 固定字段之外的所有 JSON 键都原样收进 `extra`，
/// API 增加字段时不会丢数据。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchRecord {
    /// 记录 ID
    #[serde(default)]
    pub id: String,

    /// 站点短名（过滤键）
    #[serde(rename = "shortName", default)]
    pub short_name: String,

    /// 站点全称
    #[serde(default)]
    pub title: String,

    /// 救生艇编号
    #[serde(rename = "lifeboat_IdNo", default)]
    pub lifeboat_id: Option<String>,

    /// 出动时间（ISO-8601 原始字符串，缺失时为空串）
    #[serde(rename = "launchDate", default)]
    pub launch_date: String,

    /// 站点网址
    #[serde(default)]
    pub website: Option<String>,

    /// 未识别字段
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// 站点条目（short name 去重后的选择列表）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// 站点短名
    pub short_name: String,

    /// 站点全称
    pub title: String,
}

/// 协调器持有的缓存条目
///
/// 只会被刷新操作整体替换，读取方拿到的永远是完整快照。
#[derive(Debug, Clone, Default)]
pub struct CacheEntry {
    /// 该站点的出动记录，按出动时间降序
    pub launches: Vec<LaunchRecord>,

    /// 最后一次成功刷新时间
    pub last_success: Option<DateTime<Utc>>,

    /// 最后一次刷新失败原因（下次成功后清除）
    pub last_error: Option<FetchError>,
}

impl CacheEntry {
    /// 最近一次出动
    pub fn latest(&self) -> Option<&LaunchRecord> {
        self.launches.first()
    }

    /// 上次刷新是否失败（数据仍是之前的快照）
    pub fn is_stale(&self) -> bool {
        self.last_error.is_some()
    }
}
