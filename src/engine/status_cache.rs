// ==========================================
// 学术期刊审稿流程系统 - 评审轮状态缓存
// ==========================================
// 职责: 进程内状态缓存,减少工作台高频读的重复推导
// 约束: 每次成功写入/删除必须失效对应条目
// 说明: 缓存是可选优化,未命中时以库内值为准
// ==========================================

use crate::domain::types::RoundStatus;
use std::collections::HashMap;
use std::sync::Mutex;

// ==========================================
// RoundStatusCache
// ==========================================
#[derive(Debug, Default)]
pub struct RoundStatusCache {
    inner: Mutex<HashMap<String, RoundStatus>>,
}

impl RoundStatusCache {
    /// 创建空缓存
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取缓存状态
    pub fn get(&self, round_id: &str) -> Option<RoundStatus> {
        self.inner.lock().ok()?.get(round_id).copied()
    }

    /// 写入缓存(成功落库后调用)
    pub fn put(&self, round_id: &str, status: RoundStatus) {
        if let Ok(mut map) = self.inner.lock() {
            map.insert(round_id.to_string(), status);
        }
    }

    /// 失效单个条目(状态写入或评审轮删除后调用)
    pub fn invalidate(&self, round_id: &str) {
        if let Ok(mut map) = self.inner.lock() {
            map.remove(round_id);
        }
    }

    /// 清空缓存
    pub fn clear(&self) {
        if let Ok(mut map) = self.inner.lock() {
            map.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_invalidate() {
        let cache = RoundStatusCache::new();
        assert_eq!(cache.get("RR-1"), None);

        cache.put("RR-1", RoundStatus::ReviewsReady);
        assert_eq!(cache.get("RR-1"), Some(RoundStatus::ReviewsReady));

        cache.invalidate("RR-1");
        assert_eq!(cache.get("RR-1"), None);
    }

    #[test]
    fn test_clear() {
        let cache = RoundStatusCache::new();
        cache.put("RR-1", RoundStatus::Accepted);
        cache.put("RR-2", RoundStatus::Declined);
        cache.clear();
        assert_eq!(cache.get("RR-1"), None);
        assert_eq!(cache.get("RR-2"), None);
    }
}
