// ==========================================
// 学术期刊审稿流程系统 - 引擎层事件发布
// ==========================================
// 职责: 定义评审轮事件发布 trait,实现依赖倒置
// 说明: Engine 层定义 trait,通知/邮件派发子系统实现适配器
// 红线: 引擎不直接依赖任何派发通道
// ==========================================

use crate::domain::types::RoundStatus;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// 评审轮事件类型
// ==========================================

/// 评审轮事件触发类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewEventType {
    /// 评审轮创建
    RoundCreated,
    /// 评审轮状态变更(最小写入命中后发布)
    RoundStatusChanged,
    /// 评审轮删除
    RoundDeleted,
}

impl ReviewEventType {
    /// 转换为字符串标识
    pub fn as_str(&self) -> &str {
        match self {
            ReviewEventType::RoundCreated => "RoundCreated",
            ReviewEventType::RoundStatusChanged => "RoundStatusChanged",
            ReviewEventType::RoundDeleted => "RoundDeleted",
        }
    }
}

/// 评审轮事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEvent {
    /// 评审轮 ID
    pub round_id: String,
    /// 稿件 ID
    pub submission_id: String,
    /// 事件类型
    pub event_type: ReviewEventType,
    /// 变更前状态(状态变更事件携带)
    pub previous_status: Option<RoundStatus>,
    /// 变更后状态(状态变更事件携带)
    pub new_status: Option<RoundStatus>,
    /// 事件来源描述
    pub source: Option<String>,
}

impl ReviewEvent {
    /// 创建状态变更事件
    pub fn status_changed(
        round_id: String,
        submission_id: String,
        previous_status: Option<RoundStatus>,
        new_status: RoundStatus,
        source: Option<String>,
    ) -> Self {
        Self {
            round_id,
            submission_id,
            event_type: ReviewEventType::RoundStatusChanged,
            previous_status,
            new_status: Some(new_status),
            source,
        }
    }

    /// 创建生命周期事件(创建/删除)
    pub fn lifecycle(
        round_id: String,
        submission_id: String,
        event_type: ReviewEventType,
        source: Option<String>,
    ) -> Self {
        Self {
            round_id,
            submission_id,
            event_type,
            previous_status: None,
            new_status: None,
            source,
        }
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 评审轮事件发布者 Trait
///
/// Engine 层定义,通知派发层实现
/// 下游(评审人邀请邮件、编辑工作台通知)只消费本引擎计算出的状态
pub trait ReviewEventPublisher: Send + Sync {
    /// 发布评审轮事件
    ///
    /// # 返回
    /// - Ok(()): 已入队/已投递
    /// - Err: 发布失败(由调用方决定是否致命)
    fn publish(&self, event: ReviewEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
///
/// 用于不需要事件发布的场景(如单元测试、审计工具)
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl ReviewEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: ReviewEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpEventPublisher: 跳过事件发布 - round_id={}, event_type={}",
            event.round_id,
            event.event_type.as_str()
        );
        Ok(())
    }
}

/// 可选事件发布者包装
///
/// None 时等价于 NoOp;发布失败仅记日志,不中断状态写入
#[derive(Clone, Default)]
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn ReviewEventPublisher>>,
}

impl OptionalEventPublisher {
    /// 包装一个具体发布者
    pub fn some(publisher: Arc<dyn ReviewEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    /// 不发布任何事件
    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 尽力发布(失败降级为告警日志)
    pub fn publish_best_effort(&self, event: ReviewEvent) {
        if let Some(publisher) = &self.inner {
            if let Err(e) = publisher.publish(event) {
                tracing::warn!("评审轮事件发布失败(已忽略): {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPublisher {
        events: Mutex<Vec<ReviewEvent>>,
    }

    impl ReviewEventPublisher for RecordingPublisher {
        fn publish(&self, event: ReviewEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    #[test]
    fn test_noop_publisher_accepts_events() {
        let publisher = NoOpEventPublisher;
        let event = ReviewEvent::lifecycle(
            "RR-1".to_string(),
            "SUB-1".to_string(),
            ReviewEventType::RoundCreated,
            None,
        );
        assert!(publisher.publish(event).is_ok());
    }

    #[test]
    fn test_optional_publisher_forwards() {
        let recording = Arc::new(RecordingPublisher::default());
        let optional = OptionalEventPublisher::some(recording.clone());

        optional.publish_best_effort(ReviewEvent::status_changed(
            "RR-1".to_string(),
            "SUB-1".to_string(),
            None,
            RoundStatus::PendingReviewers,
            Some("test".to_string()),
        ));

        let events = recording.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, ReviewEventType::RoundStatusChanged);
        assert_eq!(events[0].new_status, Some(RoundStatus::PendingReviewers));
    }

    #[test]
    fn test_optional_publisher_none_is_silent() {
        let optional = OptionalEventPublisher::none();
        optional.publish_best_effort(ReviewEvent::lifecycle(
            "RR-1".to_string(),
            "SUB-1".to_string(),
            ReviewEventType::RoundDeleted,
            None,
        ));
    }
}
