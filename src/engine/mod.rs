// ==========================================
// 学术期刊审稿流程系统 - 引擎层
// ==========================================
// 依据: Journal_Dev_Master_Spec.md - PART D 引擎体系
// 依据: Review_Engine_Specs_v0.5.md - 3./4. 推导与生命周期
// ==========================================
// 职责: 实现评审轮状态机与生命周期编排,不拼 SQL
// 红线: Engine 不拼 SQL, 所有规则必须输出 reason
// ==========================================

pub mod events;
pub mod lifecycle;
pub mod providers;
pub mod status_cache;
pub mod status_resolver;
pub mod status_rules;

// 重导出核心引擎
pub use events::{
    NoOpEventPublisher, OptionalEventPublisher, ReviewEvent, ReviewEventPublisher,
    ReviewEventType,
};
pub use lifecycle::{RoundLifecycleService, StatusUpdateOutcome};
pub use providers::{DecisionProvider, EditorAssignmentProvider, ReviewAssignmentProvider};
pub use status_cache::RoundStatusCache;
pub use status_resolver::{RoundStatusResolver, StatusResolution};
pub use status_rules::{
    RecommendationTally, ResolveContext, RevisionDecisionCheck, StatusRule, STATUS_RULES,
};
