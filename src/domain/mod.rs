// ==========================================
// 学术期刊审稿流程系统 - 领域模型层
// ==========================================
// 依据: Journal_Dev_Master_Spec.md - PART C 数据与状态体系
// 依据: Review_Engine_Specs_v0.5.md - 主实体定义
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod review;
pub mod review_round;
pub mod types;

// 重导出核心类型
pub use review::{EditorialDecision, ReviewAssignment, StageAssignment};
pub use review_round::{ReviewRound, ReviewRoundSetting};
pub use types::{DecisionType, ReviewAssignmentStatus, RoundStatus, StageId};
