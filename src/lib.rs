// ==========================================
// 学术期刊审稿流程系统 - 核心库
// ==========================================
// 依据: Journal_Dev_Master_Spec.md - 系统宪法
// 技术栈: Rust + SQLite
// 系统定位: 评审轮状态引擎 (编辑最终控制权)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施(连接初始化/PRAGMA 统一)
pub mod db;

// 日志系统
pub mod logging;

// SQL 观测(慢查询/语句计数)
pub mod perf;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DecisionType, ReviewAssignmentStatus, RoundStatus, StageId};

// 领域实体
pub use domain::{
    EditorialDecision, ReviewAssignment, ReviewRound, ReviewRoundSetting, StageAssignment,
};

// 引擎
pub use engine::{
    NoOpEventPublisher, OptionalEventPublisher, ReviewEvent, ReviewEventPublisher,
    ReviewEventType, RoundLifecycleService, RoundStatusCache, RoundStatusResolver,
    StatusResolution, StatusUpdateOutcome,
};

// 仓储
pub use repository::{
    DecisionRepository, RepositoryError, RepositoryResult, ReviewAssignmentRepository,
    ReviewRoundRepository, StageAssignmentRepository,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "学术期刊审稿流程系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.2";

// ==========================================
// 预编译检查
// ==========================================

// 确保编译时所有模块可见
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
