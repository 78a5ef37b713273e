// ==========================================
// 学术期刊审稿流程系统 - 数据仓储层
// ==========================================
// 依据: Journal_Dev_Master_Spec.md - PART D 引擎铁律
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod decision_repo;
pub mod editor_assignment_repo;
pub mod error;
pub mod review_assignment_repo;
pub mod review_round_repo;

// 重导出核心仓储
pub use decision_repo::DecisionRepository;
pub use editor_assignment_repo::StageAssignmentRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use review_assignment_repo::ReviewAssignmentRepository;
pub use review_round_repo::ReviewRoundRepository;
