// ==========================================
// 学术期刊审稿流程系统 - 引擎只读数据源 Trait
// ==========================================
// 依据: Journal_Dev_Master_Spec.md - PART E 工程结构
// 依据: Review_Engine_Specs_v0.5.md - 2. 外部只读数据源
// 职责: 定义状态推导所需的查询接口(不包含实现)
// 红线: 只读接口,不包含写入、不包含业务逻辑
// ==========================================
// 实现者: repository 层各仓储; 单元测试以 Mock 实现注入
// 查询失败原样向上传播,引擎内不重试(推导幂等,调用方可安全重试)
// ==========================================

use crate::domain::review::{EditorialDecision, ReviewAssignment, StageAssignment};
use crate::domain::types::{DecisionType, StageId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::error::Error;

// ==========================================
// ReviewAssignmentProvider Trait
// ==========================================
#[async_trait]
pub trait ReviewAssignmentProvider: Send + Sync {
    /// 查询评审轮的全部评审指派
    ///
    /// # 返回
    /// - Vec<ReviewAssignment>: 空 Vec 表示尚未指派评审人
    async fn list_by_round(
        &self,
        round_id: &str,
    ) -> Result<Vec<ReviewAssignment>, Box<dyn Error>>;
}

// ==========================================
// DecisionProvider Trait
// ==========================================
#[async_trait]
pub trait DecisionProvider: Send + Sync {
    /// 查询某稿件+阶段下指定类型的最近一次有效决定
    ///
    /// # 返回
    /// - Some(EditorialDecision): 按 date_decided 取最近一条
    /// - None: 该类型无决定记录
    async fn find_active_revision_decision(
        &self,
        submission_id: &str,
        stage_id: StageId,
        decision_type: DecisionType,
    ) -> Result<Option<EditorialDecision>, Box<dyn Error>>;

    /// 判断某时点之后是否出现修改稿文件
    ///
    /// # 参数
    /// - since: 通常为修改决定的 date_decided
    async fn revisions_uploaded_since(
        &self,
        submission_id: &str,
        since: DateTime<Utc>,
    ) -> Result<bool, Box<dyn Error>>;

    /// 统计某编辑对某评审轮记录的决定数
    ///
    /// 用途: 推荐制编辑是否"已决定"的判据(计数 > 0)
    async fn count_by_editor_and_round(
        &self,
        editor_id: &str,
        round_id: &str,
    ) -> Result<i64, Box<dyn Error>>;
}

// ==========================================
// EditorAssignmentProvider Trait
// ==========================================
#[async_trait]
pub trait EditorAssignmentProvider: Send + Sync {
    /// 查询某稿件+阶段下 recommend_only 的编辑指派
    async fn list_recommend_only(
        &self,
        submission_id: &str,
        stage_id: StageId,
    ) -> Result<Vec<StageAssignment>, Box<dyn Error>>;
}
