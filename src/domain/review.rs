// ==========================================
// 学术期刊审稿流程系统 - 评审关联只读模型
// ==========================================
// 依据: Journal_Dev_Master_Spec.md - PART C 数据与状态体系
// 依据: Review_Engine_Specs_v0.5.md - 2. 外部只读数据源
// ==========================================
// 红线: 以下实体归属外部子系统,本引擎只读,不写入
// ==========================================

use crate::domain::types::{DecisionType, ReviewAssignmentStatus, StageId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ReviewAssignment - 评审指派
// ==========================================
// 归属: 评审指派子系统(邀请/答复/提交流程在外部)
// 用途: 状态推导只消费 status 字段,其余字段为展示/审计携带
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewAssignment {
    pub assignment_id: String,            // 指派唯一标识
    pub round_id: String,                 // 关联评审轮
    pub reviewer_id: String,              // 评审人标识
    pub status: ReviewAssignmentStatus,   // 指派状态(上游维护)
    pub date_assigned: DateTime<Utc>,     // 指派时间
    pub date_response_due: Option<NaiveDate>, // 答复截止日(上游用于逾期判定)
    pub date_review_due: Option<NaiveDate>,   // 评审截止日(上游用于逾期判定)
}

// ==========================================
// EditorialDecision - 编辑决定
// ==========================================
// 归属: 编辑决定子系统
// 用途: 推导只需要"某类型最近一次有效决定"与决定时间
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorialDecision {
    pub decision_id: String,         // 决定唯一标识
    pub submission_id: String,       // 稿件标识
    pub stage_id: StageId,           // 决定所属阶段
    pub round_id: Option<String>,    // 关联评审轮(阶段级决定可为空)
    pub editor_id: String,           // 做出决定的编辑
    pub decision_type: DecisionType, // 决定类型
    pub date_decided: DateTime<Utc>, // 决定时间
}

// ==========================================
// StageAssignment - 编辑阶段指派
// ==========================================
// 归属: 阶段指派子系统
// recommend_only=true 的编辑,其决定计入"推荐意见"子状态,
// 不作为终局编辑决定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageAssignment {
    pub stage_assignment_id: String, // 指派唯一标识
    pub submission_id: String,       // 稿件标识
    pub stage_id: StageId,           // 指派阶段
    pub user_id: String,             // 编辑用户标识
    pub role_id: String,             // 角色标识(主编/栏目编辑等)
    pub recommend_only: bool,        // 仅推荐标志
}
