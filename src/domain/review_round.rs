// ==========================================
// 学术期刊审稿流程系统 - 评审轮领域模型
// ==========================================
// 依据: Journal_Dev_Master_Spec.md - PART C 数据与状态体系
// 依据: Review_Engine_Specs_v0.5.md - review_rounds 表
// ==========================================

use crate::domain::types::{RoundStatus, StageId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ReviewRound - 评审轮
// ==========================================
// 红线: status 只经 RoundLifecycleService 写入
// 唯一性: (submission_id, stage_id, round) 在库内唯一
// 对齐: schema review_rounds 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRound {
    // ===== 主键与身份 =====
    pub round_id: String,       // 评审轮唯一标识(UUID)
    pub submission_id: String,  // 稿件标识
    pub publication_id: String, // 出版物(版本)标识
    pub stage_id: StageId,      // 工作流阶段(内审/外审)
    pub round: i32,             // 轮次(同一稿件同一阶段内从 1 递增)

    // ===== 状态 =====
    pub status: Option<RoundStatus>, // 当前状态(None=从未推导或存量值无法识别)
    pub review_revision: i32,        // 修改稿版次计数

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>, // 记录创建时间
    pub updated_at: DateTime<Utc>, // 记录更新时间
}

impl ReviewRound {
    /// 当前状态是否终态(未推导过的评审轮不是终态)
    pub fn has_terminal_status(&self) -> bool {
        self.status.map(|s| s.is_terminal()).unwrap_or(false)
    }
}

// ==========================================
// ReviewRoundSetting - 评审轮扩展元数据
// ==========================================
// 用途: 评审轮的自由格式元数据(JSON 值),按 round_id 关联
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRoundSetting {
    pub round_id: String,
    pub setting_name: String,
    pub setting_value: serde_json::Value,
}
