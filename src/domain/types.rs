// ==========================================
// 学术期刊审稿流程系统 - 领域类型定义
// ==========================================
// 依据: Journal_Dev_Master_Spec.md - PART C 状态体系
// 依据: Review_Engine_Specs_v0.5.md - 1. 评审轮状态全集
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 工作流阶段 (Workflow Stage)
// ==========================================
// 评审轮只存在于内审/外审两个阶段
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageId {
    InternalReview, // 内审阶段
    ExternalReview, // 外审阶段
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl StageId {
    /// 阶段排序权重(内审在前,外审在后)
    ///
    /// 用途: "最新评审轮"查询按 (stage_order, round) 取最大值
    pub fn stage_order(&self) -> i32 {
        match self {
            StageId::InternalReview => 1,
            StageId::ExternalReview => 2,
        }
    }

    /// 从字符串解析阶段
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "INTERNAL_REVIEW" => Some(StageId::InternalReview),
            "EXTERNAL_REVIEW" => Some(StageId::ExternalReview),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            StageId::InternalReview => "INTERNAL_REVIEW",
            StageId::ExternalReview => "EXTERNAL_REVIEW",
        }
    }
}

// ==========================================
// 评审轮状态 (Review Round Status)
// ==========================================
// 依据: Review_Engine_Specs_v0.5.md - 1.1 状态全集(16 个)
// 红线: 状态由状态机推导或编辑决定显式写入,禁止其他路径修改
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundStatus {
    // ===== 修改决定状态(小修) =====
    RevisionsRequested, // 已要求修改(小修)
    RevisionsSubmitted, // 修改稿已提交(小修)

    // ===== 修改决定状态(退回重审) =====
    ResubmitForReview,          // 已要求重投
    ResubmitForReviewSubmitted, // 重投稿已提交

    // ===== 终态(编辑决定,一经写入不再被推导覆盖) =====
    SentToExternal, // 已送外审
    Accepted,       // 录用
    Declined,       // 退稿

    // ===== 评审人指派推导状态 =====
    PendingReviewers, // 尚未指派评审人
    PendingReviews,   // 等待评审意见
    ReviewsReady,     // 有评审意见待查阅
    ReviewsCompleted, // 全部评审已完成
    ReviewsOverdue,   // 有评审逾期

    // ===== 推荐制编辑推导状态 =====
    PendingRecommendations,   // 等待推荐意见
    RecommendationsReady,     // 有推荐意见待查阅
    RecommendationsCompleted, // 推荐意见已齐

    // ===== 回退状态 =====
    ReturnedToReview, // 从后续阶段退回本评审轮
}

impl fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl RoundStatus {
    /// 是否终态
    ///
    /// 终态一经写入,状态推导短路返回原值,不再被评审人活动覆盖
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RoundStatus::SentToExternal | RoundStatus::Accepted | RoundStatus::Declined
        )
    }

    /// 从字符串解析状态
    ///
    /// 返回 None 表示无法识别(由调用方记录数据完整性告警)
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "REVISIONS_REQUESTED" => Some(RoundStatus::RevisionsRequested),
            "REVISIONS_SUBMITTED" => Some(RoundStatus::RevisionsSubmitted),
            "RESUBMIT_FOR_REVIEW" => Some(RoundStatus::ResubmitForReview),
            "RESUBMIT_FOR_REVIEW_SUBMITTED" => Some(RoundStatus::ResubmitForReviewSubmitted),
            "SENT_TO_EXTERNAL" => Some(RoundStatus::SentToExternal),
            "ACCEPTED" => Some(RoundStatus::Accepted),
            "DECLINED" => Some(RoundStatus::Declined),
            "PENDING_REVIEWERS" => Some(RoundStatus::PendingReviewers),
            "PENDING_REVIEWS" => Some(RoundStatus::PendingReviews),
            "REVIEWS_READY" => Some(RoundStatus::ReviewsReady),
            "REVIEWS_COMPLETED" => Some(RoundStatus::ReviewsCompleted),
            "REVIEWS_OVERDUE" => Some(RoundStatus::ReviewsOverdue),
            "PENDING_RECOMMENDATIONS" => Some(RoundStatus::PendingRecommendations),
            "RECOMMENDATIONS_READY" => Some(RoundStatus::RecommendationsReady),
            "RECOMMENDATIONS_COMPLETED" => Some(RoundStatus::RecommendationsCompleted),
            "RETURNED_TO_REVIEW" => Some(RoundStatus::ReturnedToReview),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RoundStatus::RevisionsRequested => "REVISIONS_REQUESTED",
            RoundStatus::RevisionsSubmitted => "REVISIONS_SUBMITTED",
            RoundStatus::ResubmitForReview => "RESUBMIT_FOR_REVIEW",
            RoundStatus::ResubmitForReviewSubmitted => "RESUBMIT_FOR_REVIEW_SUBMITTED",
            RoundStatus::SentToExternal => "SENT_TO_EXTERNAL",
            RoundStatus::Accepted => "ACCEPTED",
            RoundStatus::Declined => "DECLINED",
            RoundStatus::PendingReviewers => "PENDING_REVIEWERS",
            RoundStatus::PendingReviews => "PENDING_REVIEWS",
            RoundStatus::ReviewsReady => "REVIEWS_READY",
            RoundStatus::ReviewsCompleted => "REVIEWS_COMPLETED",
            RoundStatus::ReviewsOverdue => "REVIEWS_OVERDUE",
            RoundStatus::PendingRecommendations => "PENDING_RECOMMENDATIONS",
            RoundStatus::RecommendationsReady => "RECOMMENDATIONS_READY",
            RoundStatus::RecommendationsCompleted => "RECOMMENDATIONS_COMPLETED",
            RoundStatus::ReturnedToReview => "RETURNED_TO_REVIEW",
        }
    }
}

// ==========================================
// 评审指派状态 (Review Assignment Status)
// ==========================================
// 归属: 评审指派子系统(本引擎只读)
// 依据: Review_Engine_Specs_v0.5.md - 2.1 指派状态全集
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewAssignmentStatus {
    AwaitingResponse, // 等待评审人答复邀请
    RequestResend,    // 已重发邀请
    Declined,         // 评审人婉拒
    Cancelled,        // 指派已取消
    ResponseOverdue,  // 答复逾期
    Accepted,         // 已接受邀请(评审中)
    ReviewOverdue,    // 评审逾期
    Received,         // 评审意见已提交
    Viewed,           // 评审意见已被编辑查阅
}

impl fmt::Display for ReviewAssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ReviewAssignmentStatus {
    /// 从字符串解析指派状态
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "AWAITING_RESPONSE" => Some(ReviewAssignmentStatus::AwaitingResponse),
            "REQUEST_RESEND" => Some(ReviewAssignmentStatus::RequestResend),
            "DECLINED" => Some(ReviewAssignmentStatus::Declined),
            "CANCELLED" => Some(ReviewAssignmentStatus::Cancelled),
            "RESPONSE_OVERDUE" => Some(ReviewAssignmentStatus::ResponseOverdue),
            "ACCEPTED" => Some(ReviewAssignmentStatus::Accepted),
            "REVIEW_OVERDUE" => Some(ReviewAssignmentStatus::ReviewOverdue),
            "RECEIVED" => Some(ReviewAssignmentStatus::Received),
            "VIEWED" => Some(ReviewAssignmentStatus::Viewed),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ReviewAssignmentStatus::AwaitingResponse => "AWAITING_RESPONSE",
            ReviewAssignmentStatus::RequestResend => "REQUEST_RESEND",
            ReviewAssignmentStatus::Declined => "DECLINED",
            ReviewAssignmentStatus::Cancelled => "CANCELLED",
            ReviewAssignmentStatus::ResponseOverdue => "RESPONSE_OVERDUE",
            ReviewAssignmentStatus::Accepted => "ACCEPTED",
            ReviewAssignmentStatus::ReviewOverdue => "REVIEW_OVERDUE",
            ReviewAssignmentStatus::Received => "RECEIVED",
            ReviewAssignmentStatus::Viewed => "VIEWED",
        }
    }
}

// ==========================================
// 编辑决定类型 (Decision Type)
// ==========================================
// 归属: 编辑决定子系统(本引擎只读)
// 内审阶段使用 *_INTERNAL 变体,外审阶段使用无后缀变体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionType {
    PendingRevisions,         // 要求修改(外审,小修)
    PendingRevisionsInternal, // 要求修改(内审,小修)
    Resubmit,                 // 要求重投(外审)
    ResubmitInternal,         // 要求重投(内审)
    Accept,                   // 录用
    Decline,                  // 退稿
    SendToExternal,           // 送外审
}

impl fmt::Display for DecisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl DecisionType {
    /// 本阶段的"小修"决定类型
    pub fn pending_revisions_for(stage: StageId) -> Self {
        match stage {
            StageId::InternalReview => DecisionType::PendingRevisionsInternal,
            StageId::ExternalReview => DecisionType::PendingRevisions,
        }
    }

    /// 本阶段的"重投"决定类型
    pub fn resubmit_for(stage: StageId) -> Self {
        match stage {
            StageId::InternalReview => DecisionType::ResubmitInternal,
            StageId::ExternalReview => DecisionType::Resubmit,
        }
    }

    /// 决定类型对应的评审轮显式状态
    ///
    /// 编辑记录决定后,调用方以此状态显式写入评审轮
    pub fn round_status(&self) -> RoundStatus {
        match self {
            DecisionType::PendingRevisions | DecisionType::PendingRevisionsInternal => {
                RoundStatus::RevisionsRequested
            }
            DecisionType::Resubmit | DecisionType::ResubmitInternal => {
                RoundStatus::ResubmitForReview
            }
            DecisionType::Accept => RoundStatus::Accepted,
            DecisionType::Decline => RoundStatus::Declined,
            DecisionType::SendToExternal => RoundStatus::SentToExternal,
        }
    }

    /// 从字符串解析决定类型
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING_REVISIONS" => Some(DecisionType::PendingRevisions),
            "PENDING_REVISIONS_INTERNAL" => Some(DecisionType::PendingRevisionsInternal),
            "RESUBMIT" => Some(DecisionType::Resubmit),
            "RESUBMIT_INTERNAL" => Some(DecisionType::ResubmitInternal),
            "ACCEPT" => Some(DecisionType::Accept),
            "DECLINE" => Some(DecisionType::Decline),
            "SEND_TO_EXTERNAL" => Some(DecisionType::SendToExternal),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            DecisionType::PendingRevisions => "PENDING_REVISIONS",
            DecisionType::PendingRevisionsInternal => "PENDING_REVISIONS_INTERNAL",
            DecisionType::Resubmit => "RESUBMIT",
            DecisionType::ResubmitInternal => "RESUBMIT_INTERNAL",
            DecisionType::Accept => "ACCEPT",
            DecisionType::Decline => "DECLINE",
            DecisionType::SendToExternal => "SEND_TO_EXTERNAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_status_db_str_roundtrip() {
        let all = [
            RoundStatus::RevisionsRequested,
            RoundStatus::RevisionsSubmitted,
            RoundStatus::ResubmitForReview,
            RoundStatus::ResubmitForReviewSubmitted,
            RoundStatus::SentToExternal,
            RoundStatus::Accepted,
            RoundStatus::Declined,
            RoundStatus::PendingReviewers,
            RoundStatus::PendingReviews,
            RoundStatus::ReviewsReady,
            RoundStatus::ReviewsCompleted,
            RoundStatus::ReviewsOverdue,
            RoundStatus::PendingRecommendations,
            RoundStatus::RecommendationsReady,
            RoundStatus::RecommendationsCompleted,
            RoundStatus::ReturnedToReview,
        ];
        for status in all {
            assert_eq!(RoundStatus::from_db_str(status.to_db_str()), Some(status));
        }
    }

    #[test]
    fn test_unknown_round_status_is_none() {
        assert_eq!(RoundStatus::from_db_str("NO_SUCH_STATUS"), None);
        assert_eq!(RoundStatus::from_db_str(""), None);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(RoundStatus::SentToExternal.is_terminal());
        assert!(RoundStatus::Accepted.is_terminal());
        assert!(RoundStatus::Declined.is_terminal());
        assert!(!RoundStatus::ReviewsOverdue.is_terminal());
        assert!(!RoundStatus::ReturnedToReview.is_terminal());
    }

    #[test]
    fn test_decision_kind_by_stage() {
        assert_eq!(
            DecisionType::pending_revisions_for(StageId::InternalReview),
            DecisionType::PendingRevisionsInternal
        );
        assert_eq!(
            DecisionType::pending_revisions_for(StageId::ExternalReview),
            DecisionType::PendingRevisions
        );
        assert_eq!(
            DecisionType::resubmit_for(StageId::InternalReview),
            DecisionType::ResubmitInternal
        );
    }

    #[test]
    fn test_decision_round_status_mapping() {
        assert_eq!(
            DecisionType::PendingRevisionsInternal.round_status(),
            RoundStatus::RevisionsRequested
        );
        assert_eq!(DecisionType::Accept.round_status(), RoundStatus::Accepted);
        assert_eq!(
            DecisionType::SendToExternal.round_status(),
            RoundStatus::SentToExternal
        );
    }

    #[test]
    fn test_stage_order() {
        assert!(StageId::InternalReview.stage_order() < StageId::ExternalReview.stage_order());
    }
}
