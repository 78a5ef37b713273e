// ==========================================
// 学术期刊审稿流程系统 - 评审轮状态规则库
// ==========================================
// 依据: Review_Engine_Specs_v0.5.md - 3. 状态推导规则
// 职责: 提供评审轮状态推导的纯逻辑(规则表)
// 红线: 无状态、无副作用、无 I/O 操作; 所有规则必须输出 reason
// ==========================================
// 规则表按优先级排列,逐条求值,首个命中者短路返回。
// 优先级顺序本身是数据(STATUS_RULES),不是隐式控制流。
// ==========================================

use crate::domain::types::{ReviewAssignmentStatus, RoundStatus};

// ==========================================
// 推导输入快照
// ==========================================

/// 修改决定检查结果(仅当存量状态处于对应修改状态时由调用方查询)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevisionDecisionCheck {
    /// 是否存在该类型的最近有效决定
    pub decision_found: bool,
    /// 决定时间之后是否出现修改稿文件
    pub revisions_uploaded: bool,
}

/// 推荐制编辑统计
///
/// pending: 本阶段存在 recommend_only 编辑
/// finished: 所有 recommend_only 编辑都已记录决定
/// ready: 至少一位 recommend_only 编辑已记录决定
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecommendationTally {
    pub pending: bool,
    pub finished: bool,
    pub ready: bool,
}

impl RecommendationTally {
    /// 从"每位推荐制编辑是否已决定"的序列聚合
    pub fn from_decided_flags<I: IntoIterator<Item = bool>>(flags: I) -> Self {
        let mut tally = RecommendationTally {
            pending: false,
            finished: true,
            ready: false,
        };
        for decided in flags {
            tally.pending = true;
            if decided {
                tally.ready = true;
            } else {
                tally.finished = false;
            }
        }
        if !tally.pending {
            // 无推荐制编辑时 finished 无意义,归位为 false
            tally.finished = false;
        }
        tally
    }
}

/// 状态推导输入快照
///
/// 由 RoundStatusResolver 按存量状态需要的最小查询集组装;
/// 同一快照重复求值必得同一结果(幂等)。
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    /// 存量状态(None = 从未推导或存量值无法识别,按非终态处理)
    pub current_status: Option<RoundStatus>,
    /// 小修决定检查(仅 REVISIONS_* 存量状态下由调用方填充)
    pub revision_check: Option<RevisionDecisionCheck>,
    /// 重投决定检查(仅 RESUBMIT_* 存量状态下由调用方填充)
    pub resubmit_check: Option<RevisionDecisionCheck>,
    /// 推荐制编辑统计
    pub recommendations: RecommendationTally,
    /// 本轮全部评审指派的状态
    pub assignments: Vec<ReviewAssignmentStatus>,
}

// ==========================================
// 规则表
// ==========================================

/// 单条状态规则: 命中则产出状态与原因,未命中返回 None 落入下一条
pub struct StatusRule {
    pub name: &'static str,
    pub apply: fn(&ResolveContext) -> Option<(RoundStatus, String)>,
}

/// 状态推导规则表(按优先级排列)
pub const STATUS_RULES: &[StatusRule] = &[
    StatusRule {
        name: "revisions_decision",
        apply: rule_revisions_decision,
    },
    StatusRule {
        name: "resubmit_decision",
        apply: rule_resubmit_decision,
    },
    StatusRule {
        name: "terminal_decision",
        apply: rule_terminal_decision,
    },
    StatusRule {
        name: "recommendations_progress",
        apply: rule_recommendations_progress,
    },
    StatusRule {
        name: "no_reviewers",
        apply: rule_no_reviewers,
    },
    StatusRule {
        name: "assignment_activity",
        apply: rule_assignment_activity,
    },
];

/// 推导评审轮状态(主入口)
///
/// # 返回
/// - (RoundStatus, Vec<String>): 新状态 + 命中规则的原因序列
///
/// 规则表保证兜底规则(assignment_activity)必命中,故总有结果。
pub fn resolve_status(ctx: &ResolveContext) -> (RoundStatus, Vec<String>) {
    let mut reasons = Vec::new();
    for rule in STATUS_RULES {
        if let Some((status, reason)) = (rule.apply)(ctx) {
            reasons.push(format!("{}: {}", rule.name, reason));
            return (status, reasons);
        }
    }
    // 不可达: assignment_activity 是全覆盖兜底规则
    unreachable!("assignment_activity rule must always produce a status")
}

// ==========================================
// 规则实现
// ==========================================

/// 规则 1: 小修决定激活中 → 按修改稿是否已提交区分
fn rule_revisions_decision(ctx: &ResolveContext) -> Option<(RoundStatus, String)> {
    if !matches!(
        ctx.current_status,
        Some(RoundStatus::RevisionsRequested) | Some(RoundStatus::RevisionsSubmitted)
    ) {
        return None;
    }
    let check = ctx.revision_check.unwrap_or_default();
    if check.decision_found && check.revisions_uploaded {
        Some((
            RoundStatus::RevisionsSubmitted,
            "revision file uploaded after pending-revisions decision".to_string(),
        ))
    } else {
        Some((
            RoundStatus::RevisionsRequested,
            format!("decision_found={}, no revision file yet", check.decision_found),
        ))
    }
}

/// 规则 2: 重投决定激活中 → 同规则 1,针对重投决定类型
fn rule_resubmit_decision(ctx: &ResolveContext) -> Option<(RoundStatus, String)> {
    if !matches!(
        ctx.current_status,
        Some(RoundStatus::ResubmitForReview) | Some(RoundStatus::ResubmitForReviewSubmitted)
    ) {
        return None;
    }
    let check = ctx.resubmit_check.unwrap_or_default();
    if check.decision_found && check.revisions_uploaded {
        Some((
            RoundStatus::ResubmitForReviewSubmitted,
            "revision file uploaded after resubmit decision".to_string(),
        ))
    } else {
        Some((
            RoundStatus::ResubmitForReview,
            format!("decision_found={}, no revision file yet", check.decision_found),
        ))
    }
}

/// 规则 3: 终态短路,原值返回
fn rule_terminal_decision(ctx: &ResolveContext) -> Option<(RoundStatus, String)> {
    match ctx.current_status {
        Some(status) if status.is_terminal() => {
            Some((status, format!("terminal status {} preserved", status)))
        }
        _ => None,
    }
}

/// 规则 4: 推荐意见进度(已齐/部分就绪时短路)
///
/// 注意: 存在推荐制编辑但尚无任何人决定时,本规则**不**命中,
/// 落入指派规则;PENDING_RECOMMENDATIONS 只由规则 6 兜底产出。
/// 该不对称为既有语义,已有回归测试固定。
fn rule_recommendations_progress(ctx: &ResolveContext) -> Option<(RoundStatus, String)> {
    let tally = ctx.recommendations;
    if !tally.pending {
        return None;
    }
    if tally.finished {
        return Some((
            RoundStatus::RecommendationsCompleted,
            "all recommend-only editors have recorded a decision".to_string(),
        ));
    }
    if tally.ready {
        return Some((
            RoundStatus::RecommendationsReady,
            "at least one recommend-only editor has recorded a decision".to_string(),
        ));
    }
    None
}

/// 规则 5: 尚无任何评审指派
fn rule_no_reviewers(ctx: &ResolveContext) -> Option<(RoundStatus, String)> {
    if ctx.assignments.is_empty() {
        Some((
            RoundStatus::PendingReviewers,
            "no review assignments exist for the round".to_string(),
        ))
    } else {
        None
    }
}

/// 规则 6: 按指派状态分类推导(兜底,必命中)
///
/// 分类口径:
/// - overdue: 答复逾期/评审逾期
/// - unread: 已提交/已查阅的评审意见
/// - incomplete: 等待答复/已重发/已接受
/// - 婉拒与取消不计入任何类别
fn rule_assignment_activity(ctx: &ResolveContext) -> Option<(RoundStatus, String)> {
    let mut overdue = 0usize;
    let mut unread = 0usize;
    let mut incomplete = 0usize;

    for status in &ctx.assignments {
        match status {
            ReviewAssignmentStatus::Declined | ReviewAssignmentStatus::Cancelled => {}
            ReviewAssignmentStatus::ResponseOverdue | ReviewAssignmentStatus::ReviewOverdue => {
                overdue += 1;
            }
            ReviewAssignmentStatus::Received | ReviewAssignmentStatus::Viewed => {
                unread += 1;
            }
            ReviewAssignmentStatus::AwaitingResponse
            | ReviewAssignmentStatus::RequestResend
            | ReviewAssignmentStatus::Accepted => {
                incomplete += 1;
            }
        }
    }

    if overdue > 0 {
        return Some((
            RoundStatus::ReviewsOverdue,
            format!("overdue assignments: {}", overdue),
        ));
    }
    if unread > 0 {
        return Some((
            RoundStatus::ReviewsReady,
            format!("unread reviews: {}", unread),
        ));
    }
    if incomplete > 0 {
        return Some((
            RoundStatus::PendingReviews,
            format!("incomplete assignments: {}", incomplete),
        ));
    }
    if ctx.recommendations.pending {
        return Some((
            RoundStatus::PendingRecommendations,
            "recommend-only editors assigned, none decided".to_string(),
        ));
    }
    if ctx.current_status == Some(RoundStatus::ReturnedToReview) {
        return Some((
            RoundStatus::ReturnedToReview,
            "returned-to-review preserved, no overriding activity".to_string(),
        ));
    }
    Some((
        RoundStatus::ReviewsCompleted,
        "all assignments resolved".to_string(),
    ))
}
