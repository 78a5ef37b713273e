// ==========================================
// 学术期刊审稿流程系统 - 评审轮状态推导服务
// ==========================================
// 依据: Review_Engine_Specs_v0.5.md - 3. 状态推导规则
// 职责: 按存量状态组装最小查询集,调用纯规则表完成推导
// 红线: 不写库,不访问 UI; 数据访问只经注入的只读 Provider
// ==========================================

use crate::domain::review_round::ReviewRound;
use crate::domain::types::{DecisionType, RoundStatus};
use crate::engine::providers::{
    DecisionProvider, EditorAssignmentProvider, ReviewAssignmentProvider,
};
use crate::engine::status_rules::{
    self, RecommendationTally, ResolveContext, RevisionDecisionCheck,
};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// StatusResolution - 推导结果
// ==========================================
#[derive(Debug, Clone)]
pub struct StatusResolution {
    /// 推导出的状态
    pub status: RoundStatus,
    /// 命中规则的原因序列(审计用)
    pub reasons: Vec<String>,
}

// ==========================================
// RoundStatusResolver
// ==========================================
pub struct RoundStatusResolver {
    assignments: Arc<dyn ReviewAssignmentProvider>,
    decisions: Arc<dyn DecisionProvider>,
    editors: Arc<dyn EditorAssignmentProvider>,
}

impl RoundStatusResolver {
    /// 创建新的 RoundStatusResolver 实例
    pub fn new(
        assignments: Arc<dyn ReviewAssignmentProvider>,
        decisions: Arc<dyn DecisionProvider>,
        editors: Arc<dyn EditorAssignmentProvider>,
    ) -> Self {
        Self {
            assignments,
            decisions,
            editors,
        }
    }

    /// 推导评审轮当前状态(主入口)
    ///
    /// # 参数
    /// - round: 评审轮(含存量状态)
    ///
    /// # 返回
    /// - StatusResolution: 新状态 + 原因(可直接交由生命周期服务落库)
    ///
    /// 同一数据下重复调用结果一致(幂等);对合法输入不报错,
    /// Provider 查询失败原样传播。
    pub async fn resolve(&self, round: &ReviewRound) -> Result<StatusResolution, Box<dyn Error>> {
        let ctx = self.build_context(round).await?;
        let (status, reasons) = status_rules::resolve_status(&ctx);

        tracing::debug!(
            round_id = %round.round_id,
            previous = ?round.status,
            resolved = %status,
            ?reasons,
            "评审轮状态推导完成"
        );

        Ok(StatusResolution { status, reasons })
    }

    /// 按存量状态组装推导快照(最小查询集)
    ///
    /// - REVISIONS_* 存量状态: 只查对应的小修决定与修改稿文件
    /// - RESUBMIT_* 存量状态: 只查对应的重投决定与修改稿文件
    /// - 终态: 不发任何查询(规则表直接短路)
    /// - 其余: 查推荐制编辑统计 + 全部评审指派
    async fn build_context(&self, round: &ReviewRound) -> Result<ResolveContext, Box<dyn Error>> {
        let mut ctx = ResolveContext {
            current_status: round.status,
            ..Default::default()
        };

        match round.status {
            Some(RoundStatus::RevisionsRequested) | Some(RoundStatus::RevisionsSubmitted) => {
                let kind = DecisionType::pending_revisions_for(round.stage_id);
                ctx.revision_check = Some(self.check_revision_decision(round, kind).await?);
            }
            Some(RoundStatus::ResubmitForReview)
            | Some(RoundStatus::ResubmitForReviewSubmitted) => {
                let kind = DecisionType::resubmit_for(round.stage_id);
                ctx.resubmit_check = Some(self.check_revision_decision(round, kind).await?);
            }
            Some(status) if status.is_terminal() => {
                // 终态短路,不再查询任何数据源
            }
            _ => {
                ctx.recommendations = self.tally_recommendations(round).await?;
                ctx.assignments = self
                    .assignments
                    .list_by_round(&round.round_id)
                    .await?
                    .into_iter()
                    .map(|a| a.status)
                    .collect();
            }
        }

        Ok(ctx)
    }

    /// 查询修改决定及其后是否出现修改稿文件
    async fn check_revision_decision(
        &self,
        round: &ReviewRound,
        kind: DecisionType,
    ) -> Result<RevisionDecisionCheck, Box<dyn Error>> {
        let decision = self
            .decisions
            .find_active_revision_decision(&round.submission_id, round.stage_id, kind)
            .await?;

        match decision {
            Some(decision) => {
                let uploaded = self
                    .decisions
                    .revisions_uploaded_since(&round.submission_id, decision.date_decided)
                    .await?;
                Ok(RevisionDecisionCheck {
                    decision_found: true,
                    revisions_uploaded: uploaded,
                })
            }
            None => Ok(RevisionDecisionCheck::default()),
        }
    }

    /// 统计推荐制编辑的决定进度
    async fn tally_recommendations(
        &self,
        round: &ReviewRound,
    ) -> Result<RecommendationTally, Box<dyn Error>> {
        let recommenders = self
            .editors
            .list_recommend_only(&round.submission_id, round.stage_id)
            .await?;

        let mut decided_flags = Vec::with_capacity(recommenders.len());
        for editor in &recommenders {
            let count = self
                .decisions
                .count_by_editor_and_round(&editor.user_id, &round.round_id)
                .await?;
            decided_flags.push(count > 0);
        }

        Ok(RecommendationTally::from_decided_flags(decided_flags))
    }
}
