// ==========================================
// 学术期刊审稿流程系统 - 评审轮生命周期服务
// ==========================================
// 依据: Review_Engine_Specs_v0.5.md - 4. 评审轮生命周期
// 职责: 评审轮创建/查询/状态落库/删除的编排
// 红线: 状态只在此处写入; 写入遵循最小写入契约(值不变不落库)
// ==========================================

use crate::domain::review_round::ReviewRound;
use crate::domain::types::{RoundStatus, StageId};
use crate::engine::events::{OptionalEventPublisher, ReviewEvent, ReviewEventType};
use crate::engine::status_cache::RoundStatusCache;
use crate::engine::status_resolver::RoundStatusResolver;
use crate::repository::review_round_repo::ReviewRoundRepository;
use chrono::Utc;
use std::error::Error;
use std::sync::Arc;
use uuid::Uuid;

// ==========================================
// StatusUpdateOutcome - 状态更新结果
// ==========================================
#[derive(Debug, Clone)]
pub struct StatusUpdateOutcome {
    /// 评审轮 ID
    pub round_id: String,
    /// 更新前状态
    pub previous: Option<RoundStatus>,
    /// 推导(或显式指定)的状态
    pub resolved: RoundStatus,
    /// 是否发生落库写入(最小写入契约: 值不变则 false)
    pub written: bool,
    /// 推导原因(显式指定时为单条说明)
    pub reasons: Vec<String>,
}

// ==========================================
// RoundLifecycleService
// ==========================================
pub struct RoundLifecycleService {
    round_repo: Arc<ReviewRoundRepository>,
    resolver: RoundStatusResolver,
    events: OptionalEventPublisher,
    cache: Arc<RoundStatusCache>,
}

impl RoundLifecycleService {
    /// 创建新的 RoundLifecycleService 实例
    pub fn new(
        round_repo: Arc<ReviewRoundRepository>,
        resolver: RoundStatusResolver,
        events: OptionalEventPublisher,
        cache: Arc<RoundStatusCache>,
    ) -> Self {
        Self {
            round_repo,
            resolver,
            events,
            cache,
        }
    }

    /// 创建或取回评审轮
    ///
    /// # 规则
    /// 1. (submission_id, stage_id, round) 已存在 → 返回既有评审轮
    /// 2. 仅允许创建: 内审阶段,或外审阶段且 round > 0
    /// 3. 其余组合 → None(调用方编程错误,记告警,不抛异常)
    pub fn build(
        &self,
        submission_id: &str,
        publication_id: &str,
        stage_id: StageId,
        round: i32,
        initial_status: Option<RoundStatus>,
    ) -> Result<Option<ReviewRound>, Box<dyn Error>> {
        if let Some(existing) = self
            .round_repo
            .find_by_key(submission_id, stage_id, round)?
        {
            return Ok(Some(existing));
        }

        let allowed = stage_id == StageId::InternalReview
            || (stage_id == StageId::ExternalReview && round > 0);
        if !allowed {
            tracing::warn!(
                submission_id,
                stage = %stage_id,
                round,
                "拒绝创建评审轮: 阶段/轮次组合非法"
            );
            return Ok(None);
        }

        let now = Utc::now();
        let review_round = ReviewRound {
            round_id: Uuid::new_v4().to_string(),
            submission_id: submission_id.to_string(),
            publication_id: publication_id.to_string(),
            stage_id,
            round,
            status: initial_status,
            review_revision: 1,
            created_at: now,
            updated_at: now,
        };
        self.round_repo.create(&review_round)?;

        self.events.publish_best_effort(ReviewEvent::lifecycle(
            review_round.round_id.clone(),
            review_round.submission_id.clone(),
            ReviewEventType::RoundCreated,
            Some("RoundLifecycleService::build".to_string()),
        ));

        Ok(Some(review_round))
    }

    /// 更新评审轮状态
    ///
    /// # 参数
    /// - round: 评审轮(含存量状态)
    /// - explicit: 显式状态(编辑决定路径);None 时走状态推导
    ///
    /// # 契约
    /// - 最小写入: 新值与存量一致时不发出任何写语句
    /// - 落库采用条件 UPDATE(WHERE status IS 存量值),并发竞争时
    ///   本次写入静默放弃(对方写入的值同样来自确定性推导)
    /// - 每次成功写入后失效缓存并发布状态变更事件
    pub async fn update_status(
        &self,
        round: &ReviewRound,
        explicit: Option<RoundStatus>,
    ) -> Result<StatusUpdateOutcome, Box<dyn Error>> {
        let (resolved, reasons) = match explicit {
            Some(status) => (
                status,
                vec![format!("explicit: status {} supplied by caller", status)],
            ),
            None => {
                let resolution = self.resolver.resolve(round).await?;
                (resolution.status, resolution.reasons)
            }
        };

        if round.status == Some(resolved) {
            tracing::debug!(
                round_id = %round.round_id,
                status = %resolved,
                "评审轮状态未变化,跳过写入"
            );
            self.cache.put(&round.round_id, resolved);
            return Ok(StatusUpdateOutcome {
                round_id: round.round_id.clone(),
                previous: round.status,
                resolved,
                written: false,
                reasons,
            });
        }

        let written = self
            .round_repo
            .update_status_guarded(&round.round_id, resolved, round.status)?;

        if written {
            self.cache.invalidate(&round.round_id);
            self.cache.put(&round.round_id, resolved);
            tracing::info!(
                round_id = %round.round_id,
                previous = ?round.status,
                new = %resolved,
                "评审轮状态已更新"
            );
            self.events.publish_best_effort(ReviewEvent::status_changed(
                round.round_id.clone(),
                round.submission_id.clone(),
                round.status,
                resolved,
                Some("RoundLifecycleService::update_status".to_string()),
            ));
        } else {
            // 条件 UPDATE 未命中: 另一次重算抢先写入,放弃本次(读已过期)
            tracing::info!(
                round_id = %round.round_id,
                expected = ?round.status,
                "评审轮状态并发写入竞争,本次写入放弃"
            );
        }

        Ok(StatusUpdateOutcome {
            round_id: round.round_id.clone(),
            previous: round.status,
            resolved,
            written,
            reasons,
        })
    }

    /// 查询稿件的评审轮(可按阶段/轮次过滤),按 (阶段, 轮次) 升序
    pub fn get_by_submission(
        &self,
        submission_id: &str,
        stage_id: Option<StageId>,
        round: Option<i32>,
    ) -> Result<Vec<ReviewRound>, Box<dyn Error>> {
        Ok(self
            .round_repo
            .find_by_submission(submission_id, stage_id, round)?)
    }

    /// 查询稿件的最新评审轮(可限定阶段)
    ///
    /// "最新" = (stage_order, round) 最大者;工作台以此定位当前轮
    pub fn get_last_by_submission(
        &self,
        submission_id: &str,
        stage_id: Option<StageId>,
    ) -> Result<Option<ReviewRound>, Box<dyn Error>> {
        Ok(self
            .round_repo
            .find_last_by_submission(submission_id, stage_id)?)
    }

    /// 按 ID 查询评审轮
    pub fn get_by_id(&self, round_id: &str) -> Result<Option<ReviewRound>, Box<dyn Error>> {
        Ok(self.round_repo.find_by_id(round_id)?)
    }

    /// 删除评审轮(连带其设置与关联通知,见仓储层事务)
    ///
    /// # 返回
    /// - true: 评审轮存在且已删除
    /// - false: 评审轮不存在(缺失按"absence"处理,不报错)
    pub fn delete_round(&self, round_id: &str) -> Result<bool, Box<dyn Error>> {
        let existing = match self.round_repo.find_by_id(round_id)? {
            Some(round) => round,
            None => return Ok(false),
        };

        self.round_repo.delete_with_notifications(round_id)?;
        self.cache.invalidate(round_id);

        self.events.publish_best_effort(ReviewEvent::lifecycle(
            existing.round_id,
            existing.submission_id,
            ReviewEventType::RoundDeleted,
            Some("RoundLifecycleService::delete_round".to_string()),
        ));

        Ok(true)
    }

    /// 读取缓存中的状态(未命中返回 None,以库内值为准)
    pub fn cached_status(&self, round_id: &str) -> Option<RoundStatus> {
        self.cache.get(round_id)
    }
}
