// ==========================================
// 学术期刊审稿流程系统 - 评审轮数据仓储
// ==========================================
// 依据: Journal_Dev_Master_Spec.md - PART D 引擎铁律
// 红线: Repository 不含业务逻辑
// ==========================================
// 表: review_rounds / review_round_settings / notifications
// 唯一性: (submission_id, stage_id, round) 由 UNIQUE 约束保证
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::review_round::ReviewRound;
use crate::domain::types::{RoundStatus, StageId};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// 时间戳存储格式(与库内 TEXT 列一致)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 通知表中评审轮关联对象的 assoc_type 值
const NOTIFICATION_ASSOC_REVIEW_ROUND: &str = "REVIEW_ROUND";

/// review_rounds 查询列(所有 SELECT 共用,保证列序一致)
const ROUND_COLUMNS: &str = "round_id, submission_id, publication_id, stage_id, round, \
     status, review_revision, created_at, updated_at";

// ==========================================
// ReviewRoundRepository - 评审轮仓储
// ==========================================
/// 评审轮仓储
/// 职责: 管理 review_rounds 表的 CRUD 与条件状态更新
/// 红线: 不含状态推导逻辑,只负责数据访问
pub struct ReviewRoundRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReviewRoundRepository {
    /// 创建新的 ReviewRoundRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入评审轮
    ///
    /// # 说明
    /// - (submission_id, stage_id, round) 重复时返回唯一约束错误,
    ///   去重取回由生命周期服务负责
    pub fn create(&self, round: &ReviewRound) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO review_rounds (
                round_id, submission_id, publication_id, stage_id, round,
                status, review_revision, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                round.round_id,
                round.submission_id,
                round.publication_id,
                round.stage_id.to_db_str(),
                round.round,
                round.status.map(|s| s.to_db_str()),
                round.review_revision,
                round.created_at.format(TIMESTAMP_FORMAT).to_string(),
                round.updated_at.format(TIMESTAMP_FORMAT).to_string(),
            ],
        )?;
        Ok(())
    }

    /// 按 ID 查询评审轮
    pub fn find_by_id(&self, round_id: &str) -> RepositoryResult<Option<ReviewRound>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM review_rounds WHERE round_id = ?1",
            ROUND_COLUMNS
        ))?;

        let result = stmt.query_row(params![round_id], row_to_round);
        match result {
            Ok(round) => Ok(Some(round)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按身份三元组查询评审轮
    pub fn find_by_key(
        &self,
        submission_id: &str,
        stage_id: StageId,
        round: i32,
    ) -> RepositoryResult<Option<ReviewRound>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM review_rounds \
             WHERE submission_id = ?1 AND stage_id = ?2 AND round = ?3",
            ROUND_COLUMNS
        ))?;

        let result = stmt.query_row(
            params![submission_id, stage_id.to_db_str(), round],
            row_to_round,
        );
        match result {
            Ok(round) => Ok(Some(round)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询稿件的评审轮(可按阶段/轮次过滤)
    ///
    /// # 排序
    /// - (阶段权重, 轮次) 升序: 内审在前,外审在后
    pub fn find_by_submission(
        &self,
        submission_id: &str,
        stage_id: Option<StageId>,
        round: Option<i32>,
    ) -> RepositoryResult<Vec<ReviewRound>> {
        let conn = self.get_conn()?;

        let order = "ORDER BY \
             CASE stage_id \
                 WHEN 'INTERNAL_REVIEW' THEN 1 \
                 WHEN 'EXTERNAL_REVIEW' THEN 2 \
                 ELSE 3 \
             END ASC, \
             round ASC";

        let rounds = match (stage_id, round) {
            (None, None) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM review_rounds WHERE submission_id = ?1 {}",
                    ROUND_COLUMNS, order
                ))?;
                let rows = stmt.query_map(params![submission_id], row_to_round)?;
                rows.collect::<SqliteResult<Vec<_>>>()?
            }
            (Some(stage), None) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM review_rounds \
                     WHERE submission_id = ?1 AND stage_id = ?2 {}",
                    ROUND_COLUMNS, order
                ))?;
                let rows = stmt.query_map(
                    params![submission_id, stage.to_db_str()],
                    row_to_round,
                )?;
                rows.collect::<SqliteResult<Vec<_>>>()?
            }
            (None, Some(round_no)) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM review_rounds \
                     WHERE submission_id = ?1 AND round = ?2 {}",
                    ROUND_COLUMNS, order
                ))?;
                let rows = stmt.query_map(params![submission_id, round_no], row_to_round)?;
                rows.collect::<SqliteResult<Vec<_>>>()?
            }
            (Some(stage), Some(round_no)) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM review_rounds \
                     WHERE submission_id = ?1 AND stage_id = ?2 AND round = ?3 {}",
                    ROUND_COLUMNS, order
                ))?;
                let rows = stmt.query_map(
                    params![submission_id, stage.to_db_str(), round_no],
                    row_to_round,
                )?;
                rows.collect::<SqliteResult<Vec<_>>>()?
            }
        };

        Ok(rounds)
    }

    /// 查询稿件的最新评审轮(可限定阶段)
    ///
    /// # 规则
    /// - "最新" = (阶段权重, 轮次) 最大者
    pub fn find_last_by_submission(
        &self,
        submission_id: &str,
        stage_id: Option<StageId>,
    ) -> RepositoryResult<Option<ReviewRound>> {
        let conn = self.get_conn()?;

        let order = "ORDER BY \
             CASE stage_id \
                 WHEN 'INTERNAL_REVIEW' THEN 1 \
                 WHEN 'EXTERNAL_REVIEW' THEN 2 \
                 ELSE 0 \
             END DESC, \
             round DESC \
             LIMIT 1";

        let result = match stage_id {
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM review_rounds WHERE submission_id = ?1 {}",
                    ROUND_COLUMNS, order
                ))?;
                stmt.query_row(params![submission_id], row_to_round)
            }
            Some(stage) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM review_rounds \
                     WHERE submission_id = ?1 AND stage_id = ?2 {}",
                    ROUND_COLUMNS, order
                ))?;
                stmt.query_row(params![submission_id, stage.to_db_str()], row_to_round)
            }
        };

        match result {
            Ok(round) => Ok(Some(round)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 条件状态更新(最小写入契约的落库部分)
    ///
    /// # 参数
    /// - expected: 调用方读到的存量状态;UPDATE 以 `status IS ?` 约束,
    ///   并发竞争下另一次重算抢先写入时本语句不命中
    ///
    /// # 返回
    /// - Ok(true): 写入命中(恰好一行)
    /// - Ok(false): 未命中(存量状态已被他人改写,或评审轮不存在)
    pub fn update_status_guarded(
        &self,
        round_id: &str,
        new_status: RoundStatus,
        expected: Option<RoundStatus>,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let updated = conn.execute(
            r#"
            UPDATE review_rounds
            SET status = ?1, updated_at = ?2
            WHERE round_id = ?3 AND status IS ?4
            "#,
            params![
                new_status.to_db_str(),
                Utc::now().format(TIMESTAMP_FORMAT).to_string(),
                round_id,
                expected.map(|s| s.to_db_str()),
            ],
        )?;
        Ok(updated == 1)
    }

    /// 更新修改稿版次计数
    pub fn update_review_revision(
        &self,
        round_id: &str,
        review_revision: i32,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let updated = conn.execute(
            r#"
            UPDATE review_rounds
            SET review_revision = ?1, updated_at = ?2
            WHERE round_id = ?3
            "#,
            params![
                review_revision,
                Utc::now().format(TIMESTAMP_FORMAT).to_string(),
                round_id,
            ],
        )?;
        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ReviewRound".to_string(),
                id: round_id.to_string(),
            });
        }
        Ok(())
    }

    /// 读取评审轮扩展设置(JSON 值)
    pub fn get_setting(
        &self,
        round_id: &str,
        setting_name: &str,
    ) -> RepositoryResult<Option<serde_json::Value>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT setting_value FROM review_round_settings \
             WHERE round_id = ?1 AND setting_name = ?2",
            params![round_id, setting_name],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(raw) => {
                let value = serde_json::from_str(&raw).map_err(|e| {
                    RepositoryError::FieldValueError {
                        field: format!("review_round_settings.{}", setting_name),
                        message: e.to_string(),
                    }
                })?;
                Ok(Some(value))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 写入评审轮扩展设置(INSERT OR REPLACE 实现 upsert 语义)
    pub fn set_setting(
        &self,
        round_id: &str,
        setting_name: &str,
        setting_value: &serde_json::Value,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO review_round_settings (
                round_id, setting_name, setting_value
            ) VALUES (?1, ?2, ?3)
            "#,
            params![round_id, setting_name, setting_value.to_string()],
        )?;
        Ok(())
    }

    /// 删除评审轮扩展设置
    pub fn delete_setting(&self, round_id: &str, setting_name: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "DELETE FROM review_round_settings WHERE round_id = ?1 AND setting_name = ?2",
            params![round_id, setting_name],
        )?;
        Ok(())
    }

    /// 删除评审轮及其设置与关联通知(单事务)
    ///
    /// # 说明
    /// - 本仓储唯一的跨实体副作用: 通知表中 assoc 指向该评审轮的行一并清除
    ///
    /// # 返回
    /// - Ok(usize): 连带删除的通知行数
    pub fn delete_with_notifications(&self, round_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let notifications = tx.execute(
            "DELETE FROM notifications WHERE assoc_type = ?1 AND assoc_id = ?2",
            params![NOTIFICATION_ASSOC_REVIEW_ROUND, round_id],
        )?;
        tx.execute(
            "DELETE FROM review_round_settings WHERE round_id = ?1",
            params![round_id],
        )?;
        tx.execute(
            "DELETE FROM review_rounds WHERE round_id = ?1",
            params![round_id],
        )?;

        tx.commit()?;
        Ok(notifications)
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 行映射: review_rounds → ReviewRound
///
/// 列序与 ROUND_COLUMNS 一致
fn row_to_round(row: &Row<'_>) -> SqliteResult<ReviewRound> {
    let round_id: String = row.get(0)?;
    let stage_raw: String = row.get(3)?;
    let status_raw: Option<String> = row.get(5)?;

    Ok(ReviewRound {
        round_id: round_id.clone(),
        submission_id: row.get(1)?,
        publication_id: row.get(2)?,
        stage_id: parse_stage(&round_id, &stage_raw),
        round: row.get(4)?,
        status: parse_status(&round_id, status_raw),
        review_revision: row.get(6)?,
        created_at: parse_timestamp(&row.get::<_, String>(7)?),
        updated_at: parse_timestamp(&row.get::<_, String>(8)?),
    })
}

/// 解析阶段(无法识别时按内审处理并告警)
fn parse_stage(round_id: &str, raw: &str) -> StageId {
    StageId::from_db_str(raw).unwrap_or_else(|| {
        tracing::warn!(round_id, raw, "评审轮 stage_id 无法识别,按 INTERNAL_REVIEW 处理");
        StageId::InternalReview
    })
}

/// 解析状态(未设置返回 None;无法识别降级为 None 并记数据完整性告警)
///
/// 无法识别意味着该行由预期之外的代码写入,推导按"从未推导"处理
fn parse_status(round_id: &str, raw: Option<String>) -> Option<RoundStatus> {
    let raw = raw?;
    match RoundStatus::from_db_str(&raw) {
        Some(status) => Some(status),
        None => {
            tracing::warn!(
                round_id,
                %raw,
                "评审轮 status 无法识别,按未推导状态处理(数据完整性告警)"
            );
            None
        }
    }
}

/// 解析时间戳(格式异常时回退默认值)
fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| NaiveDateTime::default())
        .and_utc()
}
