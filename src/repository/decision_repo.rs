// ==========================================
// 学术期刊审稿流程系统 - 编辑决定数据仓储(只读)
// ==========================================
// 依据: Journal_Dev_Master_Spec.md - PART D 引擎铁律
// 红线: 编辑决定与稿件文件归属外部子系统,本仓储只读
// ==========================================
// 表: editorial_decisions / submission_files
// 状态推导只需要三类查询:
// 1. 某类型最近一次有效决定
// 2. 某时点之后是否出现修改稿文件
// 3. 某编辑对某评审轮的决定计数(推荐制判据)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::review::EditorialDecision;
use crate::domain::types::{DecisionType, StageId};
use crate::engine::providers::DecisionProvider;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 时间戳存储格式
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 修改稿文件在 submission_files 中的 file_stage 值
const FILE_STAGE_REVISION: &str = "REVISION";

// ==========================================
// DecisionRepository - 编辑决定仓储
// ==========================================
pub struct DecisionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DecisionRepository {
    /// 创建新的 DecisionRepository 实例
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

    /// 查询某稿件+阶段下指定类型的最近一次有效决定
    ///
    /// # 规则
    /// - "有效" = 该类型按 date_decided 最近的一条
    pub fn find_active_revision_decision_sync(
        &self,
        submission_id: &str,
        stage_id: StageId,
        decision_type: DecisionType,
    ) -> RepositoryResult<Option<EditorialDecision>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                decision_id, submission_id, stage_id, round_id,
                editor_id, decision_type, date_decided
            FROM editorial_decisions
            WHERE submission_id = ?1 AND stage_id = ?2 AND decision_type = ?3
            ORDER BY date_decided DESC
            LIMIT 1
            "#,
        )?;

        let result = stmt.query_row(
            params![
                submission_id,
                stage_id.to_db_str(),
                decision_type.to_db_str()
            ],
            |row| {
                let stage_raw: String = row.get(2)?;
                let type_raw: String = row.get(5)?;
                Ok(EditorialDecision {
                    decision_id: row.get(0)?,
                    submission_id: row.get(1)?,
                    // WHERE 已按参数过滤,解析失败时回退查询参数
                    stage_id: StageId::from_db_str(&stage_raw).unwrap_or(stage_id),
                    round_id: row.get(3)?,
                    editor_id: row.get(4)?,
                    decision_type: DecisionType::from_db_str(&type_raw).unwrap_or(decision_type),
                    date_decided: parse_timestamp(&row.get::<_, String>(6)?),
                })
            },
        );

        match result {
            Ok(decision) => Ok(Some(decision)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 判断某时点之后是否出现修改稿文件
    pub fn revisions_uploaded_since_sync(
        &self,
        submission_id: &str,
        since: DateTime<Utc>,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM submission_files
            WHERE submission_id = ?1
              AND file_stage = ?2
              AND uploaded_at > ?3
            "#,
            params![
                submission_id,
                FILE_STAGE_REVISION,
                since.format(TIMESTAMP_FORMAT).to_string()
            ],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// 统计某编辑对某评审轮记录的决定数
    pub fn count_by_editor_and_round_sync(
        &self,
        editor_id: &str,
        round_id: &str,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM editorial_decisions
            WHERE editor_id = ?1 AND round_id = ?2
            "#,
            params![editor_id, round_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[async_trait]
impl DecisionProvider for DecisionRepository {
    async fn find_active_revision_decision(
        &self,
        submission_id: &str,
        stage_id: StageId,
        decision_type: DecisionType,
    ) -> Result<Option<EditorialDecision>, Box<dyn Error>> {
        Ok(self.find_active_revision_decision_sync(submission_id, stage_id, decision_type)?)
    }

    async fn revisions_uploaded_since(
        &self,
        submission_id: &str,
        since: DateTime<Utc>,
    ) -> Result<bool, Box<dyn Error>> {
        Ok(self.revisions_uploaded_since_sync(submission_id, since)?)
    }

    async fn count_by_editor_and_round(
        &self,
        editor_id: &str,
        round_id: &str,
    ) -> Result<i64, Box<dyn Error>> {
        Ok(self.count_by_editor_and_round_sync(editor_id, round_id)?)
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 解析时间戳(格式异常时回退默认值)
fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| NaiveDateTime::default())
        .and_utc()
}
