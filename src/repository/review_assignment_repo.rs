// ==========================================
// 学术期刊审稿流程系统 - 评审指派数据仓储(只读)
// ==========================================
// 依据: Journal_Dev_Master_Spec.md - PART D 引擎铁律
// 红线: 评审指派归属外部子系统,本仓储只读,不提供写接口
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::review::ReviewAssignment;
use crate::domain::types::ReviewAssignmentStatus;
use crate::engine::providers::ReviewAssignmentProvider;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ReviewAssignmentRepository - 评审指派仓储
// ==========================================
/// 评审指派仓储
/// 职责: review_assignments 表的只读查询
/// 用途: 状态推导的数据源之一
pub struct ReviewAssignmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReviewAssignmentRepository {
    /// 创建新的 ReviewAssignmentRepository 实例
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

    /// 查询评审轮的全部评审指派
    pub fn list_by_round_sync(&self, round_id: &str) -> RepositoryResult<Vec<ReviewAssignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                assignment_id, round_id, reviewer_id, status,
                date_assigned, date_response_due, date_review_due
            FROM review_assignments
            WHERE round_id = ?1
            ORDER BY date_assigned ASC, assignment_id ASC
            "#,
        )?;

        let assignments = stmt
            .query_map(params![round_id], row_to_assignment)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(assignments)
    }
}

#[async_trait]
impl ReviewAssignmentProvider for ReviewAssignmentRepository {
    async fn list_by_round(
        &self,
        round_id: &str,
    ) -> Result<Vec<ReviewAssignment>, Box<dyn Error>> {
        Ok(self.list_by_round_sync(round_id)?)
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 行映射: review_assignments → ReviewAssignment
fn row_to_assignment(row: &Row<'_>) -> SqliteResult<ReviewAssignment> {
    let assignment_id: String = row.get(0)?;
    let status_raw: String = row.get(3)?;

    Ok(ReviewAssignment {
        assignment_id: assignment_id.clone(),
        round_id: row.get(1)?,
        reviewer_id: row.get(2)?,
        status: parse_assignment_status(&assignment_id, &status_raw),
        date_assigned: NaiveDateTime::parse_from_str(
            &row.get::<_, String>(4)?,
            "%Y-%m-%d %H:%M:%S",
        )
        .unwrap_or_else(|_| NaiveDateTime::default())
        .and_utc(),
        date_response_due: parse_opt_date(row.get::<_, Option<String>>(5)?),
        date_review_due: parse_opt_date(row.get::<_, Option<String>>(6)?),
    })
}

/// 解析指派状态(无法识别降级为 AWAITING_RESPONSE 并告警)
///
/// 降级值不会让评审轮误入逾期/完成态,异常行在日志中可审计
fn parse_assignment_status(assignment_id: &str, raw: &str) -> ReviewAssignmentStatus {
    ReviewAssignmentStatus::from_db_str(raw).unwrap_or_else(|| {
        tracing::warn!(
            assignment_id,
            raw,
            "评审指派 status 无法识别,按 AWAITING_RESPONSE 处理(数据完整性告警)"
        );
        ReviewAssignmentStatus::AwaitingResponse
    })
}

/// 解析可空日期列
fn parse_opt_date(raw: Option<String>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}
