// ==========================================
// 学术期刊审稿流程系统 - 编辑阶段指派数据仓储(只读)
// ==========================================
// 依据: Journal_Dev_Master_Spec.md - PART D 引擎铁律
// 红线: 阶段指派归属外部子系统,本仓储只读
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::review::StageAssignment;
use crate::domain::types::StageId;
use crate::engine::providers::EditorAssignmentProvider;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// StageAssignmentRepository - 编辑阶段指派仓储
// ==========================================
/// 编辑阶段指派仓储
/// 职责: stage_assignments 表的只读查询
/// 用途: 推荐制编辑统计的数据源
pub struct StageAssignmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StageAssignmentRepository {
    /// 创建新的 StageAssignmentRepository 实例
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

    /// 查询某稿件+阶段下 recommend_only 的编辑指派
    pub fn list_recommend_only_sync(
        &self,
        submission_id: &str,
        stage_id: StageId,
    ) -> RepositoryResult<Vec<StageAssignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                stage_assignment_id, submission_id, stage_id,
                user_id, role_id, recommend_only
            FROM stage_assignments
            WHERE submission_id = ?1 AND stage_id = ?2 AND recommend_only = 1
            ORDER BY user_id ASC
            "#,
        )?;

        let assignments = stmt
            .query_map(params![submission_id, stage_id.to_db_str()], |row| {
                let stage_raw: String = row.get(2)?;
                Ok(StageAssignment {
                    stage_assignment_id: row.get(0)?,
                    submission_id: row.get(1)?,
                    // WHERE 已按参数过滤,解析失败时回退查询参数
                    stage_id: StageId::from_db_str(&stage_raw).unwrap_or(stage_id),
                    user_id: row.get(3)?,
                    role_id: row.get(4)?,
                    recommend_only: row.get::<_, i64>(5)? != 0,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(assignments)
    }
}

#[async_trait]
impl EditorAssignmentProvider for StageAssignmentRepository {
    async fn list_recommend_only(
        &self,
        submission_id: &str,
        stage_id: StageId,
    ) -> Result<Vec<StageAssignment>, Box<dyn Error>> {
        Ok(self.list_recommend_only_sync(submission_id, stage_id)?)
    }
}
