// ==========================================
// 学术期刊审稿流程系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为,避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout,减少并发写入时的偶发 busy 错误
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout(毫秒)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
///
/// 说明:
/// - 版本号用于**提示/告警**(不做自动迁移),避免静默在旧库上运行导致隐性错误
/// - 评审轮相关表(review_rounds / review_round_settings / notifications)自 v2 起定型
pub const CURRENT_SCHEMA_VERSION: i64 = 2;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明:
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开带 SQL 观测 hook 的连接(审计工具/排障用)
///
/// 统一 PRAGMA 之外,另装 trace/profile 回调做 SQL 计数与慢查询告警,
/// 开关见 `crate::perf`
pub fn open_traced_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let mut conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    crate::perf::install_sqlite_tracing(&mut conn);
    Ok(conn)
}

/// 读取 schema_version(若表不存在则返回 None)
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 校验 schema_version 并在不匹配时记录告警(不阻断)
pub fn warn_on_schema_mismatch(conn: &Connection) {
    match read_schema_version(conn) {
        Ok(Some(v)) if v == CURRENT_SCHEMA_VERSION => {}
        Ok(Some(v)) => {
            tracing::warn!(
                found = v,
                expected = CURRENT_SCHEMA_VERSION,
                "数据库 schema_version 与代码期望不一致,请检查迁移状态"
            );
        }
        Ok(None) => {
            tracing::warn!("数据库缺少 schema_version 表,可能是未初始化的库");
        }
        Err(e) => {
            tracing::warn!("读取 schema_version 失败: {}", e);
        }
    }
}
