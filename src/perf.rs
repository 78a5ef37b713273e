// ==========================================
// SQL 观测(语句计数 + 慢查询日志)
// ==========================================
// 用途: 状态审计工具与排障场景下观察推导触发的查询量
// 开关: 环境变量控制,Release 默认关闭
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

static SQL_TRACING_ENABLED: AtomicBool = AtomicBool::new(false);
static SLOW_SQL_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);

thread_local! {
    // 嵌套 guard 深度与本线程的语句/慢查询计数
    static GUARD_DEPTH: Cell<u32> = Cell::new(0);
    static STMT_COUNT: Cell<u64> = Cell::new(0);
    static SLOW_STMT_COUNT: Cell<u64> = Cell::new(0);
}

fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(
            v.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "on"
        ),
        Err(_) => default,
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn one_line(sql: &str, max_len: usize) -> String {
    let s = sql.trim().replace('\n', " ");
    if s.len() <= max_len {
        s
    } else {
        format!("{}…", &s[..max_len])
    }
}

/// 安装 SQLite 语句 trace/profile 回调
///
/// 开关:
/// - Debug 默认开启;Release 默认关闭
/// - `JOURNAL_REVIEW_PERF_SQL=1` 强制开启
/// - `JOURNAL_REVIEW_SLOW_SQL_MS=50` 配置慢 SQL 阈值(毫秒)
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let enabled = env_flag("JOURNAL_REVIEW_PERF_SQL", cfg!(debug_assertions));
    SQL_TRACING_ENABLED.store(enabled, Ordering::Relaxed);

    if !enabled {
        // 显式清理,避免复用连接导致残留 callback
        conn.trace(None);
        conn.profile(None);
        return;
    }

    let default_threshold = if cfg!(debug_assertions) { 50 } else { 200 };
    SLOW_SQL_THRESHOLD_MS.store(
        env_u64("JOURNAL_REVIEW_SLOW_SQL_MS", default_threshold),
        Ordering::Relaxed,
    );

    conn.trace(Some(on_statement));
    conn.profile(Some(on_statement_profiled));
}

fn on_statement(_sql: &str) {
    if !SQL_TRACING_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    if GUARD_DEPTH.with(|d| d.get() > 0) {
        STMT_COUNT.with(|c| c.set(c.get().saturating_add(1)));
    }
}

fn on_statement_profiled(sql: &str, duration: Duration) {
    if !SQL_TRACING_ENABLED.load(Ordering::Relaxed) {
        return;
    }

    let ms = duration.as_millis() as u64;
    let threshold = SLOW_SQL_THRESHOLD_MS.load(Ordering::Relaxed);
    if threshold == 0 || ms < threshold {
        return;
    }

    tracing::warn!(
        target: "slow_sql",
        duration_ms = ms,
        sql = %one_line(sql, 420),
        "slow sql"
    );
    if GUARD_DEPTH.with(|d| d.get() > 0) {
        SLOW_STMT_COUNT.with(|c| c.set(c.get().saturating_add(1)));
    }
}

// ==========================================
// QueryStatsGuard
// ==========================================

/// 操作级查询统计 Guard: drop 时输出耗时 + 语句数 + 慢 SQL 数
///
/// 使用方式:
/// ```ignore
/// let _stats = journal_review_engine::perf::QueryStatsGuard::new("refresh_round_status");
/// // do work...
/// ```
pub struct QueryStatsGuard {
    op: &'static str,
    started: Instant,
    stmt_base: u64,
    slow_base: u64,
}

impl QueryStatsGuard {
    pub fn new(op: &'static str) -> Self {
        GUARD_DEPTH.with(|d| d.set(d.get().saturating_add(1)));
        Self {
            op,
            started: Instant::now(),
            stmt_base: STMT_COUNT.with(|c| c.get()),
            slow_base: SLOW_STMT_COUNT.with(|c| c.get()),
        }
    }
}

impl Drop for QueryStatsGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        let stmt_count = STMT_COUNT.with(|c| c.get()).saturating_sub(self.stmt_base);
        let slow_count = SLOW_STMT_COUNT
            .with(|c| c.get())
            .saturating_sub(self.slow_base);

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            stmt_count,
            slow_count,
            "done"
        );

        GUARD_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}
