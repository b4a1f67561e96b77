// ==========================================
// 性能统计
// ==========================================
// PerfGuard: 作用域耗时 + 作用域内 SQL 语句数（target = "perf"）
// SQL 计数依赖 install_sqlite_tracing 在连接上注册 trace 回调
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// SQL 计数开关环境变量
pub const PERF_SQL_ENV: &str = "ADDITION_SIM_PERF_SQL";

static PERF_SQL_ENABLED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static ACTIVE_GUARDS: Cell<u32> = Cell::new(0);
    static SQL_COUNT: Cell<u64> = Cell::new(0);
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().map(|v| {
        matches!(
            v.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

/// 在连接上安装 SQL 计数回调
///
/// Debug 构建默认开启；`ADDITION_SIM_PERF_SQL=0/1` 显式控制
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let enabled = env_flag(PERF_SQL_ENV).unwrap_or(cfg!(debug_assertions));
    PERF_SQL_ENABLED.store(enabled, Ordering::Relaxed);

    if enabled {
        conn.trace(Some(count_statement));
    } else {
        conn.trace(None);
    }
}

fn count_statement(_sql: &str) {
    if !PERF_SQL_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    if ACTIVE_GUARDS.with(|g| g.get()) == 0 {
        return;
    }
    SQL_COUNT.with(|c| c.set(c.get().saturating_add(1)));
}

/// 性能统计 Guard：drop 时输出 elapsed_ms + sql_count
///
/// ```ignore
/// let _perf = welfare_addition_engine::perf::PerfGuard::new("judge");
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    sql_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        ACTIVE_GUARDS.with(|g| g.set(g.get().saturating_add(1)));
        Self {
            op,
            start: Instant::now(),
            sql_start: SQL_COUNT.with(|c| c.get()),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let sql_count = SQL_COUNT.with(|c| c.get()).saturating_sub(self.sql_start);

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms = self.elapsed_ms(),
            sql_count,
            "done"
        );

        ACTIVE_GUARDS.with(|g| g.set(g.get().saturating_sub(1)));
    }
}
