// ==========================================
// 绩效评价管理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少调度器与查询并发时的偶发 busy 错误
// - 提供幂等的建表入口 (CREATE TABLE IF NOT EXISTS)
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
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

/// 读取 schema_version（若表不存在则返回 None）
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

/// 建表（幂等）并记录 schema_version
///
/// 说明：
/// - 流程记录表 (分配/自评/同事评价/最终评价/审批) 由外部流程写入，这里只保证结构存在
/// - 所有业务表使用 deleted_at 软删除
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL DEFAULT 'global',
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS evaluation_period (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            start_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'waiting',
            current_phase TEXT,
            evaluation_setup_deadline TEXT,
            performance_deadline TEXT,
            self_evaluation_deadline TEXT,
            peer_evaluation_deadline TEXT,
            completed_date TEXT,
            criteria_setting_enabled INTEGER NOT NULL DEFAULT 1,
            self_evaluation_setting_enabled INTEGER NOT NULL DEFAULT 1,
            final_evaluation_setting_enabled INTEGER NOT NULL DEFAULT 1,
            max_self_evaluation_rate INTEGER NOT NULL DEFAULT 120,
            grade_ranges_json TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_evaluation_period_status
            ON evaluation_period(status);

        CREATE TABLE IF NOT EXISTS project_assignment (
            id TEXT PRIMARY KEY,
            period_id TEXT NOT NULL REFERENCES evaluation_period(id),
            employee_id TEXT NOT NULL,
            project_id TEXT NOT NULL,
            deleted_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_project_assignment_period_employee
            ON project_assignment(period_id, employee_id);

        CREATE TABLE IF NOT EXISTS wbs_assignment (
            id TEXT PRIMARY KEY,
            period_id TEXT NOT NULL REFERENCES evaluation_period(id),
            employee_id TEXT NOT NULL,
            project_id TEXT NOT NULL,
            wbs_item_id TEXT NOT NULL,
            deleted_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_wbs_assignment_period_employee
            ON wbs_assignment(period_id, employee_id);

        CREATE TABLE IF NOT EXISTS wbs_evaluation_criteria (
            id TEXT PRIMARY KEY,
            wbs_item_id TEXT NOT NULL,
            criteria TEXT NOT NULL,
            deleted_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_wbs_evaluation_criteria_item
            ON wbs_evaluation_criteria(wbs_item_id);

        CREATE TABLE IF NOT EXISTS wbs_self_evaluation (
            id TEXT PRIMARY KEY,
            period_id TEXT NOT NULL REFERENCES evaluation_period(id),
            employee_id TEXT NOT NULL,
            wbs_item_id TEXT NOT NULL,
            performance_result TEXT,
            self_evaluation_score REAL,
            is_completed INTEGER NOT NULL DEFAULT 0,
            deleted_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_wbs_self_evaluation_period_employee
            ON wbs_self_evaluation(period_id, employee_id);

        CREATE TABLE IF NOT EXISTS peer_evaluation (
            id TEXT PRIMARY KEY,
            period_id TEXT NOT NULL REFERENCES evaluation_period(id),
            evaluatee_id TEXT NOT NULL,
            evaluator_id TEXT NOT NULL,
            is_completed INTEGER NOT NULL DEFAULT 0,
            deleted_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_peer_evaluation_period_evaluatee
            ON peer_evaluation(period_id, evaluatee_id);

        CREATE TABLE IF NOT EXISTS final_evaluation (
            id TEXT PRIMARY KEY,
            period_id TEXT NOT NULL REFERENCES evaluation_period(id),
            employee_id TEXT NOT NULL,
            evaluation_grade TEXT,
            is_confirmed INTEGER NOT NULL DEFAULT 0,
            deleted_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_final_evaluation_period_employee
            ON final_evaluation(period_id, employee_id);

        CREATE TABLE IF NOT EXISTS employee_evaluation_step_approval (
            period_id TEXT NOT NULL REFERENCES evaluation_period(id),
            employee_id TEXT NOT NULL,
            criteria_setting_status TEXT,
            criteria_submitted INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (period_id, employee_id)
        );

        CREATE TABLE IF NOT EXISTS action_log (
            action_id TEXT PRIMARY KEY,
            period_id TEXT,
            action_type TEXT NOT NULL,
            action_ts TEXT NOT NULL,
            actor TEXT NOT NULL,
            payload_json TEXT,
            detail TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_action_log_period_ts
            ON action_log(period_id, action_ts);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}
