// ==========================================
// 绩效评价管理系统 - 评价周期数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑 (阶段判定在 PhaseTransitionEngine)
// 红线: 阶段写入使用条件更新, 防止并发调度重复推进
// ==========================================

use crate::domain::evaluation_period::{validate_grade_ranges, EvaluationPeriod, GradeRange};
use crate::domain::types::{EvaluationPhase, PeriodStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    id, name, start_date, status, current_phase,
    evaluation_setup_deadline, performance_deadline,
    self_evaluation_deadline, peer_evaluation_deadline, completed_date,
    criteria_setting_enabled, self_evaluation_setting_enabled, final_evaluation_setting_enabled,
    max_self_evaluation_rate, grade_ranges_json, created_at, updated_at
"#;

// ==========================================
// PhaseAdvance - 阶段推进写入参数
// ==========================================
/// 条件更新参数: 仅当 current_phase 仍为 from 且周期仍为 in-progress 时生效
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseAdvance {
    pub period_id: String,
    pub from: EvaluationPhase,
    pub to: EvaluationPhase,
    /// Some 时同时写入 status = completed 与 completed_date
    pub completed_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// 无法解码的周期行 (日期格式错误 / grade_ranges_json 损坏等)
#[derive(Debug, Clone, PartialEq)]
pub struct UndecodablePeriod {
    pub period_id: String,
    pub message: String,
}

/// 逐行扫描结果: 单行解码失败不影响其他行
pub type PeriodScan = Result<EvaluationPeriod, UndecodablePeriod>;

// ==========================================
// EvaluationPeriodRepository - 评价周期仓储
// ==========================================
pub struct EvaluationPeriodRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EvaluationPeriodRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入评价周期
    ///
    /// # 返回
    /// - Err(ValidationError): 等级区间非法
    /// - Err(UniqueConstraintViolation): id 已存在
    pub fn insert(&self, period: &EvaluationPeriod) -> RepositoryResult<()> {
        validate_grade_ranges(&period.grade_ranges).map_err(RepositoryError::ValidationError)?;
        let grade_ranges_json = serde_json::to_string(&period.grade_ranges)?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO evaluation_period (
                id, name, start_date, status, current_phase,
                evaluation_setup_deadline, performance_deadline,
                self_evaluation_deadline, peer_evaluation_deadline, completed_date,
                criteria_setting_enabled, self_evaluation_setting_enabled, final_evaluation_setting_enabled,
                max_self_evaluation_rate, grade_ranges_json, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
            params![
                period.id,
                period.name,
                period.start_date,
                period.status.to_db_str(),
                period.current_phase.map(|p| p.to_db_str()),
                period.evaluation_setup_deadline,
                period.performance_deadline,
                period.self_evaluation_deadline,
                period.peer_evaluation_deadline,
                period.completed_date,
                period.criteria_setting_enabled,
                period.self_evaluation_setting_enabled,
                period.final_evaluation_setting_enabled,
                period.max_self_evaluation_rate,
                grade_ranges_json,
                period.created_at,
                period.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 阶段推进 (条件更新)
    ///
    /// # 返回
    /// - Ok(true): 已推进
    /// - Ok(false): 周期已被其他调度推进/已完成/已删除, 未写入
    /// - Err: 数据库错误
    pub fn advance_phase(&self, advance: &PhaseAdvance) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let rows = match advance.completed_date {
            Some(completed_date) => conn.execute(
                r#"
                UPDATE evaluation_period
                SET current_phase = ?2,
                    status = ?3,
                    completed_date = ?4,
                    updated_at = ?5
                WHERE id = ?1
                  AND current_phase = ?6
                  AND status = ?7
                  AND deleted_at IS NULL
                "#,
                params![
                    advance.period_id,
                    advance.to.to_db_str(),
                    PeriodStatus::Completed.to_db_str(),
                    completed_date,
                    advance.updated_at,
                    advance.from.to_db_str(),
                    PeriodStatus::InProgress.to_db_str(),
                ],
            )?,
            None => conn.execute(
                r#"
                UPDATE evaluation_period
                SET current_phase = ?2,
                    updated_at = ?3
                WHERE id = ?1
                  AND current_phase = ?4
                  AND status = ?5
                  AND deleted_at IS NULL
                "#,
                params![
                    advance.period_id,
                    advance.to.to_db_str(),
                    advance.updated_at,
                    advance.from.to_db_str(),
                    PeriodStatus::InProgress.to_db_str(),
                ],
            )?,
        };

        Ok(rows == 1)
    }

    /// 软删除
    pub fn soft_delete(&self, period_id: &str, deleted_at: DateTime<Utc>) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE evaluation_period SET deleted_at = ?2 WHERE id = ?1 AND deleted_at IS NULL",
            params![period_id, deleted_at],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "EvaluationPeriod".to_string(),
                id: period_id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 id 查询 (不含已删除)
    pub fn find_by_id(&self, period_id: &str) -> RepositoryResult<Option<EvaluationPeriod>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM evaluation_period WHERE id = ?1 AND deleted_at IS NULL",
            SELECT_COLUMNS
        );

        let period = conn
            .query_row(&sql, params![period_id], map_period_row)
            .optional()?;
        Ok(period)
    }

    /// 查询全部进行中的评价周期 (不含已删除)
    pub fn find_in_progress(&self) -> RepositoryResult<Vec<EvaluationPeriod>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&in_progress_sql())?;
        let periods = stmt
            .query_map(params![PeriodStatus::InProgress.to_db_str()], map_period_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(periods)
    }

    /// 逐行扫描进行中的评价周期 (不含已删除)
    ///
    /// 与 find_in_progress 不同, 单行解码失败以 Err(UndecodablePeriod) 返回,
    /// 其余行照常返回; 仅查询本身失败时整体返回 Err
    pub fn scan_in_progress(&self) -> RepositoryResult<Vec<PeriodScan>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&in_progress_sql())?;
        let scans = stmt
            .query_map(params![PeriodStatus::InProgress.to_db_str()], |row| {
                let period_id: String = row.get(0)?;
                Ok(map_period_row(row).map_err(|e| UndecodablePeriod {
                    period_id,
                    message: RepositoryError::from(e).to_string(),
                }))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(scans)
    }
}

// ==========================================
// 行映射
// ==========================================

fn in_progress_sql() -> String {
    format!(
        "SELECT {} FROM evaluation_period \
         WHERE status = ?1 AND deleted_at IS NULL ORDER BY start_date ASC, id ASC",
        SELECT_COLUMNS
    )
}

fn map_period_row(row: &Row) -> SqliteResult<EvaluationPeriod> {
    let status_raw: String = row.get(3)?;
    let status = PeriodStatus::parse(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Text,
            format!("未知的周期状态: {}", status_raw).into(),
        )
    })?;

    // 无法识别的阶段按“未设置”处理, 由调度器跳过
    let current_phase = row
        .get::<_, Option<String>>(4)?
        .and_then(|s| EvaluationPhase::parse(&s));

    let grade_ranges_raw: String = row.get(14)?;
    let grade_ranges: Vec<GradeRange> = serde_json::from_str(&grade_ranges_raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(14, Type::Text, Box::new(e)))?;

    Ok(EvaluationPeriod {
        id: row.get(0)?,
        name: row.get(1)?,
        start_date: row.get(2)?,
        status,
        current_phase,
        evaluation_setup_deadline: row.get(5)?,
        performance_deadline: row.get(6)?,
        self_evaluation_deadline: row.get(7)?,
        peer_evaluation_deadline: row.get(8)?,
        completed_date: row.get(9)?,
        criteria_setting_enabled: row.get(10)?,
        self_evaluation_setting_enabled: row.get(11)?,
        final_evaluation_setting_enabled: row.get(12)?,
        max_self_evaluation_rate: row.get(13)?,
        grade_ranges,
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
    })
}
