// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use performance_eval::db::{ensure_schema, open_sqlite_connection};
use performance_eval::domain::{EvaluationPeriod, EvaluationPhase, GradeRange, PeriodStatus};
use performance_eval::repository::EvaluationPeriodRepository;
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接
pub fn open_shared(db_path: &str) -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(open_sqlite_connection(db_path).unwrap()))
}

/// 测试基准时刻: 2025-06-15 12:00:00 UTC
pub fn base_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

pub fn default_grade_ranges() -> Vec<GradeRange> {
    vec![
        GradeRange::new("S", 95.0, 120.0),
        GradeRange::new("A", 85.0, 94.99),
        GradeRange::new("B", 70.0, 84.99),
        GradeRange::new("C", 0.0, 69.99),
    ]
}

// ==========================================
// PeriodBuilder - 评价周期构造器
// ==========================================
pub struct PeriodBuilder {
    period: EvaluationPeriod,
}

impl PeriodBuilder {
    pub fn new(id: &str) -> Self {
        let mut period = EvaluationPeriod::new(
            id.to_string(),
            format!("{} 评价周期", id),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            base_now() - Duration::days(180),
        );
        period.grade_ranges = default_grade_ranges();
        Self { period }
    }

    /// 进行中 + 指定阶段
    pub fn in_phase(mut self, phase: EvaluationPhase) -> Self {
        self.period.status = PeriodStatus::InProgress;
        self.period.current_phase = Some(phase);
        self
    }

    pub fn status(mut self, status: PeriodStatus) -> Self {
        self.period.status = status;
        self
    }

    /// 四个截止时间统一设置为相对 base_now 的偏移
    pub fn all_deadlines(mut self, offset: Duration) -> Self {
        let at = Some(base_now() + offset);
        self.period.evaluation_setup_deadline = at;
        self.period.performance_deadline = at;
        self.period.self_evaluation_deadline = at;
        self.period.peer_evaluation_deadline = at;
        self
    }

    pub fn performance_deadline(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.period.performance_deadline = at;
        self
    }

    pub fn flags(mut self, criteria: bool, self_evaluation: bool, final_evaluation: bool) -> Self {
        self.period.criteria_setting_enabled = criteria;
        self.period.self_evaluation_setting_enabled = self_evaluation;
        self.period.final_evaluation_setting_enabled = final_evaluation;
        self
    }

    pub fn build(self) -> EvaluationPeriod {
        self.period
    }

    /// 构造并写入数据库
    pub fn insert(self, repo: &EvaluationPeriodRepository) -> EvaluationPeriod {
        let period = self.build();
        repo.insert(&period).unwrap();
        period
    }
}
