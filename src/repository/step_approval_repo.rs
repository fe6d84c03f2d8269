// ==========================================
// 绩效评价管理系统 - 阶段审批仓储
// ==========================================
// 职责: employee_evaluation_step_approval 表, 粒度 (period, employee)
// 说明: 无法识别的审批状态按“未定义”读取
// ==========================================

use crate::domain::evaluation::StepApproval;
use crate::domain::types::ApprovalStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct StepApprovalRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StepApprovalRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入或覆盖审批记录
    pub fn upsert(&self, approval: &StepApproval) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO employee_evaluation_step_approval (
                period_id, employee_id, criteria_setting_status, criteria_submitted
            ) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(period_id, employee_id) DO UPDATE SET
                criteria_setting_status = excluded.criteria_setting_status,
                criteria_submitted = excluded.criteria_submitted
            "#,
            params![
                approval.period_id,
                approval.employee_id,
                approval.criteria_setting_status.map(|s| s.to_db_str()),
                approval.criteria_submitted,
            ],
        )?;
        Ok(())
    }

    pub fn find(
        &self,
        period_id: &str,
        employee_id: &str,
    ) -> RepositoryResult<Option<StepApproval>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            r#"
            SELECT period_id, employee_id, criteria_setting_status, criteria_submitted
            FROM employee_evaluation_step_approval
            WHERE period_id = ?1 AND employee_id = ?2
            "#,
            params![period_id, employee_id],
            |row| {
                let status: Option<String> = row.get(2)?;
                Ok(StepApproval {
                    period_id: row.get(0)?,
                    employee_id: row.get(1)?,
                    criteria_setting_status: status.and_then(|s| ApprovalStatus::parse(&s)),
                    criteria_submitted: row.get(3)?,
                })
            },
        );

        match result {
            Ok(approval) => Ok(Some(approval)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
