// ==========================================
// 绩效评价管理系统 - WBS 自评仓储
// ==========================================
// 职责: wbs_self_evaluation 表
// 红线: 查询不含软删除记录
// ==========================================

use crate::domain::evaluation::WbsSelfEvaluation;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct SelfEvaluationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SelfEvaluationRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入或覆盖自评记录 (按 id)
    pub fn upsert(&self, evaluation: &WbsSelfEvaluation) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO wbs_self_evaluation (
                id, period_id, employee_id, wbs_item_id,
                performance_result, self_evaluation_score, is_completed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                performance_result = excluded.performance_result,
                self_evaluation_score = excluded.self_evaluation_score,
                is_completed = excluded.is_completed
            "#,
            params![
                evaluation.id,
                evaluation.period_id,
                evaluation.employee_id,
                evaluation.wbs_item_id,
                evaluation.performance_result,
                evaluation.self_evaluation_score,
                evaluation.is_completed,
            ],
        )?;
        Ok(())
    }

    /// 查询员工在周期内的全部有效自评
    pub fn find_by_period_and_employee(
        &self,
        period_id: &str,
        employee_id: &str,
    ) -> RepositoryResult<Vec<WbsSelfEvaluation>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, period_id, employee_id, wbs_item_id,
                   performance_result, self_evaluation_score, is_completed
            FROM wbs_self_evaluation
            WHERE period_id = ?1 AND employee_id = ?2 AND deleted_at IS NULL
            ORDER BY wbs_item_id ASC
            "#,
        )?;

        let evaluations = stmt
            .query_map(params![period_id, employee_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(evaluations)
    }
}

fn map_row(row: &Row) -> SqliteResult<WbsSelfEvaluation> {
    Ok(WbsSelfEvaluation {
        id: row.get(0)?,
        period_id: row.get(1)?,
        employee_id: row.get(2)?,
        wbs_item_id: row.get(3)?,
        performance_result: row.get(4)?,
        self_evaluation_score: row.get(5)?,
        is_completed: row.get(6)?,
    })
}
