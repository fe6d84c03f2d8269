// ==========================================
// 绩效评价管理系统 - 最终评价仓储
// ==========================================
// 职责: final_evaluation 表, 粒度 (period, employee)
// ==========================================

use crate::domain::evaluation::FinalEvaluation;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct FinalEvaluationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FinalEvaluationRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, evaluation: &FinalEvaluation) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO final_evaluation (id, period_id, employee_id, evaluation_grade, is_confirmed)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                evaluation.id,
                evaluation.period_id,
                evaluation.employee_id,
                evaluation.evaluation_grade,
                evaluation.is_confirmed,
            ],
        )?;
        Ok(())
    }

    /// 确认最终评价
    pub fn confirm(&self, evaluation_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE final_evaluation SET is_confirmed = 1 WHERE id = ?1 AND deleted_at IS NULL",
            params![evaluation_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "FinalEvaluation".to_string(),
                id: evaluation_id.to_string(),
            });
        }
        Ok(())
    }

    /// 查询员工的最终评价 (多条时取最早创建的一条)
    pub fn find_by_period_and_employee(
        &self,
        period_id: &str,
        employee_id: &str,
    ) -> RepositoryResult<Option<FinalEvaluation>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, period_id, employee_id, evaluation_grade, is_confirmed
            FROM final_evaluation
            WHERE period_id = ?1 AND employee_id = ?2 AND deleted_at IS NULL
            ORDER BY rowid ASC
            LIMIT 1
            "#,
        )?;

        let result = stmt.query_row(params![period_id, employee_id], |row| {
            Ok(FinalEvaluation {
                id: row.get(0)?,
                period_id: row.get(1)?,
                employee_id: row.get(2)?,
                evaluation_grade: row.get(3)?,
                is_confirmed: row.get(4)?,
            })
        });

        match result {
            Ok(evaluation) => Ok(Some(evaluation)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evaluation_period::EvaluationPeriod;
    use crate::repository::evaluation_period_repo::EvaluationPeriodRepository;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn setup() -> FinalEvaluationRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));

        let period = EvaluationPeriod::new(
            "p1".to_string(),
            "2025 上半年".to_string(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        );
        EvaluationPeriodRepository::new(conn.clone()).insert(&period).unwrap();
        FinalEvaluationRepository::new(conn)
    }

    #[test]
    fn test_insert_confirm_and_find() {
        let repo = setup();
        assert!(repo.find_by_period_and_employee("p1", "e1").unwrap().is_none());

        repo.insert(&FinalEvaluation {
            id: "fe1".to_string(),
            period_id: "p1".to_string(),
            employee_id: "e1".to_string(),
            evaluation_grade: Some("A".to_string()),
            is_confirmed: false,
        })
        .unwrap();

        let found = repo.find_by_period_and_employee("p1", "e1").unwrap().unwrap();
        assert_eq!(found.evaluation_grade.as_deref(), Some("A"));
        assert!(!found.is_confirmed);

        repo.confirm("fe1").unwrap();
        let found = repo.find_by_period_and_employee("p1", "e1").unwrap().unwrap();
        assert!(found.is_confirmed);
    }
}
