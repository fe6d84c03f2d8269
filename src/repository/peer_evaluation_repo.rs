// ==========================================
// 绩效评价管理系统 - 同事评价仓储
// ==========================================
// 职责: peer_evaluation 表
// ==========================================

use crate::domain::evaluation::PeerEvaluation;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct PeerEvaluationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PeerEvaluationRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, evaluation: &PeerEvaluation) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO peer_evaluation (id, period_id, evaluatee_id, evaluator_id, is_completed)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                evaluation.id,
                evaluation.period_id,
                evaluation.evaluatee_id,
                evaluation.evaluator_id,
                evaluation.is_completed,
            ],
        )?;
        Ok(())
    }

    /// 标记评价请求完成
    pub fn mark_completed(&self, evaluation_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE peer_evaluation SET is_completed = 1 WHERE id = ?1 AND deleted_at IS NULL",
            params![evaluation_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "PeerEvaluation".to_string(),
                id: evaluation_id.to_string(),
            });
        }
        Ok(())
    }

    /// 被评价人的评价请求计数
    ///
    /// # 返回
    /// - (总数, 已完成数)
    pub fn count_for_evaluatee(
        &self,
        period_id: &str,
        evaluatee_id: &str,
    ) -> RepositoryResult<(i64, i64)> {
        let conn = self.get_conn()?;
        let counts = conn.query_row(
            r#"
            SELECT COUNT(*), COALESCE(SUM(CASE WHEN is_completed = 1 THEN 1 ELSE 0 END), 0)
            FROM peer_evaluation
            WHERE period_id = ?1 AND evaluatee_id = ?2 AND deleted_at IS NULL
            "#,
            params![period_id, evaluatee_id],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )?;
        Ok(counts)
    }
}
