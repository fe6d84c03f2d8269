// ==========================================
// 绩效评价管理系统 - 分配与评价标准仓储
// ==========================================
// 职责: project_assignment / wbs_assignment / wbs_evaluation_criteria 表
// 说明: 分配由外部流程维护; 这里提供计数查询与写入入口
// 红线: 计数不含软删除记录
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub struct AssignmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AssignmentRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 分配项目, 返回分配 id
    pub fn assign_project(
        &self,
        period_id: &str,
        employee_id: &str,
        project_id: &str,
    ) -> RepositoryResult<String> {
        let id = Uuid::new_v4().to_string();
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO project_assignment (id, period_id, employee_id, project_id)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![id, period_id, employee_id, project_id],
        )?;
        Ok(id)
    }

    /// 分配 WBS 项, 返回分配 id
    pub fn assign_wbs_item(
        &self,
        period_id: &str,
        employee_id: &str,
        project_id: &str,
        wbs_item_id: &str,
    ) -> RepositoryResult<String> {
        let id = Uuid::new_v4().to_string();
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO wbs_assignment (id, period_id, employee_id, project_id, wbs_item_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![id, period_id, employee_id, project_id, wbs_item_id],
        )?;
        Ok(id)
    }

    /// 为 WBS 项登记评价标准, 返回标准 id
    pub fn add_wbs_criteria(&self, wbs_item_id: &str, criteria: &str) -> RepositoryResult<String> {
        let id = Uuid::new_v4().to_string();
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO wbs_evaluation_criteria (id, wbs_item_id, criteria) VALUES (?1, ?2, ?3)",
            params![id, wbs_item_id, criteria],
        )?;
        Ok(id)
    }

    /// 软删除项目分配
    pub fn remove_project_assignment(
        &self,
        assignment_id: &str,
        deleted_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE project_assignment SET deleted_at = ?2 WHERE id = ?1 AND deleted_at IS NULL",
            params![assignment_id, deleted_at],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ProjectAssignment".to_string(),
                id: assignment_id.to_string(),
            });
        }
        Ok(())
    }

    /// 软删除 WBS 分配
    pub fn remove_wbs_assignment(
        &self,
        assignment_id: &str,
        deleted_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE wbs_assignment SET deleted_at = ?2 WHERE id = ?1 AND deleted_at IS NULL",
            params![assignment_id, deleted_at],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "WbsAssignment".to_string(),
                id: assignment_id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 计数
    // ==========================================

    pub fn count_active_projects(
        &self,
        period_id: &str,
        employee_id: &str,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM project_assignment
            WHERE period_id = ?1 AND employee_id = ?2 AND deleted_at IS NULL
            "#,
            params![period_id, employee_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn count_active_wbs_items(
        &self,
        period_id: &str,
        employee_id: &str,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM wbs_assignment
            WHERE period_id = ?1 AND employee_id = ?2 AND deleted_at IS NULL
            "#,
            params![period_id, employee_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 至少有一条有效评价标准的 WBS 分配数
    pub fn count_wbs_items_with_criteria(
        &self,
        period_id: &str,
        employee_id: &str,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM wbs_assignment wa
            WHERE wa.period_id = ?1
              AND wa.employee_id = ?2
              AND wa.deleted_at IS NULL
              AND EXISTS (
                SELECT 1 FROM wbs_evaluation_criteria c
                WHERE c.wbs_item_id = wa.wbs_item_id AND c.deleted_at IS NULL
              )
            "#,
            params![period_id, employee_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evaluation_period::EvaluationPeriod;
    use crate::repository::evaluation_period_repo::EvaluationPeriodRepository;
    use chrono::{NaiveDate, TimeZone};

    fn setup() -> AssignmentRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));

        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let period = EvaluationPeriod::new(
            "p1".to_string(),
            "2025 上半年".to_string(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            now,
        );
        EvaluationPeriodRepository::new(conn.clone()).insert(&period).unwrap();

        AssignmentRepository::new(conn)
    }

    #[test]
    fn test_counts_exclude_soft_deleted() {
        let repo = setup();
        let deleted_at = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();

        repo.assign_project("p1", "e1", "prj1").unwrap();
        let removed = repo.assign_project("p1", "e1", "prj2").unwrap();
        repo.remove_project_assignment(&removed, deleted_at).unwrap();
        repo.assign_project("p1", "e2", "prj1").unwrap();

        repo.assign_wbs_item("p1", "e1", "prj1", "w1").unwrap();
        let removed_wbs = repo.assign_wbs_item("p1", "e1", "prj1", "w2").unwrap();
        repo.remove_wbs_assignment(&removed_wbs, deleted_at).unwrap();

        assert_eq!(repo.count_active_projects("p1", "e1").unwrap(), 1);
        assert_eq!(repo.count_active_wbs_items("p1", "e1").unwrap(), 1);
        assert_eq!(repo.count_active_projects("p1", "e3").unwrap(), 0);

        let result = repo.remove_project_assignment(&removed, deleted_at);
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[test]
    fn test_count_wbs_items_with_criteria() {
        let repo = setup();
        repo.assign_wbs_item("p1", "e1", "prj1", "w1").unwrap();
        repo.assign_wbs_item("p1", "e1", "prj1", "w2").unwrap();
        repo.assign_wbs_item("p1", "e1", "prj1", "w3").unwrap();

        repo.add_wbs_criteria("w1", "按期交付").unwrap();
        repo.add_wbs_criteria("w1", "缺陷率低于 1%").unwrap();
        repo.add_wbs_criteria("w2", "文档完整").unwrap();

        // w1 有两条标准也只计一次
        assert_eq!(repo.count_wbs_items_with_criteria("p1", "e1").unwrap(), 2);
        assert_eq!(repo.count_active_wbs_items("p1", "e1").unwrap(), 3);
    }
}
