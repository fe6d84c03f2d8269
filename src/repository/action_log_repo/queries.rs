use super::core::{ActionLogRepository, ACTION_TS_FORMAT};
use crate::domain::action_log::ActionLog;
use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;
use rusqlite::{params, Result as SqliteResult, Row};

impl ActionLogRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 action_id 查询单个日志
    pub fn find_by_id(&self, action_id: &str) -> RepositoryResult<Option<ActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, period_id, action_type, action_ts, actor,
                   payload_json, detail
            FROM action_log
            WHERE action_id = ?
            "#,
        )?;

        match stmt.query_row(params![action_id], |row| self.map_row(row)) {
            Ok(log) => Ok(Some(log)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询指定评价周期的全部操作日志 (按时间升序)
    pub fn find_by_period_id(&self, period_id: &str) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, period_id, action_type, action_ts, actor,
                   payload_json, detail
            FROM action_log
            WHERE period_id = ?
            ORDER BY action_ts ASC, action_id ASC
            "#,
        )?;

        let logs = stmt
            .query_map(params![period_id], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 查询指定时间范围的操作日志
    pub fn find_by_time_range(
        &self,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, period_id, action_type, action_ts, actor,
                   payload_json, detail
            FROM action_log
            WHERE action_ts BETWEEN ? AND ?
            ORDER BY action_ts DESC
            "#,
        )?;

        let logs = stmt
            .query_map(
                params![
                    start_time.format(ACTION_TS_FORMAT).to_string(),
                    end_time.format(ACTION_TS_FORMAT).to_string(),
                ],
                |row| self.map_row(row),
            )?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 查询指定操作类型的日志
    pub fn find_by_action_type(
        &self,
        action_type: &str,
        limit: i32,
    ) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, period_id, action_type, action_ts, actor,
                   payload_json, detail
            FROM action_log
            WHERE action_type = ?
            ORDER BY action_ts DESC
            LIMIT ?
            "#,
        )?;

        let logs = stmt
            .query_map(params![action_type, limit], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 统计指定评价周期的日志总数
    pub fn count_by_period(&self, period_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM action_log WHERE period_id = ?",
            params![period_id],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 将数据库行映射为 ActionLog 实体
    fn map_row(&self, row: &Row) -> SqliteResult<ActionLog> {
        let action_ts_str: String = row.get(3)?;
        let payload_json_str: Option<String> = row.get(5)?;

        let action_ts = NaiveDateTime::parse_from_str(&action_ts_str, ACTION_TS_FORMAT)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
            })?;

        // 无法解析的负载按缺失处理
        let payload_json = payload_json_str.and_then(|s| serde_json::from_str(&s).ok());

        Ok(ActionLog {
            action_id: row.get(0)?,
            period_id: row.get(1)?,
            action_type: row.get(2)?,
            action_ts,
            actor: row.get(4)?,
            payload_json,
            detail: row.get(6)?,
        })
    }
}
