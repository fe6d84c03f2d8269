// ==========================================
// 绩效评价管理系统 - 看板 API
// ==========================================
// 职责: 员工评价状态查询 + 操作日志查询
// 架构: API 层 → Engine 层 (StatusAggregator) → Repository 层
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::action_log::ActionLog;
use crate::domain::types::{EvaluationPhase, PeriodStatus};
use crate::engine::status_aggregator::{
    EmployeeEvaluationStatus, StatusAggregator, StatusDataSource,
};
use crate::repository::{ActionLogRepository, EvaluationPeriodRepository};

// ==========================================
// DTO
// ==========================================

/// 员工评价状态响应
///
/// 子流程状态平铺在顶层, 与周期信息并列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStatusResponse {
    pub period_name: String,
    pub period_status: PeriodStatus,
    pub current_phase: Option<EvaluationPhase>,
    #[serde(flatten)]
    pub status: EmployeeEvaluationStatus,
}

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi {
    period_repo: Arc<EvaluationPeriodRepository>,
    status_source: Arc<dyn StatusDataSource + Send + Sync>,
    action_log_repo: Arc<ActionLogRepository>,
    aggregator: StatusAggregator,
}

impl DashboardApi {
    /// 创建新的DashboardApi实例
    ///
    /// # 参数
    /// - period_repo: 评价周期仓储
    /// - status_source: 状态取数 (通常为 StatusRepositories)
    /// - action_log_repo: 操作日志仓储
    pub fn new(
        period_repo: Arc<EvaluationPeriodRepository>,
        status_source: Arc<dyn StatusDataSource + Send + Sync>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            period_repo,
            status_source,
            action_log_repo,
            aggregator: StatusAggregator::new(),
        }
    }

    /// 查询员工在评价周期内的整体状态
    ///
    /// # 返回
    /// - Ok(EmployeeStatusResponse)
    /// - Err(ApiError::NotFound): 周期不存在或已删除
    /// - Err(ApiError::InvalidInput): 参数为空
    pub fn get_employee_status(
        &self,
        period_id: &str,
        employee_id: &str,
    ) -> ApiResult<EmployeeStatusResponse> {
        if period_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("评价周期ID不能为空".to_string()));
        }
        if employee_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("员工ID不能为空".to_string()));
        }

        let period = self
            .period_repo
            .find_by_id(period_id)?
            .ok_or_else(|| ApiError::NotFound(format!("评价周期(id={})不存在", period_id)))?;

        let signals = self
            .aggregator
            .collect_signals(self.status_source.as_ref(), period_id, employee_id)?;
        let status = self.aggregator.aggregate(&period, employee_id, &signals);

        tracing::debug!(
            period_id = %period_id,
            employee_id = %employee_id,
            overall = %status.overall,
            "员工评价状态已汇总"
        );

        Ok(EmployeeStatusResponse {
            period_name: period.name,
            period_status: period.status,
            current_phase: period.current_phase,
            status,
        })
    }

    /// 查询评价周期的操作日志（按时间升序）
    pub fn list_period_action_logs(&self, period_id: &str) -> ApiResult<Vec<ActionLog>> {
        if period_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("评价周期ID不能为空".to_string()));
        }

        self.action_log_repo
            .find_by_period_id(period_id)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    /// 查询操作日志（按时间范围）
    pub fn list_action_logs(
        &self,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> ApiResult<Vec<ActionLog>> {
        if start_time > end_time {
            return Err(ApiError::InvalidInput(
                "开始时间不能晚于结束时间".to_string(),
            ));
        }

        self.action_log_repo
            .find_by_time_range(start_time, end_time)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StatusRepositories;
    use chrono::NaiveDate;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn setup_api() -> DashboardApi {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));

        DashboardApi::new(
            Arc::new(EvaluationPeriodRepository::new(conn.clone())),
            Arc::new(StatusRepositories::from_connection(conn.clone())),
            Arc::new(ActionLogRepository::new(conn)),
        )
    }

    #[test]
    fn test_get_employee_status_rejects_blank_ids() {
        let api = setup_api();
        assert!(matches!(
            api.get_employee_status(" ", "e1"),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            api.get_employee_status("p1", ""),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_get_employee_status_unknown_period() {
        let api = setup_api();
        assert!(matches!(
            api.get_employee_status("missing", "e1"),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_action_logs_rejects_inverted_range() {
        let api = setup_api();
        let day = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let result = api.list_action_logs(
            day.and_hms_opt(12, 0, 0).unwrap(),
            day.and_hms_opt(8, 0, 0).unwrap(),
        );
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }
}
