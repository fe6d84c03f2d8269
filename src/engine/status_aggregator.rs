// ==========================================
// 绩效评价管理系统 - 员工评价状态聚合
// ==========================================
// 职责: 汇总 (周期, 员工) 的五个子流程状态与整体状态
// 输入: StatusSignals (调用方预先取数)
// 输出: EmployeeEvaluationStatus
// 红线: aggregate 不做 I/O; 取数通过 StatusDataSource 完成
// ==========================================

use crate::domain::evaluation::{FinalEvaluation, StepApproval, WbsSelfEvaluation};
use crate::domain::evaluation_period::EvaluationPeriod;
use crate::domain::types::{CriteriaSetupStatus, ProgressStatus};
use crate::engine::status_core::EvaluationStatusCore;
use crate::repository::error::RepositoryResult;
use serde::{Deserialize, Serialize};

// ==========================================
// StatusDataSource - 状态取数接口
// ==========================================
// 软删除记录不计入
pub trait StatusDataSource {
    /// 员工在周期内的有效项目分配数
    fn count_active_projects(&self, period_id: &str, employee_id: &str) -> RepositoryResult<i64>;

    /// 员工在周期内的有效 WBS 分配数
    fn count_active_wbs_items(&self, period_id: &str, employee_id: &str) -> RepositoryResult<i64>;

    /// 已配置评价标准的 WBS 分配数
    fn count_wbs_items_with_criteria(
        &self,
        period_id: &str,
        employee_id: &str,
    ) -> RepositoryResult<i64>;

    /// 员工的全部有效自评记录
    fn find_self_evaluations(
        &self,
        period_id: &str,
        employee_id: &str,
    ) -> RepositoryResult<Vec<WbsSelfEvaluation>>;

    /// 同事评价请求数 (总数, 已完成数); employee 为被评价人
    fn count_peer_evaluations(
        &self,
        period_id: &str,
        employee_id: &str,
    ) -> RepositoryResult<(i64, i64)>;

    fn find_final_evaluation(
        &self,
        period_id: &str,
        employee_id: &str,
    ) -> RepositoryResult<Option<FinalEvaluation>>;

    fn find_step_approval(
        &self,
        period_id: &str,
        employee_id: &str,
    ) -> RepositoryResult<Option<StepApproval>>;
}

// ==========================================
// StatusSignals - 原始信号快照
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct StatusSignals {
    pub project_count: i64,
    pub wbs_count: i64,
    pub wbs_with_criteria_count: i64,
    pub self_evaluations: Vec<WbsSelfEvaluation>,
    pub peer_total: i64,
    pub peer_completed: i64,
    pub final_evaluation: Option<FinalEvaluation>,
    pub step_approval: Option<StepApproval>,
}

// ==========================================
// EmployeeEvaluationStatus - 聚合结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeEvaluationStatus {
    pub period_id: String,
    pub employee_id: String,
    pub evaluation_item: ProgressStatus,
    pub wbs_criteria: ProgressStatus,
    pub criteria_setup: CriteriaSetupStatus,
    pub performance_input: ProgressStatus,
    pub self_evaluation: ProgressStatus,
    pub peer_evaluation: ProgressStatus,
    pub final_evaluation: ProgressStatus,
    pub self_evaluation_score: Option<f64>,
    pub self_evaluation_grade: Option<String>,
    pub overall: ProgressStatus,
}

// ==========================================
// StatusAggregator
// ==========================================
pub struct StatusAggregator;

impl StatusAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 取数: 依次调用数据源, 任一失败即返回错误
    pub fn collect_signals(
        &self,
        source: &dyn StatusDataSource,
        period_id: &str,
        employee_id: &str,
    ) -> RepositoryResult<StatusSignals> {
        let (peer_total, peer_completed) = source.count_peer_evaluations(period_id, employee_id)?;

        Ok(StatusSignals {
            project_count: source.count_active_projects(period_id, employee_id)?,
            wbs_count: source.count_active_wbs_items(period_id, employee_id)?,
            wbs_with_criteria_count: source.count_wbs_items_with_criteria(period_id, employee_id)?,
            self_evaluations: source.find_self_evaluations(period_id, employee_id)?,
            peer_total,
            peer_completed,
            final_evaluation: source.find_final_evaluation(period_id, employee_id)?,
            step_approval: source.find_step_approval(period_id, employee_id)?,
        })
    }

    /// 聚合 (纯函数)
    ///
    /// # 规则
    /// - 评价标准: 评价项 + WBS 标准 + 审批 (见 EvaluationStatusCore)
    /// - 成果录入: 分母为 WBS 分配数, 分子为去空白后非空成果数
    /// - 自评: 分母为自评记录数, 分子为已提交数
    /// - 整体: 仅统计周期开关开启的子流程, 合取规则
    pub fn aggregate(
        &self,
        period: &EvaluationPeriod,
        employee_id: &str,
        signals: &StatusSignals,
    ) -> EmployeeEvaluationStatus {
        let evaluation_item =
            EvaluationStatusCore::evaluation_item_status(signals.project_count, signals.wbs_count);
        let wbs_criteria = EvaluationStatusCore::wbs_criteria_status(
            signals.wbs_count,
            signals.wbs_with_criteria_count,
        );

        let (approval, submitted) = signals
            .step_approval
            .as_ref()
            .map(|a| (a.criteria_setting_status, a.criteria_submitted))
            .unwrap_or((None, false));
        let criteria_setup = EvaluationStatusCore::criteria_setup_status(
            evaluation_item,
            wbs_criteria,
            approval,
            submitted,
        );

        let input_completed =
            EvaluationStatusCore::count_performance_inputs(&signals.self_evaluations);
        let performance_input =
            EvaluationStatusCore::performance_input_status(signals.wbs_count, input_completed);

        let self_total = signals.self_evaluations.len() as i64;
        let self_completed = signals
            .self_evaluations
            .iter()
            .filter(|r| r.is_completed)
            .count() as i64;
        let self_evaluation =
            EvaluationStatusCore::self_evaluation_status(self_total, self_completed);

        let peer_evaluation =
            EvaluationStatusCore::peer_evaluation_status(
                signals.peer_total,
                signals.peer_completed,
            );

        let final_evaluation =
            EvaluationStatusCore::final_evaluation_status(signals.final_evaluation.as_ref());

        let self_evaluation_score = Self::average_self_score(&signals.self_evaluations);
        let self_evaluation_grade = self_evaluation_score
            .and_then(|score| period.grade_for_score(score))
            .map(|r| r.grade.clone());

        let mut included = Vec::with_capacity(5);
        if period.criteria_setting_enabled {
            included.push(criteria_setup.as_progress());
        }
        included.push(performance_input);
        if period.self_evaluation_setting_enabled {
            included.push(self_evaluation);
        }
        included.push(peer_evaluation);
        if period.final_evaluation_setting_enabled {
            included.push(final_evaluation);
        }
        let overall = EvaluationStatusCore::combine(&included);

        EmployeeEvaluationStatus {
            period_id: period.id.clone(),
            employee_id: employee_id.to_string(),
            evaluation_item,
            wbs_criteria,
            criteria_setup,
            performance_input,
            self_evaluation,
            peer_evaluation,
            final_evaluation,
            self_evaluation_score,
            self_evaluation_grade,
            overall,
        }
    }

    /// 已提交且有分数的自评记录的平均分
    fn average_self_score(records: &[WbsSelfEvaluation]) -> Option<f64> {
        let scores: Vec<f64> = records
            .iter()
            .filter(|r| r.is_completed)
            .filter_map(|r| r.self_evaluation_score)
            .collect();

        if scores.is_empty() {
            return None;
        }
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

impl Default for StatusAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evaluation_period::GradeRange;
    use crate::domain::types::ApprovalStatus;
    use crate::repository::error::RepositoryError;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn make_period() -> EvaluationPeriod {
        let mut period = EvaluationPeriod::new(
            "p1".to_string(),
            "2025 上半年".to_string(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        );
        period.grade_ranges = vec![
            GradeRange::new("A", 90.0, 120.0),
            GradeRange::new("B", 70.0, 89.99),
            GradeRange::new("C", 0.0, 69.99),
        ];
        period
    }

    fn self_eval(
        wbs: &str,
        result: Option<&str>,
        score: Option<f64>,
        completed: bool,
    ) -> WbsSelfEvaluation {
        WbsSelfEvaluation {
            id: format!("se-{}", wbs),
            period_id: "p1".to_string(),
            employee_id: "e1".to_string(),
            wbs_item_id: wbs.to_string(),
            performance_result: result.map(|s| s.to_string()),
            self_evaluation_score: score,
            is_completed: completed,
        }
    }

    fn finished_signals() -> StatusSignals {
        StatusSignals {
            project_count: 1,
            wbs_count: 2,
            wbs_with_criteria_count: 2,
            self_evaluations: vec![
                self_eval("w1", Some("完成"), Some(95.0), true),
                self_eval("w2", Some("完成"), Some(85.0), true),
            ],
            peer_total: 1,
            peer_completed: 1,
            final_evaluation: Some(FinalEvaluation {
                id: "f1".to_string(),
                period_id: "p1".to_string(),
                employee_id: "e1".to_string(),
                evaluation_grade: Some("A".to_string()),
                is_confirmed: true,
            }),
            step_approval: Some(StepApproval {
                period_id: "p1".to_string(),
                employee_id: "e1".to_string(),
                criteria_setting_status: Some(ApprovalStatus::Approved),
                criteria_submitted: true,
            }),
        }
    }

    #[test]
    fn test_aggregate_empty_signals_is_none() {
        let status =
            StatusAggregator::new().aggregate(&make_period(), "e1", &StatusSignals::default());

        assert_eq!(status.criteria_setup, CriteriaSetupStatus::None);
        assert_eq!(status.performance_input, ProgressStatus::None);
        assert_eq!(status.final_evaluation, ProgressStatus::None);
        assert_eq!(status.overall, ProgressStatus::None);
        assert!(status.self_evaluation_grade.is_none());
    }

    #[test]
    fn test_aggregate_all_finished_is_complete() {
        let status = StatusAggregator::new().aggregate(&make_period(), "e1", &finished_signals());

        assert_eq!(status.criteria_setup, CriteriaSetupStatus::Approved);
        assert_eq!(status.performance_input, ProgressStatus::Complete);
        assert_eq!(status.self_evaluation, ProgressStatus::Complete);
        assert_eq!(status.peer_evaluation, ProgressStatus::Complete);
        assert_eq!(status.final_evaluation, ProgressStatus::Complete);
        assert_eq!(status.overall, ProgressStatus::Complete);
        assert_eq!(status.self_evaluation_score, Some(90.0));
        assert_eq!(status.self_evaluation_grade.as_deref(), Some("A"));
    }

    #[test]
    fn test_aggregate_partial_is_in_progress() {
        let mut signals = finished_signals();
        signals.self_evaluations[1].performance_result = Some("  ".to_string());
        signals.self_evaluations[1].is_completed = false;

        let status = StatusAggregator::new().aggregate(&make_period(), "e1", &signals);

        assert_eq!(status.performance_input, ProgressStatus::InProgress);
        assert_eq!(status.self_evaluation, ProgressStatus::InProgress);
        assert_eq!(status.self_evaluation_score, Some(95.0));
        assert_eq!(status.overall, ProgressStatus::InProgress);
    }

    #[test]
    fn test_aggregate_disabled_steps_are_excluded() {
        let mut period = make_period();
        period.criteria_setting_enabled = false;
        period.final_evaluation_setting_enabled = false;

        let mut signals = finished_signals();
        signals.step_approval = None; // 未提交 → criteria_setup = in_progress
        signals.final_evaluation = None;

        let status = StatusAggregator::new().aggregate(&period, "e1", &signals);

        assert_eq!(status.criteria_setup, CriteriaSetupStatus::InProgress);
        assert_eq!(status.final_evaluation, ProgressStatus::None);
        assert_eq!(status.overall, ProgressStatus::Complete);
    }

    #[test]
    fn test_aggregate_revision_requested_keeps_overall_in_progress() {
        let mut signals = finished_signals();
        if let Some(approval) = signals.step_approval.as_mut() {
            approval.criteria_setting_status = Some(ApprovalStatus::RevisionRequested);
        }

        let status = StatusAggregator::new().aggregate(&make_period(), "e1", &signals);

        assert_eq!(status.criteria_setup, CriteriaSetupStatus::RevisionRequested);
        assert_eq!(status.overall, ProgressStatus::InProgress);
    }

    // ==========================================
    // collect_signals
    // ==========================================

    struct StubSource {
        fail_final: bool,
    }

    impl StatusDataSource for StubSource {
        fn count_active_projects(&self, _: &str, _: &str) -> RepositoryResult<i64> {
            Ok(2)
        }
        fn count_active_wbs_items(&self, _: &str, _: &str) -> RepositoryResult<i64> {
            Ok(3)
        }
        fn count_wbs_items_with_criteria(&self, _: &str, _: &str) -> RepositoryResult<i64> {
            Ok(1)
        }
        fn find_self_evaluations(
            &self,
            _: &str,
            _: &str,
        ) -> RepositoryResult<Vec<WbsSelfEvaluation>> {
            Ok(vec![self_eval("w1", Some("x"), None, false)])
        }
        fn count_peer_evaluations(&self, _: &str, _: &str) -> RepositoryResult<(i64, i64)> {
            Ok((4, 2))
        }
        fn find_final_evaluation(
            &self,
            _: &str,
            _: &str,
        ) -> RepositoryResult<Option<FinalEvaluation>> {
            if self.fail_final {
                Err(RepositoryError::DatabaseQueryError("boom".to_string()))
            } else {
                Ok(None)
            }
        }
        fn find_step_approval(&self, _: &str, _: &str) -> RepositoryResult<Option<StepApproval>> {
            Ok(None)
        }
    }

    #[test]
    fn test_collect_signals() {
        let signals = StatusAggregator::new()
            .collect_signals(&StubSource { fail_final: false }, "p1", "e1")
            .unwrap();

        assert_eq!(signals.project_count, 2);
        assert_eq!(signals.wbs_count, 3);
        assert_eq!(signals.wbs_with_criteria_count, 1);
        assert_eq!(signals.self_evaluations.len(), 1);
        assert_eq!((signals.peer_total, signals.peer_completed), (4, 2));
        assert!(signals.final_evaluation.is_none());
    }

    #[test]
    fn test_collect_signals_propagates_error() {
        let source = StubSource { fail_final: true };
        let result = StatusAggregator::new().collect_signals(&source, "p1", "e1");
        assert!(result.is_err());
    }
}
