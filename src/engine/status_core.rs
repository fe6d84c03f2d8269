// ==========================================
// 绩效评价管理系统 - 评价状态纯函数库
// ==========================================
// 职责: 由计数/标志派生各子流程状态
// 红线: 无状态、无副作用、无 I/O 操作; 任何输入都不报错
// 说明: 计数不做一致性校验 (completed > total 按现有分支落位)
// ==========================================

use crate::domain::evaluation::{FinalEvaluation, WbsSelfEvaluation};
use crate::domain::types::{ApprovalStatus, CriteriaSetupStatus, ProgressStatus};

// ==========================================
// EvaluationStatusCore - 纯函数工具类
// ==========================================
pub struct EvaluationStatusCore;

impl EvaluationStatusCore {
    // ==========================================
    // 评价标准设置
    // ==========================================

    /// 评价项状态
    ///
    /// # 规则
    /// - 项目数 > 0 且 WBS 数 > 0 → Complete
    /// - 仅其中一个 > 0 → InProgress
    /// - 否则 → None
    pub fn evaluation_item_status(project_count: i64, wbs_count: i64) -> ProgressStatus {
        match (project_count > 0, wbs_count > 0) {
            (true, true) => ProgressStatus::Complete,
            (true, false) | (false, true) => ProgressStatus::InProgress,
            (false, false) => ProgressStatus::None,
        }
    }

    /// WBS 评价标准状态
    ///
    /// # 规则
    /// - total == 0 → None
    /// - with_criteria == 0 → None (与 total == 0 不区分)
    /// - with_criteria == total → Complete
    /// - 否则 → InProgress
    pub fn wbs_criteria_status(
        total_wbs_count: i64,
        wbs_with_criteria_count: i64,
    ) -> ProgressStatus {
        Self::ratio_status(total_wbs_count, wbs_with_criteria_count)
    }

    /// 评价标准设置进度 (合取)
    ///
    /// # 规则
    /// - 两者均 None → None
    /// - 两者均 Complete → Complete
    /// - 其他组合 → InProgress
    pub fn criteria_setup_progress(
        evaluation_item: ProgressStatus,
        wbs_criteria: ProgressStatus,
    ) -> ProgressStatus {
        match (evaluation_item, wbs_criteria) {
            (ProgressStatus::None, ProgressStatus::None) => ProgressStatus::None,
            (ProgressStatus::Complete, ProgressStatus::Complete) => ProgressStatus::Complete,
            _ => ProgressStatus::InProgress,
        }
    }

    /// 评价标准设置总状态
    ///
    /// # 判定顺序 (顺序不可调整)
    /// 1. 进度 None → None (审批状态无意义)
    /// 2. 审批 = 要求修改 → RevisionRequested
    /// 3. 审批 = 修改完成 → RevisionCompleted
    /// 4. 进度 InProgress → InProgress
    /// 5. 未提交 → InProgress
    /// 6. 其余 → 审批状态 (未定义时为 Pending)
    pub fn criteria_setup_status(
        evaluation_item: ProgressStatus,
        wbs_criteria: ProgressStatus,
        approval_status: Option<ApprovalStatus>,
        is_submitted: bool,
    ) -> CriteriaSetupStatus {
        let progress = Self::criteria_setup_progress(evaluation_item, wbs_criteria);

        if progress == ProgressStatus::None {
            return CriteriaSetupStatus::None;
        }

        match approval_status {
            Some(ApprovalStatus::RevisionRequested) => {
                return CriteriaSetupStatus::RevisionRequested
            }
            Some(ApprovalStatus::RevisionCompleted) => {
                return CriteriaSetupStatus::RevisionCompleted
            }
            _ => {}
        }

        if progress == ProgressStatus::InProgress {
            return CriteriaSetupStatus::InProgress;
        }

        if !is_submitted {
            return CriteriaSetupStatus::InProgress;
        }

        approval_status
            .map(CriteriaSetupStatus::from)
            .unwrap_or(CriteriaSetupStatus::Pending)
    }

    /// 由原始计数直接计算评价标准设置总状态
    pub fn compute_criteria_setup_status(
        project_count: i64,
        wbs_count: i64,
        total_wbs_count: i64,
        wbs_with_criteria_count: i64,
        approval_status: Option<ApprovalStatus>,
        is_submitted: bool,
    ) -> CriteriaSetupStatus {
        let evaluation_item = Self::evaluation_item_status(project_count, wbs_count);
        let wbs_criteria = Self::wbs_criteria_status(total_wbs_count, wbs_with_criteria_count);
        Self::criteria_setup_status(evaluation_item, wbs_criteria, approval_status, is_submitted)
    }

    // ==========================================
    // 成果录入 / 自评 / 同事评价
    // ==========================================

    /// 统计已录入成果的自评记录数 (去除空白后非空)
    pub fn count_performance_inputs(records: &[WbsSelfEvaluation]) -> i64 {
        records.iter().filter(|r| r.has_performance_input()).count() as i64
    }

    /// 成果录入状态 (规则同 WBS 评价标准)
    pub fn performance_input_status(
        total_wbs_count: i64,
        input_completed_count: i64,
    ) -> ProgressStatus {
        Self::ratio_status(total_wbs_count, input_completed_count)
    }

    /// 自评状态: completed 为已提交的自评记录数
    pub fn self_evaluation_status(total_count: i64, completed_count: i64) -> ProgressStatus {
        Self::ratio_status(total_count, completed_count)
    }

    /// 同事评价状态: total 为收到的评价请求数
    pub fn peer_evaluation_status(total_requests: i64, completed_count: i64) -> ProgressStatus {
        Self::ratio_status(total_requests, completed_count)
    }

    // ==========================================
    // 最终评价
    // ==========================================

    /// 最终评价状态
    ///
    /// # 规则
    /// - 无记录 → None
    /// - 已确认 → Complete
    /// - 否则 → InProgress
    pub fn final_evaluation_status(record: Option<&FinalEvaluation>) -> ProgressStatus {
        match record {
            None => ProgressStatus::None,
            Some(r) if r.is_confirmed => ProgressStatus::Complete,
            Some(_) => ProgressStatus::InProgress,
        }
    }

    // ==========================================
    // 汇总
    // ==========================================

    /// 多个子状态合取
    ///
    /// # 规则
    /// - 空集合或全部 None → None
    /// - 全部 Complete → Complete
    /// - 否则 → InProgress
    pub fn combine(statuses: &[ProgressStatus]) -> ProgressStatus {
        if statuses.iter().all(|s| *s == ProgressStatus::None) {
            ProgressStatus::None
        } else if statuses.iter().all(|s| *s == ProgressStatus::Complete) {
            ProgressStatus::Complete
        } else {
            ProgressStatus::InProgress
        }
    }

    fn ratio_status(total: i64, done: i64) -> ProgressStatus {
        if total == 0 || done == 0 {
            ProgressStatus::None
        } else if done == total {
            ProgressStatus::Complete
        } else {
            ProgressStatus::InProgress
        }
    }
}
