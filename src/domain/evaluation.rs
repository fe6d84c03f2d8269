// ==========================================
// 绩效评价管理系统 - 评价流程记录
// ==========================================
// 职责: 状态派生所需的只读流程记录
// 红线: 这些记录由外部流程写入, 本核心只读
// ==========================================

use crate::domain::types::ApprovalStatus;
use serde::{Deserialize, Serialize};

// ==========================================
// WbsSelfEvaluation - WBS 自评记录
// ==========================================
// 粒度: (period, employee, wbs_item)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WbsSelfEvaluation {
    pub id: String,
    pub period_id: String,
    pub employee_id: String,
    pub wbs_item_id: String,
    pub performance_result: Option<String>, // 成果描述 (可能为空白)
    pub self_evaluation_score: Option<f64>, // 自评分
    pub is_completed: bool,                 // 自评是否提交
}

impl WbsSelfEvaluation {
    /// 成果是否已录入 (去除空白后非空)
    pub fn has_performance_input(&self) -> bool {
        self.performance_result
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }
}

// ==========================================
// PeerEvaluation - 同事评价请求
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerEvaluation {
    pub id: String,
    pub period_id: String,
    pub evaluatee_id: String, // 被评价人
    pub evaluator_id: String, // 评价人
    pub is_completed: bool,
}

// ==========================================
// FinalEvaluation - 最终评价
// ==========================================
// 粒度: (period, employee)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalEvaluation {
    pub id: String,
    pub period_id: String,
    pub employee_id: String,
    pub evaluation_grade: Option<String>,
    pub is_confirmed: bool,
}

// ==========================================
// StepApproval - 阶段审批
// ==========================================
// 粒度: (period, employee)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepApproval {
    pub period_id: String,
    pub employee_id: String,
    pub criteria_setting_status: Option<ApprovalStatus>, // None = 未定义
    pub criteria_submitted: bool,                        // 评价标准是否已提交
}
