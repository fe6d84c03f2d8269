// ==========================================
// 绩效评价管理系统 - 领域类型定义
// ==========================================
// 职责: 评价流程中出现的所有闭合枚举
// 红线: 状态值只能是枚举成员, 不允许字符串透传
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 子流程进度状态 (Progress Status)
// ==========================================
// 用于: 评价项/WBS 评价标准/成果录入/自评/同事评价/最终评价
// 序列化格式: snake_case (与前端一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    None,       // 未开始
    InProgress, // 进行中
    Complete,   // 已完成
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::None => "none",
            ProgressStatus::InProgress => "in_progress",
            ProgressStatus::Complete => "complete",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 审批状态 (Approval Status)
// ==========================================
// 存储于 step_approval 表; "未定义" 用 Option::None 表达
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,           // 待审批
    Approved,          // 已批准
    RevisionRequested, // 要求修改
    RevisionCompleted, // 修改完成
}

impl ApprovalStatus {
    /// 从数据库字符串解析; 无法识别的值视为未定义
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(ApprovalStatus::Pending),
            "approved" => Some(ApprovalStatus::Approved),
            "revision_requested" => Some(ApprovalStatus::RevisionRequested),
            "revision_completed" => Some(ApprovalStatus::RevisionCompleted),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::RevisionRequested => "revision_requested",
            ApprovalStatus::RevisionCompleted => "revision_completed",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

// ==========================================
// 评价标准设置总状态 (Criteria Setup Status)
// ==========================================
// 进度状态 + 审批状态合成后的对外状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaSetupStatus {
    None,
    InProgress,
    Pending,
    Approved,
    RevisionRequested,
    RevisionCompleted,
}

impl CriteriaSetupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CriteriaSetupStatus::None => "none",
            CriteriaSetupStatus::InProgress => "in_progress",
            CriteriaSetupStatus::Pending => "pending",
            CriteriaSetupStatus::Approved => "approved",
            CriteriaSetupStatus::RevisionRequested => "revision_requested",
            CriteriaSetupStatus::RevisionCompleted => "revision_completed",
        }
    }

    /// 汇总到整体进度时的映射: 只有 approved 视为完成
    pub fn as_progress(&self) -> ProgressStatus {
        match self {
            CriteriaSetupStatus::None => ProgressStatus::None,
            CriteriaSetupStatus::Approved => ProgressStatus::Complete,
            CriteriaSetupStatus::InProgress
            | CriteriaSetupStatus::Pending
            | CriteriaSetupStatus::RevisionRequested
            | CriteriaSetupStatus::RevisionCompleted => ProgressStatus::InProgress,
        }
    }
}

impl From<ApprovalStatus> for CriteriaSetupStatus {
    fn from(status: ApprovalStatus) -> Self {
        match status {
            ApprovalStatus::Pending => CriteriaSetupStatus::Pending,
            ApprovalStatus::Approved => CriteriaSetupStatus::Approved,
            ApprovalStatus::RevisionRequested => CriteriaSetupStatus::RevisionRequested,
            ApprovalStatus::RevisionCompleted => CriteriaSetupStatus::RevisionCompleted,
        }
    }
}

impl fmt::Display for CriteriaSetupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 评价阶段 (Evaluation Phase)
// ==========================================
// 顺序: Waiting < EvaluationSetup < Performance < SelfEvaluation < PeerEvaluation < Closure
// 序列化格式: kebab-case (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvaluationPhase {
    Waiting,         // 等待开始
    EvaluationSetup, // 评价设置
    Performance,     // 成果录入
    SelfEvaluation,  // 自评
    PeerEvaluation,  // 同事评价
    Closure,         // 收尾(终态)
}

impl EvaluationPhase {
    /// 从数据库字符串解析; 无法识别的阶段返回 None
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "waiting" => Some(EvaluationPhase::Waiting),
            "evaluation-setup" => Some(EvaluationPhase::EvaluationSetup),
            "performance" => Some(EvaluationPhase::Performance),
            "self-evaluation" => Some(EvaluationPhase::SelfEvaluation),
            "peer-evaluation" => Some(EvaluationPhase::PeerEvaluation),
            "closure" => Some(EvaluationPhase::Closure),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EvaluationPhase::Waiting => "waiting",
            EvaluationPhase::EvaluationSetup => "evaluation-setup",
            EvaluationPhase::Performance => "performance",
            EvaluationPhase::SelfEvaluation => "self-evaluation",
            EvaluationPhase::PeerEvaluation => "peer-evaluation",
            EvaluationPhase::Closure => "closure",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EvaluationPhase::Closure)
    }
}

impl fmt::Display for EvaluationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

// ==========================================
// 评价周期状态 (Period Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PeriodStatus {
    Waiting,    // 未开始
    InProgress, // 进行中
    Completed,  // 已完成
}

impl PeriodStatus {
    /// 从数据库字符串解析
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "waiting" => Some(PeriodStatus::Waiting),
            "in-progress" => Some(PeriodStatus::InProgress),
            "completed" => Some(PeriodStatus::Completed),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PeriodStatus::Waiting => "waiting",
            PeriodStatus::InProgress => "in-progress",
            PeriodStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}
