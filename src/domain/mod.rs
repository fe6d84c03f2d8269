// ==========================================
// 绩效评价管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod evaluation;
pub mod evaluation_period;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use evaluation::{FinalEvaluation, PeerEvaluation, StepApproval, WbsSelfEvaluation};
pub use evaluation_period::{grade_for_score, validate_grade_ranges, EvaluationPeriod, GradeRange};
pub use types::{
    ApprovalStatus, CriteriaSetupStatus, EvaluationPhase, PeriodStatus, ProgressStatus,
};
