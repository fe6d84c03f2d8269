// ==========================================
// 绩效评价管理系统 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: Engine 不拼 SQL, 不写库
// ==========================================

pub mod phase_transition;
pub mod repositories;
pub mod status_aggregator;
pub mod status_core;

// 重导出核心引擎
pub use phase_transition::{PhaseDecision, PhaseTransitionEngine, PHASE_ORDER};
pub use repositories::StatusRepositories;
pub use status_aggregator::{
    EmployeeEvaluationStatus, StatusAggregator, StatusDataSource, StatusSignals,
};
pub use status_core::EvaluationStatusCore;
