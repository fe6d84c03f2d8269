// ==========================================
// 绩效评价管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod action_log_repo;
pub mod assignment_repo;
pub mod error;
pub mod evaluation_period_repo;
pub mod final_evaluation_repo;
pub mod peer_evaluation_repo;
pub mod self_evaluation_repo;
pub mod step_approval_repo;

// 重导出核心仓储
pub use action_log_repo::ActionLogRepository;
pub use assignment_repo::AssignmentRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use evaluation_period_repo::{
    EvaluationPeriodRepository, PeriodScan, PhaseAdvance, UndecodablePeriod,
};
pub use final_evaluation_repo::FinalEvaluationRepository;
pub use peer_evaluation_repo::PeerEvaluationRepository;
pub use self_evaluation_repo::SelfEvaluationRepository;
pub use step_approval_repo::StepApprovalRepository;
