// ==========================================
// 绩效评价管理系统 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合状态汇总所需的所有 Repository, 并实现 StatusDataSource
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::domain::evaluation::{FinalEvaluation, StepApproval, WbsSelfEvaluation};
use crate::engine::status_aggregator::StatusDataSource;
use crate::repository::{
    AssignmentRepository, FinalEvaluationRepository, PeerEvaluationRepository, RepositoryResult,
    SelfEvaluationRepository, StepApprovalRepository,
};

/// 状态汇总仓储集合
///
/// # 包含的仓储
/// - `assignment_repo`: 项目/WBS 分配与评价标准
/// - `self_evaluation_repo`: WBS 自评
/// - `peer_evaluation_repo`: 同事评价
/// - `final_evaluation_repo`: 最终评价
/// - `step_approval_repo`: 阶段审批
#[derive(Clone)]
pub struct StatusRepositories {
    pub assignment_repo: Arc<AssignmentRepository>,
    pub self_evaluation_repo: Arc<SelfEvaluationRepository>,
    pub peer_evaluation_repo: Arc<PeerEvaluationRepository>,
    pub final_evaluation_repo: Arc<FinalEvaluationRepository>,
    pub step_approval_repo: Arc<StepApprovalRepository>,
}

impl StatusRepositories {
    /// 创建新的仓储集合
    pub fn new(
        assignment_repo: Arc<AssignmentRepository>,
        self_evaluation_repo: Arc<SelfEvaluationRepository>,
        peer_evaluation_repo: Arc<PeerEvaluationRepository>,
        final_evaluation_repo: Arc<FinalEvaluationRepository>,
        step_approval_repo: Arc<StepApprovalRepository>,
    ) -> Self {
        Self {
            assignment_repo,
            self_evaluation_repo,
            peer_evaluation_repo,
            final_evaluation_repo,
            step_approval_repo,
        }
    }

    /// 基于同一连接构造全部仓储
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self::new(
            Arc::new(AssignmentRepository::new(conn.clone())),
            Arc::new(SelfEvaluationRepository::new(conn.clone())),
            Arc::new(PeerEvaluationRepository::new(conn.clone())),
            Arc::new(FinalEvaluationRepository::new(conn.clone())),
            Arc::new(StepApprovalRepository::new(conn)),
        )
    }
}

impl StatusDataSource for StatusRepositories {
    fn count_active_projects(&self, period_id: &str, employee_id: &str) -> RepositoryResult<i64> {
        self.assignment_repo.count_active_projects(period_id, employee_id)
    }

    fn count_active_wbs_items(&self, period_id: &str, employee_id: &str) -> RepositoryResult<i64> {
        self.assignment_repo.count_active_wbs_items(period_id, employee_id)
    }

    fn count_wbs_items_with_criteria(
        &self,
        period_id: &str,
        employee_id: &str,
    ) -> RepositoryResult<i64> {
        self.assignment_repo
            .count_wbs_items_with_criteria(period_id, employee_id)
    }

    fn find_self_evaluations(
        &self,
        period_id: &str,
        employee_id: &str,
    ) -> RepositoryResult<Vec<WbsSelfEvaluation>> {
        self.self_evaluation_repo
            .find_by_period_and_employee(period_id, employee_id)
    }

    fn count_peer_evaluations(
        &self,
        period_id: &str,
        employee_id: &str,
    ) -> RepositoryResult<(i64, i64)> {
        self.peer_evaluation_repo
            .count_for_evaluatee(period_id, employee_id)
    }

    fn find_final_evaluation(
        &self,
        period_id: &str,
        employee_id: &str,
    ) -> RepositoryResult<Option<FinalEvaluation>> {
        self.final_evaluation_repo
            .find_by_period_and_employee(period_id, employee_id)
    }

    fn find_step_approval(
        &self,
        period_id: &str,
        employee_id: &str,
    ) -> RepositoryResult<Option<StepApproval>> {
        self.step_approval_repo.find(period_id, employee_id)
    }
}
