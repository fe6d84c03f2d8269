// ==========================================
// 绩效评价管理系统 - 自动阶段流转执行器
// ==========================================
// 职责: 扫描进行中的评价周期, 截止时间已到则推进一个阶段
// 红线: 单个周期失败不影响其他周期
// 红线: 阶段写入为条件更新, 冲突不计入流转数
// 红线: 审计日志为尽力写入, 失败不回滚已推进的阶段
// ==========================================

use crate::domain::action_log::{ActionLog, ActionType};
use crate::engine::phase_transition::{PhaseDecision, PhaseTransitionEngine};
use crate::repository::{
    ActionLogRepository, EvaluationPeriodRepository, PeriodScan, PhaseAdvance, RepositoryResult,
};
use crate::scheduler::clock::Clock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

// ==========================================
// PeriodPhaseStore - 周期阶段存取接口
// ==========================================
pub trait PeriodPhaseStore: Send + Sync {
    /// 全部进行中且未删除的周期; 无法解码的行单独返回, 不影响其他行
    fn scan_in_progress(&self) -> RepositoryResult<Vec<PeriodScan>>;

    /// 条件推进; Ok(false) 表示周期已不处于 from 阶段
    fn advance_phase(&self, advance: &PhaseAdvance) -> RepositoryResult<bool>;
}

impl PeriodPhaseStore for EvaluationPeriodRepository {
    fn scan_in_progress(&self) -> RepositoryResult<Vec<PeriodScan>> {
        EvaluationPeriodRepository::scan_in_progress(self)
    }

    fn advance_phase(&self, advance: &PhaseAdvance) -> RepositoryResult<bool> {
        EvaluationPeriodRepository::advance_phase(self, advance)
    }
}

// ==========================================
// PhaseTransitionReport - 单次执行结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodFailure {
    pub period_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTransitionReport {
    pub transitioned_count: usize,
    pub skipped_count: usize,
    pub conflict_count: usize,
    pub failures: Vec<PeriodFailure>,
}

impl PhaseTransitionReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

// ==========================================
// AutoPhaseTransitionRunner
// ==========================================
pub struct AutoPhaseTransitionRunner {
    store: Arc<dyn PeriodPhaseStore>,
    action_log_repo: Option<Arc<ActionLogRepository>>,
    engine: PhaseTransitionEngine,
    actor: String,
}

impl AutoPhaseTransitionRunner {
    /// # 参数
    /// - `store`: 周期阶段存取
    /// - `action_log_repo`: 审计日志仓储 (None 时不写日志)
    /// - `actor`: 审计日志中的操作人
    pub fn new(
        store: Arc<dyn PeriodPhaseStore>,
        action_log_repo: Option<Arc<ActionLogRepository>>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            store,
            action_log_repo,
            engine: PhaseTransitionEngine::new(),
            actor: actor.into(),
        }
    }

    /// 执行一次自动阶段流转
    ///
    /// # 返回
    /// - Ok(report): 扫描完成 (个别周期失败记录在 report.failures)
    /// - Err: 查询进行中周期失败, 本次不做任何写入
    ///
    /// 单行无法解码的周期记入 report.failures, 其余周期照常处理
    #[instrument(skip(self, clock), fields(actor = %self.actor))]
    pub fn run(&self, clock: &dyn Clock) -> RepositoryResult<PhaseTransitionReport> {
        let started = Instant::now();
        let now = clock.now();
        let now_utc = now.with_timezone(&Utc);

        let scans = self.store.scan_in_progress().map_err(|e| {
            tracing::error!("查询进行中的评价周期失败: {}", e);
            e
        })?;

        let mut report = PhaseTransitionReport::default();

        for scan in &scans {
            let period = match scan {
                Ok(period) => period,
                Err(bad) => {
                    tracing::error!(
                        period_id = %bad.period_id,
                        error = %bad.message,
                        "评价周期数据无法解析"
                    );
                    report.failures.push(PeriodFailure {
                        period_id: bad.period_id.clone(),
                        message: bad.message.clone(),
                    });
                    continue;
                }
            };

            match self.engine.evaluate(period, &now) {
                PhaseDecision::Advance {
                    from,
                    to,
                    completes_period,
                } => {
                    let advance = PhaseAdvance {
                        period_id: period.id.clone(),
                        from,
                        to,
                        completed_date: if completes_period { Some(now_utc) } else { None },
                        updated_at: now_utc,
                    };

                    match self.store.advance_phase(&advance) {
                        Ok(true) => {
                            tracing::info!(
                                period_id = %period.id,
                                from = %from,
                                to = %to,
                                "评价周期阶段已自动流转"
                            );
                            report.transitioned_count += 1;
                            self.record_transition(&advance, now_utc);
                        }
                        Ok(false) => {
                            tracing::warn!(
                                period_id = %period.id,
                                from = %from,
                                "评价周期阶段已被并发修改, 跳过"
                            );
                            report.conflict_count += 1;
                        }
                        Err(e) => {
                            tracing::error!(
                                period_id = %period.id,
                                error = %e,
                                "评价周期阶段流转失败"
                            );
                            report.failures.push(PeriodFailure {
                                period_id: period.id.clone(),
                                message: e.to_string(),
                            });
                        }
                    }
                }
                decision => {
                    tracing::debug!(period_id = %period.id, decision = ?decision, "未到流转条件");
                    report.skipped_count += 1;
                }
            }
        }

        tracing::info!(
            scanned = scans.len(),
            transitioned = report.transitioned_count,
            skipped = report.skipped_count,
            conflicts = report.conflict_count,
            failures = report.failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "自动阶段流转完成"
        );

        Ok(report)
    }

    /// 写入审计日志 (尽力而为)
    fn record_transition(&self, advance: &PhaseAdvance, at: DateTime<Utc>) {
        let repo = match &self.action_log_repo {
            Some(repo) => repo,
            None => return,
        };

        let payload = json!({
            "from": advance.from,
            "to": advance.to,
            "completedDate": advance.completed_date,
        });

        let mut logs = vec![ActionLog::new(
            Uuid::new_v4().to_string(),
            Some(advance.period_id.clone()),
            ActionType::AutoPhaseTransition,
            self.actor.clone(),
            at.naive_utc(),
        )
        .with_payload(&payload)
        .with_detail(format!("{} -> {}", advance.from, advance.to))];

        if advance.completed_date.is_some() {
            logs.push(
                ActionLog::new(
                    Uuid::new_v4().to_string(),
                    Some(advance.period_id.clone()),
                    ActionType::PeriodCompleted,
                    self.actor.clone(),
                    at.naive_utc(),
                )
                .with_detail("评价周期已完成".to_string()),
            );
        }

        if let Err(e) = repo.batch_insert(logs) {
            tracing::warn!(period_id = %advance.period_id, "写入阶段流转审计日志失败: {}", e);
        }
    }
}
