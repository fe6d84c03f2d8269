// ==========================================
// 绩效评价管理系统 - 阶段流转引擎
// ==========================================
// 职责: 判定评价周期在给定时间点是否应前进到下一阶段
// 输入: 评价周期快照 + 当前时间
// 输出: 流转决策 (不写库)
// 红线: 只向前流转, 每次最多前进一个阶段
// ==========================================

use crate::domain::evaluation_period::EvaluationPeriod;
use crate::domain::types::EvaluationPhase;
use chrono::{DateTime, TimeZone, Utc};

/// 固定阶段顺序
pub const PHASE_ORDER: [EvaluationPhase; 6] = [
    EvaluationPhase::Waiting,
    EvaluationPhase::EvaluationSetup,
    EvaluationPhase::Performance,
    EvaluationPhase::SelfEvaluation,
    EvaluationPhase::PeerEvaluation,
    EvaluationPhase::Closure,
];

// ==========================================
// PhaseDecision - 流转决策
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseDecision {
    /// 截止时间已到, 前进到下一阶段
    Advance {
        from: EvaluationPhase,
        to: EvaluationPhase,
        completes_period: bool,
    },
    /// 截止时间未到
    NotDue {
        phase: EvaluationPhase,
        deadline: DateTime<Utc>,
    },
    /// 当前阶段没有截止时间 (waiting / closure / 未设置)
    NoDeadline { phase: EvaluationPhase },
    /// 阶段为空或不在固定顺序中
    PhaseUnset,
}

impl PhaseDecision {
    pub fn is_advance(&self) -> bool {
        matches!(self, PhaseDecision::Advance { .. })
    }
}

// ==========================================
// PhaseTransitionEngine
// ==========================================
/// 无状态引擎, Repository 操作由调用方处理
pub struct PhaseTransitionEngine;

impl PhaseTransitionEngine {
    pub fn new() -> Self {
        Self
    }

    /// 固定顺序中的下一阶段; closure 返回 None
    pub fn next_phase(phase: EvaluationPhase) -> Option<EvaluationPhase> {
        let idx = PHASE_ORDER.iter().position(|p| *p == phase)?;
        PHASE_ORDER.get(idx + 1).copied()
    }

    /// 判定流转
    ///
    /// # 规则
    /// 1. 阶段为空 → PhaseUnset
    /// 2. 当前阶段无截止时间 → NoDeadline
    /// 3. now >= deadline → Advance (进入 closure 时 completes_period = true)
    /// 4. 否则 → NotDue
    ///
    /// # 说明
    /// - now 可以是任意时区, 按绝对时刻比较
    pub fn evaluate<Tz: TimeZone>(
        &self,
        period: &EvaluationPeriod,
        now: &DateTime<Tz>,
    ) -> PhaseDecision {
        let phase = match period.current_phase {
            Some(p) => p,
            None => return PhaseDecision::PhaseUnset,
        };

        let deadline = match period.deadline_for(phase) {
            Some(d) => d,
            None => return PhaseDecision::NoDeadline { phase },
        };

        if now.with_timezone(&Utc) < deadline {
            return PhaseDecision::NotDue { phase, deadline };
        }

        match Self::next_phase(phase) {
            Some(to) => PhaseDecision::Advance {
                from: phase,
                to,
                completes_period: to.is_terminal(),
            },
            None => PhaseDecision::NoDeadline { phase },
        }
    }
}

impl Default for PhaseTransitionEngine {
    fn default() -> Self {
        Self::new()
    }
}
