// ==========================================
// 绩效评价管理系统 - 评价周期领域模型
// ==========================================
// 红线: current_phase 只能沿固定顺序前进
// 红线: status = completed 当且仅当进入 closure 阶段
// 对齐: evaluation_period 表
// ==========================================

use crate::domain::types::{EvaluationPhase, PeriodStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// GradeRange - 等级区间
// ==========================================
// 闭区间 [min_score, max_score]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRange {
    pub grade: String,
    pub min_score: f64,
    pub max_score: f64,
}

impl GradeRange {
    pub fn new(grade: &str, min_score: f64, max_score: f64) -> Self {
        Self {
            grade: grade.to_string(),
            min_score,
            max_score,
        }
    }

    pub fn contains(&self, score: f64) -> bool {
        score >= self.min_score && score <= self.max_score
    }
}

// ==========================================
// EvaluationPeriod - 评价周期
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationPeriod {
    // ===== 主键 =====
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,

    // ===== 状态 (外层/内层) =====
    pub status: PeriodStatus,                    // 周期状态
    pub current_phase: Option<EvaluationPhase>, // 当前阶段 (未开始时为空)

    // ===== 各阶段截止时间 =====
    pub evaluation_setup_deadline: Option<DateTime<Utc>>,
    pub performance_deadline: Option<DateTime<Utc>>,
    pub self_evaluation_deadline: Option<DateTime<Utc>>,
    pub peer_evaluation_deadline: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,

    // ===== 流程开关 =====
    pub criteria_setting_enabled: bool,
    pub self_evaluation_setting_enabled: bool,
    pub final_evaluation_setting_enabled: bool,

    // ===== 评分配置 =====
    pub max_self_evaluation_rate: i32, // 自评分上限 (百分比)
    pub grade_ranges: Vec<GradeRange>, // 等级区间 (有序)

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EvaluationPeriod {
    /// 创建处于 waiting 状态的新评价周期
    ///
    /// # 说明
    /// - 阶段为空, 截止时间为空
    /// - 三个流程开关默认开启, 自评上限默认 120
    pub fn new(id: String, name: String, start_date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            start_date,
            status: PeriodStatus::Waiting,
            current_phase: None,
            evaluation_setup_deadline: None,
            performance_deadline: None,
            self_evaluation_deadline: None,
            peer_evaluation_deadline: None,
            completed_date: None,
            criteria_setting_enabled: true,
            self_evaluation_setting_enabled: true,
            final_evaluation_setting_enabled: true,
            max_self_evaluation_rate: 120,
            grade_ranges: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 查询某阶段对应的截止时间
    ///
    /// # 返回
    /// - waiting / closure 没有截止时间字段, 固定返回 None
    /// - 其他阶段返回对应字段 (可能未设置)
    pub fn deadline_for(&self, phase: EvaluationPhase) -> Option<DateTime<Utc>> {
        match phase {
            EvaluationPhase::Waiting | EvaluationPhase::Closure => None,
            EvaluationPhase::EvaluationSetup => self.evaluation_setup_deadline,
            EvaluationPhase::Performance => self.performance_deadline,
            EvaluationPhase::SelfEvaluation => self.self_evaluation_deadline,
            EvaluationPhase::PeerEvaluation => self.peer_evaluation_deadline,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == PeriodStatus::InProgress
    }

    /// 按本周期的等级区间查找得分对应的等级
    pub fn grade_for_score(&self, score: f64) -> Option<&GradeRange> {
        grade_for_score(&self.grade_ranges, score)
    }
}

/// 返回第一个包含该得分的等级区间
pub fn grade_for_score(ranges: &[GradeRange], score: f64) -> Option<&GradeRange> {
    ranges.iter().find(|r| r.contains(score))
}

/// 校验等级区间
///
/// # 规则
/// - 等级名不能为空
/// - min_score <= max_score
/// - 任意两个区间不能重叠
///
/// # 返回
/// - Ok(()): 合法
/// - Err(reason): 第一条违规原因
pub fn validate_grade_ranges(ranges: &[GradeRange]) -> Result<(), String> {
    for range in ranges {
        if range.grade.trim().is_empty() {
            return Err("等级名称不能为空".to_string());
        }
        if range.min_score > range.max_score {
            return Err(format!(
                "等级 {} 的区间非法: min={} > max={}",
                range.grade, range.min_score, range.max_score
            ));
        }
    }

    let mut sorted: Vec<&GradeRange> = ranges.iter().collect();
    sorted.sort_by(|a, b| a.min_score.total_cmp(&b.min_score));
    for pair in sorted.windows(2) {
        if pair[1].min_score <= pair[0].max_score {
            return Err(format!(
                "等级区间重叠: {} [{}, {}] 与 {} [{}, {}]",
                pair[0].grade,
                pair[0].min_score,
                pair[0].max_score,
                pair[1].grade,
                pair[1].min_score,
                pair[1].max_score
            ));
        }
    }

    Ok(())
}
