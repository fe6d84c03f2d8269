// ==========================================
// 绩效评价管理系统 - 调度层
// ==========================================
// 职责: 时钟抽象 + 自动阶段流转执行器
// 说明: 定时触发由 main.rs / bin 负责, 本层只执行单次流转
// ==========================================

pub mod clock;
pub mod phase_scheduler;

pub use clock::{BusinessClock, Clock, FixedClock, DEFAULT_BUSINESS_UTC_OFFSET_MINUTES};
pub use phase_scheduler::{
    AutoPhaseTransitionRunner, PeriodFailure, PeriodPhaseStore, PhaseTransitionReport,
};
