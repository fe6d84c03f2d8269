// ==========================================
// 绩效评价管理系统 - 核心库
// ==========================================
// 职责: 员工评价状态派生 + 评价周期阶段自动流转
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 调度层 - 时钟与自动阶段流转
pub mod scheduler;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    ApprovalStatus, CriteriaSetupStatus, EvaluationPhase, PeriodStatus, ProgressStatus,
};

// 领域实体
pub use domain::{
    ActionLog, ActionType, EvaluationPeriod, FinalEvaluation, GradeRange, PeerEvaluation,
    StepApproval, WbsSelfEvaluation,
};

// 引擎
pub use engine::{
    EmployeeEvaluationStatus, EvaluationStatusCore, PhaseDecision, PhaseTransitionEngine,
    StatusAggregator,
};

// 调度
pub use scheduler::{
    AutoPhaseTransitionRunner, BusinessClock, Clock, FixedClock, PhaseTransitionReport,
};

// API
pub use api::{DashboardApi, PhaseTransitionApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "绩效评价管理系统";
