// ==========================================
// 绩效评价管理系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口, 供宿主进程 (main / bin) 调用
// ==========================================

pub mod dashboard_api;
pub mod error;
pub mod phase_transition_api;

// 重导出核心类型
pub use dashboard_api::{DashboardApi, EmployeeStatusResponse};
pub use error::{ApiError, ApiResult};
pub use phase_transition_api::PhaseTransitionApi;
