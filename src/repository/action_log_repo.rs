// ==========================================
// 绩效评价管理系统 - 操作日志数据仓储
// ==========================================
// 依据: action_log 表
// 红线: 评价周期的阶段/状态写入必须记录
// ==========================================

mod core;
mod queries;


pub use core::ActionLogRepository;
