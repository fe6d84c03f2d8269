// ==========================================
// 绩效评价管理系统 - 调度配置读取 Trait
// ==========================================
// 职责: 定义阶段流转调度所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use std::error::Error;

// ==========================================
// SchedulerConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait SchedulerConfigReader: Send + Sync {
    /// 业务时区相对 UTC 的偏移（分钟）
    ///
    /// # 默认值
    /// - 540 (UTC+09:00)
    fn get_business_utc_offset_minutes(&self) -> Result<i32, Box<dyn Error>>;

    /// 常驻模式下两次阶段检查的间隔（秒）
    ///
    /// # 默认值
    /// - 3600
    fn get_phase_check_interval_secs(&self) -> Result<u64, Box<dyn Error>>;

    /// 审计日志中的系统操作人
    ///
    /// # 默认值
    /// - "system"
    fn get_system_actor(&self) -> Result<String, Box<dyn Error>>;
}
