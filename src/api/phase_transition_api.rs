// ==========================================
// 绩效评价管理系统 - 阶段流转 API
// ==========================================
// 职责: 自动阶段流转的统一入口 (常驻定时 / 一次性命令共用)
// 说明: 业务时区与操作人从配置读取
// ==========================================

use std::sync::Arc;
use std::time::Duration;

use crate::api::error::{ApiError, ApiResult};
use crate::config::SchedulerConfigReader;
use crate::repository::{ActionLogRepository, EvaluationPeriodRepository};
use crate::scheduler::{AutoPhaseTransitionRunner, BusinessClock, Clock, PhaseTransitionReport};

pub struct PhaseTransitionApi {
    runner: AutoPhaseTransitionRunner,
    config: Arc<dyn SchedulerConfigReader>,
}

impl PhaseTransitionApi {
    pub fn new(
        period_repo: Arc<EvaluationPeriodRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config: Arc<dyn SchedulerConfigReader>,
    ) -> Self {
        let actor = config.get_system_actor().unwrap_or_else(|e| {
            tracing::warn!("读取 system_actor 失败: {}, 使用默认值 system", e);
            "system".to_string()
        });

        Self {
            runner: AutoPhaseTransitionRunner::new(period_repo, Some(action_log_repo), actor),
            config,
        }
    }

    /// 按配置的业务时区构造系统时钟
    ///
    /// 偏移超出范围时记录 warn 并使用默认业务时区 (截止时间按绝对时刻比较, 不受影响)
    pub fn business_clock(&self) -> ApiResult<BusinessClock> {
        let minutes = self
            .config
            .get_business_utc_offset_minutes()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        Ok(BusinessClock::from_offset_minutes(minutes).unwrap_or_else(|| {
            tracing::warn!("business_utc_offset_minutes 超出范围: {}, 使用默认业务时区", minutes);
            BusinessClock::default()
        }))
    }

    /// 常驻模式的检查间隔
    pub fn check_interval(&self) -> ApiResult<Duration> {
        let secs = self
            .config
            .get_phase_check_interval_secs()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        Ok(Duration::from_secs(secs))
    }

    /// 以当前业务时间执行一次自动阶段流转
    ///
    /// # 返回
    /// - Ok(report): transitioned_count 为本次推进的周期数
    pub fn run_auto_phase_transition(&self) -> ApiResult<PhaseTransitionReport> {
        let clock = self.business_clock()?;
        self.run_with_clock(&clock)
    }

    /// 以指定时钟执行 (补跑/测试)
    pub fn run_with_clock(&self, clock: &dyn Clock) -> ApiResult<PhaseTransitionReport> {
        Ok(self.runner.run(clock)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{config_keys, ConfigManager};
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn setup_api() -> (Arc<ConfigManager>, PhaseTransitionApi) {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));

        let config = Arc::new(ConfigManager::from_connection(conn.clone()).unwrap());
        let api = PhaseTransitionApi::new(
            Arc::new(EvaluationPeriodRepository::new(conn.clone())),
            Arc::new(ActionLogRepository::new(conn)),
            config.clone(),
        );
        (config, api)
    }

    #[test]
    fn test_business_clock_uses_configured_offset() {
        let (config, api) = setup_api();
        assert_eq!(api.business_clock().unwrap().offset().local_minus_utc(), 540 * 60);

        config
            .set_global_config_value(config_keys::BUSINESS_UTC_OFFSET_MINUTES, "-300")
            .unwrap();
        assert_eq!(api.business_clock().unwrap().offset().local_minus_utc(), -300 * 60);

        config
            .set_global_config_value(config_keys::BUSINESS_UTC_OFFSET_MINUTES, "2000")
            .unwrap();
        assert_eq!(api.business_clock().unwrap().offset().local_minus_utc(), 540 * 60);
    }

    // 读取方返回越界值时同样回退
    struct OutOfRangeConfig;

    impl SchedulerConfigReader for OutOfRangeConfig {
        fn get_business_utc_offset_minutes(&self) -> Result<i32, Box<dyn std::error::Error>> {
            Ok(1440)
        }

        fn get_phase_check_interval_secs(&self) -> Result<u64, Box<dyn std::error::Error>> {
            Ok(60)
        }

        fn get_system_actor(&self) -> Result<String, Box<dyn std::error::Error>> {
            Ok("system".to_string())
        }
    }

    #[test]
    fn test_out_of_range_reader_offset_uses_default_clock() {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        let api = PhaseTransitionApi::new(
            Arc::new(EvaluationPeriodRepository::new(conn.clone())),
            Arc::new(ActionLogRepository::new(conn)),
            Arc::new(OutOfRangeConfig),
        );

        assert_eq!(api.business_clock().unwrap().offset().local_minus_utc(), 540 * 60);
        assert_eq!(api.run_auto_phase_transition().unwrap().transitioned_count, 0);
    }

    #[test]
    fn test_run_on_empty_database() {
        let (_config, api) = setup_api();
        let report = api.run_auto_phase_transition().unwrap();
        assert_eq!(report.transitioned_count, 0);
        assert_eq!(api.check_interval().unwrap(), Duration::from_secs(3600));
    }
}
