// ==========================================
// 绩效评价管理系统 - 常驻进程入口
// ==========================================
// 职责: 按配置间隔触发自动阶段流转
// 说明: 定时由本入口负责, 核心库只提供单次执行
// ==========================================

use anyhow::Context;
use performance_eval::app::{get_default_db_path, AppState};
use performance_eval::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // LOG_FORMAT=json 时输出结构化日志
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => logging::init_json(),
        _ => logging::init(),
    }

    tracing::info!("==================================================");
    tracing::info!("{} v{}", performance_eval::APP_NAME, performance_eval::VERSION);
    tracing::info!("==================================================");

    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path)
        .map_err(anyhow::Error::msg)
        .context("无法初始化AppState")?;

    let api = state.phase_transition_api.clone();
    let period = api.check_interval().context("读取检查间隔失败")?;
    tracing::info!("阶段检查间隔: {}s", period.as_secs());

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let api = api.clone();
                // rusqlite 为阻塞调用
                let outcome =
                    tokio::task::spawn_blocking(move || api.run_auto_phase_transition()).await;
                match outcome {
                    Ok(Ok(report)) => {
                        if report.has_failures() {
                            tracing::warn!("本轮有 {} 个评价周期流转失败", report.failures.len());
                        }
                    }
                    Ok(Err(e)) => tracing::error!("自动阶段流转失败: {}", e),
                    Err(e) => tracing::error!("自动阶段流转任务异常退出: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("收到退出信号, 停止调度");
                break;
            }
        }
    }

    Ok(())
}
