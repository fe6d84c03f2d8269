// One-shot auto phase transition, for external cron.
//
// Usage:
//   run_phase_transition [db_path]
//
// Prints the JSON report to stdout; exits non-zero if any period failed.

use anyhow::Context;
use performance_eval::app::{get_default_db_path, AppState};
use performance_eval::logging;

fn main() -> anyhow::Result<()> {
    logging::init();

    let db_path = std::env::args()
        .nth(1)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(get_default_db_path);

    let state = AppState::new(db_path)
        .map_err(anyhow::Error::msg)
        .context("无法初始化AppState")?;

    let report = state
        .phase_transition_api
        .run_auto_phase_transition()
        .context("自动阶段流转失败")?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.has_failures() {
        anyhow::bail!("{} 个评价周期流转失败", report.failures.len());
    }
    Ok(())
}
