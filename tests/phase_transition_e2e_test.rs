// ==========================================
// 自动阶段流转端到端测试
// ==========================================
// 测试范围: AppState → PhaseTransitionApi → Runner → SQLite
// ==========================================

mod test_helpers;

use chrono::{Duration, FixedOffset, TimeZone, Utc};
use performance_eval::app::AppState;
use performance_eval::domain::{ActionType, EvaluationPhase, PeriodStatus};
use performance_eval::scheduler::FixedClock;
use performance_eval::config::config_keys;
use test_helpers::{base_now, create_test_db, open_shared, PeriodBuilder};

fn setup() -> (tempfile::NamedTempFile, AppState) {
    performance_eval::logging::init_test();
    let (temp, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path).unwrap();
    (temp, state)
}

#[test]
fn test_deadline_passed_yesterday_advances_phase() {
    let (_temp, state) = setup();
    PeriodBuilder::new("p1")
        .in_phase(EvaluationPhase::Performance)
        .all_deadlines(Duration::days(-1))
        .insert(&state.period_repo);

    let report = state
        .phase_transition_api
        .run_with_clock(&FixedClock::from_utc(base_now()))
        .unwrap();

    assert_eq!(report.transitioned_count, 1);
    let period = state.period_repo.find_by_id("p1").unwrap().unwrap();
    assert_eq!(period.current_phase, Some(EvaluationPhase::SelfEvaluation));
    assert_eq!(period.status, PeriodStatus::InProgress);
    assert_eq!(period.updated_at, base_now());
    assert!(period.completed_date.is_none());
}

#[test]
fn test_deadline_tomorrow_leaves_period_untouched() {
    let (_temp, state) = setup();
    let inserted = PeriodBuilder::new("p1")
        .in_phase(EvaluationPhase::Performance)
        .all_deadlines(Duration::days(1))
        .insert(&state.period_repo);

    let report = state
        .phase_transition_api
        .run_with_clock(&FixedClock::from_utc(base_now()))
        .unwrap();

    assert_eq!(report.transitioned_count, 0);
    assert_eq!(report.skipped_count, 1);
    let period = state.period_repo.find_by_id("p1").unwrap().unwrap();
    assert_eq!(period.current_phase, Some(EvaluationPhase::Performance));
    assert_eq!(period.updated_at, inserted.updated_at);
    assert!(state.action_log_repo.find_by_period_id("p1").unwrap().is_empty());
}

#[test]
fn test_peer_evaluation_deadline_closes_and_completes_period() {
    let (_temp, state) = setup();
    PeriodBuilder::new("p1")
        .in_phase(EvaluationPhase::PeerEvaluation)
        .all_deadlines(Duration::hours(-2))
        .insert(&state.period_repo);

    let report = state
        .phase_transition_api
        .run_with_clock(&FixedClock::from_utc(base_now()))
        .unwrap();

    assert_eq!(report.transitioned_count, 1);
    let period = state.period_repo.find_by_id("p1").unwrap().unwrap();
    assert_eq!(period.current_phase, Some(EvaluationPhase::Closure));
    assert_eq!(period.status, PeriodStatus::Completed);
    assert_eq!(period.completed_date, Some(base_now()));

    // 已完成周期不再被扫描
    let again = state
        .phase_transition_api
        .run_with_clock(&FixedClock::from_utc(base_now() + Duration::days(1)))
        .unwrap();
    assert_eq!(again.transitioned_count, 0);
    assert_eq!(again.skipped_count, 0);
}

#[test]
fn test_second_run_with_same_clock_is_noop() {
    let (_temp, state) = setup();
    // 仅 performance 截止时间已过
    PeriodBuilder::new("p1")
        .in_phase(EvaluationPhase::Performance)
        .all_deadlines(Duration::days(10))
        .performance_deadline(Some(base_now() - Duration::minutes(5)))
        .insert(&state.period_repo);

    let clock = FixedClock::from_utc(base_now());
    let first = state.phase_transition_api.run_with_clock(&clock).unwrap();
    let second = state.phase_transition_api.run_with_clock(&clock).unwrap();

    assert_eq!(first.transitioned_count, 1);
    assert_eq!(second.transitioned_count, 0);
    assert_eq!(second.skipped_count, 1);
    let period = state.period_repo.find_by_id("p1").unwrap().unwrap();
    assert_eq!(period.current_phase, Some(EvaluationPhase::SelfEvaluation));
}

#[test]
fn test_only_in_progress_periods_are_considered() {
    let (_temp, state) = setup();
    PeriodBuilder::new("waiting")
        .status(PeriodStatus::Waiting)
        .all_deadlines(Duration::days(-1))
        .insert(&state.period_repo);
    PeriodBuilder::new("deleted")
        .in_phase(EvaluationPhase::Performance)
        .all_deadlines(Duration::days(-1))
        .insert(&state.period_repo);
    state.period_repo.soft_delete("deleted", base_now()).unwrap();
    PeriodBuilder::new("unset_phase")
        .status(PeriodStatus::InProgress)
        .all_deadlines(Duration::days(-1))
        .insert(&state.period_repo);
    PeriodBuilder::new("active")
        .in_phase(EvaluationPhase::EvaluationSetup)
        .all_deadlines(Duration::days(-1))
        .insert(&state.period_repo);

    let report = state
        .phase_transition_api
        .run_with_clock(&FixedClock::from_utc(base_now()))
        .unwrap();

    assert_eq!(report.transitioned_count, 1);
    // unset_phase 被扫描但跳过
    assert_eq!(report.skipped_count, 1);
    let waiting = state.period_repo.find_by_id("waiting").unwrap().unwrap();
    assert_eq!(waiting.status, PeriodStatus::Waiting);
    assert!(waiting.current_phase.is_none());
    let active = state.period_repo.find_by_id("active").unwrap().unwrap();
    assert_eq!(active.current_phase, Some(EvaluationPhase::Performance));
}

#[test]
fn test_deadline_compared_in_business_timezone() {
    let (_temp, state) = setup();
    let jst = FixedOffset::east_opt(9 * 3600).unwrap();
    // 截止: 2025-06-30 23:59:59 (UTC+09:00)
    let deadline = jst
        .with_ymd_and_hms(2025, 6, 30, 23, 59, 59)
        .unwrap()
        .with_timezone(&Utc);
    PeriodBuilder::new("p1")
        .in_phase(EvaluationPhase::Performance)
        .performance_deadline(Some(deadline))
        .insert(&state.period_repo);

    // 业务时间 23:59:58 未到
    let before = FixedClock::new(jst.with_ymd_and_hms(2025, 6, 30, 23, 59, 58).unwrap());
    let report = state.phase_transition_api.run_with_clock(&before).unwrap();
    assert_eq!(report.transitioned_count, 0);

    // UTC 15:00 即业务时间 07-01 00:00
    let after = FixedClock::from_utc(Utc.with_ymd_and_hms(2025, 6, 30, 15, 0, 0).unwrap());
    let report = state.phase_transition_api.run_with_clock(&after).unwrap();
    assert_eq!(report.transitioned_count, 1);
}

#[test]
fn test_transition_writes_action_log() {
    let (_temp, state) = setup();
    PeriodBuilder::new("p1")
        .in_phase(EvaluationPhase::SelfEvaluation)
        .all_deadlines(Duration::days(-1))
        .insert(&state.period_repo);
    PeriodBuilder::new("p2")
        .in_phase(EvaluationPhase::PeerEvaluation)
        .all_deadlines(Duration::days(-1))
        .insert(&state.period_repo);

    state
        .phase_transition_api
        .run_with_clock(&FixedClock::from_utc(base_now()))
        .unwrap();

    let logs = state.dashboard_api.list_period_action_logs("p1").unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action_type, ActionType::AutoPhaseTransition.as_str());
    assert_eq!(logs[0].actor, "system");
    assert_eq!(logs[0].action_ts, base_now().naive_utc());
    let payload = logs[0].payload_json.as_ref().unwrap();
    assert_eq!(payload["from"], "self-evaluation");
    assert_eq!(payload["to"], "peer-evaluation");

    // 进入 closure 额外记录周期完成
    let logs = state.dashboard_api.list_period_action_logs("p2").unwrap();
    let types: Vec<&str> = logs.iter().map(|l| l.action_type.as_str()).collect();
    assert!(types.contains(&ActionType::AutoPhaseTransition.as_str()));
    assert!(types.contains(&ActionType::PeriodCompleted.as_str()));
}

#[test]
fn test_report_wire_format() {
    let (_temp, state) = setup();
    PeriodBuilder::new("p1")
        .in_phase(EvaluationPhase::Performance)
        .all_deadlines(Duration::days(-1))
        .insert(&state.period_repo);

    let report = state
        .phase_transition_api
        .run_with_clock(&FixedClock::from_utc(base_now()))
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["transitionedCount"], 1);
}

#[test]
fn test_corrupt_period_row_does_not_block_others() {
    let (_temp, state) = setup();
    PeriodBuilder::new("healthy")
        .in_phase(EvaluationPhase::Performance)
        .all_deadlines(Duration::days(-1))
        .insert(&state.period_repo);
    PeriodBuilder::new("corrupt")
        .in_phase(EvaluationPhase::Performance)
        .all_deadlines(Duration::days(-1))
        .insert(&state.period_repo);

    // 外部写入了仅含日期的截止时间
    open_shared(&state.db_path)
        .lock()
        .unwrap()
        .execute(
            "UPDATE evaluation_period SET peer_evaluation_deadline = '2025-06-30' \
             WHERE id = 'corrupt'",
            [],
        )
        .unwrap();

    let report = state
        .phase_transition_api
        .run_with_clock(&FixedClock::from_utc(base_now()))
        .unwrap();

    assert_eq!(report.transitioned_count, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].period_id, "corrupt");
    assert!(report.has_failures());

    let healthy = state.period_repo.find_by_id("healthy").unwrap().unwrap();
    assert_eq!(healthy.current_phase, Some(EvaluationPhase::SelfEvaluation));
}

#[test]
fn test_out_of_range_offset_falls_back_to_default_clock() {
    let (_temp, state) = setup();
    PeriodBuilder::new("p1")
        .in_phase(EvaluationPhase::Performance)
        .all_deadlines(Duration::days(-1))
        .insert(&state.period_repo);
    state
        .config_manager
        .set_global_config_value(config_keys::BUSINESS_UTC_OFFSET_MINUTES, "1440")
        .unwrap();

    // 截止时间早于真实当前时间, 使用系统时钟即可推进
    let report = state.phase_transition_api.run_auto_phase_transition().unwrap();

    assert_eq!(report.transitioned_count, 1);
    let period = state.period_repo.find_by_id("p1").unwrap().unwrap();
    assert_eq!(period.current_phase, Some(EvaluationPhase::SelfEvaluation));
}
