// ==========================================
// 绩效评价管理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{DashboardApi, PhaseTransitionApi};
use crate::config::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::engine::StatusRepositories;
use crate::repository::{ActionLogRepository, EvaluationPeriodRepository};

/// 应用状态
///
/// 所有仓储共享同一数据库连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 看板API (员工评价状态)
    pub dashboard_api: Arc<DashboardApi>,

    /// 阶段流转API
    pub phase_transition_api: Arc<PhaseTransitionApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 评价周期仓储
    pub period_repo: Arc<EvaluationPeriodRepository>,

    /// 操作日志仓储（用于审计追踪）
    pub action_log_repo: Arc<ActionLogRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表（幂等）
    /// 2. 初始化所有Repository
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let period_repo = Arc::new(EvaluationPeriodRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));
        let status_repos = Arc::new(StatusRepositories::from_connection(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let dashboard_api = Arc::new(DashboardApi::new(
            period_repo.clone(),
            status_repos,
            action_log_repo.clone(),
        ));
        let phase_transition_api = Arc::new(PhaseTransitionApi::new(
            period_repo.clone(),
            action_log_repo.clone(),
            config_manager.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            dashboard_api,
            phase_transition_api,
            config_manager,
            period_repo,
            action_log_repo,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 PERFORMANCE_EVAL_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("PERFORMANCE_EVAL_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./performance_eval.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("performance-eval");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("performance_eval.db");
        }
    }

    path.to_string_lossy().to_string()
}
