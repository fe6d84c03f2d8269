// ==========================================
// 绩效评价管理系统 - 操作日志领域模型
// ==========================================
// 红线: 评价周期的阶段/状态写入必须记录
// 对齐: action_log 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,         // 日志ID
    pub period_id: Option<String>, // 关联评价周期 (系统操作可为None)
    pub action_type: String,       // 操作类型 (存储为字符串)
    pub action_ts: NaiveDateTime,  // 操作时间戳 (UTC)
    pub actor: String,             // 操作人

    pub payload_json: Option<JsonValue>, // 操作参数 (JSON)
    pub detail: Option<String>,          // 详细描述
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    AutoPhaseTransition, // 截止时间到达后的自动阶段流转
    PeriodCompleted,     // 进入 closure, 周期完成
}

impl ActionType {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::AutoPhaseTransition => "AutoPhaseTransition",
            ActionType::PeriodCompleted => "PeriodCompleted",
        }
    }

    /// 从字符串解析
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AutoPhaseTransition" => Some(ActionType::AutoPhaseTransition),
            "PeriodCompleted" => Some(ActionType::PeriodCompleted),
            _ => None,
        }
    }
}

impl ActionLog {
    /// 创建新的操作日志
    ///
    /// # 参数
    /// - `action_id`: 日志ID (通常使用UUID)
    /// - `period_id`: 关联评价周期ID (可选)
    /// - `action_type`: 操作类型
    /// - `actor`: 操作人
    /// - `action_ts`: 操作时间 (UTC)
    pub fn new(
        action_id: String,
        period_id: Option<String>,
        action_type: ActionType,
        actor: String,
        action_ts: NaiveDateTime,
    ) -> Self {
        Self {
            action_id,
            period_id,
            action_type: action_type.as_str().to_string(),
            action_ts,
            actor,
            payload_json: None,
            detail: None,
        }
    }

    /// 设置操作负载 (转换为JSON)
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Self {
        self.payload_json = serde_json::to_value(payload).ok();
        self
    }

    pub fn with_detail(mut self, detail: String) -> Self {
        self.detail = Some(detail);
        self
    }
}
