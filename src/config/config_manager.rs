// ==========================================
// 绩效评价管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 说明: 缺失键使用默认值; 无法解析的值记录 warn 后使用默认值
// ==========================================

use crate::config::scheduler_config_trait::SchedulerConfigReader;
use crate::db::open_sqlite_connection;
use crate::scheduler::clock::{BusinessClock, DEFAULT_BUSINESS_UTC_OFFSET_MINUTES};
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

const DEFAULT_PHASE_CHECK_INTERVAL_SECS: u64 = 3600;
const DEFAULT_SYSTEM_ACTOR: &str = "system";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取并解析配置值，缺失或无法解析时返回默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr + Copy + std::fmt::Display,
    {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match raw.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                tracing::warn!("配置值无法解析: key={}, value={}, 使用默认值 {}", key, raw, default);
                Ok(default)
            }
        }
    }

    /// 获取所有 global 配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

// ==========================================
// SchedulerConfigReader 实现
// ==========================================
impl SchedulerConfigReader for ConfigManager {
    fn get_business_utc_offset_minutes(&self) -> Result<i32, Box<dyn Error>> {
        let minutes = self.get_parsed_or_default(
            config_keys::BUSINESS_UTC_OFFSET_MINUTES,
            DEFAULT_BUSINESS_UTC_OFFSET_MINUTES,
        )?;
        if BusinessClock::from_offset_minutes(minutes).is_none() {
            tracing::warn!(
                "business_utc_offset_minutes 超出范围: {}, 使用默认值 {}",
                minutes,
                DEFAULT_BUSINESS_UTC_OFFSET_MINUTES
            );
            return Ok(DEFAULT_BUSINESS_UTC_OFFSET_MINUTES);
        }
        Ok(minutes)
    }

    fn get_phase_check_interval_secs(&self) -> Result<u64, Box<dyn Error>> {
        let secs = self.get_parsed_or_default(
            config_keys::PHASE_CHECK_INTERVAL_SECS,
            DEFAULT_PHASE_CHECK_INTERVAL_SECS,
        )?;
        if secs == 0 {
            tracing::warn!(
                "phase_check_interval_secs 不能为 0, 使用默认值 {}",
                DEFAULT_PHASE_CHECK_INTERVAL_SECS
            );
            return Ok(DEFAULT_PHASE_CHECK_INTERVAL_SECS);
        }
        Ok(secs)
    }

    fn get_system_actor(&self) -> Result<String, Box<dyn Error>> {
        let actor = self
            .get_config_value(config_keys::SYSTEM_ACTOR)?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Ok(actor.unwrap_or_else(|| DEFAULT_SYSTEM_ACTOR.to_string()))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 业务时区
    pub const BUSINESS_UTC_OFFSET_MINUTES: &str = "business_utc_offset_minutes";

    // 阶段流转调度
    pub const PHASE_CHECK_INTERVAL_SECS: &str = "phase_check_interval_secs";
    pub const SYSTEM_ACTOR: &str = "system_actor";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_missing() {
        let config = setup();
        assert_eq!(config.get_business_utc_offset_minutes().unwrap(), 540);
        assert_eq!(config.get_phase_check_interval_secs().unwrap(), 3600);
        assert_eq!(config.get_system_actor().unwrap(), "system");
    }

    #[test]
    fn test_overrides_are_read_back() {
        let config = setup();
        config
            .set_global_config_value(config_keys::BUSINESS_UTC_OFFSET_MINUTES, "480")
            .unwrap();
        config
            .set_global_config_value(config_keys::PHASE_CHECK_INTERVAL_SECS, "600")
            .unwrap();
        config
            .set_global_config_value(config_keys::SYSTEM_ACTOR, "hr-batch")
            .unwrap();

        assert_eq!(config.get_business_utc_offset_minutes().unwrap(), 480);
        assert_eq!(config.get_phase_check_interval_secs().unwrap(), 600);
        assert_eq!(config.get_system_actor().unwrap(), "hr-batch");

        // 覆盖写入
        config
            .set_global_config_value(config_keys::PHASE_CHECK_INTERVAL_SECS, "900")
            .unwrap();
        assert_eq!(config.get_phase_check_interval_secs().unwrap(), 900);
    }

    #[test]
    fn test_unparsable_values_fall_back_to_default() {
        let config = setup();
        config
            .set_global_config_value(config_keys::BUSINESS_UTC_OFFSET_MINUTES, "UTC+9")
            .unwrap();
        config
            .set_global_config_value(config_keys::PHASE_CHECK_INTERVAL_SECS, "0")
            .unwrap();
        config
            .set_global_config_value(config_keys::SYSTEM_ACTOR, "   ")
            .unwrap();

        assert_eq!(config.get_business_utc_offset_minutes().unwrap(), 540);
        assert_eq!(config.get_phase_check_interval_secs().unwrap(), 3600);
        assert_eq!(config.get_system_actor().unwrap(), "system");
    }

    #[test]
    fn test_out_of_range_offset_falls_back_to_default() {
        let config = setup();
        config
            .set_global_config_value(config_keys::BUSINESS_UTC_OFFSET_MINUTES, "1440")
            .unwrap();
        assert_eq!(config.get_business_utc_offset_minutes().unwrap(), 540);

        config
            .set_global_config_value(config_keys::BUSINESS_UTC_OFFSET_MINUTES, "-1439")
            .unwrap();
        assert_eq!(config.get_business_utc_offset_minutes().unwrap(), -1439);
    }

    #[test]
    fn test_config_snapshot() {
        let config = setup();
        config.set_global_config_value("b_key", "2").unwrap();
        config.set_global_config_value("a_key", "1").unwrap();

        let snapshot = config.get_config_snapshot().unwrap();
        assert_eq!(snapshot, r#"{"a_key":"1","b_key":"2"}"#);
    }
}
