// ==========================================
// 加算判定引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::engine_config::EngineConfig;
use crate::i18n::SUPPORTED_LOCALES;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

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

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式，按 key 排序）
    ///
    /// # 用途
    /// - 与判定报告一同输出，保证结果可复现
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

    /// 读取 f64 配置项；缺失或格式错误时回落默认值
    fn get_f64_or(&self, key: &str, default: f64) -> Result<f64, Box<dyn Error>> {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => {
                tracing::warn!(config_key = key, raw_value = %raw, "配置值格式错误，使用默认值");
                Ok(default)
            }
        }
    }

    /// 加载引擎配置（默认值 + config_kv 覆写）
    pub fn load_engine_config(&self) -> Result<EngineConfig, Box<dyn Error>> {
        let defaults = EngineConfig::default();
        let mut config = defaults.clone();

        config.standard_weekly_hours =
            self.get_f64_or(config_keys::STANDARD_WEEKLY_HOURS, defaults.standard_weekly_hours)?;
        config.concurrent_fte_ratio =
            self.get_f64_or(config_keys::CONCURRENT_FTE_RATIO, defaults.concurrent_fte_ratio)?;
        config.fallback_unit_price =
            self.get_f64_or(config_keys::FALLBACK_UNIT_PRICE, defaults.fallback_unit_price)?;

        config.advisor.high_impact_yen =
            self.get_f64_or(config_keys::ADVISOR_HIGH_IMPACT_YEN, defaults.advisor.high_impact_yen)?;
        config.advisor.medium_impact_yen = self.get_f64_or(
            config_keys::ADVISOR_MEDIUM_IMPACT_YEN,
            defaults.advisor.medium_impact_yen,
        )?;
        config.advisor.near_distance =
            self.get_f64_or(config_keys::ADVISOR_NEAR_DISTANCE, defaults.advisor.near_distance)?;
        config.advisor.mid_distance =
            self.get_f64_or(config_keys::ADVISOR_MID_DISTANCE, defaults.advisor.mid_distance)?;

        if let Some(raw) = self.get_config_value(config_keys::LOCALE)? {
            let locale = raw.trim();
            if SUPPORTED_LOCALES.contains(&locale) {
                config.locale = locale.to_string();
            } else {
                tracing::warn!(config_key = config_keys::LOCALE, raw_value = %raw, "不支持的语言，使用默认值");
            }
        }

        Ok(config)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 常勤换算
    pub const STANDARD_WEEKLY_HOURS: &str = "standard_weekly_hours";
    pub const CONCURRENT_FTE_RATIO: &str = "concurrent_fte_ratio";

    // 单价
    pub const FALLBACK_UNIT_PRICE: &str = "fallback_unit_price";

    // 文案语言
    pub const LOCALE: &str = "locale";

    // 优化建议
    pub const ADVISOR_HIGH_IMPACT_YEN: &str = "advisor_high_impact_yen";
    pub const ADVISOR_MEDIUM_IMPACT_YEN: &str = "advisor_medium_impact_yen";
    pub const ADVISOR_NEAR_DISTANCE: &str = "advisor_near_distance";
    pub const ADVISOR_MID_DISTANCE: &str = "advisor_mid_distance";
}
