use serde::{Deserialize, Serialize};

use crate::domain::facility::DEFAULT_STANDARD_WEEKLY_HOURS;
use crate::i18n::DEFAULT_LOCALE;

/// 引擎配置（显式传入各阶段，不做模块级缓存）
///
/// 覆写来源：config_kv（scope_id='global'），见 `ConfigManager::load_engine_config`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 常勤的周所定劳动时间（事业所设定非法时使用）
    #[serde(default = "default_standard_weekly_hours")]
    pub standard_weekly_hours: f64,

    /// 常勤兼務的常勤换算值
    #[serde(default = "default_concurrent_fte_ratio")]
    pub concurrent_fte_ratio: f64,

    /// 地域区分不在单价表中时的单价（円/单位）
    #[serde(default = "default_fallback_unit_price")]
    pub fallback_unit_price: f64,

    /// 判定理由 / 建议文案的语言（"ja" / "en"）
    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default)]
    pub advisor: AdvisorConfig,
}

/// 优化建议的优先级阈值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// 月收益增量 ≥ 该值视为高影响（円）
    #[serde(default = "default_high_impact_yen")]
    pub high_impact_yen: f64,

    /// 月收益增量 ≥ 该值视为中影响（円）
    #[serde(default = "default_medium_impact_yen")]
    pub medium_impact_yen: f64,

    /// 距离 ≤ 该值视为"接近达标"
    #[serde(default = "default_near_distance")]
    pub near_distance: f64,

    /// 距离 ≤ 该值视为"中等距离"
    #[serde(default = "default_mid_distance")]
    pub mid_distance: f64,
}

fn default_standard_weekly_hours() -> f64 {
    DEFAULT_STANDARD_WEEKLY_HOURS
}

fn default_concurrent_fte_ratio() -> f64 {
    0.75
}

fn default_fallback_unit_price() -> f64 {
    10.0
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_high_impact_yen() -> f64 {
    100_000.0
}

fn default_medium_impact_yen() -> f64 {
    30_000.0
}

fn default_near_distance() -> f64 {
    0.25
}

fn default_mid_distance() -> f64 {
    0.5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            standard_weekly_hours: default_standard_weekly_hours(),
            concurrent_fte_ratio: default_concurrent_fte_ratio(),
            fallback_unit_price: default_fallback_unit_price(),
            locale: default_locale(),
            advisor: AdvisorConfig::default(),
        }
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            high_impact_yen: default_high_impact_yen(),
            medium_impact_yen: default_medium_impact_yen(),
            near_distance: default_near_distance(),
            mid_distance: default_mid_distance(),
        }
    }
}
