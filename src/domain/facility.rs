// ==========================================
// 加算判定引擎 - 事业所设定
// ==========================================

use crate::domain::types::ServiceType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 常勤的周所定劳动时间（默认 40h）
pub const DEFAULT_STANDARD_WEEKLY_HOURS: f64 = 40.0;

fn default_standard_weekly_hours() -> f64 {
    DEFAULT_STANDARD_WEEKLY_HOURS
}

// ==========================================
// FacilitySettings - 事业所设定（外部持久化）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilitySettings {
    pub facility_id: String,
    pub child_capacity: u32,  // 定員
    pub region_grade: u8,     // 地域区分（1〜8）
    pub service_type: ServiceType,
    pub average_usage_days: f64, // 平均利用日数（月）
    pub base_unit_count: f64,    // 基本报酬单位

    #[serde(default = "default_standard_weekly_hours")]
    pub standard_weekly_hours: f64,

    /// 已届出（正在算定）的加算代码
    #[serde(default)]
    pub current_additions: BTreeSet<String>,
}

impl Default for FacilitySettings {
    fn default() -> Self {
        Self {
            facility_id: String::new(),
            child_capacity: 10,
            region_grade: 6,
            service_type: ServiceType::AfterSchoolDayService,
            average_usage_days: 20.0,
            base_unit_count: Self::base_units_for_capacity(10),
            standard_weekly_hours: DEFAULT_STANDARD_WEEKLY_HOURS,
            current_additions: BTreeSet::new(),
        }
    }
}

impl FacilitySettings {
    /// 按定员区间推定基本报酬单位（≤10 / 11〜15 / 16 以上）
    pub fn base_units_for_capacity(capacity: u32) -> f64 {
        match capacity {
            0..=10 => 897.0,
            11..=15 => 765.0,
            _ => 700.0,
        }
    }
}
