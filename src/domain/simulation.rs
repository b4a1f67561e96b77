// ==========================================
// 加算判定引擎 - 收益模拟模型
// ==========================================
// 红线: 计算过程中不取整，仅在显示时取整（round_yen）
// ==========================================

use crate::domain::facility::FacilitySettings;
use crate::domain::judgment::JudgmentResult;
use crate::domain::types::{SuggestionPriority, SuggestionType};
use serde::{Deserialize, Serialize};

/// 显示用取整（円）
pub fn round_yen(value: f64) -> i64 {
    value.round() as i64
}

// ==========================================
// SimulationParams - 模拟参数
// ==========================================
// 说明: 数值类型保留有符号/浮点，以便在 API 边界拒绝非法输入
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub child_count: i64,
    pub average_usage_days: f64,
    pub base_units: f64,
    pub region_grade: i64,
    /// 处遇改善等百分比加算合计（%）
    pub percent_additions: f64,
}

impl SimulationParams {
    /// 以事业所设定为基础（定员 = 利用児童数）
    pub fn from_settings(settings: &FacilitySettings, percent_additions: f64) -> Self {
        Self {
            child_count: i64::from(settings.child_capacity),
            average_usage_days: settings.average_usage_days,
            base_units: settings.base_unit_count,
            region_grade: i64::from(settings.region_grade),
            percent_additions,
        }
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            child_count: 10,
            average_usage_days: 20.0,
            base_units: 897.0,
            region_grade: 6,
            percent_additions: 10.0,
        }
    }
}

// ==========================================
// RevenueBreakdown - 收益构成
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RevenueBreakdown {
    pub base: f64,
    pub system_addition: f64,
    pub percent_addition: f64,
    pub implementation: f64,
}

impl RevenueBreakdown {
    /// 合计（与 SimulationResult.total_revenue 的求和顺序一致）
    pub fn total(&self) -> f64 {
        self.base + self.system_addition + self.percent_addition + self.implementation
    }

    pub fn base_and_system(&self) -> f64 {
        self.base + self.system_addition
    }
}

// ==========================================
// Suggestion - 优化建议
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub suggestion_type: SuggestionType,
    pub addition_code: String,
    pub addition_name: String,
    pub description: String,
    /// 月收益增量（円，未取整）
    pub estimated_impact: f64,
    pub requirements: Vec<String>,
    pub priority: SuggestionPriority,
    /// 距离阈值 ∈ [0, 1]
    pub distance: f64,
}

// ==========================================
// SimulationResult - 模拟结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub total_revenue: f64,
    pub per_child_revenue: f64,
    pub breakdown: RevenueBreakdown,
    pub daily_units: f64,
    pub system_addition_units: f64,
    pub unit_price: f64,
    pub usage_instances: f64,
    pub selected: Vec<JudgmentResult>,
    pub suggestions: Vec<Suggestion>,
}

/// 显示用（円，取整）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundedRevenue {
    pub total_revenue: i64,
    pub per_child_revenue: i64,
    pub base: i64,
    pub system_addition: i64,
    pub percent_addition: i64,
    pub implementation: i64,
}

impl SimulationResult {
    pub fn rounded(&self) -> RoundedRevenue {
        RoundedRevenue {
            total_revenue: round_yen(self.total_revenue),
            per_child_revenue: round_yen(self.per_child_revenue),
            base: round_yen(self.breakdown.base),
            system_addition: round_yen(self.breakdown.system_addition),
            percent_addition: round_yen(self.breakdown.percent_addition),
            implementation: round_yen(self.breakdown.implementation),
        }
    }
}
