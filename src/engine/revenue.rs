// ==========================================
// 加算判定引擎 - Revenue Calculator
// ==========================================
// 职责: 判定结果 + 模拟参数 → 月收益构成
// 红线: 纯函数；计算中不取整
// 红线: 构成项之和 = total_revenue（取整前）
// ==========================================

use crate::config::EngineConfig;
use crate::domain::judgment::JudgmentResult;
use crate::domain::simulation::{RevenueBreakdown, SimulationParams, SimulationResult};
use crate::domain::types::{AdditionCategory, RepresentationKind};
use tracing::debug;

/// 地域区分 → 1 单位单价（円）
pub const REGION_UNIT_RATES: [(i64, f64); 8] = [
    (1, 11.12),
    (2, 10.88),
    (3, 10.70),
    (4, 10.52),
    (5, 10.28),
    (6, 10.10),
    (7, 10.00),
    (8, 10.00),
];

// ==========================================
// RevenueCalculator - 纯函数工具类
// ==========================================
pub struct RevenueCalculator;

impl RevenueCalculator {
    /// 地域区分单价（表外等级使用 fallback）
    pub fn unit_price(region_grade: i64, fallback: f64) -> f64 {
        REGION_UNIT_RATES
            .iter()
            .find(|(grade, _)| *grade == region_grade)
            .map_or(fallback, |(_, price)| *price)
    }

    /// 单位数加算的月算定日数（有月上限时取 min）
    pub fn billable_days(result: &JudgmentResult, average_usage_days: f64) -> f64 {
        match result.max_times_per_month {
            Some(cap) => average_usage_days.min(f64::from(cap)),
            None => average_usage_days,
        }
    }

    /// 收益模拟
    ///
    /// # 规则
    /// 1. system_addition_units = Σ 算定中单位数加算的单位数
    /// 2. daily_units = base_units + system_addition_units
    /// 3. usage_instances = child_count × average_usage_days
    /// 4. base = base_units × usage_instances × unit_price
    /// 5. system_addition = Σ units × child_count × 算定日数 × unit_price
    /// 6. percent_addition = (base + system_addition) × (percent_additions + Σ 非实施百分比加算) / 100
    /// 7. implementation = Σ (base + system_addition) × 实施百分比加算 / 100
    /// 8. total = base + system_addition + percent_addition + implementation
    ///
    /// 调用方负责参数校验（child_count ≥ 1 等）
    pub fn simulate(
        judgments: &[JudgmentResult],
        params: &SimulationParams,
        config: &EngineConfig,
    ) -> SimulationResult {
        let unit_price = Self::unit_price(params.region_grade, config.fallback_unit_price);
        let children = params.child_count as f64;
        let days = params.average_usage_days;
        let usage_instances = children * days;

        let selected: Vec<JudgmentResult> = judgments
            .iter()
            .filter(|j| j.counts_toward_revenue())
            .cloned()
            .collect();

        let mut system_addition_units = 0.0;
        let mut system_addition = 0.0;
        let mut percent_rate = params.percent_additions;
        let mut implementation_rates = Vec::new();

        for judgment in &selected {
            match (judgment.representation, judgment.category) {
                (RepresentationKind::Units, _) => {
                    let billable = Self::billable_days(judgment, days);
                    system_addition_units += judgment.units;
                    system_addition += judgment.units * children * billable * unit_price;
                }
                (RepresentationKind::Percentage, AdditionCategory::Implementation) => {
                    implementation_rates.push(judgment.percentage_rate);
                }
                (RepresentationKind::Percentage, AdditionCategory::System) => {
                    percent_rate += judgment.percentage_rate;
                }
            }
        }

        let base = params.base_units * usage_instances * unit_price;
        let base_and_system = base + system_addition;
        let percent_addition = base_and_system * percent_rate / 100.0;
        let implementation: f64 = implementation_rates
            .iter()
            .map(|rate| base_and_system * rate / 100.0)
            .sum();

        let breakdown = RevenueBreakdown {
            base,
            system_addition,
            percent_addition,
            implementation,
        };
        let total_revenue = breakdown.total();
        let per_child_revenue = if children > 0.0 {
            total_revenue / children
        } else {
            0.0
        };

        debug!(
            unit_price,
            usage_instances,
            system_addition_units,
            total_revenue,
            "收益模拟完成"
        );

        SimulationResult {
            total_revenue,
            per_child_revenue,
            breakdown,
            daily_units: params.base_units + system_addition_units,
            system_addition_units,
            unit_price,
            usage_instances,
            selected,
            suggestions: Vec::new(),
        }
    }
}
