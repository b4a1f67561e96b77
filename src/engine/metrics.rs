// ==========================================
// 加算判定引擎 - 要件指标计算
// ==========================================
// 职责: 按固定形状的指标（人数 / FTE / 经验 / 比例 / 定员）计算现值
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================

use crate::domain::catalog::{Metric, StaffFilter};
use crate::domain::facility::FacilitySettings;
use crate::domain::judgment::GapHint;
use crate::domain::staff::StaffForJudgment;

/// 筛选条件的放宽方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relaxation {
    None,
    Category,      // 人员区分变更
    Qualification, // 资格取得
}

impl Relaxation {
    fn matches(&self, filter: &StaffFilter, staff: &StaffForJudgment) -> bool {
        match self {
            Relaxation::None => filter.matches(staff),
            Relaxation::Category => filter.matches_ignoring_category(staff),
            Relaxation::Qualification => filter.matches_ignoring_qualification(staff),
        }
    }
}

// ==========================================
// RosterMetrics - 纯函数工具类
// ==========================================
pub struct RosterMetrics;

impl RosterMetrics {
    /// 计算指标现值
    pub fn evaluate(metric: &Metric, staff: &[StaffForJudgment], settings: &FacilitySettings) -> f64 {
        Self::evaluate_relaxed(metric, staff, settings, Relaxation::None)
    }

    /// 计算缺口提示
    ///
    /// # 规则
    /// - value_if_upgraded: 不问人员区分时的指标值
    /// - value_if_trained: 不问资格时的指标值
    /// - 比例指标只放宽分子，分母保持不变
    /// - 定员指标不可通过人员措施改善（actionable=false）
    pub fn gap_hint(metric: &Metric, staff: &[StaffForJudgment], settings: &FacilitySettings) -> GapHint {
        match metric {
            Metric::ChildCapacity => {
                let current = f64::from(settings.child_capacity);
                GapHint {
                    actionable: false,
                    value_if_upgraded: current,
                    value_if_trained: current,
                }
            }
            _ => GapHint {
                actionable: true,
                value_if_upgraded: Self::evaluate_relaxed(metric, staff, settings, Relaxation::Category),
                value_if_trained: Self::evaluate_relaxed(
                    metric,
                    staff,
                    settings,
                    Relaxation::Qualification,
                ),
            },
        }
    }

    fn evaluate_relaxed(
        metric: &Metric,
        staff: &[StaffForJudgment],
        settings: &FacilitySettings,
        relax: Relaxation,
    ) -> f64 {
        match metric {
            Metric::Headcount { filter } => {
                staff.iter().filter(|s| relax.matches(filter, s)).count() as f64
            }
            Metric::TotalFte { filter } => staff
                .iter()
                .filter(|s| relax.matches(filter, s))
                .map(|s| s.fte)
                .sum(),
            Metric::MaxExperienceYears { filter } => staff
                .iter()
                .filter(|s| relax.matches(filter, s))
                .map(|s| s.years_of_experience)
                .fold(0.0, f64::max),
            Metric::HeadcountRatio {
                numerator,
                denominator,
            } => {
                let base: Vec<&StaffForJudgment> =
                    staff.iter().filter(|s| denominator.matches(s)).collect();
                if base.is_empty() {
                    return 0.0;
                }
                let hits = base.iter().filter(|s| relax.matches(numerator, s)).count();
                hits as f64 * 100.0 / base.len() as f64
            }
            Metric::FteRatio {
                numerator,
                denominator,
            } => {
                let base: Vec<&StaffForJudgment> =
                    staff.iter().filter(|s| denominator.matches(s)).collect();
                let total: f64 = base.iter().map(|s| s.fte).sum();
                if total <= 0.0 {
                    return 0.0;
                }
                let hits: f64 = base
                    .iter()
                    .filter(|s| relax.matches(numerator, s))
                    .map(|s| s.fte)
                    .sum();
                hits * 100.0 / total
            }
            Metric::ChildCapacity => f64::from(settings.child_capacity),
        }
    }
}
