// ==========================================
// 加算判定引擎 - Optimization Advisor
// ==========================================
// 职责: 对算定不可的加算提出人员措施（采用 / 资格取得 / 区分变更）
// 职责: 对届出区分低于可算定区分的排他组提出届出变更
// 影响额: 将该加算翻转为 eligible+selected 后重新模拟的收益差
// 红线: 纯函数；不修改输入判定结果
// ==========================================

use crate::config::{AdvisorConfig, EngineConfig};
use crate::domain::judgment::{JudgmentResult, RequirementStatus};
use crate::domain::simulation::{SimulationParams, Suggestion};
use crate::domain::types::{SuggestionPriority, SuggestionType};
use crate::engine::judgment_core::JudgmentCore;
use crate::engine::reason::ReasonText;
use crate::engine::revenue::RevenueCalculator;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

// ==========================================
// OptimizationAdvisor - 纯函数工具类
// ==========================================
pub struct OptimizationAdvisor;

impl OptimizationAdvisor {
    /// 单个未满足要件的改善措施
    ///
    /// # 规则
    /// 1. 变更人员区分即可满足 → Upgrade
    /// 2. 取得资格即可满足 → Training
    /// 3. 否则 → Hire
    pub fn classify_requirement(status: &RequirementStatus) -> SuggestionType {
        if status.comparison.holds(status.gap.value_if_upgraded, status.required) {
            SuggestionType::Upgrade
        } else if status.comparison.holds(status.gap.value_if_trained, status.required) {
            SuggestionType::Training
        } else {
            SuggestionType::Hire
        }
    }

    /// 建议优先级
    ///
    /// # 规则
    /// - High: 影响额 ≥ high_impact 且距离 ≤ mid_distance，或 距离 ≤ near_distance 且影响额 ≥ medium_impact
    /// - Medium: 影响额 ≥ medium_impact 或 距离 ≤ near_distance
    /// - Low: 其他
    pub fn priority_tier(distance: f64, impact: f64, config: &AdvisorConfig) -> SuggestionPriority {
        let near = distance <= config.near_distance;
        let mid = distance <= config.mid_distance;

        if (impact >= config.high_impact_yen && mid) || (near && impact >= config.medium_impact_yen) {
            SuggestionPriority::High
        } else if impact >= config.medium_impact_yen || near {
            SuggestionPriority::Medium
        } else {
            SuggestionPriority::Low
        }
    }

    /// 反事实模拟：目标加算算定 + 同组其他成员不算定
    pub fn counterfactual(judgments: &[JudgmentResult], target_code: &str) -> Vec<JudgmentResult> {
        let target_group = judgments
            .iter()
            .find(|j| j.addition_code == target_code)
            .and_then(|j| j.exclusive_group.clone());

        judgments
            .iter()
            .cloned()
            .map(|mut j| {
                if j.addition_code == target_code {
                    j.is_eligible = true;
                    j.is_selected = true;
                } else if target_group.is_some() && j.exclusive_group == target_group {
                    j.is_selected = false;
                }
                j
            })
            .collect()
    }

    /// 生成优化建议
    ///
    /// # 规则
    /// - 人员措施: 仅对算定不可的加算；含不可通过人员措施改善的要件（定员）→ 不提建议
    /// - 排他组: 优先于现算定成员的未达成员中，按算定优先顺序取第一个可提建议者
    /// - 届出变更: 组内算定成员未届出、届出的是其他成员 → Switch
    /// - 影响额 ≤ 0 → 丢弃
    /// - 排序: 优先级 → 影响额降序 → code
    pub fn advise(
        judgments: &[JudgmentResult],
        params: &SimulationParams,
        config: &EngineConfig,
    ) -> Vec<Suggestion> {
        let baseline = RevenueCalculator::simulate(judgments, params, config).total_revenue;

        let mut suggestions = Vec::new();
        let mut groups: BTreeMap<&str, Vec<&JudgmentResult>> = BTreeMap::new();
        for judgment in judgments {
            match judgment.exclusive_group.as_deref() {
                Some(group) => groups.entry(group).or_default().push(judgment),
                None if !judgment.is_eligible => {
                    suggestions.extend(Self::staffing_suggestion(judgment, judgments, params, config, baseline));
                }
                None => {}
            }
        }

        for members in groups.values() {
            suggestions.extend(Self::group_suggestion(members, judgments, params, config, baseline));
            suggestions.extend(Self::switch_suggestion(members, judgments, params, config, baseline));
        }

        suggestions.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| b.estimated_impact.total_cmp(&a.estimated_impact))
                .then_with(|| a.addition_code.cmp(&b.addition_code))
        });
        suggestions
    }

    /// 要件（含替代要件）中最容易达成的选项：措施最弱 → 距离最近
    fn easiest_option(status: &RequirementStatus) -> Option<(&RequirementStatus, SuggestionType)> {
        std::iter::once(status)
            .chain(status.alternatives.iter())
            .filter(|option| option.gap.actionable)
            .map(|option| (option, Self::classify_requirement(option)))
            .min_by(|(a, action_a), (b, action_b)| {
                action_a
                    .cmp(action_b)
                    .then_with(|| a.distance().total_cmp(&b.distance()))
            })
    }

    /// 单个算定不可加算的人员措施建议
    fn staffing_suggestion(
        judgment: &JudgmentResult,
        judgments: &[JudgmentResult],
        params: &SimulationParams,
        config: &EngineConfig,
        baseline: f64,
    ) -> Option<Suggestion> {
        let mut options = Vec::new();
        for status in judgment.unmet_requirements() {
            match Self::easiest_option(status) {
                Some(option) => options.push(option),
                None => {
                    debug!(addition_code = %judgment.addition_code, requirement = %status.name, "无可执行的人员措施，跳过");
                    return None;
                }
            }
        }

        // 最强措施（Hire > Training > Upgrade），说明文以首个对应要件为准
        let suggestion_type = options.iter().map(|(_, action)| *action).max()?;
        let lead = options
            .iter()
            .find(|(_, action)| *action == suggestion_type)
            .map(|(status, _)| *status)?;

        let flipped = Self::counterfactual(judgments, &judgment.addition_code);
        let impact = RevenueCalculator::simulate(&flipped, params, config).total_revenue - baseline;
        if impact <= 0.0 {
            debug!(addition_code = %judgment.addition_code, impact, "影响额非正，丢弃");
            return None;
        }

        let distance = options.iter().map(|(s, _)| s.distance()).fold(0.0, f64::max);
        let locale = config.locale.as_str();

        Some(Suggestion {
            suggestion_type,
            addition_code: judgment.addition_code.clone(),
            addition_name: judgment.name.clone(),
            description: ReasonText::suggestion(
                locale,
                suggestion_type,
                &judgment.name,
                &lead.name,
                lead.shortfall(),
            ),
            estimated_impact: impact,
            requirements: options
                .iter()
                .map(|(s, _)| ReasonText::requirement_line(locale, s))
                .collect(),
            priority: Self::priority_tier(distance, impact, &config.advisor),
            distance,
        })
    }

    /// 排他组的人员措施建议
    ///
    /// 优先于现算定成员的未达成员，按算定优先顺序逐个尝试，取第一个可提建议者
    fn group_suggestion(
        members: &[&JudgmentResult],
        judgments: &[JudgmentResult],
        params: &SimulationParams,
        config: &EngineConfig,
        baseline: f64,
    ) -> Option<Suggestion> {
        let selected = members.iter().copied().find(|j| j.counts_toward_revenue());

        let mut candidates: Vec<&JudgmentResult> = members
            .iter()
            .copied()
            .filter(|j| !j.is_eligible)
            .filter(|j| {
                selected.map_or(true, |current| {
                    JudgmentCore::selection_order(j, current) == Ordering::Less
                })
            })
            .collect();
        candidates.sort_by(|a, b| JudgmentCore::selection_order(a, b));

        candidates
            .into_iter()
            .find_map(|j| Self::staffing_suggestion(j, judgments, params, config, baseline))
    }

    /// 届出变更建议
    ///
    /// 影响额 = 现状（算定成员计入）− 按当前届出计算（届出成员算定不可时组内不计入）
    fn switch_suggestion(
        members: &[&JudgmentResult],
        judgments: &[JudgmentResult],
        params: &SimulationParams,
        config: &EngineConfig,
        baseline: f64,
    ) -> Option<Suggestion> {
        let selected = members.iter().copied().find(|j| j.counts_toward_revenue())?;
        if selected.is_current {
            return None;
        }
        let claimed = members.iter().copied().find(|j| j.is_current)?;

        let as_claimed = Self::as_claimed(judgments, claimed);
        let impact = baseline - RevenueCalculator::simulate(&as_claimed, params, config).total_revenue;
        if impact <= 0.0 {
            debug!(addition_code = %selected.addition_code, claimed = %claimed.addition_code, impact, "届出变更无增收，丢弃");
            return None;
        }

        let locale = config.locale.as_str();
        Some(Suggestion {
            suggestion_type: SuggestionType::Switch,
            addition_code: selected.addition_code.clone(),
            addition_name: selected.name.clone(),
            description: ReasonText::suggestion(
                locale,
                SuggestionType::Switch,
                &selected.name,
                &claimed.name,
                0.0,
            ),
            estimated_impact: impact,
            requirements: selected
                .requirements
                .iter()
                .map(|s| ReasonText::requirement_line(locale, s))
                .collect(),
            priority: Self::priority_tier(0.0, impact, &config.advisor),
            distance: 0.0,
        })
    }

    /// 按当前届出的组内算定状况
    fn as_claimed(judgments: &[JudgmentResult], claimed: &JudgmentResult) -> Vec<JudgmentResult> {
        judgments
            .iter()
            .cloned()
            .map(|mut j| {
                if j.exclusive_group == claimed.exclusive_group {
                    j.is_selected = j.is_eligible && j.addition_code == claimed.addition_code;
                }
                j
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::judgment::GapHint;
    use crate::domain::types::{AdditionCategory, Comparison, RepresentationKind};

    fn params() -> SimulationParams {
        SimulationParams {
            child_count: 10,
            average_usage_days: 20.0,
            base_units: 700.0,
            region_grade: 1,
            percent_additions: 0.0,
        }
    }

    fn status(current: f64, required: f64, upgraded: f64, trained: f64) -> RequirementStatus {
        RequirementStatus {
            name: "qualified_staff_count".to_string(),
            metric_kind: "headcount".to_string(),
            comparison: Comparison::AtLeast,
            current,
            required,
            met: Comparison::AtLeast.holds(current, required),
            detail: None,
            gap: GapHint {
                actionable: true,
                value_if_upgraded: upgraded,
                value_if_trained: trained,
            },
            alternatives: vec![],
        }
    }

    fn judgment(
        code: &str,
        group: Option<&str>,
        priority: i32,
        units: f64,
        requirements: Vec<RequirementStatus>,
    ) -> JudgmentResult {
        let is_eligible = requirements.iter().all(|r| r.met);
        JudgmentResult {
            addition_code: code.to_string(),
            name: code.to_string(),
            short_name: code.to_string(),
            category: AdditionCategory::System,
            exclusive_group: group.map(|g| g.to_string()),
            priority,
            version_number: 1,
            revision_id: None,
            representation: RepresentationKind::Units,
            units,
            percentage_rate: 0.0,
            max_times_per_day: None,
            max_times_per_month: None,
            is_eligible,
            is_selected: is_eligible,
            is_current: false,
            requirements,
            reason: String::new(),
            anomalies: vec![],
        }
    }

    #[test]
    fn test_classify_requirement() {
        assert_eq!(
            OptimizationAdvisor::classify_requirement(&status(1.0, 2.0, 2.0, 3.0)),
            SuggestionType::Upgrade
        );
        assert_eq!(
            OptimizationAdvisor::classify_requirement(&status(1.0, 2.0, 1.0, 2.0)),
            SuggestionType::Training
        );
        assert_eq!(
            OptimizationAdvisor::classify_requirement(&status(1.0, 2.0, 1.0, 1.0)),
            SuggestionType::Hire
        );
    }

    #[test]
    fn test_priority_tier() {
        let config = AdvisorConfig::default();
        assert_eq!(
            OptimizationAdvisor::priority_tier(0.5, 200_000.0, &config),
            SuggestionPriority::High
        );
        assert_eq!(
            OptimizationAdvisor::priority_tier(0.2, 40_000.0, &config),
            SuggestionPriority::High
        );
        assert_eq!(
            OptimizationAdvisor::priority_tier(1.0, 40_000.0, &config),
            SuggestionPriority::Medium
        );
        assert_eq!(
            OptimizationAdvisor::priority_tier(1.0, 10_000.0, &config),
            SuggestionPriority::Low
        );
    }

    #[test]
    fn test_single_hire_suggestion_with_impact() {
        let judgments = vec![judgment(
            "qualified",
            None,
            0,
            50.0,
            vec![status(1.0, 2.0, 1.0, 1.0)],
        )];
        let suggestions = OptimizationAdvisor::advise(&judgments, &params(), &EngineConfig::default());

        assert_eq!(suggestions.len(), 1);
        let s = &suggestions[0];
        assert_eq!(s.suggestion_type, SuggestionType::Hire);
        // 50 单位 × 200 回 × 11.12 円
        assert!((s.estimated_impact - 111_200.0).abs() < 1e-6);
        assert_eq!(s.distance, 0.5);
        assert_eq!(s.priority, SuggestionPriority::High);
        // 输入不被修改
        assert!(!judgments[0].is_eligible);
    }

    #[test]
    fn test_group_only_outranking_member_is_suggested() {
        let judgments = vec![
            judgment("g1", Some("g"), 1, 187.0, vec![status(0.0, 1.0, 0.0, 0.0)]),
            judgment("g2", Some("g"), 2, 152.0, vec![status(0.0, 1.0, 1.0, 0.0)]),
            judgment("g3", Some("g"), 3, 123.0, vec![status(1.0, 1.0, 1.0, 1.0)]),
            judgment("g4", Some("g"), 4, 107.0, vec![status(0.0, 1.0, 1.0, 1.0)]),
        ];
        let suggestions = OptimizationAdvisor::advise(&judgments, &params(), &EngineConfig::default());
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].addition_code, "g1");
        // 增量 = 187 − 123 单位
        assert!((suggestions[0].estimated_impact - 64.0 * 200.0 * 11.12).abs() < 1e-6);
    }

    #[test]
    fn test_capacity_requirement_suppresses_suggestion() {
        let mut capacity = status(10.0, 20.0, 10.0, 10.0);
        capacity.gap.actionable = false;
        let judgments = vec![judgment("cap", None, 0, 50.0, vec![capacity])];
        let suggestions = OptimizationAdvisor::advise(&judgments, &params(), &EngineConfig::default());
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_group_falls_through_to_reachable_member() {
        // g1 受定员限制无法通过人员措施改善，g2 可通过采用达成
        let mut capacity = status(10.0, 100.0, 10.0, 10.0);
        capacity.gap.actionable = false;
        let judgments = vec![
            judgment("g1", Some("g"), 1, 187.0, vec![capacity]),
            judgment("g2", Some("g"), 2, 152.0, vec![status(0.0, 1.0, 0.0, 0.0)]),
        ];
        let suggestions = OptimizationAdvisor::advise(&judgments, &params(), &EngineConfig::default());

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].addition_code, "g2");
        assert_eq!(suggestions[0].suggestion_type, SuggestionType::Hire);
        assert!((suggestions[0].estimated_impact - 152.0 * 200.0 * 11.12).abs() < 1e-6);
    }

    #[test]
    fn test_alternative_with_lighter_action_is_preferred() {
        let mut requirement = status(0.0, 75.0, 0.0, 0.0);
        requirement.alternatives = vec![status(20.0, 30.0, 40.0, 40.0)];
        let judgments = vec![judgment("wp", None, 0, 6.0, vec![requirement])];
        let suggestions = OptimizationAdvisor::advise(&judgments, &params(), &EngineConfig::default());

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].suggestion_type, SuggestionType::Upgrade);
        assert_eq!(suggestions[0].requirements, vec!["qualified_staff_count（現在 20 / 必要 30）".to_string()]);
        assert!((suggestions[0].distance - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_switch_when_claiming_lower_member() {
        let mut judgments = vec![
            judgment("g1", Some("g"), 1, 187.0, vec![status(1.0, 1.0, 1.0, 1.0)]),
            judgment("g3", Some("g"), 3, 123.0, vec![status(1.0, 1.0, 1.0, 1.0)]),
        ];
        judgments[1].is_selected = false;
        judgments[1].is_current = true;

        let suggestions = OptimizationAdvisor::advise(&judgments, &params(), &EngineConfig::default());
        assert_eq!(suggestions.len(), 1);
        let s = &suggestions[0];
        assert_eq!(s.suggestion_type, SuggestionType::Switch);
        assert_eq!(s.addition_code, "g1");
        assert_eq!(s.distance, 0.0);
        assert!((s.estimated_impact - 64.0 * 200.0 * 11.12).abs() < 1e-6);
        assert_eq!(s.priority, SuggestionPriority::High);
        assert!(s.description.contains("g3"));

        // 已届出算定成员 → 无建议
        judgments[0].is_current = true;
        judgments[1].is_current = false;
        assert!(OptimizationAdvisor::advise(&judgments, &params(), &EngineConfig::default()).is_empty());
    }

    #[test]
    fn test_switch_from_ineligible_claim_counts_full_units() {
        let mut judgments = vec![
            judgment("g1", Some("g"), 1, 187.0, vec![status(1.0, 1.0, 1.0, 1.0)]),
            judgment("g2", Some("g"), 2, 152.0, vec![status(0.0, 1.0, 0.0, 0.0)]),
        ];
        judgments[1].is_current = true;

        let suggestions = OptimizationAdvisor::advise(&judgments, &params(), &EngineConfig::default());
        let switch: Vec<&Suggestion> = suggestions
            .iter()
            .filter(|s| s.suggestion_type == SuggestionType::Switch)
            .collect();
        assert_eq!(switch.len(), 1);
        assert!((switch[0].estimated_impact - 187.0 * 200.0 * 11.12).abs() < 1e-6);
        // g2 劣后于算定成员 → 无人员措施建议
        assert_eq!(suggestions.len(), 1);
    }

    #[test]
    fn test_zero_impact_is_dropped() {
        let judgments = vec![judgment("zero", None, 0, 0.0, vec![status(0.0, 1.0, 0.0, 0.0)])];
        let suggestions = OptimizationAdvisor::advise(&judgments, &params(), &EngineConfig::default());
        assert!(suggestions.is_empty());
    }
}
