// ==========================================
// 加算判定引擎 - Judgment Core 纯函数库
// ==========================================
// 职责: 要件评价、算定可否判定、排他组解决、结果排序
// 红线: 无状态、无副作用、无 I/O 操作
// 红线: 每个排他组最多一个 selected
// ==========================================

use crate::domain::catalog::Requirement;
use crate::domain::facility::FacilitySettings;
use crate::domain::judgment::{JudgmentResult, RequirementStatus};
use crate::domain::staff::StaffForJudgment;
use crate::engine::metrics::RosterMetrics;
use crate::engine::reason::ReasonText;
use std::cmp::Ordering;
use std::collections::BTreeMap;

// ==========================================
// JudgmentCore - 纯函数工具类
// ==========================================
pub struct JudgmentCore;

impl JudgmentCore {
    /// 评价单个要件
    ///
    /// 主要件或任一替代要件满足 → met
    pub fn evaluate_requirement(
        requirement: &Requirement,
        staff: &[StaffForJudgment],
        settings: &FacilitySettings,
    ) -> RequirementStatus {
        let current = RosterMetrics::evaluate(&requirement.metric, staff, settings);
        let alternatives: Vec<RequirementStatus> = requirement
            .alternatives
            .iter()
            .map(|alt| Self::evaluate_requirement(alt, staff, settings))
            .collect();
        let met = requirement.comparison.holds(current, requirement.threshold)
            || alternatives.iter().any(|alt| alt.met);

        RequirementStatus {
            name: requirement.name.clone(),
            metric_kind: requirement.metric.kind_str().to_string(),
            comparison: requirement.comparison,
            current,
            required: requirement.threshold,
            met,
            detail: requirement.detail.clone(),
            gap: RosterMetrics::gap_hint(&requirement.metric, staff, settings),
            alternatives,
        }
    }

    /// 判定算定可否
    ///
    /// # 规则
    /// 1. 要件列表为空 → 算定可
    /// 2. 全部要件满足 → 算定可
    /// 3. 否则 → 算定不可，理由为第一个未满足要件（现值/要求值）
    ///
    /// # 返回
    /// - (bool, String): 算定可否 + 判定理由
    pub fn determine_eligibility(statuses: &[RequirementStatus], locale: &str) -> (bool, String) {
        if statuses.is_empty() {
            return (true, ReasonText::no_requirements(locale));
        }

        match statuses.iter().find(|s| !s.met) {
            Some(first_unmet) => (false, ReasonText::unmet(locale, first_unmet)),
            None => (true, ReasonText::all_met(locale)),
        }
    }

    /// 排他组内的算定优先顺序
    ///
    /// priority 升序 → 数值（单位数/百分比）降序 → code 升序
    pub fn selection_order(a: &JudgmentResult, b: &JudgmentResult) -> Ordering {
        a.priority
            .cmp(&b.priority)
            .then_with(|| b.value().total_cmp(&a.value()))
            .then_with(|| a.addition_code.cmp(&b.addition_code))
    }

    /// 排他组解决
    ///
    /// # 规则
    /// - 无组且算定可 → selected
    /// - 有组 → 算定可成员中按 selection_order 最优者 selected
    /// - 其余算定可成员保持 eligible=true, selected=false，理由指明被优先的加算
    pub fn resolve_exclusive_groups(results: &mut [JudgmentResult], locale: &str) {
        let mut winners: BTreeMap<String, usize> = BTreeMap::new();

        for (idx, result) in results.iter().enumerate() {
            if !result.is_eligible {
                continue;
            }
            if let Some(group) = &result.exclusive_group {
                let better = match winners.get(group) {
                    Some(&current) => {
                        Self::selection_order(result, &results[current]) == Ordering::Less
                    }
                    None => true,
                };
                if better {
                    winners.insert(group.clone(), idx);
                }
            }
        }

        let winner_names: BTreeMap<String, String> = winners
            .iter()
            .map(|(group, &idx)| (group.clone(), results[idx].name.clone()))
            .collect();

        for (idx, result) in results.iter_mut().enumerate() {
            if !result.is_eligible {
                result.is_selected = false;
                continue;
            }
            match &result.exclusive_group {
                None => result.is_selected = true,
                Some(group) => {
                    let selected = winners.get(group) == Some(&idx);
                    result.is_selected = selected;
                    if !selected {
                        if let Some(name) = winner_names.get(group) {
                            result.reason = ReasonText::superseded(locale, name);
                        }
                    }
                }
            }
        }
    }

    /// 结果排序：有组成员按 (group, priority, code)，其后无组按 (priority, code)
    pub fn sort_results(results: &mut [JudgmentResult]) {
        results.sort_by(|a, b| match (&a.exclusive_group, &b.exclusive_group) {
            (Some(ga), Some(gb)) => ga
                .cmp(gb)
                .then_with(|| a.priority.cmp(&b.priority))
                .then_with(|| a.addition_code.cmp(&b.addition_code)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a
                .priority
                .cmp(&b.priority)
                .then_with(|| a.addition_code.cmp(&b.addition_code)),
        });
    }
}
