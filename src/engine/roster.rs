// ==========================================
// 加算判定引擎 - Roster Normalizer
// ==========================================
// 职责: 职员主数据 → 判定用职员（常勤换算 + 资格识别）
// 红线: 无状态、无副作用、无 I/O 操作
// 红线: 退职者排除（不是置 0），未知资格不匹配
// ==========================================

use crate::config::EngineConfig;
use crate::domain::facility::FacilitySettings;
use crate::domain::judgment::DataAnomaly;
use crate::domain::staff::{QualificationCode, StaffForJudgment, StaffMember};
use crate::domain::types::EmploymentStyle;
use std::collections::BTreeSet;
use tracing::warn;

/// 标准化后的名册
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedRoster {
    pub staff: Vec<StaffForJudgment>,
    pub anomalies: Vec<DataAnomaly>,
}

// ==========================================
// RosterNormalizer - 纯函数工具类
// ==========================================
pub struct RosterNormalizer;

impl RosterNormalizer {
    /// 计算常勤换算值 (FTE)
    ///
    /// # 规则
    /// - 常勤専従 → 1.0
    /// - 常勤兼務 → concurrent_ratio
    /// - 非常勤 → weekly_hours / standard_hours，截断到 [0, 1]
    /// - standard_hours ≤ 0（或非有限值）→ 使用 fallback_standard_hours
    pub fn calculate_fte(
        style: EmploymentStyle,
        weekly_hours: f64,
        standard_hours: f64,
        fallback_standard_hours: f64,
        concurrent_ratio: f64,
    ) -> f64 {
        match style {
            EmploymentStyle::FulltimeDedicated => 1.0,
            EmploymentStyle::FulltimeConcurrent => concurrent_ratio.clamp(0.0, 1.0),
            EmploymentStyle::PartTime => {
                let standard = if standard_hours.is_finite() && standard_hours > 0.0 {
                    standard_hours
                } else {
                    fallback_standard_hours
                };
                if !weekly_hours.is_finite() || standard <= 0.0 {
                    return 0.0;
                }
                (weekly_hours / standard).clamp(0.0, 1.0)
            }
        }
    }

    /// 识别资格代码
    ///
    /// # 返回
    /// - (识别出的资格集合, 无法识别的原始代码)
    pub fn recognize_qualifications(
        raw_codes: &BTreeSet<String>,
    ) -> (BTreeSet<QualificationCode>, Vec<String>) {
        let mut recognized = BTreeSet::new();
        let mut unknown = Vec::new();

        for raw in raw_codes {
            if raw.trim().is_empty() {
                continue;
            }
            match QualificationCode::from_raw(raw) {
                Some(code) => {
                    recognized.insert(code);
                }
                None => unknown.push(raw.clone()),
            }
        }

        (recognized, unknown)
    }

    /// 名册标准化
    ///
    /// # 参数
    /// - staff: 职员主数据
    /// - settings: 事业所设定（提供常勤周所定时间）
    /// - config: 引擎配置
    pub fn normalize(
        staff: &[StaffMember],
        settings: &FacilitySettings,
        config: &EngineConfig,
    ) -> NormalizedRoster {
        let mut roster = NormalizedRoster::default();

        for member in staff.iter().filter(|m| m.is_active) {
            let (qualifications, unknown) = Self::recognize_qualifications(&member.qualifications);
            for raw_code in unknown {
                warn!(staff_id = %member.id, raw_code = %raw_code, "未知资格代码，按不匹配处理");
                roster.anomalies.push(DataAnomaly::UnknownQualification {
                    staff_id: member.id.clone(),
                    raw_code,
                });
            }

            let fte = Self::calculate_fte(
                member.employment_style,
                member.weekly_hours,
                settings.standard_weekly_hours,
                config.standard_weekly_hours,
                config.concurrent_fte_ratio,
            );

            roster.staff.push(StaffForJudgment {
                id: member.id.clone(),
                name: member.name.clone(),
                employment_style: member.employment_style,
                personnel_category: member.personnel_category,
                is_manager: member.is_manager,
                is_service_manager: member.is_service_manager,
                weekly_hours: member.weekly_hours,
                qualifications,
                years_of_experience: member.years_of_experience.max(0.0),
                fte,
            });
        }

        roster
    }
}
