// ==========================================
// 加算判定引擎 - Eligibility Judgment Engine
// ==========================================
// 职责: 名册标准化 → 版本解析 → 要件评价 → 排他组解决
// 输入: 职员主数据 + 事业所设定 + 加算目录 + 参照日
// 输出: JudgmentReport（不持久化）
// 红线: 不抛错，数据异常只记录
// ==========================================

use crate::config::EngineConfig;
use crate::domain::catalog::{AdditionCatalog, Requirement};
use crate::domain::facility::FacilitySettings;
use crate::domain::judgment::{DataAnomaly, JudgmentReport, JudgmentResult, RequirementStatus};
use crate::domain::staff::{StaffForJudgment, StaffMember};
use crate::domain::types::RepresentationKind;
use crate::engine::judgment_core::JudgmentCore;
use crate::engine::roster::RosterNormalizer;
use crate::engine::rule_resolver::TemporalRuleResolver;
use chrono::NaiveDate;
use tracing::{debug, instrument, warn};

// ==========================================
// EligibilityEngine - 加算判定引擎
// ==========================================
pub struct EligibilityEngine {
    config: EngineConfig,
}

impl EligibilityEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 判定全部加算
    ///
    /// # 参数
    /// - staff: 职员主数据（含退职者，标准化时排除）
    /// - settings: 事业所设定
    /// - catalog: 加算目录（调用前已解析完毕）
    /// - reference_date: 参照日
    #[instrument(skip(self, staff, settings, catalog), fields(facility_id = %settings.facility_id, staff_count = staff.len()))]
    pub fn judge(
        &self,
        staff: &[StaffMember],
        settings: &FacilitySettings,
        catalog: &AdditionCatalog,
        reference_date: NaiveDate,
    ) -> JudgmentReport {
        let roster = RosterNormalizer::normalize(staff, settings, &self.config);
        let mut anomalies = roster.anomalies;

        let mut results = Vec::new();
        for definition in &catalog.definitions {
            if !definition.is_active || !definition.applies_to(settings.service_type) {
                debug!(addition_code = %definition.code, "加算不适用，跳过");
                continue;
            }

            let versions = catalog.versions_of(&definition.code);
            let resolution = TemporalRuleResolver::resolve(&definition.code, &versions, reference_date);
            if let Some(anomaly) = &resolution.anomaly {
                anomalies.push(anomaly.clone());
            }

            let version = match resolution.version {
                Some(v) => v,
                None => {
                    debug!(addition_code = %definition.code, %reference_date, "参照日无有效版本，排除");
                    continue;
                }
            };

            let mut inline_anomalies: Vec<DataAnomaly> = resolution.anomaly.into_iter().collect();

            let value = match version.effective_value() {
                Ok(value) => value,
                Err(detail) => {
                    warn!(addition_code = %definition.code, version = version.version_number, %detail, "加算设定不备，按 0 处理");
                    let gap = DataAnomaly::ConfigurationGap {
                        addition_code: definition.code.clone(),
                        version_number: version.version_number,
                        detail,
                    };
                    anomalies.push(gap.clone());
                    inline_anomalies.push(gap);
                    0.0
                }
            };
            let (units, percentage_rate) = match version.representation {
                RepresentationKind::Units => (value, 0.0),
                RepresentationKind::Percentage => (0.0, value),
            };

            let requirements = evaluate_all(&version.requirements, &roster.staff, settings);
            let (is_eligible, reason) = JudgmentCore::determine_eligibility(&requirements, &self.config.locale);

            debug!(
                addition_code = %definition.code,
                version = version.version_number,
                is_eligible,
                reason = %reason,
                "加算判定"
            );

            results.push(JudgmentResult {
                addition_code: definition.code.clone(),
                name: definition.name.clone(),
                short_name: definition.short_name.clone(),
                category: definition.category,
                exclusive_group: definition.exclusive_group.clone(),
                priority: definition.priority,
                version_number: version.version_number,
                revision_id: version.revision_id.clone(),
                representation: version.representation,
                units,
                percentage_rate,
                max_times_per_day: version.max_times_per_day,
                max_times_per_month: version.max_times_per_month,
                is_eligible,
                is_selected: false,
                is_current: settings.current_additions.contains(&definition.code),
                requirements,
                reason,
                anomalies: inline_anomalies,
            });
        }

        JudgmentCore::resolve_exclusive_groups(&mut results, &self.config.locale);
        JudgmentCore::sort_results(&mut results);

        JudgmentReport {
            reference_date,
            results,
            anomalies,
        }
    }
}

fn evaluate_all(
    requirements: &[Requirement],
    staff: &[StaffForJudgment],
    settings: &FacilitySettings,
) -> Vec<RequirementStatus> {
    requirements
        .iter()
        .map(|requirement| JudgmentCore::evaluate_requirement(requirement, staff, settings))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{AdditionDefinition, AdditionVersion, Metric, StaffFilter};
    use crate::domain::staff::QualificationSet;
    use crate::domain::types::{AdditionCategory, EmploymentStyle, PersonnelCategory, ServiceType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn settings() -> FacilitySettings {
        FacilitySettings {
            facility_id: "F001".to_string(),
            child_capacity: 10,
            region_grade: 1,
            service_type: ServiceType::AfterSchoolDayService,
            average_usage_days: 20.0,
            base_unit_count: 700.0,
            standard_weekly_hours: 40.0,
            current_additions: ["A".to_string()].into_iter().collect(),
        }
    }

    fn member(id: &str, quals: &[&str]) -> StaffMember {
        StaffMember {
            id: id.to_string(),
            name: id.to_string(),
            employment_style: EmploymentStyle::FulltimeDedicated,
            weekly_hours: 40.0,
            qualifications: quals.iter().map(|q| q.to_string()).collect(),
            years_of_experience: 5.0,
            personnel_category: PersonnelCategory::Addition,
            is_active: true,
            is_manager: false,
            is_service_manager: false,
        }
    }

    fn definition(code: &str, group: Option<&str>, priority: i32) -> AdditionDefinition {
        AdditionDefinition {
            code: code.to_string(),
            name: code.to_string(),
            short_name: code.to_string(),
            category: AdditionCategory::System,
            exclusive_group: group.map(|g| g.to_string()),
            priority,
            applicable_services: vec![],
            is_active: true,
        }
    }

    fn version(code: &str, units: Option<f64>, required: f64, from: NaiveDate) -> AdditionVersion {
        AdditionVersion {
            version_id: format!("{}-v1", code),
            addition_code: code.to_string(),
            version_number: 1,
            representation: RepresentationKind::Units,
            units,
            percentage_rate: None,
            requirements: vec![Requirement {
                name: "qualified_staff_count".to_string(),
                metric: Metric::Headcount {
                    filter: StaffFilter {
                        qualification: Some(QualificationSet::ChildInstructorEquivalent),
                        ..Default::default()
                    },
                },
                comparison: Default::default(),
                threshold: required,
                detail: None,
                alternatives: vec![],
            }],
            max_times_per_day: None,
            max_times_per_month: None,
            effective_from: from,
            effective_to: None,
            revision_id: Some("R2024".to_string()),
            notes: None,
        }
    }

    #[test]
    fn test_judge_reports_eligibility_and_groups() {
        let catalog = AdditionCatalog {
            law_revisions: vec![],
            definitions: vec![
                definition("A", Some("g"), 1),
                definition("B", Some("g"), 2),
                definition("C", None, 0),
            ],
            versions: vec![
                version("A", Some(187.0), 1.0, date(2024, 4, 1)),
                version("B", Some(152.0), 1.0, date(2024, 4, 1)),
                version("C", Some(123.0), 3.0, date(2024, 4, 1)),
            ],
        };
        let staff = vec![member("S1", &["保育士"]), member("S2", &["OT"])];

        let engine = EligibilityEngine::new(EngineConfig::default());
        let report = engine.judge(&staff, &settings(), &catalog, date(2024, 6, 1));

        let codes: Vec<&str> = report.results.iter().map(|r| r.addition_code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B", "C"]);

        let a = report.find("A").unwrap();
        assert!(a.is_eligible && a.is_selected && a.is_current);
        let b = report.find("B").unwrap();
        assert!(b.is_eligible && !b.is_selected);
        let c = report.find("C").unwrap();
        assert!(!c.is_eligible);
        assert!(c.reason.contains("2/3"));
        assert_eq!(c.requirements[0].current, 2.0);
    }

    #[test]
    fn test_judge_excludes_future_versions_and_flags_gaps() {
        let catalog = AdditionCatalog {
            law_revisions: vec![],
            definitions: vec![definition("FUTURE", None, 0), definition("GAP", None, 0)],
            versions: vec![
                version("FUTURE", Some(100.0), 0.0, date(2030, 4, 1)),
                version("GAP", None, 0.0, date(2024, 4, 1)),
            ],
        };
        let engine = EligibilityEngine::new(EngineConfig::default());
        let report = engine.judge(&[], &settings(), &catalog, date(2024, 6, 1));

        assert!(report.find("FUTURE").is_none());
        let gap = report.find("GAP").unwrap();
        assert_eq!(gap.units, 0.0);
        assert!(matches!(gap.anomalies[0], DataAnomaly::ConfigurationGap { .. }));
        assert!(report
            .anomalies
            .iter()
            .any(|a| matches!(a, DataAnomaly::NoEffectiveVersion { addition_code, .. } if addition_code == "FUTURE")));
    }

    #[test]
    fn test_reason_language_follows_config() {
        let catalog = AdditionCatalog {
            law_revisions: vec![],
            definitions: vec![definition("C", None, 0)],
            versions: vec![version("C", Some(123.0), 1.0, date(2024, 4, 1))],
        };
        let staff = vec![member("S1", &["保育士"])];

        let report = EligibilityEngine::new(EngineConfig::default()).judge(
            &staff,
            &settings(),
            &catalog,
            date(2024, 6, 1),
        );
        assert_eq!(report.find("C").unwrap().reason, "要件をすべて満たしています");

        let english = EngineConfig {
            locale: "en".to_string(),
            ..EngineConfig::default()
        };
        let report = EligibilityEngine::new(english).judge(&[], &settings(), &catalog, date(2024, 6, 1));
        assert_eq!(
            report.find("C").unwrap().reason,
            "qualified_staff_count not met (0/1)"
        );
    }

    #[test]
    fn test_judge_skips_inapplicable_service_type() {
        let mut def = definition("CDS_ONLY", None, 0);
        def.applicable_services = vec![ServiceType::ChildDevelopmentSupport];
        let catalog = AdditionCatalog {
            law_revisions: vec![],
            definitions: vec![def],
            versions: vec![version("CDS_ONLY", Some(10.0), 0.0, date(2024, 4, 1))],
        };
        let engine = EligibilityEngine::new(EngineConfig::default());
        let report = engine.judge(&[], &settings(), &catalog, date(2024, 6, 1));
        assert!(report.results.is_empty());
        assert!(report.anomalies.is_empty());
    }
}
