// ==========================================
// 加算判定引擎 - 标准加算目录（令和6年度报酬改定）
// ==========================================
// 用途: 初始化数据库 / CLI 未指定 --catalog 时的内置目录
// 红线: 每个加算定义只有一个 open 版本
// 说明: 排他组内优先度按单位数降序排列（优先度高者单位数不低于优先度低者）
// ==========================================

use crate::domain::catalog::{
    AdditionCatalog, AdditionDefinition, AdditionVersion, EmploymentScope, LawRevision, Metric,
    Requirement, StaffFilter,
};
use crate::domain::staff::{QualificationCode, QualificationSet};
use crate::domain::types::{AdditionCategory, Comparison, PersonnelCategory, RepresentationKind};
use chrono::NaiveDate;

pub const REVISION_2024: &str = "R06_REVISION";
pub const GROUP_STAFF_ALLOCATION: &str = "staff_allocation";
pub const GROUP_WELFARE_PROFESSIONAL: &str = "welfare_professional";

/// 令和6年4月1日
fn revision_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap_or_default()
}

/// 内置标准目录
pub fn standard_catalog() -> AdditionCatalog {
    let mut catalog = AdditionCatalog {
        law_revisions: vec![LawRevision {
            revision_id: REVISION_2024.to_string(),
            revision_date: revision_date(),
            name: "令和6年度障害福祉サービス等報酬改定".to_string(),
            description: None,
        }],
        ..Default::default()
    };

    for seed in seeds() {
        catalog.versions.push(AdditionVersion {
            version_id: format!("{}_v1", seed.code),
            addition_code: seed.code.to_string(),
            version_number: 1,
            representation: RepresentationKind::Units,
            units: Some(seed.units),
            percentage_rate: None,
            requirements: seed.requirements,
            max_times_per_day: None,
            max_times_per_month: seed.max_times_per_month,
            effective_from: revision_date(),
            effective_to: None,
            revision_id: Some(REVISION_2024.to_string()),
            notes: None,
        });
        catalog.definitions.push(AdditionDefinition {
            code: seed.code.to_string(),
            name: seed.name.to_string(),
            short_name: seed.short_name.to_string(),
            category: seed.category,
            exclusive_group: seed.group.map(str::to_string),
            priority: seed.priority,
            applicable_services: Vec::new(),
            is_active: true,
        });
    }

    catalog
}

struct Seed {
    code: &'static str,
    name: &'static str,
    short_name: &'static str,
    category: AdditionCategory,
    group: Option<&'static str>,
    priority: i32,
    units: f64,
    max_times_per_month: Option<u32>,
    requirements: Vec<Requirement>,
}

fn requirement(name: &str, metric: Metric, threshold: f64, detail: Option<&str>) -> Requirement {
    Requirement {
        name: name.to_string(),
        metric,
        comparison: Comparison::AtLeast,
        threshold,
        detail: detail.map(str::to_string),
        alternatives: Vec::new(),
    }
}

/// 主要件 + 替代要件（任一满足即可）
fn requirement_or(primary: Requirement, alternatives: Vec<Requirement>) -> Requirement {
    Requirement {
        alternatives,
        ..primary
    }
}

/// 加算人員・児童指導員等
fn addition_instructor(min_years: Option<f64>, employment: EmploymentScope) -> StaffFilter {
    StaffFilter {
        category: Some(PersonnelCategory::Addition),
        qualification: Some(QualificationSet::ChildInstructorEquivalent),
        min_experience_years: min_years,
        employment,
        role: None,
        any_of: Vec::new(),
    }
}

/// 常勤の児童指導員等
fn fulltime_instructors() -> StaffFilter {
    StaffFilter {
        qualification: Some(QualificationSet::ChildInstructorEquivalent),
        employment: EmploymentScope::FullTime,
        ..Default::default()
    }
}

/// 専門的支援体制の対象職員: 専門職・視能訓練士，或 经验5年以上的保育士・児童指導員
fn specialist_structure_staff() -> StaffFilter {
    StaffFilter {
        any_of: vec![
            StaffFilter {
                qualification: Some(QualificationSet::SpecialistSupport),
                ..Default::default()
            },
            StaffFilter {
                qualification: Some(QualificationSet::Codes(vec![
                    QualificationCode::NurseryTeacher,
                    QualificationCode::ChildInstructor,
                ])),
                min_experience_years: Some(5.0),
                ..Default::default()
            },
        ],
        ..Default::default()
    }
}

fn seeds() -> Vec<Seed> {
    let system = AdditionCategory::System;
    vec![
        // ===== 児童指導員等加配加算 =====
        // 组内 priority 按单位数降序排列：同时满足多个区分时算定单位最高者
        // （常勤専従・5年未満 152 单位先于常勤換算・5年以上 123 单位）
        Seed {
            code: "staff_allocation_1_fulltime",
            name: "児童指導員等加配加算(I) 常勤専従・経験5年以上",
            short_name: "加配(I)常専5年",
            category: system,
            group: Some(GROUP_STAFF_ALLOCATION),
            priority: 1,
            units: 187.0,
            max_times_per_month: None,
            requirements: vec![requirement(
                "常勤専従（資格者・経験5年以上）",
                Metric::Headcount {
                    filter: addition_instructor(Some(5.0), EmploymentScope::FulltimeDedicated),
                },
                1.0,
                None,
            )],
        },
        Seed {
            code: "staff_allocation_2_fulltime",
            name: "児童指導員等加配加算(I) 常勤専従・経験5年未満",
            short_name: "加配(I)常専",
            category: system,
            group: Some(GROUP_STAFF_ALLOCATION),
            priority: 2,
            units: 152.0,
            max_times_per_month: None,
            requirements: vec![requirement(
                "常勤専従（資格者）",
                Metric::Headcount {
                    filter: addition_instructor(None, EmploymentScope::FulltimeDedicated),
                },
                1.0,
                None,
            )],
        },
        Seed {
            code: "staff_allocation_1_convert",
            name: "児童指導員等加配加算(I) 常勤換算・経験5年以上",
            short_name: "加配(I)換算5年",
            category: system,
            group: Some(GROUP_STAFF_ALLOCATION),
            priority: 3,
            units: 123.0,
            max_times_per_month: None,
            requirements: vec![requirement(
                "常勤換算（資格者・経験5年以上）",
                Metric::TotalFte {
                    filter: addition_instructor(Some(5.0), EmploymentScope::Any),
                },
                1.0,
                None,
            )],
        },
        Seed {
            code: "staff_allocation_2_convert",
            name: "児童指導員等加配加算(I) 常勤換算・経験5年未満",
            short_name: "加配(I)換算",
            category: system,
            group: Some(GROUP_STAFF_ALLOCATION),
            priority: 4,
            units: 107.0,
            max_times_per_month: None,
            requirements: vec![requirement(
                "常勤換算（資格者）",
                Metric::TotalFte {
                    filter: addition_instructor(None, EmploymentScope::Any),
                },
                1.0,
                None,
            )],
        },
        Seed {
            code: "staff_allocation_3",
            name: "児童指導員等加配加算(II) その他従業者",
            short_name: "加配(II)",
            category: system,
            group: Some(GROUP_STAFF_ALLOCATION),
            priority: 5,
            units: 90.0,
            max_times_per_month: None,
            requirements: vec![requirement(
                "常勤換算（加算人員）",
                Metric::TotalFte {
                    filter: StaffFilter {
                        category: Some(PersonnelCategory::Addition),
                        ..Default::default()
                    },
                },
                1.0,
                None,
            )],
        },
        // ===== 専門的支援体制加算 =====
        Seed {
            code: "specialist_structure",
            name: "専門的支援体制加算",
            short_name: "専門体制",
            category: system,
            group: None,
            priority: 1,
            units: 123.0,
            max_times_per_month: None,
            requirements: vec![requirement(
                "専門職等の常勤換算",
                Metric::TotalFte {
                    filter: specialist_structure_staff(),
                },
                1.0,
                Some("PT/OT/ST/公認心理師/視能訓練士、または経験5年以上の保育士・児童指導員"),
            )],
        },
        // ===== 福祉専門職員配置等加算 =====
        Seed {
            code: "welfare_professional_1",
            name: "福祉専門職員配置等加算(I)",
            short_name: "福祉専門(I)",
            category: system,
            group: Some(GROUP_WELFARE_PROFESSIONAL),
            priority: 1,
            units: 15.0,
            max_times_per_month: None,
            requirements: vec![welfare_ratio(35.0)],
        },
        Seed {
            code: "welfare_professional_2",
            name: "福祉専門職員配置等加算(II)",
            short_name: "福祉専門(II)",
            category: system,
            group: Some(GROUP_WELFARE_PROFESSIONAL),
            priority: 2,
            units: 10.0,
            max_times_per_month: None,
            requirements: vec![welfare_ratio(25.0)],
        },
        Seed {
            code: "welfare_professional_3",
            name: "福祉専門職員配置等加算(III)",
            short_name: "福祉専門(III)",
            category: system,
            group: Some(GROUP_WELFARE_PROFESSIONAL),
            priority: 3,
            units: 6.0,
            max_times_per_month: None,
            requirements: vec![requirement_or(
                requirement(
                    "常勤率",
                    Metric::HeadcountRatio {
                        numerator: StaffFilter {
                            employment: EmploymentScope::FullTime,
                            ..Default::default()
                        },
                        denominator: StaffFilter::default(),
                    },
                    75.0,
                    Some("職員全体のうち常勤職員の割合（%）"),
                ),
                vec![requirement(
                    "3年以上勤続者割合",
                    Metric::HeadcountRatio {
                        numerator: StaffFilter {
                            min_experience_years: Some(3.0),
                            ..Default::default()
                        },
                        denominator: fulltime_instructors(),
                    },
                    30.0,
                    Some("常勤の児童指導員等のうち経験3年以上の者の割合（%）"),
                )],
            )],
        },
        // ===== 専門的支援実施加算 =====
        Seed {
            code: "specialist_support",
            name: "専門的支援実施加算",
            short_name: "専門実施",
            category: AdditionCategory::Implementation,
            group: None,
            priority: 1,
            units: 150.0,
            max_times_per_month: Some(4),
            requirements: vec![requirement(
                "専門職の配置",
                Metric::Headcount {
                    filter: StaffFilter {
                        qualification: Some(QualificationSet::Specialist),
                        ..Default::default()
                    },
                },
                1.0,
                None,
            )],
        },
    ]
}

fn welfare_ratio(threshold: f64) -> Requirement {
    requirement(
        "福祉専門職割合",
        Metric::HeadcountRatio {
            numerator: StaffFilter {
                qualification: Some(QualificationSet::WelfareProfessional),
                ..Default::default()
            },
            denominator: fulltime_instructors(),
        },
        threshold,
        Some("常勤の児童指導員等のうち社会福祉士・介護福祉士・精神保健福祉士・公認心理師の割合（%）"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rule_resolver::TemporalRuleResolver;
    use crate::importer::catalog_loader::CatalogLoader;

    #[test]
    fn test_standard_catalog_is_valid() {
        let catalog = standard_catalog();
        CatalogLoader::validate(&catalog).unwrap();
        assert!(TemporalRuleResolver::check_open_versions(&catalog).is_empty());
        assert_eq!(catalog.definitions.len(), catalog.versions.len());
    }

    #[test]
    fn test_group_priority_follows_units() {
        let catalog = standard_catalog();
        for group in [GROUP_STAFF_ALLOCATION, GROUP_WELFARE_PROFESSIONAL] {
            let mut members: Vec<_> = catalog
                .definitions
                .iter()
                .filter(|d| d.exclusive_group.as_deref() == Some(group))
                .collect();
            members.sort_by_key(|d| d.priority);
            let units: Vec<f64> = members
                .iter()
                .filter_map(|d| catalog.versions_of(&d.code).first().and_then(|v| v.units))
                .collect();
            assert!(units.windows(2).all(|w| w[0] >= w[1]), "{}: {:?}", group, units);
        }
    }

    #[test]
    fn test_json_round_trip_through_loader() {
        let raw = serde_json::to_string(&standard_catalog()).unwrap();
        let loaded = CatalogLoader::from_json_str(&raw).unwrap();
        assert_eq!(loaded, standard_catalog());
    }
}
