// ==========================================
// 加算判定 集成测试
// ==========================================
// 覆盖: 排他组选择 / 版本时点解析 / 理由文 / 建议 / 标准目录
// ==========================================

mod helpers;

use helpers::test_data_builder::*;
use welfare_addition_engine::domain::types::SuggestionType;
use welfare_addition_engine::domain::{DataAnomaly, SimulationParams};
use welfare_addition_engine::importer::catalog_seed::{standard_catalog, GROUP_STAFF_ALLOCATION};
use welfare_addition_engine::{EligibilityEngine, EngineConfig, OptimizationAdvisor};

fn params() -> SimulationParams {
    SimulationParams {
        child_count: 10,
        average_usage_days: 20.0,
        base_units: 700.0,
        region_grade: 1,
        percent_additions: 0.0,
    }
}

fn engine() -> EligibilityEngine {
    EligibilityEngine::new(EngineConfig::default())
}

// ==========================================
// 排他组: 仅最优先的算定可能成员计入
// ==========================================

#[test]
fn test_exclusive_group_selects_priority_one_only() {
    let from = date(2024, 4, 1);
    let catalog = catalog_of(vec![
        AdditionBuilder::new("alloc_high")
            .group("staff_allocation", 1)
            .units_version(187.0, from, None, vec![qualified_headcount(1.0)]),
        AdditionBuilder::new("alloc_low")
            .group("staff_allocation", 2)
            .units_version(152.0, from, None, vec![qualified_headcount(1.0)]),
    ]);
    let staff = vec![StaffBuilder::new("S1").qualification("NURSERY_TEACHER").build()];
    let settings = FacilityBuilder::new("F1").build();

    let report = engine().judge(&staff, &settings, &catalog, date(2024, 6, 1));

    let high = report.find("alloc_high").unwrap();
    let low = report.find("alloc_low").unwrap();
    assert!(high.is_eligible && high.is_selected);
    assert!(low.is_eligible && !low.is_selected);

    let simulation = welfare_addition_engine::RevenueCalculator::simulate(
        &report.results,
        &params(),
        &EngineConfig::default(),
    );
    assert_eq!(simulation.system_addition_units, 187.0);
    assert_eq!(simulation.selected.len(), 1);
}

#[test]
fn test_group_falls_through_to_next_eligible_member() {
    let from = date(2024, 4, 1);
    let catalog = catalog_of(vec![
        AdditionBuilder::new("alloc_high")
            .group("staff_allocation", 1)
            .units_version(187.0, from, None, vec![qualified_headcount(3.0)]),
        AdditionBuilder::new("alloc_low")
            .group("staff_allocation", 2)
            .units_version(152.0, from, None, vec![qualified_headcount(1.0)]),
    ]);
    let staff = vec![StaffBuilder::new("S1").qualification("保育士").build()];
    let settings = FacilityBuilder::new("F1").build();

    let report = engine().judge(&staff, &settings, &catalog, date(2024, 6, 1));

    assert!(!report.find("alloc_high").unwrap().is_selected);
    assert!(report.find("alloc_low").unwrap().is_selected);
    assert_eq!(report.selected().count(), 1);
}

// ==========================================
// 版本时点解析
// ==========================================

#[test]
fn test_future_only_version_is_excluded() {
    let catalog = catalog_of(vec![
        AdditionBuilder::new("current").units_version(100.0, date(2024, 4, 1), None, vec![]),
        AdditionBuilder::new("future").units_version(100.0, date(2027, 4, 1), None, vec![]),
    ]);
    let settings = FacilityBuilder::new("F1").build();

    let report = engine().judge(&[], &settings, &catalog, date(2024, 6, 1));

    assert!(report.find("current").is_some());
    assert!(report.find("future").is_none());
    assert_eq!(report.results.len(), 1);
}

#[test]
fn test_reference_date_picks_version_in_force() {
    let catalog = catalog_of(vec![AdditionBuilder::new("alloc")
        .units_version(155.0, date(2021, 4, 1), Some(date(2024, 3, 31)), vec![])
        .units_version(187.0, date(2024, 4, 1), None, vec![])]);
    let settings = FacilityBuilder::new("F1").build();

    let before = engine().judge(&[], &settings, &catalog, date(2024, 3, 31));
    let after = engine().judge(&[], &settings, &catalog, date(2024, 4, 1));

    let old = before.find("alloc").unwrap();
    assert_eq!(old.version_number, 1);
    assert_eq!(old.units, 155.0);

    let new = after.find("alloc").unwrap();
    assert_eq!(new.version_number, 2);
    assert_eq!(new.units, 187.0);
}

#[test]
fn test_overlapping_versions_take_highest_number_and_record_anomaly() {
    let catalog = catalog_of(vec![AdditionBuilder::new("alloc")
        .units_version(155.0, date(2021, 4, 1), None, vec![])
        .units_version(187.0, date(2024, 4, 1), None, vec![])]);
    let settings = FacilityBuilder::new("F1").build();

    let report = engine().judge(&[], &settings, &catalog, date(2024, 6, 1));

    let result = report.find("alloc").unwrap();
    assert_eq!(result.version_number, 2);
    assert!(report.anomalies.iter().any(|a| matches!(
        a,
        DataAnomaly::OverlappingVersions { chosen: 2, .. }
    )));
}

// ==========================================
// 理由文与建议
// ==========================================

#[test]
fn test_shortfall_reason_and_single_hire_suggestion() {
    let catalog = catalog_of(vec![AdditionBuilder::new("staffing").units_version(
        187.0,
        date(2024, 4, 1),
        None,
        vec![qualified_headcount(2.0)],
    )]);
    let staff = vec![StaffBuilder::new("S1").qualification("CHILD_INSTRUCTOR").build()];
    let settings = FacilityBuilder::new("F1").build();

    let report = engine().judge(&staff, &settings, &catalog, date(2024, 6, 1));
    let result = report.find("staffing").unwrap();

    assert!(!result.is_eligible);
    assert!(!result.is_selected);
    assert!(result.reason.contains("1/2"), "reason = {}", result.reason);

    let status = &result.requirements[0];
    assert_eq!(status.current, 1.0);
    assert_eq!(status.required, 2.0);
    assert!(!status.met);

    let suggestions =
        OptimizationAdvisor::advise(&report.results, &params(), &EngineConfig::default());
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].suggestion_type, SuggestionType::Hire);
    assert_eq!(suggestions[0].addition_code, "staffing");
    // 187 単位 × 10 人 × 20 日 × 11.12 円
    assert!((suggestions[0].estimated_impact - 415_888.0).abs() < 1e-6);
}

#[test]
fn test_unqualified_staff_turns_suggestion_into_training() {
    let catalog = catalog_of(vec![AdditionBuilder::new("staffing").units_version(
        187.0,
        date(2024, 4, 1),
        None,
        vec![qualified_headcount(2.0)],
    )]);
    let staff = vec![
        StaffBuilder::new("S1").qualification("CHILD_INSTRUCTOR").build(),
        StaffBuilder::new("S2").build(),
    ];
    let settings = FacilityBuilder::new("F1").build();

    let report = engine().judge(&staff, &settings, &catalog, date(2024, 6, 1));
    let suggestions =
        OptimizationAdvisor::advise(&report.results, &params(), &EngineConfig::default());

    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].suggestion_type, SuggestionType::Training);
}

#[test]
fn test_standard_staff_with_experience_suggests_upgrade() {
    let catalog = catalog_of(vec![AdditionBuilder::new("experienced").units_version(
        187.0,
        date(2024, 4, 1),
        None,
        vec![experienced_fulltime(5.0)],
    )]);
    let staff = vec![StaffBuilder::new("S1").years(8.0).build()];
    let settings = FacilityBuilder::new("F1").build();

    let report = engine().judge(&staff, &settings, &catalog, date(2024, 6, 1));
    assert!(!report.find("experienced").unwrap().is_eligible);

    let suggestions =
        OptimizationAdvisor::advise(&report.results, &params(), &EngineConfig::default());
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].suggestion_type, SuggestionType::Upgrade);
}

// ==========================================
// 名册: 退职者 / 未知资格
// ==========================================

#[test]
fn test_inactive_staff_does_not_count() {
    let catalog = catalog_of(vec![AdditionBuilder::new("staffing").units_version(
        187.0,
        date(2024, 4, 1),
        None,
        vec![qualified_headcount(2.0)],
    )]);
    let staff = vec![
        StaffBuilder::new("S1").qualification("NURSERY_TEACHER").build(),
        StaffBuilder::new("S2").qualification("NURSERY_TEACHER").inactive().build(),
    ];
    let settings = FacilityBuilder::new("F1").build();

    let report = engine().judge(&staff, &settings, &catalog, date(2024, 6, 1));
    assert!(!report.find("staffing").unwrap().is_eligible);
}

#[test]
fn test_unknown_qualification_is_recorded_and_not_matched() {
    let catalog = catalog_of(vec![AdditionBuilder::new("staffing").units_version(
        187.0,
        date(2024, 4, 1),
        None,
        vec![qualified_headcount(1.0)],
    )]);
    let staff = vec![StaffBuilder::new("S1").qualification("ヘルパー2級").build()];
    let settings = FacilityBuilder::new("F1").build();

    let report = engine().judge(&staff, &settings, &catalog, date(2024, 6, 1));

    assert!(!report.find("staffing").unwrap().is_eligible);
    assert!(report.anomalies.iter().any(|a| matches!(
        a,
        DataAnomaly::UnknownQualification { staff_id, raw_code }
            if staff_id == "S1" && raw_code == "ヘルパー2級"
    )));
}

#[test]
fn test_service_scope_filters_definitions() {
    use welfare_addition_engine::domain::types::ServiceType;

    let catalog = catalog_of(vec![AdditionBuilder::new("cds_only")
        .services(&[ServiceType::ChildDevelopmentSupport])
        .units_version(50.0, date(2024, 4, 1), None, vec![])]);
    let settings = FacilityBuilder::new("F1")
        .service(ServiceType::AfterSchoolDayService)
        .build();

    let report = engine().judge(&[], &settings, &catalog, date(2024, 6, 1));
    assert!(report.results.is_empty());
}

// ==========================================
// 标准目录 + 现实名册
// ==========================================

#[test]
fn test_standard_catalog_with_realistic_roster() {
    welfare_addition_engine::logging::init_test();
    let catalog = standard_catalog();
    let staff = vec![
        StaffBuilder::new("S1")
            .qualification("NURSERY_TEACHER")
            .years(7.0)
            .addition_staff()
            .build(),
        StaffBuilder::new("S2").qualification("CHILD_INSTRUCTOR").years(2.0).build(),
        StaffBuilder::new("S3").qualification("SOCIAL_WORKER").years(4.0).build(),
        StaffBuilder::new("S4").part_time(20.0).qualification("PT").build(),
    ];
    let settings = FacilityBuilder::new("F1").current("staff_allocation_1_fulltime").build();

    let report = engine().judge(&staff, &settings, &catalog, date(2024, 6, 1));

    let selected: Vec<&str> = report
        .selected()
        .filter(|r| r.exclusive_group.as_deref() == Some(GROUP_STAFF_ALLOCATION))
        .map(|r| r.addition_code.as_str())
        .collect();
    assert_eq!(selected, vec!["staff_allocation_1_fulltime"]);
    assert!(report.find("staff_allocation_1_fulltime").unwrap().is_current);

    for result in &report.results {
        assert!(!result.reason.is_empty(), "{} has empty reason", result.addition_code);
    }

    // 每个排他组至多一个计入收益
    for (group, members) in report.grouped() {
        if group.is_some() {
            assert!(members.iter().filter(|m| m.counts_toward_revenue()).count() <= 1);
        }
    }
}

#[test]
fn test_experienced_nursery_teacher_counts_for_specialist_structure() {
    let catalog = standard_catalog();
    let settings = FacilityBuilder::new("F1").build();

    let staff = vec![StaffBuilder::new("S1").qualification("NURSERY_TEACHER").years(6.0).build()];
    let report = engine().judge(&staff, &settings, &catalog, date(2024, 6, 1));
    let structure = report.find("specialist_structure").unwrap();
    assert!(structure.is_eligible, "reason = {}", structure.reason);
    assert!(structure.is_selected);

    // 经验不足 5 年的保育士不计入
    let staff = vec![StaffBuilder::new("S1").qualification("NURSERY_TEACHER").years(4.0).build()];
    let report = engine().judge(&staff, &settings, &catalog, date(2024, 6, 1));
    assert!(!report.find("specialist_structure").unwrap().is_eligible);
}

#[test]
fn test_fulltime_ratio_alone_meets_welfare_professional_3() {
    let catalog = standard_catalog();
    let settings = FacilityBuilder::new("F1").build();

    // 常勤 3 / 全体 4 = 75%，经验 3 年以上者为 0
    let staff = vec![
        StaffBuilder::new("S1").build(),
        StaffBuilder::new("S2").build(),
        StaffBuilder::new("S3").build(),
        StaffBuilder::new("S4").part_time(20.0).build(),
    ];
    let report = engine().judge(&staff, &settings, &catalog, date(2024, 6, 1));
    let wp3 = report.find("welfare_professional_3").unwrap();
    assert!(wp3.is_eligible && wp3.is_selected, "reason = {}", wp3.reason);
    assert_eq!(wp3.requirements[0].current, 75.0);
    assert!(!wp3.requirements[0].alternatives[0].met);

    // 常勤 2 / 全体 4 = 50%
    let staff = vec![
        StaffBuilder::new("S1").build(),
        StaffBuilder::new("S2").build(),
        StaffBuilder::new("S3").part_time(20.0).build(),
        StaffBuilder::new("S4").part_time(20.0).build(),
    ];
    let report = engine().judge(&staff, &settings, &catalog, date(2024, 6, 1));
    assert!(!report.find("welfare_professional_3").unwrap().is_eligible);
}

#[test]
fn test_switch_suggested_when_claiming_lower_allocation() {
    let catalog = standard_catalog();
    let staff = vec![StaffBuilder::new("S1")
        .qualification("NURSERY_TEACHER")
        .years(6.0)
        .addition_staff()
        .build()];
    let settings = FacilityBuilder::new("F1").current("staff_allocation_3").build();

    let report = engine().judge(&staff, &settings, &catalog, date(2024, 6, 1));
    assert!(report.find("staff_allocation_1_fulltime").unwrap().is_selected);
    assert!(report.find("staff_allocation_3").unwrap().is_current);

    let suggestions =
        OptimizationAdvisor::advise(&report.results, &params(), &EngineConfig::default());
    let switch: Vec<_> = suggestions
        .iter()
        .filter(|s| s.suggestion_type == SuggestionType::Switch)
        .collect();
    assert_eq!(switch.len(), 1);
    assert_eq!(switch[0].addition_code, "staff_allocation_1_fulltime");
    // (187 − 90) 単位 × 200 回 × 11.12 円
    assert!((switch[0].estimated_impact - 97.0 * 200.0 * 11.12).abs() < 1e-6);
}
