// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::NaiveDate;
use welfare_addition_engine::domain::catalog::{
    AdditionCatalog, AdditionDefinition, AdditionVersion, EmploymentScope, Metric, Requirement,
    StaffFilter,
};
use welfare_addition_engine::domain::facility::FacilitySettings;
use welfare_addition_engine::domain::staff::{QualificationSet, StaffMember};
use welfare_addition_engine::domain::types::{
    AdditionCategory, Comparison, EmploymentStyle, PersonnelCategory, RepresentationKind,
    ServiceType,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ==========================================
// StaffMember 构建器
// ==========================================

pub struct StaffBuilder {
    id: String,
    employment_style: EmploymentStyle,
    weekly_hours: f64,
    qualifications: Vec<String>,
    years_of_experience: f64,
    personnel_category: PersonnelCategory,
    is_active: bool,
}

impl StaffBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            employment_style: EmploymentStyle::FulltimeDedicated,
            weekly_hours: 40.0,
            qualifications: Vec::new(),
            years_of_experience: 0.0,
            personnel_category: PersonnelCategory::Standard,
            is_active: true,
        }
    }

    pub fn part_time(mut self, weekly_hours: f64) -> Self {
        self.employment_style = EmploymentStyle::PartTime;
        self.weekly_hours = weekly_hours;
        self
    }

    pub fn concurrent(mut self) -> Self {
        self.employment_style = EmploymentStyle::FulltimeConcurrent;
        self
    }

    pub fn qualification(mut self, code: &str) -> Self {
        self.qualifications.push(code.to_string());
        self
    }

    pub fn years(mut self, years: f64) -> Self {
        self.years_of_experience = years;
        self
    }

    pub fn addition_staff(mut self) -> Self {
        self.personnel_category = PersonnelCategory::Addition;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn build(self) -> StaffMember {
        StaffMember {
            name: format!("職員{}", self.id),
            id: self.id,
            employment_style: self.employment_style,
            weekly_hours: self.weekly_hours,
            qualifications: self.qualifications.into_iter().collect(),
            years_of_experience: self.years_of_experience,
            personnel_category: self.personnel_category,
            is_active: self.is_active,
            is_manager: false,
            is_service_manager: false,
        }
    }
}

// ==========================================
// FacilitySettings 构建器
// ==========================================

pub struct FacilityBuilder {
    settings: FacilitySettings,
}

impl FacilityBuilder {
    pub fn new(facility_id: &str) -> Self {
        Self {
            settings: FacilitySettings {
                facility_id: facility_id.to_string(),
                child_capacity: 10,
                region_grade: 1,
                service_type: ServiceType::AfterSchoolDayService,
                average_usage_days: 20.0,
                base_unit_count: 700.0,
                standard_weekly_hours: 40.0,
                current_additions: Default::default(),
            },
        }
    }

    pub fn region(mut self, grade: u8) -> Self {
        self.settings.region_grade = grade;
        self
    }

    pub fn capacity(mut self, capacity: u32) -> Self {
        self.settings.child_capacity = capacity;
        self
    }

    pub fn service(mut self, service_type: ServiceType) -> Self {
        self.settings.service_type = service_type;
        self
    }

    pub fn current(mut self, code: &str) -> Self {
        self.settings.current_additions.insert(code.to_string());
        self
    }

    pub fn build(self) -> FacilitySettings {
        self.settings
    }
}

// ==========================================
// 加算目录构建器
// ==========================================

/// 合格者（児童指導員等）人数 ≥ threshold
pub fn qualified_headcount(threshold: f64) -> Requirement {
    Requirement {
        name: "qualified_staff_count".to_string(),
        metric: Metric::Headcount {
            filter: StaffFilter {
                qualification: Some(QualificationSet::ChildInstructorEquivalent),
                ..Default::default()
            },
        },
        comparison: Comparison::AtLeast,
        threshold,
        detail: None,
        alternatives: Vec::new(),
    }
}

/// 加算人員・常勤専従・经验 ≥ years 的人数 ≥ 1
pub fn experienced_fulltime(years: f64) -> Requirement {
    Requirement {
        name: "experienced_fulltime".to_string(),
        metric: Metric::Headcount {
            filter: StaffFilter {
                category: Some(PersonnelCategory::Addition),
                min_experience_years: Some(years),
                employment: EmploymentScope::FulltimeDedicated,
                ..Default::default()
            },
        },
        comparison: Comparison::AtLeast,
        threshold: 1.0,
        detail: None,
        alternatives: Vec::new(),
    }
}

pub struct AdditionBuilder {
    definition: AdditionDefinition,
    versions: Vec<AdditionVersion>,
}

impl AdditionBuilder {
    pub fn new(code: &str) -> Self {
        Self {
            definition: AdditionDefinition {
                code: code.to_string(),
                name: format!("{}加算", code),
                short_name: code.to_string(),
                category: AdditionCategory::System,
                exclusive_group: None,
                priority: 1,
                applicable_services: Vec::new(),
                is_active: true,
            },
            versions: Vec::new(),
        }
    }

    pub fn group(mut self, group: &str, priority: i32) -> Self {
        self.definition.exclusive_group = Some(group.to_string());
        self.definition.priority = priority;
        self
    }

    pub fn implementation(mut self) -> Self {
        self.definition.category = AdditionCategory::Implementation;
        self
    }

    pub fn services(mut self, services: &[ServiceType]) -> Self {
        self.definition.applicable_services = services.to_vec();
        self
    }

    /// 单位数版本（version_number 按追加顺序递增）
    pub fn units_version(
        mut self,
        units: f64,
        from: NaiveDate,
        to: Option<NaiveDate>,
        requirements: Vec<Requirement>,
    ) -> Self {
        let number = self.versions.len() as i32 + 1;
        self.versions.push(AdditionVersion {
            version_id: format!("{}_v{}", self.definition.code, number),
            addition_code: self.definition.code.clone(),
            version_number: number,
            representation: RepresentationKind::Units,
            units: Some(units),
            percentage_rate: None,
            requirements,
            max_times_per_day: None,
            max_times_per_month: None,
            effective_from: from,
            effective_to: to,
            revision_id: None,
            notes: None,
        });
        self
    }

    pub fn percentage_version(mut self, rate: f64, from: NaiveDate) -> Self {
        let number = self.versions.len() as i32 + 1;
        self.versions.push(AdditionVersion {
            version_id: format!("{}_v{}", self.definition.code, number),
            addition_code: self.definition.code.clone(),
            version_number: number,
            representation: RepresentationKind::Percentage,
            units: None,
            percentage_rate: Some(rate),
            requirements: Vec::new(),
            max_times_per_day: None,
            max_times_per_month: None,
            effective_from: from,
            effective_to: None,
            revision_id: None,
            notes: None,
        });
        self
    }

    /// 最后追加的版本设置月上限
    pub fn monthly_cap(mut self, cap: u32) -> Self {
        if let Some(last) = self.versions.last_mut() {
            last.max_times_per_month = Some(cap);
        }
        self
    }

    pub fn add_to(self, catalog: &mut AdditionCatalog) {
        catalog.definitions.push(self.definition);
        catalog.versions.extend(self.versions);
    }
}

pub fn catalog_of(builders: Vec<AdditionBuilder>) -> AdditionCatalog {
    let mut catalog = AdditionCatalog::default();
    for builder in builders {
        builder.add_to(&mut catalog);
    }
    catalog
}
