// ==========================================
// 加算判定引擎 - 加算目录（定义 + 版本履历）
// ==========================================
// 红线: 每个加算定义任意时点只有一个 open 版本（effective_to = NULL）
// 红线: 要件形状固定（指标 + 比较 + 阈值），不是通用规则语言
// 红线: OR 只有两处：筛选条件的 any_of、要件的 alternatives（均不嵌套表达式）
// ==========================================

use crate::domain::staff::{QualificationSet, StaffForJudgment};
use crate::domain::types::{
    AdditionCategory, Comparison, EmploymentStyle, PersonnelCategory, RepresentationKind,
    ServiceType,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// LawRevision - 法改正
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LawRevision {
    pub revision_id: String,
    pub revision_date: NaiveDate,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ==========================================
// AdditionDefinition - 加算定义
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionDefinition {
    pub code: String,
    pub name: String,
    pub short_name: String,
    pub category: AdditionCategory,
    #[serde(default)]
    pub exclusive_group: Option<String>,
    /// 排他组内优先度（值越小越优先）
    #[serde(default)]
    pub priority: i32,
    /// 适用服务类型（空 = 全部适用）
    #[serde(default)]
    pub applicable_services: Vec<ServiceType>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl AdditionDefinition {
    pub fn applies_to(&self, service_type: ServiceType) -> bool {
        self.applicable_services.is_empty() || self.applicable_services.contains(&service_type)
    }
}

// ==========================================
// StaffFilter - 职员筛选口径
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentScope {
    #[default]
    Any,
    FullTime,          // 常勤（専従 + 兼務）
    FulltimeDedicated, // 常勤専従
    PartTime,
}

impl EmploymentScope {
    pub fn matches(&self, style: EmploymentStyle) -> bool {
        match self {
            EmploymentScope::Any => true,
            EmploymentScope::FullTime => style.is_full_time(),
            EmploymentScope::FulltimeDedicated => style == EmploymentStyle::FulltimeDedicated,
            EmploymentScope::PartTime => style == EmploymentStyle::PartTime,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Manager,
    ServiceManager,
}

/// 职员筛选条件（各项之间为 AND）
///
/// any_of 非空时，还须至少满足其中一个子条件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StaffFilter {
    #[serde(default)]
    pub category: Option<PersonnelCategory>,
    #[serde(default)]
    pub qualification: Option<QualificationSet>,
    #[serde(default)]
    pub min_experience_years: Option<f64>,
    #[serde(default)]
    pub employment: EmploymentScope,
    #[serde(default)]
    pub role: Option<StaffRole>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<StaffFilter>,
}

impl StaffFilter {
    pub fn matches(&self, staff: &StaffForJudgment) -> bool {
        self.matches_with(staff, true, true)
    }

    /// 去掉人员区分约束后是否匹配（变更人员区分即可满足的候选）
    pub fn matches_ignoring_category(&self, staff: &StaffForJudgment) -> bool {
        self.matches_with(staff, false, true)
    }

    /// 去掉资格约束后是否匹配（取得资格即可满足的候选）
    pub fn matches_ignoring_qualification(&self, staff: &StaffForJudgment) -> bool {
        self.matches_with(staff, true, false)
    }

    /// 放宽同样作用于 any_of 的各子条件
    fn matches_with(&self, staff: &StaffForJudgment, category: bool, qualification: bool) -> bool {
        (!category || self.matches_category(staff))
            && (!qualification || self.matches_qualification(staff))
            && self.matches_rest(staff)
            && (self.any_of.is_empty()
                || self
                    .any_of
                    .iter()
                    .any(|alt| alt.matches_with(staff, category, qualification)))
    }

    fn matches_category(&self, staff: &StaffForJudgment) -> bool {
        self.category
            .map_or(true, |category| staff.personnel_category == category)
    }

    fn matches_qualification(&self, staff: &StaffForJudgment) -> bool {
        self.qualification
            .as_ref()
            .map_or(true, |set| set.matches(&staff.qualifications))
    }

    fn matches_rest(&self, staff: &StaffForJudgment) -> bool {
        let experience_ok = self
            .min_experience_years
            .map_or(true, |years| staff.years_of_experience >= years);
        let role_ok = match self.role {
            None => true,
            Some(StaffRole::Manager) => staff.is_manager,
            Some(StaffRole::ServiceManager) => staff.is_service_manager,
        };
        experience_ok && role_ok && self.employment.matches(staff.employment_style)
    }
}

// ==========================================
// Metric - 判定指标
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Metric {
    /// 符合条件的人数
    Headcount { filter: StaffFilter },
    /// 符合条件的 FTE 合计
    TotalFte { filter: StaffFilter },
    /// 符合条件者中的最大经验年数
    MaxExperienceYears { filter: StaffFilter },
    /// 分母集合中同时满足分子条件的人数比例（%）
    HeadcountRatio {
        numerator: StaffFilter,
        denominator: StaffFilter,
    },
    /// 同上，按 FTE 加权（%）
    FteRatio {
        numerator: StaffFilter,
        denominator: StaffFilter,
    },
    /// 事业所定员
    ChildCapacity,
}

impl Metric {
    pub fn kind_str(&self) -> &'static str {
        match self {
            Metric::Headcount { .. } => "headcount",
            Metric::TotalFte { .. } => "total_fte",
            Metric::MaxExperienceYears { .. } => "max_experience_years",
            Metric::HeadcountRatio { .. } => "headcount_ratio",
            Metric::FteRatio { .. } => "fte_ratio",
            Metric::ChildCapacity => "child_capacity",
        }
    }
}

// ==========================================
// Requirement - 要件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    pub metric: Metric,
    #[serde(default)]
    pub comparison: Comparison,
    pub threshold: f64,
    #[serde(default)]
    pub detail: Option<String>,
    /// 替代要件：主要件或任一替代要件满足即视为满足
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<Requirement>,
}

// ==========================================
// AdditionVersion - 加算版本
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionVersion {
    pub version_id: String,
    pub addition_code: String,
    pub version_number: i32,
    pub representation: RepresentationKind,
    #[serde(default)]
    pub units: Option<f64>,
    #[serde(default)]
    pub percentage_rate: Option<f64>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub max_times_per_day: Option<u32>,
    #[serde(default)]
    pub max_times_per_month: Option<u32>,
    pub effective_from: NaiveDate,
    #[serde(default)]
    pub effective_to: Option<NaiveDate>, // None = 现行版本
    #[serde(default)]
    pub revision_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AdditionVersion {
    /// effective_from ≤ date 且 (effective_to 为空 或 effective_to ≥ date)
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        self.effective_from <= date && self.effective_to.map_or(true, |to| to >= date)
    }

    pub fn is_open(&self) -> bool {
        self.effective_to.is_none()
    }

    /// 按算定方式取得有效值
    ///
    /// # 返回
    /// - Ok(value): 单位数或百分比
    /// - Err(detail): 设定不备（声明了算定方式却缺少对应数值），调用方按 0 处理
    pub fn effective_value(&self) -> Result<f64, String> {
        match self.representation {
            RepresentationKind::Units => match self.units {
                Some(units) if units.is_finite() && units >= 0.0 => Ok(units),
                Some(units) => Err(format!("units invalid ({})", units)),
                None if self.percentage_rate.is_some() => {
                    Err("declared units but only percentage_rate is set".to_string())
                }
                None => Err("declared units but units is missing".to_string()),
            },
            RepresentationKind::Percentage => match self.percentage_rate {
                Some(rate) if rate.is_finite() && rate >= 0.0 => Ok(rate),
                Some(rate) => Err(format!("percentage_rate invalid ({})", rate)),
                None if self.units.is_some() => {
                    Err("declared percentage but only units is set".to_string())
                }
                None => Err("declared percentage but percentage_rate is missing".to_string()),
            },
        }
    }
}

// ==========================================
// AdditionCatalog - 加算目录
// ==========================================
// 红线: 调用方在调用前解析完毕，引擎内不做 I/O
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AdditionCatalog {
    #[serde(default)]
    pub law_revisions: Vec<LawRevision>,
    pub definitions: Vec<AdditionDefinition>,
    pub versions: Vec<AdditionVersion>,
}

impl AdditionCatalog {
    pub fn definition(&self, code: &str) -> Option<&AdditionDefinition> {
        self.definitions.iter().find(|d| d.code == code)
    }

    pub fn versions_of(&self, code: &str) -> Vec<&AdditionVersion> {
        self.versions
            .iter()
            .filter(|v| v.addition_code == code)
            .collect()
    }

    pub fn law_revision(&self, revision_id: &str) -> Option<&LawRevision> {
        self.law_revisions
            .iter()
            .find(|r| r.revision_id == revision_id)
    }
}
