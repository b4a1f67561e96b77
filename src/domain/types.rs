// ==========================================
// 加算判定引擎 - 领域类型定义
// ==========================================
// 依据: 报酬告示 - 人员配置区分 / 服务类型 / 加算区分
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 浮点比较容差（FTE 累加误差，如 0.7 + 0.3）
pub const COMPARISON_EPSILON: f64 = 1e-9;

// ==========================================
// 勤务形态 (Employment Style)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStyle {
    FulltimeDedicated,  // 常勤専従
    FulltimeConcurrent, // 常勤兼務
    PartTime,           // 非常勤
}

impl EmploymentStyle {
    pub fn is_full_time(&self) -> bool {
        matches!(
            self,
            EmploymentStyle::FulltimeDedicated | EmploymentStyle::FulltimeConcurrent
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentStyle::FulltimeDedicated => "fulltime_dedicated",
            EmploymentStyle::FulltimeConcurrent => "fulltime_concurrent",
            EmploymentStyle::PartTime => "part_time",
        }
    }
}

impl fmt::Display for EmploymentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EmploymentStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fulltime_dedicated" | "full_time_dedicated" | "常勤専従" => {
                Ok(EmploymentStyle::FulltimeDedicated)
            }
            "fulltime_concurrent" | "full_time_concurrent" | "常勤兼務" => {
                Ok(EmploymentStyle::FulltimeConcurrent)
            }
            "parttime" | "part_time" | "part-time" | "非常勤" => Ok(EmploymentStyle::PartTime),
            other => Err(format!("未知勤务形态: {}", other)),
        }
    }
}

// ==========================================
// 人员区分 (Personnel Category)
// ==========================================
// 基准人员 vs 加算人员（加配加算只计加算人员）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonnelCategory {
    Standard, // 基準人員
    Addition, // 加算人員
}

impl PersonnelCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonnelCategory::Standard => "standard",
            PersonnelCategory::Addition => "addition",
        }
    }
}

impl fmt::Display for PersonnelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PersonnelCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "基準人員" | "基準" => Ok(PersonnelCategory::Standard),
            "addition" | "加算人員" | "加算" => Ok(PersonnelCategory::Addition),
            other => Err(format!("未知人员区分: {}", other)),
        }
    }
}

// ==========================================
// 服务类型 (Service Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    ChildDevelopmentSupport, // 児童発達支援
    AfterSchoolDayService,   // 放課後等デイサービス
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::ChildDevelopmentSupport => "child_development_support",
            ServiceType::AfterSchoolDayService => "after_school_day_service",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "child_development_support" | "児童発達支援" | "児発" => {
                Ok(ServiceType::ChildDevelopmentSupport)
            }
            "after_school_day_service" | "放課後等デイサービス" | "放デイ" => {
                Ok(ServiceType::AfterSchoolDayService)
            }
            other => Err(format!("未知服务类型: {}", other)),
        }
    }
}

// ==========================================
// 加算区分 (Addition Category)
// ==========================================
// System: 体制加算（人员配置决定）
// Implementation: 实施加算（按实施记录算定）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdditionCategory {
    System,
    Implementation,
}

impl AdditionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdditionCategory::System => "system",
            AdditionCategory::Implementation => "implementation",
        }
    }
}

impl FromStr for AdditionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "system" => Ok(AdditionCategory::System),
            "implementation" => Ok(AdditionCategory::Implementation),
            other => Err(format!("未知加算区分: {}", other)),
        }
    }
}

// ==========================================
// 算定方式 (Representation Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepresentationKind {
    Units,      // 固定单位数
    Percentage, // 百分比加算
}

impl RepresentationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepresentationKind::Units => "units",
            RepresentationKind::Percentage => "percentage",
        }
    }
}

impl FromStr for RepresentationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "units" => Ok(RepresentationKind::Units),
            "percentage" => Ok(RepresentationKind::Percentage),
            other => Err(format!("未知算定方式: {}", other)),
        }
    }
}

// ==========================================
// 比较运算 (Comparison)
// ==========================================
// 红线: 所有要件均为 "现值 ≥ 要求值" 方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    #[default]
    AtLeast,
    GreaterThan,
}

impl Comparison {
    pub fn holds(&self, current: f64, threshold: f64) -> bool {
        match self {
            Comparison::AtLeast => current + COMPARISON_EPSILON >= threshold,
            Comparison::GreaterThan => current > threshold + COMPARISON_EPSILON,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::AtLeast => ">=",
            Comparison::GreaterThan => ">",
        }
    }
}

// ==========================================
// 建议类型 (Suggestion Type)
// ==========================================
// 顺序即强度: Switch < Upgrade < Training < Hire
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    Switch,   // 届出区分变更（无需人员措施）
    Upgrade,  // 人员区分变更
    Training, // 资格取得
    Hire,     // 增员
}

impl SuggestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionType::Switch => "switch",
            SuggestionType::Upgrade => "upgrade",
            SuggestionType::Training => "training",
            SuggestionType::Hire => "hire",
        }
    }
}

impl fmt::Display for SuggestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 建议优先级 (Suggestion Priority)
// ==========================================
// 顺序: High < Medium < Low（排序时 High 在前）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionPriority {
    High,
    Medium,
    Low,
}

impl SuggestionPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionPriority::High => "high",
            SuggestionPriority::Medium => "medium",
            SuggestionPriority::Low => "low",
        }
    }
}

impl fmt::Display for SuggestionPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
