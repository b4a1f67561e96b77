// ==========================================
// 加算判定引擎 - 判定结果（派生，不持久化）
// ==========================================
// 红线: 每个加算必须输出 reason（可解释性）
// 红线: 数据异常只记录，不抛出
// ==========================================

use crate::domain::types::{AdditionCategory, Comparison, RepresentationKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// DataAnomaly - 数据异常（非致命）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataAnomaly {
    /// 同一日期命中多个版本（取最大 version_number）
    OverlappingVersions {
        addition_code: String,
        version_numbers: Vec<i32>,
        chosen: i32,
    },
    /// 参照日无有效版本（从结果中排除）
    NoEffectiveVersion {
        addition_code: String,
        reference_date: NaiveDate,
    },
    /// 算定方式与数值不一致（按 0 处理）
    ConfigurationGap {
        addition_code: String,
        version_number: i32,
        detail: String,
    },
    /// 无法识别的资格代码（不参与任何匹配）
    UnknownQualification { staff_id: String, raw_code: String },
    /// 同一定义存在多个 open 版本
    MultipleOpenVersions {
        addition_code: String,
        version_numbers: Vec<i32>,
    },
    /// 同一定义不存在 open 版本
    MissingOpenVersion { addition_code: String },
}

impl fmt::Display for DataAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataAnomaly::OverlappingVersions {
                addition_code,
                version_numbers,
                chosen,
            } => write!(
                f,
                "OVERLAPPING_VERSIONS: {} versions={:?} chosen={}",
                addition_code, version_numbers, chosen
            ),
            DataAnomaly::NoEffectiveVersion {
                addition_code,
                reference_date,
            } => write!(
                f,
                "NO_EFFECTIVE_VERSION: {} reference_date={}",
                addition_code, reference_date
            ),
            DataAnomaly::ConfigurationGap {
                addition_code,
                version_number,
                detail,
            } => write!(
                f,
                "CONFIGURATION_GAP: {} v{}: {}",
                addition_code, version_number, detail
            ),
            DataAnomaly::UnknownQualification { staff_id, raw_code } => write!(
                f,
                "UNKNOWN_QUALIFICATION: staff={} code={}",
                staff_id, raw_code
            ),
            DataAnomaly::MultipleOpenVersions {
                addition_code,
                version_numbers,
            } => write!(
                f,
                "MULTIPLE_OPEN_VERSIONS: {} versions={:?}",
                addition_code, version_numbers
            ),
            DataAnomaly::MissingOpenVersion { addition_code } => {
                write!(f, "MISSING_OPEN_VERSION: {}", addition_code)
            }
        }
    }
}

// ==========================================
// GapHint - 要件缺口提示（供 Optimization Advisor 使用）
// ==========================================
// value_if_upgraded: 去掉人员区分约束后的指标值
// value_if_trained:  去掉资格约束后的指标值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapHint {
    pub actionable: bool,
    pub value_if_upgraded: f64,
    pub value_if_trained: f64,
}

// ==========================================
// RequirementStatus - 要件充足状况
// ==========================================
// current/required 为主要件的数值；met 为主要件或任一替代要件满足
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementStatus {
    pub name: String,
    pub metric_kind: String,
    pub comparison: Comparison,
    pub current: f64,
    pub required: f64,
    pub met: bool,
    pub detail: Option<String>,
    pub gap: GapHint,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<RequirementStatus>,
}

impl RequirementStatus {
    /// 距离阈值的绝对差（已满足为 0）
    pub fn shortfall(&self) -> f64 {
        if self.met {
            0.0
        } else {
            (self.required - self.current).max(0.0)
        }
    }

    /// 相对距离 ∈ [0, 1]（阈值为 0 时未满足即视为 1）
    pub fn distance(&self) -> f64 {
        if self.met {
            return 0.0;
        }
        if self.required <= 0.0 {
            return 1.0;
        }
        (self.shortfall() / self.required).clamp(0.0, 1.0)
    }
}

// ==========================================
// JudgmentResult - 单个加算的判定结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentResult {
    pub addition_code: String,
    pub name: String,
    pub short_name: String,
    pub category: AdditionCategory,
    pub exclusive_group: Option<String>,
    pub priority: i32,

    // ===== 版本信息 =====
    pub version_number: i32,
    pub revision_id: Option<String>,
    pub representation: RepresentationKind,
    pub units: f64,           // 单位数（Percentage 时为 0）
    pub percentage_rate: f64, // 百分比（Units 时为 0）
    pub max_times_per_day: Option<u32>,
    pub max_times_per_month: Option<u32>,

    // ===== 判定 =====
    pub is_eligible: bool,
    pub is_selected: bool, // 计入收益
    pub is_current: bool,  // 事业所当前已届出
    pub requirements: Vec<RequirementStatus>,
    pub reason: String,
    pub anomalies: Vec<DataAnomaly>,
}

impl JudgmentResult {
    pub fn counts_toward_revenue(&self) -> bool {
        self.is_eligible && self.is_selected
    }

    /// 比较用数值：单位数或百分比
    pub fn value(&self) -> f64 {
        match self.representation {
            RepresentationKind::Units => self.units,
            RepresentationKind::Percentage => self.percentage_rate,
        }
    }

    pub fn unmet_requirements(&self) -> impl Iterator<Item = &RequirementStatus> {
        self.requirements.iter().filter(|r| !r.met)
    }
}

// ==========================================
// JudgmentReport - Judgment API 输出
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentReport {
    pub reference_date: NaiveDate,
    pub results: Vec<JudgmentResult>,
    /// 全部异常（名册 + 被排除的加算 + 各结果内联异常）
    pub anomalies: Vec<DataAnomaly>,
}

impl JudgmentReport {
    pub fn find(&self, code: &str) -> Option<&JudgmentResult> {
        self.results.iter().find(|r| r.addition_code == code)
    }

    pub fn selected(&self) -> impl Iterator<Item = &JudgmentResult> {
        self.results.iter().filter(|r| r.counts_toward_revenue())
    }

    /// 按排他组分组（None = 无组）
    pub fn grouped(&self) -> BTreeMap<Option<String>, Vec<&JudgmentResult>> {
        let mut groups: BTreeMap<Option<String>, Vec<&JudgmentResult>> = BTreeMap::new();
        for result in &self.results {
            groups
                .entry(result.exclusive_group.clone())
                .or_default()
                .push(result);
        }
        groups
    }
}
