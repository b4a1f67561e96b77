// ==========================================
// 加算判定引擎 - Temporal Rule Resolver
// ==========================================
// 职责: 按参照日选择加算定义的有效版本
// 红线: 不抛错，重叠/缺失只记录异常
// 红线: 任意时点每个定义只有一个 open 版本
// ==========================================

use crate::domain::catalog::{AdditionCatalog, AdditionVersion};
use crate::domain::judgment::DataAnomaly;
use chrono::{Duration, NaiveDate};
use thiserror::Error;
use tracing::warn;

/// 版本解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct VersionResolution<'a> {
    /// None = 参照日无有效版本（加算从判定列表排除）
    pub version: Option<&'a AdditionVersion>,
    pub anomaly: Option<DataAnomaly>,
}

/// 新版本登记计划（供管理端使用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPlan {
    /// 需要关闭的现行版本
    pub close_version_id: Option<String>,
    /// 现行版本的 effective_to（= 新版本 effective_from − 1 日）
    pub close_on: Option<NaiveDate>,
    pub next_version_number: i32,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionPlanError {
    #[error("新版本生效日 {new_from} 必须晚于现行版本 v{version_number} 的生效日 {open_from}")]
    NotAfterOpenVersion {
        new_from: NaiveDate,
        open_from: NaiveDate,
        version_number: i32,
    },

    #[error("新版本生效日 {new_from} 与已关闭版本重叠（最后失效日 {last_to}）")]
    OverlapsClosedVersion {
        new_from: NaiveDate,
        last_to: NaiveDate,
    },

    #[error("加算 {addition_code} 存在多个 open 版本: {version_numbers:?}")]
    MultipleOpenVersions {
        addition_code: String,
        version_numbers: Vec<i32>,
    },
}

// ==========================================
// TemporalRuleResolver - 纯函数工具类
// ==========================================
pub struct TemporalRuleResolver;

impl TemporalRuleResolver {
    /// 选择参照日的有效版本
    ///
    /// # 规则
    /// - effective_from ≤ D 且 (effective_to 为空 或 effective_to ≥ D)
    /// - 命中多个 → 取 version_number 最大者，记录 OverlappingVersions
    /// - 命中 0 个 → version=None，记录 NoEffectiveVersion
    pub fn resolve<'a>(
        addition_code: &str,
        versions: &[&'a AdditionVersion],
        reference_date: NaiveDate,
    ) -> VersionResolution<'a> {
        let mut candidates: Vec<&'a AdditionVersion> = versions
            .iter()
            .copied()
            .filter(|v| v.is_effective_on(reference_date))
            .collect();

        // version_number 降序，同号时按 effective_from / version_id 保证确定性
        candidates.sort_by(|a, b| {
            b.version_number
                .cmp(&a.version_number)
                .then_with(|| b.effective_from.cmp(&a.effective_from))
                .then_with(|| a.version_id.cmp(&b.version_id))
        });

        match candidates.as_slice() {
            [] => VersionResolution {
                version: None,
                anomaly: Some(DataAnomaly::NoEffectiveVersion {
                    addition_code: addition_code.to_string(),
                    reference_date,
                }),
            },
            [only] => VersionResolution {
                version: Some(*only),
                anomaly: None,
            },
            [chosen, ..] => {
                let mut version_numbers: Vec<i32> =
                    candidates.iter().map(|v| v.version_number).collect();
                version_numbers.sort_unstable();
                warn!(
                    addition_code = addition_code,
                    ?version_numbers,
                    chosen = chosen.version_number,
                    "参照日命中多个版本，取最大版本号"
                );
                VersionResolution {
                    version: Some(*chosen),
                    anomaly: Some(DataAnomaly::OverlappingVersions {
                        addition_code: addition_code.to_string(),
                        version_numbers,
                        chosen: chosen.version_number,
                    }),
                }
            }
        }
    }

    /// 检查目录的 "每个定义一个 open 版本" 不变量
    pub fn check_open_versions(catalog: &AdditionCatalog) -> Vec<DataAnomaly> {
        let mut anomalies = Vec::new();

        for definition in &catalog.definitions {
            let mut open: Vec<i32> = catalog
                .versions_of(&definition.code)
                .into_iter()
                .filter(|v| v.is_open())
                .map(|v| v.version_number)
                .collect();
            open.sort_unstable();

            match open.len() {
                0 => anomalies.push(DataAnomaly::MissingOpenVersion {
                    addition_code: definition.code.clone(),
                }),
                1 => {}
                _ => anomalies.push(DataAnomaly::MultipleOpenVersions {
                    addition_code: definition.code.clone(),
                    version_numbers: open,
                }),
            }
        }

        anomalies
    }

    /// 计算登记新版本时的关闭计划
    ///
    /// # 规则
    /// - 现行版本 effective_to = new_from − 1 日
    /// - new_from 必须晚于现行版本的 effective_from
    /// - 无现行版本时，new_from 必须晚于已关闭版本的最后失效日
    /// - next_version_number = 现有最大版本号 + 1
    pub fn plan_new_version(
        addition_code: &str,
        existing: &[&AdditionVersion],
        new_from: NaiveDate,
    ) -> Result<VersionPlan, VersionPlanError> {
        let open: Vec<&AdditionVersion> = existing.iter().copied().filter(|v| v.is_open()).collect();
        let next_version_number = existing
            .iter()
            .map(|v| v.version_number)
            .max()
            .unwrap_or(0)
            + 1;

        match open.as_slice() {
            [] => {
                if let Some(last_to) = existing.iter().filter_map(|v| v.effective_to).max() {
                    if new_from <= last_to {
                        return Err(VersionPlanError::OverlapsClosedVersion { new_from, last_to });
                    }
                }
                Ok(VersionPlan {
                    close_version_id: None,
                    close_on: None,
                    next_version_number,
                })
            }
            [current] => {
                if new_from <= current.effective_from {
                    return Err(VersionPlanError::NotAfterOpenVersion {
                        new_from,
                        open_from: current.effective_from,
                        version_number: current.version_number,
                    });
                }
                Ok(VersionPlan {
                    close_version_id: Some(current.version_id.clone()),
                    close_on: Some(new_from - Duration::days(1)),
                    next_version_number,
                })
            }
            _ => {
                let mut version_numbers: Vec<i32> = open.iter().map(|v| v.version_number).collect();
                version_numbers.sort_unstable();
                Err(VersionPlanError::MultipleOpenVersions {
                    addition_code: addition_code.to_string(),
                    version_numbers,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RepresentationKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn version(number: i32, from: NaiveDate, to: Option<NaiveDate>) -> AdditionVersion {
        AdditionVersion {
            version_id: format!("A-v{}", number),
            addition_code: "A".to_string(),
            version_number: number,
            representation: RepresentationKind::Units,
            units: Some(100.0 + number as f64),
            percentage_rate: None,
            requirements: vec![],
            max_times_per_day: None,
            max_times_per_month: None,
            effective_from: from,
            effective_to: to,
            revision_id: None,
            notes: None,
        }
    }

    #[test]
    fn test_resolve_picks_version_for_date() {
        let v1 = version(1, date(2021, 4, 1), Some(date(2024, 3, 31)));
        let v2 = version(2, date(2024, 4, 1), None);
        let versions = vec![&v1, &v2];

        let old = TemporalRuleResolver::resolve("A", &versions, date(2023, 10, 1));
        assert_eq!(old.version.map(|v| v.version_number), Some(1));
        assert!(old.anomaly.is_none());

        // 边界日（闭区间）
        let boundary = TemporalRuleResolver::resolve("A", &versions, date(2024, 3, 31));
        assert_eq!(boundary.version.map(|v| v.version_number), Some(1));
        let new = TemporalRuleResolver::resolve("A", &versions, date(2024, 4, 1));
        assert_eq!(new.version.map(|v| v.version_number), Some(2));
    }

    #[test]
    fn test_resolve_overlap_picks_highest_version() {
        let v1 = version(1, date(2021, 4, 1), None);
        let v2 = version(2, date(2024, 4, 1), None);
        let versions = vec![&v2, &v1];

        let resolution = TemporalRuleResolver::resolve("A", &versions, date(2024, 6, 1));
        assert_eq!(resolution.version.map(|v| v.version_number), Some(2));
        assert_eq!(
            resolution.anomaly,
            Some(DataAnomaly::OverlappingVersions {
                addition_code: "A".to_string(),
                version_numbers: vec![1, 2],
                chosen: 2,
            })
        );
    }

    #[test]
    fn test_resolve_future_only_version_is_excluded() {
        let v1 = version(1, date(2030, 4, 1), None);
        let resolution = TemporalRuleResolver::resolve("A", &[&v1], date(2024, 6, 1));
        assert!(resolution.version.is_none());
        assert!(matches!(
            resolution.anomaly,
            Some(DataAnomaly::NoEffectiveVersion { .. })
        ));
    }

    #[test]
    fn test_plan_new_version_closes_open_version() {
        let v1 = version(1, date(2021, 4, 1), None);
        let plan = TemporalRuleResolver::plan_new_version("A", &[&v1], date(2024, 4, 1)).unwrap();
        assert_eq!(plan.close_version_id.as_deref(), Some("A-v1"));
        assert_eq!(plan.close_on, Some(date(2024, 3, 31)));
        assert_eq!(plan.next_version_number, 2);
    }

    #[test]
    fn test_plan_new_version_rejects_non_increasing_date() {
        let v1 = version(1, date(2024, 4, 1), None);
        let err = TemporalRuleResolver::plan_new_version("A", &[&v1], date(2024, 4, 1)).unwrap_err();
        assert!(matches!(err, VersionPlanError::NotAfterOpenVersion { .. }));

        let closed = version(1, date(2021, 4, 1), Some(date(2024, 3, 31)));
        let err = TemporalRuleResolver::plan_new_version("A", &[&closed], date(2024, 3, 1)).unwrap_err();
        assert!(matches!(err, VersionPlanError::OverlapsClosedVersion { .. }));
    }
}
