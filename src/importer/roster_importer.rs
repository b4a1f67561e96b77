// ==========================================
// 加算判定引擎 - 职员名册导入器
// ==========================================
// 流程: 文件解析 → 字段映射 → DQ 校验 → StaffMember
// 红线: 名册在导入边界校验完毕，判定逻辑内不再做取值校验
// ==========================================

use crate::domain::staff::{DqLevel, DqViolation, QualificationCode, RawStaffRecord, StaffMember};
use crate::domain::types::{EmploymentStyle, PersonnelCategory};
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{RawRow, UniversalFileParser};
use crate::importer::roster_field_mapper::RosterFieldMapper;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 导入结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct RosterImportOutcome {
    /// 通过校验的职员（按文件行序）
    pub staff: Vec<StaffMember>,
    pub violations: Vec<DqViolation>,
}

impl RosterImportOutcome {
    pub fn rejected_rows(&self) -> usize {
        let rows: HashSet<usize> = self
            .violations
            .iter()
            .filter(|v| v.level == DqLevel::Error)
            .map(|v| v.row_number)
            .collect();
        rows.len()
    }
}

pub struct RosterImporter {
    parser: UniversalFileParser,
    mapper: RosterFieldMapper,
}

impl Default for RosterImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl RosterImporter {
    pub fn new() -> Self {
        Self {
            parser: UniversalFileParser,
            mapper: RosterFieldMapper,
        }
    }

    /// 从 CSV / Excel 文件导入
    #[instrument(skip(self, file_path), fields(path = %file_path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<RosterImportOutcome> {
        let rows = self.parser.parse(file_path)?;
        let outcome = self.import_rows(&rows);
        info!(
            accepted = outcome.staff.len(),
            rejected_rows = outcome.rejected_rows(),
            violations = outcome.violations.len(),
            "职员名册导入完成"
        );
        Ok(outcome)
    }

    /// 导入已解析的行（行号从 2 开始，对应表头下一行）
    pub fn import_rows(&self, rows: &[RawRow]) -> RosterImportOutcome {
        let mut outcome = RosterImportOutcome::default();
        let mut seen_ids = HashSet::new();

        for (idx, row) in rows.iter().enumerate() {
            let row_number = idx + 2;
            let raw = match self.mapper.map_to_raw_staff(row, row_number) {
                Ok(raw) => raw,
                Err(e) => {
                    outcome.violations.push(DqViolation {
                        row_number,
                        staff_id: None,
                        level: DqLevel::Error,
                        field: "row".to_string(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let (member, mut violations) = Self::validate(raw);
            if let Some(member) = member {
                if seen_ids.insert(member.id.clone()) {
                    outcome.staff.push(member);
                } else {
                    violations.push(DqViolation {
                        row_number,
                        staff_id: Some(member.id.clone()),
                        level: DqLevel::Error,
                        field: "staff_id".to_string(),
                        message: "职员ID重复（同一文件内）".to_string(),
                    });
                }
            }
            outcome.violations.extend(violations);
        }

        for v in outcome.violations.iter().filter(|v| v.level == DqLevel::Error) {
            warn!(row = v.row_number, field = %v.field, message = %v.message, "名册行被拒绝");
        }
        outcome
    }

    /// 校验单行
    ///
    /// # 规则
    /// - 勤务形态缺失/未知 → Error（行被拒绝）
    /// - 周劳动时间/经验年数为负 → Error
    /// - 非常勤缺少周劳动时间 → Error；常勤缺少 → Warning（按 0 保存，FTE 不依赖时间）
    /// - 职员ID缺失 → 生成 UUID（Warning）
    /// - 人员区分缺失 → 基準人員（Warning）；未知 → Error
    /// - 经验年数缺失 → 0（Warning）
    /// - 未知资格代码 → Info（原样保存，判定时不匹配）
    pub fn validate(raw: RawStaffRecord) -> (Option<StaffMember>, Vec<DqViolation>) {
        let row_number = raw.row_number;
        let mut violations = Vec::new();

        let staff_id = match raw.staff_id.clone() {
            Some(id) => id,
            None => {
                let generated = Uuid::new_v4().to_string();
                violations.push(DqViolation {
                    row_number,
                    staff_id: Some(generated.clone()),
                    level: DqLevel::Warning,
                    field: "staff_id".to_string(),
                    message: "职员ID缺失，已自动生成".to_string(),
                });
                generated
            }
        };

        let mut push = |level: DqLevel, field: &str, message: String| {
            violations.push(DqViolation {
                row_number,
                staff_id: Some(staff_id.clone()),
                level,
                field: field.to_string(),
                message,
            });
        };

        let employment_style = match raw.employment_style.as_deref() {
            None => {
                push(DqLevel::Error, "employment_style", "勤务形态缺失".to_string());
                None
            }
            Some(s) => match s.parse::<EmploymentStyle>() {
                Ok(style) => Some(style),
                Err(e) => {
                    push(DqLevel::Error, "employment_style", e);
                    None
                }
            },
        };

        let weekly_hours = match (raw.weekly_hours, employment_style) {
            (Some(h), _) if !h.is_finite() || h < 0.0 => {
                push(DqLevel::Error, "weekly_hours", format!("周劳动时间非法: {}", h));
                None
            }
            (Some(h), _) => Some(h),
            (None, Some(EmploymentStyle::PartTime)) => {
                push(DqLevel::Error, "weekly_hours", "非常勤职员缺少周劳动时间".to_string());
                None
            }
            (None, _) => {
                push(DqLevel::Warning, "weekly_hours", "周劳动时间缺失，按 0 保存".to_string());
                Some(0.0)
            }
        };

        let years_of_experience = match raw.years_of_experience {
            Some(y) if !y.is_finite() || y < 0.0 => {
                push(DqLevel::Error, "years_of_experience", format!("经验年数非法: {}", y));
                None
            }
            Some(y) => Some(y),
            None => {
                push(DqLevel::Warning, "years_of_experience", "经验年数缺失，按 0 处理".to_string());
                Some(0.0)
            }
        };

        let personnel_category = match raw.personnel_category.as_deref() {
            None => {
                push(
                    DqLevel::Warning,
                    "personnel_category",
                    "人员区分缺失，按基準人員处理".to_string(),
                );
                Some(PersonnelCategory::Standard)
            }
            Some(s) => match s.parse::<PersonnelCategory>() {
                Ok(category) => Some(category),
                Err(e) => {
                    push(DqLevel::Error, "personnel_category", e);
                    None
                }
            },
        };

        for code in &raw.qualifications {
            if QualificationCode::from_raw(code).is_none() {
                push(DqLevel::Info, "qualifications", format!("未知资格代码: {}", code));
            }
        }

        let member = match (employment_style, weekly_hours, years_of_experience, personnel_category) {
            (Some(employment_style), Some(weekly_hours), Some(years_of_experience), Some(personnel_category)) => {
                Some(StaffMember {
                    name: raw.name.unwrap_or_else(|| staff_id.clone()),
                    id: staff_id,
                    employment_style,
                    weekly_hours,
                    qualifications: raw.qualifications.into_iter().collect(),
                    years_of_experience,
                    personnel_category,
                    is_active: raw.is_active.unwrap_or(true),
                    is_manager: raw.is_manager.unwrap_or(false),
                    is_service_manager: raw.is_service_manager.unwrap_or(false),
                })
            }
            _ => None,
        };

        (member, violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str) -> RawStaffRecord {
        RawStaffRecord {
            staff_id: Some(id.to_string()),
            name: Some("山田".to_string()),
            employment_style: Some("常勤専従".to_string()),
            weekly_hours: Some(40.0),
            qualifications: vec!["保育士".to_string()],
            years_of_experience: Some(3.0),
            personnel_category: Some("加算".to_string()),
            row_number: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_complete_row() {
        let (member, violations) = RosterImporter::validate(raw("S001"));
        let member = member.unwrap();
        assert!(violations.is_empty());
        assert_eq!(member.personnel_category, PersonnelCategory::Addition);
        assert!(member.is_active);
        assert!(member.qualifications.contains("保育士"));
    }

    #[test]
    fn test_missing_employment_style_rejects_row() {
        let mut record = raw("S001");
        record.employment_style = None;
        let (member, violations) = RosterImporter::validate(record);
        assert!(member.is_none());
        assert_eq!(violations[0].level, DqLevel::Error);
    }

    #[test]
    fn test_part_time_requires_hours() {
        let mut record = raw("S001");
        record.employment_style = Some("非常勤".to_string());
        record.weekly_hours = None;
        let (member, _) = RosterImporter::validate(record);
        assert!(member.is_none());
    }

    #[test]
    fn test_missing_id_generates_uuid() {
        let mut record = raw("S001");
        record.staff_id = None;
        let (member, violations) = RosterImporter::validate(record);
        let member = member.unwrap();
        assert!(Uuid::parse_str(&member.id).is_ok());
        assert_eq!(violations[0].level, DqLevel::Warning);
    }

    #[test]
    fn test_unknown_qualification_is_info_and_kept() {
        let mut record = raw("S001");
        record.qualifications.push("ヘルパー2級".to_string());
        let (member, violations) = RosterImporter::validate(record);
        assert!(member.unwrap().qualifications.contains("ヘルパー2級"));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].level, DqLevel::Info);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let rows: Vec<RawRow> = ["S001", "S001"]
            .iter()
            .map(|id| {
                [("職員ID", *id), ("勤務形態", "常勤専従"), ("経験年数", "1"), ("人員区分", "基準")]
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            })
            .collect();

        let outcome = RosterImporter::new().import_rows(&rows);
        assert_eq!(outcome.staff.len(), 1);
        assert_eq!(outcome.rejected_rows(), 1);
    }
}
