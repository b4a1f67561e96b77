// ==========================================
// 加算判定引擎 - 职员名册字段映射器
// ==========================================
// 职责: 源字段（日文/英文表头）→ RawStaffRecord + 类型转换
// 红线: 只做形状转换，取值合法性由 RosterImporter 校验
// ==========================================

use crate::domain::staff::RawStaffRecord;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;

// ===== 标准字段 → 可接受的表头别名 =====
const STAFF_ID: &[&str] = &["職員ID", "職員番号", "staff_id", "id"];
const NAME: &[&str] = &["氏名", "職員名", "name"];
const EMPLOYMENT_STYLE: &[&str] = &["勤務形態", "employment_style"];
const WEEKLY_HOURS: &[&str] = &["週所定労働時間", "週勤務時間", "weekly_hours"];
const QUALIFICATIONS: &[&str] = &["保有資格", "資格", "qualifications"];
const YEARS_OF_EXPERIENCE: &[&str] = &["経験年数", "years_of_experience"];
const PERSONNEL_CATEGORY: &[&str] = &["人員区分", "personnel_category"];
const IS_ACTIVE: &[&str] = &["在籍", "is_active"];
const IS_MANAGER: &[&str] = &["管理者", "is_manager"];
const IS_SERVICE_MANAGER: &[&str] = &["児発管", "児童発達支援管理責任者", "is_service_manager"];

/// 资格列的分隔符
const QUALIFICATION_SEPARATORS: &[char] = &[',', '、', '/', '／', '，'];

pub struct RosterFieldMapper;

impl RosterFieldMapper {
    pub fn map_to_raw_staff(&self, row: &RawRow, row_number: usize) -> ImportResult<RawStaffRecord> {
        Ok(RawStaffRecord {
            staff_id: self.get_string(row, STAFF_ID),
            name: self.get_string(row, NAME),
            employment_style: self.get_string(row, EMPLOYMENT_STYLE),
            weekly_hours: self.parse_f64(row, WEEKLY_HOURS, row_number)?,
            qualifications: self.split_qualifications(row),
            years_of_experience: self.parse_f64(row, YEARS_OF_EXPERIENCE, row_number)?,
            personnel_category: self.get_string(row, PERSONNEL_CATEGORY),
            is_active: self.parse_bool(row, IS_ACTIVE, row_number)?,
            is_manager: self.parse_bool(row, IS_MANAGER, row_number)?,
            is_service_manager: self.parse_bool(row, IS_SERVICE_MANAGER, row_number)?,
            row_number,
        })
    }

    /// 提取字符串字段，按别名顺序取第一个非空值
    fn get_string(&self, row: &RawRow, aliases: &[&str]) -> Option<String> {
        aliases.iter().find_map(|alias| {
            row.get(*alias)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
    }

    fn parse_f64(&self, row: &RawRow, aliases: &[&str], row_number: usize) -> ImportResult<Option<f64>> {
        match self.get_string(row, aliases) {
            None => Ok(None),
            Some(value) => value
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ImportError::TypeConversionError {
                    row: row_number,
                    field: aliases[0].to_string(),
                    message: format!("无法解析为数值: {}", value),
                }),
        }
    }

    fn parse_bool(&self, row: &RawRow, aliases: &[&str], row_number: usize) -> ImportResult<Option<bool>> {
        match self.get_string(row, aliases) {
            None => Ok(None),
            Some(value) => match value.to_lowercase().as_str() {
                "1" | "true" | "yes" | "y" | "○" | "〇" | "はい" => Ok(Some(true)),
                "0" | "false" | "no" | "n" | "×" | "いいえ" | "-" => Ok(Some(false)),
                _ => Err(ImportError::TypeConversionError {
                    row: row_number,
                    field: aliases[0].to_string(),
                    message: format!("无法解析为真假值: {}", value),
                }),
            },
        }
    }

    fn split_qualifications(&self, row: &RawRow) -> Vec<String> {
        self.get_string(row, QUALIFICATIONS)
            .map(|raw| {
                raw.split(QUALIFICATION_SEPARATORS)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_map_japanese_headers() {
        let raw = row(&[
            ("職員ID", "S001"),
            ("氏名", "山田 花子"),
            ("勤務形態", "常勤専従"),
            ("週所定労働時間", "40"),
            ("保有資格", "保育士、社会福祉士/PT"),
            ("経験年数", "6.5"),
            ("人員区分", "加算"),
            ("管理者", "○"),
        ]);

        let record = RosterFieldMapper.map_to_raw_staff(&raw, 2).unwrap();
        assert_eq!(record.staff_id.as_deref(), Some("S001"));
        assert_eq!(record.weekly_hours, Some(40.0));
        assert_eq!(record.qualifications, vec!["保育士", "社会福祉士", "PT"]);
        assert_eq!(record.years_of_experience, Some(6.5));
        assert_eq!(record.is_manager, Some(true));
        assert_eq!(record.is_active, None);
        assert_eq!(record.row_number, 2);
    }

    #[test]
    fn test_map_english_headers() {
        let raw = row(&[("staff_id", "S9"), ("qualifications", "OT,ST")]);
        let record = RosterFieldMapper.map_to_raw_staff(&raw, 3).unwrap();
        assert_eq!(record.staff_id.as_deref(), Some("S9"));
        assert_eq!(record.qualifications, vec!["OT", "ST"]);
    }

    #[test]
    fn test_invalid_number_is_conversion_error() {
        let raw = row(&[("職員ID", "S001"), ("経験年数", "五年")]);
        let err = RosterFieldMapper.map_to_raw_staff(&raw, 4).unwrap_err();
        assert!(matches!(err, ImportError::TypeConversionError { row: 4, .. }));
    }
}
