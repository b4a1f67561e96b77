// ==========================================
// 加算判定引擎 - 职员数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（资格代码原样保存，识别在 Roster Normalizer）
// ==========================================

use crate::domain::staff::StaffMember;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{parse_json, parse_text, to_json};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// 职员仓储
/// 职责: 管理 staff 表（按事业所）
pub struct StaffRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StaffRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 批量插入或更新职员
    ///
    /// # 返回
    /// - Ok(usize): 写入件数
    pub fn upsert_batch(&self, facility_id: &str, staff: &[StaffMember]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for member in staff {
            count += tx.execute(
                r#"
                INSERT INTO staff (
                    facility_id, staff_id, name, employment_style, weekly_hours,
                    qualifications_json, years_of_experience, personnel_category,
                    is_active, is_manager, is_service_manager
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                ON CONFLICT(facility_id, staff_id) DO UPDATE SET
                    name = excluded.name,
                    employment_style = excluded.employment_style,
                    weekly_hours = excluded.weekly_hours,
                    qualifications_json = excluded.qualifications_json,
                    years_of_experience = excluded.years_of_experience,
                    personnel_category = excluded.personnel_category,
                    is_active = excluded.is_active,
                    is_manager = excluded.is_manager,
                    is_service_manager = excluded.is_service_manager
                "#,
                params![
                    facility_id,
                    member.id,
                    member.name,
                    member.employment_style.as_str(),
                    member.weekly_hours,
                    to_json(&member.qualifications)?,
                    member.years_of_experience,
                    member.personnel_category.as_str(),
                    member.is_active,
                    member.is_manager,
                    member.is_service_manager,
                ],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    /// 查询事业所全部职员（含退职者，按 staff_id 升序）
    pub fn find_by_facility(&self, facility_id: &str) -> RepositoryResult<Vec<StaffMember>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT staff_id, name, employment_style, weekly_hours, qualifications_json,
                   years_of_experience, personnel_category, is_active, is_manager,
                   is_service_manager
            FROM staff
            WHERE facility_id = ?1
            ORDER BY staff_id
            "#,
        )?;

        let staff = stmt
            .query_map(params![facility_id], map_staff)?
            .collect::<SqliteResult<Vec<StaffMember>>>()?;
        Ok(staff)
    }

    /// 退职处理（is_active = 0）
    pub fn deactivate(&self, facility_id: &str, staff_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE staff SET is_active = 0 WHERE facility_id = ?1 AND staff_id = ?2",
            params![facility_id, staff_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "StaffMember".to_string(),
                id: staff_id.to_string(),
            });
        }
        Ok(())
    }
}

fn map_staff(row: &Row<'_>) -> SqliteResult<StaffMember> {
    let qualifications_json: String = row.get(4)?;
    let qualifications: BTreeSet<String> = parse_json(4, &qualifications_json)?;
    Ok(StaffMember {
        id: row.get(0)?,
        name: row.get(1)?,
        employment_style: parse_text(2, &row.get::<_, String>(2)?)?,
        weekly_hours: row.get(3)?,
        qualifications,
        years_of_experience: row.get(5)?,
        personnel_category: parse_text(6, &row.get::<_, String>(6)?)?,
        is_active: row.get(7)?,
        is_manager: row.get(8)?,
        is_service_manager: row.get(9)?,
    })
}
