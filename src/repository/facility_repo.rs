// ==========================================
// 加算判定引擎 - 事业所设定仓储
// ==========================================

use crate::domain::facility::FacilitySettings;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{parse_json, parse_text, to_json};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// 事业所设定仓储
pub struct FacilitySettingsRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FacilitySettingsRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn upsert(&self, settings: &FacilitySettings) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO facility_settings (
                facility_id, child_capacity, region_grade, service_type,
                average_usage_days, base_unit_count, standard_weekly_hours,
                current_additions_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(facility_id) DO UPDATE SET
                child_capacity = excluded.child_capacity,
                region_grade = excluded.region_grade,
                service_type = excluded.service_type,
                average_usage_days = excluded.average_usage_days,
                base_unit_count = excluded.base_unit_count,
                standard_weekly_hours = excluded.standard_weekly_hours,
                current_additions_json = excluded.current_additions_json
            "#,
            params![
                settings.facility_id,
                settings.child_capacity,
                settings.region_grade,
                settings.service_type.as_str(),
                settings.average_usage_days,
                settings.base_unit_count,
                settings.standard_weekly_hours,
                to_json(&settings.current_additions)?,
            ],
        )?;
        Ok(())
    }

    pub fn find(&self, facility_id: &str) -> RepositoryResult<Option<FacilitySettings>> {
        let conn = self.get_conn()?;
        let settings = conn
            .query_row(
                r#"
                SELECT facility_id, child_capacity, region_grade, service_type,
                       average_usage_days, base_unit_count, standard_weekly_hours,
                       current_additions_json
                FROM facility_settings
                WHERE facility_id = ?1
                "#,
                params![facility_id],
                |row| {
                    let current_json: String = row.get(7)?;
                    let current_additions: BTreeSet<String> = parse_json(7, &current_json)?;
                    Ok(FacilitySettings {
                        facility_id: row.get(0)?,
                        child_capacity: row.get(1)?,
                        region_grade: row.get(2)?,
                        service_type: parse_text(3, &row.get::<_, String>(3)?)?,
                        average_usage_days: row.get(4)?,
                        base_unit_count: row.get(5)?,
                        standard_weekly_hours: row.get(6)?,
                        current_additions,
                    })
                },
            )
            .optional()?;
        Ok(settings)
    }
}
