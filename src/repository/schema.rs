// ==========================================
// 加算判定引擎 - 数据库 schema
// ==========================================
// 红线: 每个加算定义只有一个 open 版本（部分唯一索引）
// ==========================================

use crate::db::CURRENT_SCHEMA_VERSION;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection};

/// 初始化数据库 schema（幂等）
pub fn init_schema(conn: &Connection) -> RepositoryResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS law_revision (
            revision_id TEXT PRIMARY KEY,
            revision_date TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT
        );

        CREATE TABLE IF NOT EXISTS addition_definition (
            code TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            short_name TEXT NOT NULL,
            category TEXT NOT NULL,
            exclusive_group TEXT,
            priority INTEGER NOT NULL DEFAULT 0,
            applicable_services_json TEXT NOT NULL DEFAULT '[]',
            is_active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS addition_version (
            version_id TEXT PRIMARY KEY,
            addition_code TEXT NOT NULL REFERENCES addition_definition(code) ON DELETE CASCADE,
            version_number INTEGER NOT NULL,
            representation TEXT NOT NULL,
            units REAL,
            percentage_rate REAL,
            requirements_json TEXT NOT NULL DEFAULT '[]',
            max_times_per_day INTEGER,
            max_times_per_month INTEGER,
            effective_from TEXT NOT NULL,
            effective_to TEXT,
            revision_id TEXT REFERENCES law_revision(revision_id),
            notes TEXT,
            UNIQUE (addition_code, version_number)
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_addition_version_open
            ON addition_version(addition_code) WHERE effective_to IS NULL;

        CREATE TABLE IF NOT EXISTS facility_settings (
            facility_id TEXT PRIMARY KEY,
            child_capacity INTEGER NOT NULL,
            region_grade INTEGER NOT NULL,
            service_type TEXT NOT NULL,
            average_usage_days REAL NOT NULL,
            base_unit_count REAL NOT NULL,
            standard_weekly_hours REAL NOT NULL DEFAULT 40,
            current_additions_json TEXT NOT NULL DEFAULT '[]'
        );

        CREATE TABLE IF NOT EXISTS staff (
            facility_id TEXT NOT NULL,
            staff_id TEXT NOT NULL,
            name TEXT NOT NULL,
            employment_style TEXT NOT NULL,
            weekly_hours REAL NOT NULL,
            qualifications_json TEXT NOT NULL DEFAULT '[]',
            years_of_experience REAL NOT NULL DEFAULT 0,
            personnel_category TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_manager INTEGER NOT NULL DEFAULT 0,
            is_service_manager INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (facility_id, staff_id)
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        params![CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}
