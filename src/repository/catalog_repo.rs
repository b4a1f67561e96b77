// ==========================================
// 加算判定引擎 - 加算目录仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 登记新版本时，关闭现行版本与插入新版本在同一事务内完成
// ==========================================

use crate::domain::catalog::{AdditionCatalog, AdditionDefinition, AdditionVersion, LawRevision};
use crate::domain::types::ServiceType;
use crate::engine::rule_resolver::TemporalRuleResolver;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{parse_json, parse_text, to_json};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};
use tracing::info;

const VERSION_COLUMNS: &str = r#"
    version_id, addition_code, version_number, representation, units, percentage_rate,
    requirements_json, max_times_per_day, max_times_per_month, effective_from,
    effective_to, revision_id, notes
"#;

// ==========================================
// CatalogRepository - 加算目录仓储
// ==========================================

/// 加算目录仓储
/// 职责: 管理 law_revision / addition_definition / addition_version 表
pub struct CatalogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CatalogRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ===== 法改正 =====

    pub fn insert_law_revision(&self, revision: &LawRevision) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        upsert_law_revision(&conn, revision)?;
        Ok(())
    }

    // ===== 加算定义 =====

    /// 插入或更新加算定义
    pub fn upsert_definition(&self, definition: &AdditionDefinition) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        upsert_definition(&conn, definition)?;
        Ok(())
    }

    pub fn find_definition(&self, code: &str) -> RepositoryResult<Option<AdditionDefinition>> {
        let conn = self.get_conn()?;
        let definition = conn
            .query_row(
                r#"
                SELECT code, name, short_name, category, exclusive_group, priority,
                       applicable_services_json, is_active
                FROM addition_definition
                WHERE code = ?1
                "#,
                params![code],
                map_definition,
            )
            .optional()?;
        Ok(definition)
    }

    // ===== 加算版本 =====

    /// 查询某加算的全部版本（按版本号升序）
    pub fn find_versions(&self, addition_code: &str) -> RepositoryResult<Vec<AdditionVersion>> {
        let conn = self.get_conn()?;
        load_versions(&conn, Some(addition_code))
    }

    /// 登记新版本
    ///
    /// # 规则
    /// - 新版本必须为 open（effective_to 为空）
    /// - 现行版本的 effective_to 设为 new.effective_from − 1 日
    /// - version_number 由仓储分配（现有最大 + 1）
    ///
    /// # 返回
    /// - Ok(AdditionVersion): 实际写入的新版本
    /// - Err(NotFound): 加算定义不存在
    /// - Err(VersionConflict): 生效日不晚于现行版本
    pub fn add_version(&self, version: &AdditionVersion) -> RepositoryResult<AdditionVersion> {
        if version.effective_to.is_some() {
            return Err(RepositoryError::ValidationError(format!(
                "新版本必须为现行版本（effective_to 为空）: {}",
                version.version_id
            )));
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let exists: bool = tx
            .query_row(
                "SELECT 1 FROM addition_definition WHERE code = ?1",
                params![version.addition_code],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if !exists {
            return Err(RepositoryError::NotFound {
                entity: "AdditionDefinition".to_string(),
                id: version.addition_code.clone(),
            });
        }

        let existing = load_versions(&tx, Some(&version.addition_code))?;
        let existing_refs: Vec<&AdditionVersion> = existing.iter().collect();
        let plan = TemporalRuleResolver::plan_new_version(
            &version.addition_code,
            &existing_refs,
            version.effective_from,
        )?;

        if let (Some(close_id), Some(close_on)) = (&plan.close_version_id, plan.close_on) {
            tx.execute(
                "UPDATE addition_version SET effective_to = ?1 WHERE version_id = ?2",
                params![close_on, close_id],
            )?;
        }

        let mut stored = version.clone();
        stored.version_number = plan.next_version_number;
        insert_version(&tx, &stored)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(
            addition_code = %stored.addition_code,
            version_number = stored.version_number,
            closed = ?plan.close_version_id,
            "登记加算新版本"
        );
        Ok(stored)
    }

    // ===== 目录整体 =====

    /// 读取完整目录
    pub fn load_catalog(&self) -> RepositoryResult<AdditionCatalog> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT revision_id, revision_date, name, description FROM law_revision ORDER BY revision_date, revision_id",
        )?;
        let law_revisions = stmt
            .query_map([], |row| {
                Ok(LawRevision {
                    revision_id: row.get(0)?,
                    revision_date: row.get(1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<LawRevision>>>()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT code, name, short_name, category, exclusive_group, priority,
                   applicable_services_json, is_active
            FROM addition_definition
            ORDER BY code
            "#,
        )?;
        let definitions = stmt
            .query_map([], map_definition)?
            .collect::<SqliteResult<Vec<AdditionDefinition>>>()?;

        let versions = load_versions(&conn, None)?;

        Ok(AdditionCatalog {
            law_revisions,
            definitions,
            versions,
        })
    }

    /// 整体写入目录（导入 / 初始化用，同一事务）
    ///
    /// 已存在的同 id 记录被覆盖；不做版本关闭处理
    pub fn save_catalog(&self, catalog: &AdditionCatalog) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        for revision in &catalog.law_revisions {
            upsert_law_revision(&tx, revision)?;
        }
        for definition in &catalog.definitions {
            upsert_definition(&tx, definition)?;
        }
        // 先删后插，避免 open 版本唯一索引在覆盖途中冲突
        for version in &catalog.versions {
            tx.execute(
                "DELETE FROM addition_version WHERE version_id = ?1 OR (addition_code = ?2 AND version_number = ?3)",
                params![version.version_id, version.addition_code, version.version_number],
            )?;
        }
        for version in &catalog.versions {
            insert_version(&tx, version)?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(catalog.versions.len())
    }
}

// ==========================================
// 内部 SQL 工具
// ==========================================

fn upsert_law_revision(conn: &Connection, revision: &LawRevision) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO law_revision (revision_id, revision_date, name, description)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(revision_id) DO UPDATE SET
            revision_date = excluded.revision_date,
            name = excluded.name,
            description = excluded.description
        "#,
        params![
            revision.revision_id,
            revision.revision_date,
            revision.name,
            revision.description,
        ],
    )?;
    Ok(())
}

fn upsert_definition(conn: &Connection, definition: &AdditionDefinition) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO addition_definition (
            code, name, short_name, category, exclusive_group, priority,
            applicable_services_json, is_active
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(code) DO UPDATE SET
            name = excluded.name,
            short_name = excluded.short_name,
            category = excluded.category,
            exclusive_group = excluded.exclusive_group,
            priority = excluded.priority,
            applicable_services_json = excluded.applicable_services_json,
            is_active = excluded.is_active
        "#,
        params![
            definition.code,
            definition.name,
            definition.short_name,
            definition.category.as_str(),
            definition.exclusive_group,
            definition.priority,
            to_json(&definition.applicable_services)?,
            definition.is_active,
        ],
    )?;
    Ok(())
}

fn insert_version(conn: &Connection, version: &AdditionVersion) -> RepositoryResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO addition_version ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            VERSION_COLUMNS
        ),
        params![
            version.version_id,
            version.addition_code,
            version.version_number,
            version.representation.as_str(),
            version.units,
            version.percentage_rate,
            to_json(&version.requirements)?,
            version.max_times_per_day,
            version.max_times_per_month,
            version.effective_from,
            version.effective_to,
            version.revision_id,
            version.notes,
        ],
    )?;
    Ok(())
}

fn load_versions(conn: &Connection, addition_code: Option<&str>) -> RepositoryResult<Vec<AdditionVersion>> {
    let sql = format!(
        "SELECT {} FROM addition_version WHERE (?1 IS NULL OR addition_code = ?1) ORDER BY addition_code, version_number",
        VERSION_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let versions = stmt
        .query_map(params![addition_code], map_version)?
        .collect::<SqliteResult<Vec<AdditionVersion>>>()?;
    Ok(versions)
}

fn map_definition(row: &Row<'_>) -> SqliteResult<AdditionDefinition> {
    let services_json: String = row.get(6)?;
    let applicable_services: Vec<ServiceType> = parse_json(6, &services_json)?;
    Ok(AdditionDefinition {
        code: row.get(0)?,
        name: row.get(1)?,
        short_name: row.get(2)?,
        category: parse_text(3, &row.get::<_, String>(3)?)?,
        exclusive_group: row.get(4)?,
        priority: row.get(5)?,
        applicable_services,
        is_active: row.get(7)?,
    })
}

fn map_version(row: &Row<'_>) -> SqliteResult<AdditionVersion> {
    let requirements_json: String = row.get(6)?;
    Ok(AdditionVersion {
        version_id: row.get(0)?,
        addition_code: row.get(1)?,
        version_number: row.get(2)?,
        representation: parse_text(3, &row.get::<_, String>(3)?)?,
        units: row.get(4)?,
        percentage_rate: row.get(5)?,
        requirements: parse_json(6, &requirements_json)?,
        max_times_per_day: row.get(7)?,
        max_times_per_month: row.get(8)?,
        effective_from: row.get::<_, NaiveDate>(9)?,
        effective_to: row.get::<_, Option<NaiveDate>>(10)?,
        revision_id: row.get(11)?,
        notes: row.get(12)?,
    })
}
