// ==========================================
// 加算判定引擎 - 事业所 API（SQLite 持久化）
// ==========================================
// 职责: 加算目录 / 事业所设定 / 职员名册 的持久化入口，及基于库内数据的判定
// 红线: 仓储 / 导入错误统一转换为 ApiError，SQL 细节不越过本层
// ==========================================

use crate::api::addition_api::{AdditionApi, PipelineOutput};
use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, EngineConfig};
use crate::db::open_sqlite_connection;
use crate::domain::catalog::{AdditionCatalog, AdditionVersion};
use crate::domain::facility::FacilitySettings;
use crate::domain::judgment::JudgmentReport;
use crate::domain::simulation::SimulationParams;
use crate::domain::staff::StaffMember;
use crate::importer::{standard_catalog, CatalogLoader, RosterImportOutcome, RosterImporter};
use crate::perf::install_sqlite_tracing;
use crate::repository::{init_schema, CatalogRepository, FacilitySettingsRepository, StaffRepository};
use chrono::NaiveDate;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};

/// 事业所API
pub struct FacilityApi {
    config_manager: ConfigManager,
    catalog_repo: CatalogRepository,
    facility_repo: FacilitySettingsRepository,
    staff_repo: StaffRepository,
}

impl FacilityApi {
    /// 打开数据库（不存在则创建）并初始化 schema
    pub fn open(db_path: &str) -> ApiResult<Self> {
        let mut conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(format!("{}: {}", db_path, e)))?;
        install_sqlite_tracing(&mut conn);
        init_schema(&conn)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建（仓储层与 ConfigManager 共用同一连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        let config_manager = ConfigManager::from_connection(conn.clone())
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            config_manager,
            catalog_repo: CatalogRepository::from_connection(conn.clone()),
            facility_repo: FacilitySettingsRepository::from_connection(conn.clone()),
            staff_repo: StaffRepository::from_connection(conn),
        })
    }

    // ==========================================
    // 配置
    // ==========================================

    /// 引擎配置（默认值 + config_kv 覆写）
    pub fn engine_config(&self) -> ApiResult<EngineConfig> {
        self.config_manager
            .load_engine_config()
            .map_err(|e| ApiError::DatabaseError(format!("配置加载失败: {}", e)))
    }

    pub fn set_config_value(&self, key: &str, value: &str) -> ApiResult<()> {
        self.config_manager
            .set_global_config_value(key, value)
            .map_err(|e| ApiError::DatabaseError(format!("配置写入失败: {}", e)))
    }

    // ==========================================
    // 加算目录
    // ==========================================

    /// 读取加算目录；库内为空时写入内置标准目录
    pub fn ensure_catalog(&self) -> ApiResult<AdditionCatalog> {
        let stored = self.catalog_repo.load_catalog()?;
        if !stored.definitions.is_empty() {
            return Ok(stored);
        }
        info!("数据库中无加算目录，写入内置标准目录");
        self.catalog_repo.save_catalog(&standard_catalog())?;
        Ok(self.catalog_repo.load_catalog()?)
    }

    /// 导入加算目录 JSON（校验通过后整体写入）
    #[instrument(skip(self))]
    pub fn import_catalog_file(&self, path: &str) -> ApiResult<AdditionCatalog> {
        let catalog = CatalogLoader::from_file(path)?;
        let versions = self.catalog_repo.save_catalog(&catalog)?;
        info!(definitions = catalog.definitions.len(), versions, "加算目录导入完成");
        Ok(self.catalog_repo.load_catalog()?)
    }

    /// 追加加算版本（关闭前一个 open 版本）
    ///
    /// # 错误
    /// - NotFound: 加算定义不存在
    /// - BusinessRuleViolation: 适用开始日不晚于现行版本
    pub fn add_catalog_version(&self, version: &AdditionVersion) -> ApiResult<AdditionVersion> {
        Ok(self.catalog_repo.add_version(version)?)
    }

    // ==========================================
    // 事业所设定
    // ==========================================

    pub fn save_facility(&self, settings: &FacilitySettings) -> ApiResult<()> {
        if settings.facility_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("facility_id 不能为空".to_string()));
        }
        Ok(self.facility_repo.upsert(settings)?)
    }

    pub fn facility(&self, facility_id: &str) -> ApiResult<FacilitySettings> {
        self.facility_repo
            .find(facility_id)?
            .ok_or_else(|| ApiError::NotFound(format!("FacilitySettings(id={})不存在", facility_id)))
    }

    // ==========================================
    // 职员名册
    // ==========================================

    /// 导入名册文件并写入库（同一 staff_id 覆盖）
    #[instrument(skip(self))]
    pub fn import_roster(&self, facility_id: &str, path: &str) -> ApiResult<RosterImportOutcome> {
        let outcome = RosterImporter::new().import_file(path)?;
        let written = self.staff_repo.upsert_batch(facility_id, &outcome.staff)?;
        info!(
            written,
            rejected_rows = outcome.rejected_rows(),
            "名册导入完成"
        );
        Ok(outcome)
    }

    pub fn staff(&self, facility_id: &str) -> ApiResult<Vec<StaffMember>> {
        Ok(self.staff_repo.find_by_facility(facility_id)?)
    }

    pub fn deactivate_staff(&self, facility_id: &str, staff_id: &str) -> ApiResult<()> {
        Ok(self.staff_repo.deactivate(facility_id, staff_id)?)
    }

    // ==========================================
    // 判定（库内数据）
    // ==========================================

    /// 按库内目录 / 设定 / 名册判定
    pub fn judge_facility(
        &self,
        facility_id: &str,
        reference_date: Option<NaiveDate>,
    ) -> ApiResult<JudgmentReport> {
        let settings = self.facility(facility_id)?;
        let catalog = self.ensure_catalog()?;
        let staff = self.staff(facility_id)?;
        let api = AdditionApi::new(self.engine_config()?);
        Ok(api.judge(&staff, &settings, &catalog, reference_date))
    }

    /// 判定 → 模拟（params 省略时由事业所设定推导）
    pub fn run_facility_pipeline(
        &self,
        facility_id: &str,
        reference_date: Option<NaiveDate>,
        params: Option<&SimulationParams>,
    ) -> ApiResult<PipelineOutput> {
        let settings = self.facility(facility_id)?;
        let catalog = self.ensure_catalog()?;
        let staff = self.staff(facility_id)?;
        let params = params
            .copied()
            .unwrap_or_else(|| SimulationParams::from_settings(&settings, 0.0));
        let api = AdditionApi::new(self.engine_config()?);
        api.run_pipeline(&staff, &settings, &catalog, reference_date, &params)
    }
}
