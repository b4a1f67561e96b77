// ==========================================
// 加算判定引擎 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod catalog_repo;
pub mod error;
pub mod facility_repo;
mod row_codec;
pub mod schema;
pub mod staff_repo;

// 重导出核心仓储
pub use catalog_repo::CatalogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use facility_repo::FacilitySettingsRepository;
pub use schema::init_schema;
pub use staff_repo::StaffRepository;
