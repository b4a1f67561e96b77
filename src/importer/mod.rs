// ==========================================
// 加算判定引擎 - 导入层
// ==========================================
// 职责: 外部数据导入（职员名册 / 加算目录），在边界完成校验
// 支持: Excel, CSV, JSON
// ==========================================

pub mod catalog_loader;
pub mod catalog_seed;
pub mod error;
pub mod file_parser;
pub mod roster_field_mapper;
pub mod roster_importer;

// 重导出核心类型
pub use catalog_loader::CatalogLoader;
pub use catalog_seed::standard_catalog;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
pub use roster_field_mapper::RosterFieldMapper;
pub use roster_importer::{RosterImportOutcome, RosterImporter};
