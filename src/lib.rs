// ==========================================
// 児童福祉加算判定・収益シミュレーション - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持引擎（届出判断由人工最终确认）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "ja");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 判定 / 模拟 / 建议
pub mod engine;

// 导入层 - 名册与加算目录
pub mod importer;

// 配置层 - 引擎配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 性能统计
pub mod perf;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AdditionCategory, Comparison, EmploymentStyle, PersonnelCategory, RepresentationKind,
    ServiceType, SuggestionPriority, SuggestionType,
};

// 领域实体
pub use domain::{
    AdditionCatalog, AdditionDefinition, AdditionVersion, DataAnomaly, FacilitySettings,
    JudgmentReport, JudgmentResult, SimulationParams, SimulationResult, StaffMember, Suggestion,
};

// 引擎
pub use engine::{EligibilityEngine, OptimizationAdvisor, RevenueCalculator, TemporalRuleResolver};

// API
pub use api::{AdditionApi, ApiError, ApiResult, FacilityApi, PipelineOutput};

// 配置
pub use config::EngineConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "児童福祉加算判定・収益シミュレーション";
