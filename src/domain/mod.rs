// ==========================================
// 加算判定引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、派生结果
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod catalog;
pub mod facility;
pub mod judgment;
pub mod simulation;
pub mod staff;
pub mod types;

// 重导出核心类型
pub use catalog::{
    AdditionCatalog, AdditionDefinition, AdditionVersion, EmploymentScope, LawRevision, Metric,
    Requirement, StaffFilter, StaffRole,
};
pub use facility::FacilitySettings;
pub use judgment::{DataAnomaly, GapHint, JudgmentReport, JudgmentResult, RequirementStatus};
pub use simulation::{
    round_yen, RevenueBreakdown, RoundedRevenue, SimulationParams, SimulationResult, Suggestion,
};
pub use staff::{
    DqLevel, DqViolation, QualificationCode, QualificationSet, RawStaffRecord, StaffForJudgment,
    StaffMember,
};
pub use types::{
    AdditionCategory, Comparison, EmploymentStyle, PersonnelCategory, RepresentationKind,
    ServiceType, SuggestionPriority, SuggestionType,
};
