// ==========================================
// 加算判定引擎 - 引擎层
// ==========================================
// 职责: 名册标准化 / 版本解析 / 加算判定 / 收益模拟 / 优化建议
// 红线: Engine 不拼 SQL, 不做 I/O, 所有判定必须输出 reason
// ==========================================

pub mod advisor;
pub mod judgment;
pub mod judgment_core;
pub mod metrics;
pub mod reason;
pub mod revenue;
pub mod roster;
pub mod rule_resolver;

// 重导出核心引擎
pub use advisor::OptimizationAdvisor;
pub use judgment::EligibilityEngine;
pub use judgment_core::JudgmentCore;
pub use metrics::RosterMetrics;
pub use revenue::{RevenueCalculator, REGION_UNIT_RATES};
pub use roster::{NormalizedRoster, RosterNormalizer};
pub use rule_resolver::{TemporalRuleResolver, VersionPlan, VersionPlanError, VersionResolution};
