// ==========================================
// 加算判定引擎 - 加算 API
// ==========================================
// 职责: 判定 / 模拟 / 建议 的对外入口
// 红线: 无状态调用契约，参数变化时整体重算，调用方丢弃过期结果即可
// ==========================================

use crate::api::error::ApiResult;
use crate::api::validator::validate_params;
use crate::config::EngineConfig;
use crate::domain::catalog::AdditionCatalog;
use crate::domain::facility::FacilitySettings;
use crate::domain::judgment::{JudgmentReport, JudgmentResult};
use crate::domain::simulation::{SimulationParams, SimulationResult, Suggestion};
use crate::domain::staff::StaffMember;
use crate::engine::{EligibilityEngine, OptimizationAdvisor, RevenueCalculator};
use crate::perf::PerfGuard;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{info, instrument};

/// 判定 + 模拟 的合并输出
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub report: JudgmentReport,
    pub simulation: SimulationResult,
}

pub struct AdditionApi {
    engine: EligibilityEngine,
}

impl AdditionApi {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            engine: EligibilityEngine::new(config),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        self.engine.config()
    }

    /// 判定 API（不会失败）
    ///
    /// reference_date 省略时使用当天（本地时区）
    #[instrument(skip_all, fields(facility_id = %settings.facility_id))]
    pub fn judge(
        &self,
        staff: &[StaffMember],
        settings: &FacilitySettings,
        catalog: &AdditionCatalog,
        reference_date: Option<NaiveDate>,
    ) -> JudgmentReport {
        let _perf = PerfGuard::new("judge");
        let date = reference_date.unwrap_or_else(|| Local::now().date_naive());
        let report = self.engine.judge(staff, settings, catalog, date);
        info!(
            reference_date = %date,
            results = report.results.len(),
            selected = report.selected().count(),
            anomalies = report.anomalies.len(),
            "加算判定完成"
        );
        report
    }

    /// 模拟 API（含优化建议）
    #[instrument(skip_all, fields(child_count = params.child_count, region_grade = params.region_grade))]
    pub fn simulate(
        &self,
        judgments: &[JudgmentResult],
        params: &SimulationParams,
    ) -> ApiResult<SimulationResult> {
        let _perf = PerfGuard::new("simulate");
        let params = validate_params(params)?;
        let mut result = RevenueCalculator::simulate(judgments, &params, self.config());
        result.suggestions = OptimizationAdvisor::advise(judgments, &params, self.config());
        info!(
            total_revenue = result.total_revenue,
            suggestions = result.suggestions.len(),
            "收益模拟完成"
        );
        Ok(result)
    }

    /// 建议 API
    #[instrument(skip_all, fields(child_count = params.child_count))]
    pub fn advise(
        &self,
        judgments: &[JudgmentResult],
        params: &SimulationParams,
    ) -> ApiResult<Vec<Suggestion>> {
        let _perf = PerfGuard::new("advise");
        let params = validate_params(params)?;
        Ok(OptimizationAdvisor::advise(judgments, &params, self.config()))
    }

    /// 判定 → 模拟
    pub fn run_pipeline(
        &self,
        staff: &[StaffMember],
        settings: &FacilitySettings,
        catalog: &AdditionCatalog,
        reference_date: Option<NaiveDate>,
        params: &SimulationParams,
    ) -> ApiResult<PipelineOutput> {
        let report = self.judge(staff, settings, catalog, reference_date);
        let simulation = self.simulate(&report.results, params)?;
        Ok(PipelineOutput { report, simulation })
    }
}

impl Default for AdditionApi {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
