// ==========================================
// 加算判定引擎 - 模拟参数校验器
// ==========================================
// 职责: 模拟 / 建议 API 边界的输入校验
// 红线: 计算核心假定参数已校验，核心内部不再抛错
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::simulation::SimulationParams;
use tracing::warn;

pub const MIN_REGION_GRADE: i64 = 1;
pub const MAX_REGION_GRADE: i64 = 8;

/// 校验模拟参数，返回可直接交给计算核心的参数
///
/// # 规则
/// - child_count < 1 → InvalidInput
/// - region_grade 不在 1〜8 → InvalidInput
/// - 任一浮点值非有限 → InvalidInput
/// - percent_additions < 0 → InvalidInput
/// - average_usage_days / base_units 为负 → 置 0 并记录 warn
pub fn validate_params(params: &SimulationParams) -> ApiResult<SimulationParams> {
    if params.child_count < 1 {
        return Err(ApiError::InvalidInput(format!(
            "利用児童数必须 ≥ 1（实际 {}）",
            params.child_count
        )));
    }

    if !(MIN_REGION_GRADE..=MAX_REGION_GRADE).contains(&params.region_grade) {
        return Err(ApiError::InvalidInput(format!(
            "地域区分必须在 {}〜{} 之间（实际 {}）",
            MIN_REGION_GRADE, MAX_REGION_GRADE, params.region_grade
        )));
    }

    for (field, value) in [
        ("average_usage_days", params.average_usage_days),
        ("base_units", params.base_units),
        ("percent_additions", params.percent_additions),
    ] {
        if !value.is_finite() {
            return Err(ApiError::InvalidInput(format!("{} 非有限数值: {}", field, value)));
        }
    }

    if params.percent_additions < 0.0 {
        return Err(ApiError::InvalidInput(format!(
            "百分比加算不能为负（实际 {}）",
            params.percent_additions
        )));
    }

    let mut sanitized = *params;
    if sanitized.average_usage_days < 0.0 {
        warn!(value = sanitized.average_usage_days, "平均利用日数为负，按 0 处理");
        sanitized.average_usage_days = 0.0;
    }
    if sanitized.base_units < 0.0 {
        warn!(value = sanitized.base_units, "基本报酬单位为负，按 0 处理");
        sanitized.base_units = 0.0;
    }

    Ok(sanitized)
}
