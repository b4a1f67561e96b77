// ==========================================
// 加算判定引擎 - API 层
// ==========================================
// 职责: 判定 / 模拟 / 建议 的对外接口与输入校验；库内数据的持久化入口
// ==========================================

pub mod addition_api;
pub mod error;
pub mod facility_api;
pub mod validator;

// 重导出核心类型
pub use addition_api::{AdditionApi, PipelineOutput};
pub use facility_api::FacilityApi;
pub use error::{ApiError, ApiResult};
pub use validator::validate_params;
