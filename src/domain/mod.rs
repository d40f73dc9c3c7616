// ==========================================
// 零件制造报价系统 - 领域模型层
// ==========================================
// 依据: Quoting_Master_Spec.md - PART C 数据模型
// 依据: Quote_Engine_Specs_v1.0.md - 3. 主实体定义
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod capacity;
pub mod dfm;
pub mod geometry;
pub mod machine;
pub mod material;
pub mod pricing;
pub mod types;

// 重导出核心类型
pub use capacity::{CapacityDay, CapacityWindow};
pub use dfm::{DfmReport, Overlay, OverlaySpec, RuleContext, Suggestion};
pub use geometry::{BoundingBox, GeometrySummary};
pub use machine::{
    CastingParams, CncParams, InjectionParams, Machine, MachineFinishLink, MachineMaterialLink,
};
pub use material::{Finish, Material, RateCard, Tolerance};
pub use pricing::{warning_codes, LineItem, PricingResult, QuoteItem, QuoteWarning};
pub use types::{LeadTimeClass, ProcessFamily, ProcessKind, Severity, SuggestionCategory};
