// ==========================================
// 零件制造报价系统 - 引擎层
// ==========================================
// 依据: Quoting_Master_Spec.md - PART D 引擎体系
// 依据: Quote_Engine_Specs_v1.0.md - 1.2 模块拆分
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: Engine 不拼 SQL, 所有规则必须输出 reason
// ==========================================

pub mod capacity_store;
pub mod catalog;
pub mod dfm;
pub mod dfm_rules;
pub mod error;
pub mod feasibility;
pub mod pricing;
pub mod pricing_core;
pub mod scheduler;

// 重导出核心引擎
pub use capacity_store::CapacityStore;
pub use catalog::CatalogReader;
pub use dfm::{DfmEngine, DfmRule, RuleHit};
pub use error::{EngineError, EngineResult};
pub use feasibility::{FeasibilityEngine, FeasibilityResult, FeasibilityWarning};
pub use pricing::{PricingEngine, EXPEDITE_LEAD_DAYS, RATE_CARD_MACHINE_ID, STANDARD_LEAD_DAYS};
pub use pricing_core::PricingCore;
pub use scheduler::{CapacityScheduler, Reservation, SlotResult};
