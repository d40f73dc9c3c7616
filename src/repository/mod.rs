// ==========================================
// 零件制造报价系统 - 数据仓储层
// ==========================================
// 依据: Quoting_Master_Spec.md - PART D 引擎铁律
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod adapters;
pub mod capacity_repo;
pub mod error;
pub mod machine_repo;
pub mod rate_card_repo;

// 重导出核心仓储
pub use adapters::SqliteCatalog;
pub use capacity_repo::CapacityDayRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use machine_repo::MachineRepository;
pub use rate_card_repo::RateCardRepository;
