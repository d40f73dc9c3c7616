// ==========================================
// 零件制造报价系统 - 配置层
// ==========================================
// 依据: Quote_Engine_Specs_v1.0.md - 8. 配置项全集
// ==========================================
// 职责: 系统配置管理,带默认值回退
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod quote_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use quote_config_trait::QuoteConfigReader;
