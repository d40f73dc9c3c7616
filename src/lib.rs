// ==========================================
// 零件制造报价系统 - 报价核心库
// ==========================================
// 依据: Quoting_Master_Spec.md - 系统宪法
// 技术栈: Rust + SQLite
// 系统定位: 报价核心引擎 (CNC/注塑/铸造)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    LeadTimeClass, ProcessFamily, ProcessKind, Severity, SuggestionCategory,
};

// 领域实体
pub use domain::{
    BoundingBox, CapacityDay, DfmReport, GeometrySummary, LineItem, Machine, Material,
    PricingResult, QuoteItem, RateCard, Suggestion,
};

// 引擎
pub use engine::{
    CapacityScheduler, DfmEngine, FeasibilityEngine, PricingCore, PricingEngine,
};

// API
pub use api::QuoteApi;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "零件制造报价系统";
