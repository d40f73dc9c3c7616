// ==========================================
// 零件制造报价系统 - 报价配置读取 Trait
// ==========================================
// 依据: Quote_Engine_Specs_v1.0.md - 8. 配置项全集
// 职责: 定义排期/报价模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// QuoteConfigReader Trait
// ==========================================
// 用途: 排期引擎与 API 层所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait QuoteConfigReader: Send + Sync {
    /// 获取机台单日默认可用分钟数（产能日惰性创建时使用）
    ///
    /// # 默认值
    /// - 480.0
    async fn get_default_daily_minutes(&self) -> Result<f64, Box<dyn Error>>;

    /// 获取排期搜索窗口长度（天）
    ///
    /// # 默认值
    /// - 30
    async fn get_schedule_horizon_days(&self) -> Result<i64, Box<dyn Error>>;

    /// 获取标准交期的窗口起点偏移（天）
    ///
    /// # 默认值
    /// - 3
    async fn get_standard_lead_offset_days(&self) -> Result<i64, Box<dyn Error>>;

    /// 获取加急交期的窗口起点偏移（天）
    ///
    /// # 默认值
    /// - 1
    async fn get_expedite_lead_offset_days(&self) -> Result<i64, Box<dyn Error>>;

    /// 获取默认报价区域（请求未携带区域时使用）
    ///
    /// # 默认值
    /// - "CN-EAST"
    async fn get_default_region(&self) -> Result<String, Box<dyn Error>>;
}
