// ==========================================
// 零件制造报价系统 - 报价领域模型
// ==========================================
// 依据: Quote_Engine_Specs_v1.0.md - 4. Pricing Engine
// 红线: total = subtotal + tax + shipping 恒等;
//       subtotal 为固定顺序行项的累加,全程可审计
// ==========================================

use crate::domain::geometry::GeometrySummary;
use crate::domain::material::{Finish, Material, Tolerance};
use crate::domain::types::{LeadTimeClass, ProcessKind, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// QuoteItem - 报价请求项
// ==========================================
// 基准数据 (材料/表面处理/公差) 由上游协作方解析后传入,
// 引擎不做任何全局目录查询
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteItem {
    pub geometry: GeometrySummary,
    pub process_kind: ProcessKind,
    pub material: Material,
    pub finish: Option<Finish>,
    pub tolerance: Option<Tolerance>,
    pub quantity: u32,
    pub lead_time_class: LeadTimeClass,
    pub region: String,

    // ===== DFM 上下文 (报价本身不消费) =====
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certifications: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

// ==========================================
// LineItem - 成本行项
// ==========================================
// 折扣类行项为负值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub amount: f64,
}

impl LineItem {
    pub fn new(description: &str, amount: f64) -> Self {
        Self {
            description: description.to_string(),
            amount,
        }
    }
}

// ==========================================
// QuoteWarning - 报价警示
// ==========================================
// 随结果返回,永不抛出 (兜底报价等不确定性必须显式暴露)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteWarning {
    pub code: String,
    pub severity: Severity,
    pub message: String,
}

impl QuoteWarning {
    pub fn new(code: &str, severity: Severity, message: String) -> Self {
        Self {
            code: code.to_string(),
            severity,
            message,
        }
    }
}

// ===== 警示码常量 =====
pub mod warning_codes {
    /// 目录无匹配机台,使用区域费率卡兜底
    pub const NO_MATCHING_MACHINE_USING_RATE_CARD: &str = "NO_MATCHING_MACHINE_USING_RATE_CARD";
    /// 阶梯单价被单调性约束钳制
    pub const TIER_ADJUSTED: &str = "TIER_ADJUSTED";
}

// ==========================================
// PricingResult - 报价结果
// ==========================================
// 每次请求现算,不由本子系统持久化
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingResult {
    pub quantity: u32,
    pub unit_price: f64,
    pub subtotal: f64,
    pub tax: f64,
    pub shipping: f64,
    pub total: f64,

    pub machine_id: String,
    pub machine_name: String,
    pub used_rate_card_fallback: bool,
    pub promised_lead_days: i64,
    /// 整单机时 (分钟),产能预占时的所需分钟数
    pub machine_minutes: f64,

    // 固定顺序的成本推导明细
    pub line_items: Vec<LineItem>,
    // 展平的展示映射 (键重复时后写覆盖,展示用途)
    pub breakdown: BTreeMap<String, f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<QuoteWarning>,
}

impl PricingResult {
    /// 校验恒等式 total = subtotal + tax + shipping
    pub fn total_consistent(&self) -> bool {
        (self.subtotal + self.tax + self.shipping - self.total).abs() < 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_consistency_check() {
        let result = PricingResult {
            quantity: 10,
            unit_price: 12.1,
            subtotal: 100.0,
            tax: 10.0,
            shipping: 11.0,
            total: 121.0,
            machine_id: "CNC-01".to_string(),
            machine_name: "三轴立加".to_string(),
            used_rate_card_fallback: false,
            promised_lead_days: 7,
            machine_minutes: 50.0,
            line_items: vec![LineItem::new("machining", 100.0)],
            breakdown: BTreeMap::new(),
            warnings: Vec::new(),
        };
        assert!(result.total_consistent());

        let mut broken = result.clone();
        broken.total = 120.0;
        assert!(!broken.total_consistent());
    }
}
