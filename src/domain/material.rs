// ==========================================
// 零件制造报价系统 - 材料与基准数据领域模型
// ==========================================
// 依据: Quote_Engine_Specs_v1.0.md - 3.2 基准数据
// 红线: 基准数据只读,由后台目录管理维护
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Material - 材料主数据
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub material_id: String,
    pub name: String,

    // 密度可能缺失 (新录入材料),铸造可行性检查必须降级为提示而非硬判
    pub density_kg_m3: Option<f64>,

    pub cost_per_kg: f64,

    // 切削性系数,缺省 1.0 (基准材料)
    pub machinability_factor: f64,
}

impl Material {
    pub fn new(material_id: &str, name: &str, density_kg_m3: f64, cost_per_kg: f64) -> Self {
        Self {
            material_id: material_id.to_string(),
            name: name.to_string(),
            density_kg_m3: Some(density_kg_m3),
            cost_per_kg,
            machinability_factor: 1.0,
        }
    }
}

// ==========================================
// Finish - 表面处理 (可选)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finish {
    pub finish_id: String,
    pub name: String,
    pub cost_per_mm2: f64, // 按表面积计价
    pub setup_fee: f64,    // 一次性开线费
}

// ==========================================
// Tolerance - 公差等级 (可选)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tolerance {
    pub tolerance_id: String,
    pub name: String,
    pub value_mm: f64,        // 公差数值,用于 DFM 能力检查
    pub cost_multiplier: f64, // 报价放大系数
}

// ==========================================
// RateCard - 区域费率卡
// ==========================================
// 用途: 目录中无匹配机台时的兜底报价来源
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateCard {
    pub region: String,
    pub rate_3axis_per_min: f64,  // 三轴机时费率 (每分钟)
    pub rate_5axis_per_min: f64,  // 五轴机时费率 (每分钟)
    pub press_rate_per_hour: f64, // 注塑压机费率 (每小时)
    pub melt_rate_per_min: f64,   // 铸造熔炼线费率 (每分钟)
    pub tax_rate: f64,            // 税率 (如 0.10)
    pub flat_shipping: f64,       // 固定运费
}
