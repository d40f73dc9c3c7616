// ==========================================
// 零件制造报价系统 - 机台领域模型
// ==========================================
// 依据: Quote_Engine_Specs_v1.0.md - 3.3 机台目录
// 红线: 工艺专有参数用类型化结构承载,不做运行时字段猜测
// ==========================================

use crate::domain::geometry::BoundingBox;
use crate::domain::types::ProcessFamily;
use serde::{Deserialize, Serialize};

// ==========================================
// CncParams - CNC 工艺参数
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CncParams {
    pub tool_change_min: f64,   // 换刀时间 (分钟,按批量摊销)
    pub five_axis_factor: f64,  // 五轴效率系数 (<1,axis_count>=5 时生效)
}

impl Default for CncParams {
    fn default() -> Self {
        Self {
            tool_change_min: 0.0,
            five_axis_factor: 1.0,
        }
    }
}

// ==========================================
// InjectionParams - 注塑工艺参数
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjectionParams {
    pub runner_fraction: f64,        // 流道废料比例 (如 0.08)
    pub cycle_base_s: f64,           // 基础周期 (秒)
    pub cycle_per_cm3_s: f64,        // 每 cm³ 注射量的周期增量 (秒)
    pub tooling_cost_fixed: f64,     // 模具固定成本
    pub tooling_cost_per_cm3: f64,   // 模具按注射量成本
    pub tool_life_shots: u32,        // 模具额定寿命 (模次)
    pub shot_capacity_cm3: f64,      // 最大注射量 (cm³)
    pub min_tonnage_t: f64,          // 最小锁模力 (吨)
    pub max_tonnage_t: f64,          // 最大锁模力 (吨)
    pub changeover_min: f64,         // 换模时间 (分钟,固定收费)
}

// ==========================================
// CastingParams - 铸造工艺参数
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastingParams {
    pub melt_rate_kg_per_min: f64, // 熔炼速率 (kg/分钟)
    pub yield_fraction: f64,       // 浇注收得率 (0-1)
    pub scrap_fraction: f64,       // 废品率 (0-1)
    pub mold_cost_per_unit: f64,   // 单件造型成本
    pub mold_setup_fee: f64,       // 一次性制模费
    pub max_gross_kg: f64,         // 单件最大毛重 (kg)
}

// ==========================================
// Machine - 机台主数据
// ==========================================
// inactive 机台永不进入候选
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub machine_id: String,
    pub name: String,
    pub family: ProcessFamily,
    pub axis_count: u8,

    // 包络缺失表示不限制零件尺寸
    pub envelope: Option<BoundingBox>,

    // ===== 费率与系数 =====
    pub rate_per_min: f64,
    pub setup_fee: f64,
    pub overhead_multiplier: f64,
    pub expedite_multiplier: f64,
    pub margin_pct: f64,
    pub utilization_target: f64, // <1,摊入非生产时间

    pub active: bool,

    // ===== 工艺专有参数 (与 family 对应,其余为 None) =====
    pub cnc: Option<CncParams>,
    pub injection: Option<InjectionParams>,
    pub casting: Option<CastingParams>,
}

impl Machine {
    /// 是否为五轴机台
    pub fn is_five_axis(&self) -> bool {
        self.axis_count >= 5
    }
}

// ==========================================
// MachineMaterialLink - 机台-材料兼容链接
// ==========================================
// 语义: 机台无任何链接行 = 不限制; 有链接行 = 仅链接的材料可用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineMaterialLink {
    pub machine_id: String,
    pub material_id: String,
    pub rate_multiplier: f64, // 缺省 1.0
}

// ==========================================
// MachineFinishLink - 机台-表面处理兼容链接
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineFinishLink {
    pub machine_id: String,
    pub finish_id: String,
    pub rate_multiplier: f64,
}
