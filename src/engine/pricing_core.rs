// ==========================================
// 零件制造报价系统 - 报价核心计算 (纯函数)
// ==========================================
// 依据: Quote_Engine_Specs_v1.0.md - 4. Pricing Engine 成本模型
// 红线: 纯函数,只依赖显式入参; 每个工艺分支使用窄类型参数结构,
//       字段相关性由类型系统保证,不做运行时字段猜测
// ==========================================
// 职责: 工艺成本模型 + 通用调整 + 数量折扣 + 阶梯平滑
// ==========================================

use crate::domain::geometry::GeometrySummary;
use crate::domain::material::{Finish, Material};
use crate::domain::pricing::{warning_codes, LineItem, PricingResult, QuoteWarning};
use crate::domain::types::Severity;
use crate::engine::error::{EngineError, EngineResult};

// ==========================================
// 成本模型常量
// ==========================================

/// CNC 工时系数: 分钟 / m² 表面积
pub const CNC_TIME_K_AREA: f64 = 2.0;

/// CNC 工时系数: 分钟 / dm³ 去除量
pub const CNC_TIME_K_VOLUME: f64 = 60.0;

/// CNC 毛坯去除量比例 (按零件体积折算)
pub const CNC_STOCK_REMOVAL_RATIO: f64 = 0.35;

/// 数量折扣上限
pub const MAX_QUANTITY_DISCOUNT: f64 = 0.20;

/// 阶梯单价下限比例 (相对上一档)
pub const TIER_FLOOR_RATIO: f64 = 0.8;

// ==========================================
// 窄类型工艺参数结构
// ==========================================

/// CNC 报价参数 (候选机台 + 链接系数展平后)
#[derive(Debug, Clone)]
pub struct CncQuoteParams {
    pub rate_per_min: f64,
    pub utilization_target: f64,
    pub setup_fee: f64,
    pub tool_change_min: f64,
    pub five_axis_factor: f64, // 非五轴机台取 1.0
    pub material_rate_multiplier: f64,
    pub finish_rate_multiplier: f64,
}

/// 注塑报价参数
#[derive(Debug, Clone)]
pub struct InjectionQuoteParams {
    pub press_rate_per_hour: f64,
    pub rate_per_min: f64, // 换模计费用
    pub runner_fraction: f64,
    pub cycle_base_s: f64,
    pub cycle_per_cm3_s: f64,
    pub tooling_cost_fixed: f64,
    pub tooling_cost_per_cm3: f64,
    pub tool_life_shots: u32,
    pub changeover_min: f64,
    pub material_rate_multiplier: f64,
}

/// 铸造报价参数
#[derive(Debug, Clone)]
pub struct CastingQuoteParams {
    pub rate_per_min: f64,
    pub utilization_target: f64,
    pub melt_rate_kg_per_min: f64,
    pub yield_fraction: f64,
    pub scrap_fraction: f64,
    pub mold_cost_per_unit: f64,
    pub mold_setup_fee: f64,
    pub material_rate_multiplier: f64,
    pub finish_rate_multiplier: f64,
}

/// 工艺成本输出: 行项 + 整单机时
#[derive(Debug, Clone)]
pub struct ProcessCost {
    pub line_items: Vec<LineItem>,
    /// 整单机时 (分钟),供产能排期预占
    pub machine_minutes: f64,
}

/// 通用调整参数
#[derive(Debug, Clone)]
pub struct AdjustmentParams {
    pub tolerance_multiplier: f64,
    pub overhead_multiplier: f64,
    /// Some(系数) 仅在加急交期时
    pub expedite_multiplier: Option<f64>,
    pub margin_pct: f64,
}

// ==========================================
// PricingCore - 报价核心计算
// ==========================================
pub struct PricingCore;

impl PricingCore {
    // ==========================================
    // 工艺成本模型
    // ==========================================

    /// CNC 成本行项
    ///
    /// 工时 = (k_area·SA/1e6 + k_vol·V·0.35/1e9) × 五轴系数 × 切削性 + 换刀/批量
    /// 加工费 = 单件工时 × 数量 × 费率 × 材料链接系数 ÷ 稼动率
    ///
    /// # 返回
    /// 固定顺序行项: machining, material, [finish], [setup]
    pub fn cnc_cost(
        geometry: &GeometrySummary,
        material: &Material,
        finish: Option<&Finish>,
        quantity: u32,
        p: &CncQuoteParams,
    ) -> EngineResult<ProcessCost> {
        let density = Self::require_density(material)?;
        let qty = quantity as f64;

        // 1. 加工费
        let base_minutes = CNC_TIME_K_AREA * (geometry.surface_area_mm2 / 1.0e6)
            + CNC_TIME_K_VOLUME * (geometry.volume_mm3 * CNC_STOCK_REMOVAL_RATIO / 1.0e9);
        let minutes_per_unit = base_minutes * p.five_axis_factor * material.machinability_factor
            + p.tool_change_min / qty;
        let machining = minutes_per_unit * qty * p.rate_per_min * p.material_rate_multiplier
            / p.utilization_target;

        // 2. 材料费
        let material_cost = geometry.net_mass_kg(density) * qty * material.cost_per_kg;

        let mut items = vec![
            LineItem::new("machining", machining),
            LineItem::new("material", material_cost),
        ];

        // 3. 表面处理费
        if let Some(finish) = finish {
            let finish_cost = geometry.surface_area_mm2 * finish.cost_per_mm2 * qty
                + finish.setup_fee * p.finish_rate_multiplier;
            items.push(LineItem::new("finish", finish_cost));
        }

        // 4. 装夹准备费 (一次性)
        if p.setup_fee > 0.0 {
            items.push(LineItem::new("setup", p.setup_fee));
        }

        Ok(ProcessCost {
            line_items: items,
            machine_minutes: minutes_per_unit * qty,
        })
    }

    /// 注塑成本行项
    ///
    /// 注射量 = V × (1+流道比例); 周期 = 基础 + 系数 × 注射量
    /// 模具费按 min(数量, 模具寿命) 摊销后放大回整单
    ///
    /// # 返回
    /// 固定顺序行项: press, material, tooling, changeover
    pub fn injection_cost(
        geometry: &GeometrySummary,
        material: &Material,
        quantity: u32,
        p: &InjectionQuoteParams,
    ) -> EngineResult<ProcessCost> {
        let density = Self::require_density(material)?;
        let qty = quantity as f64;

        let shot_volume_mm3 = geometry.volume_mm3 * (1.0 + p.runner_fraction);
        let shot_volume_cm3 = shot_volume_mm3 / 1000.0;

        // 1. 压机费
        let cycle_s = p.cycle_base_s + p.cycle_per_cm3_s * shot_volume_cm3;
        let press = cycle_s / 3600.0 * p.press_rate_per_hour * qty * p.material_rate_multiplier;

        // 2. 材料费 (含流道废料)
        let shot_mass_kg = shot_volume_mm3 / 1.0e9 * density;
        let material_cost = shot_mass_kg * qty * material.cost_per_kg;

        // 3. 模具费
        let tooling_total = p.tooling_cost_fixed + p.tooling_cost_per_cm3 * shot_volume_cm3;
        let amortize_shots = (quantity.min(p.tool_life_shots.max(1)) as f64).max(1.0);
        let tooling = tooling_total / amortize_shots * qty;

        // 4. 换模费 (固定,与数量无关)
        let changeover = p.changeover_min * p.rate_per_min;

        Ok(ProcessCost {
            line_items: vec![
                LineItem::new("press", press),
                LineItem::new("material", material_cost),
                LineItem::new("tooling", tooling),
                LineItem::new("changeover", changeover),
            ],
            machine_minutes: cycle_s * qty / 60.0 + p.changeover_min,
        })
    }

    /// 铸造成本行项
    ///
    /// 毛重 = 净重 ÷ 收得率 × (1+废品率)
    /// 熔炼费 = 熔炼分钟 (毛重×数量÷熔炼速率) ÷ 稼动率 × 费率
    ///
    /// # 返回
    /// 固定顺序行项: material, melt, mold, [finish]
    pub fn casting_cost(
        geometry: &GeometrySummary,
        material: &Material,
        finish: Option<&Finish>,
        quantity: u32,
        p: &CastingQuoteParams,
    ) -> EngineResult<ProcessCost> {
        let density = Self::require_density(material)?;
        let qty = quantity as f64;

        let net_kg = geometry.net_mass_kg(density);
        let gross_kg = net_kg / p.yield_fraction * (1.0 + p.scrap_fraction);

        // 1. 材料费 (按毛重)
        let material_cost = gross_kg * qty * material.cost_per_kg;

        // 2. 熔炼线费
        let melt_minutes = gross_kg * qty / p.melt_rate_kg_per_min;
        let melt = melt_minutes / p.utilization_target * p.rate_per_min
            * p.material_rate_multiplier;

        // 3. 造型费
        let mold = p.mold_cost_per_unit * qty + p.mold_setup_fee;

        let mut items = vec![
            LineItem::new("material", material_cost),
            LineItem::new("melt", melt),
            LineItem::new("mold", mold),
        ];

        // 4. 表面处理费
        if let Some(finish) = finish {
            let finish_cost = geometry.surface_area_mm2 * finish.cost_per_mm2 * qty
                + finish.setup_fee * p.finish_rate_multiplier;
            items.push(LineItem::new("finish", finish_cost));
        }

        Ok(ProcessCost {
            line_items: items,
            machine_minutes: melt_minutes,
        })
    }

    // ==========================================
    // 通用调整 (顺序固定,依次对流动小计做乘法)
    // ==========================================

    /// 数量折扣率: min(0.20, 1 − 1/√q)
    ///
    /// q=1 时为 0; 递减边际,永不超过 20%
    pub fn quantity_discount(quantity: u32) -> f64 {
        let q = (quantity.max(1)) as f64;
        (1.0 - 1.0 / q.sqrt()).min(MAX_QUANTITY_DISCOUNT)
    }

    /// 应用通用调整
    ///
    /// 顺序: 数量折扣 → 公差系数 → 制造费用系数 → 加急系数 → 利润率。
    /// 每步为流动小计的乘法百分比,非零增量记为带符号行项 (折扣为负)。
    ///
    /// # 返回
    /// (调整后小计, 调整行项列表)
    pub fn apply_adjustments(
        subtotal: f64,
        quantity: u32,
        p: &AdjustmentParams,
    ) -> (f64, Vec<LineItem>) {
        let mut running = subtotal;
        let mut items = Vec::new();

        // 1. 数量折扣
        let discount = Self::quantity_discount(quantity);
        if discount > 0.0 {
            let delta = -running * discount;
            running += delta;
            items.push(LineItem::new("quantity_discount", delta));
        }

        // 2. 公差系数
        let tol_delta = running * (p.tolerance_multiplier - 1.0);
        if tol_delta != 0.0 {
            running += tol_delta;
            items.push(LineItem::new("tolerance_adjustment", tol_delta));
        }

        // 3. 制造费用系数
        let overhead_delta = running * (p.overhead_multiplier - 1.0);
        if overhead_delta != 0.0 {
            running += overhead_delta;
            items.push(LineItem::new("overhead", overhead_delta));
        }

        // 4. 加急系数 (仅加急交期)
        if let Some(expedite) = p.expedite_multiplier {
            let expedite_delta = running * (expedite - 1.0);
            if expedite_delta != 0.0 {
                running += expedite_delta;
                items.push(LineItem::new("expedite", expedite_delta));
            }
        }

        // 5. 利润率 (加法)
        let margin_delta = running * p.margin_pct;
        if margin_delta != 0.0 {
            running += margin_delta;
            items.push(LineItem::new("margin", margin_delta));
        }

        (running, items)
    }

    // ==========================================
    // 阶梯平滑
    // ==========================================

    /// 单价单调性约束: 随数量递增,单价不得上升,也不得跌破上一档的 80%
    ///
    /// 违反时钳制该档的 subtotal/total/unit_price,
    /// 并追加 tier_adjustment 行项记录修正量。
    ///
    /// # 参数
    /// - tiers: 按数量升序排列的各档独立报价结果 (就地修正)
    pub fn smooth_tiers(tiers: &mut [PricingResult]) {
        for i in 1..tiers.len() {
            let prev_unit = tiers[i - 1].unit_price;
            let tier = &mut tiers[i];

            let ceiling = prev_unit;
            let floor = prev_unit * TIER_FLOOR_RATIO;

            let clamped_unit = tier.unit_price.min(ceiling).max(floor);
            if (clamped_unit - tier.unit_price).abs() < 1e-12 {
                continue;
            }

            let new_total = clamped_unit * tier.quantity as f64;
            let delta = new_total - tier.total;

            tier.unit_price = clamped_unit;
            tier.total = new_total;
            tier.subtotal += delta; // 保持 total = subtotal + tax + shipping
            tier.line_items.push(LineItem::new("tier_adjustment", delta));
            tier.breakdown.insert("tier_adjustment".to_string(), delta);
            tier.breakdown.insert("subtotal".to_string(), tier.subtotal);
            tier.breakdown.insert("total".to_string(), tier.total);
            tier.breakdown
                .insert("unit_price".to_string(), tier.unit_price);
            tier.warnings.push(QuoteWarning::new(
                warning_codes::TIER_ADJUSTED,
                Severity::Info,
                format!("阶梯单价被单调性约束钳制,修正量 {:.4}", delta),
            ));
        }
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    /// 成本模型要求材料密度必须存在
    fn require_density(material: &Material) -> EngineResult<f64> {
        match material.density_kg_m3 {
            Some(d) if d > 0.0 => Ok(d),
            _ => Err(EngineError::Validation(format!(
                "材料 {} 缺少密度,无法计算质量成本",
                material.material_id
            ))),
        }
    }
}
