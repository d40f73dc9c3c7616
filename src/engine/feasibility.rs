// ==========================================
// 零件制造报价系统 - 机台可行性检查引擎
// ==========================================
// 依据: Quote_Engine_Specs_v1.0.md - 2. Feasibility Checker
// 红线: 纯函数,无副作用; 数据缺失降级为 INFO,不得静默硬通过
// ==========================================
// 职责: 单机台物理约束检查 (包络/锁模力/模具寿命/熔炼能力)
// 输入: 报价项 + 候选机台
// 输出: FeasibilityResult (ok = 无 ERROR 级告警)
// ==========================================

use crate::domain::machine::Machine;
use crate::domain::pricing::QuoteItem;
use crate::domain::types::{ProcessFamily, Severity};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// 锁模力系数: 吨 / cm² 投影面积
pub const TONNAGE_PER_CM2: f64 = 0.015;

/// 单班熔炼分钟数 (熔炼能力告警基准)
pub const MELT_SHIFT_MINUTES: f64 = 480.0;

// ==========================================
// FeasibilityWarning - 可行性告警
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeasibilityWarning {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,
}

impl FeasibilityWarning {
    fn new(severity: Severity, message: &str, metric: Option<f64>, limit: Option<f64>) -> Self {
        Self {
            severity,
            message: message.to_string(),
            metric,
            limit,
        }
    }
}

// ==========================================
// FeasibilityResult - 检查结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeasibilityResult {
    pub ok: bool,
    pub warnings: Vec<FeasibilityWarning>,
}

impl FeasibilityResult {
    fn from_warnings(warnings: Vec<FeasibilityWarning>) -> Self {
        let ok = !warnings.iter().any(|w| w.severity == Severity::Error);
        Self { ok, warnings }
    }

    /// 是否存在 ERROR 级告警 (候选硬过滤条件)
    pub fn has_hard_violation(&self) -> bool {
        !self.ok
    }
}

// ==========================================
// FeasibilityEngine - 可行性检查引擎
// ==========================================
pub struct FeasibilityEngine {
    // 无状态引擎,不需要注入依赖
}

impl Default for FeasibilityEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FeasibilityEngine {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 检查报价项在指定机台上的可行性
    ///
    /// # 参数
    /// - `item`: 报价项 (几何 + 材料 + 数量)
    /// - `machine`: 候选机台
    ///
    /// # 返回
    /// FeasibilityResult: ok = 无 ERROR 级告警
    #[instrument(skip(self, item, machine), fields(machine_id = %machine.machine_id))]
    pub fn check(&self, item: &QuoteItem, machine: &Machine) -> FeasibilityResult {
        let mut warnings = Vec::new();

        match machine.family {
            ProcessFamily::Cnc => self.check_cnc(item, machine, &mut warnings),
            ProcessFamily::Injection => self.check_injection(item, machine, &mut warnings),
            ProcessFamily::Casting => self.check_casting(item, machine, &mut warnings),
            // 其他工艺族无物理约束模型,不产生告警
            _ => {}
        }

        FeasibilityResult::from_warnings(warnings)
    }

    // ==========================================
    // CNC: 包络检查
    // ==========================================
    fn check_cnc(&self, item: &QuoteItem, machine: &Machine, warnings: &mut Vec<FeasibilityWarning>) {
        // 包络未声明 = 不限制零件尺寸
        if let Some(envelope) = &machine.envelope {
            let overage = item.geometry.max_envelope_overage(envelope);
            if overage > 1.0 {
                warnings.push(FeasibilityWarning::new(
                    Severity::Error,
                    "零件尺寸超出机台包络",
                    Some(overage),
                    Some(1.0),
                ));
            }
        }
    }

    // ==========================================
    // 注塑: 锁模力 / 注射量 / 模具寿命
    // ==========================================
    fn check_injection(
        &self,
        item: &QuoteItem,
        machine: &Machine,
        warnings: &mut Vec<FeasibilityWarning>,
    ) {
        let params = match &machine.injection {
            Some(p) => p,
            None => return, // 参数缺失无从检查
        };

        // 1. 锁模力: 投影面积(cm²) × 0.015 × (1+流道比例)
        let required_tonnage =
            item.geometry.projected_area_xy_cm2() * TONNAGE_PER_CM2 * (1.0 + params.runner_fraction);

        // 边界含等号: 恰好等于最小锁模力不算违反
        if required_tonnage < params.min_tonnage_t {
            warnings.push(FeasibilityWarning::new(
                Severity::Warning,
                "所需锁模力低于机台最小锁模力",
                Some(required_tonnage),
                Some(params.min_tonnage_t),
            ));
        }
        if required_tonnage > params.max_tonnage_t {
            warnings.push(FeasibilityWarning::new(
                Severity::Error,
                "所需锁模力超出机台最大锁模力",
                Some(required_tonnage),
                Some(params.max_tonnage_t),
            ));
        }

        // 2. 注射量
        let shot_volume_cm3 = item.geometry.volume_mm3 * (1.0 + params.runner_fraction) / 1000.0;
        if shot_volume_cm3 > params.shot_capacity_cm3 {
            warnings.push(FeasibilityWarning::new(
                Severity::Error,
                "注射量超出机台最大注射量",
                Some(shot_volume_cm3),
                Some(params.shot_capacity_cm3),
            ));
        }

        // 3. 模具寿命
        if item.quantity > params.tool_life_shots {
            warnings.push(FeasibilityWarning::new(
                Severity::Warning,
                "订单数量超出模具额定寿命",
                Some(item.quantity as f64),
                Some(params.tool_life_shots as f64),
            ));
        }
    }

    // ==========================================
    // 铸造: 毛重 / 熔炼能力
    // ==========================================
    fn check_casting(
        &self,
        item: &QuoteItem,
        machine: &Machine,
        warnings: &mut Vec<FeasibilityWarning>,
    ) {
        let params = match &machine.casting {
            Some(p) => p,
            None => return,
        };

        // 密度缺失时降级为 INFO,不得按"可行"静默通过
        let density = match item.material.density_kg_m3 {
            Some(d) if d > 0.0 => d,
            _ => {
                warnings.push(FeasibilityWarning::new(
                    Severity::Info,
                    "材料密度缺失,熔炼能力检查已跳过",
                    None,
                    None,
                ));
                return;
            }
        };

        // 毛重 = 净重 ÷ 收得率 × (1+废品率)
        let net_kg = item.geometry.net_mass_kg(density);
        let gross_kg = net_kg / params.yield_fraction * (1.0 + params.scrap_fraction);

        if gross_kg > params.max_gross_kg {
            warnings.push(FeasibilityWarning::new(
                Severity::Error,
                "单件毛重超出机台最大毛重",
                Some(gross_kg),
                Some(params.max_gross_kg),
            ));
        }

        // 整单熔炼时间超出单班能力 → 告警 (可拆班生产,非硬违反)
        let melt_minutes = gross_kg * item.quantity as f64 / params.melt_rate_kg_per_min;
        if melt_minutes > MELT_SHIFT_MINUTES {
            warnings.push(FeasibilityWarning::new(
                Severity::Warning,
                "整单熔炼需求超出单班熔炼能力",
                Some(melt_minutes),
                Some(MELT_SHIFT_MINUTES),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::{BoundingBox, GeometrySummary};
    use crate::domain::machine::{CastingParams, CncParams, InjectionParams};
    use crate::domain::material::Material;
    use crate::domain::types::{LeadTimeClass, ProcessKind};

    // ==========================================
    // 测试辅助函数
    // ==========================================

    fn make_item(kind: ProcessKind, geometry: GeometrySummary, quantity: u32) -> QuoteItem {
        QuoteItem {
            geometry,
            process_kind: kind,
            material: Material::new("AL6061", "铝合金 6061", 2700.0, 25.0),
            finish: None,
            tolerance: None,
            quantity,
            lead_time_class: LeadTimeClass::Standard,
            region: "CN-EAST".to_string(),
            certifications: Vec::new(),
            purpose: None,
        }
    }

    fn cnc_machine(envelope: Option<BoundingBox>) -> Machine {
        Machine {
            machine_id: "CNC-01".to_string(),
            name: "三轴立加".to_string(),
            family: ProcessFamily::Cnc,
            axis_count: 3,
            envelope,
            rate_per_min: 2.0,
            setup_fee: 50.0,
            overhead_multiplier: 1.1,
            expedite_multiplier: 1.3,
            margin_pct: 0.15,
            utilization_target: 0.85,
            active: true,
            cnc: Some(CncParams::default()),
            injection: None,
            casting: None,
        }
    }

    fn injection_machine(min_tonnage: f64, max_tonnage: f64) -> Machine {
        Machine {
            machine_id: "IMM-01".to_string(),
            name: "卧式注塑机".to_string(),
            family: ProcessFamily::Injection,
            axis_count: 0,
            envelope: None,
            rate_per_min: 1.5,
            setup_fee: 100.0,
            overhead_multiplier: 1.1,
            expedite_multiplier: 1.3,
            margin_pct: 0.12,
            utilization_target: 0.9,
            active: true,
            cnc: None,
            injection: Some(InjectionParams {
                runner_fraction: 0.0,
                cycle_base_s: 12.0,
                cycle_per_cm3_s: 0.4,
                tooling_cost_fixed: 8000.0,
                tooling_cost_per_cm3: 12.0,
                tool_life_shots: 100_000,
                shot_capacity_cm3: 500.0,
                min_tonnage_t: min_tonnage,
                max_tonnage_t: max_tonnage,
                changeover_min: 45.0,
            }),
            casting: None,
        }
    }

    fn casting_machine() -> Machine {
        Machine {
            machine_id: "CAST-01".to_string(),
            name: "砂铸线".to_string(),
            family: ProcessFamily::Casting,
            axis_count: 0,
            envelope: None,
            rate_per_min: 1.2,
            setup_fee: 80.0,
            overhead_multiplier: 1.1,
            expedite_multiplier: 1.3,
            margin_pct: 0.1,
            utilization_target: 0.8,
            active: true,
            cnc: None,
            injection: None,
            casting: Some(CastingParams {
                melt_rate_kg_per_min: 2.0,
                yield_fraction: 0.85,
                scrap_fraction: 0.05,
                mold_cost_per_unit: 6.0,
                mold_setup_fee: 300.0,
                max_gross_kg: 50.0,
            }),
        }
    }

    // ==========================================
    // 测试用例
    // ==========================================

    #[test]
    fn test_cnc_within_envelope_passes() {
        let engine = FeasibilityEngine::new();
        let geom =
            GeometrySummary::basic(1_000_000.0, 60_000.0, BoundingBox::new(100.0, 100.0, 50.0));
        let item = make_item(ProcessKind::CncMilling, geom, 1);
        let machine = cnc_machine(Some(BoundingBox::new(500.0, 400.0, 300.0)));

        let result = engine.check(&item, &machine);
        assert!(result.ok);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_cnc_envelope_exceeded_is_error() {
        let engine = FeasibilityEngine::new();
        let geom =
            GeometrySummary::basic(1_000_000.0, 60_000.0, BoundingBox::new(600.0, 100.0, 50.0));
        let item = make_item(ProcessKind::CncMilling, geom, 1);
        let machine = cnc_machine(Some(BoundingBox::new(500.0, 400.0, 300.0)));

        let result = engine.check(&item, &machine);
        assert!(!result.ok);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].severity, Severity::Error);
        // 600/500 = 1.2 为最大超出比例
        assert!((result.warnings[0].metric.unwrap() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_cnc_no_envelope_means_unrestricted() {
        let engine = FeasibilityEngine::new();
        let geom = GeometrySummary::basic(
            1.0e9,
            6.0e6,
            BoundingBox::new(2000.0, 2000.0, 2000.0),
        );
        let item = make_item(ProcessKind::CncMilling, geom, 1);
        let machine = cnc_machine(None);

        assert!(engine.check(&item, &machine).ok);
    }

    #[test]
    fn test_injection_tonnage_boundary_inclusive() {
        let engine = FeasibilityEngine::new();
        // 投影 100cm² × 0.015 = 1.5t (runner_fraction = 0)
        let geom =
            GeometrySummary::basic(50_000.0, 20_000.0, BoundingBox::new(100.0, 100.0, 20.0));
        let item = make_item(ProcessKind::InjectionMolding, geom, 100);

        // 恰好等于最小锁模力: 不告警
        let machine_at_min = injection_machine(1.5, 250.0);
        let result = engine.check(&item, &machine_at_min);
        assert!(result.ok);
        assert!(result.warnings.is_empty());

        // 低于最小锁模力: WARNING 但 ok 仍为 true
        let machine_above_min = injection_machine(2.0, 250.0);
        let result = engine.check(&item, &machine_above_min);
        assert!(result.ok);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].severity, Severity::Warning);
    }

    #[test]
    fn test_injection_tonnage_over_max_is_error() {
        let engine = FeasibilityEngine::new();
        let geom =
            GeometrySummary::basic(50_000.0, 20_000.0, BoundingBox::new(400.0, 400.0, 20.0));
        // 1600cm² × 0.015 = 24t > max 20t
        let item = make_item(ProcessKind::InjectionMolding, geom, 100);
        let machine = injection_machine(1.0, 20.0);

        let result = engine.check(&item, &machine);
        assert!(!result.ok);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.severity == Severity::Error));
    }

    #[test]
    fn test_injection_quantity_over_tool_life_warns() {
        let engine = FeasibilityEngine::new();
        let geom =
            GeometrySummary::basic(50_000.0, 20_000.0, BoundingBox::new(100.0, 100.0, 20.0));
        let item = make_item(ProcessKind::InjectionMolding, geom, 150_000);
        let machine = injection_machine(1.0, 250.0);

        let result = engine.check(&item, &machine);
        assert!(result.ok); // 寿命超限是 WARNING
        assert!(result
            .warnings
            .iter()
            .any(|w| w.severity == Severity::Warning && w.message.contains("模具")));
    }

    #[test]
    fn test_casting_missing_density_is_info_and_ok() {
        let engine = FeasibilityEngine::new();
        let geom =
            GeometrySummary::basic(1_000_000.0, 60_000.0, BoundingBox::new(100.0, 100.0, 100.0));
        let mut item = make_item(ProcessKind::SandCasting, geom, 10);
        item.material.density_kg_m3 = None;

        let result = engine.check(&item, &casting_machine());
        // 数据缺失不按不可行处理
        assert!(result.ok);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].severity, Severity::Info);
    }

    #[test]
    fn test_casting_gross_mass_over_limit_is_error() {
        let engine = FeasibilityEngine::new();
        // 体积 8e6 mm³ × 7200 kg/m³ = 57.6kg 净重,毛重更大,超出 50kg 上限
        let geom =
            GeometrySummary::basic(8.0e6, 300_000.0, BoundingBox::new(200.0, 200.0, 200.0));
        let mut item = make_item(ProcessKind::SandCasting, geom, 1);
        item.material.density_kg_m3 = Some(7200.0);

        let result = engine.check(&item, &casting_machine());
        assert!(!result.ok);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.severity == Severity::Error && w.message.contains("毛重")));
    }

    #[test]
    fn test_casting_melt_shift_warning() {
        let engine = FeasibilityEngine::new();
        // 单件毛重约 3.33kg,300 件 ≈ 1000kg,熔炼 500 分钟 > 480
        let geom =
            GeometrySummary::basic(1.0e6, 60_000.0, BoundingBox::new(100.0, 100.0, 100.0));
        let mut item = make_item(ProcessKind::SandCasting, geom, 300);
        item.material.density_kg_m3 = Some(2700.0);

        let result = engine.check(&item, &casting_machine());
        assert!(result.ok); // 熔炼超班是 WARNING
        assert!(result
            .warnings
            .iter()
            .any(|w| w.severity == Severity::Warning && w.message.contains("熔炼")));
    }
}
