// ==========================================
// 零件制造报价系统 - DFM 内置规则表
// ==========================================
// 依据: Quote_Engine_Specs_v1.0.md - 6.2 规则清单与阈值
// 红线: 规则只读上下文; 新增检查 = 向 default_rules 追加一条
// ==========================================

use crate::domain::dfm::{Overlay, OverlaySpec, RuleContext, Suggestion};
use crate::domain::types::{ProcessFamily, ProcessKind, Severity, SuggestionCategory};
use crate::engine::dfm::{DfmRule, RuleHit};
use uuid::Uuid;

// ==========================================
// 阈值常量
// ==========================================

/// CNC 最小壁厚 (mm)
pub const MIN_WALL_CNC_MM: f64 = 0.8;
/// 粉末床 (SLS) 最小壁厚 (mm)
pub const MIN_WALL_SLS_MM: f64 = 1.2;
/// 孔深径比上限
pub const MAX_HOLE_DEPTH_RATIO: f64 = 6.0;
/// 注塑最小凸台直径 (mm)
pub const MIN_BOSS_DIAMETER_MM: f64 = 1.0;
/// 增材悬垂角上限 (相对 +Z 轴,度)
pub const MAX_OVERHANG_ANGLE_DEG: f64 = 45.0;
/// 铸造最小拔模角 (度)
pub const MIN_DRAFT_ANGLE_DEG: f64 = 1.0;
/// CNC 最小内角半径 (mm)
pub const MIN_CORNER_RADIUS_MM: f64 = 0.2;
/// 铸件机加工余量下限 (mm)
pub const MIN_MACHINING_ALLOWANCE_MM: f64 = 2.0;

// ==========================================
// 内置规则表
// ==========================================

/// 固定顺序的内置规则表
pub fn default_rules() -> Vec<Box<dyn DfmRule>> {
    vec![
        Box::new(ThinWallRule),
        Box::new(DeepHoleRule),
        Box::new(BossDiameterRule),
        Box::new(OverhangRule),
        Box::new(BendRadiusRule),
        Box::new(DraftAngleRule),
        Box::new(CornerRadiusRule),
        Box::new(MachiningAllowanceRule),
        Box::new(ToleranceCapabilityRule),
        Box::new(CertificationRule),
        Box::new(TapDrillRule),
    ]
}

/// 建议构造辅助
fn suggestion(
    rule_id: &str,
    message: String,
    severity: Severity,
    category: SuggestionCategory,
    metric: Option<f64>,
) -> Suggestion {
    Suggestion {
        rule_id: rule_id.to_string(),
        message,
        severity,
        category,
        metric,
        metric_text: None,
        overlay_id: None,
    }
}

// ==========================================
// 薄壁规则 (CNC 0.8mm / SLS 1.2mm)
// ==========================================
pub struct ThinWallRule;

impl DfmRule for ThinWallRule {
    fn rule_id(&self) -> &'static str {
        "thin_wall"
    }

    fn applies(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.process_kind.family() == ProcessFamily::Cnc || ctx.process_kind == ProcessKind::Sls
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<RuleHit> {
        let thickness = ctx.geometry.wall_thickness_mm?;
        let limit = if ctx.process_kind == ProcessKind::Sls {
            MIN_WALL_SLS_MM
        } else {
            MIN_WALL_CNC_MM
        };
        if thickness >= limit {
            return None;
        }

        // 热力图覆盖层: 按逐顶点壁厚场着色,色带上界取阈值
        let overlay = Overlay {
            overlay_id: Uuid::new_v4().to_string(),
            spec: OverlaySpec::HeatMap {
                field: "wall_thickness".to_string(),
                min_mm: 0.0,
                max_mm: limit,
            },
        };

        let mut s = suggestion(
            self.rule_id(),
            format!(
                "最小壁厚 {:.2}mm 低于工艺下限 {:.1}mm,存在变形/断裂风险",
                thickness, limit
            ),
            Severity::Error,
            SuggestionCategory::Manufacturability,
            Some(thickness),
        );
        s.overlay_id = Some(overlay.overlay_id.clone());

        Some(RuleHit {
            suggestion: s,
            overlay: Some(overlay),
        })
    }
}

// ==========================================
// 深孔规则 (孔深径比 > 6,仅 CNC)
// ==========================================
pub struct DeepHoleRule;

impl DfmRule for DeepHoleRule {
    fn rule_id(&self) -> &'static str {
        "deep_hole"
    }

    fn applies(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.process_kind.family() == ProcessFamily::Cnc
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<RuleHit> {
        let ratio = ctx.geometry.hole_depth_to_diameter_ratio?;
        if ratio <= MAX_HOLE_DEPTH_RATIO {
            return None;
        }
        Some(RuleHit {
            suggestion: suggestion(
                self.rule_id(),
                format!(
                    "孔深径比 {:.1} 超过 {:.0},需要专用深孔钻并增加排屑工步",
                    ratio, MAX_HOLE_DEPTH_RATIO
                ),
                Severity::Warning,
                SuggestionCategory::Manufacturability,
                Some(ratio),
            ),
            overlay: None,
        })
    }
}

// ==========================================
// 注塑凸台规则 (直径 < 1.0mm)
// ==========================================
pub struct BossDiameterRule;

impl DfmRule for BossDiameterRule {
    fn rule_id(&self) -> &'static str {
        "boss_diameter"
    }

    fn applies(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.process_kind == ProcessKind::InjectionMolding
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<RuleHit> {
        let diameter = ctx.geometry.boss_diameter_mm?;
        if diameter >= MIN_BOSS_DIAMETER_MM {
            return None;
        }
        Some(RuleHit {
            suggestion: suggestion(
                self.rule_id(),
                format!(
                    "凸台直径 {:.2}mm 小于 {:.1}mm,无法可靠充型",
                    diameter, MIN_BOSS_DIAMETER_MM
                ),
                Severity::Error,
                SuggestionCategory::Feasibility,
                Some(diameter),
            ),
            overlay: None,
        })
    }
}

// ==========================================
// 增材悬垂规则 (法向偏离 +Z 超过 45°)
// ==========================================
pub struct OverhangRule;

impl DfmRule for OverhangRule {
    fn rule_id(&self) -> &'static str {
        "overhang"
    }

    fn applies(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.process_kind.family() == ProcessFamily::Additive
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<RuleHit> {
        let angle = ctx.geometry.max_overhang_angle_deg?;
        if angle <= MAX_OVERHANG_ANGLE_DEG {
            return None;
        }

        // 几何服务预计算的悬垂面质心作为标记点
        let overlay = if ctx.geometry.overhang_centroids.is_empty() {
            None
        } else {
            Some(Overlay {
                overlay_id: Uuid::new_v4().to_string(),
                spec: OverlaySpec::Markers {
                    points: ctx.geometry.overhang_centroids.clone(),
                },
            })
        };

        let mut s = suggestion(
            self.rule_id(),
            format!(
                "存在 {:.0}° 悬垂面 (> {:.0}°),需要支撑结构并增加后处理",
                angle, MAX_OVERHANG_ANGLE_DEG
            ),
            Severity::Warning,
            SuggestionCategory::Manufacturability,
            Some(angle),
        );
        s.overlay_id = overlay.as_ref().map(|o| o.overlay_id.clone());

        Some(RuleHit {
            suggestion: s,
            overlay,
        })
    }
}

// ==========================================
// 钣金折弯规则 (折弯半径 < 板厚)
// ==========================================
pub struct BendRadiusRule;

impl DfmRule for BendRadiusRule {
    fn rule_id(&self) -> &'static str {
        "bend_radius"
    }

    fn applies(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.process_kind == ProcessKind::SheetMetal
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<RuleHit> {
        let radius = ctx.geometry.bend_radius_mm?;
        let thickness = ctx.geometry.wall_thickness_mm?;
        if radius >= thickness {
            return None;
        }
        Some(RuleHit {
            suggestion: suggestion(
                self.rule_id(),
                format!(
                    "折弯半径 {:.2}mm 小于板厚 {:.2}mm,折弯处易开裂",
                    radius, thickness
                ),
                Severity::Warning,
                SuggestionCategory::Manufacturability,
                Some(radius),
            ),
            overlay: None,
        })
    }
}

// ==========================================
// 铸造拔模规则 (拔模角 < 1°)
// ==========================================
pub struct DraftAngleRule;

impl DfmRule for DraftAngleRule {
    fn rule_id(&self) -> &'static str {
        "draft_angle"
    }

    fn applies(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.process_kind.is_casting()
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<RuleHit> {
        let angle = ctx.geometry.draft_angle_deg?;
        if angle >= MIN_DRAFT_ANGLE_DEG {
            return None;
        }
        Some(RuleHit {
            suggestion: suggestion(
                self.rule_id(),
                format!(
                    "拔模角 {:.2}° 小于 {:.0}°,铸件无法脱模",
                    angle, MIN_DRAFT_ANGLE_DEG
                ),
                Severity::Error,
                SuggestionCategory::Manufacturability,
                Some(angle),
            ),
            overlay: None,
        })
    }
}

// ==========================================
// CNC 内角规则 (内角半径 < 0.2mm)
// ==========================================
pub struct CornerRadiusRule;

impl DfmRule for CornerRadiusRule {
    fn rule_id(&self) -> &'static str {
        "corner_radius"
    }

    fn applies(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.process_kind.family() == ProcessFamily::Cnc
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<RuleHit> {
        let radius = ctx.geometry.internal_corner_radius_mm?;
        if radius >= MIN_CORNER_RADIUS_MM {
            return None;
        }
        Some(RuleHit {
            suggestion: suggestion(
                self.rule_id(),
                format!(
                    "内角半径 {:.2}mm 小于刀具可达下限 {:.1}mm,建议放宽或改用电火花",
                    radius, MIN_CORNER_RADIUS_MM
                ),
                Severity::Warning,
                SuggestionCategory::Manufacturability,
                Some(radius),
            ),
            overlay: None,
        })
    }
}

// ==========================================
// 铸件机加工余量规则 (purpose = machining 且余量 < 2mm)
// ==========================================
pub struct MachiningAllowanceRule;

impl DfmRule for MachiningAllowanceRule {
    fn rule_id(&self) -> &'static str {
        "machining_allowance"
    }

    fn applies(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.process_kind.is_casting() && ctx.purpose == Some("machining")
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<RuleHit> {
        let allowance = ctx.geometry.machining_allowance_mm?;
        if allowance >= MIN_MACHINING_ALLOWANCE_MM {
            return None;
        }
        Some(RuleHit {
            suggestion: suggestion(
                self.rule_id(),
                format!(
                    "机加工余量 {:.1}mm 小于 {:.0}mm,表面缺陷可能无法车削去除,报废率上升",
                    allowance, MIN_MACHINING_ALLOWANCE_MM
                ),
                Severity::Warning,
                SuggestionCategory::Cost,
                Some(allowance),
            ),
            overlay: None,
        })
    }
}

// ==========================================
// 公差能力规则 (请求公差细于工艺标称能力)
// ==========================================
pub struct ToleranceCapabilityRule;

impl DfmRule for ToleranceCapabilityRule {
    fn rule_id(&self) -> &'static str {
        "tolerance_capability"
    }

    fn applies(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.process_kind.tolerance_capability_mm().is_some() && ctx.tolerance.is_some()
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<RuleHit> {
        let capability = ctx.process_kind.tolerance_capability_mm()?;
        let tolerance = ctx.tolerance?;
        if tolerance.value_mm >= capability {
            return None;
        }
        Some(RuleHit {
            suggestion: suggestion(
                self.rule_id(),
                format!(
                    "请求公差 {:.3}mm 细于工艺标称能力 {:.3}mm,需要附加工序,成本上升",
                    tolerance.value_mm, capability
                ),
                Severity::Warning,
                SuggestionCategory::Cost,
                Some(tolerance.value_mm),
            ),
            overlay: None,
        })
    }
}

// ==========================================
// 认证规则 (AS9100 / ITAR 提示)
// ==========================================
pub struct CertificationRule;

impl DfmRule for CertificationRule {
    fn rule_id(&self) -> &'static str {
        "certifications"
    }

    fn applies(&self, ctx: &RuleContext<'_>) -> bool {
        !ctx.certifications.is_empty()
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<RuleHit> {
        let flagged: Vec<&str> = ctx
            .certifications
            .iter()
            .map(|c| c.as_str())
            .filter(|c| {
                let upper = c.to_uppercase();
                upper.contains("AS9100") || upper.contains("ITAR")
            })
            .collect();
        if flagged.is_empty() {
            return None;
        }
        let mut s = suggestion(
            self.rule_id(),
            format!(
                "认证要求 {} 涉及附加过程控制与追溯,交期与成本相应增加",
                flagged.join("/")
            ),
            Severity::Info,
            SuggestionCategory::Cost,
            None,
        );
        s.metric_text = Some(flagged.join(","));
        Some(RuleHit {
            suggestion: s,
            overlay: None,
        })
    }
}

// ==========================================
// 攻丝底孔规则 (几何服务标记不匹配)
// ==========================================
pub struct TapDrillRule;

impl DfmRule for TapDrillRule {
    fn rule_id(&self) -> &'static str {
        "tap_drill"
    }

    fn applies(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.process_kind.family() == ProcessFamily::Cnc
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<RuleHit> {
        if ctx.geometry.tap_drill_mismatch != Some(true) {
            return None;
        }
        Some(RuleHit {
            suggestion: suggestion(
                self.rule_id(),
                "螺纹孔底孔直径与标准攻丝底孔不匹配,攻丝易断刀或牙型不全".to_string(),
                Severity::Warning,
                SuggestionCategory::Reliability,
                None,
            ),
            overlay: None,
        })
    }
}
