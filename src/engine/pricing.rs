// ==========================================
// 零件制造报价系统 - 报价引擎
// ==========================================
// 依据: Quote_Engine_Specs_v1.0.md - 4. Pricing Engine
// 红线: 候选枚举顺序稳定,同价取先枚举者;
//       目录无匹配机台必须走费率卡兜底,报价永不因目录缺失硬失败
// ==========================================
// 职责: 候选机台筛选 + 逐候选成本计算 + 最低价选择 + 阶梯报价
// 输入: QuoteItem + 目录读取器 (显式注入)
// 输出: PricingResult
// ==========================================

use crate::domain::machine::{CastingParams, CncParams, InjectionParams, Machine};
use crate::domain::material::RateCard;
use crate::domain::pricing::{warning_codes, PricingResult, QuoteItem, QuoteWarning};
use crate::domain::types::{LeadTimeClass, ProcessFamily, Severity};
use crate::engine::catalog::CatalogReader;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::feasibility::FeasibilityEngine;
use crate::engine::pricing_core::{
    AdjustmentParams, CastingQuoteParams, CncQuoteParams, InjectionQuoteParams, PricingCore,
};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

// ==========================================
// 常量
// ==========================================

/// 费率卡兜底伪机台 ID
pub const RATE_CARD_MACHINE_ID: &str = "RATE_CARD";

/// 标称交期 (天) - 排期提交前的预估值
pub const STANDARD_LEAD_DAYS: i64 = 7;
pub const EXPEDITE_LEAD_DAYS: i64 = 2;

/// 兜底伪机台稼动率
const FALLBACK_UTILIZATION: f64 = 0.85;

// ==========================================
// Candidate - 通过筛选的候选机台
// ==========================================
struct Candidate {
    machine: Machine,
    material_rate_multiplier: f64,
    finish_rate_multiplier: f64,
    feasibility_warnings: Vec<QuoteWarning>,
}

// ==========================================
// PricingEngine - 报价引擎
// ==========================================
pub struct PricingEngine<C>
where
    C: CatalogReader,
{
    catalog: Arc<C>,
    feasibility: FeasibilityEngine,
}

impl<C> PricingEngine<C>
where
    C: CatalogReader,
{
    /// 创建新的 PricingEngine 实例
    ///
    /// # 参数
    /// - catalog: 目录读取器
    pub fn new(catalog: Arc<C>) -> Self {
        Self {
            catalog,
            feasibility: FeasibilityEngine::new(),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算单档报价
    ///
    /// 异步仅因目录读取; 成本计算本身同步且确定。
    ///
    /// # 参数
    /// - item: 报价项
    ///
    /// # 返回
    /// - Ok(PricingResult): 最低价候选的完整报价
    /// - Err(Validation): 数量/几何/工艺族/基准数据校验失败
    #[instrument(skip(self, item), fields(
        process_kind = %item.process_kind,
        quantity = item.quantity,
        region = %item.region
    ))]
    pub async fn price(&self, item: &QuoteItem) -> EngineResult<PricingResult> {
        // === 步骤 1: 请求校验 ===
        self.validate_item(item)?;
        let family = item.process_kind.family();

        // === 步骤 2: 费率卡 (必需基准数据,缺失即校验错误) ===
        let rate_card = self
            .catalog
            .find_rate_card(&item.region)
            .await?
            .ok_or_else(|| {
                EngineError::Validation(format!("区域 {} 未配置费率卡", item.region))
            })?;

        // === 步骤 3: 枚举激活机台并逐台筛选 (链接解析为目录 I/O,并发执行) ===
        let machines = self.catalog.find_active_machines(family).await?;
        let screened = join_all(
            machines
                .into_iter()
                .map(|machine| self.screen_candidate(item, machine)),
        )
        .await;

        let mut candidates = Vec::new();
        for result in screened {
            if let Some(candidate) = result? {
                candidates.push(candidate);
            }
        }

        // === 步骤 4: 无幸存候选 → 费率卡兜底 ===
        let mut fallback_warnings = Vec::new();
        if candidates.is_empty() {
            warn!(region = %item.region, family = %family, "目录无匹配机台,使用费率卡兜底");
            fallback_warnings.push(QuoteWarning::new(
                warning_codes::NO_MATCHING_MACHINE_USING_RATE_CARD,
                Severity::Warning,
                format!("目录中无兼容机台,使用区域 {} 费率卡兜底报价", item.region),
            ));
            candidates.push(Candidate {
                machine: Self::rate_card_machine(&rate_card, family),
                material_rate_multiplier: 1.0,
                finish_rate_multiplier: 1.0,
                feasibility_warnings: Vec::new(),
            });
        }

        // === 步骤 5: 逐候选计价,取最低 total (同价取先枚举者) ===
        let mut best: Option<PricingResult> = None;
        for candidate in &candidates {
            let result = self.price_candidate(item, candidate, &rate_card)?;
            debug!(
                machine_id = %result.machine_id,
                total = result.total,
                "候选报价完成"
            );
            match &best {
                Some(current) if result.total >= current.total => {}
                _ => best = Some(result),
            }
        }

        let mut chosen =
            best.ok_or_else(|| EngineError::Internal("候选列表为空".to_string()))?;
        chosen.warnings.extend(fallback_warnings);
        Ok(chosen)
    }

    /// 阶梯报价: 逐档独立计价后施加单价单调性约束
    ///
    /// # 参数
    /// - item: 报价项 (quantity 字段被各档覆盖)
    /// - quantities: 数量档位 (去重升序后逐档计价)
    ///
    /// # 返回
    /// - BTreeMap<数量, PricingResult>: 平滑后的各档报价
    #[instrument(skip(self, item, quantities))]
    pub async fn price_tiers(
        &self,
        item: &QuoteItem,
        quantities: &[u32],
    ) -> EngineResult<BTreeMap<u32, PricingResult>> {
        let mut sorted: Vec<u32> = quantities.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.is_empty() {
            return Err(EngineError::Validation("阶梯数量列表为空".to_string()));
        }

        let mut tiers = Vec::with_capacity(sorted.len());
        for quantity in &sorted {
            let mut tier_item = item.clone();
            tier_item.quantity = *quantity;
            tiers.push(self.price(&tier_item).await?);
        }

        PricingCore::smooth_tiers(&mut tiers);

        Ok(tiers.into_iter().map(|t| (t.quantity, t)).collect())
    }

    // ==========================================
    // 候选筛选
    // ==========================================

    /// 单机台筛选: 硬约束预过滤 + 材料/表面处理链接解析
    ///
    /// # 返回
    /// - Ok(Some(Candidate)): 通过筛选
    /// - Ok(None): 被硬约束或链接排除
    async fn screen_candidate(
        &self,
        item: &QuoteItem,
        machine: Machine,
    ) -> EngineResult<Option<Candidate>> {
        // 硬约束预过滤: 包络/注射量/最大毛重违反的机台不参与计价
        let feasibility = self.feasibility.check(item, &machine);
        if feasibility.has_hard_violation() {
            debug!(machine_id = %machine.machine_id, "硬约束违反,候选排除");
            return Ok(None);
        }

        // 材料链接: 有链接行时仅链接材料可用
        let material_links = self.catalog.find_material_links(&machine.machine_id).await?;
        let material_rate_multiplier = if material_links.is_empty() {
            1.0
        } else {
            match material_links
                .iter()
                .find(|l| l.material_id == item.material.material_id)
            {
                Some(link) => link.rate_multiplier,
                None => {
                    debug!(machine_id = %machine.machine_id, "材料不在链接表,候选排除");
                    return Ok(None);
                }
            }
        };

        // 表面处理链接: 仅在请求了表面处理时参与筛选
        let finish_rate_multiplier = match &item.finish {
            None => 1.0,
            Some(finish) => {
                let finish_links = self.catalog.find_finish_links(&machine.machine_id).await?;
                if finish_links.is_empty() {
                    1.0
                } else {
                    match finish_links.iter().find(|l| l.finish_id == finish.finish_id) {
                        Some(link) => link.rate_multiplier,
                        None => {
                            debug!(machine_id = %machine.machine_id, "表面处理不在链接表,候选排除");
                            return Ok(None);
                        }
                    }
                }
            }
        };

        // 软性告警 (WARNING/INFO) 随候选保留,入选后附在结果上
        let feasibility_warnings = feasibility
            .warnings
            .into_iter()
            .map(|w| QuoteWarning::new("FEASIBILITY", w.severity, w.message))
            .collect();

        Ok(Some(Candidate {
            machine,
            material_rate_multiplier,
            finish_rate_multiplier,
            feasibility_warnings,
        }))
    }

    // ==========================================
    // 单候选计价
    // ==========================================

    fn price_candidate(
        &self,
        item: &QuoteItem,
        candidate: &Candidate,
        rate_card: &RateCard,
    ) -> EngineResult<PricingResult> {
        let machine = &candidate.machine;

        // === 工艺成本行项 ===
        let process_cost = match machine.family {
            ProcessFamily::Cnc => {
                let cnc = machine.cnc.as_ref().ok_or_else(|| {
                    EngineError::Internal(format!("机台 {} 缺少 CNC 参数", machine.machine_id))
                })?;
                let params = CncQuoteParams {
                    rate_per_min: machine.rate_per_min,
                    utilization_target: machine.utilization_target,
                    setup_fee: machine.setup_fee,
                    tool_change_min: cnc.tool_change_min,
                    five_axis_factor: if machine.is_five_axis() {
                        cnc.five_axis_factor
                    } else {
                        1.0
                    },
                    material_rate_multiplier: candidate.material_rate_multiplier,
                    finish_rate_multiplier: candidate.finish_rate_multiplier,
                };
                PricingCore::cnc_cost(
                    &item.geometry,
                    &item.material,
                    item.finish.as_ref(),
                    item.quantity,
                    &params,
                )?
            }
            ProcessFamily::Injection => {
                let injection = machine.injection.as_ref().ok_or_else(|| {
                    EngineError::Internal(format!("机台 {} 缺少注塑参数", machine.machine_id))
                })?;
                let params = InjectionQuoteParams {
                    press_rate_per_hour: machine.rate_per_min * 60.0,
                    rate_per_min: machine.rate_per_min,
                    runner_fraction: injection.runner_fraction,
                    cycle_base_s: injection.cycle_base_s,
                    cycle_per_cm3_s: injection.cycle_per_cm3_s,
                    tooling_cost_fixed: injection.tooling_cost_fixed,
                    tooling_cost_per_cm3: injection.tooling_cost_per_cm3,
                    tool_life_shots: injection.tool_life_shots,
                    changeover_min: injection.changeover_min,
                    material_rate_multiplier: candidate.material_rate_multiplier,
                };
                PricingCore::injection_cost(&item.geometry, &item.material, item.quantity, &params)?
            }
            ProcessFamily::Casting => {
                let casting = machine.casting.as_ref().ok_or_else(|| {
                    EngineError::Internal(format!("机台 {} 缺少铸造参数", machine.machine_id))
                })?;
                let params = CastingQuoteParams {
                    rate_per_min: machine.rate_per_min,
                    utilization_target: machine.utilization_target,
                    melt_rate_kg_per_min: casting.melt_rate_kg_per_min,
                    yield_fraction: casting.yield_fraction,
                    scrap_fraction: casting.scrap_fraction,
                    mold_cost_per_unit: casting.mold_cost_per_unit,
                    mold_setup_fee: casting.mold_setup_fee,
                    material_rate_multiplier: candidate.material_rate_multiplier,
                    finish_rate_multiplier: candidate.finish_rate_multiplier,
                };
                PricingCore::casting_cost(
                    &item.geometry,
                    &item.material,
                    item.finish.as_ref(),
                    item.quantity,
                    &params,
                )?
            }
            family => {
                return Err(EngineError::Validation(format!(
                    "工艺族 {} 无成本模型,不可报价",
                    family
                )))
            }
        };

        let mut line_items = process_cost.line_items;
        let base_subtotal: f64 = line_items.iter().map(|i| i.amount).sum();

        // === 通用调整 (顺序固定) ===
        let adjustments = AdjustmentParams {
            tolerance_multiplier: item
                .tolerance
                .as_ref()
                .map(|t| t.cost_multiplier)
                .unwrap_or(1.0),
            overhead_multiplier: machine.overhead_multiplier,
            expedite_multiplier: match item.lead_time_class {
                LeadTimeClass::Expedite => Some(machine.expedite_multiplier),
                LeadTimeClass::Standard => None,
            },
            margin_pct: machine.margin_pct,
        };
        let (subtotal, adjustment_items) =
            PricingCore::apply_adjustments(base_subtotal, item.quantity, &adjustments);
        line_items.extend(adjustment_items);

        // === 税费/运费/合计 ===
        let tax = subtotal * rate_card.tax_rate;
        let shipping = rate_card.flat_shipping;
        let total = subtotal + tax + shipping;
        let unit_price = total / item.quantity as f64;

        // === 展平展示映射 ===
        let mut breakdown: BTreeMap<String, f64> = line_items
            .iter()
            .map(|i| (i.description.clone(), i.amount))
            .collect();
        breakdown.insert("subtotal".to_string(), subtotal);
        breakdown.insert("tax".to_string(), tax);
        breakdown.insert("shipping".to_string(), shipping);
        breakdown.insert("total".to_string(), total);
        breakdown.insert("unit_price".to_string(), unit_price);

        let promised_lead_days = match item.lead_time_class {
            LeadTimeClass::Standard => STANDARD_LEAD_DAYS,
            LeadTimeClass::Expedite => EXPEDITE_LEAD_DAYS,
        };

        Ok(PricingResult {
            quantity: item.quantity,
            unit_price,
            subtotal,
            tax,
            shipping,
            total,
            machine_id: machine.machine_id.clone(),
            machine_name: machine.name.clone(),
            used_rate_card_fallback: machine.machine_id == RATE_CARD_MACHINE_ID,
            promised_lead_days,
            machine_minutes: process_cost.machine_minutes,
            line_items,
            breakdown,
            warnings: candidate.feasibility_warnings.clone(),
        })
    }

    // ==========================================
    // 校验与兜底
    // ==========================================

    fn validate_item(&self, item: &QuoteItem) -> EngineResult<()> {
        if item.quantity < 1 {
            return Err(EngineError::Validation("数量必须 ≥ 1".to_string()));
        }
        if !item.geometry.is_valid() {
            return Err(EngineError::Validation(
                "几何摘要无效 (体积/面积/包围盒必须为正)".to_string(),
            ));
        }
        if !item.process_kind.family().is_priceable() {
            return Err(EngineError::Validation(format!(
                "工艺 {} 无成本模型,不可报价",
                item.process_kind
            )));
        }
        Ok(())
    }

    /// 从区域费率卡合成兜底伪机台
    fn rate_card_machine(card: &RateCard, family: ProcessFamily) -> Machine {
        let rate_per_min = match family {
            ProcessFamily::Cnc => card.rate_3axis_per_min,
            ProcessFamily::Injection => card.press_rate_per_hour / 60.0,
            _ => card.melt_rate_per_min,
        };

        Machine {
            machine_id: RATE_CARD_MACHINE_ID.to_string(),
            name: format!("费率卡兜底 ({})", card.region),
            family,
            axis_count: 3,
            envelope: None,
            rate_per_min,
            setup_fee: 0.0,
            overhead_multiplier: 1.0,
            expedite_multiplier: 1.0,
            margin_pct: 0.0,
            utilization_target: FALLBACK_UTILIZATION,
            active: true,
            cnc: Some(CncParams {
                tool_change_min: 0.0,
                five_axis_factor: 1.0,
            }),
            injection: Some(InjectionParams {
                runner_fraction: 0.05,
                cycle_base_s: 15.0,
                cycle_per_cm3_s: 0.5,
                tooling_cost_fixed: 0.0,
                tooling_cost_per_cm3: 0.0,
                tool_life_shots: u32::MAX,
                shot_capacity_cm3: f64::INFINITY,
                min_tonnage_t: 0.0,
                max_tonnage_t: f64::INFINITY,
                changeover_min: 0.0,
            }),
            casting: Some(CastingParams {
                melt_rate_kg_per_min: 5.0,
                yield_fraction: 0.85,
                scrap_fraction: 0.05,
                mold_cost_per_unit: 0.0,
                mold_setup_fee: 0.0,
                max_gross_kg: f64::INFINITY,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::{BoundingBox, GeometrySummary};
    use crate::domain::machine::{MachineFinishLink, MachineMaterialLink};
    use crate::domain::material::Material;
    use crate::domain::types::ProcessKind;
    use async_trait::async_trait;

    // ==========================================
    // Mock CatalogReader
    // ==========================================
    #[derive(Default)]
    struct MockCatalog {
        machines: Vec<Machine>,
        material_links: Vec<MachineMaterialLink>,
        finish_links: Vec<MachineFinishLink>,
        rate_card: Option<RateCard>,
    }

    #[async_trait]
    impl CatalogReader for MockCatalog {
        async fn find_active_machines(
            &self,
            family: ProcessFamily,
        ) -> EngineResult<Vec<Machine>> {
            Ok(self
                .machines
                .iter()
                .filter(|m| m.family == family && m.active)
                .cloned()
                .collect())
        }

        async fn find_material_links(
            &self,
            machine_id: &str,
        ) -> EngineResult<Vec<MachineMaterialLink>> {
            Ok(self
                .material_links
                .iter()
                .filter(|l| l.machine_id == machine_id)
                .cloned()
                .collect())
        }

        async fn find_finish_links(
            &self,
            machine_id: &str,
        ) -> EngineResult<Vec<MachineFinishLink>> {
            Ok(self
                .finish_links
                .iter()
                .filter(|l| l.machine_id == machine_id)
                .cloned()
                .collect())
        }

        async fn find_rate_card(&self, region: &str) -> EngineResult<Option<RateCard>> {
            Ok(self
                .rate_card
                .clone()
                .filter(|c| c.region == region))
        }
    }

    // ==========================================
    // 测试辅助函数
    // ==========================================

    fn test_rate_card() -> RateCard {
        RateCard {
            region: "CN-EAST".to_string(),
            rate_3axis_per_min: 2.0,
            rate_5axis_per_min: 3.5,
            press_rate_per_hour: 90.0,
            melt_rate_per_min: 1.2,
            tax_rate: 0.10,
            flat_shipping: 0.0,
        }
    }

    fn reference_item() -> QuoteItem {
        QuoteItem {
            geometry: GeometrySummary::basic(
                1_000_000.0,
                6_000.0,
                BoundingBox::new(100.0, 100.0, 100.0),
            ),
            process_kind: ProcessKind::CncMilling,
            material: {
                let mut m = Material::new("REF", "基准材料", 2.0, 20.0);
                m.machinability_factor = 1.0;
                m
            },
            finish: None,
            tolerance: None,
            quantity: 1,
            lead_time_class: LeadTimeClass::Standard,
            region: "CN-EAST".to_string(),
            certifications: Vec::new(),
            purpose: None,
        }
    }

    fn cnc_machine(machine_id: &str, rate_per_min: f64) -> Machine {
        Machine {
            machine_id: machine_id.to_string(),
            name: format!("测试机台 {}", machine_id),
            family: ProcessFamily::Cnc,
            axis_count: 3,
            envelope: None,
            rate_per_min,
            setup_fee: 0.0,
            overhead_multiplier: 1.0,
            expedite_multiplier: 1.3,
            margin_pct: 0.0,
            utilization_target: 0.85,
            active: true,
            cnc: Some(CncParams::default()),
            injection: None,
            casting: None,
        }
    }

    // ==========================================
    // 测试用例
    // ==========================================

    #[tokio::test]
    async fn test_empty_catalog_falls_back_to_rate_card() {
        let catalog = Arc::new(MockCatalog {
            rate_card: Some(test_rate_card()),
            ..Default::default()
        });
        let engine = PricingEngine::new(catalog);

        let result = engine.price(&reference_item()).await.unwrap();

        // 基准场景: machining ≈ 0.0776, material ≈ 0.04, total ≈ 0.1294
        assert!(result.used_rate_card_fallback);
        assert_eq!(result.machine_id, RATE_CARD_MACHINE_ID);
        assert!((result.breakdown["machining"] - 0.0776).abs() < 5e-4);
        assert!((result.breakdown["material"] - 0.04).abs() < 1e-9);
        assert!((result.total - 0.1294).abs() < 5e-4, "total = {}", result.total);
        assert!(result.total_consistent());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.code == warning_codes::NO_MATCHING_MACHINE_USING_RATE_CARD));
    }

    #[tokio::test]
    async fn test_missing_rate_card_is_validation_error() {
        let catalog = Arc::new(MockCatalog::default());
        let engine = PricingEngine::new(catalog);

        let err = engine.price(&reference_item()).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_lowest_total_candidate_wins() {
        let catalog = Arc::new(MockCatalog {
            machines: vec![cnc_machine("CNC-A", 3.0), cnc_machine("CNC-B", 2.0)],
            rate_card: Some(test_rate_card()),
            ..Default::default()
        });
        let engine = PricingEngine::new(catalog);

        let result = engine.price(&reference_item()).await.unwrap();
        assert_eq!(result.machine_id, "CNC-B");
        assert!(!result.used_rate_card_fallback);
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_tie_broken_by_enumeration_order() {
        let catalog = Arc::new(MockCatalog {
            machines: vec![cnc_machine("CNC-A", 2.0), cnc_machine("CNC-B", 2.0)],
            rate_card: Some(test_rate_card()),
            ..Default::default()
        });
        let engine = PricingEngine::new(catalog);

        let result = engine.price(&reference_item()).await.unwrap();
        assert_eq!(result.machine_id, "CNC-A");
    }

    #[tokio::test]
    async fn test_envelope_violation_excludes_machine() {
        let mut small = cnc_machine("CNC-SMALL", 1.0); // 更便宜但装不下
        small.envelope = Some(BoundingBox::new(50.0, 50.0, 50.0));
        let catalog = Arc::new(MockCatalog {
            machines: vec![small, cnc_machine("CNC-BIG", 2.0)],
            rate_card: Some(test_rate_card()),
            ..Default::default()
        });
        let engine = PricingEngine::new(catalog);

        let result = engine.price(&reference_item()).await.unwrap();
        assert_eq!(result.machine_id, "CNC-BIG");
    }

    #[tokio::test]
    async fn test_material_link_filters_and_applies_multiplier() {
        let catalog = Arc::new(MockCatalog {
            machines: vec![cnc_machine("CNC-A", 2.0), cnc_machine("CNC-B", 2.0)],
            material_links: vec![
                // CNC-A 仅允许 TI64; CNC-B 允许 REF 且费率上浮
                MachineMaterialLink {
                    machine_id: "CNC-A".to_string(),
                    material_id: "TI64".to_string(),
                    rate_multiplier: 1.0,
                },
                MachineMaterialLink {
                    machine_id: "CNC-B".to_string(),
                    material_id: "REF".to_string(),
                    rate_multiplier: 1.5,
                },
            ],
            rate_card: Some(test_rate_card()),
            ..Default::default()
        });
        let engine = PricingEngine::new(catalog);

        let result = engine.price(&reference_item()).await.unwrap();
        // CNC-A 被链接排除,CNC-B 入选且加工费带 1.5 系数
        assert_eq!(result.machine_id, "CNC-B");
        assert!((result.breakdown["machining"] - 0.0776 * 1.5).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_expedite_applies_machine_multiplier() {
        let mut machine = cnc_machine("CNC-A", 2.0);
        machine.expedite_multiplier = 1.5;
        let catalog = Arc::new(MockCatalog {
            machines: vec![machine],
            rate_card: Some(test_rate_card()),
            ..Default::default()
        });
        let engine = PricingEngine::new(catalog);

        let mut item = reference_item();
        item.lead_time_class = LeadTimeClass::Expedite;
        let expedited = engine.price(&item).await.unwrap();

        let standard = engine.price(&reference_item()).await.unwrap();

        assert!((expedited.subtotal - standard.subtotal * 1.5).abs() < 1e-9);
        assert_eq!(expedited.promised_lead_days, EXPEDITE_LEAD_DAYS);
        assert_eq!(standard.promised_lead_days, STANDARD_LEAD_DAYS);
    }

    #[tokio::test]
    async fn test_unpriceable_process_kind_is_validation_error() {
        let catalog = Arc::new(MockCatalog {
            rate_card: Some(test_rate_card()),
            ..Default::default()
        });
        let engine = PricingEngine::new(catalog);

        let mut item = reference_item();
        item.process_kind = ProcessKind::Sls;
        let err = engine.price(&item).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_price_tiers_monotone_and_floored() {
        let catalog = Arc::new(MockCatalog {
            machines: vec![cnc_machine("CNC-A", 2.0)],
            rate_card: Some(test_rate_card()),
            ..Default::default()
        });
        let engine = PricingEngine::new(catalog);

        let tiers = engine
            .price_tiers(&reference_item(), &[1, 10, 100, 1000])
            .await
            .unwrap();

        let quantities: Vec<u32> = tiers.keys().copied().collect();
        assert_eq!(quantities, vec![1, 10, 100, 1000]);

        let mut prev_unit: Option<f64> = None;
        for (_, tier) in tiers.iter() {
            assert!(tier.total_consistent());
            if let Some(prev) = prev_unit {
                // 单价不升,且不跌破上一档的 80%
                assert!(tier.unit_price <= prev + 1e-9);
                assert!(tier.unit_price >= prev * 0.8 - 1e-9);
            }
            prev_unit = Some(tier.unit_price);
        }
    }

    #[tokio::test]
    async fn test_quantity_zero_is_validation_error() {
        let catalog = Arc::new(MockCatalog {
            rate_card: Some(test_rate_card()),
            ..Default::default()
        });
        let engine = PricingEngine::new(catalog);

        let mut item = reference_item();
        item.quantity = 0;
        assert!(engine.price(&item).await.unwrap_err().is_validation());
    }
}
