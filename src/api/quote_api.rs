// ==========================================
// 零件制造报价系统 - 报价业务 API
// ==========================================
// 依据: Quote_Engine_Specs_v1.0.md - 7. 对外接口
// ==========================================
// 职责: 组合引擎与仓储,暴露进程内业务接口
//       (报价 / 阶梯报价 / 可行性 / DFM 分析 / 槽位搜索 / 产能预占)
// 红线: 传输层协议由外层应用决定,本层只做函数契约
// ==========================================

use crate::config::QuoteConfigReader;
use crate::domain::dfm::{DfmReport, RuleContext};
use crate::domain::machine::Machine;
use crate::domain::pricing::{PricingResult, QuoteItem};
use crate::domain::types::LeadTimeClass;
use crate::engine::capacity_store::CapacityStore;
use crate::engine::catalog::CatalogReader;
use crate::engine::dfm::DfmEngine;
use crate::engine::feasibility::{FeasibilityEngine, FeasibilityResult};
use crate::engine::pricing::PricingEngine;
use crate::engine::scheduler::{CapacityScheduler, Reservation, SlotResult};
use crate::api::error::{ApiError, ApiResult};
use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// QuoteApi - 报价业务 API
// ==========================================
pub struct QuoteApi<C, S, K>
where
    C: CatalogReader,
    S: CapacityStore,
    K: QuoteConfigReader,
{
    pricing: PricingEngine<C>,
    scheduler: CapacityScheduler<S, K>,
    feasibility: FeasibilityEngine,
    dfm: DfmEngine,
    config: Arc<K>,
}

impl<C, S, K> QuoteApi<C, S, K>
where
    C: CatalogReader,
    S: CapacityStore,
    K: QuoteConfigReader,
{
    /// 创建新的 QuoteApi 实例
    ///
    /// # 参数
    /// - catalog: 目录读取器
    /// - capacity_store: 产能存储
    /// - config: 配置读取器
    pub fn new(catalog: Arc<C>, capacity_store: Arc<S>, config: Arc<K>) -> Self {
        Self {
            pricing: PricingEngine::new(catalog),
            scheduler: CapacityScheduler::new(capacity_store, config.clone()),
            feasibility: FeasibilityEngine::new(),
            dfm: DfmEngine::new(),
            config,
        }
    }

    // ==========================================
    // 报价
    // ==========================================

    /// 单档报价
    #[instrument(skip(self, item))]
    pub async fn price(&self, item: &QuoteItem) -> ApiResult<PricingResult> {
        let item = self.with_region(item).await?;
        Ok(self.pricing.price(&item).await?)
    }

    /// 阶梯报价 (逐档独立计价 + 单价单调性平滑)
    #[instrument(skip(self, item))]
    pub async fn price_tiers(
        &self,
        item: &QuoteItem,
        quantities: &[u32],
    ) -> ApiResult<BTreeMap<u32, PricingResult>> {
        if quantities.is_empty() {
            return Err(ApiError::InvalidInput("阶梯数量列表为空".to_string()));
        }
        let item = self.with_region(item).await?;
        Ok(self.pricing.price_tiers(&item, quantities).await?)
    }

    /// 报价并提交产能预占
    ///
    /// 选定机台后向排期引擎预占整单机时,
    /// 用实际承诺交期覆盖报价中的标称交期。
    /// 费率卡兜底伪机台没有产能日历,不做预占。
    #[instrument(skip(self, item))]
    pub async fn price_and_reserve(&self, item: &QuoteItem) -> ApiResult<PricingResult> {
        let item = self.with_region(item).await?;
        let mut result = self.pricing.price(&item).await?;

        if !result.used_rate_card_fallback {
            let reservation = self
                .scheduler
                .reserve(
                    &result.machine_id,
                    result.machine_minutes,
                    item.lead_time_class,
                    Self::today(),
                )
                .await?;
            result.promised_lead_days = reservation.promised_lead_days;
        }

        Ok(result)
    }

    // ==========================================
    // 可行性与 DFM
    // ==========================================

    /// 单机台可行性检查 (纯计算,无 I/O)
    pub fn check_feasibility(&self, item: &QuoteItem, machine: &Machine) -> FeasibilityResult {
        self.feasibility.check(item, machine)
    }

    /// DFM 可制造性分析 (与报价相互独立)
    #[instrument(skip(self, item))]
    pub fn analyze(&self, item: &QuoteItem) -> ApiResult<DfmReport> {
        if !item.geometry.is_valid() {
            return Err(ApiError::ValidationError(
                "几何摘要无效 (体积/面积/包围盒必须为正)".to_string(),
            ));
        }

        Ok(self.dfm.analyze(&RuleContext {
            process_kind: item.process_kind,
            geometry: &item.geometry,
            material: Some(&item.material),
            tolerance: item.tolerance.as_ref(),
            certifications: &item.certifications,
            purpose: item.purpose.as_deref(),
        }))
    }

    // ==========================================
    // 产能排期
    // ==========================================

    /// 搜索最早可用槽位
    pub async fn find_slot(
        &self,
        machine_id: &str,
        minutes_required: f64,
        lead_time_class: LeadTimeClass,
    ) -> ApiResult<SlotResult> {
        if minutes_required <= 0.0 {
            return Err(ApiError::InvalidInput("所需分钟数必须为正".to_string()));
        }
        Ok(self
            .scheduler
            .find_slot(machine_id, minutes_required, lead_time_class, Self::today())
            .await?)
    }

    /// 预占产能并返回承诺交期
    pub async fn reserve(
        &self,
        machine_id: &str,
        minutes: f64,
        lead_time_class: LeadTimeClass,
    ) -> ApiResult<Reservation> {
        if minutes <= 0.0 {
            return Err(ApiError::InvalidInput("预占分钟数必须为正".to_string()));
        }
        Ok(self
            .scheduler
            .reserve(machine_id, minutes, lead_time_class, Self::today())
            .await?)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    /// 请求未携带区域时回填配置的默认区域
    async fn with_region(&self, item: &QuoteItem) -> ApiResult<QuoteItem> {
        let mut item = item.clone();
        if item.region.trim().is_empty() {
            item.region = self
                .config
                .get_default_region()
                .await
                .map_err(|e| ApiError::InternalError(e.to_string()))?;
        }
        Ok(item)
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }
}
