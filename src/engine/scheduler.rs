// ==========================================
// 零件制造报价系统 - 产能排期引擎
// ==========================================
// 依据: Quote_Engine_Specs_v1.0.md - 5. Capacity Scheduler
// 红线: 窗口内无可用槽位时返回窗口末日兜底,排期降级但永不阻断报价;
//       预占递增的原子性由 CapacityStore 保证,引擎不重复实现
// ==========================================
// 职责: 滚动窗口槽位搜索 + 产能预占提交
// 输入: 机台ID + 所需分钟数 + 交期等级 + 当前日期
// 输出: SlotResult / Reservation
// ==========================================

use crate::config::QuoteConfigReader;
use crate::domain::capacity::{CapacityDay, CapacityWindow};
use crate::domain::types::LeadTimeClass;
use crate::engine::capacity_store::CapacityStore;
use crate::engine::error::{EngineError, EngineResult};
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

// ==========================================
// SlotResult - 槽位搜索结果
// ==========================================
#[derive(Debug, Clone)]
pub struct SlotResult {
    pub day: NaiveDate,
    /// 该日已有的产能记录 (None = 尚未创建,按默认可用量处理)
    pub existing_record: Option<CapacityDay>,
    /// true = 窗口内无满足槽位,返回的是窗口末日兜底
    pub pessimistic: bool,
}

// ==========================================
// Reservation - 预占结果
// ==========================================
#[derive(Debug, Clone)]
pub struct Reservation {
    pub machine_id: String,
    pub day: NaiveDate,
    pub minutes_reserved: f64,
    /// 承诺交期 (相对 today 的天数)
    pub promised_lead_days: i64,
    /// 递增后的当日产能记录
    pub capacity_after: CapacityDay,
}

// ==========================================
// CapacityScheduler - 产能排期引擎
// ==========================================
pub struct CapacityScheduler<S, C>
where
    S: CapacityStore,
    C: QuoteConfigReader,
{
    store: Arc<S>,
    config: Arc<C>,
}

impl<S, C> CapacityScheduler<S, C>
where
    S: CapacityStore,
    C: QuoteConfigReader,
{
    /// 创建新的 CapacityScheduler 实例
    ///
    /// # 参数
    /// - store: 产能存储
    /// - config: 配置读取器
    pub fn new(store: Arc<S>, config: Arc<C>) -> Self {
        Self { store, config }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 搜索最早可用槽位
    ///
    /// 窗口起点: today + 1 天 (加急) / today + 3 天 (标准),
    /// 固定跨度 (默认 30 天),升序扫描,
    /// 取第一个 minutes_available − minutes_reserved ≥ 所需分钟数 的日子。
    ///
    /// # 参数
    /// - machine_id: 机台ID
    /// - minutes_required: 所需分钟数
    /// - lead_time_class: 交期等级
    /// - today: 当前日期 (显式传入,保证可测性)
    ///
    /// # 返回
    /// SlotResult (窗口内无槽位时为末日兜底,永不报错)
    #[instrument(skip(self), fields(machine_id = %machine_id, minutes = minutes_required))]
    pub async fn find_slot(
        &self,
        machine_id: &str,
        minutes_required: f64,
        lead_time_class: LeadTimeClass,
        today: NaiveDate,
    ) -> EngineResult<SlotResult> {
        let (start, end) = self.search_window(lead_time_class, today).await?;
        let default_minutes = self
            .config
            .get_default_daily_minutes()
            .await
            .map_err(|e| EngineError::Internal(e.to_string()))?;

        // 范围读一次,缺失日按默认可用量处理 (惰性创建语义)
        let records = self.store.find_range(machine_id, start, end).await?;
        let by_day: HashMap<NaiveDate, CapacityDay> =
            records.into_iter().map(|r| (r.day, r)).collect();

        let mut day = start;
        while day <= end {
            let free = match by_day.get(&day) {
                Some(record) => record.minutes_free(),
                None => default_minutes,
            };
            if free >= minutes_required {
                debug!(day = %day, free, "找到可用槽位");
                return Ok(SlotResult {
                    day,
                    existing_record: by_day.get(&day).cloned(),
                    pessimistic: false,
                });
            }
            day = day + Duration::days(1);
        }

        // 窗口内无槽位: 末日兜底,降级而非报错
        warn!(machine_id = %machine_id, end = %end, "窗口内无可用槽位,返回末日兜底");
        Ok(SlotResult {
            day: end,
            existing_record: by_day.get(&end).cloned(),
            pessimistic: true,
        })
    }

    /// 预占产能并返回承诺交期
    ///
    /// find_slot 选日后,通过存储方的原子递增提交预占
    /// (该日记录不存在时按默认可用量惰性创建)。
    ///
    /// # 参数
    /// - machine_id: 机台ID
    /// - minutes: 预占分钟数
    /// - lead_time_class: 交期等级
    /// - today: 当前日期
    #[instrument(skip(self), fields(machine_id = %machine_id, minutes = minutes))]
    pub async fn reserve(
        &self,
        machine_id: &str,
        minutes: f64,
        lead_time_class: LeadTimeClass,
        today: NaiveDate,
    ) -> EngineResult<Reservation> {
        let slot = self
            .find_slot(machine_id, minutes, lead_time_class, today)
            .await?;

        let default_minutes = self
            .config
            .get_default_daily_minutes()
            .await
            .map_err(|e| EngineError::Internal(e.to_string()))?;

        let capacity_after = self
            .store
            .reserve_increment(machine_id, slot.day, minutes, default_minutes)
            .await?;

        Ok(Reservation {
            machine_id: machine_id.to_string(),
            day: slot.day,
            minutes_reserved: minutes,
            promised_lead_days: (slot.day - today).num_days(),
            capacity_after,
        })
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    /// 计算搜索窗口 [start, end] (含两端)
    async fn search_window(
        &self,
        lead_time_class: LeadTimeClass,
        today: NaiveDate,
    ) -> EngineResult<(NaiveDate, NaiveDate)> {
        let offset = match lead_time_class {
            LeadTimeClass::Expedite => self
                .config
                .get_expedite_lead_offset_days()
                .await
                .map_err(|e| EngineError::Internal(e.to_string()))?,
            LeadTimeClass::Standard => self
                .config
                .get_standard_lead_offset_days()
                .await
                .map_err(|e| EngineError::Internal(e.to_string()))?,
        };
        let horizon = self
            .config
            .get_schedule_horizon_days()
            .await
            .map_err(|e| EngineError::Internal(e.to_string()))?;

        let start = today + Duration::days(offset);
        let end = start + Duration::days(horizon.max(1) - 1);
        Ok((start, end))
    }
}
