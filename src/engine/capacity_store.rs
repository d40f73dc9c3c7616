// ==========================================
// 零件制造报价系统 - 产能存储 Trait
// ==========================================
// 依据: Quote_Engine_Specs_v1.0.md - 5. Capacity Scheduler
// 职责: 定义排期引擎所需的产能日历访问接口 (不包含实现)
// 并发契约: reserve_increment 必须由存储方保证原子性/串行化,
//           排期引擎不重复实现该保证
// ==========================================

use crate::domain::capacity::CapacityDay;
use crate::engine::error::EngineResult;
use async_trait::async_trait;
use chrono::NaiveDate;

// ==========================================
// CapacityStore Trait
// ==========================================
// 实现者: repository::CapacityDayRepository (生产) / 测试 Mock
#[async_trait]
pub trait CapacityStore: Send + Sync {
    /// 按机台和日期范围查询产能记录 (day 升序; 缺失日不返回)
    async fn find_range(
        &self,
        machine_id: &str,
        start_day: NaiveDate,
        end_day: NaiveDate,
    ) -> EngineResult<Vec<CapacityDay>>;

    /// 原子预占递增: 不存在则按默认可用量创建,再递增 minutes_reserved
    ///
    /// # 返回
    /// - CapacityDay: 递增后的当日记录
    async fn reserve_increment(
        &self,
        machine_id: &str,
        day: NaiveDate,
        minutes: f64,
        default_available: f64,
    ) -> EngineResult<CapacityDay>;
}
