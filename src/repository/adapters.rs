// ==========================================
// 零件制造报价系统 - 引擎接口适配器
// ==========================================
// 职责: 将同步 rusqlite 仓储适配为引擎层的异步读取接口
// 说明: SQLite 调用本身短耗时,直接在异步上下文内同步执行
//       (与 ConfigManager 的做法一致)
// ==========================================

use crate::domain::capacity::CapacityDay;
use crate::domain::machine::{Machine, MachineFinishLink, MachineMaterialLink};
use crate::domain::material::RateCard;
use crate::domain::types::ProcessFamily;
use crate::engine::capacity_store::CapacityStore;
use crate::engine::catalog::CatalogReader;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::capacity_repo::CapacityDayRepository;
use crate::repository::machine_repo::MachineRepository;
use crate::repository::rate_card_repo::RateCardRepository;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

// ==========================================
// SqliteCatalog - 机台目录 + 费率卡组合读取器
// ==========================================
pub struct SqliteCatalog {
    machines: Arc<MachineRepository>,
    rate_cards: Arc<RateCardRepository>,
}

impl SqliteCatalog {
    /// 创建组合目录读取器
    ///
    /// # 参数
    /// - machines: 机台目录仓储
    /// - rate_cards: 费率卡仓储
    pub fn new(machines: Arc<MachineRepository>, rate_cards: Arc<RateCardRepository>) -> Self {
        Self {
            machines,
            rate_cards,
        }
    }
}

#[async_trait]
impl CatalogReader for SqliteCatalog {
    async fn find_active_machines(&self, family: ProcessFamily) -> EngineResult<Vec<Machine>> {
        self.machines
            .find_active_by_family(family)
            .map_err(|e| EngineError::Catalog(e.to_string()))
    }

    async fn find_material_links(
        &self,
        machine_id: &str,
    ) -> EngineResult<Vec<MachineMaterialLink>> {
        self.machines
            .find_material_links(machine_id)
            .map_err(|e| EngineError::Catalog(e.to_string()))
    }

    async fn find_finish_links(&self, machine_id: &str) -> EngineResult<Vec<MachineFinishLink>> {
        self.machines
            .find_finish_links(machine_id)
            .map_err(|e| EngineError::Catalog(e.to_string()))
    }

    async fn find_rate_card(&self, region: &str) -> EngineResult<Option<RateCard>> {
        self.rate_cards
            .find_by_region(region)
            .map_err(|e| EngineError::Catalog(e.to_string()))
    }
}

// ==========================================
// CapacityStore 实现 (直接由产能日历仓储承载)
// ==========================================
#[async_trait]
impl CapacityStore for CapacityDayRepository {
    async fn find_range(
        &self,
        machine_id: &str,
        start_day: NaiveDate,
        end_day: NaiveDate,
    ) -> EngineResult<Vec<CapacityDay>> {
        self.find_by_date_range(machine_id, start_day, end_day)
            .map_err(|e| EngineError::Capacity(e.to_string()))
    }

    async fn reserve_increment(
        &self,
        machine_id: &str,
        day: NaiveDate,
        minutes: f64,
        default_available: f64,
    ) -> EngineResult<CapacityDay> {
        CapacityDayRepository::reserve_increment(self, machine_id, day, minutes, default_available)
            .map_err(|e| EngineError::Capacity(e.to_string()))
    }
}
