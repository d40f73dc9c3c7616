// ==========================================
// 零件制造报价系统 - 目录读取 Trait
// ==========================================
// 依据: Quote_Engine_Specs_v1.0.md - 7. 外部协作方
// 职责: 定义报价引擎所需的目录读取接口 (不包含实现)
// 红线: 目录显式注入引擎,不走全局状态; 无后端存储亦可测试
// ==========================================

use crate::domain::machine::{Machine, MachineFinishLink, MachineMaterialLink};
use crate::domain::material::RateCard;
use crate::domain::types::ProcessFamily;
use crate::engine::error::EngineResult;
use async_trait::async_trait;

// ==========================================
// CatalogReader Trait
// ==========================================
// 用途: 报价引擎的机台目录/费率卡读取接口
// 实现者: repository::SqliteCatalog (生产) / 测试 Mock
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// 按工艺族查询激活机台列表
    ///
    /// # 返回
    /// - Vec<Machine>: 激活机台,枚举顺序稳定 (同价并列时取先枚举者)
    async fn find_active_machines(&self, family: ProcessFamily) -> EngineResult<Vec<Machine>>;

    /// 查询机台的材料兼容链接
    ///
    /// # 语义
    /// - 空列表 = 机台不限制材料
    /// - 非空 = 仅链接的材料可用,附带费率系数
    async fn find_material_links(
        &self,
        machine_id: &str,
    ) -> EngineResult<Vec<MachineMaterialLink>>;

    /// 查询机台的表面处理兼容链接 (语义同材料链接)
    async fn find_finish_links(&self, machine_id: &str) -> EngineResult<Vec<MachineFinishLink>>;

    /// 按区域查询费率卡
    ///
    /// # 返回
    /// - Some(RateCard): 区域费率卡
    /// - None: 区域未配置 (报价引擎视为校验错误)
    async fn find_rate_card(&self, region: &str) -> EngineResult<Option<RateCard>>;
}
