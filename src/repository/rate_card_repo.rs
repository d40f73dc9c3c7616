// ==========================================
// 零件制造报价系统 - 区域费率卡数据仓储
// ==========================================
// 职责: 管理 rate_card 表 (按区域)
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::material::RateCard;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// RateCardRepository - 费率卡仓储
// ==========================================
pub struct RateCardRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RateCardRepository {
    /// 创建新的费率卡仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        repo.ensure_table()?;
        Ok(repo)
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.ensure_table()?;
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 确保表存在（如果不存在则创建）
    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS rate_card (
              region TEXT PRIMARY KEY,
              rate_3axis_per_min REAL NOT NULL,
              rate_5axis_per_min REAL NOT NULL,
              press_rate_per_hour REAL NOT NULL,
              melt_rate_per_min REAL NOT NULL,
              tax_rate REAL NOT NULL,
              flat_shipping REAL NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// 按区域查询费率卡
    ///
    /// # 返回
    /// - Ok(Some(RateCard)): 找到费率卡
    /// - Ok(None): 区域未配置
    pub fn find_by_region(&self, region: &str) -> RepositoryResult<Option<RateCard>> {
        let conn = self.get_conn()?;

        let card = conn
            .query_row(
                r#"
                SELECT region, rate_3axis_per_min, rate_5axis_per_min,
                       press_rate_per_hour, melt_rate_per_min, tax_rate, flat_shipping
                FROM rate_card
                WHERE region = ?1
                "#,
                params![region],
                |row| {
                    Ok(RateCard {
                        region: row.get(0)?,
                        rate_3axis_per_min: row.get(1)?,
                        rate_5axis_per_min: row.get(2)?,
                        press_rate_per_hour: row.get(3)?,
                        melt_rate_per_min: row.get(4)?,
                        tax_rate: row.get(5)?,
                        flat_shipping: row.get(6)?,
                    })
                },
            )
            .optional()?;

        Ok(card)
    }

    /// 插入或更新费率卡
    pub fn upsert(&self, card: &RateCard) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO rate_card (
                region, rate_3axis_per_min, rate_5axis_per_min,
                press_rate_per_hour, melt_rate_per_min, tax_rate, flat_shipping
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                card.region,
                card.rate_3axis_per_min,
                card.rate_5axis_per_min,
                card.press_rate_per_hour,
                card.melt_rate_per_min,
                card.tax_rate,
                card.flat_shipping,
            ],
        )?;
        Ok(())
    }
}
