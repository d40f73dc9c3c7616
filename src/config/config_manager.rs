// ==========================================
// 零件制造报价系统 - 配置管理器
// ==========================================
// 依据: Quote_Engine_Specs_v1.0.md - 8. 配置项全集
// ==========================================
// 职责: 配置加载、查询、默认值回退
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::quote_config_trait::QuoteConfigReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const DEFAULT_DAILY_MINUTES: &str = "schedule/default_daily_minutes";
    pub const SCHEDULE_HORIZON_DAYS: &str = "schedule/horizon_days";
    pub const STANDARD_LEAD_OFFSET_DAYS: &str = "schedule/standard_lead_offset_days";
    pub const EXPEDITE_LEAD_OFFSET_DAYS: &str = "schedule/expedite_lead_offset_days";
    pub const DEFAULT_REGION: &str = "quote/default_region";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        let manager = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        manager.ensure_table()?;
        Ok(manager)
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        let manager = Self { conn };
        manager.ensure_table()?;
        Ok(manager)
    }

    /// 确保 config_kv 表存在
    fn ensure_table(&self) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS config_kv (
              scope_id TEXT NOT NULL DEFAULT 'global',
              key TEXT NOT NULL,
              value TEXT NOT NULL,
              updated_at TEXT NOT NULL DEFAULT (datetime('now')),
              PRIMARY KEY (scope_id, key)
            );
            "#,
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 配置值 (后台管理用)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取 f64 配置,缺失或解析失败时回退默认值
    fn get_f64_or_default(&self, key: &str, default: f64) -> Result<f64, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(default))
    }

    /// 读取 i64 配置,缺失或解析失败时回退默认值
    fn get_i64_or_default(&self, key: &str, default: i64) -> Result<i64, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(default))
    }
}

// ==========================================
// QuoteConfigReader 实现
// ==========================================
#[async_trait]
impl QuoteConfigReader for ConfigManager {
    async fn get_default_daily_minutes(&self) -> Result<f64, Box<dyn Error>> {
        self.get_f64_or_default(config_keys::DEFAULT_DAILY_MINUTES, 480.0)
    }

    async fn get_schedule_horizon_days(&self) -> Result<i64, Box<dyn Error>> {
        self.get_i64_or_default(config_keys::SCHEDULE_HORIZON_DAYS, 30)
    }

    async fn get_standard_lead_offset_days(&self) -> Result<i64, Box<dyn Error>> {
        self.get_i64_or_default(config_keys::STANDARD_LEAD_OFFSET_DAYS, 3)
    }

    async fn get_expedite_lead_offset_days(&self) -> Result<i64, Box<dyn Error>> {
        self.get_i64_or_default(config_keys::EXPEDITE_LEAD_OFFSET_DAYS, 1)
    }

    async fn get_default_region(&self) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(config_keys::DEFAULT_REGION)?
            .unwrap_or_else(|| "CN-EAST".to_string()))
    }
}
