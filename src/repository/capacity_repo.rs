// ==========================================
// 零件制造报价系统 - 产能日历数据仓储
// ==========================================
// 依据: Quoting_Master_Spec.md - PART D 引擎铁律
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 管理 capacity_day 表 (machine_id + day 唯一)
// 并发契约: 预占递增必须走单条 UPSERT 语句,
//           读-改-写两段式在并发预订下会丢失增量
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::capacity::CapacityDay;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// CapacityDayRepository - 产能日历仓储
// ==========================================
pub struct CapacityDayRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CapacityDayRepository {
    /// 创建新的产能日历仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
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
            CREATE TABLE IF NOT EXISTS capacity_day (
              machine_id TEXT NOT NULL,
              day TEXT NOT NULL,
              minutes_available REAL NOT NULL,
              minutes_reserved REAL NOT NULL DEFAULT 0,
              PRIMARY KEY (machine_id, day)
            );
            "#,
        )?;
        Ok(())
    }

    /// 按机台和日期查询单日记录
    ///
    /// # 返回
    /// - Ok(Some(CapacityDay)): 找到记录
    /// - Ok(None): 该日尚未创建 (惰性创建语义,由调用方按默认可用量处理)
    pub fn find_by_machine_and_day(
        &self,
        machine_id: &str,
        day: NaiveDate,
    ) -> RepositoryResult<Option<CapacityDay>> {
        let conn = self.get_conn()?;
        let day_str = day.format("%Y-%m-%d").to_string();

        let record = conn
            .query_row(
                r#"
                SELECT machine_id, day, minutes_available, minutes_reserved
                FROM capacity_day
                WHERE machine_id = ?1 AND day = ?2
                "#,
                params![machine_id, day_str],
                Self::map_row,
            )
            .optional()?;

        Ok(record)
    }

    /// 按机台和日期范围查询记录列表 (day 升序)
    ///
    /// # 参数
    /// - machine_id: 机台ID
    /// - start_day: 起始日期 (含)
    /// - end_day: 结束日期 (含)
    pub fn find_by_date_range(
        &self,
        machine_id: &str,
        start_day: NaiveDate,
        end_day: NaiveDate,
    ) -> RepositoryResult<Vec<CapacityDay>> {
        let conn = self.get_conn()?;
        let start_str = start_day.format("%Y-%m-%d").to_string();
        let end_str = end_day.format("%Y-%m-%d").to_string();

        let mut stmt = conn.prepare(
            r#"
            SELECT machine_id, day, minutes_available, minutes_reserved
            FROM capacity_day
            WHERE machine_id = ?1
              AND day BETWEEN ?2 AND ?3
            ORDER BY day
            "#,
        )?;

        let records = stmt
            .query_map(params![machine_id, start_str, end_str], Self::map_row)?
            .collect::<SqliteResult<Vec<CapacityDay>>>()?;

        Ok(records)
    }

    /// 插入或更新单日记录
    pub fn upsert_single(&self, record: &CapacityDay) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let day_str = record.day.format("%Y-%m-%d").to_string();

        conn.execute(
            r#"
            INSERT OR REPLACE INTO capacity_day (
                machine_id, day, minutes_available, minutes_reserved
            ) VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                record.machine_id,
                day_str,
                record.minutes_available,
                record.minutes_reserved,
            ],
        )?;

        Ok(())
    }

    /// 原子预占递增
    ///
    /// 单条 UPSERT 完成 "不存在则按默认可用量创建 + minutes_reserved 递增",
    /// 由 SQLite 语句级原子性串行化并发预订 (配合连接互斥锁与 busy_timeout)。
    ///
    /// # 参数
    /// - machine_id: 机台ID
    /// - day: 预占日期
    /// - minutes: 预占分钟数
    /// - default_available: 惰性创建时的默认可用分钟数
    ///
    /// # 返回
    /// - Ok(CapacityDay): 递增后的当日记录
    pub fn reserve_increment(
        &self,
        machine_id: &str,
        day: NaiveDate,
        minutes: f64,
        default_available: f64,
    ) -> RepositoryResult<CapacityDay> {
        let conn = self.get_conn()?;
        let day_str = day.format("%Y-%m-%d").to_string();

        conn.execute(
            r#"
            INSERT INTO capacity_day (machine_id, day, minutes_available, minutes_reserved)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (machine_id, day)
            DO UPDATE SET minutes_reserved = minutes_reserved + ?4
            "#,
            params![machine_id, day_str, default_available, minutes],
        )?;

        let record = conn.query_row(
            r#"
            SELECT machine_id, day, minutes_available, minutes_reserved
            FROM capacity_day
            WHERE machine_id = ?1 AND day = ?2
            "#,
            params![machine_id, day_str],
            Self::map_row,
        )?;

        Ok(record)
    }

    /// 行映射: capacity_day 表 -> CapacityDay
    fn map_row(row: &rusqlite::Row<'_>) -> SqliteResult<CapacityDay> {
        Ok(CapacityDay {
            machine_id: row.get(0)?,
            day: NaiveDate::parse_from_str(&row.get::<_, String>(1)?, "%Y-%m-%d")
                .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
            minutes_available: row.get(2)?,
            minutes_reserved: row.get(3)?,
        })
    }
}
