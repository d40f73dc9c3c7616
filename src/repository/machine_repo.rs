// ==========================================
// 零件制造报价系统 - 机台目录数据仓储
// ==========================================
// 依据: Quoting_Master_Spec.md - PART D 引擎铁律
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 管理 machine / machine_material_link / machine_finish_link 表
// 说明: 工艺专有参数 (CNC/注塑/铸造) 以 JSON 列存储,按 family 解析
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::geometry::BoundingBox;
use crate::domain::machine::{Machine, MachineFinishLink, MachineMaterialLink};
use crate::domain::types::ProcessFamily;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// MachineRepository - 机台目录仓储
// ==========================================
pub struct MachineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MachineRepository {
    /// 创建新的机台目录仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        repo.ensure_tables()?;
        Ok(repo)
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.ensure_tables()?;
        Ok(repo)
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 确保表存在（如果不存在则创建）
    fn ensure_tables(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS machine (
              machine_id TEXT PRIMARY KEY,
              name TEXT NOT NULL,
              family TEXT NOT NULL,
              axis_count INTEGER NOT NULL DEFAULT 3,
              envelope_x_mm REAL,
              envelope_y_mm REAL,
              envelope_z_mm REAL,
              rate_per_min REAL NOT NULL,
              setup_fee REAL NOT NULL DEFAULT 0,
              overhead_multiplier REAL NOT NULL DEFAULT 1.0,
              expedite_multiplier REAL NOT NULL DEFAULT 1.0,
              margin_pct REAL NOT NULL DEFAULT 0,
              utilization_target REAL NOT NULL DEFAULT 0.85,
              active INTEGER NOT NULL DEFAULT 1,
              process_params TEXT
            );

            CREATE TABLE IF NOT EXISTS machine_material_link (
              machine_id TEXT NOT NULL,
              material_id TEXT NOT NULL,
              rate_multiplier REAL NOT NULL DEFAULT 1.0,
              PRIMARY KEY (machine_id, material_id)
            );

            CREATE TABLE IF NOT EXISTS machine_finish_link (
              machine_id TEXT NOT NULL,
              finish_id TEXT NOT NULL,
              rate_multiplier REAL NOT NULL DEFAULT 1.0,
              PRIMARY KEY (machine_id, finish_id)
            );
            "#,
        )?;
        Ok(())
    }

    /// 行映射: machine 表 -> Machine
    fn map_machine_row(row: &Row<'_>) -> SqliteResult<Machine> {
        let family_str: String = row.get(2)?;
        let family: ProcessFamily = serde_json::from_value(serde_json::Value::String(
            family_str.clone(),
        ))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

        let envelope = match (
            row.get::<_, Option<f64>>(4)?,
            row.get::<_, Option<f64>>(5)?,
            row.get::<_, Option<f64>>(6)?,
        ) {
            (Some(x), Some(y), Some(z)) => Some(BoundingBox::new(x, y, z)),
            _ => None,
        };

        // 工艺参数 JSON 按 family 解析到对应的类型化结构
        let params_json: Option<String> = row.get(14)?;
        let (mut cnc, mut injection, mut casting) = (None, None, None);
        if let Some(raw) = params_json {
            match family {
                ProcessFamily::Cnc => {
                    cnc = Some(serde_json::from_str(&raw).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(14, Type::Text, Box::new(e))
                    })?)
                }
                ProcessFamily::Injection => {
                    injection = Some(serde_json::from_str(&raw).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(14, Type::Text, Box::new(e))
                    })?)
                }
                ProcessFamily::Casting => {
                    casting = Some(serde_json::from_str(&raw).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(14, Type::Text, Box::new(e))
                    })?)
                }
                _ => {}
            }
        }

        Ok(Machine {
            machine_id: row.get(0)?,
            name: row.get(1)?,
            family,
            axis_count: row.get::<_, i64>(3)? as u8,
            envelope,
            rate_per_min: row.get(7)?,
            setup_fee: row.get(8)?,
            overhead_multiplier: row.get(9)?,
            expedite_multiplier: row.get(10)?,
            margin_pct: row.get(11)?,
            utilization_target: row.get(12)?,
            active: row.get::<_, i64>(13)? != 0,
            cnc,
            injection,
            casting,
        })
    }

    const MACHINE_COLUMNS: &'static str = r#"
        machine_id, name, family, axis_count,
        envelope_x_mm, envelope_y_mm, envelope_z_mm,
        rate_per_min, setup_fee, overhead_multiplier, expedite_multiplier,
        margin_pct, utilization_target, active, process_params
    "#;

    /// 按工艺族查询激活机台列表
    ///
    /// # 参数
    /// - family: 工艺族
    ///
    /// # 返回
    /// - Ok(Vec<Machine>): 激活机台列表 (machine_id 升序,保证候选枚举顺序稳定)
    /// - Err: 数据库错误
    pub fn find_active_by_family(&self, family: ProcessFamily) -> RepositoryResult<Vec<Machine>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "SELECT {} FROM machine WHERE family = ?1 AND active = 1 ORDER BY machine_id",
            Self::MACHINE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let machines = stmt
            .query_map(params![family.to_string()], Self::map_machine_row)?
            .collect::<SqliteResult<Vec<Machine>>>()?;

        Ok(machines)
    }

    /// 按 ID 查询机台
    pub fn find_by_id(&self, machine_id: &str) -> RepositoryResult<Option<Machine>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "SELECT {} FROM machine WHERE machine_id = ?1",
            Self::MACHINE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let mut rows = stmt
            .query_map(params![machine_id], Self::map_machine_row)?
            .collect::<SqliteResult<Vec<Machine>>>()?;

        Ok(rows.pop())
    }

    /// 插入或更新机台
    pub fn upsert_machine(&self, machine: &Machine) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        // 工艺参数序列化为 JSON 列
        let params_json = match machine.family {
            ProcessFamily::Cnc => machine.cnc.as_ref().map(serde_json::to_string).transpose()?,
            ProcessFamily::Injection => machine
                .injection
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            ProcessFamily::Casting => machine
                .casting
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            _ => None,
        };

        conn.execute(
            r#"
            INSERT OR REPLACE INTO machine (
                machine_id, name, family, axis_count,
                envelope_x_mm, envelope_y_mm, envelope_z_mm,
                rate_per_min, setup_fee, overhead_multiplier, expedite_multiplier,
                margin_pct, utilization_target, active, process_params
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                machine.machine_id,
                machine.name,
                machine.family.to_string(),
                machine.axis_count as i64,
                machine.envelope.as_ref().map(|e| e.x_mm),
                machine.envelope.as_ref().map(|e| e.y_mm),
                machine.envelope.as_ref().map(|e| e.z_mm),
                machine.rate_per_min,
                machine.setup_fee,
                machine.overhead_multiplier,
                machine.expedite_multiplier,
                machine.margin_pct,
                machine.utilization_target,
                machine.active as i64,
                params_json,
            ],
        )?;

        Ok(())
    }

    /// 查询机台的材料兼容链接
    ///
    /// # 返回
    /// - Ok(Vec<MachineMaterialLink>): 链接列表 (空列表 = 不限制)
    pub fn find_material_links(
        &self,
        machine_id: &str,
    ) -> RepositoryResult<Vec<MachineMaterialLink>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT machine_id, material_id, rate_multiplier
            FROM machine_material_link
            WHERE machine_id = ?1
            ORDER BY material_id
            "#,
        )?;

        let links = stmt
            .query_map(params![machine_id], |row| {
                Ok(MachineMaterialLink {
                    machine_id: row.get(0)?,
                    material_id: row.get(1)?,
                    rate_multiplier: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<MachineMaterialLink>>>()?;

        Ok(links)
    }

    /// 查询机台的表面处理兼容链接
    pub fn find_finish_links(&self, machine_id: &str) -> RepositoryResult<Vec<MachineFinishLink>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT machine_id, finish_id, rate_multiplier
            FROM machine_finish_link
            WHERE machine_id = ?1
            ORDER BY finish_id
            "#,
        )?;

        let links = stmt
            .query_map(params![machine_id], |row| {
                Ok(MachineFinishLink {
                    machine_id: row.get(0)?,
                    finish_id: row.get(1)?,
                    rate_multiplier: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<MachineFinishLink>>>()?;

        Ok(links)
    }

    /// 插入或更新材料兼容链接
    pub fn upsert_material_link(&self, link: &MachineMaterialLink) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO machine_material_link (machine_id, material_id, rate_multiplier)
            VALUES (?1, ?2, ?3)
            "#,
            params![link.machine_id, link.material_id, link.rate_multiplier],
        )?;
        Ok(())
    }

    /// 插入或更新表面处理兼容链接
    pub fn upsert_finish_link(&self, link: &MachineFinishLink) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO machine_finish_link (machine_id, finish_id, rate_multiplier)
            VALUES (?1, ?2, ?3)
            "#,
            params![link.machine_id, link.finish_id, link.rate_multiplier],
        )?;
        Ok(())
    }
}
