// ==========================================
// 零件制造报价系统 - 领域类型定义
// ==========================================
// 依据: Quoting_Master_Spec.md - PART A 工艺与等级体系
// 依据: Quote_Engine_Specs_v1.0.md - 0.1 工艺族划分
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 工艺类型 (Process Kind)
// ==========================================
// 细分工艺,决定 DFM 规则的适用范围
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessKind {
    CncMilling,       // CNC 铣削
    CncTurning,       // CNC 车削
    InjectionMolding, // 注塑成型
    SandCasting,      // 砂型铸造
    DieCasting,       // 压铸
    Sls,              // 粉末床烧结 (SLS)
    SheetMetal,       // 钣金
}

impl ProcessKind {
    /// 映射到工艺族 (成本模型与机台候选按工艺族划分)
    pub fn family(&self) -> ProcessFamily {
        match self {
            ProcessKind::CncMilling | ProcessKind::CncTurning => ProcessFamily::Cnc,
            ProcessKind::InjectionMolding => ProcessFamily::Injection,
            ProcessKind::SandCasting | ProcessKind::DieCasting => ProcessFamily::Casting,
            ProcessKind::Sls => ProcessFamily::Additive,
            ProcessKind::SheetMetal => ProcessFamily::SheetMetal,
        }
    }

    /// 是否为铸造类工艺 (砂铸/压铸共用拔模等规则)
    pub fn is_casting(&self) -> bool {
        matches!(self, ProcessKind::SandCasting | ProcessKind::DieCasting)
    }

    /// 工艺标称公差能力 (mm)
    ///
    /// # 返回
    /// - Some(mm): 该工艺的标称可达公差
    /// - None: 无公差能力表 (不参与公差能力检查)
    pub fn tolerance_capability_mm(&self) -> Option<f64> {
        match self {
            ProcessKind::CncMilling | ProcessKind::CncTurning => Some(0.01),
            ProcessKind::InjectionMolding => Some(0.05),
            ProcessKind::SandCasting | ProcessKind::DieCasting => Some(0.5),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessKind::CncMilling => write!(f, "CNC_MILLING"),
            ProcessKind::CncTurning => write!(f, "CNC_TURNING"),
            ProcessKind::InjectionMolding => write!(f, "INJECTION_MOLDING"),
            ProcessKind::SandCasting => write!(f, "SAND_CASTING"),
            ProcessKind::DieCasting => write!(f, "DIE_CASTING"),
            ProcessKind::Sls => write!(f, "SLS"),
            ProcessKind::SheetMetal => write!(f, "SHEET_METAL"),
        }
    }
}

// ==========================================
// 工艺族 (Process Family)
// ==========================================
// 红线: 成本模型按工艺族划分,机台只服务单一工艺族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessFamily {
    Cnc,        // 切削加工
    Injection,  // 注塑
    Casting,    // 铸造
    Additive,   // 增材制造
    SheetMetal, // 钣金
}

impl ProcessFamily {
    /// 该工艺族是否有成本模型 (可参与报价)
    pub fn is_priceable(&self) -> bool {
        matches!(
            self,
            ProcessFamily::Cnc | ProcessFamily::Injection | ProcessFamily::Casting
        )
    }
}

impl fmt::Display for ProcessFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessFamily::Cnc => write!(f, "CNC"),
            ProcessFamily::Injection => write!(f, "INJECTION"),
            ProcessFamily::Casting => write!(f, "CASTING"),
            ProcessFamily::Additive => write!(f, "ADDITIVE"),
            ProcessFamily::SheetMetal => write!(f, "SHEET_METAL"),
        }
    }
}

// ==========================================
// 交期等级 (Lead Time Class)
// ==========================================
// 影响排期搜索窗口起点与加急系数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadTimeClass {
    Standard, // 标准交期
    Expedite, // 加急交期
}

impl fmt::Display for LeadTimeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadTimeClass::Standard => write!(f, "STANDARD"),
            LeadTimeClass::Expedite => write!(f, "EXPEDITE"),
        }
    }
}

// ==========================================
// 严重程度 (Severity)
// ==========================================
// 红线: 等级制,Error 即不可行; Info 不参与 ok 判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Info,    // 提示
    Warning, // 警告
    Error,   // 不可行
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

// ==========================================
// 建议分类 (Suggestion Category)
// ==========================================
// 用途: DFM 建议的前端分组展示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionCategory {
    Feasibility,       // 可行性
    Manufacturability, // 可制造性
    Cost,              // 成本
    Reliability,       // 可靠性
}

impl fmt::Display for SuggestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionCategory::Feasibility => write!(f, "FEASIBILITY"),
            SuggestionCategory::Manufacturability => write!(f, "MANUFACTURABILITY"),
            SuggestionCategory::Cost => write!(f, "COST"),
            SuggestionCategory::Reliability => write!(f, "RELIABILITY"),
        }
    }
}
