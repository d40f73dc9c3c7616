// ==========================================
// 零件制造报价系统 - DFM 领域模型
// ==========================================
// 依据: Quote_Engine_Specs_v1.0.md - 6. DFM Rule Engine
// 红线: 建议与覆盖层每次分析现算,不由本子系统持久化
// ==========================================

use crate::domain::geometry::GeometrySummary;
use crate::domain::material::{Material, Tolerance};
use crate::domain::types::{ProcessKind, Severity, SuggestionCategory};
use serde::{Deserialize, Serialize};

// ==========================================
// RuleContext - 规则评估上下文
// ==========================================
// 规则只读取上下文,不产生副作用
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub process_kind: ProcessKind,
    pub geometry: &'a GeometrySummary,
    pub material: Option<&'a Material>,
    pub tolerance: Option<&'a Tolerance>,
    pub certifications: &'a [String],
    pub purpose: Option<&'a str>,
}

// ==========================================
// Suggestion - 制造性建议
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub rule_id: String,
    pub message: String,
    pub severity: Severity,
    pub category: SuggestionCategory,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_text: Option<String>,

    // 关联覆盖层 (外部查看器按 id 取用)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_id: Option<String>,
}

// ==========================================
// OverlaySpec - 覆盖层渲染规格
// ==========================================
// 渲染由外部 CAD 查看器完成,这里只描述"画什么"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverlaySpec {
    /// 按逐顶点标量场着色的热力图
    HeatMap {
        field: String,   // 顶点场名称 (如 "wall_thickness")
        min_mm: f64,     // 色带下界
        max_mm: f64,     // 色带上界
    },
    /// 包围盒线框
    BoundingBox { x_mm: f64, y_mm: f64, z_mm: f64 },
    /// 面质心标记点集
    Markers { points: Vec<[f64; 3]> },
    /// 壳体轮廓线
    ShellOutline { offset_mm: f64 },
}

// ==========================================
// Overlay - 覆盖层
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overlay {
    pub overlay_id: String,
    pub spec: OverlaySpec,
}

// ==========================================
// DfmReport - 分析结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DfmReport {
    pub ok: bool, // 无 ERROR 级建议
    pub suggestions: Vec<Suggestion>,
    pub overlays: Vec<Overlay>,
}
