// ==========================================
// 零件制造报价系统 - 几何摘要领域模型
// ==========================================
// 依据: Quote_Engine_Specs_v1.0.md - 1. Geometry Summary
// 红线: 几何摘要由外部几何提取服务产出,本系统只读
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// BoundingBox - 包围盒 (mm)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_mm: f64,
    pub y_mm: f64,
    pub z_mm: f64,
}

impl BoundingBox {
    pub fn new(x_mm: f64, y_mm: f64, z_mm: f64) -> Self {
        Self { x_mm, y_mm, z_mm }
    }

    /// 三轴中的最大尺寸 (mm)
    pub fn max_dim_mm(&self) -> f64 {
        self.x_mm.max(self.y_mm).max(self.z_mm)
    }
}

// ==========================================
// GeometrySummary - 几何摘要
// ==========================================
// 计算一次后不可变,归属于请求方的报价项
// 可选字段来自几何服务的特征级分析,缺失时相关规则自动跳过
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometrySummary {
    // ===== 基础几何 (必填) =====
    pub volume_mm3: f64,       // 体积 (mm³)
    pub surface_area_mm2: f64, // 表面积 (mm²)
    pub bounding_box: BoundingBox,

    // ===== 特征级指标 (可选) =====
    pub wall_thickness_mm: Option<f64>,             // 最小壁厚
    pub hole_depth_to_diameter_ratio: Option<f64>,  // 孔深径比
    pub bend_radius_mm: Option<f64>,                // 折弯半径
    pub max_overhang_angle_deg: Option<f64>,        // 最大悬垂角 (相对 +Z 轴)
    pub min_feature_size_mm: Option<f64>,           // 最小特征尺寸
    pub boss_diameter_mm: Option<f64>,              // 最小凸台直径
    pub internal_corner_radius_mm: Option<f64>,     // 最小内角半径
    pub draft_angle_deg: Option<f64>,               // 最小拔模角
    pub machining_allowance_mm: Option<f64>,        // 机加工余量
    pub tap_drill_mismatch: Option<bool>,           // 攻丝底孔不匹配标记

    // ===== 悬垂面质心 (增材标记点,几何服务预计算) =====
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overhang_centroids: Vec<[f64; 3]>,
}

impl GeometrySummary {
    /// 创建仅含基础几何的摘要 (特征级指标全部缺省)
    pub fn basic(volume_mm3: f64, surface_area_mm2: f64, bounding_box: BoundingBox) -> Self {
        Self {
            volume_mm3,
            surface_area_mm2,
            bounding_box,
            wall_thickness_mm: None,
            hole_depth_to_diameter_ratio: None,
            bend_radius_mm: None,
            max_overhang_angle_deg: None,
            min_feature_size_mm: None,
            boss_diameter_mm: None,
            internal_corner_radius_mm: None,
            draft_angle_deg: None,
            machining_allowance_mm: None,
            tap_drill_mismatch: None,
            overhang_centroids: Vec::new(),
        }
    }

    /// 基础几何是否有效 (正体积/正面积/正包围盒)
    pub fn is_valid(&self) -> bool {
        self.volume_mm3 > 0.0
            && self.volume_mm3.is_finite()
            && self.surface_area_mm2 > 0.0
            && self.surface_area_mm2.is_finite()
            && self.bounding_box.x_mm > 0.0
            && self.bounding_box.y_mm > 0.0
            && self.bounding_box.z_mm > 0.0
    }

    /// XY 投影面积 (cm²),用于注塑锁模力估算
    ///
    /// 近似: 包围盒 XY 面积。几何服务若提供精确投影则覆盖此值。
    pub fn projected_area_xy_cm2(&self) -> f64 {
        self.bounding_box.x_mm * self.bounding_box.y_mm / 100.0
    }

    /// 净质量 (kg)
    ///
    /// # 参数
    /// - `density_kg_m3`: 材料密度 (kg/m³)
    pub fn net_mass_kg(&self, density_kg_m3: f64) -> f64 {
        self.volume_mm3 / 1.0e9 * density_kg_m3
    }

    /// 相对机台包络的最大超出比例
    ///
    /// # 参数
    /// - `envelope`: 机台包络 (mm)
    ///
    /// # 返回
    /// 最大轴向 尺寸/包络 比值 (>1.0 表示超出)
    pub fn max_envelope_overage(&self, envelope: &BoundingBox) -> f64 {
        let rx = self.bounding_box.x_mm / envelope.x_mm;
        let ry = self.bounding_box.y_mm / envelope.y_mm;
        let rz = self.bounding_box.z_mm / envelope.z_mm;
        rx.max(ry).max(rz)
    }
}
