// ==========================================
// 零件制造报价系统 - 产能日历领域模型
// ==========================================
// 依据: Quote_Engine_Specs_v1.0.md - 5. Capacity Scheduler
// 红线: (machine_id, day) 唯一; 本系统只做惰性创建与预占递增,不删除
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// CapacityDay - 单机单日产能记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityDay {
    pub machine_id: String,
    pub day: NaiveDate,
    pub minutes_available: f64, // 当日可用分钟数
    pub minutes_reserved: f64,  // 已预占分钟数
}

impl CapacityDay {
    /// 创建带默认可用量的空记录 (惰性创建路径)
    pub fn fresh(machine_id: &str, day: NaiveDate, minutes_available: f64) -> Self {
        Self {
            machine_id: machine_id.to_string(),
            day,
            minutes_available,
            minutes_reserved: 0.0,
        }
    }
}

// ==========================================
// Trait: CapacityWindow
// ==========================================
// 用途: Scheduler 槽位判定接口
pub trait CapacityWindow {
    /// 剩余可预占分钟数
    fn minutes_free(&self) -> f64;

    /// 是否容得下所需分钟数
    fn can_fit(&self, minutes_required: f64) -> bool;
}

impl CapacityWindow for CapacityDay {
    fn minutes_free(&self) -> f64 {
        (self.minutes_available - self.minutes_reserved).max(0.0)
    }

    fn can_fit(&self, minutes_required: f64) -> bool {
        self.minutes_available - self.minutes_reserved >= minutes_required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_free() {
        let mut day = CapacityDay::fresh(
            "CNC-01",
            NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
            480.0,
        );
        assert!((day.minutes_free() - 480.0).abs() < 1e-9);

        day.minutes_reserved = 400.0;
        assert!((day.minutes_free() - 80.0).abs() < 1e-9);
        assert!(day.can_fit(80.0)); // 边界: 恰好容纳
        assert!(!day.can_fit(80.1));
    }

    #[test]
    fn test_overbooked_day_clamps_to_zero() {
        let mut day = CapacityDay::fresh(
            "CNC-01",
            NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
            480.0,
        );
        day.minutes_reserved = 500.0;
        assert_eq!(day.minutes_free(), 0.0);
        assert!(!day.can_fit(1.0));
    }
}
