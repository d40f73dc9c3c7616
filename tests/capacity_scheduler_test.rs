// ==========================================
// CapacityScheduler 引擎集成测试 (SQLite 产能日历)
// ==========================================
// 测试目标: 验证滚动窗口搜索与预占在真实仓储上的行为
// 覆盖范围: 窗口起点、惰性创建、跨日滚动、末日兜底
// ==========================================


use chrono::{Duration, NaiveDate};
use mfg_quoting::config::ConfigManager;
use mfg_quoting::domain::capacity::CapacityDay;
use mfg_quoting::domain::types::LeadTimeClass;
use mfg_quoting::engine::CapacityScheduler;
use mfg_quoting::repository::CapacityDayRepository;
use std::sync::Arc;

use test_helpers::create_test_db;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
}

fn setup(db_path: &str) -> CapacityScheduler<CapacityDayRepository, ConfigManager> {
    let store = Arc::new(CapacityDayRepository::new(db_path).unwrap());
    let config = Arc::new(ConfigManager::new(db_path).unwrap());
    CapacityScheduler::new(store, config)
}

// ==========================================
// 测试用例 1: 空日历首日即可用
// ==========================================

#[tokio::test]
async fn test_empty_calendar_first_day_available() {
    let (_temp, db_path) = create_test_db().unwrap();
    let scheduler = setup(&db_path);

    let standard = scheduler
        .find_slot("CNC-01", 60.0, LeadTimeClass::Standard, today())
        .await
        .unwrap();
    assert_eq!(standard.day, today() + Duration::days(3));
    assert!(!standard.pessimistic);

    let expedite = scheduler
        .find_slot("CNC-01", 60.0, LeadTimeClass::Expedite, today())
        .await
        .unwrap();
    assert_eq!(expedite.day, today() + Duration::days(1));
}

// ==========================================
// 测试用例 2: 预占惰性创建并累加
// ==========================================

#[tokio::test]
async fn test_reserve_creates_day_lazily_and_accumulates() {
    let (_temp, db_path) = create_test_db().unwrap();
    let repo = CapacityDayRepository::new(&db_path).unwrap();
    let scheduler = setup(&db_path);

    let first = scheduler
        .reserve("CNC-01", 120.0, LeadTimeClass::Standard, today())
        .await
        .unwrap();
    assert_eq!(first.promised_lead_days, 3);

    // 记录已按默认 480 分钟惰性创建
    let record = repo
        .find_by_machine_and_day("CNC-01", first.day)
        .unwrap()
        .expect("预占后记录应存在");
    assert!((record.minutes_available - 480.0).abs() < 1e-9);
    assert!((record.minutes_reserved - 120.0).abs() < 1e-9);

    // 同日二次预占累加
    let second = scheduler
        .reserve("CNC-01", 200.0, LeadTimeClass::Standard, today())
        .await
        .unwrap();
    assert_eq!(second.day, first.day);
    assert!((second.capacity_after.minutes_reserved - 320.0).abs() < 1e-9);
}

// ==========================================
// 测试用例 3: 当日不足滚动到次日
// ==========================================

#[tokio::test]
async fn test_reserve_rolls_over_when_day_full() {
    let (_temp, db_path) = create_test_db().unwrap();
    let scheduler = setup(&db_path);

    scheduler
        .reserve("CNC-01", 450.0, LeadTimeClass::Standard, today())
        .await
        .unwrap();

    // 首日仅剩 30 分钟,100 分钟的预占落在次日
    let rolled = scheduler
        .reserve("CNC-01", 100.0, LeadTimeClass::Standard, today())
        .await
        .unwrap();
    assert_eq!(rolled.day, today() + Duration::days(4));
    assert_eq!(rolled.promised_lead_days, 4);
}

// ==========================================
// 测试用例 4: 全窗口占满 → 末日兜底
// ==========================================

#[tokio::test]
async fn test_pessimistic_fallback_when_window_full() {
    let (_temp, db_path) = create_test_db().unwrap();
    let repo = CapacityDayRepository::new(&db_path).unwrap();

    // 整个 30 天窗口全部占满
    for offset in 3..33 {
        let mut record = CapacityDay::fresh("CNC-01", today() + Duration::days(offset), 480.0);
        record.minutes_reserved = 480.0;
        repo.upsert_single(&record).unwrap();
    }

    let scheduler = setup(&db_path);
    let slot = scheduler
        .find_slot("CNC-01", 60.0, LeadTimeClass::Standard, today())
        .await
        .unwrap();

    // 降级为末日兜底,不报错
    assert_eq!(slot.day, today() + Duration::days(32));
    assert!(slot.pessimistic);
}

// ==========================================
// 测试用例 5: 机台间日历互不影响
// ==========================================

#[tokio::test]
async fn test_machines_have_independent_calendars() {
    let (_temp, db_path) = create_test_db().unwrap();
    let scheduler = setup(&db_path);

    scheduler
        .reserve("CNC-01", 480.0, LeadTimeClass::Standard, today())
        .await
        .unwrap();

    // CNC-02 的首日不受 CNC-01 占用影响
    let other = scheduler
        .reserve("CNC-02", 60.0, LeadTimeClass::Standard, today())
        .await
        .unwrap();
    assert_eq!(other.day, today() + Duration::days(3));
}
